use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde_json::Value;

use crate::auth::AuthService;
use crate::client::ApiClient;
use crate::endpoints::MarketSnapshot;
use crate::knowledge::{self, LookupOutcome};
use crate::models::{
    DiagnosisResult, FertilizerRequest, MarketPrice, NewPost, ProfileUpdate, SoilInput, Trend, User,
};
use crate::refresh::Refresher;
use crate::report;
use crate::search;
use crate::severity::{self, SeverityBucket};

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_user(user: &User) {
    println!("{} <{}>", user.username, user.email);
    if let Some(name) = user.full_name.as_deref() {
        println!("  name: {name}");
    }
    if let Some(location) = user.location.as_deref() {
        println!("  location: {location}");
    }
    if let Some(bio) = user.bio.as_deref() {
        println!("  bio: {bio}");
    }
    println!("  member since {}", user.created_at.format("%B %Y"));
}

pub async fn login(auth: &mut AuthService, email: &str, password: &str) -> anyhow::Result<()> {
    let user = auth
        .login(email, password)
        .await
        .map_err(|err| err.surface("Login failed. Please try again."))?;
    println!("Welcome back, {}!", user.username);
    Ok(())
}

pub async fn register(
    auth: &mut AuthService,
    username: &str,
    email: &str,
    password: &str,
    full_name: Option<&str>,
) -> anyhow::Result<()> {
    let user = auth
        .register(username, email, password, full_name)
        .await
        .map_err(|err| err.surface("Registration failed. Please try again."))?;
    println!("Welcome to LeafScan, {}!", user.username);
    Ok(())
}

pub fn whoami(auth: &AuthService) {
    match auth.session().user() {
        Some(user) => print_user(user),
        None => println!("Not signed in."),
    }
}

pub async fn update_profile(auth: &mut AuthService, update: &ProfileUpdate) -> anyhow::Result<()> {
    if update.is_empty() {
        anyhow::bail!("Nothing to update; pass at least one field.");
    }
    let user = auth
        .update_profile(update)
        .await
        .map_err(|err| err.surface("Failed to update profile"))?;
    println!("Profile updated!");
    print_user(&user);
    Ok(())
}

pub fn lookup(name: &str) {
    let info = knowledge::lookup(Some(name));
    match info.outcome {
        LookupOutcome::Matched { key, rule } => {
            println!("{key} (matched by {})", rule.as_str());
        }
        LookupOutcome::EmptyInput => println!("{}", knowledge::HEALTHY_KEY),
        LookupOutcome::Generic => println!("{name} (no reference entry)"),
    }
    println!();
    println!("{}", info.desc);
    println!();
    println!("Spread: {}", info.spread);
    for (heading, items) in [
        ("Organic treatment", info.organic),
        ("Chemical treatment", info.chemical),
        ("Prevention", info.prevention),
    ] {
        println!();
        println!("{heading}:");
        for item in items {
            println!("  - {item}");
        }
    }
}

pub fn severity(is_healthy: bool, name: Option<&str>) {
    let bucket = severity::classify(is_healthy, name);
    let display = bucket.display();
    println!("{bucket}: {}", display.label);
    println!("  color: {}", display.color);
    println!("  background: {}", display.background);
    println!("  border: {}", display.border);
    println!("  icon: {}", display.icon);
}

fn print_diagnosis(result: &DiagnosisResult, bucket: SeverityBucket) {
    let disease = result.disease_name.as_deref().unwrap_or("Unknown");
    let crop = result.crop_type.as_deref().unwrap_or("Unknown crop");
    let confidence = result
        .confidence
        .map(|c| format!("{:.1}%", c * 100.0))
        .unwrap_or_else(|| "n/a".to_string());
    println!(
        "{disease} on {crop} | confidence {confidence} | severity {}",
        bucket.display().label
    );
    if let Some(score) = &result.severity {
        println!("  score {}/100 ({}): {}", score.score, score.level, score.urgency);
    }
}

pub async fn diagnose(
    api: &ApiClient,
    image: &Path,
    crop_hint: Option<&str>,
    report_path: Option<&Path>,
) -> anyhow::Result<()> {
    let result = api
        .predict_disease(image, crop_hint)
        .await
        .map_err(|err| err.surface("Analysis failed. Please try again."))?;
    let bucket = severity::severity_key(Some(&result));
    println!("Analysis complete!");
    print_diagnosis(&result, bucket);

    let info = knowledge::lookup(result.disease_name.as_deref());
    println!();
    if let Some(key) = info.matched_key() {
        println!("Reference entry: {key}");
    }
    println!("{}", info.desc);

    if let Some(path) = report_path {
        let markdown = report::build_diagnosis_report(&result, bucket, &info);
        std::fs::write(path, markdown)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        println!("Report written to {}.", path.display());
    }
    Ok(())
}

pub async fn diagnoses(api: &ApiClient) -> anyhow::Result<()> {
    let results = api
        .diagnosis_history()
        .await
        .map_err(|err| err.surface("Failed to load diagnoses"))?;
    if results.is_empty() {
        println!("No diagnoses yet.");
        return Ok(());
    }
    for result in &results {
        if let Some(created_at) = result.created_at {
            print!("{} ", created_at.format("%Y-%m-%d %H:%M"));
        }
        print_diagnosis(result, severity::severity_key(Some(result)));
    }
    Ok(())
}

pub async fn model_status(api: &ApiClient) -> anyhow::Result<()> {
    let status = api
        .model_status()
        .await
        .map_err(|err| err.surface("Failed to load model status"))?;
    print_json(&status)
}

pub async fn chat_send(api: &ApiClient, message: &str) -> anyhow::Result<()> {
    if message.trim().is_empty() {
        anyhow::bail!("Message cannot be empty");
    }
    let reply = api
        .send_chat(message.trim())
        .await
        .map_err(|err| err.surface("LiAn is temporarily unavailable. Please try again."))?;
    println!("{}", reply.reply);
    println!(
        "  ({} at {})",
        reply.source.as_deref().unwrap_or("assistant"),
        reply.timestamp.format("%H:%M")
    );
    Ok(())
}

pub async fn chat_history(api: &ApiClient) -> anyhow::Result<()> {
    let messages = api
        .chat_history()
        .await
        .map_err(|err| err.surface("Failed to load conversation"))?;
    if messages.is_empty() {
        println!("No conversation yet.");
    }
    for message in &messages {
        println!("[{}] {}: {}", message.timestamp.format("%H:%M"), message.role, message.content);
    }
    Ok(())
}

pub async fn chat_clear(api: &ApiClient) -> anyhow::Result<()> {
    let ack = api
        .clear_chat()
        .await
        .map_err(|err| err.surface("Failed to clear conversation"))?;
    println!("{}", ack.message.as_deref().unwrap_or("Conversation cleared"));
    Ok(())
}

pub async fn chat_status(api: &ApiClient) -> anyhow::Result<()> {
    let status = api
        .chat_status()
        .await
        .map_err(|err| err.surface("Failed to load assistant status"))?;
    println!("{} ({}) - {}", status.model, status.mode, status.status);
    if let Some(entries) = status.kb_entries {
        println!("  knowledge base entries: {entries}");
    }
    Ok(())
}

pub async fn community_list(api: &ApiClient, query: &str) -> anyhow::Result<()> {
    let posts = api
        .posts()
        .await
        .map_err(|err| err.surface("Failed to load posts"))?;
    let matching = search::filter_posts(&posts, query);
    if matching.is_empty() {
        println!("No posts found.");
    }
    for post in matching {
        println!(
            "#{} {} by {} | {} likes, {} comments",
            post.id,
            post.title,
            post.author.username,
            post.likes_count,
            post.comments.len()
        );
        println!("  posted {}", post.created_at.format("%Y-%m-%d %H:%M"));
        let tags = post.tag_list();
        if !tags.is_empty() {
            println!("  tags: {}", tags.join(", "));
        }
        if let Some(image) = post.image_url.as_deref() {
            println!("  image: {image}");
        }
        for comment in &post.comments {
            println!(
                "  > {} ({}): {}",
                comment.author.username,
                comment.created_at.format("%Y-%m-%d"),
                comment.content
            );
        }
    }
    Ok(())
}

pub async fn community_post(api: &ApiClient, post: &NewPost) -> anyhow::Result<()> {
    let created = api
        .create_post(post)
        .await
        .map_err(|err| err.surface("Failed to create post"))?;
    println!("Post created! (#{})", created.id);
    Ok(())
}

pub async fn community_like(api: &ApiClient, id: i64) -> anyhow::Result<()> {
    let likes = api
        .like_post(id)
        .await
        .map_err(|err| err.surface("Failed to like post"))?;
    println!("Post #{id} now has {} likes.", likes.likes_count);
    Ok(())
}

pub async fn community_comment(api: &ApiClient, id: i64, content: &str) -> anyhow::Result<()> {
    api.comment_on_post(id, content)
        .await
        .map_err(|err| err.surface("Failed to add comment"))?;
    println!("Comment added!");
    Ok(())
}

pub async fn weather(
    api: &ApiClient,
    city: &str,
    coordinates: Option<(f64, f64)>,
) -> anyhow::Result<()> {
    let weather = api
        .current_weather(city, coordinates)
        .await
        .map_err(|err| err.surface("Failed to load weather"))?;
    print_json(&weather)
}

pub async fn weather_status(api: &ApiClient) -> anyhow::Result<()> {
    let status = api
        .weather_status()
        .await
        .map_err(|err| err.surface("Failed to load weather status"))?;
    print_json(&status)
}

fn price_line(price: &MarketPrice) -> String {
    let label = match price.emoji.as_deref() {
        Some(emoji) => format!("{emoji} {}", price.crop),
        None => price.crop.clone(),
    };
    format!(
        "{:<18} {:>10.2} {:<10} {:>+7.2}% {}",
        label, price.price, price.unit, price.change_pct, price.trend
    )
}

/// Source and freshness of the first listed price, as a footer.
fn price_source_line(prices: &[&MarketPrice]) -> Option<String> {
    let first = prices.first()?;
    let source = first.data_source.as_deref()?;
    Some(match first.last_updated.as_deref() {
        Some(updated) => format!("source: {source}, updated {updated}"),
        None => format!("source: {source}"),
    })
}

fn print_prices(prices: &[&MarketPrice]) {
    for price in prices {
        println!("{}", price_line(price));
    }
    if let Some(footer) = price_source_line(prices) {
        println!("{footer}");
    }
}

fn print_snapshot(snapshot: &MarketSnapshot, query: &str, trend: Option<Trend>) {
    print_prices(&search::filter_prices(&snapshot.prices, query, trend));
    let movers = &snapshot.movers;
    if let Some(top) = movers.gainers.first() {
        println!("top gainer: {} ({:+.2}%)", top.crop, top.change_pct);
    }
    if let Some(bottom) = movers.losers.first() {
        println!("top loser: {} ({:+.2}%)", bottom.crop, bottom.change_pct);
    }
    if let Some(status) = &snapshot.cache_status {
        tracing::debug!(cache = %status, "market cache");
    }
}

pub async fn market_list(api: &ApiClient, query: &str, trend: Option<Trend>) -> anyhow::Result<()> {
    let prices = api
        .market_prices()
        .await
        .map_err(|err| err.surface("Failed to load market prices"))?;
    let matching = search::filter_prices(&prices, query, trend);
    if matching.is_empty() {
        println!("No crops match.");
    }
    print_prices(&matching);
    Ok(())
}

pub async fn market_show(api: &ApiClient, crop: &str) -> anyhow::Result<()> {
    let detail = api
        .crop_price(crop)
        .await
        .map_err(|err| err.surface("Crop not found"))?;
    print_json(&detail)
}

pub async fn market_movers(api: &ApiClient) -> anyhow::Result<()> {
    let movers = api
        .top_movers()
        .await
        .map_err(|err| err.surface("Failed to load top movers"))?;
    for (heading, list) in [("Gainers", &movers.gainers), ("Losers", &movers.losers)] {
        println!("{heading}:");
        for mover in list {
            println!(
                "  {:<16} {:>10.2} {:<10} {:>+7.2}% {}",
                mover.crop, mover.price, mover.unit, mover.change_pct, mover.trend
            );
        }
    }
    if let Some(timestamp) = movers.timestamp.as_deref() {
        println!("as of {timestamp}");
    }
    Ok(())
}

pub async fn market_cache(api: &ApiClient) -> anyhow::Result<()> {
    let status = api
        .market_cache_status()
        .await
        .map_err(|err| err.surface("Failed to load cache status"))?;
    print_json(&status)
}

pub async fn market_refresh(api: &ApiClient) -> anyhow::Result<()> {
    let result = api
        .refresh_market()
        .await
        .map_err(|err| err.surface("Failed to refresh prices"))?;
    print_json(&result)
}

/// Polls the market snapshot every `period` until Ctrl-C.
pub async fn market_watch(api: &ApiClient, period: Duration, query: String, trend: Option<Trend>) {
    let api = api.clone();
    let refresher = Refresher::new(move || {
        let api = api.clone();
        let query = query.clone();
        async move {
            match api.market_snapshot().await {
                Ok(snapshot) => {
                    println!("--- {} ---", chrono::Local::now().format("%H:%M:%S"));
                    print_snapshot(&snapshot, &query, trend);
                }
                Err(err) => tracing::warn!(error = %err, "market refresh failed"),
            }
        }
    });

    tracing::info!(every_secs = period.as_secs(), "watching market prices; Ctrl-C to stop");
    refresher
        .run_until(period, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;
    if refresher.in_flight() {
        tracing::debug!("stopped with a refresh still in flight");
    }
}

pub async fn recommend(api: &ApiClient, soil: &SoilInput) -> anyhow::Result<()> {
    let result = api
        .recommend_crops(soil)
        .await
        .map_err(|err| err.surface("Prediction failed"))?;
    print_json(&result)
}

pub async fn fertilizer_crops(api: &ApiClient) -> anyhow::Result<()> {
    let crops = api
        .calculator_crops()
        .await
        .map_err(|err| err.surface("Failed to load crops"))?;
    print_json(&crops)
}

pub async fn soil_guide(api: &ApiClient) -> anyhow::Result<()> {
    let guide = api
        .soil_guide()
        .await
        .map_err(|err| err.surface("Failed to load soil guide"))?;
    print_json(&guide)
}

pub async fn fertilizer_calculate(api: &ApiClient, request: &FertilizerRequest) -> anyhow::Result<()> {
    let result = api
        .calculate_fertilizer(request)
        .await
        .map_err(|err| err.surface("Calculation failed"))?;
    print_json(&result)
}

pub async fn calendar_list(api: &ApiClient) -> anyhow::Result<()> {
    let calendar = api
        .calendar()
        .await
        .map_err(|err| err.surface("Failed to load calendar"))?;
    print_json(&calendar)
}

pub async fn calendar_month(api: &ApiClient, month: u32) -> anyhow::Result<()> {
    let tasks = api
        .monthly_tasks(month)
        .await
        .map_err(|err| err.surface("Failed to load monthly tasks"))?;
    print_json(&tasks)
}

pub async fn calendar_crop(api: &ApiClient, crop: &str) -> anyhow::Result<()> {
    let detail = api
        .crop_calendar(crop)
        .await
        .map_err(|err| err.surface("Crop not found"))?;
    print_json(&detail)
}

pub async fn calendar_companions(api: &ApiClient) -> anyhow::Result<()> {
    let guide = api
        .companion_planting()
        .await
        .map_err(|err| err.surface("Failed to load companion planting guide"))?;
    print_json(&guide)
}

pub async fn tips_list(api: &ApiClient, query: &str, category: Option<&str>) -> anyhow::Result<()> {
    let tips = api
        .tips()
        .await
        .map_err(|err| err.surface("Failed to load tips"))?;
    let matching = search::filter_tips(&tips, query, category);
    if matching.is_empty() {
        println!("No tips found.");
    }
    for tip in matching {
        println!(
            "#{:<3} {:<14} [{} / {}] {}",
            tip.id,
            tip.crop,
            tip.category.as_deref().unwrap_or("General"),
            tip.difficulty.as_deref().unwrap_or("-"),
            tip.summary
        );
    }
    Ok(())
}

pub async fn tips_crop(api: &ApiClient, crop: &str) -> anyhow::Result<()> {
    let guide = api
        .crop_tips(crop)
        .await
        .map_err(|err| err.surface("Crop not found"))?;
    print_json(&guide)
}

pub async fn history_list(
    api: &ApiClient,
    query: &str,
    kind: Option<&str>,
    csv: Option<&Path>,
) -> anyhow::Result<()> {
    let entries = api
        .history()
        .await
        .map_err(|err| err.surface("Failed to load history"))?;
    let matching = search::filter_history(&entries, query, kind);

    if let Some(path) = csv {
        let written = report::export_history_csv(&matching, path)
            .with_context(|| format!("failed to export history to {}", path.display()))?;
        println!("Exported {written} entries to {}.", path.display());
        return Ok(());
    }

    if matching.is_empty() {
        println!("No history entries.");
    }
    for entry in matching {
        println!(
            "#{:<5} {} [{}] {}",
            entry.id,
            entry.created_at.format("%Y-%m-%d %H:%M"),
            entry.result_type.as_deref().unwrap_or("-"),
            entry.query
        );
        if let Some(summary) = entry.result_summary.as_deref() {
            println!("       {summary}");
        }
    }
    Ok(())
}

pub async fn history_stats(api: &ApiClient) -> anyhow::Result<()> {
    let entries = api
        .history()
        .await
        .map_err(|err| err.surface("Failed to load history"))?;
    let stats = search::history_stats(&entries, chrono::Utc::now().naive_utc());
    println!("Total:      {}", stats.total);
    println!("Diagnoses:  {}", stats.diagnoses);
    println!("Searches:   {}", stats.searches);
    println!("This week:  {}", stats.this_week);
    println!("Healthy:    {}", stats.healthy);
    Ok(())
}

pub async fn history_delete(api: &ApiClient, id: i64) -> anyhow::Result<()> {
    let ack = api
        .delete_history_entry(id)
        .await
        .map_err(|err| err.surface("Failed to delete entry"))?;
    println!("{}", ack.message.as_deref().unwrap_or("Entry deleted"));
    Ok(())
}

pub async fn history_clear(api: &ApiClient) -> anyhow::Result<()> {
    let ack = api
        .clear_history()
        .await
        .map_err(|err| err.surface("Failed to clear history"))?;
    println!("{}", ack.message.as_deref().unwrap_or("History cleared"));
    Ok(())
}
