use chrono::{Duration, NaiveDateTime};

use crate::models::{HistoryEntry, MarketPrice, Post, TipSummary, Trend};

pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

pub fn filter_posts<'a>(posts: &'a [Post], query: &str) -> Vec<&'a Post> {
    posts
        .iter()
        .filter(|post| {
            contains_ci(&post.title, query)
                || contains_ci(&post.content, query)
                || post.tags.as_deref().is_some_and(|tags| contains_ci(tags, query))
        })
        .collect()
}

pub fn filter_history<'a>(
    entries: &'a [HistoryEntry],
    query: &str,
    result_type: Option<&str>,
) -> Vec<&'a HistoryEntry> {
    entries
        .iter()
        .filter(|entry| {
            let matches_search = contains_ci(&entry.query, query)
                || entry
                    .result_summary
                    .as_deref()
                    .is_some_and(|summary| contains_ci(summary, query));
            let matches_type = match result_type {
                None => true,
                Some(kind) => entry.result_type.as_deref() == Some(kind),
            };
            matches_search && matches_type
        })
        .collect()
}

pub fn filter_prices<'a>(
    prices: &'a [MarketPrice],
    query: &str,
    trend: Option<Trend>,
) -> Vec<&'a MarketPrice> {
    prices
        .iter()
        .filter(|price| contains_ci(&price.crop, query))
        .filter(|price| trend.map_or(true, |trend| price.trend == trend))
        .collect()
}

/// `category` of `None` or "All" keeps every category; otherwise it must equal
/// the tip's category, ignoring case.
pub fn filter_tips<'a>(
    tips: &'a [TipSummary],
    query: &str,
    category: Option<&str>,
) -> Vec<&'a TipSummary> {
    tips.iter()
        .filter(|tip| contains_ci(&tip.crop, query) || contains_ci(&tip.summary, query))
        .filter(|tip| {
            category
                .filter(|wanted| !wanted.eq_ignore_ascii_case("all"))
                .map_or(true, |wanted| {
                tip.category
                    .as_deref()
                    .is_some_and(|category| category.eq_ignore_ascii_case(wanted))
            })
        })
        .collect()
}

pub fn is_healthy_entry(entry: &HistoryEntry) -> bool {
    entry
        .result_summary
        .as_deref()
        .is_some_and(|summary| contains_ci(summary, "healthy"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HistoryStats {
    pub total: usize,
    pub diagnoses: usize,
    pub searches: usize,
    pub this_week: usize,
    pub healthy: usize,
}

pub fn history_stats(entries: &[HistoryEntry], now: NaiveDateTime) -> HistoryStats {
    let week_ago = now - Duration::days(7);
    entries.iter().fold(
        HistoryStats {
            total: entries.len(),
            ..HistoryStats::default()
        },
        |mut stats, entry| {
            match entry.result_type.as_deref() {
                Some("diagnosis") => stats.diagnoses += 1,
                Some("search") => stats.searches += 1,
                _ => {}
            }
            if entry.created_at > week_ago {
                stats.this_week += 1;
            }
            if is_healthy_entry(entry) {
                stats.healthy += 1;
            }
            stats
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use chrono::NaiveDate;

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, day)
            .and_then(|date| date.and_hms_opt(9, 0, 0))
            .unwrap()
    }

    fn entry(id: i64, query: &str, kind: &str, summary: &str, day: u32) -> HistoryEntry {
        HistoryEntry {
            id,
            query: query.to_string(),
            result_type: Some(kind.to_string()),
            result_summary: Some(summary.to_string()),
            image_url: None,
            created_at: at(day),
        }
    }

    fn sample_history() -> Vec<HistoryEntry> {
        vec![
            entry(1, "Diagnosis: Tomato Late Blight", "diagnosis", "Tomato — Late Blight (93.0% confidence) | Severity: Severe", 17),
            entry(2, "Diagnosis: Healthy", "diagnosis", "Maize — Healthy (88.1% confidence) | Severity: Healthy", 2),
            entry(3, "maize fertilizer", "search", "Urea 120 kg/ha", 15),
        ]
    }

    fn post(title: &str, content: &str, tags: Option<&str>) -> Post {
        Post {
            id: 1,
            title: title.to_string(),
            content: content.to_string(),
            image_url: None,
            tags: tags.map(str::to_string),
            likes_count: 0,
            author: User {
                id: 1,
                username: "amina".to_string(),
                email: "amina@example.com".to_string(),
                full_name: None,
                avatar_url: None,
                bio: None,
                location: None,
                created_at: at(1),
            },
            comments: Vec::new(),
            created_at: at(1),
        }
    }

    #[test]
    fn posts_match_title_content_or_tags() {
        let posts = vec![
            post("Aphids everywhere", "Neem oil worked", None),
            post("Harvest tips", "Dry beans well", Some("beans,storage")),
            post("Irrigation", "Drip lines", None),
        ];
        assert_eq!(filter_posts(&posts, "NEEM").len(), 1);
        assert_eq!(filter_posts(&posts, "storage")[0].title, "Harvest tips");
        assert_eq!(filter_posts(&posts, "").len(), 3);
        assert_eq!(posts[1].tag_list(), vec!["beans", "storage"]);
    }

    #[test]
    fn history_search_and_type_filter_combine() {
        let history = sample_history();
        assert_eq!(filter_history(&history, "maize", None).len(), 2);
        let only_search = filter_history(&history, "maize", Some("search"));
        assert_eq!(only_search.len(), 1);
        assert_eq!(only_search[0].id, 3);
        assert!(filter_history(&history, "blight", Some("search")).is_empty());
    }

    #[test]
    fn stats_count_kinds_week_and_healthy() {
        let stats = history_stats(&sample_history(), at(18));
        assert_eq!(
            stats,
            HistoryStats {
                total: 3,
                diagnoses: 2,
                searches: 1,
                this_week: 2,
                healthy: 1,
            }
        );
    }

    #[test]
    fn prices_filter_by_name_and_trend() {
        let make = |crop: &str, trend: Trend| MarketPrice {
            crop: crop.to_string(),
            emoji: None,
            unit: "USD/kg".to_string(),
            price: 1.0,
            change_pct: 0.0,
            trend,
            data_source: None,
            last_updated: None,
        };
        let prices = vec![
            make("Maize", Trend::Up),
            make("Sorghum", Trend::Down),
            make("Rice", Trend::Up),
        ];
        assert_eq!(filter_prices(&prices, "", Some(Trend::Up)).len(), 2);
        assert_eq!(filter_prices(&prices, "sorg", None)[0].crop, "Sorghum");
        assert!(filter_prices(&prices, "sorg", Some(Trend::Up)).is_empty());
    }

    fn tip(id: i64, crop: &str, category: Option<&str>, summary: &str) -> TipSummary {
        TipSummary {
            id,
            crop: crop.to_string(),
            category: category.map(str::to_string),
            difficulty: Some("Medium".to_string()),
            summary: summary.to_string(),
        }
    }

    #[test]
    fn tips_match_crop_or_summary() {
        let tips = vec![tip(1, "Tomato", Some("Vegetables"), "Tomatoes thrive in warm, sunny conditions.")];
        assert_eq!(filter_tips(&tips, "sunny", None).len(), 1);
        assert!(filter_tips(&tips, "potato", None).is_empty());
    }

    #[test]
    fn tips_category_combines_with_search() {
        let tips = vec![
            tip(1, "Tomato", Some("Vegetables"), "Stake early and prune suckers."),
            tip(2, "Maize", Some("Cereals"), "Plant at the onset of rains."),
            tip(3, "Rice", Some("Cereals"), "Keep paddies flooded early."),
            tip(4, "Mint", None, "Grows fast in moist soil."),
        ];
        let cereals = filter_tips(&tips, "", Some("cereals"));
        assert_eq!(cereals.iter().map(|t| t.id).collect::<Vec<_>>(), vec![2, 3]);

        let early_cereals = filter_tips(&tips, "early", Some("Cereals"));
        assert_eq!(early_cereals.len(), 1);
        assert_eq!(early_cereals[0].crop, "Rice");

        assert!(filter_tips(&tips, "mint", Some("Herbs")).is_empty());
        assert_eq!(filter_tips(&tips, "", None).len(), 4);
        assert_eq!(filter_tips(&tips, "", Some("All")).len(), 4);
    }
}
