use std::path::PathBuf;
use std::sync::Arc;

use clap::{ArgGroup, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod auth;
mod client;
mod commands;
mod config;
mod endpoints;
mod error;
mod knowledge;
mod models;
mod refresh;
mod report;
mod search;
mod severity;
mod token_store;

use crate::auth::AuthService;
use crate::client::ApiClient;
use crate::config::Config;
use crate::models::Trend;
use crate::token_store::{FileTokenStore, TokenStore};

#[derive(Parser)]
#[command(name = "leafscan")]
#[command(about = "Terminal client for the LeafScan crop health assistant", long_about = None)]
#[command(version)]
struct Cli {
    /// Base url of the LeafScan API, including the /api prefix
    #[arg(long, global = true, env = "LEAFSCAN_API_URL", default_value = config::DEFAULT_API_URL)]
    api_url: String,
    /// Where the session token is kept between runs
    #[arg(long, global = true, env = "LEAFSCAN_TOKEN_FILE")]
    token_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "LEAFSCAN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "LEAFSCAN_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        full_name: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Update profile fields
    Profile {
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        avatar_url: Option<String>,
    },
    /// Look up a disease in the offline knowledge base
    Lookup {
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },
    /// Classify severity of a disease name offline
    Severity {
        #[arg(num_args = 0..)]
        name: Vec<String>,
        #[arg(long)]
        healthy: bool,
    },
    /// Upload a leaf photo for disease diagnosis
    Diagnose {
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        crop_hint: Option<String>,
        /// Also write a markdown report to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// List past diagnoses
    Diagnoses,
    /// Show whether the diagnosis model is loaded
    ModelStatus,
    /// Talk to the farming assistant
    Chat {
        #[command(subcommand)]
        action: ChatCommand,
    },
    /// Community posts
    Community {
        #[command(subcommand)]
        action: CommunityCommand,
    },
    /// Current weather and farming alerts
    #[command(group(
        ArgGroup::new("place")
            .args(["city", "lat"])
            .multiple(false)
    ))]
    Weather {
        #[arg(long)]
        city: Option<String>,
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
        /// Show API configuration status instead
        #[arg(long)]
        status: bool,
    },
    /// Crop market prices
    Market {
        #[command(subcommand)]
        action: MarketCommand,
    },
    /// Recommend crops for soil and climate readings
    Recommend {
        #[arg(long)]
        nitrogen: f64,
        #[arg(long)]
        phosphorus: f64,
        #[arg(long)]
        potassium: f64,
        #[arg(long)]
        temperature: f64,
        #[arg(long)]
        humidity: f64,
        #[arg(long)]
        ph: f64,
        #[arg(long)]
        rainfall: f64,
        #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u8).range(1..=5))]
        top: u8,
    },
    /// Fertilizer calculator
    Fertilizer {
        #[command(subcommand)]
        action: FertilizerCommand,
    },
    /// Crop calendar
    Calendar {
        #[command(subcommand)]
        action: CalendarCommand,
    },
    /// Cultivation tips
    Tips {
        #[command(subcommand)]
        action: TipsCommand,
    },
    /// Search and diagnosis history
    History {
        #[command(subcommand)]
        action: HistoryCommand,
    },
}

#[derive(Subcommand)]
enum ChatCommand {
    /// Send a message
    Send {
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
    /// Show the conversation so far
    History,
    /// Delete the conversation
    Clear,
    /// Show which language model is active
    Status,
}

#[derive(Subcommand)]
enum CommunityCommand {
    /// List posts, optionally filtered
    List {
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Publish a post
    Post {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        /// Comma separated
        #[arg(long)]
        tags: Option<String>,
        #[arg(long)]
        image_url: Option<String>,
    },
    /// Like a post
    Like { id: i64 },
    /// Comment on a post
    Comment {
        id: i64,
        #[arg(long)]
        content: String,
    },
}

#[derive(Subcommand)]
enum MarketCommand {
    /// Current prices
    List {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, value_enum)]
        trend: Option<Trend>,
    },
    /// Detail for one crop
    Show { crop: String },
    /// Biggest gainers and losers
    Movers,
    /// Price cache status
    Cache,
    /// Force the backend to refetch live prices
    Refresh,
    /// Keep prices on screen, refreshing periodically until Ctrl-C
    Watch {
        #[arg(long, default_value_t = config::DEFAULT_REFRESH_SECS)]
        interval_secs: u64,
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, value_enum)]
        trend: Option<Trend>,
    },
}

#[derive(Subcommand)]
enum FertilizerCommand {
    /// Crops the calculator supports
    Crops,
    /// Soil type guide
    SoilGuide,
    /// Compute fertilizer quantities
    Calculate {
        #[arg(long)]
        crop: String,
        #[arg(long)]
        area: f64,
        #[arg(long, default_value = "Loamy")]
        soil_type: String,
        #[arg(long, default_value_t = 6.5)]
        soil_ph: f64,
        #[arg(long, default_value = "medium")]
        organic_matter: String,
    },
}

#[derive(Subcommand)]
enum CalendarCommand {
    /// All crops with season info
    List,
    /// Tasks for a month (1-12)
    Month { month: u32 },
    /// Full calendar for one crop
    Crop { name: String },
    /// Companion planting guide
    Companions,
}

#[derive(Subcommand)]
enum TipsCommand {
    /// List tips, optionally filtered
    List {
        #[arg(long, default_value = "")]
        search: String,
        /// Only tips in this category (e.g. Grain, Vegetable); "All" keeps every one
        #[arg(long)]
        category: Option<String>,
    },
    /// Full guide for one crop
    Crop { name: String },
}

#[derive(Subcommand)]
enum HistoryCommand {
    /// List entries
    List {
        #[arg(long, default_value = "")]
        search: String,
        /// Only entries of this result type (diagnosis, search, crop_recommendation)
        #[arg(long)]
        kind: Option<String>,
        /// Export the listed entries to CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Delete one entry
    Delete { id: i64 },
    /// Delete every entry
    Clear,
    /// Totals by kind, this week and healthy results
    Stats,
}

impl Commands {
    /// Commands that run against the API check the stored token first.
    fn restores_session(&self) -> bool {
        !matches!(
            self,
            Commands::Login { .. }
                | Commands::Register { .. }
                | Commands::Logout
                | Commands::Lookup { .. }
                | Commands::Severity { .. }
        )
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = Config::new(&cli.api_url, cli.token_file);
    let token_store = FileTokenStore::new(config.token_file.clone());
    tracing::debug!(
        version = config::APP_VERSION,
        token_file = %token_store.path().display(),
        "starting"
    );

    let tokens: Arc<dyn TokenStore> = Arc::new(token_store);
    let api = ApiClient::new(&config.api_url, tokens.clone());
    tracing::debug!(api = api.base_url(), "api client ready");
    let mut auth = AuthService::new(api, tokens);

    if cli.command.restores_session() {
        auth.restore().await;
    }

    match cli.command {
        Commands::Login { email, password } => {
            commands::login(&mut auth, &email, &password).await?;
        }
        Commands::Register {
            username,
            email,
            password,
            full_name,
        } => {
            commands::register(&mut auth, &username, &email, &password, full_name.as_deref())
                .await?;
        }
        Commands::Logout => {
            auth.logout();
            println!("Logged out successfully.");
        }
        Commands::Whoami => commands::whoami(&auth),
        Commands::Profile {
            full_name,
            bio,
            location,
            avatar_url,
        } => {
            let update = models::ProfileUpdate {
                full_name,
                bio,
                location,
                avatar_url,
            };
            commands::update_profile(&mut auth, &update).await?;
        }
        Commands::Lookup { name } => commands::lookup(&name.join(" ")),
        Commands::Severity { name, healthy } => {
            let name = name.join(" ");
            commands::severity(healthy, (!name.is_empty()).then_some(name.as_str()));
        }
        Commands::Diagnose {
            image,
            crop_hint,
            report,
        } => {
            commands::diagnose(auth.api(), &image, crop_hint.as_deref(), report.as_deref())
                .await?;
        }
        Commands::Diagnoses => commands::diagnoses(auth.api()).await?,
        Commands::ModelStatus => commands::model_status(auth.api()).await?,
        Commands::Chat { action } => match action {
            ChatCommand::Send { message } => {
                commands::chat_send(auth.api(), &message.join(" ")).await?
            }
            ChatCommand::History => commands::chat_history(auth.api()).await?,
            ChatCommand::Clear => commands::chat_clear(auth.api()).await?,
            ChatCommand::Status => commands::chat_status(auth.api()).await?,
        },
        Commands::Community { action } => match action {
            CommunityCommand::List { search } => {
                commands::community_list(auth.api(), &search).await?
            }
            CommunityCommand::Post {
                title,
                content,
                tags,
                image_url,
            } => {
                let post = models::NewPost {
                    title,
                    content,
                    image_url,
                    tags,
                };
                commands::community_post(auth.api(), &post).await?
            }
            CommunityCommand::Like { id } => commands::community_like(auth.api(), id).await?,
            CommunityCommand::Comment { id, content } => {
                commands::community_comment(auth.api(), id, &content).await?
            }
        },
        Commands::Weather {
            city,
            lat,
            lon,
            status,
        } => {
            if status {
                commands::weather_status(auth.api()).await?;
            } else {
                let coordinates = lat.zip(lon);
                let city = city.as_deref().unwrap_or("Nairobi");
                commands::weather(auth.api(), city, coordinates).await?;
            }
        }
        Commands::Market { action } => match action {
            MarketCommand::List { search, trend } => {
                commands::market_list(auth.api(), &search, trend).await?
            }
            MarketCommand::Show { crop } => commands::market_show(auth.api(), &crop).await?,
            MarketCommand::Movers => commands::market_movers(auth.api()).await?,
            MarketCommand::Cache => commands::market_cache(auth.api()).await?,
            MarketCommand::Refresh => commands::market_refresh(auth.api()).await?,
            MarketCommand::Watch {
                interval_secs,
                search,
                trend,
            } => {
                commands::market_watch(
                    auth.api(),
                    config::refresh_period(interval_secs),
                    search,
                    trend,
                )
                .await
            }
        },
        Commands::Recommend {
            nitrogen,
            phosphorus,
            potassium,
            temperature,
            humidity,
            ph,
            rainfall,
            top,
        } => {
            let soil = models::SoilInput {
                nitrogen,
                phosphorus,
                potassium,
                temperature,
                humidity,
                ph,
                rainfall,
                top_n: top,
            };
            commands::recommend(auth.api(), &soil).await?;
        }
        Commands::Fertilizer { action } => match action {
            FertilizerCommand::Crops => commands::fertilizer_crops(auth.api()).await?,
            FertilizerCommand::SoilGuide => commands::soil_guide(auth.api()).await?,
            FertilizerCommand::Calculate {
                crop,
                area,
                soil_type,
                soil_ph,
                organic_matter,
            } => {
                let request = models::FertilizerRequest {
                    crop,
                    area_hectares: area,
                    soil_type,
                    soil_ph,
                    organic_matter,
                };
                commands::fertilizer_calculate(auth.api(), &request).await?
            }
        },
        Commands::Calendar { action } => match action {
            CalendarCommand::List => commands::calendar_list(auth.api()).await?,
            CalendarCommand::Month { month } => {
                commands::calendar_month(auth.api(), month).await?
            }
            CalendarCommand::Crop { name } => commands::calendar_crop(auth.api(), &name).await?,
            CalendarCommand::Companions => commands::calendar_companions(auth.api()).await?,
        },
        Commands::Tips { action } => match action {
            TipsCommand::List { search, category } => {
                commands::tips_list(auth.api(), &search, category.as_deref()).await?
            }
            TipsCommand::Crop { name } => commands::tips_crop(auth.api(), &name).await?,
        },
        Commands::History { action } => match action {
            HistoryCommand::List { search, kind, csv } => {
                commands::history_list(auth.api(), &search, kind.as_deref(), csv.as_deref())
                    .await?
            }
            HistoryCommand::Delete { id } => commands::history_delete(auth.api(), id).await?,
            HistoryCommand::Clear => commands::history_clear(auth.api()).await?,
            HistoryCommand::Stats => commands::history_stats(auth.api()).await?,
        },
    }

    Ok(())
}
