use std::path::PathBuf;
use std::time::Duration;

pub const APP_NAME: &str = "leafscan";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_REFRESH_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub token_file: PathBuf,
}

impl Config {
    pub fn new(api_url: &str, token_file: Option<PathBuf>) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            token_file: token_file.unwrap_or_else(default_token_file),
        }
    }
}

/// `<config dir>/leafscan/token`, or `./.leafscan/token` when the platform
/// has no config directory.
pub fn default_token_file() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join(APP_NAME))
        .unwrap_or_else(|| PathBuf::from(format!(".{APP_NAME}")))
        .join("token")
}

pub fn default_log_filter() -> &'static str {
    "leafscan=info"
}

pub fn refresh_period(secs: u64) -> Duration {
    Duration::from_secs(secs.max(1))
}
