use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("server returned {status}{}", format_detail(.detail))]
    Server { status: u16, detail: Option<String> },

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("{0}")]
    Validation(String),

    #[error("not signed in; run `leafscan login` first")]
    NotSignedIn,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Message shown to the user: the server's own detail or the validation
    /// text when there is one, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Server {
                detail: Some(detail),
                ..
            } => detail.clone(),
            Self::Validation(message) => message.clone(),
            Self::NotSignedIn => self.to_string(),
            _ => fallback.to_string(),
        }
    }

    /// Converts into the CLI error, logging the underlying cause.
    pub fn surface(self, fallback: &str) -> anyhow::Error {
        tracing::debug!(error = %self, "request failed");
        anyhow::anyhow!(self.user_message(fallback))
    }
}

fn format_detail(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|detail| format!(": {detail}"))
        .unwrap_or_default()
}

/// Pulls `detail` out of a FastAPI-style error body. Validation errors carry
/// a list of objects; those are joined by their `msg` fields.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(detail) => Some(detail.clone()),
        serde_json::Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|msg| msg.as_str()))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}
