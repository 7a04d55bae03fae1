use std::path::Path;

use reqwest::multipart::{Form, Part};
use serde_json::Value;

use crate::client::ApiClient;
use crate::error::ClientError;
use crate::models::{
    Acknowledgement, ChatMessage, ChatReply, ChatRequest, ChatStatus, Comment, DiagnosisResult,
    FertilizerRequest, HistoryEntry, LikeCount, MarketPrice, NewComment, NewPost, Post,
    SoilInput, TipSummary, TopMovers,
};

pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;
const IMAGE_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("webp", "image/webp"),
];

/// Checks extension and size the way the upload widget does, returning the
/// mime type to send.
pub fn validate_image(path: &Path, size: u64) -> Result<&'static str, ClientError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    let mime = IMAGE_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime);

    match mime {
        Some(mime) if size <= MAX_UPLOAD_BYTES => Ok(mime),
        _ => Err(ClientError::Validation(
            "Invalid file. Use JPG/PNG/WebP under 10MB.".to_string(),
        )),
    }
}

pub struct MarketSnapshot {
    pub prices: Vec<MarketPrice>,
    pub movers: TopMovers,
    /// `None` when the cache-status call failed; that call is optional.
    pub cache_status: Option<Value>,
}

impl ApiClient {
    // Diagnosis

    pub async fn predict_disease(
        &self,
        image: &Path,
        crop_hint: Option<&str>,
    ) -> Result<DiagnosisResult, ClientError> {
        let size = tokio::fs::metadata(image).await?.len();
        let mime = validate_image(image, size)?;
        let bytes = tokio::fs::read(image).await?;
        let file_name = image
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("leaf.jpg")
            .to_string();

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime)
            .map_err(|source| ClientError::Transport {
                url: self.url("/diagnosis/predict"),
                source,
            })?;
        let mut form = Form::new().part("file", part);
        if let Some(hint) = crop_hint {
            form = form.text("crop_hint", hint.to_string());
        }
        self.post_multipart("/diagnosis/predict", form).await
    }

    pub async fn diagnosis_history(&self) -> Result<Vec<DiagnosisResult>, ClientError> {
        self.get("/diagnosis/history").await
    }

    pub async fn model_status(&self) -> Result<Value, ClientError> {
        self.get("/diagnosis/model-status").await
    }

    // Chatbot

    pub async fn send_chat(&self, message: &str) -> Result<ChatReply, ClientError> {
        self.post("/chatbot/message", &ChatRequest { message }).await
    }

    pub async fn chat_history(&self) -> Result<Vec<ChatMessage>, ClientError> {
        self.get("/chatbot/history").await
    }

    pub async fn clear_chat(&self) -> Result<Acknowledgement, ClientError> {
        self.delete("/chatbot/history").await
    }

    pub async fn chat_status(&self) -> Result<ChatStatus, ClientError> {
        self.get("/chatbot/status").await
    }

    // Community

    pub async fn posts(&self) -> Result<Vec<Post>, ClientError> {
        self.get("/community/posts").await
    }

    pub async fn create_post(&self, post: &NewPost) -> Result<Post, ClientError> {
        if post.title.trim().is_empty() || post.content.trim().is_empty() {
            return Err(ClientError::Validation(
                "Title and content are required".to_string(),
            ));
        }
        self.post("/community/posts", post).await
    }

    pub async fn like_post(&self, post_id: i64) -> Result<LikeCount, ClientError> {
        self.post_empty(&format!("/community/posts/{post_id}/like"))
            .await
    }

    pub async fn comment_on_post(&self, post_id: i64, content: &str) -> Result<Comment, ClientError> {
        if content.trim().is_empty() {
            return Err(ClientError::Validation("Comment cannot be empty".to_string()));
        }
        self.post(
            &format!("/community/posts/{post_id}/comments"),
            &NewComment { content },
        )
        .await
    }

    // Weather

    pub async fn current_weather(
        &self,
        city: &str,
        coordinates: Option<(f64, f64)>,
    ) -> Result<Value, ClientError> {
        match coordinates {
            Some((lat, lon)) => {
                self.get_query("/weather/current", &[("lat", lat), ("lon", lon)])
                    .await
            }
            None => self.get_query("/weather/current", &[("city", city)]).await,
        }
    }

    pub async fn weather_status(&self) -> Result<Value, ClientError> {
        self.get("/weather/status").await
    }

    // Market

    pub async fn market_prices(&self) -> Result<Vec<MarketPrice>, ClientError> {
        self.get("/market").await
    }

    pub async fn crop_price(&self, crop: &str) -> Result<Value, ClientError> {
        self.get(&format!("/market/{}", path_segment(crop))).await
    }

    pub async fn top_movers(&self) -> Result<TopMovers, ClientError> {
        self.get("/market/summary/top-movers").await
    }

    pub async fn market_cache_status(&self) -> Result<Value, ClientError> {
        self.get("/market/cache-status").await
    }

    pub async fn refresh_market(&self) -> Result<Value, ClientError> {
        self.get("/market/refresh").await
    }

    /// Prices, movers and cache status fetched together. A failing cache
    /// status does not fail the snapshot.
    pub async fn market_snapshot(&self) -> Result<MarketSnapshot, ClientError> {
        let (prices, movers, cache_status) = tokio::join!(
            self.market_prices(),
            self.top_movers(),
            self.market_cache_status()
        );
        let cache_status = match cache_status {
            Ok(status) => Some(status),
            Err(err) => {
                tracing::warn!(error = %err, "market cache status unavailable");
                None
            }
        };
        Ok(MarketSnapshot {
            prices: prices?,
            movers: movers?,
            cache_status,
        })
    }

    // Crop recommendation and fertilizer calculator

    pub async fn recommend_crops(&self, soil: &SoilInput) -> Result<Value, ClientError> {
        self.post("/crop-recommend/predict", soil).await
    }

    pub async fn calculator_crops(&self) -> Result<Value, ClientError> {
        self.get("/calculator/crops").await
    }

    pub async fn soil_guide(&self) -> Result<Value, ClientError> {
        self.get("/calculator/soil-guide").await
    }

    pub async fn calculate_fertilizer(&self, request: &FertilizerRequest) -> Result<Value, ClientError> {
        if request.area_hectares.is_nan() || request.area_hectares <= 0.0 {
            return Err(ClientError::Validation(
                "Area must be greater than zero".to_string(),
            ));
        }
        self.post("/calculator/calculate", request).await
    }

    // Crop calendar

    pub async fn calendar(&self) -> Result<Value, ClientError> {
        self.get("/calendar").await
    }

    pub async fn monthly_tasks(&self, month: u32) -> Result<Value, ClientError> {
        if !(1..=12).contains(&month) {
            return Err(ClientError::Validation(
                "Month must be between 1 and 12".to_string(),
            ));
        }
        self.get(&format!("/calendar/monthly/{month}")).await
    }

    pub async fn crop_calendar(&self, crop: &str) -> Result<Value, ClientError> {
        self.get(&format!("/calendar/crop/{}", path_segment(crop)))
            .await
    }

    pub async fn companion_planting(&self) -> Result<Value, ClientError> {
        self.get("/calendar/companion-planting").await
    }

    // Cultivation tips

    pub async fn tips(&self) -> Result<Vec<TipSummary>, ClientError> {
        self.get("/tips").await
    }

    pub async fn crop_tips(&self, crop: &str) -> Result<Value, ClientError> {
        self.get(&format!("/tips/crop/{}", path_segment(crop))).await
    }

    // History

    pub async fn history(&self) -> Result<Vec<HistoryEntry>, ClientError> {
        self.get("/history/").await
    }

    pub async fn delete_history_entry(&self, id: i64) -> Result<Acknowledgement, ClientError> {
        self.delete(&format!("/history/{id}")).await
    }

    pub async fn clear_history(&self) -> Result<Acknowledgement, ClientError> {
        self.delete("/history/").await
    }
}

fn path_segment(value: &str) -> String {
    value
        .trim()
        .bytes()
        .map(|byte| match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (byte as char).to_string()
            }
            _ => format!("%{byte:02X}"),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::spawn_backend;
    use crate::token_store::MemoryTokenStore;
    use axum::extract::{Multipart, Path as UrlPath, Query};
    use axum::http::StatusCode;
    use axum::routing::{delete, get, post};
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn price(crop: &str, trend: &str, change_pct: f64) -> Value {
        json!({
            "crop": crop, "emoji": "🌾", "unit": "USD/kg", "currency": "USD",
            "price": 0.42, "previous_price": 0.40, "change": 0.02,
            "change_pct": change_pct, "trend": trend,
            "data_source": "estimated", "last_updated": "2026-10-18T06:00:00Z"
        })
    }

    fn backend() -> Router {
        Router::new()
            .route(
                "/api/diagnosis/predict",
                post(|mut multipart: Multipart| async move {
                    let mut file_name = None;
                    let mut hint = None;
                    while let Some(field) = multipart.next_field().await.unwrap() {
                        match field.name() {
                            Some("file") => file_name = field.file_name().map(str::to_string),
                            Some("crop_hint") => hint = Some(field.text().await.unwrap()),
                            _ => {}
                        }
                    }
                    Json(json!({
                        "id": 1,
                        "image_url": format!("/uploads/diagnosis/{}", file_name.unwrap_or_default()),
                        "disease_name": "Tomato Late Blight",
                        "confidence": 0.93,
                        "crop_type": hint.unwrap_or_else(|| "Unknown".into()),
                        "recommendations": null,
                        "is_healthy": false,
                        "created_at": "2026-10-18T09:00:00",
                        "severity": {
                            "score": 71, "level": "Severe", "color": "#f97316",
                            "urgency": "Urgent treatment required within 24-48 hours",
                            "description": "Significant infection."
                        }
                    }))
                }),
            )
            .route("/api/market", get(|| async {
                Json(json!([price("Maize", "up", 2.5), price("Coffee", "down", -1.2)]))
            }))
            .route("/api/market/summary/top-movers", get(|| async {
                Json(json!({
                    "gainers": [{"crop": "Maize", "change_pct": 2.5, "trend": "up", "price": 0.42, "unit": "USD/kg"}],
                    "losers": [],
                    "timestamp": "2026-10-18T06:00:00Z"
                }))
            }))
            .route("/api/market/cache-status", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
            .route(
                "/api/weather/current",
                get(|Query(params): Query<HashMap<String, String>>| async move { Json(json!(params)) }),
            )
            .route(
                "/api/calendar/crop/:name",
                get(|UrlPath(name): UrlPath<String>| async move { Json(json!({ "crop": name })) }),
            )
            .route(
                "/api/history/:id",
                delete(|UrlPath(id): UrlPath<i64>| async move {
                    if id == 3 {
                        Ok(Json(json!({ "message": "Deleted" })))
                    } else {
                        Err((StatusCode::NOT_FOUND, Json(json!({ "detail": "History item not found" }))))
                    }
                }),
            )
    }

    async fn client() -> ApiClient {
        let base = spawn_backend(backend()).await;
        ApiClient::new(&base, Arc::new(MemoryTokenStore::new(Some("tok"))))
    }

    #[test]
    fn image_validation_checks_extension_and_size() {
        assert_eq!(validate_image(Path::new("leaf.JPG"), 1024).unwrap(), "image/jpeg");
        assert_eq!(validate_image(Path::new("leaf.webp"), 1024).unwrap(), "image/webp");
        assert!(validate_image(Path::new("leaf.gif"), 1024).is_err());
        assert!(validate_image(Path::new("leaf"), 1024).is_err());
        assert!(validate_image(Path::new("leaf.png"), MAX_UPLOAD_BYTES + 1).is_err());
        assert!(validate_image(Path::new("leaf.png"), MAX_UPLOAD_BYTES).is_ok());
    }

    #[test]
    fn path_segments_are_escaped() {
        assert_eq!(path_segment("Maize"), "Maize");
        assert_eq!(path_segment(" sweet potato "), "sweet%20potato");
    }

    #[tokio::test]
    async fn uploads_image_with_crop_hint() {
        let dir = tempfile::tempdir().unwrap();
        let image: PathBuf = dir.path().join("leaf.png");
        std::fs::write(&image, [0x89, b'P', b'N', b'G']).unwrap();

        let result = client().await.predict_disease(&image, Some("Tomato")).await.unwrap();
        assert_eq!(result.disease_name.as_deref(), Some("Tomato Late Blight"));
        assert_eq!(result.crop_type.as_deref(), Some("Tomato"));
        assert_eq!(result.image_url.as_deref(), Some("/uploads/diagnosis/leaf.png"));
        assert_eq!(result.severity.map(|s| s.score), Some(71));
    }

    #[tokio::test]
    async fn rejects_unsupported_upload_before_sending() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("leaf.bmp");
        std::fs::write(&image, b"BM").unwrap();

        let err = client().await.predict_disease(&image, None).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected_from_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("leaf.jpg");
        // sparse file: the size is reported without the bytes existing
        std::fs::File::create(&image)
            .unwrap()
            .set_len(MAX_UPLOAD_BYTES + 1)
            .unwrap();

        let err = client().await.predict_disease(&image, None).await.unwrap_err();
        assert_eq!(
            err.user_message(""),
            "Invalid file. Use JPG/PNG/WebP under 10MB."
        );
    }

    #[tokio::test]
    async fn missing_upload_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = client()
            .await
            .predict_disease(&dir.path().join("gone.png"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Io(_)));
    }

    #[tokio::test]
    async fn snapshot_tolerates_missing_cache_status() {
        let snapshot = client().await.market_snapshot().await.unwrap();
        assert_eq!(snapshot.prices.len(), 2);
        assert_eq!(snapshot.movers.gainers[0].crop, "Maize");
        assert!(snapshot.cache_status.is_none());
    }

    #[tokio::test]
    async fn weather_prefers_coordinates() {
        let api = client().await;
        let by_city = api.current_weather("Nairobi", None).await.unwrap();
        assert_eq!(by_city["city"], "Nairobi");

        let by_coords = api.current_weather("Nairobi", Some((-1.29, 36.82))).await.unwrap();
        assert_eq!(by_coords["lat"], "-1.29");
        assert!(by_coords.get("city").is_none());
    }

    #[tokio::test]
    async fn crop_names_are_path_escaped() {
        let detail = client().await.crop_calendar("sweet potato").await.unwrap();
        assert_eq!(detail["crop"], "sweet potato");
    }

    #[tokio::test]
    async fn month_is_validated_locally() {
        let err = client().await.monthly_tasks(13).await.unwrap_err();
        assert_eq!(err.user_message(""), "Month must be between 1 and 12");
    }

    #[tokio::test]
    async fn history_delete_reports_missing_entry() {
        let api = client().await;
        assert_eq!(
            api.delete_history_entry(3).await.unwrap().message.as_deref(),
            Some("Deleted")
        );
        let err = api.delete_history_entry(4).await.unwrap_err();
        assert_eq!(err.user_message("Delete failed"), "History item not found");
    }

    #[tokio::test]
    async fn empty_post_is_rejected() {
        let post = NewPost {
            title: " ".into(),
            content: "Aphids on kale".into(),
            image_url: None,
            tags: None,
        };
        let err = client().await.create_post(&post).await.unwrap_err();
        assert_eq!(err.user_message(""), "Title and content are required");
    }
}
