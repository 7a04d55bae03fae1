//! Thin HTTP wrapper around the LeafScan API.
//!
//! Every request re-reads the token store and attaches a bearer header when
//! a token is present. No timeout is configured; requests use reqwest's
//! defaults. Failed requests are never retried.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{extract_detail, ClientError};
use crate::token_store::TokenStore;

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl ApiClient {
    pub fn new(base_url: &str, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match self.tokens.load() {
            Ok(Some(token)) => builder.bearer_auth(token),
            Ok(None) => builder,
            Err(err) => {
                tracing::warn!(error = %err, "could not read stored token; sending unauthenticated");
                builder
            }
        }
    }

    pub async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let response = self.execute(builder).await?;
        let body = response.text().await.map_err(|source| ClientError::Transport {
            url: self.base_url.clone(),
            source,
        })?;
        serde_json::from_str(&body).map_err(|err| ClientError::Decode(err.to_string()))
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Response, ClientError> {
        let request = builder.build().map_err(|source| ClientError::Transport {
            url: self.base_url.clone(),
            source,
        })?;
        let url = request.url().to_string();
        tracing::debug!(method = %request.method(), url = %url, "api request");

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|source| ClientError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), url = %url, "api error response");
            return Err(ClientError::Server {
                status: status.as_u16(),
                detail: extract_detail(&body),
            });
        }
        Ok(response)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send(self.request(Method::GET, path)).await
    }

    pub async fn get_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send(self.request(Method::GET, path).query(query)).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send(self.request(Method::POST, path)).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(self.request(Method::PUT, path).json(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send(self.request(Method::DELETE, path)).await
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, ClientError> {
        self.send(self.request(Method::POST, path).multipart(form)).await
    }
}


#[cfg(test)]
mod tests {
    use super::testing::spawn_backend;
    use super::*;
    use crate::token_store::MemoryTokenStore;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    fn echo_auth_router() -> Router {
        Router::new()
            .route(
                "/api/echo",
                get(|headers: HeaderMap| async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|value| value.to_str().ok())
                        .map(str::to_string);
                    Json(json!({ "authorization": auth }))
                }),
            )
            .route(
                "/api/fail",
                get(|| async {
                    (
                        StatusCode::BAD_REQUEST,
                        Json(json!({ "detail": "Crop 'Kale' not supported." })),
                    )
                }),
            )
            .route(
                "/api/broken",
                get(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
            )
    }

    #[tokio::test]
    async fn attaches_bearer_token_from_store() {
        let base = spawn_backend(echo_auth_router()).await;
        let client = ApiClient::new(&base, Arc::new(MemoryTokenStore::new(Some("tok-1"))));

        let echoed: Value = client.get("/echo").await.unwrap();
        assert_eq!(echoed["authorization"], "Bearer tok-1");
    }

    #[tokio::test]
    async fn rereads_store_for_each_request() {
        let base = spawn_backend(echo_auth_router()).await;
        let store = Arc::new(MemoryTokenStore::new(None));
        let client = ApiClient::new(&base, store.clone());

        let echoed: Value = client.get("/echo").await.unwrap();
        assert!(echoed["authorization"].is_null());

        store.save("tok-2").unwrap();
        let echoed: Value = client.get("/echo").await.unwrap();
        assert_eq!(echoed["authorization"], "Bearer tok-2");
    }

    #[tokio::test]
    async fn server_error_carries_detail() {
        let base = spawn_backend(echo_auth_router()).await;
        let client = ApiClient::new(&base, Arc::new(MemoryTokenStore::new(None)));

        let err = client.get::<Value>("/fail").await.unwrap_err();
        assert_eq!(err.user_message("fallback"), "Crop 'Kale' not supported.");

        let err = client.get::<Value>("/broken").await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Server {
                status: 502,
                detail: None
            }
        ));
        assert_eq!(err.user_message("fallback"), "fallback");
    }

    #[tokio::test]
    async fn unreachable_backend_is_transport_error() {
        let client = ApiClient::new(
            "http://127.0.0.1:9/api",
            Arc::new(MemoryTokenStore::new(None)),
        );
        let err = client.get::<Value>("/echo").await.unwrap_err();
        assert!(matches!(err, ClientError::Transport { .. }));
    }
}
