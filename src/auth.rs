use std::sync::Arc;

use crate::client::ApiClient;
use crate::error::ClientError;
use crate::models::{Credentials, ProfileUpdate, Registration, TokenResponse, User};
use crate::token_store::TokenStore;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Signed-in state. Only `AuthService` writes it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    token: Option<String>,
    user: Option<User>,
}

impl Session {
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.token.is_some()
    }

    fn sign_in(&mut self, token: String, user: User) {
        self.token = Some(token);
        self.user = Some(user);
    }

    fn clear(&mut self) {
        self.token = None;
        self.user = None;
    }
}

pub struct AuthService {
    api: ApiClient,
    tokens: Arc<dyn TokenStore>,
    session: Session,
}

impl AuthService {
    /// Builds the service with whatever token is already persisted. The user
    /// stays unknown until `restore` confirms the token.
    pub fn new(api: ApiClient, tokens: Arc<dyn TokenStore>) -> Self {
        let token = tokens.load().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "could not read stored token");
            None
        });
        Self {
            api,
            tokens,
            session: Session { token, user: None },
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Startup identity check. A rejected or unreachable token is dropped
    /// without surfacing an error.
    pub async fn restore(&mut self) -> Option<&User> {
        self.session.token()?;

        match self.api.get::<User>("/auth/me").await {
            Ok(user) => {
                tracing::debug!(username = %user.username, "session restored");
                self.session.user = Some(user);
            }
            Err(err) => {
                tracing::debug!(error = %err, "stored token rejected; signing out");
                self.reset();
            }
        }
        self.session.user()
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<User, ClientError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(ClientError::Validation(
                "Please fill in all fields".to_string(),
            ));
        }

        let response: TokenResponse = self
            .api
            .post("/auth/login", &Credentials { email, password })
            .await?;
        self.accept(response)
    }

    pub async fn register(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<User, ClientError> {
        if username.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
            return Err(ClientError::Validation(
                "Please fill in all required fields".to_string(),
            ));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ClientError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let response: TokenResponse = self
            .api
            .post(
                "/auth/register",
                &Registration {
                    username,
                    email,
                    password,
                    full_name: full_name.filter(|name| !name.trim().is_empty()),
                },
            )
            .await?;
        self.accept(response)
    }

    pub fn logout(&mut self) {
        self.reset();
        tracing::info!("signed out");
    }

    pub async fn update_profile(&mut self, update: &ProfileUpdate) -> Result<User, ClientError> {
        if !self.session.is_signed_in() {
            return Err(ClientError::NotSignedIn);
        }
        let user: User = self.api.put("/auth/me", update).await?;
        self.session.user = Some(user.clone());
        Ok(user)
    }

    fn accept(&mut self, response: TokenResponse) -> Result<User, ClientError> {
        self.tokens.save(&response.access_token)?;
        tracing::info!(
            username = %response.user.username,
            token_type = response.token_type.as_deref().unwrap_or("bearer"),
            "signed in"
        );
        let user = response.user.clone();
        self.session.sign_in(response.access_token, response.user);
        Ok(user)
    }

    fn reset(&mut self) {
        self.session.clear();
        if let Err(err) = self.tokens.clear() {
            tracing::warn!(error = %err, "could not remove stored token");
        }
    }
}
