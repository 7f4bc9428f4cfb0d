use crate::models::{CreateSessionRequest, SearchActorsResponse, SessionResponse, XrpcErrorResponse};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Header carrying the epoch second at which the remote rate limit resets
const RATE_LIMIT_RESET_HEADER: &str = "ratelimit-reset";

/// Errors that can occur when talking to a Bluesky service
#[derive(Debug, Error)]
pub enum BlueskyError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Rate limit exceeded (reset at {reset_at:?})")]
    RateLimited { reset_at: Option<i64> },

    #[error("Two-factor authentication code required")]
    AuthFactorTokenRequired,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not logged in")]
    NotAuthenticated,

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl BlueskyError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, BlueskyError::RateLimited { .. })
    }
}

/// Remote actor directory search
///
/// `cursor` continues from a previous page; a response without a cursor is
/// the last page.
#[async_trait]
pub trait ActorSearch: Send + Sync {
    async fn search_actors(
        &self,
        term: &str,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<SearchActorsResponse, BlueskyError>;
}

/// Bluesky XRPC client
///
/// Handles:
/// - Creating an authenticated session (with optional two-factor token)
/// - Searching the actor directory page by page
pub struct BlueskyClient {
    base_url: String,
    client: Client,
    session: Option<SessionResponse>,
}

impl BlueskyClient {
    /// Create a new client for the service at `base_url` (e.g. `https://bsky.social`)
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BlueskyError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("bsky-org-search/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
            session: None,
        })
    }

    /// Current session, if logged in
    pub fn session(&self) -> Option<&SessionResponse> {
        self.session.as_ref()
    }

    /// Use an existing session instead of logging in
    pub fn with_session(mut self, session: SessionResponse) -> Self {
        self.session = Some(session);
        self
    }

    /// Log in with an identifier (handle or email) and app password
    pub async fn login(
        &mut self,
        identifier: &str,
        password: &str,
    ) -> Result<&SessionResponse, BlueskyError> {
        self.login_with_token(identifier, password, None).await
    }

    /// Log in, passing the emailed two-factor code when the account requires one
    pub async fn login_with_token(
        &mut self,
        identifier: &str,
        password: &str,
        auth_factor_token: Option<&str>,
    ) -> Result<&SessionResponse, BlueskyError> {
        let url = self.xrpc_url("com.atproto.server.createSession");
        let body = CreateSessionRequest {
            identifier: identifier.to_string(),
            password: password.to_string(),
            auth_factor_token: auth_factor_token.map(str::to_string),
        };

        tracing::debug!("Creating session for {}", identifier);

        let response = self.client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let session: SessionResponse = response
            .json()
            .await
            .map_err(|e| BlueskyError::InvalidResponse(format!("Failed to parse session: {}", e)))?;

        tracing::debug!("Session created for {} ({})", session.handle, session.did);

        Ok(self.session.insert(session))
    }

    fn xrpc_url(&self, nsid: &str) -> String {
        format!("{}/xrpc/{}", self.base_url.trim_end_matches('/'), nsid)
    }
}

#[async_trait]
impl ActorSearch for BlueskyClient {
    async fn search_actors(
        &self,
        term: &str,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<SearchActorsResponse, BlueskyError> {
        let session = self.session.as_ref().ok_or(BlueskyError::NotAuthenticated)?;

        let mut url = format!(
            "{}?q={}&limit={}",
            self.xrpc_url("app.bsky.actor.searchActors"),
            urlencoding::encode(term),
            limit
        );
        if let Some(cursor) = cursor {
            url.push_str("&cursor=");
            url.push_str(&urlencoding::encode(cursor));
        }

        tracing::debug!("Searching actors: {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&session.access_jwt)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let page: SearchActorsResponse = response
            .json()
            .await
            .map_err(|e| BlueskyError::InvalidResponse(format!("Failed to parse actors: {}", e)))?;

        tracing::debug!(
            "Received {} actors (more: {})",
            page.actors.len(),
            page.cursor.is_some()
        );

        Ok(page)
    }
}

async fn error_from_response(response: Response) -> BlueskyError {
    let status = response.status();
    let reset = response
        .headers()
        .get(RATE_LIMIT_RESET_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read body".to_string());

    classify_error(status, reset.as_deref(), &body)
}

/// Map a failed XRPC response onto a [`BlueskyError`]
pub(crate) fn classify_error(status: StatusCode, reset: Option<&str>, body: &str) -> BlueskyError {
    let xrpc: Option<XrpcErrorResponse> = serde_json::from_str(body).ok();
    let error_name = xrpc.as_ref().map(|e| e.error.as_str()).unwrap_or_default();

    if status == StatusCode::TOO_MANY_REQUESTS || error_name == "RateLimitExceeded" {
        return BlueskyError::RateLimited {
            reset_at: reset.and_then(|v| v.trim().parse().ok()),
        };
    }

    if error_name == "AuthFactorTokenRequired" {
        return BlueskyError::AuthFactorTokenRequired;
    }

    let message = match &xrpc {
        Some(XrpcErrorResponse { error, message: Some(message) }) => format!("{}: {}", error, message),
        Some(XrpcErrorResponse { error, message: None }) => error.clone(),
        None => body.chars().take(200).collect(),
    };

    if status == StatusCode::UNAUTHORIZED {
        return BlueskyError::Unauthorized(message);
    }

    BlueskyError::ApiError(format!("{}: {}", status, message))
}
