use serde::{Deserialize, Serialize};
use crate::models::domain::ActorProfile;

/// One page of `app.bsky.actor.searchActors`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchActorsResponse {
    #[serde(default)]
    pub actors: Vec<ActorProfile>,
    pub cursor: Option<String>,
}

/// Authenticated session returned by `createSession`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    #[serde(rename = "accessJwt")]
    pub access_jwt: String,
    #[serde(rename = "refreshJwt")]
    pub refresh_jwt: String,
    pub handle: String,
    pub did: String,
}

/// XRPC error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XrpcErrorResponse {
    pub error: String,
    pub message: Option<String>,
}
