use serde::{Deserialize, Serialize};
use validator::Validate;

/// Input row naming an organization to search for
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrganizationRecord {
    #[validate(length(min = 1))]
    #[serde(rename = "organization_name")]
    pub name: String,
    #[serde(rename = "type", default)]
    pub org_type: String,
}

/// Body of `com.atproto.server.createSession`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSessionRequest {
    #[validate(length(min = 1))]
    pub identifier: String,
    #[validate(length(min = 1))]
    pub password: String,
    #[serde(rename = "authFactorToken", skip_serializing_if = "Option::is_none")]
    pub auth_factor_token: Option<String>,
}
