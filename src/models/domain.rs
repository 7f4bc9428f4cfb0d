use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Handle written for an organization with no matching account
pub const NO_MATCH_HANDLE: &str = "NO_MATCH_FOUND";

/// Handle written for an organization whose search failed
pub const ERROR_HANDLE: &str = "ERROR";

/// Actor record returned by the directory search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorProfile {
    pub handle: String,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "followersCount", default)]
    pub follower_count: u64,
    #[serde(rename = "followsCount", default)]
    pub following_count: u64,
    #[serde(rename = "postsCount", default)]
    pub posts_count: u64,
}

impl ActorProfile {
    /// Lowercased display name and description, the text the matcher inspects
    pub fn search_text(&self) -> String {
        format!(
            "{} {}",
            self.display_name.as_deref().unwrap_or_default(),
            self.description.as_deref().unwrap_or_default()
        )
        .to_lowercase()
    }
}

/// Organization being searched for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub org_name: String,
    pub org_type: String,
}

impl SearchQuery {
    pub fn new(org_name: impl Into<String>, org_type: impl Into<String>) -> Self {
        Self {
            org_name: org_name.into(),
            org_type: org_type.into(),
        }
    }
}

/// One accepted actor for an organization, in report column order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountMatch {
    pub search_term: String,
    pub organization_type: String,
    pub handle: String,
    pub display_name: String,
    pub description: Option<String>,
    pub follower_count: u64,
    pub following_count: u64,
    pub posts_count: u64,
    pub search_date: NaiveDate,
}

impl AccountMatch {
    pub fn from_actor(query: &SearchQuery, actor: ActorProfile, search_date: NaiveDate) -> Self {
        Self {
            search_term: query.org_name.clone(),
            organization_type: query.org_type.clone(),
            handle: actor.handle,
            display_name: actor.display_name.unwrap_or_default(),
            description: actor.description,
            follower_count: actor.follower_count,
            following_count: actor.following_count,
            posts_count: actor.posts_count,
            search_date,
        }
    }

    /// Placeholder row for an organization with no accepted actors
    pub fn no_match(query: &SearchQuery, search_date: NaiveDate) -> Self {
        Self::placeholder(query, NO_MATCH_HANDLE, String::new(), search_date)
    }

    /// Placeholder row carrying a search failure in `display_name`
    pub fn failure(query: &SearchQuery, message: impl Into<String>, search_date: NaiveDate) -> Self {
        Self::placeholder(query, ERROR_HANDLE, message.into(), search_date)
    }

    fn placeholder(
        query: &SearchQuery,
        handle: &str,
        display_name: String,
        search_date: NaiveDate,
    ) -> Self {
        Self {
            search_term: query.org_name.clone(),
            organization_type: query.org_type.clone(),
            handle: handle.to_string(),
            display_name,
            description: None,
            follower_count: 0,
            following_count: 0,
            posts_count: 0,
            search_date,
        }
    }
}

/// Fuzzy matching thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchThresholds {
    /// Largest edit distance at which two words are considered the same
    pub max_edit_distance: usize,
    /// Fraction of name words that must be matched (inclusive)
    pub min_token_coverage: f64,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            max_edit_distance: 2,
            min_token_coverage: 0.7,
        }
    }
}
