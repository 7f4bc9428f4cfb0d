//! Bsky Org Search - find the Bluesky accounts of a list of organizations
//!
//! This library provides the matching and throttling engine behind the
//! `bsky-org-search` tool: a sliding-window rate limiter, a layered fuzzy
//! name matcher, and a cursor-driven actor search that waits out remote
//! rate limits.

pub mod config;
pub mod core;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use self::core::{
    distance::levenshtein_distance, filters::matches_organization, Matcher, PaginatedSearch,
    RateLimitedSearch, RateLimiter, SearchOutcome, SearchPolicy,
};
pub use self::models::{AccountMatch, ActorProfile, MatchThresholds, SearchQuery};
pub use self::services::{ActorSearch, BlueskyClient, BlueskyError};
