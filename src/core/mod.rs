// Core algorithm exports
pub mod distance;
pub mod filters;
pub mod matcher;
pub mod rate_limit;
pub mod search;

pub use distance::{levenshtein_distance, is_within_distance};
pub use filters::{matches_organization, word_tokens};
pub use matcher::{Matcher, MatchResult};
pub use rate_limit::{RateLimiter, RateLimitedSearch};
pub use search::{PaginatedSearch, SearchError, SearchOutcome, SearchPolicy};
