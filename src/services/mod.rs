// Service exports
pub mod bluesky;
pub mod report;

pub use bluesky::{ActorSearch, BlueskyClient, BlueskyError};
pub use report::{GithubEnv, ReportError};
