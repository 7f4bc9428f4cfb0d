// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{ActorProfile, SearchQuery, AccountMatch, MatchThresholds, NO_MATCH_HANDLE, ERROR_HANDLE};
pub use requests::{OrganizationRecord, CreateSessionRequest};
pub use responses::{SearchActorsResponse, SessionResponse, XrpcErrorResponse};
