use crate::core::filters::word_tokens;
use crate::core::matcher::Matcher;
use crate::models::{AccountMatch, SearchQuery};
use crate::services::bluesky::{ActorSearch, BlueskyError};
use chrono::{Local, NaiveDate, Utc};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Errors that end an organization's search early
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Remote rate limit still active after {retries} retries")]
    ThrottleRetriesExhausted { retries: u32 },

    #[error("Search request failed: {0}")]
    Remote(#[from] BlueskyError),
}

/// Paging and back-off policy for one organization search
#[derive(Debug, Clone)]
pub struct SearchPolicy {
    /// Actors requested per page
    pub page_size: u32,
    /// Pages evaluated before stopping, even if the service offers more
    pub max_pages: usize,
    /// Pause between consecutive pages
    pub page_delay: Duration,
    /// Added on top of the service's rate-limit reset time
    pub throttle_buffer: Duration,
    /// Consecutive rate-limit responses tolerated for a single page
    pub max_throttle_retries: u32,
}

impl Default for SearchPolicy {
    fn default() -> Self {
        Self {
            page_size: 100,
            max_pages: 1,
            page_delay: Duration::from_secs(1),
            throttle_buffer: Duration::from_secs(1),
            max_throttle_retries: 5,
        }
    }
}

/// What one organization search produced
///
/// A failed search still carries the matches from pages evaluated before
/// the failure.
#[derive(Debug)]
pub struct SearchOutcome {
    pub matches: Vec<AccountMatch>,
    pub pages: usize,
    pub search_date: NaiveDate,
    pub error: Option<SearchError>,
}

impl SearchOutcome {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Cursor-driven directory search for organizations
///
/// Each organization is searched by the first word of its name; every page
/// returned is filtered through the [`Matcher`] and accepted actors are
/// accumulated in page order. Remote rate-limit responses are waited out
/// and the same page is requested again.
pub struct PaginatedSearch<S> {
    search: S,
    matcher: Matcher,
    policy: SearchPolicy,
}

impl<S: ActorSearch> PaginatedSearch<S> {
    pub fn new(search: S, matcher: Matcher, policy: SearchPolicy) -> Self {
        Self {
            search,
            matcher,
            policy,
        }
    }

    pub fn policy(&self) -> &SearchPolicy {
        &self.policy
    }

    pub fn search(&self) -> &S {
        &self.search
    }

    /// Search for one organization, stamping matches with today's date
    pub async fn search_organization(&self, query: &SearchQuery) -> SearchOutcome {
        self.search_organization_on(query, Local::now().date_naive()).await
    }

    /// Search for one organization, stamping matches with `search_date`
    pub async fn search_organization_on(
        &self,
        query: &SearchQuery,
        search_date: NaiveDate,
    ) -> SearchOutcome {
        let term = search_term(&query.org_name);
        let mut outcome = SearchOutcome {
            matches: Vec::new(),
            pages: 0,
            search_date,
            error: None,
        };
        let mut cursor: Option<String> = None;
        let mut throttled: u32 = 0;

        loop {
            let page = match self
                .search
                .search_actors(&term, self.policy.page_size, cursor.as_deref())
                .await
            {
                Ok(page) => page,
                Err(BlueskyError::RateLimited { reset_at }) => {
                    if throttled >= self.policy.max_throttle_retries {
                        error!(
                            "Giving up on {} after {} rate-limited attempts",
                            query.org_name, throttled
                        );
                        outcome.error = Some(SearchError::ThrottleRetriesExhausted { retries: throttled });
                        break;
                    }
                    throttled += 1;

                    let wait = throttle_wait(reset_at, Utc::now().timestamp(), self.policy.throttle_buffer);
                    warn!(
                        "Rate limit exceeded. Waiting for {} seconds... (attempt {}/{})",
                        wait.as_secs(),
                        throttled,
                        self.policy.max_throttle_retries
                    );
                    tokio::time::sleep(wait).await;
                    continue;
                }
                Err(e) => {
                    error!("Error searching for {}: {}", query.org_name, e);
                    outcome.error = Some(e.into());
                    break;
                }
            };
            throttled = 0;

            let result = self.matcher.evaluate_page(query, page.actors, search_date);
            outcome.pages += 1;
            debug!(
                "Page {} for {}: {}/{} actors matched",
                outcome.pages,
                query.org_name,
                result.matches.len(),
                result.total_candidates
            );
            outcome.matches.extend(result.matches);

            match page.cursor {
                Some(next) if outcome.pages < self.policy.max_pages => {
                    cursor = Some(next);
                    tokio::time::sleep(self.policy.page_delay).await;
                }
                _ => break,
            }
        }

        info!(
            "Found {} matches for {} across {} page(s)",
            outcome.matches.len(),
            query.org_name,
            outcome.pages
        );

        outcome
    }
}

/// Term sent to the directory: the first word of the name, or the whole name
pub fn search_term(org_name: &str) -> String {
    word_tokens(org_name)
        .into_iter()
        .next()
        .unwrap_or_else(|| org_name.to_string())
}

/// Time to wait for a remote rate limit resetting at epoch second `reset_at`
pub fn throttle_wait(reset_at: Option<i64>, now_epoch: i64, buffer: Duration) -> Duration {
    let remaining = reset_at.map_or(0, |reset| (reset - now_epoch).max(0));
    Duration::from_secs(remaining as u64) + buffer
}
