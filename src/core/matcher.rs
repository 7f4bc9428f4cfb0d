use crate::core::filters::matches_organization;
use crate::models::{AccountMatch, ActorProfile, MatchThresholds, SearchQuery};
use chrono::NaiveDate;

/// Result of evaluating one page of actors
#[derive(Debug)]
pub struct MatchResult {
    pub matches: Vec<AccountMatch>,
    pub total_candidates: usize,
}

/// Decides which actors on a search page belong to an organization
#[derive(Debug, Clone)]
pub struct Matcher {
    thresholds: MatchThresholds,
}

impl Matcher {
    pub fn new(thresholds: MatchThresholds) -> Self {
        Self { thresholds }
    }

    pub fn with_default_thresholds() -> Self {
        Self {
            thresholds: MatchThresholds::default(),
        }
    }

    pub fn thresholds(&self) -> &MatchThresholds {
        &self.thresholds
    }

    /// Whether `actor`'s display name and description identify the organization
    pub fn is_match(&self, query: &SearchQuery, actor: &ActorProfile) -> bool {
        matches_organization(&query.org_name, &actor.search_text(), &self.thresholds)
    }

    /// Keep the actors that match `query`, in page order
    ///
    /// # Arguments
    /// * `query` - Organization being searched for
    /// * `actors` - One page of search results
    /// * `search_date` - Date stamped on every match
    pub fn evaluate_page(
        &self,
        query: &SearchQuery,
        actors: Vec<ActorProfile>,
        search_date: NaiveDate,
    ) -> MatchResult {
        let total_candidates = actors.len();

        let matches = actors
            .into_iter()
            .filter(|actor| self.is_match(query, actor))
            .map(|actor| AccountMatch::from_actor(query, actor, search_date))
            .collect();

        MatchResult {
            matches,
            total_candidates,
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_thresholds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_actor(handle: &str, display_name: Option<&str>, description: Option<&str>) -> ActorProfile {
        ActorProfile {
            handle: handle.to_string(),
            display_name: display_name.map(str::to_string),
            description: description.map(str::to_string),
            follower_count: 10,
            following_count: 5,
            posts_count: 1,
        }
    }

    fn search_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, 20).unwrap()
    }

    #[test]
    fn test_evaluate_page_filters_and_keeps_order() {
        let matcher = Matcher::with_default_thresholds();
        let query = SearchQuery::new("Natural History Museum", "museum");

        let actors = vec![
            create_actor("nhm.ac.uk", Some("Natural History Museum"), None),
            create_actor("cats.bsky.social", Some("Cat pictures"), Some("daily cats")),
            create_actor("nhm-fans.bsky.social", Some("Fans"), Some("We love the natural history museum")),
        ];

        let result = matcher.evaluate_page(&query, actors, search_date());

        assert_eq!(result.total_candidates, 3);
        let handles: Vec<_> = result.matches.iter().map(|m| m.handle.as_str()).collect();
        assert_eq!(handles, vec!["nhm.ac.uk", "nhm-fans.bsky.social"]);
    }

    #[test]
    fn test_description_is_searched() {
        let matcher = Matcher::default();
        let query = SearchQuery::new("Royal Society", "academy");
        let actor = create_actor("rs.bsky.social", None, Some("The Royal Society, UK academy of sciences"));

        assert!(matcher.is_match(&query, &actor));
    }

    #[test]
    fn test_every_match_shares_search_date() {
        let matcher = Matcher::default();
        let query = SearchQuery::new("Oxford", "university");
        let actors = vec![
            create_actor("a.bsky.social", Some("Oxford Uni"), None),
            create_actor("b.bsky.social", Some("Oxford Press"), None),
        ];

        let result = matcher.evaluate_page(&query, actors, search_date());

        assert_eq!(result.matches.len(), 2);
        assert!(result.matches.iter().all(|m| m.search_date == search_date()));
    }

    #[test]
    fn test_empty_page() {
        let matcher = Matcher::default();
        let query = SearchQuery::new("Oxford", "university");

        let result = matcher.evaluate_page(&query, vec![], search_date());

        assert!(result.matches.is_empty());
        assert_eq!(result.total_candidates, 0);
    }
}
