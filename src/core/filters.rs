use crate::core::distance::is_within_distance;
use crate::models::MatchThresholds;
use regex::Regex;
use std::sync::LazyLock;

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w+\b").expect("word pattern is valid"));

/// Token ignored by the normalized substring and fuzzy tests
const STOPWORD: &str = "of";

/// Split text into case-folded word tokens (`\w+` runs)
pub fn word_tokens(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    WORD_RE
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Check if an organization name matches a candidate's text
///
/// This is the acceptance test applied to every actor on a search page.
/// Any one of the following is sufficient, cheapest first:
/// 1. The lowercased name appears verbatim in the text
/// 2. The name without "of" appears verbatim in the text
/// 3. Every word of the name appears somewhere in the text
/// 4. Enough words of the name (ignoring "of") have a near-spelling in the text
pub fn matches_organization(
    org_name: &str,
    candidate_text: &str,
    thresholds: &MatchThresholds,
) -> bool {
    let text = candidate_text.to_lowercase();
    let tokens = word_tokens(org_name);

    contains_exact(org_name, &text)
        || contains_without_stopwords(&tokens, &text)
        || contains_all_tokens(&tokens, &text)
        || fuzzy_token_match(org_name, &text, thresholds)
}

/// Stage 1: case-insensitive substring test. `text` must already be lowercase.
#[inline]
pub fn contains_exact(org_name: &str, text: &str) -> bool {
    let needle = org_name.trim().to_lowercase();
    !needle.is_empty() && text.contains(needle.as_str())
}

/// Stage 2: the name's word tokens minus "of", rejoined with single spaces.
///
/// A name made only of stopwords normalizes to nothing and never matches.
#[inline]
pub fn contains_without_stopwords(tokens: &[String], text: &str) -> bool {
    let normalized = tokens
        .iter()
        .filter(|t| t.as_str() != STOPWORD)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ");

    !normalized.is_empty() && text.contains(normalized.as_str())
}

/// Stage 3: every token (stopword included) occurs somewhere in the text, in any order
#[inline]
pub fn contains_all_tokens(tokens: &[String], text: &str) -> bool {
    !tokens.is_empty() && tokens.iter().all(|t| text.contains(t.as_str()))
}

/// Stage 4: edit-distance token coverage
///
/// Both sides are split on whitespace only. A name word counts as matched
/// when some text word is within `max_edit_distance` edits of it; the test
/// passes when the matched fraction reaches `min_token_coverage`.
/// The "of" stopword is left out of the coverage count. A name with no
/// remaining words never matches.
pub fn fuzzy_token_match(org_name: &str, text: &str, thresholds: &MatchThresholds) -> bool {
    let org_name = org_name.to_lowercase();
    let org_words: Vec<&str> = org_name
        .split_whitespace()
        .filter(|w| *w != STOPWORD)
        .collect();
    if org_words.is_empty() {
        return false;
    }

    let text_words: Vec<&str> = text.split_whitespace().collect();

    let matched = org_words
        .iter()
        .filter(|org_word| {
            text_words
                .iter()
                .any(|text_word| is_within_distance(org_word, text_word, thresholds.max_edit_distance))
        })
        .count();

    matched as f64 / org_words.len() as f64 >= thresholds.min_token_coverage
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> MatchThresholds {
        MatchThresholds::default()
    }

    #[test]
    fn test_word_tokens() {
        assert_eq!(
            word_tokens("University of St. Andrews"),
            vec!["university", "of", "st", "andrews"]
        );
        assert!(word_tokens("  --  ").is_empty());
    }

    #[test]
    fn test_exact_substring() {
        assert!(contains_exact("Wellcome Trust", "the wellcome trust charity"));
        assert!(!contains_exact("Wellcome Trust", "wellcome research"));
        assert!(!contains_exact("   ", "anything"));
    }

    #[test]
    fn test_without_stopwords() {
        let tokens = word_tokens("Museum of London");
        assert!(contains_without_stopwords(&tokens, "museum london archaeology"));
        assert!(!contains_without_stopwords(&tokens, "london museum"));

        let only_stopword = word_tokens("of");
        assert!(!contains_without_stopwords(&only_stopword, "anything at all"));
    }

    #[test]
    fn test_all_tokens_any_order() {
        let tokens = word_tokens("Institute of Physics");
        assert!(contains_all_tokens(&tokens, "physics institute of london"));
        assert!(!contains_all_tokens(&tokens, "physics institute"));
        assert!(!contains_all_tokens(&[], "anything"));
    }

    #[test]
    fn test_fuzzy_spelling_variant() {
        assert!(fuzzy_token_match(
            "Wellcome Sanger Institute",
            "welcome sangre institue genomics",
            &thresholds()
        ));
    }

    #[test]
    fn test_fuzzy_coverage_boundary() {
        // 2 of 3 words is below 0.7
        assert!(!fuzzy_token_match("river castle orchard", "river castle zzzzzz", &thresholds()));
        // 3 of 4 words clears it
        assert!(fuzzy_token_match(
            "river castle orchard meadow",
            "river castle orchard zzzzzz",
            &thresholds()
        ));
    }

    #[test]
    fn test_fuzzy_exact_threshold_passes() {
        let exact = MatchThresholds {
            max_edit_distance: 0,
            min_token_coverage: 0.5,
        };
        assert!(fuzzy_token_match("alpha beta", "alpha zzzzzzz", &exact));
    }

    #[test]
    fn test_fuzzy_ignores_stopword() {
        assert!(fuzzy_token_match("university of oxford", "oxford university press", &thresholds()));
    }

    #[test]
    fn test_fuzzy_empty_name_fails() {
        assert!(!fuzzy_token_match("", "anything", &thresholds()));
        assert!(!fuzzy_token_match("   ", "anything", &thresholds()));
        assert!(!fuzzy_token_match("of", "of", &thresholds()));
    }

    #[test]
    fn test_matches_organization() {
        assert!(matches_organization(
            "University of Oxford",
            "oxford university press",
            &thresholds()
        ));
        assert!(!matches_organization(
            "Acme Corp",
            "totally unrelated text",
            &thresholds()
        ));
        assert!(!matches_organization("", "totally unrelated text", &thresholds()));
    }

    #[test]
    fn test_matches_organization_lowercases_text() {
        assert!(matches_organization("oxford", "OXFORD University", &thresholds()));
    }
}
