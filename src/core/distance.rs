/// Calculate the Levenshtein edit distance between two strings
///
/// Counts the minimum number of single-character insertions, deletions and
/// substitutions needed to turn `a` into `b`. Works on `char`s, so accented
/// names count one edit per letter rather than per byte.
///
/// Uses two rolling rows sized to the shorter input, iterating over the
/// longer one: O(min(|a|, |b|)) space, O(|a| * |b|) time.
///
/// # Arguments
/// * `a` - First string
/// * `b` - Second string
///
/// # Returns
/// Edit distance; symmetric in its arguments
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let (longer, shorter) = if a.len() < b.len() { (&b, &a) } else { (&a, &b) };

    if shorter.is_empty() {
        return longer.len();
    }

    let mut previous_row: Vec<usize> = (0..=shorter.len()).collect();
    let mut current_row = vec![0; shorter.len() + 1];

    for (i, c1) in longer.iter().enumerate() {
        current_row[0] = i + 1;
        for (j, c2) in shorter.iter().enumerate() {
            let insertion = previous_row[j + 1] + 1;
            let deletion = current_row[j] + 1;
            let substitution = previous_row[j] + usize::from(c1 != c2);
            current_row[j + 1] = insertion.min(deletion).min(substitution);
        }
        std::mem::swap(&mut previous_row, &mut current_row);
    }

    previous_row[shorter.len()]
}

/// Check whether two words are within `max_distance` edits of each other
#[inline]
pub fn is_within_distance(a: &str, b: &str, max_distance: usize) -> bool {
    // Length difference is a lower bound on the distance
    let (len_a, len_b) = (a.chars().count(), b.chars().count());
    if len_a.abs_diff(len_b) > max_distance {
        return false;
    }

    levenshtein_distance(a, b) <= max_distance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kitten_sitting() {
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
    }

    #[test]
    fn test_identity_is_zero() {
        for word in ["", "a", "oxford", "Université de Genève"] {
            assert_eq!(levenshtein_distance(word, word), 0, "distance({word:?}, {word:?})");
        }
    }

    #[test]
    fn test_symmetric() {
        let pairs = [
            ("flaw", "lawn"),
            ("university", "univeristy"),
            ("", "abc"),
            ("gumbo", "gambol"),
        ];

        for (a, b) in pairs {
            assert_eq!(levenshtein_distance(a, b), levenshtein_distance(b, a));
        }
    }

    #[test]
    fn test_empty_string() {
        assert_eq!(levenshtein_distance("", "research"), 8);
        assert_eq!(levenshtein_distance("research", ""), 8);
        assert_eq!(levenshtein_distance("", ""), 0);
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        // "é" is two bytes in UTF-8 but a single substitution
        assert_eq!(levenshtein_distance("genève", "geneve"), 1);
    }

    #[test]
    fn test_within_distance() {
        assert!(is_within_distance("oxford", "oxfrod", 2));
        assert!(is_within_distance("of", "on", 2));
        assert!(!is_within_distance("of", "oxford", 2));
        assert!(!is_within_distance("kitten", "sitting", 2));
    }
}
