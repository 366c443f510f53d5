//! Query tokenization.

use once_cell::sync::Lazy;
use regex::Regex;

/// Anything that is not a letter, digit, underscore or whitespace, in any script.
static NON_WORD_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N}\p{M}_\s]+").expect("Invalid non-word regex pattern"));

/// Split a query into lower-case search tokens.
///
/// Punctuation and symbols are removed before splitting, so `"Dune!"`
/// and `"dune"` produce the same token. Arabic and other non-Latin letters
/// are kept.
pub fn tokenize(query: &str) -> Vec<String> {
    let lowered = query.to_lowercase();
    NON_WORD_REGEX
        .replace_all(&lowered, "")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Lower-case `text` and strip the same characters [`tokenize`] strips, so
/// tokens can be matched against it by substring.
pub fn normalize(text: &str) -> String {
    NON_WORD_REGEX
        .replace_all(&text.to_lowercase(), "")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_matches_tokens() {
        let text = normalize("A Sci-Fi classic: DUNE");
        for token in tokenize("sci-fi dune!") {
            assert!(text.contains(&token), "{} not in {}", token, text);
        }
    }

    #[test]
    fn test_lowercases_and_splits() {
        assert_eq!(tokenize("  Frank   HERBERT "), vec!["frank", "herbert"]);
    }

    #[test]
    fn test_strips_punctuation() {
        assert_eq!(tokenize("Dune! (1965)"), vec!["dune", "1965"]);
        assert_eq!(tokenize("sci-fi"), vec!["scifi"]);
    }

    #[test]
    fn test_keeps_arabic_letters() {
        assert_eq!(tokenize("كتاب، التاريخ"), vec!["كتاب", "التاريخ"]);
    }

    #[test]
    fn test_blank_query_has_no_tokens() {
        assert!(tokenize("   ").is_empty());
        assert!(tokenize("?!").is_empty());
    }
}
