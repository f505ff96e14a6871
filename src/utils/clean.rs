//! Token cleaning pipeline.
//!
//! The steps always run in the same order: lowercase, drop link tokens,
//! drop digit-bearing tokens, strip ASCII punctuation, drop stopwords, stem.
//! Digit and link filtering look at the raw token, so `"word123."` is
//! dropped rather than stripped to `"word123"`.

use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use std::sync::OnceLock;

/// Substring marking a token as a link
const LINK_MARKER: &str = "http";

static DIGIT_RE: OnceLock<Regex> = OnceLock::new();
static STOP_WORDS: OnceLock<HashSet<String>> = OnceLock::new();
static STEMMER: OnceLock<Stemmer> = OnceLock::new();

fn digit_re() -> &'static Regex {
    DIGIT_RE.get_or_init(|| Regex::new(r"\d").expect("valid digit regex"))
}

fn stop_words() -> &'static HashSet<String> {
    STOP_WORDS.get_or_init(|| {
        stop_words::get(stop_words::LANGUAGE::English)
            .iter()
            .map(|w| w.to_string())
            .collect()
    })
}

fn stemmer() -> &'static Stemmer {
    STEMMER.get_or_init(|| Stemmer::create(Algorithm::English))
}

/// Which optional steps of the pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanOptions {
    pub lowercase: bool,
    pub remove_stopwords: bool,
    pub stem: bool,
}

impl CleanOptions {
    /// Lowercasing plus the link, digit and punctuation filters only
    pub fn basic() -> Self {
        Self {
            lowercase: true,
            remove_stopwords: false,
            stem: false,
        }
    }
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            lowercase: true,
            remove_stopwords: true,
            stem: true,
        }
    }
}

/// Split text on whitespace
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Whether a token looks like a link
pub fn is_link(token: &str) -> bool {
    token.contains(LINK_MARKER)
}

/// Whether a token contains any decimal digit
pub fn has_digit(token: &str) -> bool {
    digit_re().is_match(token)
}

/// Remove every ASCII punctuation character
pub fn strip_punctuation(token: &str) -> String {
    token.chars().filter(|c| !c.is_ascii_punctuation()).collect()
}

/// Run the cleaning pipeline over a token sequence
///
/// Cleaning twice equals cleaning once only with [`CleanOptions::basic`].
/// Stemming is not idempotent, so with the default options a second pass
/// may shorten tokens further.
pub fn clean<S: AsRef<str>>(tokens: &[S], options: &CleanOptions) -> Vec<String> {
    tokens
        .iter()
        .map(|token| {
            let token = token.as_ref();
            if options.lowercase {
                token.to_lowercase()
            } else {
                token.to_string()
            }
        })
        .filter(|token| !is_link(token))
        .filter(|token| !has_digit(token))
        .map(|token| strip_punctuation(&token))
        // stripping can join a link marker back together ("ht.tp")
        .filter(|token| !is_link(token))
        .filter(|token| !options.remove_stopwords || !stop_words().contains(token.as_str()))
        .map(|token| {
            if options.stem {
                stemmer().stem(&token).into_owned()
            } else {
                token
            }
        })
        .collect()
}

/// Tokenize and clean a block of text
pub fn clean_text(text: &str, options: &CleanOptions) -> Vec<String> {
    clean(&tokenize(text), options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_link_tokens_dropped() {
        let cleaned = clean(&["see", "https://doi.org/x", "HTTP://A.B"], &CleanOptions::basic());
        assert_eq!(cleaned, words(&["see"]));
    }

    #[test]
    fn test_link_check_is_case_sensitive_without_lowercase() {
        let options = CleanOptions {
            lowercase: false,
            remove_stopwords: false,
            stem: false,
        };
        let cleaned = clean(&["HTTP://A.B", "http://a.b"], &options);
        assert_eq!(cleaned, words(&["HTTPAB"]));
    }

    #[test]
    fn test_digit_tokens_dropped_before_stripping() {
        let cleaned = clean(&["word123.", "word.", "٣rd"], &CleanOptions::basic());
        assert_eq!(cleaned, words(&["word"]));
    }

    #[test]
    fn test_punctuation_stripped_to_possibly_empty() {
        let cleaned = clean(&["(cells),", "--", "don't"], &CleanOptions::basic());
        assert_eq!(cleaned, words(&["cells", "", "dont"]));
    }

    #[test]
    fn test_joined_link_marker_dropped() {
        let cleaned = clean(&["ht.tp", "fine"], &CleanOptions::basic());
        assert_eq!(cleaned, words(&["fine"]));
    }

    #[test]
    fn test_stopwords_removed() {
        let options = CleanOptions {
            stem: false,
            ..CleanOptions::default()
        };
        let cleaned = clean(&["The", "mitochondrial", "and", "of", "enzyme"], &options);
        assert_eq!(cleaned, words(&["mitochondrial", "enzyme"]));
    }

    #[test]
    fn test_stemming() {
        let options = CleanOptions {
            remove_stopwords: false,
            ..CleanOptions::default()
        };
        let cleaned = clean(&["Running", "cats", "proteins."], &options);
        assert_eq!(cleaned, words(&["run", "cat", "protein"]));
    }

    #[test]
    fn test_never_grows_and_survivors_are_clean() {
        let input = tokenize(
            "Results (n=42) at https://x.org show 3-fold RISE; see Fig.2, ht-tp and café!",
        );
        for options in [CleanOptions::basic(), CleanOptions::default()] {
            let cleaned = clean(&input, &options);
            assert!(cleaned.len() <= input.len());
            for token in &cleaned {
                assert!(!has_digit(token), "{token}");
                assert!(!token.contains("http"), "{token}");
                assert!(!token.chars().any(|c| c.is_ascii_punctuation()), "{token}");
            }
        }
    }

    #[test]
    fn test_basic_pipeline_is_idempotent() {
        let input = tokenize("The QUICK (brown) fox's 2 jumps http://x ht.tp over -- lazy dogs.");
        let once = clean(&input, &CleanOptions::basic());
        let twice = clean(&once, &CleanOptions::basic());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_input() {
        let empty: Vec<String> = Vec::new();
        assert!(clean(&empty, &CleanOptions::default()).is_empty());
        assert!(clean_text("   ", &CleanOptions::default()).is_empty());
    }
}
