//! Balance extraction from explorer pages

use regex::Regex;
use tracing::warn;

use crate::error::{Error, Result};
use crate::models::Outcome;

/// What a single pattern pass over a page produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Extraction {
    /// Exactly one match with a numeric capture
    Value(f64),
    /// Zero or several matches; the page layout is not what the pattern expects
    Ambiguous {
        /// Number of matches found
        matches: usize,
    },
}

impl From<Extraction> for Outcome {
    fn from(extraction: Extraction) -> Self {
        match extraction {
            Extraction::Value(value) => Outcome::Success { value },
            Extraction::Ambiguous { matches } => Outcome::Undetermined { matches },
        }
    }
}

/// Precompiled extraction pattern, shared by every lookup
#[derive(Debug, Clone)]
pub struct Extractor {
    regex: Regex,
}

impl Extractor {
    /// Compile the explorer's pattern
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    /// Read exactly one number from `text`.
    ///
    /// Zero or multiple matches are not an error: they degrade to
    /// [`Extraction::Ambiguous`]. A single match whose capture is not a
    /// number is a [`Error::Parse`], since it means the pattern itself is
    /// wrong for every page.
    pub fn extract(&self, text: &str) -> Result<Extraction> {
        let mut captures = self.regex.captures_iter(text);

        let (Some(first), None) = (captures.next(), captures.next()) else {
            let matches = self.regex.find_iter(text).count();
            warn!(matches, "Expected exactly one pattern match");
            return Ok(Extraction::Ambiguous { matches });
        };

        let raw = first.get(1).map_or("", |m| m.as_str());
        raw.trim()
            .parse::<f64>()
            .map(Extraction::Value)
            .map_err(|_| Error::parse(raw))
    }
}

/// One-shot extraction with an uncompiled pattern
pub fn extract(text: &str, pattern: &str) -> Result<Extraction> {
    Extractor::new(pattern)?.extract(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    const BALANCE: &str = r"Balance: (\d+\.\d+)";

    #[test]
    fn test_single_match() {
        let result = extract("<td>Balance: 2.50000000 LTC</td>", BALANCE).unwrap();
        assert_eq!(result, Extraction::Value(2.5));
    }

    #[rstest]
    #[case("<html>no balance here</html>", 0)]
    #[case("Balance: 1.0 LTC / Balance: 2.0 LTC", 2)]
    #[case("Balance: 1.0 Balance: 2.0 Balance: 3.0", 3)]
    fn test_ambiguous(#[case] body: &str, #[case] expected: usize) {
        let result = extract(body, BALANCE).unwrap();
        assert_eq!(result, Extraction::Ambiguous { matches: expected });
    }

    #[test]
    fn test_non_numeric_capture() {
        let err = extract("Balance: pending", r"Balance: (\w+)").unwrap_err();
        assert!(matches!(err, Error::Parse { raw } if raw == "pending"));
    }

    #[test]
    fn test_capture_whitespace_trimmed() {
        let result = extract("Balance:  42.125 \n", r"Balance:(\s*[\d.]+\s*)").unwrap();
        assert_eq!(result, Extraction::Value(42.125));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(matches!(extract("x", "(unclosed"), Err(Error::Config(_))));
    }

    #[test]
    fn test_outcome_conversion() {
        assert_eq!(
            Outcome::from(Extraction::Value(3.0)),
            Outcome::Success { value: 3.0 }
        );
        assert_eq!(
            Outcome::from(Extraction::Ambiguous { matches: 0 }),
            Outcome::Undetermined { matches: 0 }
        );
    }

    proptest! {
        #[test]
        fn prop_formatted_balance_is_recovered(value in 0.0f64..1.0e12) {
            let body = format!("<div>Balance: {value:.8} LTC</div>");
            let extracted = extract(&body, BALANCE).unwrap();

            match extracted {
                Extraction::Value(v) => prop_assert!((v - value).abs() <= 1e-8 * value.max(1.0)),
                other => prop_assert!(false, "unexpected {:?}", other),
            }
        }
    }
}
