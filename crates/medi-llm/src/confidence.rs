//! Confidence extraction from model output.
//!
//! Prompts ask the model to finish with a line such as `Confidence: 0.82`
//! or `Confidence: 82%`. Parsing is fallible: anything else yields `None`
//! and the caller applies its own default.

use std::sync::LazyLock;

use regex::Regex;

static CONFIDENCE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[\s*_#>-]*confidence(?:\s+score)?[\s*_]*[:=][\s*_]*([0-9]+(?:\.[0-9]+)?|\.[0-9]+)\s*(%)?[\s*_.]*$")
        .expect("confidence regex is valid")
});

/// Parse the last confidence line in `text`.
///
/// Accepts fractions in `[0, 1]` and percentages in `[0, 100]`. A bare number
/// above 1 without `%` is ambiguous and rejected.
#[must_use]
pub fn parse_confidence(text: &str) -> Option<f64> {
    let caps = CONFIDENCE_LINE.captures_iter(text).last()?;
    let value: f64 = caps.get(1)?.as_str().parse().ok()?;
    let score = if caps.get(2).is_some() {
        value / 100.0
    } else {
        value
    };
    (0.0..=1.0).contains(&score).then_some(score)
}

/// Split model output into the answer body and its parsed confidence.
///
/// Confidence lines are removed from the body whether or not they parse.
#[must_use]
pub fn split_confidence(text: &str) -> (String, Option<f64>) {
    let confidence = parse_confidence(text);
    let body = CONFIDENCE_LINE.replace_all(text, "");
    (body.trim_end().to_string(), confidence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Answer.\nConfidence: 0.82", Some(0.82))]
    #[case("Answer.\nConfidence: 82%", Some(0.82))]
    #[case("Answer.\nconfidence = .5", Some(0.5))]
    #[case("Answer.\n**Confidence:** 0.9", Some(0.9))]
    #[case("Answer.\nConfidence score: 100%", Some(1.0))]
    #[case("Answer.\nConfidence: 0", Some(0.0))]
    fn parses_accepted_forms(#[case] text: &str, #[case] expected: Option<f64>) {
        let parsed = parse_confidence(text);
        match (parsed, expected) {
            (Some(a), Some(b)) => assert!((a - b).abs() < 1e-9, "{text}: {a} != {b}"),
            _ => assert_eq!(parsed, expected, "{text}"),
        }
    }

    #[rstest]
    #[case("No score given.")]
    #[case("Confidence: high")]
    #[case("Confidence: 82")]
    #[case("Confidence: 140%")]
    #[case("The confidence interval: 0.95 was reported in the trial")]
    fn rejects_everything_else(#[case] text: &str) {
        assert_eq!(parse_confidence(text), None, "{text}");
    }

    #[test]
    fn last_line_wins() {
        let text = "Confidence: 0.3\nRevised after review.\nConfidence: 0.7";
        assert_eq!(parse_confidence(text), Some(0.7));
    }

    #[test]
    fn split_removes_score_line() {
        let (body, confidence) =
            split_confidence("Metformin is first-line.\n\nConfidence: 0.88\n");
        assert_eq!(body, "Metformin is first-line.");
        assert_eq!(confidence, Some(0.88));
    }

    #[test]
    fn split_without_score_keeps_text() {
        let (body, confidence) = split_confidence("Plain answer.");
        assert_eq!(body, "Plain answer.");
        assert_eq!(confidence, None);
    }
}
