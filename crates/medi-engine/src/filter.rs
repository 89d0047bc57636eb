//! Message filter: classify incoming text before it reaches the query handler.
//!
//! Classification is a pure function of the input. The text is normalized
//! first (whitespace collapsed, stray symbols stripped, dosage abbreviations
//! expanded), then checked against noise patterns and scored for medical
//! relevance.

use std::collections::HashSet;
use std::sync::LazyLock;

use medi_core::enums::Classification;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Inputs shorter than this after normalization are noise.
pub const MIN_LENGTH: usize = 5;

/// Relevance below this is noise.
pub const MIN_RELEVANCE: f64 = 0.01;

/// Similarity above this marks two queries as duplicates.
pub const DUPLICATE_THRESHOLD: f64 = 0.8;

/// Relevance bonus per matching medical pattern.
const PATTERN_BONUS: f64 = 0.1;

/// Repeats of the leading character that mark a message as spam.
const SPAM_RUN: usize = 6;

const MEDICAL_KEYWORDS: &[&str] = &[
    // conditions
    "diabetes", "hypertension", "cancer", "covid", "pneumonia", "asthma", "arthritis",
    "depression", "anxiety", "migraine", "copd", "alzheimer", "disease", "syndrome",
    "disorder", "condition", "illness", "symptom",
    // treatments
    "treatment", "therapy", "medication", "drug", "surgery", "procedure", "intervention",
    "protocol", "regimen", "dosage", "administration", "cure", "heal", "remedy", "medicine",
    "pharmaceutical",
    // research
    "study", "research", "meta-analysis", "randomized", "controlled", "placebo", "efficacy",
    "safety", "evidence", "data", "analysis", "findings", "results",
    // outcomes
    "mortality", "morbidity", "outcome", "prognosis", "diagnosis", "biomarker",
    "complications", "recovery", "pain", "relief", "improvement",
    // care setting
    "patient", "healthcare", "clinical", "hospital", "physician", "nurse", "pharmacist",
    "medical", "health", "doctor", "clinic",
    // question words
    "what", "how", "why", "when", "where", "can", "should", "compare", "effective", "best",
    "recommend", "suggest", "help", "information",
];

#[allow(clippy::expect_used)]
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));

#[allow(clippy::expect_used)]
static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s\-+/%.,;:?!]").expect("static regex"));

#[allow(clippy::expect_used)]
static ABBREVIATIONS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        ("mg", "milligrams"),
        ("ml", "milliliters"),
        ("mcg", "micrograms"),
        ("bid", "twice daily"),
        ("tid", "three times daily"),
        ("qd", "once daily"),
    ]
    .into_iter()
    .map(|(abbr, full)| {
        let re = Regex::new(&format!(r"(?i)\b{abbr}\b")).expect("static regex");
        (re, full)
    })
    .collect()
});

#[allow(clippy::expect_used)]
static GREETING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(hi|hello|hey|good morning|good afternoon|good evening)\b")
        .expect("static regex")
});

#[allow(clippy::expect_used)]
static VAGUE_QUERY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(what can you do|help|how are you|what is this)\b").expect("static regex")
});

#[allow(clippy::expect_used)]
static MEDICAL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\d+\s*(mg|ml|mcg|units|milligrams|milliliters|micrograms)\b",
        r"(clinical|randomized|controlled)\s+(trial|study)",
        r"(side\s+effects|adverse\s+events)",
        r"(efficacy|effectiveness|outcome)",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("static regex"))
    .collect()
});

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

/// Why the filter classified a message the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterReason {
    Relevant,
    Empty,
    TooShort,
    Greeting,
    VagueQuery,
    Spam,
    LowRelevance,
    InvalidInput,
}

impl FilterReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Relevant => "relevant",
            Self::Empty => "empty",
            Self::TooShort => "too_short",
            Self::Greeting => "greeting",
            Self::VagueQuery => "vague_query",
            Self::Spam => "spam",
            Self::LowRelevance => "low_relevance",
            Self::InvalidInput => "invalid_input",
        }
    }
}

impl std::fmt::Display for FilterReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterVerdict {
    pub classification: Classification,
    pub reason: FilterReason,
    /// Normalized text; this is what gets stored and sent to the model.
    pub cleaned_text: String,
    pub relevance: f64,
}

impl FilterVerdict {
    const fn rejected(
        classification: Classification,
        reason: FilterReason,
        cleaned_text: String,
    ) -> Self {
        Self {
            classification,
            reason,
            cleaned_text,
            relevance: 0.0,
        }
    }

    #[must_use]
    pub const fn is_informational(&self) -> bool {
        self.classification.is_informational()
    }
}

// ---------------------------------------------------------------------------
// MessageFilter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct MessageFilter;

impl MessageFilter {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Classify a message as informational, noise or empty.
    #[must_use]
    pub fn classify(&self, text: &str) -> FilterVerdict {
        if text.trim().is_empty() {
            return FilterVerdict::rejected(
                Classification::Noise,
                FilterReason::Empty,
                String::new(),
            );
        }

        let cleaned = normalize(text);
        if cleaned.is_empty() {
            return FilterVerdict::rejected(Classification::Empty, FilterReason::Empty, cleaned);
        }
        if cleaned.chars().count() < MIN_LENGTH {
            return FilterVerdict::rejected(Classification::Noise, FilterReason::TooShort, cleaned);
        }

        let lower = cleaned.to_lowercase();
        if let Some(reason) = noise_pattern(&lower) {
            return FilterVerdict::rejected(Classification::Noise, reason, cleaned);
        }

        let relevance = relevance(&lower);
        if relevance < MIN_RELEVANCE {
            return FilterVerdict {
                classification: Classification::Noise,
                reason: FilterReason::LowRelevance,
                cleaned_text: cleaned,
                relevance,
            };
        }

        FilterVerdict {
            classification: Classification::Informational,
            reason: FilterReason::Relevant,
            cleaned_text: cleaned,
            relevance,
        }
    }

    /// Classify raw bytes. Invalid UTF-8 is noise rather than an error.
    #[must_use]
    pub fn classify_bytes(&self, bytes: &[u8]) -> FilterVerdict {
        std::str::from_utf8(bytes).map_or_else(
            |_| {
                FilterVerdict::rejected(
                    Classification::Noise,
                    FilterReason::InvalidInput,
                    String::new(),
                )
            },
            |text| self.classify(text),
        )
    }
}

/// Collapse whitespace, strip disallowed symbols, expand dosage abbreviations.
#[must_use]
pub fn normalize(text: &str) -> String {
    let stripped = DISALLOWED.replace_all(text, " ");
    let mut cleaned = WHITESPACE.replace_all(stripped.trim(), " ").into_owned();
    for (re, full) in ABBREVIATIONS.iter() {
        cleaned = re.replace_all(&cleaned, *full).into_owned();
    }
    cleaned
}

fn noise_pattern(lower: &str) -> Option<FilterReason> {
    if GREETING.is_match(lower) {
        return Some(FilterReason::Greeting);
    }
    if VAGUE_QUERY.is_match(lower) {
        return Some(FilterReason::VagueQuery);
    }
    let mut chars = lower.chars();
    if let Some(first) = chars.next() {
        if 1 + chars.take_while(|c| *c == first).count() >= SPAM_RUN {
            return Some(FilterReason::Spam);
        }
    }
    None
}

/// Share of words containing a medical keyword, plus a bonus per medical
/// pattern, capped at 1.0.
#[allow(clippy::cast_precision_loss)]
fn relevance(lower: &str) -> f64 {
    let words: Vec<&str> = lower.split_whitespace().collect();
    if words.is_empty() {
        return 0.0;
    }
    let hits = words
        .iter()
        .filter(|word| MEDICAL_KEYWORDS.iter().any(|kw| word.contains(kw)))
        .count();
    let patterns = MEDICAL_PATTERNS.iter().filter(|re| re.is_match(lower)).count();

    let score = (hits as f64 / words.len() as f64) + PATTERN_BONUS * patterns as f64;
    score.min(1.0)
}

/// Jaccard similarity of the lowercase word sets of two messages.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn similarity(a: &str, b: &str) -> f64 {
    let a_lower = a.to_lowercase();
    let b_lower = b.to_lowercase();
    let left: HashSet<&str> = a_lower.split_whitespace().collect();
    let right: HashSet<&str> = b_lower.split_whitespace().collect();

    let union = left.union(&right).count();
    if union == 0 {
        return 0.0;
    }
    left.intersection(&right).count() as f64 / union as f64
}

#[must_use]
pub fn is_duplicate(a: &str, b: &str) -> bool {
    similarity(a, b) > DUPLICATE_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn classify(text: &str) -> FilterVerdict {
        MessageFilter::new().classify(text)
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\n\t ")]
    fn blank_input_is_noise(#[case] text: &str) {
        let verdict = classify(text);
        assert_eq!(verdict.classification, Classification::Noise);
        assert_eq!(verdict.reason, FilterReason::Empty);
    }

    #[test]
    fn symbols_only_is_empty() {
        let verdict = classify("@@@ ### ***");
        assert_eq!(verdict.classification, Classification::Empty);
        assert_eq!(verdict.cleaned_text, "");
    }

    #[test]
    fn short_input_is_noise() {
        assert_eq!(classify("flu").reason, FilterReason::TooShort);
    }

    #[rstest]
    #[case("Hello there, anyone around?", FilterReason::Greeting)]
    #[case("good morning to the research team", FilterReason::Greeting)]
    #[case("what can you do for my project", FilterReason::VagueQuery)]
    #[case("aaaaaaaaaaaaa", FilterReason::Spam)]
    fn noise_patterns(#[case] text: &str, #[case] reason: FilterReason) {
        let verdict = classify(text);
        assert_eq!(verdict.classification, Classification::Noise);
        assert_eq!(verdict.reason, reason);
    }

    #[test]
    fn greeting_prefix_does_not_match_medical_words() {
        let verdict = classify("HIV treatment options in pregnancy");
        assert_eq!(verdict.classification, Classification::Informational);
    }

    #[test]
    fn irrelevant_text_is_low_relevance() {
        let verdict = classify("the weather tomorrow looks sunny and warm");
        assert_eq!(verdict.reason, FilterReason::LowRelevance);
        assert_eq!(verdict.classification, Classification::Noise);
    }

    #[test]
    fn medical_question_is_informational() {
        let verdict = classify("What are the side effects of metformin in elderly patients?");
        assert!(verdict.is_informational());
        assert!(verdict.relevance > 0.2);
        assert!(verdict.relevance <= 1.0);
    }

    #[test]
    fn normalization_expands_abbreviations() {
        assert_eq!(
            normalize("  metformin 500 mg   BID \u{2122} "),
            "metformin 500 milligrams twice daily"
        );
    }

    #[test]
    fn abbreviations_only_expand_whole_words() {
        assert_eq!(normalize("bmg mgx"), "bmg mgx");
    }

    #[test]
    fn dosage_pattern_adds_bonus() {
        let with_dose = relevance("metformin 500 milligrams daily");
        let without = relevance("metformin daily");
        assert!(with_dose > without);
    }

    #[test]
    fn invalid_utf8_is_noise() {
        let verdict = MessageFilter::new().classify_bytes(&[0xff, 0xfe, 0x00]);
        assert_eq!(verdict.reason, FilterReason::InvalidInput);
        assert_eq!(verdict.classification, Classification::Noise);
    }

    #[test]
    fn valid_bytes_classify_like_text() {
        let text = "randomized controlled trial of insulin glargine";
        assert_eq!(MessageFilter::new().classify_bytes(text.as_bytes()), classify(text));
    }

    #[test]
    fn classification_is_deterministic() {
        let text = "Compare SGLT2 inhibitors with GLP-1 agonists for heart failure";
        assert_eq!(classify(text), classify(text));
    }

    #[test]
    fn similarity_bounds() {
        assert!((similarity("Metformin dosing", "metformin DOSING") - 1.0).abs() < f64::EPSILON);
        assert!(similarity("insulin pumps", "statin therapy").abs() < f64::EPSILON);
        assert!(similarity("", "").abs() < f64::EPSILON);
        assert!(is_duplicate(
            "metformin dosing in ckd stage 3 patients",
            "metformin dosing in ckd stage 3 patients"
        ));
        assert!(!is_duplicate("metformin dosing", "metformin side effects"));
    }
}
