//! Pronunciation assessments.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Note attached to assessments scored by the local placeholder.
pub const LOCAL_PLACEHOLDER_NOTE: &str = "local_v0_placeholder";

/// Whole-utterance scores. Each score may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallScores {
    pub accuracy_score: Option<f64>,
    pub fluency_score: Option<f64>,
    pub completeness_score: Option<f64>,
    pub pronunciation_score: Option<f64>,
}

/// Score detail for one recognized word.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WordAssessment {
    pub word: Option<String>,
    pub accuracy_score: Option<f64>,
    pub error_type: Option<String>,
    /// Syllable entries, each with a nested `PronunciationAssessment`.
    pub syllables: Option<Vec<Value>>,
    /// Phoneme entries, each with a nested `PronunciationAssessment`.
    pub phonemes: Option<Vec<Value>>,
}

/// Result of comparing an utterance against its reference text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub reference_text: String,
    pub transcript_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall: Option<OverallScores>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub words: Option<Vec<WordAssessment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exact_match: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Assessment {
    /// Placeholder scoring: exact match after collapsing whitespace and case.
    pub fn local_placeholder(reference_text: &str, transcript_text: &str) -> Self {
        Self {
            reference_text: reference_text.to_string(),
            transcript_text: transcript_text.to_string(),
            exact_match: Some(normalize_text(reference_text) == normalize_text(transcript_text)),
            note: Some(LOCAL_PLACEHOLDER_NOTE.to_string()),
            ..Self::default()
        }
    }
}

fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_placeholder_exact_match() {
        let assessment = Assessment::local_placeholder("你好", "你好");
        assert_eq!(assessment.exact_match, Some(true));
        assert_eq!(assessment.note.as_deref(), Some(LOCAL_PLACEHOLDER_NOTE));
    }

    #[test]
    fn test_local_placeholder_ignores_case_and_spacing() {
        let assessment = Assessment::local_placeholder("Ni  Hao", " ni hao\n");
        assert_eq!(assessment.exact_match, Some(true));
        let miss = Assessment::local_placeholder("你好", "你们好");
        assert_eq!(miss.exact_match, Some(false));
    }

    #[test]
    fn test_placeholder_serializes_without_scores() {
        let json = serde_json::to_value(Assessment::local_placeholder("a", "b")).unwrap();
        assert!(json.get("overall").is_none());
        assert!(json.get("words").is_none());
        assert_eq!(json["exact_match"], false);
        assert_eq!(json["reference_text"], "a");
        assert!(json.get("ref_text").is_none());
    }
}
