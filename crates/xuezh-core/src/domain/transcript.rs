//! Transcripts produced by speech recognition.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A timed span of recognized speech.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub text: String,
}

/// Recognized text with optional timing detail.
///
/// Segments keep the order the recognizer produced them in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segments: Option<Vec<Segment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Per-word breakdown when the recognizer supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub words: Option<Vec<Value>>,
}

impl Transcript {
    /// Transcript carrying only text.
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Build from a whisper JSON document, tolerating missing fields.
    pub fn from_whisper_json(raw: &Value) -> Self {
        let text = raw
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string();
        let segments = raw
            .get("segments")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter(|item| item.is_object())
                    .map(|item| Segment {
                        start: item.get("start").and_then(Value::as_f64),
                        end: item.get("end").and_then(Value::as_f64),
                        text: match item.get("text") {
                            Some(Value::String(s)) => s.trim().to_string(),
                            Some(Value::Null) | None => String::new(),
                            Some(other) => other.to_string(),
                        },
                    })
                    .collect()
            })
            .unwrap_or_default();
        let language = raw
            .get("language")
            .and_then(Value::as_str)
            .filter(|l| !l.is_empty())
            .map(str::to_string);

        Self {
            text,
            segments: Some(segments),
            language,
            words: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_whisper_json_extraction() {
        let raw = json!({
            "text": "  你好 世界 ",
            "language": "zh",
            "segments": [
                {"start": 0.0, "end": 1.2, "text": " 你好 "},
                "garbage",
                {"start": 1.2, "end": 2.0, "text": "世界"}
            ]
        });
        let transcript = Transcript::from_whisper_json(&raw);
        assert_eq!(transcript.text, "你好 世界");
        assert_eq!(transcript.language.as_deref(), Some("zh"));
        let segments = transcript.segments.unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "你好");
        assert_eq!(segments[1].start, Some(1.2));
    }

    #[test]
    fn test_whisper_json_missing_fields() {
        let transcript = Transcript::from_whisper_json(&json!({}));
        assert_eq!(transcript.text, "");
        assert_eq!(transcript.segments, Some(Vec::new()));
        assert!(transcript.language.is_none());
    }
}
