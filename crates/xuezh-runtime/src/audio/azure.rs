//! Pronunciation assessment through the Azure Speech REST API.
//!
//! One request per assessment: the WAV body is POSTed with the assessment
//! parameters base64-encoded in a header. No retries.
//!
//! # Failure classification
//!
//! | Condition                                   | Failure |
//! |---------------------------------------------|---------|
//! | HTTP 429                                    | Quota   |
//! | HTTP 401 / 403                              | Auth    |
//! | body mentions `quota`, `limit` or `429`     | Quota   |
//! | body mentions `401`, `403` or `unauthorized`| Auth    |
//! | anything else, transport, parse             | Backend |
//!
//! Body matching only applies when the status alone did not decide, and an
//! auth match wins over a quota match.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};

use xuezh_core::domain::{OverallScores, WordAssessment};
use xuezh_core::{
    Assessment, AzureCredentialSources, CloudAssessment, PronunciationAssessor, SpeechFailure,
    Transcript, XuezhError,
};

/// Request deadline for the single HTTP call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const RECOGNITION_PATH: &str =
    "/speech/recognition/conversation/cognitiveservices/v1?language=zh-CN&format=detailed";
const AUDIO_CONTENT_TYPE: &str = "audio/wav; codecs=audio/pcm; samplerate=16000";

/// Azure Speech pronunciation assessor.
///
/// Credentials are resolved on each call, so constructing the assessor never
/// fails and local-only runs never need them.
#[derive(Debug, Clone)]
pub struct AzureSpeechAssessor {
    sources: AzureCredentialSources,
    endpoint: Option<String>,
    timeout: Duration,
}

impl AzureSpeechAssessor {
    pub const fn new(sources: AzureCredentialSources) -> Self {
        Self {
            sources,
            endpoint: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Replace the regional base URL, e.g. with a local test server.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: Option<String>) -> Self {
        self.endpoint = endpoint.filter(|e| !e.trim().is_empty());
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn url(&self, region: &str) -> String {
        let base = self.endpoint.as_ref().map_or_else(
            || format!("https://{region}.stt.speech.microsoft.com"),
            |e| e.trim_end_matches('/').to_string(),
        );
        format!("{base}{RECOGNITION_PATH}")
    }
}

fn transport_error(e: &reqwest::Error) -> XuezhError {
    XuezhError::speech(
        SpeechFailure::Backend,
        "Azure Speech request failed",
        json!({ "error": e.to_string() }),
    )
}

#[async_trait]
impl PronunciationAssessor for AzureSpeechAssessor {
    async fn assess(
        &self,
        reference_text: &str,
        wav: &Path,
    ) -> Result<CloudAssessment, XuezhError> {
        let credentials = self.sources.clone().resolve()?;
        let params = json!({
            "ReferenceText": reference_text,
            "GradingSystem": "HundredMark",
            "Granularity": "Phoneme",
            "EnableMiscue": true,
            "Dimension": "Comprehensive",
        });
        let header = STANDARD.encode(serde_json::to_vec(&params)?);
        let body = tokio::fs::read(wav).await.map_err(XuezhError::io(wav))?;

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| transport_error(&e))?;
        let url = self.url(&credentials.region);
        debug!(%url, bytes = body.len(), "Sending pronunciation assessment");

        let response = client
            .post(&url)
            .header("Ocp-Apim-Subscription-Key", &credentials.key)
            .header("Pronunciation-Assessment", header)
            .header("Accept", "application/json")
            .header("Content-Type", AUDIO_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| transport_error(&e))?;

        if status != 200 {
            let body = text.trim();
            let failure = classify_failure(status, body);
            warn!(status, ?failure, "Azure Speech rejected the request");
            return Err(XuezhError::speech(
                failure,
                "Azure Speech request failed",
                json!({ "status": status, "error_details": body }),
            ));
        }

        let assessment = parse_response(reference_text, &text)?;
        info!(
            pronunciation = ?assessment.assessment.overall.as_ref().and_then(|o| o.pronunciation_score),
            "Azure Speech assessment complete"
        );
        Ok(assessment)
    }
}

/// Classify a non-200 response.
pub fn classify_failure(status: u16, body: &str) -> SpeechFailure {
    match status {
        429 => return SpeechFailure::Quota,
        401 | 403 => return SpeechFailure::Auth,
        _ => {}
    }
    let lowered = body.to_lowercase();
    let mentions = |needles: &[&str]| needles.iter().any(|n| lowered.contains(n));
    if mentions(&["401", "403", "unauthorized"]) {
        SpeechFailure::Auth
    } else if mentions(&["quota", "limit", "429"]) {
        SpeechFailure::Quota
    } else {
        SpeechFailure::Backend
    }
}

/// Parse a successful response body into an assessment.
pub fn parse_response(reference_text: &str, body: &str) -> Result<CloudAssessment, XuezhError> {
    let raw: Value = match serde_json::from_str(body) {
        Ok(value @ Value::Object(_)) => value,
        _ => {
            return Err(XuezhError::speech(
                SpeechFailure::Backend,
                "Azure Speech response parse failed",
                json!({ "error_details": body }),
            ));
        }
    };

    if let Some(status) = raw.get("RecognitionStatus").and_then(Value::as_str)
        && !status.is_empty()
        && status != "Success"
    {
        return Err(XuezhError::speech(
            SpeechFailure::Backend,
            format!("Azure Speech recognition failed ({status})"),
            json!({ "status": status }),
        ));
    }

    let empty = Map::new();
    let nbest = first_object(raw.get("NBest")).unwrap_or(&empty);
    let display = first_string(&[
        nbest.get("Display"),
        nbest.get("DisplayText"),
        raw.get("DisplayText"),
        raw.get("Text"),
    ]);

    let words = nbest
        .get("Words")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_object).map(word_assessment).collect())
        .unwrap_or_default();

    let assessment = Assessment {
        reference_text: reference_text.to_string(),
        transcript_text: display.clone(),
        overall: Some(overall_scores(nbest)),
        words: Some(words),
        ..Assessment::default()
    };
    Ok(CloudAssessment {
        assessment,
        transcript: Transcript::text_only(display),
        raw,
    })
}

fn first_object(value: Option<&Value>) -> Option<&Map<String, Value>> {
    match value? {
        Value::Array(items) => items.first().and_then(Value::as_object),
        Value::Object(map) => Some(map),
        _ => None,
    }
}

fn first_string(candidates: &[Option<&Value>]) -> String {
    candidates
        .iter()
        .filter_map(|v| v.and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// A field from the nested `PronunciationAssessment`, else the top level.
fn scored<'a>(entry: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    entry
        .get("PronunciationAssessment")
        .and_then(|pa| pa.get(key))
        .filter(|v| !v.is_null())
        .or_else(|| entry.get(key).filter(|v| !v.is_null()))
}

fn word_assessment(entry: &Map<String, Value>) -> WordAssessment {
    WordAssessment {
        word: entry.get("Word").and_then(Value::as_str).map(str::to_string),
        accuracy_score: scored(entry, "AccuracyScore").and_then(Value::as_f64),
        error_type: scored(entry, "ErrorType")
            .and_then(Value::as_str)
            .map(str::to_string),
        syllables: normalize_entries(entry.get("Syllables")),
        phonemes: normalize_entries(entry.get("Phonemes")),
    }
}

/// Move a top-level `AccuracyScore` under `PronunciationAssessment` so every
/// syllable and phoneme entry has the same shape.
fn normalize_entries(value: Option<&Value>) -> Option<Vec<Value>> {
    let items = value?.as_array()?;
    Some(
        items
            .iter()
            .map(|item| match item.as_object() {
                Some(entry)
                    if !entry.contains_key("PronunciationAssessment")
                        && entry.contains_key("AccuracyScore") =>
                {
                    let mut next = entry.clone();
                    let accuracy = next.remove("AccuracyScore").unwrap_or(Value::Null);
                    next.insert(
                        "PronunciationAssessment".to_string(),
                        json!({ "AccuracyScore": accuracy }),
                    );
                    Value::Object(next)
                }
                _ => item.clone(),
            })
            .collect(),
    )
}

fn overall_scores(nbest: &Map<String, Value>) -> OverallScores {
    let nested = |key: &str| {
        nbest
            .get("PronunciationAssessment")
            .and_then(|pa| pa.get(key))
            .and_then(Value::as_f64)
    };
    let top = |key: &str| nbest.get(key).and_then(Value::as_f64);
    let either = |key: &str| nested(key).or_else(|| top(key));
    OverallScores {
        accuracy_score: either("AccuracyScore"),
        fluency_score: either("FluencyScore"),
        completeness_score: either("CompletenessScore"),
        pronunciation_score: nested("PronScore")
            .or_else(|| nested("PronunciationScore"))
            .or_else(|| top("PronScore"))
            .or_else(|| top("PronunciationScore")),
    }
}
