// SPDX-License-Identifier: Apache-2.0

//! Photo classification. The vision model is advisory; any failure
//! degrades to a neutral assessment instead of failing the submission.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use civiclens_model::Photo;
use serde_json::Value;

pub const FALLBACK_SEVERITY_TEXT: &str =
    "Severity appears moderate based on visible evidence.";

const CLASSIFY_PROMPT: &str = "Analyze this image of a civic issue in Sri Lanka. Classify it as \
exactly one of: pothole, streetlight, garbage, water, tree, other. Return ONLY valid JSON in this \
format:\n{\n  category: string,\n  confidence: float between 0 and 1,\n  severity_score: integer \
between 1 and 10,\n  severity_text: string (one sentence explaining severity)\n}\nDo not include \
markdown, backticks, or any other text.";

/// What the classifier concluded about a photo. `category` is the raw
/// model label; intake normalization maps it onto the category enum.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub category: String,
    pub confidence: f64,
    pub severity_score: i64,
    pub severity_text: String,
}

impl Classification {
    /// Neutral mid-scale assessment used whenever no model verdict is
    /// available.
    #[must_use]
    pub fn fallback(category: &str) -> Self {
        Self {
            category: category.to_string(),
            confidence: 0.5,
            severity_score: 5,
            severity_text: FALLBACK_SEVERITY_TEXT.to_string(),
        }
    }
}

#[async_trait]
pub trait IssueClassifier: Send + Sync {
    fn enabled(&self) -> bool;

    /// Never fails; an unreachable or incoherent model yields the
    /// fallback assessment with category `other`.
    async fn classify(&self, photo: &Photo) -> Classification;
}

#[derive(Debug, Default)]
pub struct DisabledClassifier;

#[async_trait]
impl IssueClassifier for DisabledClassifier {
    fn enabled(&self) -> bool {
        false
    }

    async fn classify(&self, _photo: &Photo) -> Classification {
        Classification::fallback("other")
    }
}

pub struct GeminiClassifier {
    api_key: String,
    model: String,
    http: reqwest::Client,
}

impl GeminiClassifier {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: "gemini-1.5-flash".to_string(),
            http: reqwest::Client::new(),
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    async fn request_verdict(&self, photo: &Photo) -> Result<Classification, String> {
        let mime = if photo.mime.is_empty() {
            "image/jpeg"
        } else {
            &photo.mime
        };
        let body = serde_json::json!({
            "contents": [{
                "parts": [
                    { "text": CLASSIFY_PROMPT },
                    { "inline_data": { "mime_type": mime, "data": BASE64.encode(&photo.bytes) } },
                ],
            }],
        });
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key
        );
        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !response.status().is_success() {
            return Err(format!("model answered {}", response.status()));
        }
        let payload: Value = response.json().await.map_err(|e| e.to_string())?;
        let text = payload["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or("response carried no text part")?;
        parse_verdict(text).ok_or_else(|| "verdict was not the requested json shape".to_string())
    }
}

#[async_trait]
impl IssueClassifier for GeminiClassifier {
    fn enabled(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn classify(&self, photo: &Photo) -> Classification {
        if photo.bytes.is_empty() {
            return Classification::fallback("other");
        }
        match self.request_verdict(photo).await {
            Ok(verdict) => verdict,
            Err(reason) => {
                tracing::warn!(%reason, "photo classification failed, using fallback");
                Classification::fallback("other")
            }
        }
    }
}

/// Models wrap the JSON in code fences often enough that stripping them
/// is part of the contract.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    let inner = trimmed.trim_matches('`').trim();
    inner.strip_prefix("json").unwrap_or(inner).trim()
}

fn parse_verdict(text: &str) -> Option<Classification> {
    let payload: Value = serde_json::from_str(strip_code_fences(text)).ok()?;
    let category = payload
        .get("category")
        .and_then(Value::as_str)
        .unwrap_or("other")
        .trim()
        .to_lowercase();
    let confidence = payload
        .get("confidence")
        .and_then(Value::as_f64)
        .unwrap_or(0.5);
    let severity_score = payload
        .get("severity_score")
        .and_then(Value::as_i64)
        .unwrap_or(5);
    let severity_text = payload
        .get("severity_text")
        .and_then(Value::as_str)
        .unwrap_or(FALLBACK_SEVERITY_TEXT)
        .to_string();
    Some(Classification {
        category,
        confidence: confidence.clamp(0.0, 1.0),
        severity_score: severity_score.clamp(1, 10),
        severity_text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_verdicts_parse() {
        let fenced = "```json\n{\"category\": \"Pothole\", \"confidence\": 0.92, \
                      \"severity_score\": 7, \"severity_text\": \"Deep and wide.\"}\n```";
        let verdict = parse_verdict(fenced).expect("parse");
        assert_eq!(verdict.category, "pothole");
        assert_eq!(verdict.confidence, 0.92);
        assert_eq!(verdict.severity_score, 7);
        assert_eq!(verdict.severity_text, "Deep and wide.");
    }

    #[test]
    fn out_of_range_values_clamp() {
        let wild = "{\"category\": \"garbage\", \"confidence\": 3.5, \"severity_score\": 40}";
        let verdict = parse_verdict(wild).expect("parse");
        assert_eq!(verdict.confidence, 1.0);
        assert_eq!(verdict.severity_score, 10);
        assert_eq!(verdict.severity_text, FALLBACK_SEVERITY_TEXT);
    }

    #[test]
    fn non_json_verdicts_are_rejected() {
        assert!(parse_verdict("the pothole looks bad").is_none());
    }

    #[test]
    fn fallback_is_neutral_mid_scale() {
        let fallback = Classification::fallback("streetlight");
        assert_eq!(fallback.category, "streetlight");
        assert_eq!(fallback.confidence, 0.5);
        assert_eq!(fallback.severity_score, 5);
    }
}
