use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Variant shown when the backend could not classify the answers.
pub const FALLBACK_RESULT_CODE: u32 = 1;

/// Scored outcome returned by the backend.
///
/// Only `code` drives behavior, so it must be present (it may be `null`).
/// Everything else is carried for display: a display field of the wrong type
/// is dropped instead of failing the whole body. Unknown response fields
/// (echoed answers, raw score tables) are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    #[serde(deserialize_with = "nullable_code")]
    code: Option<u32>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    image: Option<String>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    skin_age: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    percentile: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    total_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    a_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    b_type: Option<String>,
}

/// Display-only numbers attached to a result.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DerivedMetrics {
    pub skin_age: Option<f64>,
    pub percentile: Option<f64>,
    pub total_score: Option<f64>,
}

// A custom deserializer makes serde treat a missing `code` as an error
// instead of defaulting it to `None`.
fn nullable_code<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<u32>::deserialize(deserializer)
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .and_then(|value| value.as_f64())
        .filter(|number| number.is_finite()))
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Some(text),
        _ => None,
    })
}

impl QuizResult {
    #[must_use]
    pub fn new(code: u32) -> Self {
        Self {
            code: Some(code),
            image: None,
            skin_age: None,
            percentile: None,
            total_score: None,
            a_type: None,
            b_type: None,
        }
    }

    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: DerivedMetrics) -> Self {
        self.skin_age = metrics.skin_age;
        self.percentile = metrics.percentile;
        self.total_score = metrics.total_score;
        self
    }

    /// Code as computed by the backend; `None` if no variant matched.
    #[must_use]
    pub fn code(&self) -> Option<u32> {
        self.code
    }

    /// Code used for display and share links.
    #[must_use]
    pub fn display_code(&self) -> u32 {
        self.code.unwrap_or(FALLBACK_RESULT_CODE)
    }

    /// Path of the result artifact, as given by the backend or derived from the code.
    #[must_use]
    pub fn image_ref(&self) -> String {
        match &self.image {
            Some(image) if !image.trim().is_empty() => image.clone(),
            _ => self.default_image_ref(),
        }
    }

    /// Artifact path derived from the code alone, ignoring the backend's image.
    #[must_use]
    pub fn default_image_ref(&self) -> String {
        format!("/assets/result-{}.png", self.display_code())
    }

    #[must_use]
    pub fn metrics(&self) -> DerivedMetrics {
        DerivedMetrics {
            skin_age: self.skin_age,
            percentile: self.percentile,
            total_score: self.total_score,
        }
    }

    #[must_use]
    pub fn type_labels(&self) -> (Option<&str>, Option<&str>) {
        (self.a_type.as_deref(), self.b_type.as_deref())
    }
}
