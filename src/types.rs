use serde::{Deserialize, Serialize};

/// Outcome tag carried by operation-level envelopes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    Success,
    Error,
}

/// Envelope returned by quiz generation.
///
/// `questions` holds the model's raw text on success and is `None` on error;
/// the two are never set together. The backend does not guarantee well-formed
/// JSON, so validating the question payload is the caller's responsibility.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuizGeneration {
    pub questions: Option<String>,
    pub status: GenerationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QuizGeneration {
    pub(crate) fn success(questions: String) -> Self {
        Self {
            questions: Some(questions),
            status: GenerationStatus::Success,
            error: None,
        }
    }

    pub(crate) fn error(message: String) -> Self {
        Self {
            questions: None,
            status: GenerationStatus::Error,
            error: Some(message),
        }
    }
}

/// Envelope returned by content analysis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContentAnalysis {
    pub analysis: String,
    pub status: GenerationStatus,
}
