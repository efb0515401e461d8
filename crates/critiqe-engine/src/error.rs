use thiserror::Error;

pub type StudioResult<T> = Result<T, StudioError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StudioError {
    #[error("unsupported format '{mime_type}' for '{filename}'; use JPEG, PNG, WEBP, HEIC, or HEIF")]
    UnsupportedFormat { filename: String, mime_type: String },

    #[error("file '{filename}' is too large ({size_bytes} bytes); max {limit_mb} MB")]
    TooLarge {
        filename: String,
        size_bytes: u64,
        limit_mb: u64,
    },

    #[error("conversion of '{filename}' failed: {reason}")]
    ConversionFailed { filename: String, reason: String },

    #[error("prompt draft failed: {0}")]
    DraftGenerationFailed(String),

    #[error("invalid image reference: {0}")]
    InvalidImageReference(String),

    #[error("generation failed: {0}")]
    GenerationFailed(String),

    #[error("transport error: {0}")]
    TransportError(String),

    #[error("no API key configured (set GEMINI_API_KEY, GOOGLE_API_KEY or API_KEY)")]
    AuthMissing,

    #[error("request cancelled")]
    Cancelled,

    #[error("another request is already in progress")]
    Busy,

    #[error("{0}")]
    MissingInput(String),

    #[error("'{action}' is not available while {state}")]
    ActionUnavailable { action: String, state: String },

    #[error("unknown {kind} '{id}'")]
    UnknownCatalogEntry { kind: &'static str, id: String },
}

impl StudioError {
    /// Input validation errors are reported before any network call and never
    /// move the workflow.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            StudioError::UnsupportedFormat { .. }
                | StudioError::TooLarge { .. }
                | StudioError::MissingInput(_)
                | StudioError::UnknownCatalogEntry { .. }
        )
    }

    /// Text suitable for showing to the person at the keyboard.
    pub fn user_message(&self) -> String {
        match self {
            StudioError::InvalidImageReference(_) => {
                "Generation failed due to an internal error. Please try again.".to_string()
            }
            StudioError::DraftGenerationFailed(_) => {
                "Failed to generate prompt idea. Please try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::StudioError;

    #[test]
    fn internal_reference_errors_are_masked_for_users() {
        let err = StudioError::InvalidImageReference("missing base64 marker".to_string());
        assert!(err.to_string().contains("missing base64 marker"));
        assert!(!err.user_message().contains("base64"));
    }

    #[test]
    fn validation_classification() {
        assert!(StudioError::TooLarge {
            filename: "a.jpg".to_string(),
            size_bytes: 1,
            limit_mb: 20,
        }
        .is_validation());
        assert!(!StudioError::GenerationFailed("no image".to_string()).is_validation());
        assert!(!StudioError::AuthMissing.is_validation());
    }
}
