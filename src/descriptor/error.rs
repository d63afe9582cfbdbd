//! Error types for descriptor and entry-module reading.

/// Descriptor errors.
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    /// Input could not be tokenized into key/value pairs at all.
    #[error("malformed descriptor: {reason}")]
    Malformed { reason: String },

    /// JSON interchange failed.
    #[error("invalid descriptor JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl DescriptorError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }
}
