use thiserror::Error;

/// Top-level error type for stockscan.
#[derive(Debug, Error)]
pub enum StockError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("capture device error: {0}")]
    Device(String),

    #[error("missing or invalid API key")]
    MissingApiKey,

    #[error("network error ({provider}): {message}")]
    Network { provider: String, message: String },

    #[error("{provider} returned HTTP {status}: {body}")]
    Http {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("extraction timed out after {0}s")]
    Timeout(u64),

    #[error("the model could not read the image (empty response)")]
    EmptyResponse,

    #[error("malformed extraction response: {0}")]
    MalformedResponse(String),

    #[error("an item is already awaiting confirmation")]
    PendingSlotOccupied,

    #[error("no item is awaiting confirmation")]
    NoPendingItem,

    #[error("scanner busy: {0}")]
    Busy(String),

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StockError {
    /// Failures of the extraction round trip. These are transient: the scanner
    /// shows them for a while and then returns to ready.
    pub fn is_extraction_failure(&self) -> bool {
        matches!(
            self,
            StockError::MissingApiKey
                | StockError::Network { .. }
                | StockError::Http { .. }
                | StockError::Timeout(_)
                | StockError::EmptyResponse
                | StockError::MalformedResponse(_)
        )
    }

    /// Failures that stay on screen until the user intervenes.
    pub fn is_persistent(&self) -> bool {
        matches!(self, StockError::Device(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(StockError::EmptyResponse.is_extraction_failure());
        assert!(StockError::Http {
            provider: "gemini".into(),
            status: 403,
            body: "denied".into()
        }
        .is_extraction_failure());
        assert!(!StockError::Storage("disk full".into()).is_extraction_failure());
        assert!(StockError::Device("permission denied".into()).is_persistent());
        assert!(!StockError::Timeout(60).is_persistent());
    }

    #[test]
    fn test_http_error_display() {
        let err = StockError::Http {
            provider: "gemini".into(),
            status: 401,
            body: "API key not valid".into(),
        };
        assert_eq!(err.to_string(), "gemini returned HTTP 401: API key not valid");
    }
}
