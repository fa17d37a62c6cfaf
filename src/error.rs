use std::fmt;
use thiserror::Error;

/// Stage of a contract call that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStage {
    Build,
    Sign,
    Submit,
    Confirm,
}

impl fmt::Display for CallStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CallStage::Build => "build",
            CallStage::Sign => "sign",
            CallStage::Submit => "submit",
            CallStage::Confirm => "confirm",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(String),

    /// Structured rejection returned by the node. The message is the node's own text.
    #[error("Rejected by node{}: {message}", code.map(|c| format!(" ({c})")).unwrap_or_default())]
    RpcRejected { code: Option<i64>, message: String },

    #[error("Transaction {tx_id} not confirmed after {attempts} attempts")]
    Timeout { tx_id: String, attempts: u32 },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{stage} stage failed: {source}")]
    Call {
        stage: CallStage,
        #[source]
        source: Box<SdkError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
}

impl SdkError {
    /// Wrap this error with the call stage that produced it.
    pub fn at_stage(self, stage: CallStage) -> Self {
        SdkError::Call {
            stage,
            source: Box::new(self),
        }
    }

    /// The innermost error, with any stage annotations removed.
    pub fn root(&self) -> &SdkError {
        match self {
            SdkError::Call { source, .. } => source.root(),
            other => other,
        }
    }

    /// The stage annotation, if this error came out of a contract call.
    pub fn stage(&self) -> Option<CallStage> {
        match self {
            SdkError::Call { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Transport failures may be retried. Everything else needs a changed
    /// request or a re-query by transaction id.
    pub fn is_retryable(&self) -> bool {
        matches!(self.root(), SdkError::Network(_) | SdkError::Http(_))
    }
}

pub type Result<T> = core::result::Result<T, SdkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_display_keeps_node_message() {
        let err = SdkError::RpcRejected {
            code: Some(-26),
            message: "insufficient gas".to_string(),
        };
        assert_eq!(err.to_string(), "Rejected by node (-26): insufficient gas");

        let err = SdkError::RpcRejected {
            code: None,
            message: "bad nonce".to_string(),
        };
        assert_eq!(err.to_string(), "Rejected by node: bad nonce");
    }

    #[test]
    fn test_stage_annotation() {
        let err = SdkError::Network("connection refused".to_string()).at_stage(CallStage::Submit);
        assert_eq!(err.stage(), Some(CallStage::Submit));
        assert!(matches!(err.root(), SdkError::Network(_)));
        assert!(err.is_retryable());
        assert_eq!(
            err.to_string(),
            "submit stage failed: Network error: connection refused"
        );
    }

    #[test]
    fn test_timeout_not_retryable() {
        let err = SdkError::Timeout {
            tx_id: "ab".to_string(),
            attempts: 3,
        };
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("3 attempts"));
    }
}
