//! Error types for talk-mcp

use thiserror::Error;

/// Result type alias for talk-mcp operations
pub type Result<T> = std::result::Result<T, Error>;

/// Operational failures surfaced to tool callers
///
/// User-input conditions (unknown sample, unknown template) are not errors;
/// they are reported through [`crate::tools::ToolOutcome::NotFound`].
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Text-to-speech request failed
    #[error("synthesis failed: {0}")]
    Tts(String),

    /// Player subprocess failed or could not be started
    #[error("playback failed: {0}")]
    Playback(String),

    /// Template registry could not be parsed or validated
    #[error("invalid template registry: {0}")]
    Template(String),

    /// Tool arguments missing or malformed
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Tool name not recognized
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Stable machine-readable kind for this error
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "configuration",
            Self::Tts(_) => "synthesis_failed",
            Self::Playback(_) => "playback_failed",
            Self::Template(_) => "template_invalid",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::UnknownTool(_) => "unknown_tool",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
        }
    }

    /// Whether the caller sent something the server cannot act on
    #[must_use]
    pub const fn is_caller_error(&self) -> bool {
        matches!(self, Self::InvalidArgument(_) | Self::UnknownTool(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_distinguishes_operational_failures() {
        assert_eq!(Error::Tts("quota".to_string()).kind(), "synthesis_failed");
        assert_eq!(Error::Playback("exit 1".to_string()).kind(), "playback_failed");
        assert!(!Error::Tts("quota".to_string()).is_caller_error());
        assert!(Error::UnknownTool("nope".to_string()).is_caller_error());
    }

    #[test]
    fn test_display_includes_cause() {
        let err = Error::Tts("401 Unauthorized".to_string());
        assert_eq!(err.to_string(), "synthesis failed: 401 Unauthorized");
    }
}
