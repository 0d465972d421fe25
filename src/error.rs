//! @acp:module "Errors"
//! @acp:summary "Error types for projection, hook output and config loading"
//! @acp:domain serialization
//! @acp:layer model
//!
//! Projection is lenient: malformed directives, inaccessible values and
//! unparseable exclusion literals all degrade to "omit this field". The only
//! projection failure that reaches the caller is a custom hook failing.

use thiserror::Error;

/// @acp:summary "Crate-wide result alias"
pub type Result<T> = std::result::Result<T, SieveError>;

/// @acp:summary "Errors surfaced by the projection engine"
#[derive(Debug, Error)]
pub enum SieveError {
    /// A type's custom serialization hook returned an error.
    #[error("custom projection for {type_name} failed: {source}")]
    Hook {
        type_name: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// A custom hook returned bytes that are not a single JSON value.
    #[error("custom projection for {type_name} produced invalid JSON: {source}")]
    InvalidHookOutput {
        type_name: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SieveError {
    /// Get an error code for this error type.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Hook { .. } => "HOOK_FAILED",
            Self::InvalidHookOutput { .. } => "INVALID_HOOK_OUTPUT",
            Self::Json(_) => "JSON",
            Self::Io(_) => "IO",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hook_error_names_type() {
        let err = SieveError::Hook {
            type_name: "Money",
            source: anyhow::anyhow!("currency missing"),
        };
        assert_eq!(err.code(), "HOOK_FAILED");
        assert_eq!(
            err.to_string(),
            "custom projection for Money failed: currency missing"
        );
    }

    #[test]
    fn test_json_error_converts() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: SieveError = json_err.into();
        assert_eq!(err.code(), "JSON");
    }
}
