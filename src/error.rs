//! Error types for configuration and construction.
//!
//! Nothing in the tick path can fail: every error here is raised when a
//! component is built or reconfigured, never when a timer fires or an
//! event is dispatched.

/// Convenience result type used across spark-showcase.
pub type ShowcaseResult<T> = Result<T, ShowcaseError>;

/// Configuration errors reported at initialization.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ShowcaseError {
    /// The typewriter needs at least one phrase to cycle through.
    #[error("phrase list must not be empty")]
    EmptyPhraseList,

    /// A typing or deleting interval of zero would never let time advance.
    #[error("invalid typewriter timing: {0}")]
    InvalidTiming(String),

    /// The scroll tracker was given no sections to resolve.
    #[error("section list must not be empty")]
    NoSections,

    /// The same section id was declared twice.
    #[error("duplicate section id: {0}")]
    DuplicateSection(String),

    /// Pointer parallax divisor must be finite and non-zero.
    #[error("invalid parallax divisor: {0}")]
    InvalidDivisor(f64),

    /// Configuration document could not be parsed.
    #[error("config error: {0}")]
    Config(String),
}

impl ShowcaseError {
    /// Build a [`ShowcaseError::InvalidTiming`] value.
    pub fn invalid_timing(msg: impl Into<String>) -> Self {
        Self::InvalidTiming(msg.into())
    }
}

impl From<serde_json::Error> for ShowcaseError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_readable() {
        assert_eq!(
            ShowcaseError::EmptyPhraseList.to_string(),
            "phrase list must not be empty"
        );
        assert_eq!(
            ShowcaseError::DuplicateSection("about".into()).to_string(),
            "duplicate section id: about"
        );
        assert_eq!(
            ShowcaseError::invalid_timing("typing interval is 0").to_string(),
            "invalid typewriter timing: typing interval is 0"
        );
    }

    #[test]
    fn test_json_error_converts_to_config() {
        let err: ShowcaseError = serde_json::from_str::<u32>("not json").unwrap_err().into();
        assert!(matches!(err, ShowcaseError::Config(_)));
    }
}
