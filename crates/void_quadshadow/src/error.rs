//! Error types for quadrant shadow allocation

use thiserror::Error;

/// Errors from the quadrant shadow allocator
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuadShadowError {
    /// A required collaborator is missing or its settings are unusable
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Operation requires `initialize` to have run first
    #[error("Allocator is not initialized")]
    NotInitialized,

    /// Allocator was disposed and cannot be used again
    #[error("Allocator has been disposed")]
    Disposed,
}

impl QuadShadowError {
    /// Shorthand for a missing collaborator
    pub(crate) fn missing(what: &str) -> Self {
        Self::Configuration(format!("missing {}", what))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, QuadShadowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = QuadShadowError::missing("source light");
        assert_eq!(err.to_string(), "Configuration error: missing source light");
        assert_eq!(QuadShadowError::NotInitialized.to_string(), "Allocator is not initialized");
    }
}
