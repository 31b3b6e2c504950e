//! Result and error types for Revelar.

use thiserror::Error;

/// Result type for Revelar operations
pub type RevelarResult<T> = Result<T, RevelarError>;

/// Errors that can occur in Revelar
#[derive(Debug, Error)]
pub enum RevelarError {
    /// No section source was configured at construction time
    #[error("No section source configured. Provide `sections` or `modules` in EngineConfig")]
    MissingSections,

    /// The removed path-based section discovery mechanism was invoked
    #[error(
        "`sections_path` discovery was removed. Pre-register section factories and pass them \
         via `EngineConfig::with_modules` instead"
    )]
    SectionsPathRemoved,

    /// An animation driver reported a failure
    #[error("Animation failed on node {node}: {message}")]
    AnimationFailed {
        /// Node the animation targeted
        node: String,
        /// Error message
        message: String,
    },

    /// A section's reveal behavior failed
    #[error("Reveal failed for section `{name}`: {message}")]
    RevealFailed {
        /// Declared section name
        name: String,
        /// Error message
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sections_display() {
        let err = RevelarError::MissingSections;
        assert!(err.to_string().contains("No section source"));
    }

    #[test]
    fn test_sections_path_removed_names_replacement() {
        let err = RevelarError::SectionsPathRemoved;
        let message = err.to_string();
        assert!(message.contains("removed"));
        assert!(message.contains("with_modules"));
    }

    #[test]
    fn test_reveal_failed_carries_section_name() {
        let err = RevelarError::RevealFailed {
            name: "card-grid".to_string(),
            message: "target detached".to_string(),
        };
        assert!(err.to_string().contains("card-grid"));
        assert!(err.to_string().contains("target detached"));
    }

    #[test]
    fn test_animation_failed_display() {
        let err = RevelarError::AnimationFailed {
            node: "node#3".to_string(),
            message: "driver closed".to_string(),
        };
        assert!(err.to_string().contains("node#3"));
    }

    #[test]
    fn test_error_is_std_error() {
        let err: &dyn std::error::Error = &RevelarError::MissingSections;
        assert!(!err.to_string().is_empty());
    }
}
