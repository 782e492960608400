//! Error types for the Roster Cost Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while computing attendance,
//! project cost and cost sharing.

use thiserror::Error;

/// The main error type for the Roster Cost Engine.
///
/// Warnings such as reciprocal sharing are not errors; they travel on the
/// result types as [`EngineWarning`](crate::models::EngineWarning).
///
/// # Example
///
/// ```
/// use roster_cost_engine::error::EngineError;
///
/// let error = EngineError::NotFound {
///     entity: "staff".to_string(),
///     id: "stf_001".to_string(),
/// };
/// assert_eq!(error.to_string(), "staff not found: stf_001");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// A project, staff member, roster or entry required by the operation is absent.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of record that was looked up.
        entity: String,
        /// The identifier that was not found.
        id: String,
    },

    /// An input value was out of range or not part of a closed vocabulary.
    #[error("Invalid input '{field}': {message}")]
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// Stored data contradicts an engine invariant.
    #[error("Inconsistent data: {message}")]
    Inconsistent {
        /// A description of the violated invariant.
        message: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for a [`EngineError::NotFound`].
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    /// Shorthand for a [`EngineError::InvalidInput`].
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Shorthand for a [`EngineError::Inconsistent`].
    pub fn inconsistent(message: impl Into<String>) -> Self {
        Self::Inconsistent {
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_displays_entity_and_id() {
        let error = EngineError::not_found("project", "prj_a");
        assert_eq!(error.to_string(), "project not found: prj_a");
    }

    #[test]
    fn test_invalid_input_displays_field_and_message() {
        let error = EngineError::invalid("month", "must be between 1 and 12, got 13");
        assert_eq!(
            error.to_string(),
            "Invalid input 'month': must be between 1 and 12, got 13"
        );
    }

    #[test]
    fn test_inconsistent_displays_message() {
        let error = EngineError::inconsistent("staff stf_9 does not belong to project prj_a");
        assert_eq!(
            error.to_string(),
            "Inconsistent data: staff stf_9 does not belong to project prj_a"
        );
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/bad.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/bad.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_not_found() -> EngineResult<()> {
            Err(EngineError::not_found("roster", "rst_1"))
        }

        fn propagates_error() -> EngineResult<()> {
            returns_not_found()?;
            Ok(())
        }

        assert!(matches!(
            propagates_error(),
            Err(EngineError::NotFound { .. })
        ));
    }
}
