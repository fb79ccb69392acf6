//! Shared error types for the engine.
//!
//! Invalid quiz navigation is a programmer error and always surfaces as an
//! explicit `Err`; silently ignoring an unknown question or answer id would
//! corrupt the score invariants. Privacy-gated tracking, by contrast, is not
//! an error at all and never reaches this module.

use thiserror::Error;

/// Main error type for leadmap operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A question id not present in the quiz catalog.
    #[error("unknown quiz question: {0}")]
    UnknownQuestion(String),

    /// An answer id not offered by the referenced question.
    #[error("unknown answer '{answer_id}' for question '{question_id}'")]
    UnknownAnswer {
        question_id: String,
        answer_id: String,
    },

    /// `skip_question` called on a question whose `skippable` flag is false.
    #[error("question '{0}' is not skippable")]
    NotSkippable(String),

    /// Quiz navigation past the final step.
    #[error("quiz step {step} out of bounds (total steps: {total})")]
    StepOutOfBounds { step: usize, total: usize },

    /// Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Rule file validation errors
    #[error("rule validation error: {0}")]
    RuleValidation(String),

    /// Session script errors (CLI replay input)
    #[error("session script error: {0}")]
    SessionScript(String),

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a rule validation error
    pub fn rule_validation(message: impl Into<String>) -> Self {
        Self::RuleValidation(message.into())
    }

    /// Create a session script error
    pub fn session_script(message: impl Into<String>) -> Self {
        Self::SessionScript(message.into())
    }
}

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, EngineError>;
