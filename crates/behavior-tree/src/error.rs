//! Error types surfaced by the behavior tree crate.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BlackboardError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlackboardError {
    #[error("no key '{0}' found in blackboard")]
    MissingKey(String),

    #[error("blackboard key '{key}' does not hold a value of type {expected}")]
    TypeMismatch { key: String, expected: &'static str },

    #[error("blackboard key '{0}' is already present")]
    DuplicateKey(String),
}
