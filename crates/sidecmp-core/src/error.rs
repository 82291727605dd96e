//! Error types for the comparison engine.

use std::fmt;

/// Which of the two inputs an error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Original,
    Altered,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Original => f.write_str("original"),
            Side::Altered => f.write_str("altered"),
        }
    }
}

/// The size ceiling that an input exceeded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LimitKind {
    Bytes,
    Lines,
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitKind::Bytes => f.write_str("bytes"),
            LimitKind::Lines => f.write_str("lines"),
        }
    }
}

/// Errors that can occur while comparing two inputs.
#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    /// Property-file syntax could not be parsed.
    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// One of the inputs exceeds a configured size ceiling.
    #[error("{side} input too large: {actual} {kind} exceeds the limit of {limit}")]
    InputTooLarge {
        side: Side,
        kind: LimitKind,
        actual: usize,
        limit: usize,
    },

    /// Engine configuration is invalid or could not be read.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl CompareError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        CompareError::Parse {
            line,
            message: message.into(),
        }
    }
}

/// Convenience alias for comparison results.
pub type Result<T> = std::result::Result<T, CompareError>;
