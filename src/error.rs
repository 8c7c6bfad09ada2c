// error.rs - Error taxonomy for loading, validation, analysis and packaging

use std::fmt;
use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, BioenvError>;

/// A single malformed record or line found while parsing input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatIssue {
    /// 1-based line number, when the parser knows it
    pub line: Option<usize>,
    /// 0-based record index, when the parser knows it
    pub record: Option<usize>,
    pub message: String,
}

impl FormatIssue {
    pub fn at_line(line: usize, message: impl Into<String>) -> Self {
        Self {
            line: Some(line),
            record: None,
            message: message.into(),
        }
    }

    pub fn at_record(record: usize, message: impl Into<String>) -> Self {
        Self {
            line: None,
            record: Some(record),
            message: message.into(),
        }
    }

    pub fn general(message: impl Into<String>) -> Self {
        Self {
            line: None,
            record: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for FormatIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.record) {
            (Some(line), _) => write!(f, "line {}: {}", line, self.message),
            (None, Some(record)) => write!(f, "record {}: {}", record + 1, self.message),
            (None, None) => write!(f, "{}", self.message),
        }
    }
}

/// Every malformed record found in one input, in input order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatIssues(pub Vec<FormatIssue>);

impl FormatIssues {
    pub fn single(issue: FormatIssue) -> Self {
        Self(vec![issue])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FormatIssue> {
        self.0.iter()
    }
}

impl fmt::Display for FormatIssues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [] => write!(f, "unparseable input"),
            [only] => write!(f, "{}", only),
            [first, rest @ ..] => write!(f, "{} (and {} more)", first, rest.len()),
        }
    }
}

/// Errors produced by the bioenv core
#[derive(Debug, Error)]
pub enum BioenvError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input structure could not be parsed
    #[error("Format error: {0}")]
    Format(FormatIssues),

    /// Input contained no records
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Every record was excluded by validation
    #[error("No usable records after validation ({excluded} of {checked} records excluded)")]
    EmptyAfterValidation { checked: usize, excluded: usize },

    /// Invalid analysis or simulation parameter
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input is valid but degenerate for the requested computation
    #[error("Computation error: {0}")]
    Computation(String),

    /// The caller cancelled a long-running computation
    #[error("Cancelled after {completed} of {total} work units")]
    Cancelled { completed: usize, total: usize },

    /// An operation needed a dataset but the session has none
    #[error("No dataset loaded in this session")]
    NoDataset,

    /// Packaged output could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A programming defect: an internal invariant does not hold
    #[error("Internal invariant violated: {0}")]
    Internal(String),
}

impl BioenvError {
    pub fn format(issue: FormatIssue) -> Self {
        BioenvError::Format(FormatIssues::single(issue))
    }

    /// True for errors the user can fix by changing input or parameters
    pub fn is_user_error(&self) -> bool {
        !matches!(
            self,
            BioenvError::Internal(_) | BioenvError::Io(_) | BioenvError::Serialization(_)
        )
    }
}

impl From<serde_json::Error> for BioenvError {
    fn from(e: serde_json::Error) -> Self {
        BioenvError::Serialization(e.to_string())
    }
}

impl From<rmp_serde::encode::Error> for BioenvError {
    fn from(e: rmp_serde::encode::Error) -> Self {
        BioenvError::Serialization(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for BioenvError {
    fn from(e: rmp_serde::decode::Error) -> Self {
        BioenvError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_issues_display() {
        let issues = FormatIssues(vec![
            FormatIssue::at_line(3, "expected 4 columns, found 2"),
            FormatIssue::at_line(7, "expected 4 columns, found 5"),
        ]);
        let msg = BioenvError::Format(issues).to_string();
        assert!(msg.contains("line 3"));
        assert!(msg.contains("1 more"));
    }

    #[test]
    fn test_user_error_classification() {
        assert!(BioenvError::EmptyInput("no bytes".into()).is_user_error());
        assert!(BioenvError::Config("window".into()).is_user_error());
        assert!(!BioenvError::Internal("matrix not square".into()).is_user_error());
    }
}
