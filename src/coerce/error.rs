//! Error types for argument coercion.

use std::fmt;

/// One schema violation with location information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaIssue {
    /// Error message describing what went wrong
    pub message: String,
    /// Dotted path inside the argument (e.g. "location.city", "items.0.price")
    pub path: Option<String>,
}

impl SchemaIssue {
    /// Create an issue with a path.
    pub fn with_path(message: impl Into<String>, path: String) -> Self {
        Self {
            message: message.into(),
            path: Some(path),
        }
    }

    /// Create an issue without path.
    pub fn without_path(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
        }
    }

    /// Create an issue from a JSON pointer (`/location/city`). The root pointer has no path.
    pub fn at_pointer(pointer: &str, message: impl Into<String>) -> Self {
        let dotted = pointer.trim_start_matches('/').replace('/', ".");
        if dotted.is_empty() {
            Self::without_path(message)
        } else {
            Self::with_path(message, dotted)
        }
    }
}

impl fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}: {}", path, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// A raw argument that does not conform to its parameter's structural type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid argument '{parameter}' for {callable}: {cause}")]
pub struct ValidationError {
    pub callable: String,
    pub parameter: String,
    /// Summary of what failed
    pub cause: String,
    /// Per-path schema violations (empty when the failure came from decoding)
    pub issues: Vec<SchemaIssue>,
}

impl ValidationError {
    pub fn from_issues(
        callable: impl Into<String>,
        parameter: impl Into<String>,
        issues: Vec<SchemaIssue>,
    ) -> Self {
        let cause = issues
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        Self {
            callable: callable.into(),
            parameter: parameter.into(),
            cause,
            issues,
        }
    }

    pub fn from_decode(
        callable: impl Into<String>,
        parameter: impl Into<String>,
        error: &serde_json::Error,
    ) -> Self {
        Self {
            callable: callable.into(),
            parameter: parameter.into(),
            cause: error.to_string(),
            issues: Vec::new(),
        }
    }

    /// Get issues as formatted strings.
    pub fn issue_messages(&self) -> Vec<String> {
        self.issues.iter().map(|e| e.to_string()).collect()
    }
}
