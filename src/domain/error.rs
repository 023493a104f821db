use std::fmt;

use thiserror::Error;

/// One rejected field and the rule it broke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("validation failed: {}", join_issues(.0))]
    Validation(Vec<FieldIssue>),
}

impl DomainError {
    pub fn field(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldIssue {
            field,
            message: message.into(),
        }])
    }

    /// Fields named by a validation failure, in report order.
    pub fn fields(&self) -> Vec<&'static str> {
        let DomainError::Validation(issues) = self;
        issues.iter().map(|issue| issue.field).collect()
    }
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
