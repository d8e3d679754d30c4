use std::fmt;

use thiserror::Error;

pub type HrResult<T> = Result<T, HrError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HrError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("employee {0} not found")]
    NotFound(String),
}

impl HrError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }
}

/// Rejected caller input. Nothing is mutated when one of these is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("employee field `{field}` {problem}")]
    Employee {
        field: &'static str,
        problem: FieldProblem,
    },
    #[error("review {0}")]
    Review(FieldProblem),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldProblem {
    Missing,
    NotText,
    Empty,
}

impl fmt::Display for FieldProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FieldProblem::Missing => "is missing",
            FieldProblem::NotText => "must be a string",
            FieldProblem::Empty => "must not be empty",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_field() {
        let err: HrError = ValidationError::Employee {
            field: "contact",
            problem: FieldProblem::Empty,
        }
        .into();
        assert_eq!(err.to_string(), "employee field `contact` must not be empty");

        let err: HrError = ValidationError::Review(FieldProblem::NotText).into();
        assert_eq!(err.to_string(), "review must be a string");

        assert_eq!(HrError::not_found("abc").to_string(), "employee abc not found");
    }
}
