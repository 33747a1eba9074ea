//! Error and result types for the query compiler.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A payload key or value does not have the expected shape.
    #[error("invalid `{key}`: expected {expected}, got {actual}")]
    Shape {
        key: String,
        expected: String,
        actual: String,
    },

    /// Parts of a statement cannot be combined, e.g. a subquery bound to a
    /// different parameter allocator than its parent.
    #[error("composition error: {0}")]
    Composition(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn shape(
        key: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Error::Shape {
            key: key.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// True for shape and composition errors, the two kinds of constraint
    /// violation the compiler raises on its own.
    pub fn is_constraint(&self) -> bool {
        matches!(self, Error::Shape { .. } | Error::Composition(_))
    }

    /// The offending key of a shape error.
    pub fn key(&self) -> Option<&str> {
        match self {
            Error::Shape { key, .. } => Some(key),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn shape_error_names_key_expected_and_actual() {
        let err = Error::shape("identifiers", "a non-empty list", "[]");
        assert_eq!(
            err.to_string(),
            "invalid `identifiers`: expected a non-empty list, got []"
        );
        assert_eq!(err.key(), Some("identifiers"));
        assert!(err.is_constraint());
    }

    #[test]
    fn json_errors_are_not_constraint_violations() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").expect_err("invalid json");
        let err: Error = json_err.into();
        assert!(!err.is_constraint());
        assert_eq!(err.key(), None);
    }
}
