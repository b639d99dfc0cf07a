//! Error types for the Gazetteer core library.

use crate::Kind;
use thiserror::Error;

/// All errors that can occur within the Gazetteer core library.
#[derive(Debug, Error)]
pub enum GazetteerError {
    /// A SQLite operation failed. Raised mid-transaction this always rolls
    /// back the in-flight mutation; nothing is partially applied.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// An active sibling with the same name already exists in this scope.
    #[error("A {kind} named '{name}' already exists in this scope")]
    DuplicateName { kind: Kind, name: String },

    /// The referenced parent does not exist or is inactive.
    #[error("Parent {kind} {parent_id} not found or inactive")]
    ParentNotFound { kind: Kind, parent_id: i64 },

    /// The target node for an update/delete does not exist.
    #[error("No active {kind} with id {id}")]
    NotFound { kind: Kind, id: i64 },

    /// The opened file is not a valid location registry database.
    #[error("Invalid registry database: {0}")]
    InvalidDatabase(String),
}

/// Convenience alias that pins the error type to [`GazetteerError`].
pub type Result<T> = std::result::Result<T, GazetteerError>;

impl GazetteerError {
    /// Returns a short, human-readable message suitable for display to the end user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Database(e) => format!("Failed to save: {e}"),
            Self::DuplicateName { kind, name } => {
                format!("A {kind} named '{name}' already exists")
            }
            Self::ParentNotFound { kind, .. } => {
                format!("The selected {kind} no longer exists")
            }
            Self::NotFound { kind, .. } => format!("This {kind} no longer exists"),
            Self::InvalidDatabase(_) => "Could not open registry database".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_name_message_names_the_scope() {
        let e = GazetteerError::DuplicateName {
            kind: Kind::City,
            name: "Manila".to_string(),
        };
        assert!(e.to_string().contains("city"));
        assert!(e.to_string().contains("Manila"));
    }

    #[test]
    fn test_user_message_is_short() {
        let e = GazetteerError::NotFound {
            kind: Kind::Barangay,
            id: 9,
        };
        assert_eq!(e.user_message(), "This barangay no longer exists");
    }
}
