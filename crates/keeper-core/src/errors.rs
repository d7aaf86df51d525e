//! Error types for the Keeper backend.
//!
//! [`KeeperError`] is the single error type shared by the store and service
//! layers. Variants are structured per failure mode so the API layer can
//! map them to status codes without string matching. Errors propagate
//! unmodified from sub-operations; nothing is swallowed or retried.

use thiserror::Error;

use crate::types::{CollectionKind, ItemKind};

/// Errors from Keeper operations.
#[derive(Debug, Error)]
pub enum KeeperError {
    /// `SQLite` database error.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Connection pool error.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Bad input shape (e.g. a search query shorter than two characters).
    #[error("validation error: {0}")]
    Validation(String),

    /// One or more requested tag IDs do not exist or belong to another
    /// user. `missing` is sorted ascending.
    #[error("tags not found or not owned by user: {}", missing.join(", "))]
    UnownedTags {
        /// The requested-but-unresolved tag IDs, sorted ascending.
        missing: Vec<String>,
    },

    /// Entity absent or not owned by the caller.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity type (e.g. "task", "collection").
        entity: &'static str,
        /// The ID that was looked up.
        id: String,
    },

    /// Per-user uniqueness constraint violated.
    #[error("{entity} with this title already exists for the user: {title}")]
    Conflict {
        /// Entity type (e.g. "tag", "collection").
        entity: &'static str,
        /// The duplicate title.
        title: String,
    },

    /// Containment policy violation: the collection's declared kind does
    /// not accept this item kind.
    #[error("cannot add a {item} to a collection of kind '{kind}'")]
    Policy {
        /// The collection's declared kind.
        kind: CollectionKind,
        /// The rejected item kind.
        item: ItemKind,
    },

    /// Internal error (e.g. a panicked search worker).
    #[error("internal error: {0}")]
    Internal(String),
}

impl KeeperError {
    /// Not-found error for a task.
    pub fn task_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "task",
            id: id.into(),
        }
    }

    /// Not-found error for a note.
    pub fn note_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "note",
            id: id.into(),
        }
    }

    /// Not-found error for a collection.
    pub fn collection_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "collection",
            id: id.into(),
        }
    }

    /// Not-found error for a tag.
    pub fn tag_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "tag",
            id: id.into(),
        }
    }

    /// Not-found error for a user.
    pub fn user_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "user",
            id: id.into(),
        }
    }

    /// Validation error for a too-short search query.
    #[must_use]
    pub fn short_query() -> Self {
        Self::Validation("search query must be at least 2 characters long".to_string())
    }
}

/// Convenience type alias for Keeper results.
pub type Result<T> = std::result::Result<T, KeeperError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_not_found_display() {
        let err = KeeperError::task_not_found("task-123");
        assert_eq!(err.to_string(), "task not found: task-123");
    }

    #[test]
    fn unowned_tags_display_joins_missing_ids() {
        let err = KeeperError::UnownedTags {
            missing: vec!["tag-a".to_string(), "tag-b".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "tags not found or not owned by user: tag-a, tag-b"
        );
    }

    #[test]
    fn conflict_display() {
        let err = KeeperError::Conflict {
            entity: "collection",
            title: "Inbox".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "collection with this title already exists for the user: Inbox"
        );
    }

    #[test]
    fn policy_display() {
        let err = KeeperError::Policy {
            kind: CollectionKind::NotesOnly,
            item: ItemKind::Task,
        };
        assert_eq!(
            err.to_string(),
            "cannot add a task to a collection of kind 'notes-only'"
        );
    }

    #[test]
    fn short_query_is_validation() {
        let err = KeeperError::short_query();
        assert!(matches!(err, KeeperError::Validation(_)));
        assert!(err.to_string().contains("at least 2 characters"));
    }

    #[test]
    fn database_from_rusqlite() {
        let err = KeeperError::from(rusqlite::Error::QueryReturnedNoRows);
        assert!(err.to_string().contains("database error"));
    }
}
