//! Stateless repositories over `&Connection`.
//!
//! Every method is a pure translation between Rust types and SQL — no
//! caching, no held state, no transaction management. Callers that need
//! multi-statement atomicity open a `rusqlite` transaction and pass it
//! down (a `Transaction` derefs to `Connection`).

pub mod collections;
pub mod links;
pub mod notes;
pub mod tags;
pub mod tasks;
pub mod users;

use keeper_core::KeeperError;
use uuid::Uuid;

/// Generate a prefixed uuid-v7 ID (time-ordered).
pub(crate) fn generate_id(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::now_v7())
}

/// Current UTC timestamp as an ISO-8601 string.
pub(crate) fn now_iso() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Lower-cased infix LIKE pattern for case-insensitive substring matching.
pub(crate) fn like_pattern(query: &str) -> String {
    format!("%{}%", query.to_lowercase())
}

/// Map a UNIQUE-constraint violation on insert/update to a typed conflict.
///
/// Anything else stays a database error. This is the race guard behind the
/// service-level duplicate-title pre-checks: two concurrent creates with
/// the same title lose here instead of silently succeeding.
pub(crate) fn map_unique_violation(
    err: rusqlite::Error,
    entity: &'static str,
    title: &str,
) -> KeeperError {
    const SQLITE_CONSTRAINT_UNIQUE: std::os::raw::c_int = 2067;
    if let rusqlite::Error::SqliteFailure(code, _) = &err {
        if code.extended_code == SQLITE_CONSTRAINT_UNIQUE {
            return KeeperError::Conflict {
                entity,
                title: title.to_string(),
            };
        }
    }
    KeeperError::Database(err)
}

/// Append a `LIMIT`/`OFFSET` window to a query. `OFFSET` without `LIMIT`
/// uses `LIMIT -1` (SQLite's "no limit").
pub(crate) fn push_window(sql: &mut String, skip: Option<u32>, limit: Option<u32>) {
    use std::fmt::Write;
    match (limit, skip) {
        (Some(limit), Some(skip)) => {
            let _ = write!(sql, " LIMIT {limit} OFFSET {skip}");
        }
        (Some(limit), None) => {
            let _ = write!(sql, " LIMIT {limit}");
        }
        (None, Some(skip)) => {
            let _ = write!(sql, " LIMIT -1 OFFSET {skip}");
        }
        (None, None) => {}
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
