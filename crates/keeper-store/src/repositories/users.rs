//! User repository.
//!
//! Identity rows only — credentials and profile handling live in the auth
//! layer. Deleting a user relies on the schema's cascade rules to remove
//! everything the user owns.

use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::debug;

use keeper_core::{KeeperError, Result, User, UserCreateParams};

use super::{generate_id, map_unique_violation, now_iso};

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        email: row.get("email")?,
        password_hash: row.get("password_hash")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

/// User repository — stateless, every method takes `&Connection`.
pub struct UserRepository;

impl UserRepository {
    /// Create a user. Duplicate username or email surfaces as a conflict.
    pub fn create(conn: &Connection, params: &UserCreateParams) -> Result<User> {
        let id = generate_id("user");
        let now = now_iso();
        let _ = conn
            .execute(
                "INSERT INTO users (id, username, email, password_hash, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                params![id, params.username, params.email, params.password_hash, now],
            )
            .map_err(|err| map_unique_violation(err, "user", &params.username))?;

        Self::get(conn, &id)?.ok_or_else(|| KeeperError::user_not_found(&id))
    }

    /// Get a user by ID.
    pub fn get(conn: &Connection, id: &str) -> Result<Option<User>> {
        let user = conn
            .query_row("SELECT * FROM users WHERE id = ?1", params![id], user_from_row)
            .optional()?;
        Ok(user)
    }

    /// Find a user by username (duplicate pre-check / login lookup).
    pub fn find_by_username(conn: &Connection, username: &str) -> Result<Option<User>> {
        let user = conn
            .query_row(
                "SELECT * FROM users WHERE username = ?1",
                params![username],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    /// Find a user by email (duplicate pre-check).
    pub fn find_by_email(conn: &Connection, email: &str) -> Result<Option<User>> {
        let user = conn
            .query_row(
                "SELECT * FROM users WHERE email = ?1",
                params![email],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    /// Delete a user. All owned rows cascade. Returns true if a row was
    /// deleted.
    pub fn delete(conn: &Connection, id: &str) -> Result<bool> {
        let changed = conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;
        if changed > 0 {
            debug!(user = id, "deleted user and cascaded owned rows");
        }
        Ok(changed > 0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
