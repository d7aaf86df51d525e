//! User service.
//!
//! Registration identity checks and account deletion. Password hashing
//! and token issuance live in the auth layer above; this service only
//! stores the opaque hash it is handed.

use rusqlite::Connection;
use tracing::debug;

use keeper_core::{KeeperError, Result, User, UserCreateParams};
use keeper_store::UserRepository;

/// User service with username/email uniqueness enforcement.
pub struct UserService;

impl UserService {
    /// Create a user. Username and email must both be unused.
    pub fn create_user(conn: &Connection, params: &UserCreateParams) -> Result<User> {
        if UserRepository::find_by_username(conn, &params.username)?.is_some() {
            return Err(KeeperError::Conflict {
                entity: "user",
                title: params.username.clone(),
            });
        }
        if UserRepository::find_by_email(conn, &params.email)?.is_some() {
            return Err(KeeperError::Conflict {
                entity: "user",
                title: params.email.clone(),
            });
        }
        UserRepository::create(conn, params)
    }

    /// Get a user by ID.
    pub fn get_user(conn: &Connection, id: &str) -> Result<User> {
        UserRepository::get(conn, id)?.ok_or_else(|| KeeperError::user_not_found(id))
    }

    /// Delete a user and everything they own (cascades in the store).
    pub fn delete_user(conn: &Connection, id: &str) -> Result<()> {
        let _ = UserRepository::get(conn, id)?.ok_or_else(|| KeeperError::user_not_found(id))?;
        let _ = UserRepository::delete(conn, id)?;
        debug!(user = id, "deleted user account");
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
