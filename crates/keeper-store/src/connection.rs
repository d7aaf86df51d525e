//! `SQLite` connection pool with WAL mode and foreign keys enabled.
//!
//! Pooling uses `r2d2` with the `r2d2_sqlite` backend. A
//! [`r2d2::CustomizeConnection`] runs on each acquired connection so every
//! pool member has identical pragma state. Foreign keys must be ON for the
//! cascade semantics the schema relies on (collection and user deletes).

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

use keeper_core::Result;

/// Alias for the connection pool type.
pub type ConnectionPool = Pool<SqliteConnectionManager>;

/// Alias for a pooled connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Store configuration consumed by the pool constructors.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Maximum pool size.
    pub pool_size: u32,
    /// `SQLite` busy timeout in milliseconds.
    pub busy_timeout_ms: u32,
    /// Page cache size in KiB.
    pub cache_size_kib: i64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            pool_size: 8,
            busy_timeout_ms: 5_000,
            cache_size_kib: 4096,
        }
    }
}

#[derive(Debug)]
struct PragmaBootstrap {
    busy_timeout_ms: u32,
    cache_size_kib: i64,
}

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for PragmaBootstrap {
    fn on_acquire(&self, conn: &mut Connection) -> std::result::Result<(), rusqlite::Error> {
        conn.execute_batch(&format!(
            "PRAGMA journal_mode = WAL;\
             PRAGMA foreign_keys = ON;\
             PRAGMA busy_timeout = {};\
             PRAGMA cache_size = -{};\
             PRAGMA synchronous = NORMAL;",
            self.busy_timeout_ms, self.cache_size_kib
        ))
    }
}

fn build_pool(manager: SqliteConnectionManager, config: &StoreConfig) -> Result<ConnectionPool> {
    let pool = Pool::builder()
        .max_size(config.pool_size)
        .connection_timeout(Duration::from_secs(5))
        .connection_customizer(Box::new(PragmaBootstrap {
            busy_timeout_ms: config.busy_timeout_ms,
            cache_size_kib: config.cache_size_kib,
        }))
        .build(manager)?;
    Ok(pool)
}

/// Open a file-backed connection pool.
pub fn open_pool(path: impl AsRef<Path>, config: &StoreConfig) -> Result<ConnectionPool> {
    build_pool(SqliteConnectionManager::file(path), config)
}

/// Open an in-memory connection pool.
///
/// Each pooled connection holds its OWN in-memory database; this is only
/// useful for exercising pool plumbing. Tests that need shared state
/// across connections use a file-backed pool in a temp directory.
pub fn open_memory_pool(config: &StoreConfig) -> Result<ConnectionPool> {
    build_pool(SqliteConnectionManager::memory(), config)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_pool_applies_pragmas() {
        let dir = tempfile::tempdir().unwrap();
        let pool = open_pool(dir.path().join("keeper.db"), &StoreConfig::default()).unwrap();
        let conn = pool.get().unwrap();

        let journal_mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(journal_mode, "wal");

        let foreign_keys: i32 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(foreign_keys, 1);
    }

    #[test]
    fn memory_pool_creates_successfully() {
        let pool = open_memory_pool(&StoreConfig::default()).unwrap();
        let conn = pool.get().unwrap();
        let foreign_keys: i32 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(foreign_keys, 1);
    }

    #[test]
    fn pool_size_honors_config() {
        let config = StoreConfig {
            pool_size: 2,
            ..Default::default()
        };
        let pool = open_memory_pool(&config).unwrap();
        assert_eq!(pool.max_size(), 2);
    }

    #[test]
    fn default_config_values() {
        let config = StoreConfig::default();
        assert_eq!(config.pool_size, 8);
        assert_eq!(config.busy_timeout_ms, 5_000);
    }
}
