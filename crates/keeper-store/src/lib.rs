//! # keeper-store
//!
//! `SQLite` persistence layer for the Keeper productivity backend.
//!
//! - **Connection pool**: `r2d2` + `r2d2_sqlite` with WAL mode, foreign
//!   keys, and busy-timeout pragmas applied on acquire
//! - **Schema bootstrap**: one idempotent DDL batch (users, tags,
//!   collections, tasks, notes, and the three tag association tables)
//! - **Repositories**: stateless structs, one per entity kind, plus a
//!   polymorphic tag-link repository driven by the `EntityKind`
//!   descriptor. Every method takes `&Connection` and translates between
//!   Rust types and SQL; transactions are owned by the caller.

#![deny(unsafe_code)]

pub mod connection;
pub mod migrations;
pub mod repositories;

pub use connection::{ConnectionPool, PooledConnection, StoreConfig};
pub use migrations::run_migrations;
pub use repositories::collections::CollectionRepository;
pub use repositories::links::TagLinkRepository;
pub use repositories::notes::NoteRepository;
pub use repositories::tags::TagRepository;
pub use repositories::tasks::TaskRepository;
pub use repositories::users::UserRepository;
