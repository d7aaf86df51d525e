//! # keeper-services
//!
//! Business operations for the Keeper productivity backend, layered over
//! `keeper-store`:
//!
//! - **Tag ownership + reconciliation**: resolve requested tag IDs against
//!   per-user ownership, then replace an entity's tag links atomically
//! - **Containment policy**: which item kinds a collection's declared kind
//!   accepts, checked at link time
//! - **Entity services**: create/update/delete/search flows for tasks,
//!   notes, collections, tags, and users — each mutation runs in one
//!   `SQLite` transaction, committed once
//! - **Global search**: the async fan-out aggregator joining the four
//!   per-entity searches into one envelope
//!
//! The API layer above this crate owns HTTP shapes, auth, and session
//! handling; everything here speaks domain types and [`KeeperError`].

#![deny(unsafe_code)]

pub mod collections;
pub mod notes;
pub mod search;
pub mod tagging;
pub mod tags;
pub mod tasks;
pub mod users;

pub use collections::{CollectionService, ensure_collection_accepts};
pub use keeper_core::{KeeperError, Result};
pub use notes::NoteService;
pub use search::{SearchEnvelope, SearchResults, global_search, validate_query};
pub use tagging::{reconcile_tags, resolve_owned_tags};
pub use tags::TagService;
pub use tasks::TaskService;
pub use users::UserService;
