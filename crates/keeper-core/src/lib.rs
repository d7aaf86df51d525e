//! # keeper-core
//!
//! Foundation types and errors for the Keeper productivity backend.
//!
//! This crate provides the shared vocabulary the store and service crates
//! depend on:
//!
//! - **Domain records**: `User`, `Tag`, `Task`, `Note`, `Collection`
//! - **Enums**: statuses, priorities, collection kinds, and the entity-kind
//!   descriptors used by the polymorphic tag-link layer
//! - **Params and filters**: create/update parameter structs and per-entity
//!   list/search filters
//! - **Errors**: the `KeeperError` hierarchy via `thiserror`

#![deny(unsafe_code)]

pub mod errors;
pub mod types;

pub use errors::{KeeperError, Result};
pub use types::{
    Collection, CollectionCreateParams, CollectionFilter, CollectionKind, CollectionUpdateParams,
    EntityKind, ItemKind, Note, NoteCreateParams, NoteFilter, NoteUpdateParams, Persistence, Tag,
    TagCreateParams, Task, TaskCreateParams, TaskFilter, TaskPriority, TaskStatus,
    TaskUpdateParams, User, UserCreateParams,
};
