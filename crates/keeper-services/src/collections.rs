//! Collection service and the containment policy checker.
//!
//! A collection declares which item kinds it holds; the check runs at the
//! moment a task/note is linked to it, never retroactively. Changing a
//! collection's kind leaves existing links as they are (grandfathered).

use rusqlite::Connection;
use tracing::debug;

use keeper_core::{
    Collection, CollectionCreateParams, CollectionFilter, CollectionKind, CollectionUpdateParams,
    EntityKind, ItemKind, KeeperError, Persistence, Result,
};
use keeper_store::CollectionRepository;

use crate::search::validate_query;
use crate::tagging::{reconcile_tags, resolve_owned_tags};

/// Reject the link if the collection's declared kind does not accept the
/// item kind. `mixed` accepts everything.
///
/// Callers confirm existence/ownership first — a missing collection is a
/// not-found error, never a policy violation.
pub fn ensure_collection_accepts(collection: &Collection, item: ItemKind) -> Result<()> {
    let accepted = match collection.kind {
        CollectionKind::Mixed => true,
        CollectionKind::TasksOnly => item == ItemKind::Task,
        CollectionKind::NotesOnly => item == ItemKind::Note,
    };
    if accepted {
        Ok(())
    } else {
        Err(KeeperError::Policy {
            kind: collection.kind,
            item,
        })
    }
}

/// Collection service with duplicate-title guards and tag reconciliation.
pub struct CollectionService;

impl CollectionService {
    /// Create a collection, reconciling tags in the same transaction.
    pub fn create_collection(
        conn: &mut Connection,
        user_id: &str,
        params: &CollectionCreateParams,
    ) -> Result<Collection> {
        let tx = conn.transaction()?;

        if CollectionRepository::find_by_title(&tx, user_id, &params.title)?.is_some() {
            return Err(KeeperError::Conflict {
                entity: "collection",
                title: params.title.clone(),
            });
        }
        if let Some(ref tag_ids) = params.tag_ids {
            // Fail before the insert; the reconciler re-resolves on its own.
            let _ = resolve_owned_tags(&tx, user_id, tag_ids, true)?;
        }

        let collection = CollectionRepository::create(&tx, user_id, params)?;
        if let Some(ref tag_ids) = params.tag_ids {
            reconcile_tags(
                &tx,
                user_id,
                EntityKind::Collection,
                &collection.id,
                Persistence::New,
                tag_ids,
            )?;
        }
        tx.commit()?;

        CollectionRepository::get(conn, &collection.id, user_id)?
            .ok_or_else(|| KeeperError::collection_not_found(&collection.id))
    }

    /// Update a collection. A kind change does not re-check tasks/notes
    /// already linked to it.
    pub fn update_collection(
        conn: &mut Connection,
        user_id: &str,
        id: &str,
        params: &CollectionUpdateParams,
    ) -> Result<Collection> {
        let tx = conn.transaction()?;

        let current = CollectionRepository::get(&tx, id, user_id)?
            .ok_or_else(|| KeeperError::collection_not_found(id))?;

        if let Some(ref title) = params.title {
            if *title != current.title
                && CollectionRepository::find_by_title(&tx, user_id, title)?.is_some()
            {
                return Err(KeeperError::Conflict {
                    entity: "collection",
                    title: title.clone(),
                });
            }
        }

        let _ = CollectionRepository::update(&tx, id, user_id, params)?
            .ok_or_else(|| KeeperError::collection_not_found(id))?;
        if let Some(ref tag_ids) = params.tag_ids {
            reconcile_tags(
                &tx,
                user_id,
                EntityKind::Collection,
                id,
                Persistence::Existing,
                tag_ids,
            )?;
        }
        tx.commit()?;

        CollectionRepository::get(conn, id, user_id)?
            .ok_or_else(|| KeeperError::collection_not_found(id))
    }

    /// Delete a collection. Its tasks and notes cascade, and their tag
    /// links with them.
    pub fn delete_collection(conn: &Connection, user_id: &str, id: &str) -> Result<()> {
        let _ = CollectionRepository::get(conn, id, user_id)?
            .ok_or_else(|| KeeperError::collection_not_found(id))?;
        let _ = CollectionRepository::delete(conn, id, user_id)?;
        debug!(collection = id, "deleted collection and cascaded items");
        Ok(())
    }

    /// Get a collection by ID.
    pub fn get_collection(conn: &Connection, user_id: &str, id: &str) -> Result<Collection> {
        CollectionRepository::get(conn, id, user_id)?
            .ok_or_else(|| KeeperError::collection_not_found(id))
    }

    /// List a user's collections, optionally filtered by kind.
    pub fn list_collections(
        conn: &Connection,
        user_id: &str,
        filter: &CollectionFilter,
    ) -> Result<Vec<Collection>> {
        CollectionRepository::list(conn, user_id, filter)
    }

    /// Search collections by title.
    pub fn search_collections(
        conn: &Connection,
        user_id: &str,
        query: &str,
        filter: &CollectionFilter,
        skip: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Vec<Collection>> {
        let trimmed = validate_query(query)?;
        CollectionRepository::search(conn, user_id, trimmed, filter, skip, limit)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
