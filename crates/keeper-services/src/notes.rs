//! Note service.
//!
//! Mirrors the task flow: containment check against the target collection
//! (notes are rejected by `tasks-only` collections), tag pre-validation,
//! then row write and tag reconciliation in one transaction.

use rusqlite::Connection;

use keeper_core::{
    EntityKind, ItemKind, KeeperError, Note, NoteCreateParams, NoteFilter, NoteUpdateParams,
    Persistence, Result,
};
use keeper_store::{CollectionRepository, NoteRepository};

use crate::collections::ensure_collection_accepts;
use crate::search::validate_query;
use crate::tagging::{reconcile_tags, resolve_owned_tags};

/// Note service with containment and tag-ownership enforcement.
pub struct NoteService;

impl NoteService {
    /// Create a note for a user.
    pub fn create_note(
        conn: &mut Connection,
        user_id: &str,
        params: &NoteCreateParams,
    ) -> Result<Note> {
        let tx = conn.transaction()?;

        if let Some(ref collection_id) = params.collection_id {
            let collection = CollectionRepository::get(&tx, collection_id, user_id)?
                .ok_or_else(|| KeeperError::collection_not_found(collection_id))?;
            ensure_collection_accepts(&collection, ItemKind::Note)?;
        }
        if let Some(ref tag_ids) = params.tag_ids {
            // Fail before the insert; the reconciler re-resolves on its own.
            let _ = resolve_owned_tags(&tx, user_id, tag_ids, true)?;
        }

        let note = NoteRepository::create(&tx, user_id, params)?;
        if let Some(ref tag_ids) = params.tag_ids {
            reconcile_tags(
                &tx,
                user_id,
                EntityKind::Note,
                &note.id,
                Persistence::New,
                tag_ids,
            )?;
        }
        tx.commit()?;

        NoteRepository::get(conn, &note.id, user_id)?
            .ok_or_else(|| KeeperError::note_not_found(&note.id))
    }

    /// Update a note. Detaching from a collection skips the policy check.
    pub fn update_note(
        conn: &mut Connection,
        user_id: &str,
        id: &str,
        params: &NoteUpdateParams,
    ) -> Result<Note> {
        let tx = conn.transaction()?;

        let _ = NoteRepository::get(&tx, id, user_id)?
            .ok_or_else(|| KeeperError::note_not_found(id))?;

        if let Some(Some(ref collection_id)) = params.collection_id {
            let collection = CollectionRepository::get(&tx, collection_id, user_id)?
                .ok_or_else(|| KeeperError::collection_not_found(collection_id))?;
            ensure_collection_accepts(&collection, ItemKind::Note)?;
        }

        let _ = NoteRepository::update(&tx, id, user_id, params)?
            .ok_or_else(|| KeeperError::note_not_found(id))?;
        if let Some(ref tag_ids) = params.tag_ids {
            reconcile_tags(
                &tx,
                user_id,
                EntityKind::Note,
                id,
                Persistence::Existing,
                tag_ids,
            )?;
        }
        tx.commit()?;

        NoteRepository::get(conn, id, user_id)?.ok_or_else(|| KeeperError::note_not_found(id))
    }

    /// Delete a note.
    pub fn delete_note(conn: &Connection, user_id: &str, id: &str) -> Result<()> {
        let _ = NoteRepository::get(conn, id, user_id)?
            .ok_or_else(|| KeeperError::note_not_found(id))?;
        let _ = NoteRepository::delete(conn, id, user_id)?;
        Ok(())
    }

    /// Get a note by ID.
    pub fn get_note(conn: &Connection, user_id: &str, id: &str) -> Result<Note> {
        NoteRepository::get(conn, id, user_id)?.ok_or_else(|| KeeperError::note_not_found(id))
    }

    /// List a user's notes, optionally scoped to a collection.
    pub fn list_notes(conn: &Connection, user_id: &str, filter: &NoteFilter) -> Result<Vec<Note>> {
        NoteRepository::list(conn, user_id, filter)
    }

    /// Search notes by title/description.
    pub fn search_notes(
        conn: &Connection,
        user_id: &str,
        query: &str,
        filter: &NoteFilter,
        skip: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Vec<Note>> {
        let trimmed = validate_query(query)?;
        NoteRepository::search(conn, user_id, trimmed, filter, skip, limit)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
