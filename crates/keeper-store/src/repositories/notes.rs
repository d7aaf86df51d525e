//! Note repository.
//!
//! Same shape as the task repository minus status/priority: dynamic
//! filters, infix search over title/description, eager tag loading.

use rusqlite::types::ToSql;
use rusqlite::{Connection, OptionalExtension, Row, params};

use keeper_core::{
    EntityKind, KeeperError, Note, NoteCreateParams, NoteFilter, NoteUpdateParams, Result,
};

use super::links::TagLinkRepository;
use super::{generate_id, like_pattern, now_iso, push_window};

fn note_from_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    Ok(Note {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        collection_id: row.get("collection_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        tags: Vec::new(),
    })
}

fn attach_tags(conn: &Connection, notes: &mut [Note]) -> Result<()> {
    for note in notes {
        note.tags = TagLinkRepository::load(conn, EntityKind::Note, &note.id)?;
    }
    Ok(())
}

/// Note repository — stateless, every method takes `&Connection`.
pub struct NoteRepository;

impl NoteRepository {
    /// Create a note. Tag links are the reconciler's concern.
    pub fn create(conn: &Connection, user_id: &str, params: &NoteCreateParams) -> Result<Note> {
        let id = generate_id("note");
        let now = now_iso();
        let _ = conn.execute(
            "INSERT INTO notes (id, user_id, collection_id, title, description, \
             created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![
                id,
                user_id,
                params.collection_id,
                params.title,
                params.description,
                now,
            ],
        )?;

        Self::get(conn, &id, user_id)?.ok_or_else(|| KeeperError::note_not_found(&id))
    }

    /// Get a note by ID, scoped to its owner, with tags attached.
    pub fn get(conn: &Connection, id: &str, user_id: &str) -> Result<Option<Note>> {
        let note = conn
            .query_row(
                "SELECT * FROM notes WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
                note_from_row,
            )
            .optional()?;
        match note {
            Some(mut note) => {
                note.tags = TagLinkRepository::load(conn, EntityKind::Note, &note.id)?;
                Ok(Some(note))
            }
            None => Ok(None),
        }
    }

    /// List a user's notes, optionally scoped to a collection.
    pub fn list(conn: &Connection, user_id: &str, filter: &NoteFilter) -> Result<Vec<Note>> {
        let mut sql = String::from("SELECT * FROM notes WHERE user_id = ?");
        let mut values: Vec<Box<dyn ToSql>> = vec![Box::new(user_id.to_string())];
        if let Some(ref collection_id) = filter.collection_id {
            sql.push_str(" AND collection_id = ?");
            values.push(Box::new(collection_id.clone()));
        }
        sql.push_str(" ORDER BY updated_at DESC, id DESC");

        let bind: Vec<&dyn ToSql> = values.iter().map(Box::as_ref).collect();
        let mut stmt = conn.prepare(&sql)?;
        let mut notes = stmt
            .query_map(bind.as_slice(), note_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        attach_tags(conn, &mut notes)?;
        Ok(notes)
    }

    /// Update a note. Returns the updated note, or `None` if not found.
    pub fn update(
        conn: &Connection,
        id: &str,
        user_id: &str,
        updates: &NoteUpdateParams,
    ) -> Result<Option<Note>> {
        let mut sets: Vec<&'static str> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(ref title) = updates.title {
            sets.push("title = ?");
            values.push(Box::new(title.clone()));
        }
        if let Some(ref description) = updates.description {
            sets.push("description = ?");
            values.push(Box::new(description.clone()));
        }
        match updates.collection_id {
            Some(Some(ref collection_id)) => {
                sets.push("collection_id = ?");
                values.push(Box::new(collection_id.clone()));
            }
            Some(None) => sets.push("collection_id = NULL"),
            None => {}
        }

        if sets.is_empty() {
            return Self::get(conn, id, user_id);
        }

        sets.push("updated_at = ?");
        values.push(Box::new(now_iso()));
        values.push(Box::new(id.to_string()));
        values.push(Box::new(user_id.to_string()));

        let sql = format!(
            "UPDATE notes SET {} WHERE id = ? AND user_id = ?",
            sets.join(", ")
        );
        let bind: Vec<&dyn ToSql> = values.iter().map(Box::as_ref).collect();
        let changed = conn.execute(&sql, bind.as_slice())?;
        if changed == 0 {
            return Ok(None);
        }
        Self::get(conn, id, user_id)
    }

    /// Delete a note. Association rows cascade. Returns true if a row was
    /// deleted.
    pub fn delete(conn: &Connection, id: &str, user_id: &str) -> Result<bool> {
        let changed = conn.execute(
            "DELETE FROM notes WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(changed > 0)
    }

    /// Case-insensitive infix search over title and description.
    pub fn search(
        conn: &Connection,
        user_id: &str,
        query: &str,
        filter: &NoteFilter,
        skip: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Vec<Note>> {
        let mut sql = String::from("SELECT * FROM notes WHERE user_id = ?");
        let mut values: Vec<Box<dyn ToSql>> = vec![Box::new(user_id.to_string())];
        if let Some(ref collection_id) = filter.collection_id {
            sql.push_str(" AND collection_id = ?");
            values.push(Box::new(collection_id.clone()));
        }
        sql.push_str(" AND (lower(title) LIKE ? OR lower(coalesce(description, '')) LIKE ?)");
        let pattern = like_pattern(query);
        values.push(Box::new(pattern.clone()));
        values.push(Box::new(pattern));

        sql.push_str(" ORDER BY updated_at DESC, id DESC");
        push_window(&mut sql, skip, limit);

        let bind: Vec<&dyn ToSql> = values.iter().map(Box::as_ref).collect();
        let mut stmt = conn.prepare(&sql)?;
        let mut notes = stmt
            .query_map(bind.as_slice(), note_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        attach_tags(conn, &mut notes)?;
        Ok(notes)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
