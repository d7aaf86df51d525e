//! Tag repository.
//!
//! Tags are owned by exactly one user and titles are unique per user. The
//! `find_owned` IN-list lookup is the primitive behind tag ownership
//! validation: it only ever returns rows matching both the ID set and the
//! owner.

use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};

use keeper_core::{KeeperError, Result, Tag, TagCreateParams};

use super::{generate_id, like_pattern, map_unique_violation, now_iso, push_window};

/// Map a tag row to a record.
pub(crate) fn tag_from_row(row: &Row<'_>) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        title: row.get("title")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

/// Tag repository — stateless, every method takes `&Connection`.
pub struct TagRepository;

impl TagRepository {
    /// Create a tag. A duplicate title for the same user surfaces as a
    /// conflict via the UNIQUE constraint.
    pub fn create(conn: &Connection, user_id: &str, params: &TagCreateParams) -> Result<Tag> {
        let id = generate_id("tag");
        let now = now_iso();
        let _ = conn
            .execute(
                "INSERT INTO tags (id, user_id, title, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                params![id, user_id, params.title, now],
            )
            .map_err(|err| map_unique_violation(err, "tag", &params.title))?;

        Self::get(conn, &id, user_id)?.ok_or_else(|| KeeperError::tag_not_found(&id))
    }

    /// Get a tag by ID, scoped to its owner.
    pub fn get(conn: &Connection, id: &str, user_id: &str) -> Result<Option<Tag>> {
        let tag = conn
            .query_row(
                "SELECT * FROM tags WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
                tag_from_row,
            )
            .optional()?;
        Ok(tag)
    }

    /// Find a tag by exact title for a user (duplicate pre-check).
    pub fn find_by_title(conn: &Connection, user_id: &str, title: &str) -> Result<Option<Tag>> {
        let tag = conn
            .query_row(
                "SELECT * FROM tags WHERE user_id = ?1 AND title = ?2",
                params![user_id, title],
                tag_from_row,
            )
            .optional()?;
        Ok(tag)
    }

    /// List all tags for a user, ordered by title.
    pub fn list(conn: &Connection, user_id: &str) -> Result<Vec<Tag>> {
        let mut stmt =
            conn.prepare("SELECT * FROM tags WHERE user_id = ?1 ORDER BY title, id")?;
        let tags = stmt
            .query_map(params![user_id], tag_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tags)
    }

    /// Resolve the subset of `ids` that exist and belong to `user_id`.
    ///
    /// Returns rows ordered by title; callers that care about which IDs
    /// were NOT resolved diff against their input.
    pub fn find_owned(conn: &Connection, user_id: &str, ids: &[String]) -> Result<Vec<Tag>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT * FROM tags WHERE user_id = ? AND id IN ({placeholders}) \
             ORDER BY title, id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let bind = std::iter::once(user_id.to_string()).chain(ids.iter().cloned());
        let tags = stmt
            .query_map(params_from_iter(bind), tag_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tags)
    }

    /// Rename a tag. Returns the updated tag, or `None` if not found.
    pub fn rename(
        conn: &Connection,
        id: &str,
        user_id: &str,
        title: &str,
    ) -> Result<Option<Tag>> {
        let changed = conn
            .execute(
                "UPDATE tags SET title = ?1, updated_at = ?2 WHERE id = ?3 AND user_id = ?4",
                params![title, now_iso(), id, user_id],
            )
            .map_err(|err| map_unique_violation(err, "tag", title))?;
        if changed == 0 {
            return Ok(None);
        }
        Self::get(conn, id, user_id)
    }

    /// Delete a tag. Association rows cascade. Returns true if a row was
    /// deleted.
    pub fn delete(conn: &Connection, id: &str, user_id: &str) -> Result<bool> {
        let changed = conn.execute(
            "DELETE FROM tags WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(changed > 0)
    }

    /// Case-insensitive infix search over tag titles.
    ///
    /// Query preconditions (trimmed, minimum length) are enforced at the
    /// service boundary, not here.
    pub fn search(
        conn: &Connection,
        user_id: &str,
        query: &str,
        skip: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Vec<Tag>> {
        let mut sql = String::from(
            "SELECT * FROM tags WHERE user_id = ?1 AND lower(title) LIKE ?2 \
             ORDER BY updated_at DESC, id DESC",
        );
        push_window(&mut sql, skip, limit);
        let mut stmt = conn.prepare(&sql)?;
        let tags = stmt
            .query_map(params![user_id, like_pattern(query)], tag_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tags)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
