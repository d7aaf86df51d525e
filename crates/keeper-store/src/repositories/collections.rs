//! Collection repository.
//!
//! Collections carry a declared containment kind and a per-user unique
//! title. Search matches on title only — descriptions are excluded on
//! purpose, matching the per-kind search contract.

use rusqlite::types::ToSql;
use rusqlite::{Connection, OptionalExtension, Row, params};

use keeper_core::{
    Collection, CollectionCreateParams, CollectionFilter, CollectionKind, CollectionUpdateParams,
    EntityKind, KeeperError, Result,
};

use super::links::TagLinkRepository;
use super::{generate_id, like_pattern, map_unique_violation, now_iso, push_window};

fn collection_from_row(row: &Row<'_>) -> rusqlite::Result<Collection> {
    let kind: String = row.get("kind")?;
    Ok(Collection {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        kind: CollectionKind::from_sql(&kind).unwrap_or(CollectionKind::Mixed),
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        tags: Vec::new(),
    })
}

fn attach_tags(conn: &Connection, collections: &mut [Collection]) -> Result<()> {
    for collection in collections {
        collection.tags =
            TagLinkRepository::load(conn, EntityKind::Collection, &collection.id)?;
    }
    Ok(())
}

/// Collection repository — stateless, every method takes `&Connection`.
pub struct CollectionRepository;

impl CollectionRepository {
    /// Create a collection. Duplicate titles per user surface as a
    /// conflict via the UNIQUE constraint.
    pub fn create(
        conn: &Connection,
        user_id: &str,
        params: &CollectionCreateParams,
    ) -> Result<Collection> {
        let id = generate_id("coll");
        let now = now_iso();
        let kind = params.kind.unwrap_or(CollectionKind::Mixed);
        let _ = conn
            .execute(
                "INSERT INTO collections (id, user_id, title, description, kind, \
                 created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
                params![id, user_id, params.title, params.description, kind.as_sql(), now],
            )
            .map_err(|err| map_unique_violation(err, "collection", &params.title))?;

        Self::get(conn, &id, user_id)?.ok_or_else(|| KeeperError::collection_not_found(&id))
    }

    /// Get a collection by ID, scoped to its owner, with tags attached.
    pub fn get(conn: &Connection, id: &str, user_id: &str) -> Result<Option<Collection>> {
        let collection = conn
            .query_row(
                "SELECT * FROM collections WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
                collection_from_row,
            )
            .optional()?;
        match collection {
            Some(mut collection) => {
                collection.tags =
                    TagLinkRepository::load(conn, EntityKind::Collection, &collection.id)?;
                Ok(Some(collection))
            }
            None => Ok(None),
        }
    }

    /// Find a collection by exact title for a user (duplicate pre-check).
    pub fn find_by_title(
        conn: &Connection,
        user_id: &str,
        title: &str,
    ) -> Result<Option<Collection>> {
        let collection = conn
            .query_row(
                "SELECT * FROM collections WHERE user_id = ?1 AND title = ?2",
                params![user_id, title],
                collection_from_row,
            )
            .optional()?;
        Ok(collection)
    }

    /// List a user's collections, optionally filtered by kind.
    pub fn list(
        conn: &Connection,
        user_id: &str,
        filter: &CollectionFilter,
    ) -> Result<Vec<Collection>> {
        let mut sql = String::from("SELECT * FROM collections WHERE user_id = ?");
        let mut values: Vec<Box<dyn ToSql>> = vec![Box::new(user_id.to_string())];
        if let Some(kind) = filter.kind {
            sql.push_str(" AND kind = ?");
            values.push(Box::new(kind.as_sql().to_string()));
        }
        sql.push_str(" ORDER BY updated_at DESC, id DESC");

        let bind: Vec<&dyn ToSql> = values.iter().map(Box::as_ref).collect();
        let mut stmt = conn.prepare(&sql)?;
        let mut collections = stmt
            .query_map(bind.as_slice(), collection_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        attach_tags(conn, &mut collections)?;
        Ok(collections)
    }

    /// Update a collection. Returns the updated collection, or `None` if
    /// not found. Kind changes do not re-validate existing links.
    pub fn update(
        conn: &Connection,
        id: &str,
        user_id: &str,
        updates: &CollectionUpdateParams,
    ) -> Result<Option<Collection>> {
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
        if let Some(kind) = updates.kind {
            sets.push("kind = ?");
            values.push(Box::new(kind.as_sql().to_string()));
        }

        if sets.is_empty() {
            return Self::get(conn, id, user_id);
        }

        sets.push("updated_at = ?");
        values.push(Box::new(now_iso()));
        values.push(Box::new(id.to_string()));
        values.push(Box::new(user_id.to_string()));

        let sql = format!(
            "UPDATE collections SET {} WHERE id = ? AND user_id = ?",
            sets.join(", ")
        );
        let bind: Vec<&dyn ToSql> = values.iter().map(Box::as_ref).collect();
        let changed = conn
            .execute(&sql, bind.as_slice())
            .map_err(|err| {
                map_unique_violation(err, "collection", updates.title.as_deref().unwrap_or(""))
            })?;
        if changed == 0 {
            return Ok(None);
        }
        Self::get(conn, id, user_id)
    }

    /// Delete a collection. Contained tasks and notes cascade, and their
    /// association rows with them. Returns true if a row was deleted.
    pub fn delete(conn: &Connection, id: &str, user_id: &str) -> Result<bool> {
        let changed = conn.execute(
            "DELETE FROM collections WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(changed > 0)
    }

    /// Case-insensitive infix search over titles only.
    pub fn search(
        conn: &Connection,
        user_id: &str,
        query: &str,
        filter: &CollectionFilter,
        skip: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Vec<Collection>> {
        let mut sql = String::from("SELECT * FROM collections WHERE user_id = ?");
        let mut values: Vec<Box<dyn ToSql>> = vec![Box::new(user_id.to_string())];
        if let Some(kind) = filter.kind {
            sql.push_str(" AND kind = ?");
            values.push(Box::new(kind.as_sql().to_string()));
        }
        sql.push_str(" AND lower(title) LIKE ?");
        values.push(Box::new(like_pattern(query)));

        sql.push_str(" ORDER BY updated_at DESC, id DESC");
        push_window(&mut sql, skip, limit);

        let bind: Vec<&dyn ToSql> = values.iter().map(Box::as_ref).collect();
        let mut stmt = conn.prepare(&sql)?;
        let mut collections = stmt
            .query_map(bind.as_slice(), collection_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        attach_tags(conn, &mut collections)?;
        Ok(collections)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use super::*;
    use crate::migrations::run_migrations;
    use crate::repositories::users::UserRepository;
    use keeper_core::UserCreateParams;

    fn setup_db() -> (Connection, String) {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        run_migrations(&conn).unwrap();
        let user = UserRepository::create(
            &conn,
            &UserCreateParams {
                username: "ada".into(),
                email: "ada@example.com".into(),
                password_hash: "h".into(),
            },
        )
        .unwrap();
        (conn, user.id)
    }

    #[test]
    fn create_defaults_to_mixed() {
        let (conn, user) = setup_db();
        let collection = CollectionRepository::create(
            &conn,
            &user,
            &CollectionCreateParams {
                title: "Inbox".into(),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(collection.id.starts_with("coll-"));
        assert_eq!(collection.kind, CollectionKind::Mixed);
    }

    #[test]
    fn duplicate_title_conflicts() {
        let (conn, user) = setup_db();
        CollectionRepository::create(
            &conn,
            &user,
            &CollectionCreateParams {
                title: "Inbox".into(),
                ..Default::default()
            },
        )
        .unwrap();
        let dup = CollectionRepository::create(
            &conn,
            &user,
            &CollectionCreateParams {
                title: "Inbox".into(),
                ..Default::default()
            },
        );
        assert!(matches!(
            dup,
            Err(KeeperError::Conflict { entity: "collection", .. })
        ));
    }

    #[test]
    fn list_filters_by_kind() {
        let (conn, user) = setup_db();
        CollectionRepository::create(
            &conn,
            &user,
            &CollectionCreateParams {
                title: "Work".into(),
                kind: Some(CollectionKind::TasksOnly),
                ..Default::default()
            },
        )
        .unwrap();
        CollectionRepository::create(
            &conn,
            &user,
            &CollectionCreateParams {
                title: "Journal".into(),
                kind: Some(CollectionKind::NotesOnly),
                ..Default::default()
            },
        )
        .unwrap();

        let tasks_only = CollectionRepository::list(
            &conn,
            &user,
            &CollectionFilter {
                kind: Some(CollectionKind::TasksOnly),
            },
        )
        .unwrap();
        assert_eq!(tasks_only.len(), 1);
        assert_eq!(tasks_only[0].title, "Work");
    }

    #[test]
    fn update_kind_does_not_touch_links() {
        let (conn, user) = setup_db();
        let collection = CollectionRepository::create(
            &conn,
            &user,
            &CollectionCreateParams {
                title: "Flex".into(),
                ..Default::default()
            },
        )
        .unwrap();
        conn.execute(
            "INSERT INTO tasks (id, user_id, collection_id, title) \
             VALUES ('task-1', ?1, ?2, 'T')",
            params![user, collection.id],
        )
        .unwrap();

        let updated = CollectionRepository::update(
            &conn,
            &collection.id,
            &user,
            &CollectionUpdateParams {
                kind: Some(CollectionKind::NotesOnly),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
        assert_eq!(updated.kind, CollectionKind::NotesOnly);

        // The pre-existing task link survives the kind change
        let still_linked: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM tasks WHERE collection_id = ?1",
                params![collection.id],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(still_linked, 1);
    }

    #[test]
    fn search_title_only() {
        let (conn, user) = setup_db();
        CollectionRepository::create(
            &conn,
            &user,
            &CollectionCreateParams {
                title: "Projects".into(),
                description: Some("everything else".into()),
                ..Default::default()
            },
        )
        .unwrap();

        let by_title =
            CollectionRepository::search(&conn, &user, "proj", &CollectionFilter::default(), None, None)
                .unwrap();
        assert_eq!(by_title.len(), 1);

        // Description text does not match
        let by_description =
            CollectionRepository::search(&conn, &user, "everything", &CollectionFilter::default(), None, None)
                .unwrap();
        assert!(by_description.is_empty());
    }
}
