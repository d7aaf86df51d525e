//! Tag service.
//!
//! Tag CRUD with per-user duplicate-title guards. The pre-check gives a
//! clean conflict on the common path; the UNIQUE constraint in the store
//! catches whatever races past it.

use rusqlite::Connection;

use keeper_core::{KeeperError, Result, Tag, TagCreateParams};
use keeper_store::TagRepository;

use crate::search::validate_query;

/// Tag service with duplicate-title enforcement.
pub struct TagService;

impl TagService {
    /// Create a tag for a user.
    pub fn create_tag(conn: &Connection, user_id: &str, params: &TagCreateParams) -> Result<Tag> {
        if TagRepository::find_by_title(conn, user_id, &params.title)?.is_some() {
            return Err(KeeperError::Conflict {
                entity: "tag",
                title: params.title.clone(),
            });
        }
        TagRepository::create(conn, user_id, params)
    }

    /// Rename a tag, guarding against duplicate titles.
    pub fn update_tag(conn: &Connection, user_id: &str, id: &str, title: &str) -> Result<Tag> {
        let current = TagRepository::get(conn, id, user_id)?
            .ok_or_else(|| KeeperError::tag_not_found(id))?;

        if title != current.title && TagRepository::find_by_title(conn, user_id, title)?.is_some()
        {
            return Err(KeeperError::Conflict {
                entity: "tag",
                title: title.to_string(),
            });
        }

        TagRepository::rename(conn, id, user_id, title)?
            .ok_or_else(|| KeeperError::tag_not_found(id))
    }

    /// Delete a tag. Its association rows cascade; tagged entities are
    /// otherwise untouched.
    pub fn delete_tag(conn: &Connection, user_id: &str, id: &str) -> Result<()> {
        let _ = TagRepository::get(conn, id, user_id)?
            .ok_or_else(|| KeeperError::tag_not_found(id))?;
        let _ = TagRepository::delete(conn, id, user_id)?;
        Ok(())
    }

    /// Get a tag by ID.
    pub fn get_tag(conn: &Connection, user_id: &str, id: &str) -> Result<Tag> {
        TagRepository::get(conn, id, user_id)?.ok_or_else(|| KeeperError::tag_not_found(id))
    }

    /// List all of a user's tags, ordered by title.
    pub fn list_tags(conn: &Connection, user_id: &str) -> Result<Vec<Tag>> {
        TagRepository::list(conn, user_id)
    }

    /// Search tags by title.
    pub fn search_tags(
        conn: &Connection,
        user_id: &str,
        query: &str,
        skip: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Vec<Tag>> {
        let trimmed = validate_query(query)?;
        TagRepository::search(conn, user_id, trimmed, skip, limit)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use super::*;
    use keeper_core::UserCreateParams;
    use keeper_store::{UserRepository, run_migrations};

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
    fn create_duplicate_title_conflicts() {
        let (conn, user) = setup_db();
        TagService::create_tag(&conn, &user, &TagCreateParams { title: "work".into() }).unwrap();
        let dup = TagService::create_tag(&conn, &user, &TagCreateParams { title: "work".into() });
        assert!(matches!(dup, Err(KeeperError::Conflict { entity: "tag", .. })));
    }

    #[test]
    fn rename_to_same_title_is_fine() {
        let (conn, user) = setup_db();
        let tag =
            TagService::create_tag(&conn, &user, &TagCreateParams { title: "work".into() })
                .unwrap();
        let same = TagService::update_tag(&conn, &user, &tag.id, "work").unwrap();
        assert_eq!(same.title, "work");
    }

    #[test]
    fn rename_to_taken_title_conflicts() {
        let (conn, user) = setup_db();
        let a = TagService::create_tag(&conn, &user, &TagCreateParams { title: "a".into() })
            .unwrap();
        TagService::create_tag(&conn, &user, &TagCreateParams { title: "b".into() }).unwrap();
        let clash = TagService::update_tag(&conn, &user, &a.id, "b");
        assert!(matches!(clash, Err(KeeperError::Conflict { .. })));
    }

    #[test]
    fn delete_tag_keeps_tagged_entities() {
        let (conn, user) = setup_db();
        let tag = TagService::create_tag(&conn, &user, &TagCreateParams { title: "t".into() })
            .unwrap();
        conn.execute(
            "INSERT INTO tasks (id, user_id, title) VALUES ('task-1', ?1, 'T')",
            rusqlite::params![user],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO task_tags (tag_id, task_id) VALUES (?1, 'task-1')",
            rusqlite::params![tag.id],
        )
        .unwrap();

        TagService::delete_tag(&conn, &user, &tag.id).unwrap();

        let links: i64 = conn
            .query_row("SELECT COUNT(*) FROM task_tags", [], |row| row.get(0))
            .unwrap();
        assert_eq!(links, 0);
        let tasks: i64 = conn
            .query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get(0))
            .unwrap();
        assert_eq!(tasks, 1);
    }

    #[test]
    fn get_missing_tag_is_not_found() {
        let (conn, user) = setup_db();
        let err = TagService::get_tag(&conn, &user, "tag-missing").unwrap_err();
        assert!(matches!(err, KeeperError::NotFound { entity: "tag", .. }));
    }

    #[test]
    fn search_validates_query_length() {
        let (conn, user) = setup_db();
        let err = TagService::search_tags(&conn, &user, "x", None, None).unwrap_err();
        assert!(matches!(err, KeeperError::Validation(_)));
    }
}
