//! Polymorphic tag-link repository.
//!
//! One implementation serves all three taggable kinds; the [`EntityKind`]
//! descriptor supplies the association table and FK column names. Table
//! and column names come from the enum, never from caller input, so the
//! SQL interpolation here is closed over a fixed vocabulary.

use rusqlite::{Connection, params};
use tracing::debug;

use keeper_core::{EntityKind, Persistence, Result, Tag};

use super::tags::tag_from_row;

/// Tag-link repository — stateless, every method takes `&Connection`.
pub struct TagLinkRepository;

impl TagLinkRepository {
    /// Load the tag set linked to an entity, ordered by title.
    pub fn load(conn: &Connection, kind: EntityKind, entity_id: &str) -> Result<Vec<Tag>> {
        let sql = format!(
            "SELECT t.* FROM {table} l \
             JOIN tags t ON t.id = l.tag_id \
             WHERE l.{column} = ?1 \
             ORDER BY t.title, t.id",
            table = kind.link_table(),
            column = kind.link_column(),
        );
        let mut stmt = conn.prepare(&sql)?;
        let tags = stmt
            .query_map(params![entity_id], tag_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tags)
    }

    /// Replace an entity's tag links with the given resolved set.
    ///
    /// For an [`Persistence::Existing`] entity the current links are
    /// cleared first; repopulating after a clear keeps overlapping sets
    /// from tripping the association primary key. A [`Persistence::New`]
    /// entity has no rows to clear, so the delete is skipped.
    ///
    /// Runs against the caller's transaction; not safe for concurrent use
    /// on the same entity without external serialization.
    pub fn replace(
        conn: &Connection,
        kind: EntityKind,
        entity_id: &str,
        tags: &[Tag],
        persistence: Persistence,
    ) -> Result<()> {
        if persistence == Persistence::Existing {
            let cleared = conn.execute(
                &format!(
                    "DELETE FROM {table} WHERE {column} = ?1",
                    table = kind.link_table(),
                    column = kind.link_column(),
                ),
                params![entity_id],
            )?;
            debug!(entity = entity_id, cleared, "cleared tag links");
        }

        let sql = format!(
            "INSERT INTO {table} (tag_id, {column}) VALUES (?1, ?2)",
            table = kind.link_table(),
            column = kind.link_column(),
        );
        let mut stmt = conn.prepare(&sql)?;
        for tag in tags {
            let _ = stmt.execute(params![tag.id, entity_id])?;
        }
        Ok(())
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
    use crate::repositories::tags::TagRepository;
    use crate::repositories::tasks::TaskRepository;
    use crate::repositories::users::UserRepository;
    use keeper_core::{TagCreateParams, TaskCreateParams, UserCreateParams};

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

    fn make_tag(conn: &Connection, user_id: &str, title: &str) -> Tag {
        TagRepository::create(
            conn,
            user_id,
            &TagCreateParams {
                title: title.to_string(),
            },
        )
        .unwrap()
    }

    #[test]
    fn replace_new_then_load_ordered_by_title() {
        let (conn, user) = setup_db();
        let task = TaskRepository::create(
            &conn,
            &user,
            &TaskCreateParams {
                title: "T".into(),
                ..Default::default()
            },
        )
        .unwrap();
        let beta = make_tag(&conn, &user, "beta");
        let alpha = make_tag(&conn, &user, "alpha");

        TagLinkRepository::replace(
            &conn,
            EntityKind::Task,
            &task.id,
            &[beta, alpha],
            Persistence::New,
        )
        .unwrap();

        let loaded = TagLinkRepository::load(&conn, EntityKind::Task, &task.id).unwrap();
        let titles: Vec<&str> = loaded.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["alpha", "beta"]);
    }

    #[test]
    fn replace_existing_with_overlap_does_not_violate_pk() {
        let (conn, user) = setup_db();
        let task = TaskRepository::create(
            &conn,
            &user,
            &TaskCreateParams {
                title: "T".into(),
                ..Default::default()
            },
        )
        .unwrap();
        let a = make_tag(&conn, &user, "a");
        let b = make_tag(&conn, &user, "b");
        let c = make_tag(&conn, &user, "c");

        TagLinkRepository::replace(
            &conn,
            EntityKind::Task,
            &task.id,
            &[a.clone(), b.clone()],
            Persistence::New,
        )
        .unwrap();

        // Overlapping set — {b, c} shares b with the current links
        TagLinkRepository::replace(
            &conn,
            EntityKind::Task,
            &task.id,
            &[b, c],
            Persistence::Existing,
        )
        .unwrap();

        let loaded = TagLinkRepository::load(&conn, EntityKind::Task, &task.id).unwrap();
        let titles: Vec<&str> = loaded.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["b", "c"]);
    }

    #[test]
    fn replace_with_empty_set_clears_links() {
        let (conn, user) = setup_db();
        let task = TaskRepository::create(
            &conn,
            &user,
            &TaskCreateParams {
                title: "T".into(),
                ..Default::default()
            },
        )
        .unwrap();
        let a = make_tag(&conn, &user, "a");
        TagLinkRepository::replace(&conn, EntityKind::Task, &task.id, &[a], Persistence::New)
            .unwrap();

        TagLinkRepository::replace(&conn, EntityKind::Task, &task.id, &[], Persistence::Existing)
            .unwrap();
        assert!(TagLinkRepository::load(&conn, EntityKind::Task, &task.id)
            .unwrap()
            .is_empty());
    }
}
