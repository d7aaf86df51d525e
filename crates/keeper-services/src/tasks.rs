//! Task service.
//!
//! Mutation flow: confirm the target collection exists and accepts tasks,
//! pre-validate the requested tag set, write the row, reconcile tag
//! links — all inside one transaction, committed once.

use rusqlite::Connection;
use tracing::debug;

use keeper_core::{
    EntityKind, ItemKind, KeeperError, Persistence, Result, Task, TaskCreateParams, TaskFilter,
    TaskUpdateParams,
};
use keeper_store::{CollectionRepository, TaskRepository};

use crate::collections::ensure_collection_accepts;
use crate::search::validate_query;
use crate::tagging::{reconcile_tags, resolve_owned_tags};

/// Task service with containment and tag-ownership enforcement.
pub struct TaskService;

impl TaskService {
    /// Create a task for a user.
    pub fn create_task(
        conn: &mut Connection,
        user_id: &str,
        params: &TaskCreateParams,
    ) -> Result<Task> {
        let tx = conn.transaction()?;

        if let Some(ref collection_id) = params.collection_id {
            let collection = CollectionRepository::get(&tx, collection_id, user_id)?
                .ok_or_else(|| KeeperError::collection_not_found(collection_id))?;
            ensure_collection_accepts(&collection, ItemKind::Task)?;
        }
        if let Some(ref tag_ids) = params.tag_ids {
            // Fail before the insert; the reconciler re-resolves on its own.
            let _ = resolve_owned_tags(&tx, user_id, tag_ids, true)?;
        }

        let task = TaskRepository::create(&tx, user_id, params)?;
        if let Some(ref tag_ids) = params.tag_ids {
            reconcile_tags(
                &tx,
                user_id,
                EntityKind::Task,
                &task.id,
                Persistence::New,
                tag_ids,
            )?;
        }
        tx.commit()?;

        TaskRepository::get(conn, &task.id, user_id)?
            .ok_or_else(|| KeeperError::task_not_found(&task.id))
    }

    /// Update a task.
    ///
    /// The containment check runs only when `collection_id` is being set
    /// to a non-null value; detaching (`Some(None)`) skips it.
    pub fn update_task(
        conn: &mut Connection,
        user_id: &str,
        id: &str,
        params: &TaskUpdateParams,
    ) -> Result<Task> {
        let tx = conn.transaction()?;

        let current = TaskRepository::get(&tx, id, user_id)?
            .ok_or_else(|| KeeperError::task_not_found(id))?;
        debug!(task = %current.id, "updating task");

        if let Some(Some(ref collection_id)) = params.collection_id {
            let collection = CollectionRepository::get(&tx, collection_id, user_id)?
                .ok_or_else(|| KeeperError::collection_not_found(collection_id))?;
            ensure_collection_accepts(&collection, ItemKind::Task)?;
        }

        let _ = TaskRepository::update(&tx, id, user_id, params)?
            .ok_or_else(|| KeeperError::task_not_found(id))?;
        if let Some(ref tag_ids) = params.tag_ids {
            reconcile_tags(
                &tx,
                user_id,
                EntityKind::Task,
                id,
                Persistence::Existing,
                tag_ids,
            )?;
        }
        tx.commit()?;

        TaskRepository::get(conn, id, user_id)?.ok_or_else(|| KeeperError::task_not_found(id))
    }

    /// Delete a task.
    pub fn delete_task(conn: &Connection, user_id: &str, id: &str) -> Result<()> {
        let _ = TaskRepository::get(conn, id, user_id)?
            .ok_or_else(|| KeeperError::task_not_found(id))?;
        let _ = TaskRepository::delete(conn, id, user_id)?;
        Ok(())
    }

    /// Get a task by ID.
    pub fn get_task(conn: &Connection, user_id: &str, id: &str) -> Result<Task> {
        TaskRepository::get(conn, id, user_id)?.ok_or_else(|| KeeperError::task_not_found(id))
    }

    /// List a user's tasks with equality filters.
    pub fn list_tasks(conn: &Connection, user_id: &str, filter: &TaskFilter) -> Result<Vec<Task>> {
        TaskRepository::list(conn, user_id, filter)
    }

    /// Search tasks by title/description with optional filters and window.
    pub fn search_tasks(
        conn: &Connection,
        user_id: &str,
        query: &str,
        filter: &TaskFilter,
        skip: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Vec<Task>> {
        let trimmed = validate_query(query)?;
        TaskRepository::search(conn, user_id, trimmed, filter, skip, limit)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use super::*;
    use keeper_core::{
        CollectionCreateParams, CollectionKind, TagCreateParams, UserCreateParams,
    };
    use keeper_store::{TagRepository, UserRepository, run_migrations};

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

    fn make_collection(conn: &Connection, user_id: &str, title: &str, kind: CollectionKind) -> String {
        keeper_store::CollectionRepository::create(
            conn,
            user_id,
            &CollectionCreateParams {
                title: title.to_string(),
                kind: Some(kind),
                ..Default::default()
            },
        )
        .unwrap()
        .id
    }

    #[test]
    fn create_task_with_tags() {
        let (mut conn, user) = setup_db();
        let tag = TagRepository::create(&conn, &user, &TagCreateParams { title: "t".into() })
            .unwrap();
        let task = TaskService::create_task(
            &mut conn,
            &user,
            &TaskCreateParams {
                title: "Tagged".into(),
                tag_ids: Some(vec![tag.id.clone()]),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(task.tags.len(), 1);
        assert_eq!(task.tags[0].id, tag.id);
    }

    #[test]
    fn create_task_in_notes_only_collection_is_a_policy_violation() {
        let (mut conn, user) = setup_db();
        let collection = make_collection(&conn, &user, "Journal", CollectionKind::NotesOnly);
        let err = TaskService::create_task(
            &mut conn,
            &user,
            &TaskCreateParams {
                title: "T".into(),
                collection_id: Some(collection),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, KeeperError::Policy { .. }));
    }

    #[test]
    fn missing_collection_is_not_found_not_policy() {
        let (mut conn, user) = setup_db();
        let err = TaskService::create_task(
            &mut conn,
            &user,
            &TaskCreateParams {
                title: "T".into(),
                collection_id: Some("coll-missing".into()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(
            err,
            KeeperError::NotFound { entity: "collection", .. }
        ));
    }

    #[test]
    fn foreign_collection_is_not_found() {
        let (mut conn, user) = setup_db();
        let other = UserRepository::create(
            &conn,
            &UserCreateParams {
                username: "bob".into(),
                email: "bob@example.com".into(),
                password_hash: "h".into(),
            },
        )
        .unwrap();
        let foreign = make_collection(&conn, &other.id, "Theirs", CollectionKind::Mixed);
        let err = TaskService::create_task(
            &mut conn,
            &user,
            &TaskCreateParams {
                title: "T".into(),
                collection_id: Some(foreign),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, KeeperError::NotFound { .. }));
    }

    #[test]
    fn create_with_unowned_tags_persists_nothing() {
        let (mut conn, user) = setup_db();
        let err = TaskService::create_task(
            &mut conn,
            &user,
            &TaskCreateParams {
                title: "T".into(),
                tag_ids: Some(vec!["tag-missing".into()]),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, KeeperError::UnownedTags { .. }));

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn update_moving_into_tasks_only_collection_is_allowed() {
        let (mut conn, user) = setup_db();
        let collection = make_collection(&conn, &user, "Work", CollectionKind::TasksOnly);
        let task = TaskService::create_task(
            &mut conn,
            &user,
            &TaskCreateParams {
                title: "T".into(),
                ..Default::default()
            },
        )
        .unwrap();

        let moved = TaskService::update_task(
            &mut conn,
            &user,
            &task.id,
            &TaskUpdateParams {
                collection_id: Some(Some(collection.clone())),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(moved.collection_id, Some(collection));
    }

    #[test]
    fn update_detach_skips_policy_check() {
        let (mut conn, user) = setup_db();
        let collection = make_collection(&conn, &user, "Work", CollectionKind::TasksOnly);
        let task = TaskService::create_task(
            &mut conn,
            &user,
            &TaskCreateParams {
                title: "T".into(),
                collection_id: Some(collection),
                ..Default::default()
            },
        )
        .unwrap();

        // Flip the collection to notes-only; the existing link is
        // grandfathered and detaching must still work.
        conn.execute(
            "UPDATE collections SET kind = 'notes-only'",
            [],
        )
        .unwrap();

        let detached = TaskService::update_task(
            &mut conn,
            &user,
            &task.id,
            &TaskUpdateParams {
                collection_id: Some(None),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(detached.collection_id.is_none());
    }

    #[test]
    fn update_replaces_tag_set() {
        let (mut conn, user) = setup_db();
        let a = TagRepository::create(&conn, &user, &TagCreateParams { title: "a".into() })
            .unwrap();
        let b = TagRepository::create(&conn, &user, &TagCreateParams { title: "b".into() })
            .unwrap();
        let task = TaskService::create_task(
            &mut conn,
            &user,
            &TaskCreateParams {
                title: "T".into(),
                tag_ids: Some(vec![a.id.clone(), b.id.clone()]),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(task.tags.len(), 2);

        let updated = TaskService::update_task(
            &mut conn,
            &user,
            &task.id,
            &TaskUpdateParams {
                tag_ids: Some(vec![b.id.clone()]),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(updated.tags.len(), 1);
        assert_eq!(updated.tags[0].id, b.id);
    }

    #[test]
    fn update_without_tag_ids_leaves_tags_untouched() {
        let (mut conn, user) = setup_db();
        let a = TagRepository::create(&conn, &user, &TagCreateParams { title: "a".into() })
            .unwrap();
        let task = TaskService::create_task(
            &mut conn,
            &user,
            &TaskCreateParams {
                title: "T".into(),
                tag_ids: Some(vec![a.id]),
                ..Default::default()
            },
        )
        .unwrap();

        let updated = TaskService::update_task(
            &mut conn,
            &user,
            &task.id,
            &TaskUpdateParams {
                title: Some("Renamed".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.tags.len(), 1);
    }

    #[test]
    fn delete_missing_task_is_not_found() {
        let (conn, user) = setup_db();
        let err = TaskService::delete_task(&conn, &user, "task-missing").unwrap_err();
        assert!(matches!(err, KeeperError::NotFound { entity: "task", .. }));
    }

    #[test]
    fn search_short_query_is_a_validation_error() {
        let (conn, user) = setup_db();
        let err =
            TaskService::search_tasks(&conn, &user, " a ", &TaskFilter::default(), None, None)
                .unwrap_err();
        assert!(matches!(err, KeeperError::Validation(_)));
    }

    #[test]
    fn search_no_match_is_empty_not_error() {
        let (mut conn, user) = setup_db();
        TaskService::create_task(
            &mut conn,
            &user,
            &TaskCreateParams {
                title: "Team meeting".into(),
                ..Default::default()
            },
        )
        .unwrap();

        let hits =
            TaskService::search_tasks(&conn, &user, "mee", &TaskFilter::default(), None, None)
                .unwrap();
        assert_eq!(hits.len(), 1);

        let none =
            TaskService::search_tasks(&conn, &user, "xyz123", &TaskFilter::default(), None, None)
                .unwrap();
        assert!(none.is_empty());
    }
}
