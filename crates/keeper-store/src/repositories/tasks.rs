//! Task repository.
//!
//! List and search build their WHERE clause dynamically from the filter
//! struct; search adds the case-insensitive infix match over title and
//! description. Every returned task carries its eagerly-loaded tag set so
//! the presentation layer never lazy-loads.

use rusqlite::types::ToSql;
use rusqlite::{Connection, OptionalExtension, Row, params};

use keeper_core::{
    EntityKind, KeeperError, Result, Task, TaskCreateParams, TaskFilter, TaskPriority, TaskStatus,
    TaskUpdateParams,
};

use super::links::TagLinkRepository;
use super::{generate_id, like_pattern, now_iso, push_window};

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    let status: String = row.get("status")?;
    let priority: String = row.get("priority")?;
    Ok(Task {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        collection_id: row.get("collection_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        status: TaskStatus::from_sql(&status).unwrap_or(TaskStatus::Todo),
        priority: TaskPriority::from_sql(&priority).unwrap_or(TaskPriority::Medium),
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        tags: Vec::new(),
    })
}

fn attach_tags(conn: &Connection, tasks: &mut [Task]) -> Result<()> {
    for task in tasks {
        task.tags = TagLinkRepository::load(conn, EntityKind::Task, &task.id)?;
    }
    Ok(())
}

/// Push the filter's equality conditions onto a WHERE clause.
fn push_filter(
    filter: &TaskFilter,
    conditions: &mut Vec<&'static str>,
    values: &mut Vec<Box<dyn ToSql>>,
) {
    if let Some(status) = filter.status {
        conditions.push("status = ?");
        values.push(Box::new(status.as_sql().to_string()));
    }
    if let Some(priority) = filter.priority {
        conditions.push("priority = ?");
        values.push(Box::new(priority.as_sql().to_string()));
    }
    if let Some(ref collection_id) = filter.collection_id {
        conditions.push("collection_id = ?");
        values.push(Box::new(collection_id.clone()));
    }
}

/// Task repository — stateless, every method takes `&Connection`.
pub struct TaskRepository;

impl TaskRepository {
    /// Create a task. Tag links are the reconciler's concern, not this
    /// method's.
    pub fn create(conn: &Connection, user_id: &str, params: &TaskCreateParams) -> Result<Task> {
        let id = generate_id("task");
        let now = now_iso();
        let status = params.status.unwrap_or(TaskStatus::Todo);
        let priority = params.priority.unwrap_or(TaskPriority::Medium);

        let _ = conn.execute(
            "INSERT INTO tasks (id, user_id, collection_id, title, description, \
             status, priority, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
            params![
                id,
                user_id,
                params.collection_id,
                params.title,
                params.description,
                status.as_sql(),
                priority.as_sql(),
                now,
            ],
        )?;

        Self::get(conn, &id, user_id)?.ok_or_else(|| KeeperError::task_not_found(&id))
    }

    /// Get a task by ID, scoped to its owner, with tags attached.
    pub fn get(conn: &Connection, id: &str, user_id: &str) -> Result<Option<Task>> {
        let task = conn
            .query_row(
                "SELECT * FROM tasks WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
                task_from_row,
            )
            .optional()?;
        match task {
            Some(mut task) => {
                task.tags = TagLinkRepository::load(conn, EntityKind::Task, &task.id)?;
                Ok(Some(task))
            }
            None => Ok(None),
        }
    }

    /// List a user's tasks with equality filters, newest-modified first.
    pub fn list(conn: &Connection, user_id: &str, filter: &TaskFilter) -> Result<Vec<Task>> {
        let mut conditions = vec!["user_id = ?"];
        let mut values: Vec<Box<dyn ToSql>> = vec![Box::new(user_id.to_string())];
        push_filter(filter, &mut conditions, &mut values);

        let sql = format!(
            "SELECT * FROM tasks WHERE {} ORDER BY updated_at DESC, id DESC",
            conditions.join(" AND ")
        );
        let bind: Vec<&dyn ToSql> = values.iter().map(Box::as_ref).collect();
        let mut stmt = conn.prepare(&sql)?;
        let mut tasks = stmt
            .query_map(bind.as_slice(), task_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        attach_tags(conn, &mut tasks)?;
        Ok(tasks)
    }

    /// Update a task. Returns the updated task, or `None` if not found.
    ///
    /// `collection_id: Some(None)` detaches the task from its collection;
    /// `None` leaves the link untouched.
    pub fn update(
        conn: &Connection,
        id: &str,
        user_id: &str,
        updates: &TaskUpdateParams,
    ) -> Result<Option<Task>> {
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
        if let Some(status) = updates.status {
            sets.push("status = ?");
            values.push(Box::new(status.as_sql().to_string()));
        }
        if let Some(priority) = updates.priority {
            sets.push("priority = ?");
            values.push(Box::new(priority.as_sql().to_string()));
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
            "UPDATE tasks SET {} WHERE id = ? AND user_id = ?",
            sets.join(", ")
        );
        let bind: Vec<&dyn ToSql> = values.iter().map(Box::as_ref).collect();
        let changed = conn.execute(&sql, bind.as_slice())?;
        if changed == 0 {
            return Ok(None);
        }
        Self::get(conn, id, user_id)
    }

    /// Delete a task. Association rows cascade. Returns true if a row was
    /// deleted.
    pub fn delete(conn: &Connection, id: &str, user_id: &str) -> Result<bool> {
        let changed = conn.execute(
            "DELETE FROM tasks WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(changed > 0)
    }

    /// Case-insensitive infix search over title and description, after the
    /// filter's equality conditions narrow the candidate set.
    ///
    /// Query preconditions (trimmed, minimum length) are enforced at the
    /// service boundary, not here.
    pub fn search(
        conn: &Connection,
        user_id: &str,
        query: &str,
        filter: &TaskFilter,
        skip: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Vec<Task>> {
        let mut conditions = vec!["user_id = ?"];
        let mut values: Vec<Box<dyn ToSql>> = vec![Box::new(user_id.to_string())];
        push_filter(filter, &mut conditions, &mut values);

        conditions.push("(lower(title) LIKE ? OR lower(coalesce(description, '')) LIKE ?)");
        let pattern = like_pattern(query);
        values.push(Box::new(pattern.clone()));
        values.push(Box::new(pattern));

        let mut sql = format!(
            "SELECT * FROM tasks WHERE {} ORDER BY updated_at DESC, id DESC",
            conditions.join(" AND ")
        );
        push_window(&mut sql, skip, limit);

        let bind: Vec<&dyn ToSql> = values.iter().map(Box::as_ref).collect();
        let mut stmt = conn.prepare(&sql)?;
        let mut tasks = stmt
            .query_map(bind.as_slice(), task_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        attach_tags(conn, &mut tasks)?;
        Ok(tasks)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
