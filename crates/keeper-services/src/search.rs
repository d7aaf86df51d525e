//! Federated search across all four entity kinds.
//!
//! The per-entity search services validate and delegate to their
//! repositories synchronously. [`global_search`] is the one async surface:
//! it fans the query out to the four repositories concurrently, each on
//! its own pooled connection, and joins all-or-nothing — one failed
//! sub-search fails the whole aggregate, never a partial envelope.

use serde::Serialize;
use tracing::debug;

use keeper_core::{
    Collection, CollectionFilter, KeeperError, Note, NoteFilter, Result, Tag, Task, TaskFilter,
};
use keeper_store::{
    CollectionRepository, ConnectionPool, NoteRepository, TagRepository, TaskRepository,
};

/// Minimum length of a trimmed search query.
const MIN_QUERY_LEN: usize = 2;

/// Validate a raw query: trimmed, at least [`MIN_QUERY_LEN`] characters.
///
/// Returns the trimmed query. All search entry points call this at the
/// service boundary; repositories assume it already happened.
pub fn validate_query(query: &str) -> Result<&str> {
    let trimmed = query.trim();
    if trimmed.chars().count() < MIN_QUERY_LEN {
        return Err(KeeperError::short_query());
    }
    Ok(trimmed)
}

/// Per-kind results of a global search, each truncated to the caller's
/// per-type cap.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    /// Matching tasks.
    pub tasks: Vec<Task>,
    /// Matching notes.
    pub notes: Vec<Note>,
    /// Matching collections.
    pub collections: Vec<Collection>,
    /// Matching tags.
    pub tags: Vec<Tag>,
}

/// Response envelope for a global search.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEnvelope {
    /// The trimmed query that was executed.
    pub query: String,
    /// Per-kind results after truncation.
    pub results: SearchResults,
    /// Sum of the four result counts BEFORE per-type truncation.
    pub total_count: usize,
}

/// Run one sub-search on its own pooled connection, off the async runtime.
async fn run_sub_search<T, F>(pool: &ConnectionPool, op: F) -> Result<Vec<T>>
where
    T: Send + 'static,
    F: FnOnce(&rusqlite::Connection) -> Result<Vec<T>> + Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || -> Result<Vec<T>> {
        let conn = pool.get()?;
        op(&conn)
    })
    .await
    .map_err(|err| KeeperError::Internal(format!("search worker failed: {err}")))?
}

/// Search tasks, notes, collections, and tags concurrently and merge the
/// results into one envelope.
///
/// The query is validated once, before any fan-out. Each sub-search runs
/// unlimited (no skip/limit) so `total_count` reflects the true match
/// count; only the returned lists are truncated to `limit_per_type`.
pub async fn global_search(
    pool: &ConnectionPool,
    user_id: &str,
    query: &str,
    limit_per_type: usize,
) -> Result<SearchEnvelope> {
    let trimmed = validate_query(query)?.to_string();
    debug!(user = user_id, query = %trimmed, "global search");

    let task_query = trimmed.clone();
    let task_user = user_id.to_string();
    let note_query = trimmed.clone();
    let note_user = user_id.to_string();
    let coll_query = trimmed.clone();
    let coll_user = user_id.to_string();
    let tag_query = trimmed.clone();
    let tag_user = user_id.to_string();

    let (mut tasks, mut notes, mut collections, mut tags) = tokio::try_join!(
        run_sub_search(pool, move |conn| {
            TaskRepository::search(conn, &task_user, &task_query, &TaskFilter::default(), None, None)
        }),
        run_sub_search(pool, move |conn| {
            NoteRepository::search(conn, &note_user, &note_query, &NoteFilter::default(), None, None)
        }),
        run_sub_search(pool, move |conn| {
            CollectionRepository::search(
                conn,
                &coll_user,
                &coll_query,
                &CollectionFilter::default(),
                None,
                None,
            )
        }),
        run_sub_search(pool, move |conn| {
            TagRepository::search(conn, &tag_user, &tag_query, None, None)
        }),
    )?;

    let total_count = tasks.len() + notes.len() + collections.len() + tags.len();

    tasks.truncate(limit_per_type);
    notes.truncate(limit_per_type);
    collections.truncate(limit_per_type);
    tags.truncate(limit_per_type);

    Ok(SearchEnvelope {
        query: trimmed,
        results: SearchResults {
            tasks,
            notes,
            collections,
            tags,
        },
        total_count,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
