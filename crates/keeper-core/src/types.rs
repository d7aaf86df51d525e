//! Core types for the productivity backend.
//!
//! All serializable types use `camelCase` for wire compatibility with the
//! API layer. Enum values match the `SQLite` CHECK constraint vocabulary,
//! so `as_sql`/`from_sql` round-trip against stored rows.

use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize a tri-state field: absent → `None`, explicit null →
/// `Some(None)`, value → `Some(Some(v))`. Pair with `#[serde(default)]`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

// ─────────────────────────────────────────────────────────────────────────────
// Enums
// ─────────────────────────────────────────────────────────────────────────────

/// Task status in the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Not yet started.
    Todo,
    /// Currently being worked on.
    InProgress,
    /// Done.
    Completed,
}

impl TaskStatus {
    /// SQL string representation (matches `SQLite` CHECK constraint values).
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }

    /// Parse the SQL string representation.
    #[must_use]
    pub fn from_sql(value: &str) -> Option<Self> {
        match value {
            "todo" => Some(Self::Todo),
            "in-progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Task priority level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    /// Low priority.
    Low,
    /// Default priority.
    Medium,
    /// Elevated priority.
    High,
}

impl TaskPriority {
    /// SQL string representation.
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Parse the SQL string representation.
    #[must_use]
    pub fn from_sql(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Declared kind of a collection, restricting which item kinds it may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollectionKind {
    /// Holds both tasks and notes.
    Mixed,
    /// Holds tasks only.
    TasksOnly,
    /// Holds notes only.
    NotesOnly,
}

impl CollectionKind {
    /// SQL string representation.
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Mixed => "mixed",
            Self::TasksOnly => "tasks-only",
            Self::NotesOnly => "notes-only",
        }
    }

    /// Parse the SQL string representation.
    #[must_use]
    pub fn from_sql(value: &str) -> Option<Self> {
        match value {
            "mixed" => Some(Self::Mixed),
            "tasks-only" => Some(Self::TasksOnly),
            "notes-only" => Some(Self::NotesOnly),
            _ => None,
        }
    }
}

impl std::fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// The containable item kinds — what can be placed inside a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// A task.
    Task,
    /// A note.
    Note,
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Task => f.write_str("task"),
            Self::Note => f.write_str("note"),
        }
    }
}

/// The taggable entity kinds, carrying the association-table descriptor
/// used by the polymorphic tag-link repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A task (`task_tags` join table).
    Task,
    /// A note (`note_tags` join table).
    Note,
    /// A collection (`collection_tags` join table).
    Collection,
}

impl EntityKind {
    /// Name of the tag association table for this kind.
    #[must_use]
    pub fn link_table(self) -> &'static str {
        match self {
            Self::Task => "task_tags",
            Self::Note => "note_tags",
            Self::Collection => "collection_tags",
        }
    }

    /// Name of the entity FK column in the association table.
    #[must_use]
    pub fn link_column(self) -> &'static str {
        match self {
            Self::Task => "task_id",
            Self::Note => "note_id",
            Self::Collection => "collection_id",
        }
    }
}

/// Whether an entity row has already been written within the current
/// transaction. The tag reconciler dispatches on this: a `New` entity has
/// no association rows to clear, an `Existing` one must be cleared before
/// repopulating to avoid duplicate-key inserts on overlapping sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persistence {
    /// Row inserted in this operation; no prior tag links exist.
    New,
    /// Row existed before this operation; tag links may exist.
    Existing,
}

// ─────────────────────────────────────────────────────────────────────────────
// Domain records
// ─────────────────────────────────────────────────────────────────────────────

/// A registered user. Password hashing is owned by the auth layer; the
/// hash is opaque here and never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Prefixed uuid-v7 ID (`user-…`).
    pub id: String,
    /// Unique login name.
    pub username: String,
    /// Unique email address.
    pub email: String,
    /// Opaque password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Creation timestamp (UTC ISO-8601).
    pub created_at: String,
    /// Last modification timestamp (UTC ISO-8601).
    pub updated_at: String,
}

/// A user-owned tag. Titles are unique per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    /// Prefixed uuid-v7 ID (`tag-…`).
    pub id: String,
    /// Owning user.
    pub user_id: String,
    /// Tag title, unique per user.
    pub title: String,
    /// Creation timestamp.
    pub created_at: String,
    /// Last modification timestamp.
    pub updated_at: String,
}

/// A task, optionally contained in a collection and carrying a tag set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Prefixed uuid-v7 ID (`task-…`).
    pub id: String,
    /// Owning user.
    pub user_id: String,
    /// Containing collection, if any.
    pub collection_id: Option<String>,
    /// Title.
    pub title: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Workflow status.
    pub status: TaskStatus,
    /// Priority level.
    pub priority: TaskPriority,
    /// Creation timestamp.
    pub created_at: String,
    /// Last modification timestamp.
    pub updated_at: String,
    /// Eagerly-loaded tag set, ordered by title.
    pub tags: Vec<Tag>,
}

/// A note, optionally contained in a collection and carrying a tag set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Prefixed uuid-v7 ID (`note-…`).
    pub id: String,
    /// Owning user.
    pub user_id: String,
    /// Containing collection, if any.
    pub collection_id: Option<String>,
    /// Title.
    pub title: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
    /// Last modification timestamp.
    pub updated_at: String,
    /// Eagerly-loaded tag set, ordered by title.
    pub tags: Vec<Tag>,
}

/// A collection of tasks and/or notes. Titles are unique per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    /// Prefixed uuid-v7 ID (`coll-…`).
    pub id: String,
    /// Owning user.
    pub user_id: String,
    /// Collection title, unique per user.
    pub title: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Declared containment kind.
    pub kind: CollectionKind,
    /// Creation timestamp.
    pub created_at: String,
    /// Last modification timestamp.
    pub updated_at: String,
    /// Eagerly-loaded tag set, ordered by title.
    pub tags: Vec<Tag>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Create / update params
// ─────────────────────────────────────────────────────────────────────────────

/// Parameters for creating a user.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreateParams {
    /// Unique login name.
    pub username: String,
    /// Unique email address.
    pub email: String,
    /// Pre-hashed password (hashing happens in the auth layer).
    pub password_hash: String,
}

/// Parameters for creating a tag.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagCreateParams {
    /// Tag title, unique per user.
    pub title: String,
}

/// Parameters for creating a task.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCreateParams {
    /// Title (required).
    pub title: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Initial status; defaults to `todo`.
    pub status: Option<TaskStatus>,
    /// Initial priority; defaults to `medium`.
    pub priority: Option<TaskPriority>,
    /// Containing collection.
    pub collection_id: Option<String>,
    /// Desired tag set. `None` leaves the task untagged.
    pub tag_ids: Option<Vec<String>>,
}

/// Parameters for updating a task. Absent fields are left untouched.
///
/// `collection_id` is tri-state: `None` leaves the containment link alone,
/// `Some(None)` detaches, `Some(Some(id))` attaches (policy-checked).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdateParams {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New status.
    pub status: Option<TaskStatus>,
    /// New priority.
    pub priority: Option<TaskPriority>,
    /// Containment change (see struct docs).
    #[serde(default, deserialize_with = "double_option")]
    pub collection_id: Option<Option<String>>,
    /// Replacement tag set. `None` leaves tags untouched.
    pub tag_ids: Option<Vec<String>>,
}

/// Parameters for creating a note.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteCreateParams {
    /// Title (required).
    pub title: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Containing collection.
    pub collection_id: Option<String>,
    /// Desired tag set. `None` leaves the note untagged.
    pub tag_ids: Option<Vec<String>>,
}

/// Parameters for updating a note. Same tri-state `collection_id`
/// semantics as [`TaskUpdateParams`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteUpdateParams {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// Containment change.
    #[serde(default, deserialize_with = "double_option")]
    pub collection_id: Option<Option<String>>,
    /// Replacement tag set. `None` leaves tags untouched.
    pub tag_ids: Option<Vec<String>>,
}

/// Parameters for creating a collection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionCreateParams {
    /// Title, unique per user (required).
    pub title: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Containment kind; defaults to `mixed`.
    pub kind: Option<CollectionKind>,
    /// Desired tag set.
    pub tag_ids: Option<Vec<String>>,
}

/// Parameters for updating a collection. Kind changes do not re-check
/// already-linked tasks/notes (links are validated at link time only).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionUpdateParams {
    /// New title (duplicate-checked per user).
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New containment kind.
    pub kind: Option<CollectionKind>,
    /// Replacement tag set. `None` leaves tags untouched.
    pub tag_ids: Option<Vec<String>>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Filters
// ─────────────────────────────────────────────────────────────────────────────

/// Equality filters for task list/search. `None` means no constraint.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Filter by status.
    pub status: Option<TaskStatus>,
    /// Filter by priority.
    pub priority: Option<TaskPriority>,
    /// Filter by containing collection.
    pub collection_id: Option<String>,
}

/// Equality filters for note list/search.
#[derive(Debug, Clone, Default)]
pub struct NoteFilter {
    /// Filter by containing collection.
    pub collection_id: Option<String>,
}

/// Equality filters for collection list/search.
#[derive(Debug, Clone, Default)]
pub struct CollectionFilter {
    /// Filter by containment kind.
    pub kind: Option<CollectionKind>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
