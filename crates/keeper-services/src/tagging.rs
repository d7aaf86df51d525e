//! Tag ownership validation and tag-set reconciliation.
//!
//! These two operations are the write-side core of the tagging model:
//! every mutation that touches a tag set goes through [`reconcile_tags`],
//! and [`reconcile_tags`] always re-resolves ownership itself — a caller's
//! earlier validation is never trusted across step boundaries.

use rusqlite::Connection;

use keeper_core::{EntityKind, KeeperError, Persistence, Result, Tag};
use keeper_store::{TagLinkRepository, TagRepository};

/// Resolve which of the requested tag IDs exist and belong to `user_id`.
///
/// Input IDs are de-duplicated preserving first-seen order before lookup;
/// empty input short-circuits without a query. With `require_all`, any
/// unresolved ID fails the whole operation with the missing IDs sorted
/// ascending.
pub fn resolve_owned_tags(
    conn: &Connection,
    user_id: &str,
    tag_ids: &[String],
    require_all: bool,
) -> Result<Vec<Tag>> {
    let mut requested: Vec<String> = Vec::with_capacity(tag_ids.len());
    for id in tag_ids {
        if !requested.contains(id) {
            requested.push(id.clone());
        }
    }
    if requested.is_empty() {
        return Ok(Vec::new());
    }

    let tags = TagRepository::find_owned(conn, user_id, &requested)?;

    if require_all && tags.len() != requested.len() {
        let found: std::collections::HashSet<&str> =
            tags.iter().map(|tag| tag.id.as_str()).collect();
        let mut missing: Vec<String> = requested
            .into_iter()
            .filter(|id| !found.contains(id.as_str()))
            .collect();
        missing.sort();
        return Err(KeeperError::UnownedTags { missing });
    }

    Ok(tags)
}

/// Replace an entity's tag set with the desired IDs.
///
/// Re-resolves ownership with `require_all` semantics, then swaps the
/// association rows. The `persistence` tag selects the lifecycle branch:
/// a freshly-inserted entity has no links to clear, an existing one is
/// cleared before repopulating.
///
/// Runs against the caller's transaction — durable only relative to it.
pub fn reconcile_tags(
    conn: &Connection,
    user_id: &str,
    kind: EntityKind,
    entity_id: &str,
    persistence: Persistence,
    tag_ids: &[String],
) -> Result<()> {
    let tags = resolve_owned_tags(conn, user_id, tag_ids, true)?;
    TagLinkRepository::replace(conn, kind, entity_id, &tags, persistence)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
