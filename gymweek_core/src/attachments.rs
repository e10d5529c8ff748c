//! Routine attachment tracking.
//!
//! Media linked to a routine are identified by public id. Routine edits can
//! add attachments while a session is being checked off; the differ tells
//! the caller exactly which ids an edit introduced so only the new media
//! get attached to a created session, never re-attaching the old ones.

use crate::types::{AttachmentOption, MediaItem, RoutineDoc};
use std::collections::HashSet;

/// Current set of media ids linked to a routine
///
/// Deduplicated, blank ids dropped, routine order preserved. Malformed
/// attachment entries were already discarded at parse time, so this never
/// fails; the worst case is an empty set.
pub fn attachments_set(routine: &RoutineDoc) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for option in &routine.attachments {
        let id = option.public_id.trim();
        if id.is_empty() || !seen.insert(id.to_string()) {
            continue;
        }
        ids.push(id.to_string());
    }
    ids
}

/// Ids present in `after` but not in `before`, in `after`'s order
pub fn diff_new_attachment_public_ids(before: &[String], after: &[String]) -> Vec<String> {
    let known: HashSet<&str> = before.iter().map(String::as_str).collect();
    after
        .iter()
        .filter(|id| !known.contains(id.as_str()))
        .cloned()
        .collect()
}

/// Map an attachment option to the external media-item shape
///
/// `None` when the option has no usable URL; a plain `url` is preferred,
/// falling back to `secure_url`.
pub fn attachment_to_media_item(option: &AttachmentOption) -> Option<MediaItem> {
    let url = option
        .url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .or_else(|| {
            option
                .secure_url
                .as_deref()
                .map(str::trim)
                .filter(|url| !url.is_empty())
        })?;
    Some(MediaItem {
        public_id: option.public_id.clone(),
        url: url.to_string(),
        name: option.name.clone(),
        resource_type: option.resource_type.clone(),
    })
}

/// Resolve ledger media ids against the routine's attachment options
///
/// Ids that match no attachment, or whose attachment has no usable URL,
/// are silently omitted. Duplicate ids resolve once.
pub fn resolve_media_items(routine: &RoutineDoc, public_ids: &[String]) -> Vec<MediaItem> {
    let mut seen = HashSet::new();
    public_ids
        .iter()
        .filter(|id| seen.insert(id.as_str()))
        .filter_map(|id| {
            routine
                .attachments
                .iter()
                .find(|option| option.public_id == *id)
                .and_then(attachment_to_media_item)
        })
        .collect()
}
