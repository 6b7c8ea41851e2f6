//! Bounded training history stored in the skill definition header.
//!
//! A training run rewrites only the header: the new proficiency replaces
//! the old value in place, the record is pushed onto the front of
//! `training-history`, and the list is capped at [`HISTORY_LIMIT`]
//! entries. Existing history entries are carried over as raw YAML, so an
//! old entry readers cannot parse is still preserved on disk. The body is
//! never touched; it is re-attached byte-for-byte.
//!
//! Because the header must be rewritten in place, this is the one read
//! path that refuses malformed headers instead of degrading.

use std::{io::ErrorKind, path::Path};

use serde_yaml::Value;

use crate::{
    error::Error,
    fields, frontmatter, layout, skill,
    types::TrainingRecord,
};

/// Most training records kept per skill, newest first.
pub const HISTORY_LIMIT: usize = 10;

/// Record a completed training run: set the skill's proficiency to
/// `new_score` (rounded and clamped to `[0, 100]`) and prepend `record`
/// to its history.
pub async fn record_training(
    root: &Path,
    id: &str,
    new_score: f64,
    record: &TrainingRecord,
) -> crate::Result<()> {
    if !layout::is_valid_id(id) {
        return Err(Error::NotFound(id.to_string()));
    }
    let path = layout::skill_file(root, id);
    let text = match tokio::fs::read_to_string(&path).await {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(Error::NotFound(id.to_string())),
        Err(e) => return Err(e.into()),
    };

    let doc = frontmatter::split(&text);
    let Some(header_text) = doc.header else {
        return Err(Error::MalformedHeader {
            path,
            reason: "missing `---` header delimiters".to_string(),
        });
    };
    let mut header = frontmatter::parse_strict(header_text).map_err(|reason| {
        Error::MalformedHeader {
            path: path.clone(),
            reason,
        }
    })?;

    let score = skill::clamp_score(new_score);
    header.insert("proficiency".into(), Value::from(u64::from(score)));

    let mut history = match fields::take(&mut header, &["training-history", "training_history"]) {
        Some(Value::Sequence(entries)) => entries,
        Some(_) | None => Vec::new(),
    };
    history.insert(0, serde_yaml::to_value(record)?);
    history.truncate(HISTORY_LIMIT);
    header.insert("training-history".into(), Value::Sequence(history));

    let contents = frontmatter::splice(&header, doc.body)?;
    tokio::fs::write(&path, contents).await?;
    tracing::info!(%id, score, "recorded training run");
    Ok(())
}

/// Read a skill's training history, newest first. Entries that do not
/// parse are skipped with a warning.
pub async fn training_history(root: &Path, id: &str) -> crate::Result<Vec<TrainingRecord>> {
    if !layout::is_valid_id(id) {
        return Err(Error::NotFound(id.to_string()));
    }
    let path = layout::skill_file(root, id);
    let text = match tokio::fs::read_to_string(&path).await {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(Error::NotFound(id.to_string())),
        Err(e) => return Err(e.into()),
    };

    let doc = frontmatter::split(&text);
    let header = doc
        .header
        .map(|h| frontmatter::parse_lossy(h, &path))
        .unwrap_or_default();
    Ok(
        fields::lookup(&header, &["training-history", "training_history"])
            .map(|value| skill::decode_history(value, &path))
            .unwrap_or_default(),
    )
}
