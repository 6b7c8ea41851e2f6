//! Skill parsing: the definition file, its input-field companion, and
//! bundled assets.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use serde_yaml::Value;

use crate::{
    fields, frontmatter, layout,
    types::{InputField, Skill, SkillAssets, TrainingRecord},
};

/// Load one skill by id.
///
/// Returns `Ok(None)` when the skill does not exist. Ids that fail the
/// format check cannot name a directory we would ever create, so they are
/// reported as absent rather than joined onto the skills root.
pub async fn load_skill(root: &Path, id: &str) -> crate::Result<Option<Skill>> {
    if !layout::is_valid_id(id) {
        return Ok(None);
    }
    let dir = layout::skill_dir(root, id);
    let definition = dir.join(layout::SKILL_FILE);
    let text = match tokio::fs::read_to_string(&definition).await {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(parse_skill_text(&dir, &definition, &text)))
}

/// Parse a skill directory; `Ok(None)` when the definition file is
/// missing. Used by the scanner, which has already established that `dir`
/// is a directory.
pub(crate) fn parse_skill_dir(dir: &Path) -> crate::Result<Option<Skill>> {
    let definition = dir.join(layout::SKILL_FILE);
    let text = match std::fs::read_to_string(&definition) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(parse_skill_text(dir, &definition, &text)))
}

fn parse_skill_text(dir: &Path, path: &Path, text: &str) -> Skill {
    let doc = frontmatter::split(text);
    let header = doc
        .header
        .map(|h| frontmatter::parse_lossy(h, path))
        .unwrap_or_default();

    let id = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = fields::string_at(&header, &["name"]).unwrap_or_else(|| id.clone());

    let proficiency = fields::f64_at(&header, &["proficiency"])
        .map(clamp_score)
        .unwrap_or(0);
    let training_history = fields::lookup(&header, &["training-history", "training_history"])
        .map(|value| decode_history(value, path))
        .unwrap_or_default();

    let assets = read_assets(dir);

    Skill {
        id,
        name,
        description: fields::string_at(&header, &["description"]).unwrap_or_default(),
        dir: dir.to_path_buf(),
        path: path.to_path_buf(),
        body: doc.body.trim().to_string(),
        allowed_tools: fields::string_list_at(&header, &["allowed-tools", "allowed_tools"]),
        mcp_servers: fields::tool_map_at(&header, &["mcp-servers", "mcp_servers", "mcpServers"]),
        inputs: read_schema_inputs(dir),
        assets,
        proficiency,
        training_history,
        usage: None,
    }
}

/// Round and clamp a raw score into the stored `[0, 100]` range.
pub(crate) fn clamp_score(score: f64) -> u8 {
    score.clamp(0.0, 100.0).round() as u8
}

/// Decode a raw `training-history` value, skipping entries that do not
/// parse. The training rewrite keeps unparseable entries on disk; readers
/// just do not see them.
pub(crate) fn decode_history(value: &Value, path: &Path) -> Vec<TrainingRecord> {
    let Value::Sequence(entries) = value else {
        tracing::warn!(?path, "training-history is not a list, ignoring");
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| match serde_yaml::from_value(entry.clone()) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(?path, %e, "skipping unparseable training record");
                None
            },
        })
        .collect()
}

#[derive(Deserialize)]
struct SchemaFile {
    #[serde(default)]
    inputs: Vec<InputField>,
}

fn read_schema_inputs(dir: &Path) -> Vec<InputField> {
    let path = dir.join(layout::SCHEMA_FILE);
    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            tracing::warn!(?path, %e, "failed to read input schema");
            return Vec::new();
        },
    };
    match serde_json::from_str::<SchemaFile>(&raw) {
        Ok(schema) => schema.inputs,
        Err(e) => {
            tracing::warn!(?path, %e, "malformed input schema, ignoring");
            Vec::new()
        },
    }
}

fn read_assets(dir: &Path) -> Option<SkillAssets> {
    let assets = SkillAssets {
        reference: read_optional(dir.join(layout::REFERENCE_FILE)),
        examples: read_optional(dir.join(layout::EXAMPLES_FILE)),
        scripts: list_files(dir.join(layout::SCRIPTS_DIR)),
        templates: list_files(dir.join(layout::TEMPLATES_DIR)),
    };
    (!assets.is_empty()).then_some(assets)
}

fn read_optional(path: PathBuf) -> Option<String> {
    match std::fs::read_to_string(&path) {
        Ok(text) => Some(text),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => {
            tracing::warn!(?path, %e, "failed to read optional skill file");
            None
        },
    }
}

/// Sorted file names directly under `dir`; an absent directory is an
/// empty list.
fn list_files(dir: PathBuf) -> Vec<String> {
    let entries = match std::fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            tracing::warn!(?dir, %e, "failed to list skill assets");
            return Vec::new();
        },
    };
    let mut names: Vec<String> = entries
        .flatten()
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .collect();
    names.sort();
    names
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::types::InputKind;

    const FULL_SKILL: &str = r#"---
name: PDF Processing
description: Extract text from PDFs. Use when the user uploads a PDF.
allowed-tools:
  - Read
  - Bash
mcp-servers:
  github: search, issues
proficiency: 72.6
training-history:
  - date: 2026-07-01T10:00:00Z
    score-before: 55.0
    score-after: 72.6
    issues:
      - missed footnotes
    edits-applied: true
    success: true
---

# PDF Processing

Read the file, then extract.
"#;

    fn skill_dir(tmp: &TempDir, id: &str) -> PathBuf {
        let dir = tmp.path().join(id);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn parses_a_full_definition() {
        let tmp = TempDir::new().unwrap();
        let dir = skill_dir(&tmp, "pdf-processing");
        fs::write(dir.join(layout::SKILL_FILE), FULL_SKILL).unwrap();

        let skill = parse_skill_dir(&dir).unwrap().unwrap();
        assert_eq!(skill.id, "pdf-processing");
        assert_eq!(skill.name, "PDF Processing");
        assert_eq!(skill.proficiency, 73);
        assert_eq!(skill.allowed_tools.unwrap(), vec!["Read", "Bash"]);
        assert_eq!(
            skill.mcp_servers.unwrap()["github"],
            vec!["search", "issues"]
        );
        assert_eq!(skill.training_history.len(), 1);
        assert_eq!(skill.training_history[0].score_after, 72.6);
        assert!(skill.training_history[0].edits_applied);
        assert!(skill.body.starts_with("# PDF Processing"));
        assert_eq!(skill.assets, None);
    }

    #[test]
    fn missing_definition_is_none() {
        let tmp = TempDir::new().unwrap();
        let dir = skill_dir(&tmp, "empty");
        assert!(parse_skill_dir(&dir).unwrap().is_none());
    }

    #[test]
    fn headerless_definition_falls_back_to_defaults() {
        let tmp = TempDir::new().unwrap();
        let dir = skill_dir(&tmp, "bare");
        fs::write(dir.join(layout::SKILL_FILE), "Just instructions.\n").unwrap();

        let skill = parse_skill_dir(&dir).unwrap().unwrap();
        assert_eq!(skill.name, "bare");
        assert_eq!(skill.description, "");
        assert_eq!(skill.proficiency, 0);
        assert!(skill.training_history.is_empty());
        assert_eq!(skill.body, "Just instructions.");
    }

    #[test]
    fn non_numeric_proficiency_defaults_to_zero() {
        let tmp = TempDir::new().unwrap();
        let dir = skill_dir(&tmp, "odd");
        fs::write(
            dir.join(layout::SKILL_FILE),
            "---\nname: odd\nproficiency: high\n---\nBody.\n",
        )
        .unwrap();

        let skill = parse_skill_dir(&dir).unwrap().unwrap();
        assert_eq!(skill.proficiency, 0);
    }

    #[test]
    fn companion_schema_and_assets_are_picked_up() {
        let tmp = TempDir::new().unwrap();
        let dir = skill_dir(&tmp, "rich");
        fs::write(dir.join(layout::SKILL_FILE), "---\nname: rich\n---\nBody.\n").unwrap();
        fs::write(
            dir.join(layout::SCHEMA_FILE),
            r#"{"inputs": [{"name": "mode", "type": "select", "label": "Mode", "required": true, "options": ["fast", "slow"]}]}"#,
        )
        .unwrap();
        fs::write(dir.join(layout::REFERENCE_FILE), "Deep dive.\n").unwrap();
        fs::create_dir(dir.join(layout::SCRIPTS_DIR)).unwrap();
        fs::write(dir.join(layout::SCRIPTS_DIR).join("b.sh"), "#!/bin/sh\n").unwrap();
        fs::write(dir.join(layout::SCRIPTS_DIR).join("a.sh"), "#!/bin/sh\n").unwrap();

        let skill = parse_skill_dir(&dir).unwrap().unwrap();
        assert_eq!(skill.inputs.len(), 1);
        assert_eq!(skill.inputs[0].kind, InputKind::Select);
        assert_eq!(skill.inputs[0].options, vec!["fast", "slow"]);

        let assets = skill.assets.unwrap();
        assert_eq!(assets.reference.as_deref(), Some("Deep dive.\n"));
        assert_eq!(assets.examples, None);
        assert_eq!(assets.scripts, vec!["a.sh", "b.sh"]);
    }

    #[test]
    fn malformed_schema_is_ignored() {
        let tmp = TempDir::new().unwrap();
        let dir = skill_dir(&tmp, "halfway");
        fs::write(dir.join(layout::SKILL_FILE), "---\nname: halfway\n---\nBody.\n").unwrap();
        fs::write(dir.join(layout::SCHEMA_FILE), "{not json").unwrap();

        let skill = parse_skill_dir(&dir).unwrap().unwrap();
        assert!(skill.inputs.is_empty());
    }

    #[test]
    fn unparseable_history_entries_are_skipped() {
        let tmp = TempDir::new().unwrap();
        let dir = skill_dir(&tmp, "mixed");
        fs::write(
            dir.join(layout::SKILL_FILE),
            "---\nname: mixed\ntraining-history:\n  - date: not-a-date\n    score-before: 1\n    score-after: 2\n  - date: 2026-07-01T10:00:00Z\n    score-before: 10.0\n    score-after: 20.0\n---\nBody.\n",
        )
        .unwrap();

        let skill = parse_skill_dir(&dir).unwrap().unwrap();
        assert_eq!(skill.training_history.len(), 1);
        assert_eq!(skill.training_history[0].score_after, 20.0);
    }

    #[test]
    fn score_clamping() {
        assert_eq!(clamp_score(72.6), 73);
        assert_eq!(clamp_score(-4.0), 0);
        assert_eq!(clamp_score(250.0), 100);
        assert_eq!(clamp_score(99.5), 100);
    }
}
