//! Skill creation, update, and deletion.
//!
//! All validation happens before the first write, so a rejected request
//! leaves the tree untouched. Writes are plain whole-file rewrites; the
//! single-writer model this crate assumes makes tmp-and-rename machinery
//! unnecessary.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde_yaml::{Mapping, Value};

use crate::{
    error::Error,
    frontmatter, layout, skill,
    types::{CreateSkillRequest, InputField, Skill, UpdateSkillRequest},
};

/// Longest accepted description.
pub const MAX_DESCRIPTION_LEN: usize = 1024;

/// Substring every description must contain so agents know when to pick
/// the skill.
const USE_WHEN: &str = "use when";

/// Create a new skill directory with its definition file and, when input
/// fields are supplied, the `schema.json` companion. Returns the skill as
/// re-parsed from disk.
///
/// The directory creation doubles as the uniqueness check: it is the one
/// step that fails atomically when the skill already exists.
pub async fn create_skill(root: &Path, request: &CreateSkillRequest) -> crate::Result<Skill> {
    validate_id(&request.id)?;
    validate_content(&request.description, &request.body)?;
    validate_inputs(supplied(&request.inputs))?;

    let dir = layout::skill_dir(root, &request.id);
    tokio::fs::create_dir_all(layout::skills_dir(root)).await?;
    match tokio::fs::create_dir(&dir).await {
        Ok(()) => {},
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            return Err(Error::AlreadyExists(request.id.clone()));
        },
        Err(e) => return Err(e.into()),
    }

    let header = build_header(
        &request.id,
        &request.description,
        request.allowed_tools.as_deref(),
        request.mcp_servers.as_ref(),
    );
    let contents = frontmatter::compose(&header, &request.body)?;
    tokio::fs::write(dir.join(layout::SKILL_FILE), contents).await?;

    if let Some(inputs) = supplied(&request.inputs) {
        write_schema(&dir, inputs).await?;
    }

    tracing::info!(id = %request.id, "created skill");
    reload(root, &request.id).await
}

/// Replace a skill's definition wholesale. The header is rebuilt from the
/// request, so fields the request omits are dropped, including any
/// proficiency and training history; the companion file is rewritten when
/// inputs are supplied and deleted when they are not.
pub async fn update_skill(
    root: &Path,
    id: &str,
    request: &UpdateSkillRequest,
) -> crate::Result<Skill> {
    if !layout::is_valid_id(id) {
        return Err(Error::NotFound(id.to_string()));
    }
    let dir = layout::skill_dir(root, id);
    let definition = dir.join(layout::SKILL_FILE);
    if !definition.is_file() {
        return Err(Error::NotFound(id.to_string()));
    }

    validate_content(&request.description, &request.body)?;
    validate_inputs(supplied(&request.inputs))?;

    let header = build_header(
        id,
        &request.description,
        request.allowed_tools.as_deref(),
        request.mcp_servers.as_ref(),
    );
    let contents = frontmatter::compose(&header, &request.body)?;
    tokio::fs::write(&definition, contents).await?;

    match supplied(&request.inputs) {
        Some(inputs) => write_schema(&dir, inputs).await?,
        None => remove_schema(&dir).await?,
    }

    tracing::info!(%id, "updated skill");
    reload(root, id).await
}

/// Delete a skill and everything inside its directory. Returns the
/// deleted directory's path.
pub async fn delete_skill(root: &Path, id: &str) -> crate::Result<PathBuf> {
    if !layout::is_valid_id(id) {
        return Err(Error::NotFound(id.to_string()));
    }
    let dir = layout::skill_dir(root, id);
    if !dir.is_dir() {
        return Err(Error::NotFound(id.to_string()));
    }
    tokio::fs::remove_dir_all(&dir).await?;
    tracing::info!(%id, "deleted skill");
    Ok(dir)
}

async fn reload(root: &Path, id: &str) -> crate::Result<Skill> {
    skill::load_skill(root, id)
        .await?
        .ok_or_else(|| Error::NotFound(id.to_string()))
}

/// Treat `None` and an empty list the same: no companion file.
fn supplied(inputs: &Option<Vec<InputField>>) -> Option<&[InputField]> {
    match inputs.as_deref() {
        Some(list) if !list.is_empty() => Some(list),
        _ => None,
    }
}

fn build_header(
    id: &str,
    description: &str,
    allowed_tools: Option<&[String]>,
    mcp_servers: Option<&std::collections::BTreeMap<String, Vec<String>>>,
) -> Mapping {
    let mut header = Mapping::new();
    header.insert("name".into(), id.into());
    header.insert("description".into(), description.into());
    if let Some(tools) = allowed_tools {
        header.insert("allowed-tools".into(), string_seq(tools));
    }
    if let Some(servers) = mcp_servers {
        let mut map = Mapping::new();
        for (provider, tools) in servers {
            map.insert(provider.as_str().into(), string_seq(tools));
        }
        header.insert("mcp-servers".into(), Value::Mapping(map));
    }
    header
}

fn string_seq(items: &[String]) -> Value {
    Value::Sequence(items.iter().map(|s| Value::String(s.clone())).collect())
}

async fn write_schema(dir: &Path, inputs: &[InputField]) -> crate::Result<()> {
    let doc = serde_json::json!({ "inputs": inputs });
    let data = serde_json::to_string_pretty(&doc)?;
    tokio::fs::write(dir.join(layout::SCHEMA_FILE), data).await?;
    Ok(())
}

async fn remove_schema(dir: &Path) -> crate::Result<()> {
    match tokio::fs::remove_file(dir.join(layout::SCHEMA_FILE)).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn validate_id(id: &str) -> crate::Result<()> {
    if layout::is_valid_id(id) {
        Ok(())
    } else {
        Err(Error::validation(format!(
            "invalid skill id '{id}': use 1-{} lowercase letters, digits, or hyphens",
            layout::MAX_ID_LEN
        )))
    }
}

fn validate_content(description: &str, body: &str) -> crate::Result<()> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("description must not be empty"));
    }
    if trimmed.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(Error::validation(format!(
            "description must be at most {MAX_DESCRIPTION_LEN} characters"
        )));
    }
    if !trimmed.to_lowercase().contains(USE_WHEN) {
        return Err(Error::validation(
            "description must say when to pick the skill (include \"use when\")",
        ));
    }
    if body.trim().is_empty() {
        return Err(Error::validation("skill body must not be empty"));
    }
    Ok(())
}

fn validate_inputs(inputs: Option<&[InputField]>) -> crate::Result<()> {
    for field in inputs.unwrap_or_default() {
        if field.name.trim().is_empty() {
            return Err(Error::validation("input field name must not be empty"));
        }
        if field.kind.needs_options() && field.options.is_empty() {
            return Err(Error::validation(format!(
                "input field '{}' needs a non-empty options list",
                field.name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::collections::BTreeMap;

    use tempfile::TempDir;

    use super::*;
    use crate::types::InputKind;

    fn request(id: &str) -> CreateSkillRequest {
        CreateSkillRequest {
            id: id.to_string(),
            description: "Extract text from PDFs. Use when a PDF needs reading.".to_string(),
            body: "# Steps\n\nRead, then extract.".to_string(),
            ..Default::default()
        }
    }

    fn field(name: &str, kind: InputKind) -> InputField {
        InputField {
            name: name.to_string(),
            kind,
            label: name.to_string(),
            description: None,
            placeholder: None,
            required: false,
            options: Vec::new(),
            default: None,
        }
    }

    #[tokio::test]
    async fn create_roundtrips_through_disk() {
        let tmp = TempDir::new().unwrap();
        let mut req = request("pdf-processing");
        req.allowed_tools = Some(vec!["Read".into(), "Bash".into()]);
        req.mcp_servers = Some(BTreeMap::from([(
            "github".to_string(),
            vec!["search".to_string()],
        )]));
        req.inputs = Some(vec![field("mode", InputKind::Text)]);

        let skill = create_skill(tmp.path(), &req).await.unwrap();
        assert_eq!(skill.id, "pdf-processing");
        assert_eq!(skill.name, "pdf-processing");
        assert_eq!(skill.allowed_tools.unwrap(), vec!["Read", "Bash"]);
        assert_eq!(skill.mcp_servers.unwrap()["github"], vec!["search"]);
        assert_eq!(skill.inputs.len(), 1);
        assert_eq!(skill.proficiency, 0);

        assert!(layout::skill_file(tmp.path(), "pdf-processing").is_file());
        assert!(layout::schema_file(tmp.path(), "pdf-processing").is_file());
    }

    #[tokio::test]
    async fn create_rejects_duplicates() {
        let tmp = TempDir::new().unwrap();
        create_skill(tmp.path(), &request("dup")).await.unwrap();
        let err = create_skill(tmp.path(), &request("dup")).await.unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(id) if id == "dup"));
    }

    #[tokio::test]
    async fn create_validates_before_writing() {
        let tmp = TempDir::new().unwrap();

        let bad_id = create_skill(tmp.path(), &request("Bad_Id")).await;
        assert!(matches!(bad_id.unwrap_err(), Error::Validation(_)));

        let mut no_use_when = request("ok-id");
        no_use_when.description = "Extracts text from PDFs.".to_string();
        assert!(matches!(
            create_skill(tmp.path(), &no_use_when).await.unwrap_err(),
            Error::Validation(_)
        ));

        let mut empty_body = request("ok-id");
        empty_body.body = "   ".to_string();
        assert!(matches!(
            create_skill(tmp.path(), &empty_body).await.unwrap_err(),
            Error::Validation(_)
        ));

        let mut too_long = request("ok-id");
        too_long.description = format!("use when {}", "x".repeat(1100));
        assert!(matches!(
            create_skill(tmp.path(), &too_long).await.unwrap_err(),
            Error::Validation(_)
        ));

        // Nothing was written by any rejected request.
        assert!(!layout::skills_dir(tmp.path()).join("ok-id").exists());
    }

    #[tokio::test]
    async fn select_inputs_need_options() {
        let tmp = TempDir::new().unwrap();
        let mut req = request("selector");
        req.inputs = Some(vec![field("mode", InputKind::Select)]);
        assert!(matches!(
            create_skill(tmp.path(), &req).await.unwrap_err(),
            Error::Validation(_)
        ));
    }

    #[tokio::test]
    async fn empty_inputs_write_no_companion() {
        let tmp = TempDir::new().unwrap();
        let mut req = request("plain");
        req.inputs = Some(Vec::new());
        create_skill(tmp.path(), &req).await.unwrap();
        assert!(!layout::schema_file(tmp.path(), "plain").exists());
    }

    #[tokio::test]
    async fn update_replaces_the_header_wholesale() {
        let tmp = TempDir::new().unwrap();
        let mut req = request("mutable");
        req.allowed_tools = Some(vec!["Bash".into()]);
        req.inputs = Some(vec![field("mode", InputKind::Text)]);
        create_skill(tmp.path(), &req).await.unwrap();

        let update = UpdateSkillRequest {
            description: "Rewritten. Use when asked.".to_string(),
            body: "New body.".to_string(),
            ..Default::default()
        };
        let skill = update_skill(tmp.path(), "mutable", &update).await.unwrap();
        assert_eq!(skill.description, "Rewritten. Use when asked.");
        assert_eq!(skill.body, "New body.");
        assert_eq!(skill.allowed_tools, None);
        assert!(skill.inputs.is_empty());
        assert!(!layout::schema_file(tmp.path(), "mutable").exists());
    }

    #[tokio::test]
    async fn update_missing_skill_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let update = UpdateSkillRequest {
            description: "Use when testing.".to_string(),
            body: "x".to_string(),
            ..Default::default()
        };
        let err = update_skill(tmp.path(), "ghost", &update).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(id) if id == "ghost"));
    }

    #[tokio::test]
    async fn delete_removes_the_directory() {
        let tmp = TempDir::new().unwrap();
        create_skill(tmp.path(), &request("doomed")).await.unwrap();

        let dir = delete_skill(tmp.path(), "doomed").await.unwrap();
        assert!(!dir.exists());

        let err = delete_skill(tmp.path(), "doomed").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn traversal_shaped_ids_are_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = delete_skill(tmp.path(), "../outside").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
