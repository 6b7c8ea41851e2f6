//! Slash command parsing.

use std::path::Path;

use crate::{fields, frontmatter, types::SlashCommand};

/// Parse one command definition file. The id is the path relative to the
/// commands root with the extension dropped, so nested files keep their
/// directory prefix (`git/commit.md` becomes `git/commit`).
pub(crate) fn parse_command(path: &Path, commands_root: &Path) -> crate::Result<SlashCommand> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_command_text(path, commands_root, &text))
}

fn parse_command_text(path: &Path, commands_root: &Path, text: &str) -> SlashCommand {
    let doc = frontmatter::split(text);
    let header = doc
        .header
        .map(|h| frontmatter::parse_lossy(h, path))
        .unwrap_or_default();

    let relative = path.strip_prefix(commands_root).unwrap_or(path);
    let segments: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    let relative_path = segments.join("/");
    let id = relative_path
        .strip_suffix(".md")
        .unwrap_or(&relative_path)
        .to_string();
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| id.clone());
    let category = (segments.len() > 1).then(|| segments[0].clone());

    SlashCommand {
        id,
        name,
        description: fields::string_at(&header, &["description"]),
        path: path.to_path_buf(),
        relative_path,
        body: doc.body.trim().to_string(),
        allowed_tools: fields::string_list_at(&header, &["allowed-tools", "allowed_tools"]),
        argument_hint: fields::string_at(&header, &["argument-hint", "argument_hint"]),
        model: fields::string_at(&header, &["model"]),
        disable_model_invocation: fields::bool_at(
            &header,
            &["disable-model-invocation", "disable_model_invocation"],
        )
        .unwrap_or(false),
        category,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn parse(rel: &str, text: &str) -> SlashCommand {
        let root = PathBuf::from("/proj/capabilities/commands");
        parse_command_text(&root.join(rel), &root, text)
    }

    #[test]
    fn nested_command_keeps_directory_prefix() {
        let cmd = parse(
            "git/flow/feature.md",
            "---\ndescription: Start a feature branch\n---\nSteps.\n",
        );
        assert_eq!(cmd.id, "git/flow/feature");
        assert_eq!(cmd.name, "feature");
        assert_eq!(cmd.relative_path, "git/flow/feature.md");
        assert_eq!(cmd.category.as_deref(), Some("git"));
        assert_eq!(cmd.description.as_deref(), Some("Start a feature branch"));
        assert_eq!(cmd.body, "Steps.");
    }

    #[test]
    fn root_level_command_has_no_category() {
        let cmd = parse("review.md", "Do a review.\n");
        assert_eq!(cmd.id, "review");
        assert_eq!(cmd.category, None);
        assert_eq!(cmd.description, None);
        assert_eq!(cmd.body, "Do a review.");
    }

    #[test]
    fn header_fields_are_extracted() {
        let cmd = parse(
            "deploy.md",
            "---\ndescription: Ship it\nallowed-tools: Bash, Read\nargument_hint: \"[env]\"\nmodel: small-fast\ndisable-model-invocation: true\n---\nDeploy.\n",
        );
        assert_eq!(cmd.allowed_tools.unwrap(), vec!["Bash", "Read"]);
        assert_eq!(cmd.argument_hint.as_deref(), Some("[env]"));
        assert_eq!(cmd.model.as_deref(), Some("small-fast"));
        assert!(cmd.disable_model_invocation);
    }

    #[test]
    fn malformed_header_degrades_to_body_only() {
        let cmd = parse("broken.md", "---\n[not yaml\n---\nStill usable.\n");
        assert_eq!(cmd.description, None);
        assert_eq!(cmd.body, "Still usable.");
    }
}
