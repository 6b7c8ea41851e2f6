//! Fixed on-disk layout of the capability tree.
//!
//! Every path below a project root is derived here so the rest of the
//! crate never joins fragments by hand:
//!
//! ```text
//! <root>/capabilities/
//!   commands/<...>/<name>.md     slash commands, nested arbitrarily deep
//!   skills/<id>/SKILL.md         one directory per skill
//!   skills/<id>/schema.json      optional input-field companion
//!   agents/<id>.md               flat agent definitions
//! ```

use std::path::{Path, PathBuf};

/// Top-level directory holding all capability categories.
pub const CAPABILITIES_DIR: &str = "capabilities";
pub const COMMANDS_DIR: &str = "commands";
pub const SKILLS_DIR: &str = "skills";
pub const AGENTS_DIR: &str = "agents";

/// Definition file a directory must contain to count as a skill.
pub const SKILL_FILE: &str = "SKILL.md";
/// Companion file holding a skill's input fields.
pub const SCHEMA_FILE: &str = "schema.json";
/// Optional extended reference documentation.
pub const REFERENCE_FILE: &str = "REFERENCE.md";
/// Optional worked examples.
pub const EXAMPLES_FILE: &str = "EXAMPLES.md";
/// Helper scripts, listed by name during parsing but never read.
pub const SCRIPTS_DIR: &str = "scripts";
/// File templates, listed by name during parsing but never read.
pub const TEMPLATES_DIR: &str = "templates";
/// Documentation file the agent scanner ignores.
pub const AGENTS_README: &str = "README.md";
/// Extension shared by every definition file.
pub const MARKDOWN_EXT: &str = "md";

/// Longest accepted identifier.
pub const MAX_ID_LEN: usize = 64;

pub fn capabilities_dir(root: &Path) -> PathBuf {
    root.join(CAPABILITIES_DIR)
}

pub fn commands_dir(root: &Path) -> PathBuf {
    capabilities_dir(root).join(COMMANDS_DIR)
}

pub fn skills_dir(root: &Path) -> PathBuf {
    capabilities_dir(root).join(SKILLS_DIR)
}

pub fn agents_dir(root: &Path) -> PathBuf {
    capabilities_dir(root).join(AGENTS_DIR)
}

pub fn skill_dir(root: &Path, id: &str) -> PathBuf {
    skills_dir(root).join(id)
}

pub fn skill_file(root: &Path, id: &str) -> PathBuf {
    skill_dir(root, id).join(SKILL_FILE)
}

pub fn schema_file(root: &Path, id: &str) -> PathBuf {
    skill_dir(root, id).join(SCHEMA_FILE)
}

/// Whether `id` is a well-formed identifier: lowercase ASCII letters,
/// digits, and hyphens, between 1 and [`MAX_ID_LEN`] characters.
///
/// Identifiers double as directory names, so this check also guards every
/// caller-supplied id before it is joined onto the skills root.
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
