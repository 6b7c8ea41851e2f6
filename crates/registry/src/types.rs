use std::{collections::BTreeMap, path::PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Slash commands ───────────────────────────────────────────────────────────

/// A slash command discovered under the commands root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlashCommand {
    /// Relative path without extension, `/`-separated (e.g. `git/commit`).
    pub id: String,
    /// File stem, used for display.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Path to the definition file.
    pub path: PathBuf,
    /// Path relative to the commands root, extension kept.
    pub relative_path: String,
    /// Markdown body with surrounding whitespace trimmed.
    #[serde(default)]
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_tools: Option<Vec<String>>,
    /// Hint shown next to the command's argument placeholder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argument_hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// When true the model must not invoke this command on its own.
    #[serde(default)]
    pub disable_model_invocation: bool,
    /// First path segment under the commands root; `None` for files that
    /// sit directly in it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

// ── Skills ───────────────────────────────────────────────────────────────────

/// A skill: one directory holding a definition file plus optional
/// companions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skill {
    /// Directory name, doubling as the identifier.
    pub id: String,
    /// Header `name`, falling back to the id.
    pub name: String,
    /// When-to-use description.
    #[serde(default)]
    pub description: String,
    /// Skill directory.
    pub dir: PathBuf,
    /// The definition file inside [`Self::dir`].
    pub path: PathBuf,
    #[serde(default)]
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_tools: Option<Vec<String>>,
    /// Tool-provider map: provider id to the tool names it exposes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp_servers: Option<BTreeMap<String, Vec<String>>>,
    /// Input fields from the `schema.json` companion.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<InputField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<SkillAssets>,
    /// Current proficiency score in `[0, 100]`.
    #[serde(default)]
    pub proficiency: u8,
    /// Newest-first training history, at most
    /// [`crate::training::HISTORY_LIMIT`] entries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub training_history: Vec<TrainingRecord>,
    /// Which agents reference this skill. Only populated by the usage
    /// indexer; plain discovery leaves it `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<SkillUsage>,
}

/// Optional files bundled alongside a skill's definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillAssets {
    /// Contents of `REFERENCE.md`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Contents of `EXAMPLES.md`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<String>,
    /// File names under `scripts/`, sorted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scripts: Vec<String>,
    /// File names under `templates/`, sorted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub templates: Vec<String>,
}

impl SkillAssets {
    pub fn is_empty(&self) -> bool {
        self.reference.is_none()
            && self.examples.is_none()
            && self.scripts.is_empty()
            && self.templates.is_empty()
    }
}

/// Agents whose skill list names a given skill.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillUsage {
    /// Referencing agent ids, sorted and deduplicated.
    pub agents: Vec<String>,
    pub count: usize,
}

// ── Agents ───────────────────────────────────────────────────────────────────

/// An agent definition: header metadata over a markdown system prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    /// File stem, doubling as the identifier.
    pub id: String,
    /// Header `name`, falling back to the id.
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub path: PathBuf,
    /// System prompt.
    #[serde(default)]
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_tools: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp_servers: Option<BTreeMap<String, Vec<String>>>,
    /// Skills this agent may invoke, by identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<InputField>,
    /// Structured-output schema. Header strings are opportunistically
    /// parsed as JSON, falling back to the raw string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<serde_json::Value>,
}

// ── Input fields ─────────────────────────────────────────────────────────────

/// Kind of value an input field collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Text,
    /// Multi-line text.
    Textarea,
    /// Single choice from `options`.
    Select,
    /// Multiple choices from `options`.
    Multiselect,
    Boolean,
    Number,
    /// Filesystem path.
    File,
}

impl InputKind {
    /// Whether fields of this kind must carry a non-empty `options` list.
    pub fn needs_options(self) -> bool {
        matches!(self, Self::Select | Self::Multiselect)
    }
}

/// One declared input of a skill or agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputField {
    /// Substitution key.
    pub name: String,
    #[serde(rename = "type")]
    pub kind: InputKind,
    /// Human-readable label; defaults to empty rather than failing.
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
    /// Choice list for the select kinds.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Default value, of whatever shape the kind implies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

// ── Training ─────────────────────────────────────────────────────────────────

/// One entry in a skill's bounded training history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TrainingRecord {
    /// When the training run finished.
    pub date: DateTime<Utc>,
    pub score_before: f64,
    pub score_after: f64,
    /// Issues uncovered during the run.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<String>,
    /// Whether corrective edits were applied to the skill.
    #[serde(default)]
    pub edits_applied: bool,
    /// Whether the run completed successfully.
    #[serde(default)]
    pub success: bool,
}

// ── Requests and results ─────────────────────────────────────────────────────

/// Payload for creating a skill.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateSkillRequest {
    /// Identifier; becomes the directory name.
    pub id: String,
    /// When-to-use description; must contain "use when".
    pub description: String,
    /// Markdown instructions.
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_tools: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp_servers: Option<BTreeMap<String, Vec<String>>>,
    /// Input fields written to the `schema.json` companion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Vec<InputField>>,
}

/// Payload for updating a skill. The header is rebuilt from scratch, so
/// omitted fields are dropped from the stored definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSkillRequest {
    pub description: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_tools: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp_servers: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Vec<InputField>>,
}

/// Result of checking skill references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefCheck {
    /// True when every checked id resolved to an existing skill.
    pub valid: bool,
    /// Ids with no corresponding skill directory, in input order.
    pub missing: Vec<String>,
}

/// Everything discovered under one project root.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Capabilities {
    pub commands: Vec<SlashCommand>,
    pub skills: Vec<Skill>,
    pub agents: Vec<Agent>,
}

impl Capabilities {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.skills.is_empty() && self.agents.is_empty()
    }
}
