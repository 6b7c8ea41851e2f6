//! Agent definition parsing.

use std::path::Path;

use serde_yaml::{Mapping, Value};

use crate::{
    fields, frontmatter,
    types::{Agent, InputField},
};

pub(crate) fn parse_agent(path: &Path) -> crate::Result<Agent> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_agent_text(path, &text))
}

fn parse_agent_text(path: &Path, text: &str) -> Agent {
    let doc = frontmatter::split(text);
    let header = doc
        .header
        .map(|h| frontmatter::parse_lossy(h, path))
        .unwrap_or_default();

    let id = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    Agent {
        name: fields::string_at(&header, &["name"]).unwrap_or_else(|| id.clone()),
        id,
        description: fields::string_at(&header, &["description"]).unwrap_or_default(),
        path: path.to_path_buf(),
        body: doc.body.trim().to_string(),
        model: fields::string_at(&header, &["model"]),
        tools: fields::string_list_at(&header, &["tools"]),
        allowed_tools: fields::string_list_at(&header, &["allowed-tools", "allowed_tools"]),
        mcp_servers: fields::tool_map_at(&header, &["mcp-servers", "mcp_servers", "mcpServers"]),
        skills: fields::string_list_at(&header, &["skills"]),
        inputs: decode_inputs(&header, path),
        output_schema: decode_output_schema(&header, path),
    }
}

fn decode_inputs(header: &Mapping, path: &Path) -> Vec<InputField> {
    let Some(value) = fields::lookup(header, &["inputs"]) else {
        return Vec::new();
    };
    let Value::Sequence(items) = value else {
        tracing::warn!(?path, "inputs is not a list, ignoring");
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match serde_yaml::from_value(item.clone()) {
            Ok(field) => Some(field),
            Err(e) => {
                tracing::warn!(?path, %e, "skipping malformed input field");
                None
            },
        })
        .collect()
}

/// A string-valued schema is opportunistically parsed as JSON so agents can
/// embed a full schema in one header line; anything unparseable stays a
/// plain string. Structured YAML values are carried over as-is.
fn decode_output_schema(header: &Mapping, path: &Path) -> Option<serde_json::Value> {
    let value = fields::lookup(header, &["output-schema", "output_schema"])?;
    match value {
        Value::String(raw) => match serde_json::from_str(raw) {
            Ok(parsed) => Some(parsed),
            Err(_) => Some(serde_json::Value::String(raw.clone())),
        },
        other => match serde_json::to_value(other) {
            Ok(bridged) => Some(bridged),
            Err(e) => {
                tracing::warn!(?path, %e, "output-schema has no JSON representation, ignoring");
                None
            },
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::types::InputKind;

    fn parse(text: &str) -> Agent {
        parse_agent_text(&PathBuf::from("/proj/capabilities/agents/planner.md"), text)
    }

    #[test]
    fn id_comes_from_the_file_stem() {
        let agent = parse("---\ndescription: Plans work\n---\nYou are a planner.\n");
        assert_eq!(agent.id, "planner");
        assert_eq!(agent.name, "planner");
        assert_eq!(agent.description, "Plans work");
        assert_eq!(agent.body, "You are a planner.");
    }

    #[test]
    fn skills_accept_both_list_shapes() {
        let list = parse("---\nskills:\n  - pdf-processing\n  - web-search\n---\nx\n");
        assert_eq!(
            list.skills.unwrap(),
            vec!["pdf-processing", "web-search"]
        );

        let comma = parse("---\nskills: pdf-processing, web-search\n---\nx\n");
        assert_eq!(
            comma.skills.unwrap(),
            vec!["pdf-processing", "web-search"]
        );
    }

    #[test]
    fn inputs_skip_malformed_entries() {
        let agent = parse(
            "---\ninputs:\n  - name: topic\n    type: text\n    label: Topic\n  - type: select\n---\nx\n",
        );
        assert_eq!(agent.inputs.len(), 1);
        assert_eq!(agent.inputs[0].name, "topic");
        assert_eq!(agent.inputs[0].kind, InputKind::Text);
    }

    #[test]
    fn string_output_schema_is_parsed_as_json() {
        let agent = parse(
            "---\noutput-schema: '{\"type\": \"object\", \"required\": [\"title\"]}'\n---\nx\n",
        );
        let schema = agent.output_schema.unwrap();
        assert_eq!(schema["type"], "object");
    }

    #[test]
    fn unparseable_output_schema_stays_a_string() {
        let agent = parse("---\noutput_schema: just describe it\n---\nx\n");
        assert_eq!(
            agent.output_schema.unwrap(),
            serde_json::Value::String("just describe it".into())
        );
    }

    #[test]
    fn structured_output_schema_is_bridged() {
        let agent = parse("---\noutput-schema:\n  type: object\n  properties:\n    title:\n      type: string\n---\nx\n");
        let schema = agent.output_schema.unwrap();
        assert_eq!(schema["properties"]["title"]["type"], "string");
    }

    #[test]
    fn headerless_agent_still_has_a_prompt() {
        let agent = parse("Only a prompt.\n");
        assert_eq!(agent.skills, None);
        assert_eq!(agent.body, "Only a prompt.");
    }
}
