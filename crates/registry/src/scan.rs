//! Filesystem discovery of commands, skills, and agents.
//!
//! Discovery is a fresh walk every time: nothing is cached or watched, so
//! results always reflect the tree as it is on disk. A missing category
//! directory simply yields an empty list; individual unreadable entries
//! are logged and skipped rather than failing the whole scan.

use std::{io::ErrorKind, path::Path};

use crate::{
    agent, command, layout, skill,
    types::{Agent, Capabilities, Skill, SlashCommand},
};

/// Discover every capability under a project root.
pub async fn discover_all(root: &Path) -> crate::Result<Capabilities> {
    Ok(Capabilities {
        commands: scan_commands(root),
        skills: scan_skills(root),
        agents: scan_agents(root),
    })
}

/// Walk the commands root recursively. Every `.md` file at any depth is a
/// command; results are sorted by id.
pub(crate) fn scan_commands(root: &Path) -> Vec<SlashCommand> {
    let commands_root = layout::commands_dir(root);
    let mut commands = Vec::new();
    let mut pending = vec![commands_root.clone()];

    while let Some(dir) = pending.pop() {
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                if e.kind() != ErrorKind::NotFound {
                    tracing::warn!(?dir, %e, "failed to read command directory");
                }
                continue;
            },
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().and_then(|e| e.to_str()) == Some(layout::MARKDOWN_EXT) {
                match command::parse_command(&path, &commands_root) {
                    Ok(cmd) => commands.push(cmd),
                    Err(e) => tracing::warn!(?path, %e, "skipping unreadable command"),
                }
            }
        }
    }

    commands.sort_by(|a, b| a.id.cmp(&b.id));
    commands
}

/// One-level walk of the skills root: every directory containing a
/// definition file is a skill, sorted by id.
pub(crate) fn scan_skills(root: &Path) -> Vec<Skill> {
    let skills_root = layout::skills_dir(root);
    let entries = match std::fs::read_dir(&skills_root) {
        Ok(entries) => entries,
        Err(e) => {
            if e.kind() != ErrorKind::NotFound {
                tracing::warn!(dir = ?skills_root, %e, "failed to read skills directory");
            }
            return Vec::new();
        },
    };

    let mut skills = Vec::new();
    for entry in entries.flatten() {
        let dir = entry.path();
        if !dir.is_dir() {
            continue;
        }
        match skill::parse_skill_dir(&dir) {
            Ok(Some(parsed)) => skills.push(parsed),
            Ok(None) => tracing::warn!(?dir, "skill directory has no definition file, skipping"),
            Err(e) => tracing::warn!(?dir, %e, "skipping unreadable skill"),
        }
    }

    skills.sort_by(|a, b| a.id.cmp(&b.id));
    skills
}

/// Flat walk of the agents root: every `.md` file except the README is an
/// agent, sorted by id.
pub(crate) fn scan_agents(root: &Path) -> Vec<Agent> {
    let agents_root = layout::agents_dir(root);
    let entries = match std::fs::read_dir(&agents_root) {
        Ok(entries) => entries,
        Err(e) => {
            if e.kind() != ErrorKind::NotFound {
                tracing::warn!(dir = ?agents_root, %e, "failed to read agents directory");
            }
            return Vec::new();
        },
    };

    let mut agents = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file()
            || path.extension().and_then(|e| e.to_str()) != Some(layout::MARKDOWN_EXT)
            || path.file_name().and_then(|n| n.to_str()) == Some(layout::AGENTS_README)
        {
            continue;
        }
        match agent::parse_agent(&path) {
            Ok(parsed) => agents.push(parsed),
            Err(e) => tracing::warn!(?path, %e, "skipping unreadable agent"),
        }
    }

    agents.sort_by(|a, b| a.id.cmp(&b.id));
    agents
}
