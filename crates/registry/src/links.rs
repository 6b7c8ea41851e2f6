//! Cross-references between agents and skills.
//!
//! Agents name skills by id; nothing on disk enforces that those skills
//! exist. This module checks references in the forward direction
//! ([`validate_skill_refs`]) and builds the reverse index
//! ([`skill_usage`], [`skills_with_usage`]). The index is recomputed from
//! a fresh agent scan on every call, so results cannot go stale at the
//! price of re-reading the agents directory.

use std::{collections::BTreeMap, path::Path};

use crate::{
    layout, scan,
    types::{RefCheck, Skill, SkillUsage},
};

/// Check that every id names an existing skill directory. An empty input
/// is trivially valid; ids are reported in input order and are not
/// deduplicated.
pub async fn validate_skill_refs(root: &Path, ids: &[String]) -> crate::Result<RefCheck> {
    let skills_root = layout::skills_dir(root);
    let mut missing = Vec::new();
    for id in ids {
        let exists = layout::is_valid_id(id) && skills_root.join(id).is_dir();
        if !exists {
            missing.push(id.clone());
        }
    }
    Ok(RefCheck {
        valid: missing.is_empty(),
        missing,
    })
}

/// Which agents reference the given skill. A skill nobody references
/// yields an empty list and a zero count; the skill itself does not have
/// to exist, so dangling references still show up.
pub async fn skill_usage(root: &Path, id: &str) -> crate::Result<SkillUsage> {
    let agents = usage_index(root).remove(id).unwrap_or_default();
    Ok(SkillUsage {
        count: agents.len(),
        agents,
    })
}

/// Every skill with its usage populated, sorted by id.
pub async fn skills_with_usage(root: &Path) -> crate::Result<Vec<Skill>> {
    let mut index = usage_index(root);
    let mut skills = scan::scan_skills(root);
    for entry in &mut skills {
        let agents = index.remove(&entry.id).unwrap_or_default();
        entry.usage = Some(SkillUsage {
            count: agents.len(),
            agents,
        });
    }
    Ok(skills)
}

/// Reverse index from skill id to the sorted, deduplicated list of agent
/// ids referencing it, built from a fresh agent scan.
fn usage_index(root: &Path) -> BTreeMap<String, Vec<String>> {
    let mut index: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for agent in scan::scan_agents(root) {
        for skill_id in agent.skills.iter().flatten() {
            index
                .entry(skill_id.clone())
                .or_default()
                .push(agent.id.clone());
        }
    }
    for agents in index.values_mut() {
        agents.sort();
        agents.dedup();
    }
    index
}
