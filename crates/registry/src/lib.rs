//! File-backed capability registry.
//!
//! Agents, skills, and slash commands live as markdown files with YAML
//! headers under a `capabilities/` tree. This crate scans that tree,
//! parses the three entity kinds, and manages the skill lifecycle:
//! creation, full-replacement update, deletion, reference validation,
//! usage indexing, and bounded training history.
//!
//! The filesystem is the single source of truth. Nothing is cached or
//! watched; every operation re-reads what it needs, and writes are plain
//! whole-file rewrites. Discovery is lenient (malformed metadata degrades
//! to defaults with a warning), while mutation validates up front and
//! fails before touching disk.

pub mod agent;
pub mod command;
pub mod error;
pub mod fields;
pub mod frontmatter;
pub mod layout;
pub mod links;
pub mod scan;
pub mod skill;
pub mod store;
pub mod training;
pub mod types;

pub use {
    error::{Error, Result},
    types::{
        Agent, Capabilities, CreateSkillRequest, InputField, InputKind, RefCheck, Skill,
        SkillAssets, SkillUsage, SlashCommand, TrainingRecord, UpdateSkillRequest,
    },
};
