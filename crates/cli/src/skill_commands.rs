use {
    agentry_registry::{
        CreateSkillRequest, InputField, TrainingRecord, UpdateSkillRequest, links, skill, store,
        training,
    },
    anyhow::Context,
    clap::Subcommand,
    serde::Deserialize,
    std::{collections::BTreeMap, fs, path::Path, path::PathBuf},
};

#[derive(Subcommand)]
pub enum SkillAction {
    /// List skills with their usage counts.
    List {
        /// Print the full result as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show one skill, companions included.
    Show {
        /// Skill id (directory name).
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Create a new skill.
    Create {
        /// Skill id (lowercase letters, digits, hyphens).
        id: String,
        /// When-to-use description; must contain "use when".
        #[arg(long)]
        description: String,
        /// Markdown body given inline.
        #[arg(long, conflicts_with = "body_file")]
        body: Option<String>,
        /// Read the markdown body from a file.
        #[arg(long)]
        body_file: Option<PathBuf>,
        /// Comma-separated tool allowlist.
        #[arg(long)]
        allowed_tools: Option<String>,
        /// Tool provider in provider=tool1,tool2 form; repeatable.
        #[arg(long = "mcp")]
        mcp: Vec<String>,
        /// JSON file with {"inputs": [...]} for the schema companion.
        #[arg(long)]
        inputs: Option<PathBuf>,
    },
    /// Replace a skill's definition; omitted fields are dropped.
    Update {
        /// Skill id (directory name).
        id: String,
        /// When-to-use description; must contain "use when".
        #[arg(long)]
        description: String,
        /// Markdown body given inline.
        #[arg(long, conflicts_with = "body_file")]
        body: Option<String>,
        /// Read the markdown body from a file.
        #[arg(long)]
        body_file: Option<PathBuf>,
        /// Comma-separated tool allowlist.
        #[arg(long)]
        allowed_tools: Option<String>,
        /// Tool provider in provider=tool1,tool2 form; repeatable.
        #[arg(long = "mcp")]
        mcp: Vec<String>,
        /// JSON file with {"inputs": [...]} for the schema companion.
        #[arg(long)]
        inputs: Option<PathBuf>,
    },
    /// Delete a skill and its directory.
    Delete {
        /// Skill id (directory name).
        id: String,
    },
    /// Show which agents reference a skill.
    Usage {
        /// Skill id (directory name).
        id: String,
    },
    /// Verify that skill ids exist.
    Check {
        /// Skill ids to verify.
        ids: Vec<String>,
    },
    /// Record a training run and update proficiency.
    Train {
        /// Skill id (directory name).
        id: String,
        /// New proficiency score (0-100).
        #[arg(long)]
        score: f64,
        /// Issue found during the run; repeatable.
        #[arg(long = "issue")]
        issues: Vec<String>,
        /// Corrective edits were applied to the skill.
        #[arg(long)]
        edits_applied: bool,
        /// The run did not complete successfully.
        #[arg(long)]
        failed: bool,
    },
    /// Show a skill's training history, newest first.
    History {
        /// Skill id (directory name).
        id: String,
    },
}

/// JSON shape of the --inputs file, matching the schema companion.
#[derive(Deserialize)]
struct InputsFile {
    #[serde(default)]
    inputs: Vec<InputField>,
}

pub async fn handle_skills(root: &Path, action: SkillAction) -> anyhow::Result<()> {
    match action {
        SkillAction::List { json } => list(root, json).await,
        SkillAction::Show { id, json } => show(root, &id, json).await,
        SkillAction::Create {
            id,
            description,
            body,
            body_file,
            allowed_tools,
            mcp,
            inputs,
        } => {
            let request = CreateSkillRequest {
                id,
                description,
                body: resolve_body(body, body_file)?,
                allowed_tools: allowed_tools.as_deref().map(split_csv),
                mcp_servers: parse_mcp(&mcp)?,
                inputs: read_inputs(inputs)?,
            };
            let created = store::create_skill(root, &request).await?;
            println!("Created skill '{}' at {}", created.id, created.dir.display());
            Ok(())
        },
        SkillAction::Update {
            id,
            description,
            body,
            body_file,
            allowed_tools,
            mcp,
            inputs,
        } => {
            let request = UpdateSkillRequest {
                description,
                body: resolve_body(body, body_file)?,
                allowed_tools: allowed_tools.as_deref().map(split_csv),
                mcp_servers: parse_mcp(&mcp)?,
                inputs: read_inputs(inputs)?,
            };
            let updated = store::update_skill(root, &id, &request).await?;
            println!("Updated skill '{}'.", updated.id);
            Ok(())
        },
        SkillAction::Delete { id } => {
            let dir = store::delete_skill(root, &id).await?;
            println!("Deleted skill '{id}' ({}).", dir.display());
            Ok(())
        },
        SkillAction::Usage { id } => usage(root, &id).await,
        SkillAction::Check { ids } => check(root, ids).await,
        SkillAction::Train {
            id,
            score,
            issues,
            edits_applied,
            failed,
        } => train(root, &id, score, issues, edits_applied, failed).await,
        SkillAction::History { id } => history(root, &id).await,
    }
}

async fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let skills = links::skills_with_usage(root).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&skills)?);
        return Ok(());
    }
    if skills.is_empty() {
        println!("No skills found.");
        return Ok(());
    }
    for entry in &skills {
        let used_by = entry.usage.as_ref().map(|u| u.count).unwrap_or(0);
        println!(
            "  {} — {} [proficiency {}, {} agents]",
            entry.id, entry.description, entry.proficiency, used_by
        );
    }
    Ok(())
}

async fn show(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let Some(found) = skill::load_skill(root, id).await? else {
        anyhow::bail!("skill '{id}' not found");
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&found)?);
        return Ok(());
    }
    println!("Id:           {}", found.id);
    println!("Name:         {}", found.name);
    println!("Description:  {}", found.description);
    println!("Proficiency:  {}", found.proficiency);
    if let Some(ref tools) = found.allowed_tools {
        println!("Tools:        {}", tools.join(", "));
    }
    if let Some(ref servers) = found.mcp_servers {
        for (provider, tools) in servers {
            println!("Provider:     {} ({})", provider, tools.join(", "));
        }
    }
    if !found.inputs.is_empty() {
        let names: Vec<&str> = found.inputs.iter().map(|f| f.name.as_str()).collect();
        println!("Inputs:       {}", names.join(", "));
    }
    if let Some(ref assets) = found.assets {
        if assets.reference.is_some() {
            println!("Reference:    yes");
        }
        if assets.examples.is_some() {
            println!("Examples:     yes");
        }
        if !assets.scripts.is_empty() {
            println!("Scripts:      {}", assets.scripts.join(", "));
        }
        if !assets.templates.is_empty() {
            println!("Templates:    {}", assets.templates.join(", "));
        }
    }
    println!("Path:         {}", found.path.display());
    println!("\n{}", found.body);
    Ok(())
}

async fn usage(root: &Path, id: &str) -> anyhow::Result<()> {
    let usage = links::skill_usage(root, id).await?;
    if usage.agents.is_empty() {
        println!("No agents reference '{id}'.");
    } else {
        println!("{} agent(s) reference '{id}':", usage.count);
        for agent in &usage.agents {
            println!("  {agent}");
        }
    }
    Ok(())
}

async fn check(root: &Path, ids: Vec<String>) -> anyhow::Result<()> {
    let result = links::validate_skill_refs(root, &ids).await?;
    if result.valid {
        println!("All {} skill reference(s) resolve.", ids.len());
        Ok(())
    } else {
        anyhow::bail!("missing skills: {}", result.missing.join(", "))
    }
}

async fn train(
    root: &Path,
    id: &str,
    score: f64,
    issues: Vec<String>,
    edits_applied: bool,
    failed: bool,
) -> anyhow::Result<()> {
    let Some(current) = skill::load_skill(root, id).await? else {
        anyhow::bail!("skill '{id}' not found");
    };

    let record = TrainingRecord {
        date: chrono::Utc::now(),
        score_before: f64::from(current.proficiency),
        score_after: score,
        issues,
        edits_applied,
        success: !failed,
    };
    training::record_training(root, id, score, &record).await?;

    let updated = skill::load_skill(root, id)
        .await?
        .map(|s| s.proficiency)
        .unwrap_or(0);
    println!(
        "Recorded training run for '{id}': proficiency {} -> {}.",
        current.proficiency, updated
    );
    Ok(())
}

async fn history(root: &Path, id: &str) -> anyhow::Result<()> {
    let records = training::training_history(root, id).await?;
    if records.is_empty() {
        println!("No training history for '{id}'.");
        return Ok(());
    }
    for record in &records {
        let outcome = if record.success { "ok" } else { "failed" };
        println!(
            "  {}  {:.1} -> {:.1}  [{} issue(s), {}]",
            record.date.to_rfc3339(),
            record.score_before,
            record.score_after,
            record.issues.len(),
            outcome
        );
    }
    Ok(())
}

fn resolve_body(body: Option<String>, body_file: Option<PathBuf>) -> anyhow::Result<String> {
    match (body, body_file) {
        (Some(text), _) => Ok(text),
        (None, Some(path)) => fs::read_to_string(&path)
            .with_context(|| format!("reading body file {}", path.display())),
        (None, None) => anyhow::bail!("provide --body or --body-file"),
    }
}

fn read_inputs(path: Option<PathBuf>) -> anyhow::Result<Option<Vec<InputField>>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("reading inputs file {}", path.display()))?;
    let file: InputsFile = serde_json::from_str(&raw)
        .with_context(|| format!("parsing inputs file {}", path.display()))?;
    Ok(Some(file.inputs))
}

fn parse_mcp(entries: &[String]) -> anyhow::Result<Option<BTreeMap<String, Vec<String>>>> {
    if entries.is_empty() {
        return Ok(None);
    }
    let mut map = BTreeMap::new();
    for entry in entries {
        let Some((provider, tools)) = entry.split_once('=') else {
            anyhow::bail!("--mcp wants provider=tool1,tool2, got '{entry}'");
        };
        map.insert(provider.trim().to_string(), split_csv(tools));
    }
    Ok(Some(map))
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}
