mod skill_commands;

use {
    agentry_registry::scan,
    clap::{Parser, Subcommand},
    std::path::PathBuf,
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "agentry", about = "Agentry — capability registry for agent workspaces")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project root containing the capabilities/ tree.
    #[arg(long, global = true, env = "AGENTRY_ROOT", default_value = ".")]
    root: PathBuf,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover everything under the capabilities tree.
    Scan {
        /// Print the full result as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Slash command inspection.
    Commands {
        #[command(subcommand)]
        action: CommandAction,
    },
    /// Skill management.
    Skills {
        #[command(subcommand)]
        action: skill_commands::SkillAction,
    },
    /// Agent inspection.
    Agents {
        #[command(subcommand)]
        action: AgentAction,
    },
}

#[derive(Subcommand)]
enum CommandAction {
    /// List discovered slash commands.
    List,
    /// Show one slash command.
    Show {
        /// Command id (relative path without extension, e.g. git/commit).
        id: String,
    },
}

#[derive(Subcommand)]
enum AgentAction {
    /// List discovered agents.
    List,
    /// Show one agent.
    Show {
        /// Agent id (file stem).
        id: String,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    // Resolve the root once so every stored path is absolute.
    let root = std::fs::canonicalize(&cli.root).unwrap_or_else(|_| cli.root.clone());
    info!(root = %root.display(), "agentry starting");

    match cli.command {
        Commands::Scan { json } => handle_scan(&root, json).await,
        Commands::Commands { action } => handle_commands(&root, action).await,
        Commands::Skills { action } => skill_commands::handle_skills(&root, action).await,
        Commands::Agents { action } => handle_agents(&root, action).await,
    }
}

async fn handle_scan(root: &std::path::Path, json: bool) -> anyhow::Result<()> {
    let caps = scan::discover_all(root).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&caps)?);
        return Ok(());
    }

    println!(
        "{} commands, {} skills, {} agents",
        caps.commands.len(),
        caps.skills.len(),
        caps.agents.len()
    );
    for command in &caps.commands {
        println!("  /{}", command.id);
    }
    for skill in &caps.skills {
        println!("  skill {} — {}", skill.id, skill.description);
    }
    for agent in &caps.agents {
        println!("  agent {} — {}", agent.id, agent.description);
    }
    Ok(())
}

async fn handle_commands(root: &std::path::Path, action: CommandAction) -> anyhow::Result<()> {
    let commands = scan::discover_all(root).await?.commands;
    match action {
        CommandAction::List => {
            if commands.is_empty() {
                println!("No commands found.");
            } else {
                for command in &commands {
                    let description = command.description.as_deref().unwrap_or("");
                    let category = command.category.as_deref().unwrap_or("-");
                    println!("  /{} — {} [{}]", command.id, description, category);
                }
            }
        },
        CommandAction::Show { id } => {
            let Some(command) = commands.into_iter().find(|c| c.id == id) else {
                anyhow::bail!("command '{id}' not found");
            };
            println!("Id:       {}", command.id);
            println!("Name:     {}", command.name);
            if let Some(ref description) = command.description {
                println!("About:    {description}");
            }
            if let Some(ref hint) = command.argument_hint {
                println!("Args:     {hint}");
            }
            if let Some(ref model) = command.model {
                println!("Model:    {model}");
            }
            if let Some(ref tools) = command.allowed_tools {
                println!("Tools:    {}", tools.join(", "));
            }
            println!("Path:     {}", command.path.display());
            println!("\n{}", command.body);
        },
    }
    Ok(())
}

async fn handle_agents(root: &std::path::Path, action: AgentAction) -> anyhow::Result<()> {
    let agents = scan::discover_all(root).await?.agents;
    match action {
        AgentAction::List => {
            if agents.is_empty() {
                println!("No agents found.");
            } else {
                for agent in &agents {
                    println!("  {} — {}", agent.id, agent.description);
                }
            }
        },
        AgentAction::Show { id } => {
            let Some(agent) = agents.into_iter().find(|a| a.id == id) else {
                anyhow::bail!("agent '{id}' not found");
            };
            println!("Id:       {}", agent.id);
            println!("Name:     {}", agent.name);
            println!("About:    {}", agent.description);
            if let Some(ref model) = agent.model {
                println!("Model:    {model}");
            }
            if let Some(ref skills) = agent.skills {
                println!("Skills:   {}", skills.join(", "));
            }
            if let Some(ref tools) = agent.tools {
                println!("Tools:    {}", tools.join(", "));
            }
            println!("Path:     {}", agent.path.display());
            println!("\n{}", agent.body);
        },
    }
    Ok(())
}
