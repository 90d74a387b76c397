use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use terminator_actions::plan::load_plan;
use terminator_actions::{ActionError, Controller, ControllerConfig, ElementContext, UITreeCache};
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Terminator actions - run planned desktop actions one at a time"
)]
struct Args {
    /// Log level (error, warn, info, debug). RUST_LOG takes precedence when set.
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Actions to leave out of the registry (comma separated)
    #[arg(long, env = "TERMINATOR_ACTIONS_EXCLUDE", value_delimiter = ',')]
    exclude: Vec<String>,

    /// Fail at startup if an excluded action is registered instead of skipping it
    #[arg(long)]
    strict_exclusions: bool,

    /// Milliseconds open_app waits before looking for the launched process
    #[arg(long, env = "TERMINATOR_ACTIONS_LAUNCH_DELAY_MS", default_value = "1000")]
    launch_settle_delay_ms: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the registered actions and their parameter schemas as JSON
    List,
    /// Run a plan file (JSON array or YAML sequence of action requests)
    Run {
        /// Path to the plan file
        plan: PathBuf,
    },
}

fn init_logging(level: &str) {
    let level = match level.to_lowercase().as_str() {
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));

    // stdout carries command output; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let config = ControllerConfig {
        exclude_actions: args
            .exclude
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        strict_exclusions: args.strict_exclusions,
        launch_settle_delay_ms: args.launch_settle_delay_ms,
    };
    let controller =
        Controller::for_current_platform(config).context("Failed to initialize controller")?;

    match args.command {
        Command::List => {
            let descriptors: Vec<_> = controller.registry().descriptors().collect();
            println!("{}", serde_json::to_string_pretty(&descriptors)?);
        }
        Command::Run { plan } => {
            let requests = load_plan(&plan)?;
            info!("Running {} action(s) from {}", requests.len(), plan.display());

            // No UI tree is built here, so element indices never resolve.
            let context: ElementContext = Arc::new(UITreeCache::new());
            let results = match controller.run_sequence(&requests, Some(context)).await {
                Ok(results) => results,
                Err(ActionError::SequenceAborted {
                    step,
                    completed,
                    source,
                }) => {
                    println!("{}", serde_json::to_string_pretty(&completed)?);
                    error!("Plan aborted at step {}: {}", step + 1, source);
                    return Err((*source).into());
                }
                Err(e) => return Err(e.into()),
            };

            println!("{}", serde_json::to_string_pretty(&results)?);
            if let Some(err) = results.last().and_then(|r| r.error.as_deref()) {
                anyhow::bail!("Plan stopped with an error: {err}");
            }
        }
    }

    Ok(())
}
