//! liti CLI - Project scaffolding from npm-published templates

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use liti_core::tui::InitArgs;
use liti_core::{ProductConfig, WorkflowState};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// liti product configuration
#[derive(Clone)]
pub struct LitiConfig;

impl ProductConfig for LitiConfig {
    fn name(&self) -> &'static str {
        "liti"
    }

    fn display_name(&self) -> &'static str {
        "liti"
    }

    fn default_catalog_url(&self) -> &'static str {
        "http://liti.dev:7001"
    }

    fn catalog_url_env(&self) -> &'static str {
        "LITI_CLI_BASE_URL"
    }

    fn registry_url_env(&self) -> &'static str {
        "LITI_REGISTRY"
    }

    fn default_cli_home(&self) -> &'static str {
        ".liti"
    }

    fn cli_home_env(&self) -> &'static str {
        "LITI_CLI_HOME"
    }
}

#[derive(Parser, Debug)]
#[command(name = "liti")]
#[command(about = "CLI for scaffolding projects and components from liti templates")]
#[command(version)]
pub struct Args {
    /// Show debug logs
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a project in the current directory
    Init(CliInitArgs),
}

#[derive(Parser, Debug, Default)]
pub struct CliInitArgs {
    /// Project name
    pub name: Option<String>,

    /// Skip the "continue into non-empty directory?" question (clearing is still confirmed)
    #[arg(short, long)]
    pub force: bool,

    /// Local catalog file to use instead of the catalog service (for development use)
    #[arg(long)]
    pub catalog: Option<PathBuf>,
}

impl From<CliInitArgs> for InitArgs {
    fn from(args: CliInitArgs) -> Self {
        InitArgs {
            project_name: args.name,
            force: args.force,
            catalog_file: args.catalog,
        }
    }
}

/// Initialize tracing; `RUST_LOG` wins over `--debug`
fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();
    init_tracing(args.debug);

    if let Some(path) = liti_core::load_user_env() {
        tracing::debug!(path = %path.display(), "user environment loaded");
    }

    let config = LitiConfig;

    // No subcommand provided, default to init
    let init_args = match args.command {
        Some(Command::Init(init_args)) => init_args,
        None => CliInitArgs::default(),
    };

    let result = liti_core::run(&config, init_args.into()).await;

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    match result {
        Ok(WorkflowState::Failed) => std::process::exit(1),
        Ok(_) => Ok(()),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}
