//! modflow CLI - Command-line interface for module lifecycle workflows
//!
//! Provides `module-workflow add-module`, `delete-module`, `rename-module`
//! and `list-modules`.

mod commands;
mod logging;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use modflow_core::Workspace;

#[derive(Parser)]
#[command(name = "module-workflow")]
#[command(about = "Utilities for managing feature modules in the workspace")]
#[command(version)]
struct Cli {
    /// Workspace root (defaults to current directory)
    #[arg(short, long, global = true)]
    workspace: Option<PathBuf>,

    /// Log debug output, including every git invocation
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new feature module from a git repository
    AddModule {
        /// Git repository URL
        #[arg(long)]
        repo: String,
        /// Feature name (e.g. "watchlist")
        #[arg(long)]
        name: String,
    },
    /// Delete a module and clean up references
    DeleteModule {
        /// Feature name (e.g. "watchlist")
        #[arg(long)]
        name: String,
        /// Confirm deletion
        #[arg(long)]
        force: bool,
    },
    /// Rename a module and refactor internal references
    RenameModule {
        /// Current module name
        #[arg(long)]
        old: String,
        /// New module name
        #[arg(long)]
        new: String,
    },
    /// List modules and check config surfaces for drift
    ListModules {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            // Usage errors share the exit status of every other failure
            _ => {
                let _ = e.print();
                std::process::exit(1);
            }
        },
    };
    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let root = match cli.workspace {
        Some(path) => path,
        None => std::env::current_dir()?,
    };
    let workspace = Workspace::open(root)?;
    tracing::debug!(root = %workspace.root().display(), "workspace opened");

    match cli.command {
        Commands::AddModule { repo, name } => commands::lifecycle::add(&workspace, &repo, &name),
        Commands::DeleteModule { name, force } => {
            commands::lifecycle::delete(&workspace, &name, force)
        }
        Commands::RenameModule { old, new } => {
            commands::lifecycle::rename(&workspace, &old, &new)
        }
        Commands::ListModules { json } => commands::list::execute(&workspace, json),
    }
}
