use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use repomix_bridge::cli;

#[derive(Debug, Parser)]
#[command(
    name = "repomix-bridge",
    version,
    about = "Pack selected files with repomix and optionally push them with claudesync"
)]
struct Cli {
    /// Workspace root (defaults to the current directory)
    #[arg(long, global = true)]
    workspace: Option<PathBuf>,

    /// Treat every prompt as dismissed
    #[arg(long, global = true)]
    no_prompt: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Pack the given files with repomix
    Pack {
        /// Files to include
        paths: Vec<PathBuf>,

        /// Ask repomix to copy its output to the clipboard
        #[arg(long)]
        copy: bool,
    },

    /// Pack the files currently open in the editor
    PackOpen {
        /// File listing the open documents, one per line (`-` for stdin)
        #[arg(long)]
        files_from: PathBuf,

        /// Ask repomix to copy its output to the clipboard
        #[arg(long)]
        copy: bool,
    },

    /// Push the workspace to its claudesync project
    Sync,

    /// Create default repomix config, instructions and .claudeignore if missing
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();
    let workspace = cli::resolve_workspace(args.workspace.as_deref())?;
    let interactive = !args.no_prompt;

    match args.command {
        Commands::Pack { paths, copy } => {
            cli::pack::run_pack(&workspace, &paths, copy, interactive).await?
        }
        Commands::PackOpen { files_from, copy } => {
            cli::pack::run_pack_open(&workspace, &files_from, copy, interactive).await?
        }
        Commands::Sync => cli::sync::run_sync(&workspace, interactive).await?,
        Commands::Init => cli::init::run_init(&workspace).await?,
    }

    Ok(())
}
