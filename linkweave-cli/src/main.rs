//! # linkweave CLI
//!
//! Command-line interface for the linkweave auto-linker and UTM tagger.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "linkweave")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "linkweave.yml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every published article and write the linked trees
    Build,

    /// Process a single markdown file
    Process {
        /// Markdown file with front-matter
        file: PathBuf,

        /// Print the transformed tree as JSON instead of its links
        #[arg(long)]
        json: bool,
    },

    /// List registry terms and where they link
    Terms {
        /// Only show terms that cannot be linked
        #[arg(long)]
        unresolved: bool,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; stdout is reserved for command output
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Build => commands::build_site(&cli.config).await,
        Commands::Process { file, json } => commands::process_file(&cli.config, &file, json),
        Commands::Terms { unresolved, json } => commands::list_terms(&cli.config, unresolved, json),
    }
}
