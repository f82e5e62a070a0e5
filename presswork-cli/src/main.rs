//! # presswork CLI
//!
//! Command-line interface for the presswork newspaper page generator.

mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "presswork")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (defaults apply when it does not exist)
    #[arg(long, global = true, default_value = "presswork.yml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Defaults to `build`
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render every article and update the index
    Build(BuildArgs),

    /// Scaffold a config file, template and sample article
    Init {
        /// Target directory (defaults to current directory)
        path: Option<PathBuf>,
    },

    /// List the records in the article index
    Index {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Default)]
struct BuildArgs {
    /// Directory of markdown articles
    #[arg(long)]
    input: Option<PathBuf>,

    /// HTML template file
    #[arg(long)]
    template: Option<PathBuf>,

    /// Directory for rendered pages
    #[arg(long)]
    output: Option<PathBuf>,

    /// JSON index file
    #[arg(long)]
    index: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command.unwrap_or(Commands::Build(BuildArgs::default())) {
        Commands::Build(args) => {
            let overrides = commands::PathOverrides {
                input: args.input,
                template: args.template,
                output: args.output,
                index: args.index,
            };
            commands::build_site(&cli.config, overrides)
        }
        Commands::Init { path } => commands::init_project(path.as_deref()),
        Commands::Index { json } => commands::list_index(&cli.config, json),
    }
}
