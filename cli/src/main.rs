mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use model_fetch_core::SourceType;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "model-fetch")]
#[command(author, version, about = "Download model artifacts from git or blob storage", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download a model and record its metadata
    Pull {
        /// Source type: git or azureblob
        #[arg(short, long, value_parser = parse_source)]
        source: SourceType,

        /// Clonable git URI or publicly readable blob URI
        uri: String,

        /// Target directory (default: <models_dir>/<name>)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Name to record the model under (default: last URI segment)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// List downloaded models
    #[command(alias = "ls")]
    List,

    /// Show recorded metadata for a model
    Info {
        /// Model name
        model: String,
    },

    /// Remove a downloaded model
    #[command(alias = "rm")]
    Remove {
        /// Model name to remove
        model: String,
    },

    /// View or set configuration
    Config {
        /// Config key (e.g., "tools.git", "storage.models_dir")
        key: Option<String>,

        /// Value to set (if omitted, shows current value)
        value: Option<String>,
    },
}

fn parse_source(s: &str) -> Result<SourceType, String> {
    s.parse().map_err(|e: model_fetch_core::DownloadError| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Pull {
            source,
            uri,
            dir,
            name,
        } => {
            commands::pull::execute(source, &uri, dir, name).await?;
        }
        Commands::List => {
            commands::list::execute().await?;
        }
        Commands::Info { model } => {
            commands::info::execute(&model).await?;
        }
        Commands::Remove { model } => {
            commands::remove::execute(&model).await?;
        }
        Commands::Config { key, value } => {
            commands::config::execute(key.as_deref(), value.as_deref()).await?;
        }
    }

    Ok(())
}
