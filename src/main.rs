mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use memdex::config;

#[derive(Parser)]
#[command(name = "memdex", version, about = "Per-agent memory search engine")]
struct Cli {
    /// Config file (defaults to ~/.memdex/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file, overriding the config
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Index markdown files or directories (defaults to the memory directory)
    Index {
        paths: Vec<PathBuf>,
        /// Remove indexed files that no longer exist under the memory directory
        #[arg(long)]
        prune: bool,
    },
    /// Remove a file's chunks and embeddings
    Remove {
        /// Path as stored in the index (relative to the memory directory)
        file_path: String,
    },
    /// Search memory
    Search {
        query: Option<String>,
        #[arg(long, value_enum, default_value_t = SearchMode::Lexical)]
        mode: SearchMode,
        /// Query embedding as a JSON array, required for vector and hybrid modes
        #[arg(long)]
        vector: Option<String>,
        #[arg(long, short)]
        limit: Option<usize>,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show index statistics
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// List chunk ids still waiting for an embedding
    Pending {
        #[arg(long)]
        json: bool,
    },
    /// Run database diagnostics
    Doctor,
    /// Remove every indexed file from the database
    Reset {
        /// Skip the confirmation check
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SearchMode {
    Lexical,
    Vector,
    Hybrid,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => config::MemdexConfig::load_from(path)?,
        None => config::MemdexConfig::load()?,
    };
    if let Some(db) = &cli.db {
        config.storage.db_path = db.to_string_lossy().into_owned();
    }

    // Log to stderr so stdout stays clean for --json output.
    let filter = EnvFilter::try_new(&config.logging.level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Index { paths, prune } => cli::index::index(&config, &paths, prune),
        Command::Remove { file_path } => cli::index::remove(&config, &file_path),
        Command::Search {
            query,
            mode,
            vector,
            limit,
            json,
        } => cli::search::search(
            &config,
            cli::search::SearchArgs {
                query: query.as_deref(),
                mode,
                vector: vector.as_deref(),
                limit,
                json,
            },
        ),
        Command::Stats { json } => cli::stats::stats(&config, json),
        Command::Pending { json } => cli::stats::pending(&config, json),
        Command::Doctor => cli::doctor::doctor(&config),
        Command::Reset { yes } => cli::reset::reset(&config, yes),
    }
}
