//! finrisk CLI: financial risk knowledge graph.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use finrisk_kg::config::EngineConfig;
use finrisk_kg::engine::{Engine, IngestBundle};

/// Config file looked up inside the data directory.
const CONFIG_FILE: &str = "finrisk.toml";
const DEFAULT_DATA_DIR: &str = ".finrisk";

#[derive(Parser)]
#[command(name = "finrisk", version, about = "Financial risk knowledge graph")]
struct Cli {
    /// Data directory for persistent storage.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// TOML config file. Defaults to `finrisk.toml` in the data directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a data directory with a default config.
    Init,

    /// Ingest entities, relationships and news from a JSON bundle.
    Ingest {
        /// JSON file: {"entities": [...], "relationships": [...], "news": [...]}.
        #[arg(long)]
        file: PathBuf,
    },

    /// Model events, identify risks, and rebuild the graph.
    Process,

    /// Rebuild the combined graph.
    Build,

    /// Nodes and edges of one layer, for display.
    Visualize {
        /// all, entity, event or risk.
        #[arg(long, default_value = "all")]
        layer: String,
    },

    /// Node centrality per layer.
    Centrality {
        /// degree, betweenness, closeness or eigenvector.
        #[arg(long, default_value = "degree")]
        measure: String,
    },

    /// Community detection.
    Communities {
        /// louvain or label_propagation.
        #[arg(long, default_value = "louvain")]
        method: String,
    },

    /// Simple paths between two nodes.
    Paths {
        source: String,
        target: String,
        /// Maximum hops; defaults to the configured bound.
        #[arg(long)]
        max_length: Option<usize>,
    },

    /// Keyword search.
    Search {
        /// entities, events or risks.
        kind: String,
        term: String,
    },

    /// Every recorded risk transmission path.
    RiskPaths,

    /// Route between two risks.
    RiskPath { source: String, target: String },

    /// Aggregate risk statistics.
    Metrics,

    /// Show engine info and statistics.
    Info,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = resolve_config(cli.config.as_deref(), cli.data_dir)?;

    match cli.command {
        Commands::Init => {
            let Some(dir) = config.data_dir.clone() else {
                miette::bail!("init needs a data directory");
            };
            std::fs::create_dir_all(&dir).into_diagnostic()?;
            let path = dir.join(CONFIG_FILE);
            if !path.exists() {
                config.save(&path)?;
            }
            let engine = Engine::new(config)?;
            println!("Initialized finrisk at {}", dir.display());
            println!("{}", engine.info());
        }
        Commands::Ingest { file } => {
            let engine = Engine::new(config)?;
            let content = std::fs::read_to_string(&file).into_diagnostic()?;
            let bundle: IngestBundle = serde_json::from_str(&content).into_diagnostic()?;
            engine.ingest(bundle)?;
            println!("Ingested {}", file.display());
            println!("{}", engine.info());
        }
        Commands::Process => {
            let engine = Engine::new(config)?;
            print_json(&engine.process_all())?;
        }
        Commands::Build => {
            let engine = Engine::new(config)?;
            engine.build();
            println!("{}", engine.info());
        }
        Commands::Visualize { layer } => {
            print_json(&Engine::new(config)?.visualization(&layer))?;
        }
        Commands::Centrality { measure } => {
            print_json(&Engine::new(config)?.centrality(&measure))?;
        }
        Commands::Communities { method } => {
            print_json(&Engine::new(config)?.communities(&method))?;
        }
        Commands::Paths {
            source,
            target,
            max_length,
        } => {
            print_json(&Engine::new(config)?.find_paths(&source, &target, max_length))?;
        }
        Commands::Search { kind, term } => {
            print_json(&Engine::new(config)?.search(&kind, &term))?;
        }
        Commands::RiskPaths => {
            print_json(&Engine::new(config)?.risk_transmission_paths())?;
        }
        Commands::RiskPath { source, target } => {
            print_json(&Engine::new(config)?.risk_path(&source, &target))?;
        }
        Commands::Metrics => {
            print_json(&Engine::new(config)?.risk_metrics())?;
        }
        Commands::Info => {
            println!("{}", Engine::new(config)?.info());
        }
    }

    Ok(())
}

/// `--config` wins; otherwise the data directory's config file when it
/// exists; otherwise defaults. `--data-dir` overrides the configured
/// directory.
fn resolve_config(explicit: Option<&Path>, data_dir: Option<PathBuf>) -> Result<EngineConfig> {
    let dir = data_dir.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
    let mut config = match explicit {
        Some(path) => EngineConfig::load(path)?,
        None if dir.join(CONFIG_FILE).exists() => EngineConfig::load(&dir.join(CONFIG_FILE))?,
        None => EngineConfig::default(),
    };
    if data_dir.is_some() || config.data_dir.is_none() {
        config.data_dir = Some(dir);
    }
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).into_diagnostic()?;
    println!("{json}");
    Ok(())
}
