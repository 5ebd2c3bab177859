use anyhow::{Context, Result};
use clap::Parser;
use rostra_search::{Config, Services};
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "rostra", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML file of data products replacing the built-in registry
    #[arg(long, global = true)]
    products: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// List the data products that are ready to search
    ///
    /// A product is listed only when its vector-index collection exists and
    /// holds at least one record. Each entry shows the record count and
    /// whether the backing Parquet dataset is present in the object store.
    ///
    /// Products are recomputed live on every call; nothing is cached.
    Products {
        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },
    /// Semantic search over a data product
    ///
    /// The query is embedded by the embedding service and matched against the
    /// product's collection by vector similarity. Results are ordered from
    /// most to least similar.
    ///
    /// Without --product or --collection the first available product is used.
    Search(commands::search::SearchArgs),
    /// Summary statistics and per-country counts for a data product
    Stats {
        /// Data product key (see `rostra products`)
        key: String,

        /// Number of countries to show
        #[arg(long, default_value_t = 15)]
        top: usize,

        /// Print the statistics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Monthly average stance scores for a data product
    Trends {
        /// Data product key (see `rostra products`)
        key: String,

        /// Restrict to these countries (repeatable)
        #[arg(long = "country")]
        countries: Vec<String>,

        /// Print the trend rows as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show sample search queries
    Samples,
    /// Check that the vector index, embedding service and object store respond
    Status,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigAction {
    /// Show the current effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Print an example config file
    Example,
    /// Create the config file with defaults if it does not exist
    Init,
    /// Print one config value, or the whole config file
    Get {
        /// Config key
        key: Option<String>,
    },
    /// Set a config value in the config file
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
}

fn load_config(products: Option<PathBuf>) -> Result<Config> {
    match products {
        Some(path) => Config::load_with_products_path(path),
        None => Config::load(),
    }
}

/// Build the backend clients. No network traffic happens here.
fn connect(config: &Config) -> Result<Services> {
    Services::from_config(config).context("Failed to initialise backend clients")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.products)?;

    twyg::setup(config.logging.clone())
        .map_err(|e| anyhow::anyhow!("Could not set up logger: {e:?}"))?;

    match cli.command {
        Commands::Products { json } => {
            commands::list_products(&connect(&config)?, json).await?;
        }
        Commands::Search(args) => {
            commands::run_search(&connect(&config)?, args).await?;
        }
        Commands::Stats { key, top, json } => {
            commands::show_stats(&connect(&config)?, &key, top, json).await?;
        }
        Commands::Trends {
            key,
            countries,
            json,
        } => {
            commands::show_trends(&connect(&config)?, &key, &countries, json).await?;
        }
        Commands::Samples => {
            commands::show_samples();
        }
        Commands::Status => {
            commands::show_status(&connect(&config)?, &config).await;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show_config(&config)?,
            ConfigAction::Path => commands::config::show_path(),
            ConfigAction::Example => commands::config::show_example(),
            ConfigAction::Init => commands::config::init_config()?,
            ConfigAction::Get { key } => commands::config::get_config(&config, key)?,
            ConfigAction::Set { key, value } => commands::config::set_config(&key, &value)?,
        },
    }

    Ok(())
}
