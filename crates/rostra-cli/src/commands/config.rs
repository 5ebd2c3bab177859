use anyhow::{Context, Result};
use rostra_search::{config, Config};
use std::path::Path;
use toml_edit::{value, DocumentMut};

/// Keys accepted by `config get` and `config set`.
const KEYS: [&str; 10] = [
    "weaviate_url",
    "embedding_endpoint",
    "embedding_model",
    "embedding_dimensions",
    "lakefs_endpoint",
    "lakefs_access_key_id",
    "lakefs_secret_access_key",
    "lakefs_repository",
    "lakefs_ref",
    "products_path",
];

/// Keys whose values are never echoed back.
const CREDENTIAL_KEYS: [&str; 2] = ["lakefs_access_key_id", "lakefs_secret_access_key"];

fn unknown_key(key: &str) -> anyhow::Error {
    anyhow::anyhow!("Unknown config key: {}\n\nValid keys: {}", key, KEYS.join(", "))
}

fn masked(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<not set>"
    } else {
        "<set>"
    }
}

/// Show the current effective configuration.
pub fn show_config(config: &Config) -> Result<()> {
    println!("Current Configuration");
    println!("=====================\n");

    println!("Config file: {}", config::config_file_path().display());

    let exists = config::config_file_path().exists();
    println!("File exists: {}\n", if exists { "yes" } else { "no (using defaults)" });

    println!("Settings:");
    println!("  weaviate_url: {}", config.weaviate_url);
    println!("  embedding_endpoint: {}", config.embedding_endpoint);
    println!("  embedding_model: {}", config.embedding_model);
    println!(
        "  embedding_dimensions: {}",
        config
            .embedding_dimensions
            .map_or_else(|| "<any>".to_string(), |d| d.to_string())
    );
    println!("  lakefs_endpoint: {}", config.lakefs_endpoint);
    println!("  lakefs_access_key_id: {}", masked(&config.lakefs_access_key_id));
    println!("  lakefs_secret_access_key: {}", masked(&config.lakefs_secret_access_key));
    println!("  lakefs_repository: {}", config.lakefs_repository);
    println!("  lakefs_ref: {}", config.lakefs_ref);
    println!(
        "  products_path: {}",
        config
            .products_path
            .as_deref()
            .map_or_else(|| "<built-in>".to_string(), |p| p.display().to_string())
    );
    println!("  logging.level: {:?}", config.logging.level());
    println!("  logging.coloured: {}", config.logging.coloured());
    println!("  logging.output: {:?}", config.logging.output());

    println!("\nPriority: CLI args > ENV vars (ROSTRA_*) > Config file > Defaults");

    Ok(())
}

/// Look up one effective value by key.
fn lookup(config: &Config, key: &str) -> Result<String> {
    let found = match key {
        "weaviate_url" => config.weaviate_url.clone(),
        "embedding_endpoint" => config.embedding_endpoint.clone(),
        "embedding_model" => config.embedding_model.clone(),
        "embedding_dimensions" => config
            .embedding_dimensions
            .map_or_else(|| "<not set>".to_string(), |d| d.to_string()),
        "lakefs_endpoint" => config.lakefs_endpoint.clone(),
        "lakefs_access_key_id" => masked(&config.lakefs_access_key_id).to_string(),
        "lakefs_secret_access_key" => masked(&config.lakefs_secret_access_key).to_string(),
        "lakefs_repository" => config.lakefs_repository.clone(),
        "lakefs_ref" => config.lakefs_ref.clone(),
        "products_path" => config
            .products_path
            .as_deref()
            .map_or_else(|| "<not set>".to_string(), |p| p.display().to_string()),
        _ => return Err(unknown_key(key)),
    };
    Ok(found)
}

/// Get a specific config value.
pub fn get_config(config: &Config, key: Option<String>) -> Result<()> {
    if let Some(key) = key {
        println!("{}", lookup(config, &key)?);
    } else {
        // No key provided, show entire config file contents
        let config_path = config::config_file_path();

        if config_path.exists() {
            let contents =
                std::fs::read_to_string(&config_path).context("Failed to read config file")?;
            print!("{}", contents);
        } else {
            println!("Config file does not exist: {}", config_path.display());
            println!("\nRun 'rostra config init' to create it.");
        }
    }

    Ok(())
}

/// Rewrite `contents` with `key` set to `raw`, keeping comments and layout.
fn update_document(contents: &str, key: &str, raw: &str) -> Result<String> {
    if !KEYS.contains(&key) {
        return Err(unknown_key(key));
    }

    let mut doc: DocumentMut = contents.parse().context("Config file is not valid TOML")?;

    if key == "embedding_dimensions" {
        let dimensions: i64 = raw
            .parse()
            .with_context(|| format!("embedding_dimensions must be a positive integer, got {raw:?}"))?;
        anyhow::ensure!(dimensions > 0, "embedding_dimensions must be a positive integer");
        doc[key] = value(dimensions);
    } else {
        doc[key] = value(raw);
    }

    Ok(doc.to_string())
}

fn write_value(config_path: &Path, key: &str, raw: &str) -> Result<()> {
    let contents = std::fs::read_to_string(config_path).context("Failed to read config file")?;
    let updated = update_document(&contents, key, raw)?;
    std::fs::write(config_path, updated).context("Failed to write config file")?;
    Ok(())
}

/// Set a config value.
pub fn set_config(key: &str, raw: &str) -> Result<()> {
    let config_path = config::config_file_path();

    // Ensure config file exists
    config::ensure_config_file()?;

    write_value(&config_path, key, raw)?;

    let shown = if CREDENTIAL_KEYS.contains(&key) { "<set>" } else { raw };
    println!("✓ Updated {} = {}", key, shown);
    println!("  in {}", config_path.display());

    Ok(())
}

/// Show the config file path.
pub fn show_path() {
    println!("{}", config::config_file_path().display());
}

/// Show example configuration.
pub fn show_example() {
    print!("{}", config::example_config());
}

/// Initialize config file with defaults.
pub fn init_config() -> Result<()> {
    let created = config::ensure_config_file()?;
    let config_path = config::config_file_path();

    if created {
        println!("✓ Created config file: {}", config_path.display());
        println!("\nEdit this file to configure rostra.");
    } else {
        println!("Config file already exists: {}", config_path.display());
    }

    Ok(())
}
