//! Config command - configuration management

use anyhow::{Context, Result};
use gemm_server::AppConfig;
use std::fs;

use crate::args::{ConfigArgs, ConfigCommands};

pub async fn execute(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Init { path, force } => init_config(path, force).await,
    }
}

async fn init_config(path: std::path::PathBuf, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            path.display()
        );
    }

    let content = AppConfig::example_toml();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }

    fs::write(&path, content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;

    println!("Created config file: {}", path.display());
    println!();
    println!("Next steps:");
    println!("  1. Point [mysql] and [mongo] at your datastores");
    println!("  2. Export DB_PASSWORD, MONGODB_USER, MONGODB_PASSWORD, TOKEN_SECRET and API_KEY");
    println!("  3. Run 'gemm doctor' to validate your setup");
    println!("  4. Run 'gemm serve' to start the API");

    Ok(())
}
