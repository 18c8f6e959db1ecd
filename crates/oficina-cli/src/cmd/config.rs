use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use oficina_core::config::{Config, WarnLevel};
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show the effective configuration and resolved table paths
    Show,

    /// Validate the config for common mistakes
    Validate,
}

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(root, json),
        ConfigSubcommand::Validate => validate(root, json),
    }
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let storage = &config.storage;

    if json {
        print_json(&serde_json::json!({
            "config": config,
            "paths": {
                "clients": storage.clients_path(root),
                "services": storage.services_path(root),
                "orders": storage.orders_path(root),
                "documents": config.documents.output_path(root),
            },
        }))?;
        return Ok(());
    }

    println!(
        "Shop:       {}",
        config.shop.name.as_deref().unwrap_or("(unnamed)")
    );
    println!("Clients:    {}", storage.clients_path(root).display());
    println!("Services:   {}", storage.services_path(root).display());
    println!("Orders:     {}", storage.orders_path(root).display());
    println!("Documents:  {}", config.documents.output_path(root).display());
    println!("Title:      {}", config.documents.title);
    println!("Currency:   {}", config.documents.currency_symbol);
    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let warnings = config.validate();

    if json {
        let value = serde_json::json!({
            "warnings": warnings,
        });
        print_json(&value)?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    let has_errors = warnings.iter().any(|w| w.level == WarnLevel::Error);
    if has_errors {
        anyhow::bail!("config validation found errors");
    }

    Ok(())
}
