use crate::output::print_json;
use anyhow::Context;
use oficina_core::{config::Config, paths, Shop};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config_created = if paths::config_path(root).exists() {
        false
    } else {
        Config::default()
            .save(root)
            .context("failed to write oficina.yaml")?;
        true
    };

    let shop = Shop::open(root).context("failed to load oficina.yaml")?;
    let created = shop.initialize().context("failed to initialize tables")?;

    if json {
        print_json(&serde_json::json!({
            "root": root,
            "config_created": config_created,
            "tables_created": created,
        }))?;
        return Ok(());
    }

    println!("Initializing oficina in: {}", root.display());
    print_status(config_created, Path::new(paths::CONFIG_FILE));
    for store in [
        shop.clients.store(),
        shop.services.store(),
        shop.orders.store(),
    ] {
        let path = store.path();
        print_status(
            created.iter().any(|c| c == path),
            path.strip_prefix(root).unwrap_or(path),
        );
    }
    Ok(())
}

fn print_status(created: bool, path: &Path) {
    if created {
        println!("  created: {}", path.display());
    } else {
        println!("  exists:  {}", path.display());
    }
}
