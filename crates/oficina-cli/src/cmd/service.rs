use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use oficina_core::{
    service::{format_currency, Service, ServiceUpdate},
    Shop,
};
use std::path::Path;

#[derive(Subcommand)]
pub enum ServiceSubcommand {
    /// Add a service to the catalog (price must be greater than zero)
    Add {
        #[arg(long)]
        description: String,
        #[arg(long, allow_negative_numbers = true)]
        price: f64,
    },
    /// List the catalog with row positions
    List,
    /// Show one service
    Show { position: usize },
    /// Edit service fields in place
    Edit {
        position: usize,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        price: Option<f64>,
    },
    /// Delete a service; later positions shift down by one
    Remove { position: usize },
}

pub fn run(root: &Path, subcmd: ServiceSubcommand, json: bool) -> anyhow::Result<()> {
    let shop = Shop::open(root).context("failed to open shop")?;
    match subcmd {
        ServiceSubcommand::Add { description, price } => {
            add(&shop, Service::new(description, price), json)
        }
        ServiceSubcommand::List => list(&shop, json),
        ServiceSubcommand::Show { position } => show(&shop, position, json),
        ServiceSubcommand::Edit {
            position,
            description,
            price,
        } => edit(&shop, position, ServiceUpdate { description, price }, json),
        ServiceSubcommand::Remove { position } => remove(&shop, position, json),
    }
}

fn currency(shop: &Shop, price: f64) -> String {
    format_currency(&shop.config.documents.currency_symbol, price)
}

fn add(shop: &Shop, service: Service, json: bool) -> anyhow::Result<()> {
    let position = shop.services.add(&service).context("service not saved")?;
    if json {
        print_json(&serde_json::json!({ "position": position, "service": service }))?;
    } else {
        println!(
            "Service saved [{position}]: {} - {}",
            service.description,
            currency(shop, service.price)
        );
    }
    Ok(())
}

fn list(shop: &Shop, json: bool) -> anyhow::Result<()> {
    let services = shop.services.list().context("failed to load services")?;
    if json {
        print_json(&services)?;
        return Ok(());
    }
    if services.is_empty() {
        println!("No services registered.");
        return Ok(());
    }
    let rows = services
        .into_iter()
        .enumerate()
        .map(|(i, s)| vec![i.to_string(), currency(shop, s.price), s.description])
        .collect();
    print_table(&["#", "PRICE", "DESCRIPTION"], rows);
    Ok(())
}

fn show(shop: &Shop, position: usize, json: bool) -> anyhow::Result<()> {
    let service = shop
        .services
        .get(position)
        .with_context(|| format!("service [{position}] not found"))?;
    if json {
        print_json(&service)?;
        return Ok(());
    }
    println!("Service [{position}]");
    println!("Description: {}", service.description);
    println!("Price:       {}", currency(shop, service.price));
    Ok(())
}

fn edit(shop: &Shop, position: usize, update: ServiceUpdate, json: bool) -> anyhow::Result<()> {
    if update.is_empty() {
        anyhow::bail!("nothing to change: pass --description or --price");
    }
    let service = shop
        .services
        .update(position, &update.into_changes())
        .with_context(|| format!("service [{position}] not updated"))?;
    if json {
        print_json(&serde_json::json!({ "position": position, "service": service }))?;
    } else {
        println!("Service updated [{position}]: {}", service.description);
    }
    Ok(())
}

fn remove(shop: &Shop, position: usize, json: bool) -> anyhow::Result<()> {
    let service = shop
        .services
        .remove(position)
        .with_context(|| format!("service [{position}] not removed"))?;
    if json {
        print_json(&serde_json::json!({ "position": position, "removed": service }))?;
    } else {
        println!("Service removed [{position}]: {}", service.description);
    }
    Ok(())
}
