use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use oficina_core::{
    client::{Client, ClientUpdate},
    Shop,
};
use std::path::Path;

#[derive(Subcommand)]
pub enum ClientSubcommand {
    /// Register a client (all fields required)
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        /// Address; may contain line breaks
        #[arg(long)]
        address: String,
    },
    /// List registered clients with their row positions
    List,
    /// Show one client
    Show { position: usize },
    /// Edit client fields in place
    Edit {
        position: usize,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },
    /// Delete a client; later positions shift down by one
    Remove { position: usize },
}

pub fn run(root: &Path, subcmd: ClientSubcommand, json: bool) -> anyhow::Result<()> {
    let shop = Shop::open(root).context("failed to open shop")?;
    match subcmd {
        ClientSubcommand::Add {
            name,
            phone,
            address,
        } => add(&shop, Client::new(name, phone, address), json),
        ClientSubcommand::List => list(&shop, json),
        ClientSubcommand::Show { position } => show(&shop, position, json),
        ClientSubcommand::Edit {
            position,
            name,
            phone,
            address,
        } => edit(
            &shop,
            position,
            ClientUpdate {
                name,
                phone,
                address,
            },
            json,
        ),
        ClientSubcommand::Remove { position } => remove(&shop, position, json),
    }
}

fn add(shop: &Shop, client: Client, json: bool) -> anyhow::Result<()> {
    let position = shop.clients.add(&client).context("client not saved")?;
    if json {
        print_json(&serde_json::json!({ "position": position, "client": client }))?;
    } else {
        println!("Client saved [{position}]: {}", client.name);
    }
    Ok(())
}

fn list(shop: &Shop, json: bool) -> anyhow::Result<()> {
    let clients = shop.clients.list().context("failed to load clients")?;
    if json {
        print_json(&clients)?;
        return Ok(());
    }
    if clients.is_empty() {
        println!("No clients registered.");
        return Ok(());
    }
    let rows = clients
        .into_iter()
        .enumerate()
        .map(|(i, c)| vec![i.to_string(), c.name, c.phone, c.address])
        .collect();
    print_table(&["#", "NAME", "PHONE", "ADDRESS"], rows);
    Ok(())
}

fn show(shop: &Shop, position: usize, json: bool) -> anyhow::Result<()> {
    let client = shop
        .clients
        .get(position)
        .with_context(|| format!("client [{position}] not found"))?;
    if json {
        print_json(&client)?;
        return Ok(());
    }
    println!("Client [{position}]");
    println!("Name:     {}", client.name);
    println!("Phone:    {}", client.phone);
    println!("Address:  {}", client.address.replace('\n', "\n          "));
    Ok(())
}

fn edit(shop: &Shop, position: usize, update: ClientUpdate, json: bool) -> anyhow::Result<()> {
    if update.is_empty() {
        anyhow::bail!("nothing to change: pass --name, --phone or --address");
    }
    let client = shop
        .clients
        .update(position, &update.into_changes())
        .with_context(|| format!("client [{position}] not updated"))?;
    if json {
        print_json(&serde_json::json!({ "position": position, "client": client }))?;
    } else {
        println!("Client updated [{position}]: {}", client.name);
    }
    Ok(())
}

fn remove(shop: &Shop, position: usize, json: bool) -> anyhow::Result<()> {
    let client = shop
        .clients
        .remove(position)
        .with_context(|| format!("client [{position}] not removed"))?;
    if json {
        print_json(&serde_json::json!({ "position": position, "removed": client }))?;
    } else {
        println!("Client removed [{position}]: {}", client.name);
    }
    Ok(())
}
