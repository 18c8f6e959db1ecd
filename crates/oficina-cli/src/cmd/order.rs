use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use oficina_core::{
    order::{parse_date, OrderRequest, OrderUpdate},
    OficinaError, Shop,
};
use std::path::Path;

// ---------------------------------------------------------------------------
// GenerateBlocked
// ---------------------------------------------------------------------------

/// Generation refused because a client or service table is empty. Reported
/// by `main` as a warning rather than an error.
#[derive(Debug)]
pub struct GenerateBlocked(pub String);

impl std::fmt::Display for GenerateBlocked {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for GenerateBlocked {}

#[derive(Subcommand)]
pub enum OrderSubcommand {
    /// Generate the PDF for a new service order and record it
    Generate {
        /// Client name (first match wins)
        #[arg(long)]
        client: String,
        /// Service description (first match wins)
        #[arg(long)]
        service: String,
        /// Device or equipment being serviced
        #[arg(long, default_value = "")]
        equipment: String,
        /// Order date as DD/MM/YYYY (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// List recorded orders with their row positions
    List,
    /// Show an order with the client and service it resolves to
    Show { position: usize },
    /// Edit order fields in place
    Edit {
        position: usize,
        #[arg(long)]
        client: Option<String>,
        #[arg(long)]
        service: Option<String>,
        #[arg(long)]
        equipment: Option<String>,
        /// DD/MM/YYYY
        #[arg(long)]
        date: Option<String>,
    },
    /// Delete an order; later positions shift down by one
    Remove { position: usize },
    /// Re-render the PDF of a recorded order without recording a new one
    Regenerate { position: usize },
}

pub fn run(root: &Path, subcmd: OrderSubcommand, json: bool) -> anyhow::Result<()> {
    let shop = Shop::open(root).context("failed to open shop")?;
    match subcmd {
        OrderSubcommand::Generate {
            client,
            service,
            equipment,
            date,
        } => generate(
            &shop,
            OrderRequest {
                client_name: client,
                service_description: service,
                equipment,
            },
            date.as_deref(),
            json,
        ),
        OrderSubcommand::List => list(&shop, json),
        OrderSubcommand::Show { position } => show(&shop, position, json),
        OrderSubcommand::Edit {
            position,
            client,
            service,
            equipment,
            date,
        } => edit(
            &shop,
            position,
            OrderUpdate {
                client,
                service,
                equipment,
                date,
            },
            json,
        ),
        OrderSubcommand::Remove { position } => remove(&shop, position, json),
        OrderSubcommand::Regenerate { position } => regenerate(&shop, position, json),
    }
}

fn generate(
    shop: &Shop,
    request: OrderRequest,
    date: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let date = match date {
        Some(raw) => parse_date(raw)?,
        None => chrono::Local::now().date_naive(),
    };

    let generated = match shop.composer().generate(&request, date) {
        Ok(g) => g,
        Err(OficinaError::ReferenceMissing(msg)) => return Err(GenerateBlocked(msg).into()),
        Err(e) => return Err(e).context("order not generated"),
    };

    if json {
        print_json(&generated)?;
    } else {
        println!(
            "Order generated [{}]: {} - {}",
            generated.position, generated.order.client, generated.order.service
        );
        println!("Document: {}", generated.artifact.path.display());
    }
    Ok(())
}

fn list(shop: &Shop, json: bool) -> anyhow::Result<()> {
    let orders = shop.orders.list().context("failed to load orders")?;
    if json {
        print_json(&orders)?;
        return Ok(());
    }
    if orders.is_empty() {
        println!("No orders recorded.");
        return Ok(());
    }
    let rows = orders
        .into_iter()
        .enumerate()
        .map(|(i, o)| vec![i.to_string(), o.date, o.client, o.service, o.equipment])
        .collect();
    print_table(&["#", "DATE", "CLIENT", "SERVICE", "EQUIPMENT"], rows);
    Ok(())
}

fn show(shop: &Shop, position: usize, json: bool) -> anyhow::Result<()> {
    let view = shop
        .composer()
        .edit_view(position)
        .with_context(|| format!("order [{position}] not found"))?;
    if json {
        print_json(&view)?;
        return Ok(());
    }

    let reference = |p: Option<usize>| match p {
        Some(i) => format!("[{i}]"),
        None => "(no longer registered)".to_string(),
    };
    println!("Order [{position}]");
    println!("Date:       {}", view.order.date);
    println!(
        "Client:     {} {}",
        view.order.client,
        reference(view.client_position)
    );
    println!(
        "Service:    {} {}",
        view.order.service,
        reference(view.service_position)
    );
    println!("Equipment:  {}", view.order.equipment);
    Ok(())
}

fn edit(shop: &Shop, position: usize, update: OrderUpdate, json: bool) -> anyhow::Result<()> {
    if update.is_empty() {
        anyhow::bail!("nothing to change: pass --client, --service, --equipment or --date");
    }
    let order = shop
        .composer()
        .update(position, update)
        .with_context(|| format!("order [{position}] not updated"))?;
    if json {
        print_json(&serde_json::json!({ "position": position, "order": order }))?;
    } else {
        println!("Order updated [{position}]: {} - {}", order.client, order.service);
    }
    Ok(())
}

fn remove(shop: &Shop, position: usize, json: bool) -> anyhow::Result<()> {
    let order = shop
        .orders
        .remove(position)
        .with_context(|| format!("order [{position}] not removed"))?;
    if json {
        print_json(&serde_json::json!({ "position": position, "removed": order }))?;
    } else {
        println!("Order removed [{position}]: {} - {}", order.client, order.date);
    }
    Ok(())
}

fn regenerate(shop: &Shop, position: usize, json: bool) -> anyhow::Result<()> {
    let artifact = shop
        .composer()
        .regenerate(position)
        .with_context(|| format!("order [{position}] document not generated"))?;
    if json {
        print_json(&artifact)?;
    } else {
        println!("Document: {}", artifact.path.display());
    }
    Ok(())
}
