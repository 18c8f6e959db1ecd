mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    client::ClientSubcommand, config::ConfigSubcommand, order::OrderSubcommand,
    service::ServiceSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "oficina",
    about = "Register clients and services, and generate printable service orders",
    version,
    propagate_version = true
)]
struct Cli {
    /// Shop root (default: auto-detect from oficina.yaml, else the current directory)
    #[arg(long, global = true, env = "OFICINA_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default oficina.yaml and create the empty tables
    Init,

    /// Manage registered clients
    Client {
        #[command(subcommand)]
        subcommand: ClientSubcommand,
    },

    /// Manage the service catalog
    Service {
        #[command(subcommand)]
        subcommand: ServiceSubcommand,
    },

    /// Generate and manage service orders
    Order {
        #[command(subcommand)]
        subcommand: OrderSubcommand,
    },

    /// Inspect and validate the shop configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing::Level::WARN.into())
                .from_env_lossy(),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root, cli.json),
        Commands::Client { subcommand } => cmd::client::run(&root, subcommand, cli.json),
        Commands::Service { subcommand } => cmd::service::run(&root, subcommand, cli.json),
        Commands::Order { subcommand } => cmd::order::run(&root, subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        match e.downcast_ref::<cmd::order::GenerateBlocked>() {
            Some(blocked) => eprintln!("warning: {blocked}"),
            // Print the full error chain (anyhow's alternate Display)
            None => eprintln!("error: {e:#}"),
        }
        std::process::exit(1);
    }
}
