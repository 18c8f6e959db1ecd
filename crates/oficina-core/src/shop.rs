use crate::client::ClientRegistry;
use crate::config::Config;
use crate::error::Result;
use crate::order::{OrderBook, OrderComposer};
use crate::service::ServiceCatalog;
use std::path::{Path, PathBuf};

/// The three tables of one shop, opened from its root and config.
#[derive(Debug, Clone)]
pub struct Shop {
    root: PathBuf,
    pub config: Config,
    pub clients: ClientRegistry,
    pub services: ServiceCatalog,
    pub orders: OrderBook,
}

impl Shop {
    pub fn open(root: &Path) -> Result<Self> {
        let config = Config::load(root)?;
        Ok(Self::with_config(root, config))
    }

    pub fn with_config(root: &Path, config: Config) -> Self {
        let storage = &config.storage;
        Self {
            root: root.to_path_buf(),
            clients: ClientRegistry::open(storage.clients_path(root)),
            services: ServiceCatalog::open(storage.services_path(root)),
            orders: OrderBook::open(storage.orders_path(root)),
            config,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create every missing table file with its header. Returns the paths
    /// that were created.
    pub fn initialize(&self) -> Result<Vec<PathBuf>> {
        let mut created = Vec::new();
        for store in [
            self.clients.store(),
            self.services.store(),
            self.orders.store(),
        ] {
            if store.initialize()? {
                created.push(store.path().to_path_buf());
            }
        }
        Ok(created)
    }

    pub fn composer(&self) -> OrderComposer<'_> {
        OrderComposer {
            clients: &self.clients,
            services: &self.services,
            orders: &self.orders,
            documents: &self.config.documents,
            shop_name: self.config.shop.name.as_deref(),
            output_dir: self.config.documents.output_path(&self.root),
        }
    }
}
