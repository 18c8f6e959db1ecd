use crate::client::{Client, ClientRegistry};
use crate::config::DocumentConfig;
use crate::document::OrderDocument;
use crate::error::{OficinaError, Result};
use crate::registry::{Entity, Registry};
use crate::service::{Service, ServiceCatalog};
use crate::store::{Record, Schema};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const COL_CLIENT: &str = "cliente";
pub const COL_SERVICE: &str = "servico";
pub const COL_EQUIPMENT: &str = "aparelho";
pub const COL_DATE: &str = "data";

/// Day/month/year, as printed on orders and stored in the table.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

pub type OrderBook = Registry<Order>;

// ---------------------------------------------------------------------------
// Order
// ---------------------------------------------------------------------------

/// A generated service order. Client and service are referenced by their
/// display value, so renaming either leaves past orders pointing at the old
/// text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "cliente")]
    pub client: String,
    #[serde(rename = "servico")]
    pub service: String,
    #[serde(rename = "aparelho")]
    pub equipment: String,
    #[serde(rename = "data")]
    pub date: String,
}

impl Entity for Order {
    const SCHEMA: Schema = Schema {
        table: "ordens",
        columns: &[COL_CLIENT, COL_SERVICE, COL_EQUIPMENT, COL_DATE],
    };

    fn to_record(&self) -> Record {
        crate::store::record([
            (COL_CLIENT, self.client.as_str()),
            (COL_SERVICE, self.service.as_str()),
            (COL_EQUIPMENT, self.equipment.as_str()),
            (COL_DATE, self.date.as_str()),
        ])
    }

    fn from_record(_position: usize, record: &Record) -> Result<Self> {
        let field = |c: &str| record.get(c).cloned().unwrap_or_default();
        Ok(Self {
            client: field(COL_CLIENT),
            service: field(COL_SERVICE),
            equipment: field(COL_EQUIPMENT),
            date: field(COL_DATE),
        })
    }

    fn validate(&self) -> Result<()> {
        if self.client.trim().is_empty() {
            return Err(OficinaError::Validation("order client is required".to_string()));
        }
        if self.service.trim().is_empty() {
            return Err(OficinaError::Validation("order service is required".to_string()));
        }
        parse_date(&self.date)?;
        Ok(())
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| {
        OficinaError::Validation(format!("date '{raw}' is not in DD/MM/YYYY format"))
    })
}

/// `ordem_<client>_<dd-mm-yyyy>.pdf`, spaces in the client name become
/// underscores and slashes in the date become hyphens. Path separators in
/// the name are replaced so the artifact always lands in the output dir.
pub fn artifact_name(client_name: &str, date: &str) -> String {
    let client: String = client_name
        .chars()
        .map(|c| match c {
            ' ' => '_',
            '/' | '\\' => '-',
            other => other,
        })
        .collect();
    format!("ordem_{}_{}.pdf", client, date.replace('/', "-"))
}

// ---------------------------------------------------------------------------
// Requests / results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub client_name: String,
    pub service_description: String,
    pub equipment: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Artifact {
    pub file_name: String,
    pub path: PathBuf,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedOrder {
    pub position: usize,
    pub order: Order,
    pub artifact: Artifact,
}

/// An order prepared for an edit form: the stored row plus the current
/// positions of the client and service it names. `None` means the
/// referenced value no longer exists.
#[derive(Debug, Clone, Serialize)]
pub struct OrderEditView {
    pub position: usize,
    pub order: Order,
    pub client_position: Option<usize>,
    pub service_position: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct OrderUpdate {
    pub client: Option<String>,
    pub service: Option<String>,
    pub equipment: Option<String>,
    pub date: Option<String>,
}

impl OrderUpdate {
    pub fn is_empty(&self) -> bool {
        self.client.is_none()
            && self.service.is_none()
            && self.equipment.is_none()
            && self.date.is_none()
    }

    pub fn into_changes(self) -> Record {
        [
            (COL_CLIENT, self.client),
            (COL_SERVICE, self.service),
            (COL_EQUIPMENT, self.equipment),
            (COL_DATE, self.date),
        ]
        .into_iter()
        .filter_map(|(c, v)| v.map(|v| (c.to_string(), v)))
        .collect()
    }
}

// ---------------------------------------------------------------------------
// OrderComposer
// ---------------------------------------------------------------------------

/// Joins a client and a service into an order, renders its document and
/// records it.
pub struct OrderComposer<'a> {
    pub clients: &'a ClientRegistry,
    pub services: &'a ServiceCatalog,
    pub orders: &'a OrderBook,
    pub documents: &'a DocumentConfig,
    pub shop_name: Option<&'a str>,
    pub output_dir: PathBuf,
}

impl OrderComposer<'_> {
    /// Render the document, write it to the output dir, then append the
    /// order row. Blocked with `ReferenceMissing` while either the client or
    /// the service table is empty.
    pub fn generate(&self, request: &OrderRequest, date: NaiveDate) -> Result<GeneratedOrder> {
        let clients = self.clients.list()?;
        let services = self.services.list()?;
        if clients.is_empty() || services.is_empty() {
            return Err(OficinaError::ReferenceMissing(
                "register at least one client and one service first".to_string(),
            ));
        }

        let client = clients
            .iter()
            .find(|c| c.name == request.client_name)
            .ok_or_else(|| OficinaError::ClientNotFound(request.client_name.clone()))?;
        let service = services
            .iter()
            .find(|s| s.description == request.service_description)
            .ok_or_else(|| OficinaError::ServiceNotFound(request.service_description.clone()))?;

        let order = Order {
            client: client.name.clone(),
            service: service.description.clone(),
            equipment: request.equipment.clone(),
            date: format_date(date),
        };
        order.validate()?;

        let artifact = self.write_artifact(&order, client, service)?;
        let position = self.orders.add(&order)?;
        tracing::info!(
            client = %order.client,
            artifact = %artifact.file_name,
            position,
            "service order generated"
        );

        Ok(GeneratedOrder {
            position,
            order,
            artifact,
        })
    }

    /// Re-render the document of a stored order from the current client and
    /// service rows. No order row is written.
    pub fn regenerate(&self, position: usize) -> Result<Artifact> {
        let order = self.orders.get(position)?;
        let (_, client) = self
            .clients
            .find_by_name(&order.client)?
            .ok_or_else(|| OficinaError::ClientNotFound(order.client.clone()))?;
        let (_, service) = self
            .services
            .find_by_description(&order.service)?
            .ok_or_else(|| OficinaError::ServiceNotFound(order.service.clone()))?;
        self.write_artifact(&order, &client, &service)
    }

    pub fn edit_view(&self, position: usize) -> Result<OrderEditView> {
        let order = self.orders.get(position)?;
        let client_position = self.clients.find_by_name(&order.client)?.map(|(i, _)| i);
        let service_position = self
            .services
            .find_by_description(&order.service)?
            .map(|(i, _)| i);
        Ok(OrderEditView {
            position,
            order,
            client_position,
            service_position,
        })
    }

    /// Edit a stored order. A new client or service value must name an
    /// existing row.
    pub fn update(&self, position: usize, update: OrderUpdate) -> Result<Order> {
        if let Some(name) = &update.client {
            if self.clients.find_by_name(name)?.is_none() {
                return Err(OficinaError::ClientNotFound(name.clone()));
            }
        }
        if let Some(description) = &update.service {
            if self.services.find_by_description(description)?.is_none() {
                return Err(OficinaError::ServiceNotFound(description.clone()));
            }
        }
        self.orders.update(position, &update.into_changes())
    }

    fn write_artifact(&self, order: &Order, client: &Client, service: &Service) -> Result<Artifact> {
        let document = OrderDocument {
            title: &self.documents.title,
            shop_name: self.shop_name,
            date: &order.date,
            client,
            service,
            equipment: &order.equipment,
            currency_symbol: &self.documents.currency_symbol,
        };
        let bytes = document.render()?;

        let file_name = artifact_name(&client.name, &order.date);
        let path = self.output_dir.join(&file_name);
        crate::io::atomic_write(&path, &bytes)?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "order document written");

        Ok(Artifact {
            file_name,
            path,
            size: bytes.len() as u64,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
