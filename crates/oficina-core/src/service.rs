use crate::error::{OficinaError, Result};
use crate::registry::{Entity, Registry};
use crate::store::{Record, Schema};
use serde::{Deserialize, Serialize};

pub const COL_DESCRIPTION: &str = "descricao";
pub const COL_PRICE: &str = "valor";

pub type ServiceCatalog = Registry<Service>;

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "valor")]
    pub price: f64,
}

impl Service {
    pub fn new(description: impl Into<String>, price: f64) -> Self {
        Self {
            description: description.into(),
            price,
        }
    }
}

impl Entity for Service {
    const SCHEMA: Schema = Schema {
        table: "servicos",
        columns: &[COL_DESCRIPTION, COL_PRICE],
    };

    fn to_record(&self) -> Record {
        crate::store::record([
            (COL_DESCRIPTION, self.description.as_str()),
            (COL_PRICE, price_cell(self.price).as_str()),
        ])
    }

    fn from_record(position: usize, record: &Record) -> Result<Self> {
        let raw = record.get(COL_PRICE).map(String::as_str).unwrap_or("");
        let price = parse_price(raw).ok_or_else(|| OficinaError::InvalidRecord {
            table: Self::SCHEMA.table.to_string(),
            position,
            reason: format!("price '{raw}' is not a number"),
        })?;
        Ok(Self {
            description: record.get(COL_DESCRIPTION).cloned().unwrap_or_default(),
            price,
        })
    }

    fn validate(&self) -> Result<()> {
        if self.description.trim().is_empty() {
            return Err(OficinaError::Validation(
                "service description is required".to_string(),
            ));
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(OficinaError::Validation(format!(
                "service price must be greater than zero (got {})",
                self.price
            )));
        }
        Ok(())
    }
}

/// Price as written to the table: floats always carry a fractional part
/// (`150.0`, `99.9`), matching files produced by earlier versions.
pub fn price_cell(price: f64) -> String {
    if price.fract() == 0.0 && price.abs() < 1e15 {
        format!("{price:.1}")
    } else {
        format!("{price}")
    }
}

/// Accepts `150`, `150.0` and the comma decimal separator (`150,50`).
pub fn parse_price(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    raw.parse::<f64>()
        .or_else(|_| raw.replace(',', ".").parse::<f64>())
        .ok()
}

/// Two-decimal currency rendering, e.g. `R$ 200.00`.
pub fn format_currency(symbol: &str, price: f64) -> String {
    if symbol.is_empty() {
        format!("{price:.2}")
    } else {
        format!("{symbol} {price:.2}")
    }
}

// ---------------------------------------------------------------------------
// ServiceUpdate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct ServiceUpdate {
    pub description: Option<String>,
    pub price: Option<f64>,
}

impl ServiceUpdate {
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.price.is_none()
    }

    pub fn into_changes(self) -> Record {
        let mut changes = Record::new();
        if let Some(d) = self.description {
            changes.insert(COL_DESCRIPTION.to_string(), d);
        }
        if let Some(p) = self.price {
            changes.insert(COL_PRICE.to_string(), price_cell(p));
        }
        changes
    }
}

impl Registry<Service> {
    /// First service whose description matches exactly.
    pub fn find_by_description(&self, description: &str) -> Result<Option<(usize, Service)>> {
        self.find(|s| s.description == description)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
