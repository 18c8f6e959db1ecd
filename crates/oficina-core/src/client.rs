use crate::error::{OficinaError, Result};
use crate::registry::{Entity, Registry};
use crate::store::{Record, Schema};
use serde::{Deserialize, Serialize};

pub const COL_NAME: &str = "nome";
pub const COL_PHONE: &str = "telefone";
pub const COL_ADDRESS: &str = "endereco";

pub type ClientRegistry = Registry<Client>;

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "telefone")]
    pub phone: String,
    /// Free text, may span several lines.
    #[serde(rename = "endereco")]
    pub address: String,
}

impl Client {
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            address: address.into(),
        }
    }
}

impl Entity for Client {
    const SCHEMA: Schema = Schema {
        table: "clientes",
        columns: &[COL_NAME, COL_PHONE, COL_ADDRESS],
    };

    fn to_record(&self) -> Record {
        crate::store::record([
            (COL_NAME, self.name.as_str()),
            (COL_PHONE, self.phone.as_str()),
            (COL_ADDRESS, self.address.as_str()),
        ])
    }

    fn from_record(_position: usize, record: &Record) -> Result<Self> {
        let field = |c: &str| record.get(c).cloned().unwrap_or_default();
        Ok(Self {
            name: field(COL_NAME),
            phone: field(COL_PHONE),
            address: field(COL_ADDRESS),
        })
    }

    fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("name", &self.name),
            ("phone", &self.phone),
            ("address", &self.address),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(k, _)| k)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(OficinaError::Validation(format!(
                "all client fields are required (missing: {})",
                missing.join(", ")
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// ClientUpdate
// ---------------------------------------------------------------------------

/// Field-level edit; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct ClientUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl ClientUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.address.is_none()
    }

    pub fn into_changes(self) -> Record {
        [
            (COL_NAME, self.name),
            (COL_PHONE, self.phone),
            (COL_ADDRESS, self.address),
        ]
        .into_iter()
        .filter_map(|(c, v)| v.map(|v| (c.to_string(), v)))
        .collect()
    }
}

impl Registry<Client> {
    /// First client whose name matches exactly. Names are not unique.
    pub fn find_by_name(&self, name: &str) -> Result<Option<(usize, Client)>> {
        self.find(|c| c.name == name)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
