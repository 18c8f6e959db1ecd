use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ShopConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShopConfig {
    /// Printed under the title of every generated document when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

// ---------------------------------------------------------------------------
// StorageConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_clients_file")]
    pub clients_file: String,
    #[serde(default = "default_services_file")]
    pub services_file: String,
    #[serde(default = "default_orders_file")]
    pub orders_file: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_clients_file() -> String {
    paths::CLIENTS_FILE.to_string()
}

fn default_services_file() -> String {
    paths::SERVICES_FILE.to_string()
}

fn default_orders_file() -> String {
    paths::ORDERS_FILE.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            clients_file: default_clients_file(),
            services_file: default_services_file(),
            orders_file: default_orders_file(),
        }
    }
}

impl StorageConfig {
    pub fn clients_path(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.data_dir).join(&self.clients_file)
    }

    pub fn services_path(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.data_dir).join(&self.services_file)
    }

    pub fn orders_path(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.data_dir).join(&self.orders_file)
    }
}

// ---------------------------------------------------------------------------
// DocumentConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_title() -> String {
    "ORDEM DE SERVIÇO".to_string()
}

fn default_currency_symbol() -> String {
    "R$".to_string()
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            title: default_title(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

impl DocumentConfig {
    pub fn output_path(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.output_dir)
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub shop: ShopConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub documents: DocumentConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            shop: ShopConfig::default(),
            storage: StorageConfig::default(),
            documents: DocumentConfig::default(),
        }
    }
}

impl Config {
    /// Load `oficina.yaml` from `root`, falling back to defaults when absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let storage = &self.storage;

        let files = [
            ("clients_file", &storage.clients_file),
            ("services_file", &storage.services_file),
            ("orders_file", &storage.orders_file),
        ];

        for (key, file) in files {
            if file.trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("storage.{key} is empty"),
                });
            } else if !file.ends_with(".csv") {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("storage.{key} '{file}' does not end in .csv"),
                });
            }
        }

        for (i, (key_a, file_a)) in files.iter().enumerate() {
            for (key_b, file_b) in files.iter().skip(i + 1) {
                if !file_a.is_empty() && file_a == file_b {
                    warnings.push(ConfigWarning {
                        level: WarnLevel::Error,
                        message: format!(
                            "storage.{key_a} and storage.{key_b} both point at '{file_a}'"
                        ),
                    });
                }
            }
        }

        if self.documents.title.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "documents.title is empty; generated orders will have no heading"
                    .to_string(),
            });
        }

        if self.documents.currency_symbol.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "documents.currency_symbol is empty".to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
