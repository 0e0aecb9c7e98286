use std::collections::BTreeMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rudby_catalog::{DEFAULT_COLLECTION, DEFAULT_COUNTER_KEY};
use rudby_gate::GateConfig;
use rudby_store::{FileDurableStore, InMemoryDurableStore, StoreHandle};
use serde::{Deserialize, Serialize};

use crate::auth::StaticTokenAuth;
use crate::error::{ServerError, ServerResult};

pub const DEFAULT_PORT: u16 = 2704;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Key of the persistent serial-number counter.
    pub counter_key: String,
    /// Store collection holding the catalog records.
    pub collection: String,
    pub storage: StorageConfig,
    /// Bearer token -> principal id.
    pub tokens: BTreeMap<String, String>,
    pub gate: GateConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            counter_key: DEFAULT_COUNTER_KEY.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            storage: StorageConfig::default(),
            tokens: BTreeMap::new(),
            gate: GateConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(source: &str) -> ServerResult<Self> {
        toml::from_str(source).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    pub fn to_toml_string(&self) -> ServerResult<String> {
        toml::to_string_pretty(self).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn auth(&self) -> StaticTokenAuth {
        self.tokens
            .iter()
            .map(|(token, principal)| (token.as_str(), principal.as_str()))
            .collect()
    }
}

/// Where the catalog keeps its data.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StorageConfig {
    /// Process-local; everything is lost on exit.
    #[default]
    Memory,
    /// A JSON snapshot file rewritten atomically on every mutation.
    File { path: PathBuf },
}

impl StorageConfig {
    /// Open the configured store.
    pub async fn open(&self) -> ServerResult<StoreHandle> {
        let store: StoreHandle = match self {
            Self::Memory => Arc::new(InMemoryDurableStore::new()),
            Self::File { path } => Arc::new(FileDurableStore::open(path).await?),
        };
        Ok(store)
    }
}
