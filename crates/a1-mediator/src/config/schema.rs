use std::net::SocketAddr;

use serde::Deserialize;
use a1_core::error::{A1Error, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MediatorConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub store: StoreSection,
}

impl MediatorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(A1Error::BadRequest(format!("unsupported config version {}", self.version)));
        }
        self.server.validate()?;
        self.store.validate()?;
        Ok(())
    }
}

impl Default for MediatorConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            store: StoreSection::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self { listen: default_listen() }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr().map(|_| ())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen
            .parse()
            .map_err(|_| A1Error::BadRequest(format!("server.listen must be a socket address: {}", self.listen)))
    }
}

/// What list operations do when the SDL cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListFailurePolicy {
    /// Log and answer with an empty list.
    #[default]
    Degrade,
    /// Return `StorageUnavailable` to the caller.
    Propagate,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSection {
    #[serde(default = "default_namespace")]
    pub namespace: String,

    #[serde(default)]
    pub list_failure: ListFailurePolicy,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            list_failure: ListFailurePolicy::default(),
        }
    }
}

impl StoreSection {
    pub fn validate(&self) -> Result<()> {
        if self.namespace.trim().is_empty() {
            return Err(A1Error::BadRequest("store.namespace must not be empty".into()));
        }
        if self.namespace.trim() != self.namespace {
            return Err(A1Error::BadRequest("store.namespace must not carry surrounding whitespace".into()));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:10000".into()
}
fn default_namespace() -> String {
    "A1m_ns".into()
}
