//! Mediator config loader (strict parsing).

pub mod schema;

use std::fs;

use a1_core::error::{A1Error, Result};

pub use schema::{ListFailurePolicy, MediatorConfig, ServerSection, StoreSection};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "A1_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "a1.yaml";

pub fn load_from_file(path: &str) -> Result<MediatorConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| A1Error::Internal(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<MediatorConfig> {
    let cfg: MediatorConfig = serde_yaml::from_str(s)
        .map_err(|e| A1Error::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
