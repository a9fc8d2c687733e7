//! JSON test vector loader shared by key codec tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::fs;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct KeyVector {
    pub description: String,
    pub key: String,
    #[serde(default)]
    pub expect: Option<ExpectKey>,
    #[serde(default)]
    pub expect_error: Option<ExpectError>,
}

#[derive(Debug, Deserialize)]
pub struct ExpectKey {
    pub kind: String,
    pub type_id: u64,
    #[serde(default)]
    pub instance_id: Option<String>,
    #[serde(default)]
    pub handler_id: Option<String>,
    /// Canonical encoding, when it differs from the raw key (e.g. trimmed).
    #[serde(default)]
    pub encoded: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExpectError {
    pub code: String,
}

pub fn load(name: &str) -> Vec<KeyVector> {
    let s = fs::read_to_string(format!("tests/vectors/{name}")).unwrap();
    serde_json::from_str(&s).unwrap()
}
