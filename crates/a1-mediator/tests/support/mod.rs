//! Spy / fault-injecting SDL shared by mediator tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;

use a1_core::model::{PolicyTypeId, PolicyTypeSchema};
use a1_mediator::config::{ListFailurePolicy, StoreSection};
use a1_mediator::obs::StoreMetrics;
use a1_mediator::sdl::{InMemorySdl, SdlError, SdlResult, SharedDataLayer};
use a1_mediator::store::PolicyStore;

pub const NS: &str = "A1m_ns";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub op: &'static str,
    pub keys: Vec<String>,
}

struct Fault {
    op: &'static str,
    key_prefix: Option<String>,
    err: SdlError,
}

/// Wraps `InMemorySdl`, records every call and fails the ones matching a fault.
#[derive(Default)]
pub struct SpySdl {
    inner: InMemorySdl,
    calls: Mutex<Vec<Call>>,
    faults: Mutex<Vec<Fault>>,
}

impl SpySdl {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Fail every call of `op`.
    pub fn fail(&self, op: &'static str, err: SdlError) {
        self.faults.lock().unwrap().push(Fault { op, key_prefix: None, err });
    }

    /// Fail calls of `op` touching a key that starts with `prefix`.
    pub fn fail_key(&self, op: &'static str, prefix: &str, err: SdlError) {
        self.faults.lock().unwrap().push(Fault {
            op,
            key_prefix: Some(prefix.to_string()),
            err,
        });
    }

    pub fn heal(&self) {
        self.faults.lock().unwrap().clear();
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, op: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.op == op).count()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn backend(&self) -> &InMemorySdl {
        &self.inner
    }

    /// Write raw keys straight into the backend, bypassing spying and faults.
    pub async fn seed(&self, keys: &[&str]) {
        for k in keys {
            self.inner.set(NS, k, Bytes::from_static(b"{}")).await.unwrap();
        }
    }

    /// Write one raw key/value straight into the backend.
    pub async fn seed_value(&self, key: &str, value: &str) {
        self.inner.set(NS, key, Bytes::from(value.to_string())).await.unwrap();
    }

    fn enter(&self, op: &'static str, keys: &[String]) -> SdlResult<()> {
        self.calls.lock().unwrap().push(Call { op, keys: keys.to_vec() });
        let faults = self.faults.lock().unwrap();
        let hit = faults.iter().find(|f| {
            f.op == op
                && match &f.key_prefix {
                    None => true,
                    Some(p) => keys.iter().any(|k| k.starts_with(p.as_str())),
                }
        });
        match hit {
            Some(f) => Err(f.err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SharedDataLayer for SpySdl {
    async fn get(&self, ns: &str, key: &str) -> SdlResult<Option<Bytes>> {
        self.enter("get", &[key.to_string()])?;
        self.inner.get(ns, key).await
    }

    async fn get_all(&self, ns: &str) -> SdlResult<Vec<String>> {
        self.enter("get_all", &[])?;
        self.inner.get_all(ns).await
    }

    async fn set(&self, ns: &str, key: &str, value: Bytes) -> SdlResult<()> {
        self.enter("set", &[key.to_string()])?;
        self.inner.set(ns, key, value).await
    }

    async fn set_if_not_exists(&self, ns: &str, key: &str, value: Bytes) -> SdlResult<bool> {
        self.enter("set_if_not_exists", &[key.to_string()])?;
        self.inner.set_if_not_exists(ns, key, value).await
    }

    async fn delete(&self, ns: &str, keys: &[String]) -> SdlResult<()> {
        self.enter("delete", keys)?;
        self.inner.delete(ns, keys).await
    }
}

pub fn store_over(spy: &Arc<SpySdl>, list_failure: ListFailurePolicy) -> PolicyStore {
    let cfg = StoreSection {
        namespace: NS.to_string(),
        list_failure,
    };
    PolicyStore::new(spy.clone(), &cfg, Arc::new(StoreMetrics::default()))
}

pub fn type_id(n: u64) -> PolicyTypeId {
    PolicyTypeId::new(n).unwrap()
}

/// Admission control type used across tests.
pub fn adm_type(id: u64) -> PolicyTypeSchema {
    serde_json::from_value(serde_json::json!({
        "name": "Admission Control",
        "description": "various parameters to control admission of dual connection",
        "policy_type_id": id,
        "create_schema": {
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "properties": {
                "enforce": { "type": "boolean", "default": true },
                "window_length": { "type": "integer", "minimum": 1, "maximum": 60 },
                "blocking_rate": { "type": "number", "minimum": 1, "maximum": 100 },
                "trigger_threshold": { "type": "integer", "minimum": 1 }
            },
            "required": ["enforce", "blocking_rate", "trigger_threshold", "window_length"],
            "additionalProperties": false
        }
    }))
    .unwrap()
}

pub fn adm_instance(window_length: u64) -> serde_json::Value {
    serde_json::json!({
        "enforce": true,
        "window_length": window_length,
        "blocking_rate": 20,
        "trigger_threshold": 10
    })
}
