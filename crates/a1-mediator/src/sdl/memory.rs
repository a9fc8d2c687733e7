//! In-process SDL backend for development and tests.

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::{SdlResult, SharedDataLayer};

/// `namespace -> key -> value`, backed by `DashMap`.
#[derive(Default)]
pub struct InMemorySdl {
    namespaces: DashMap<String, DashMap<String, Bytes>>,
}

impl InMemorySdl {
    pub fn new() -> Self {
        Self {
            namespaces: DashMap::new(),
        }
    }

    /// Number of keys held in `ns`.
    pub fn len(&self, ns: &str) -> usize {
        self.namespaces.get(ns).map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self, ns: &str) -> bool {
        self.len(ns) == 0
    }
}

#[async_trait]
impl SharedDataLayer for InMemorySdl {
    async fn get(&self, ns: &str, key: &str) -> SdlResult<Option<Bytes>> {
        let Some(map) = self.namespaces.get(ns) else { return Ok(None); };
        let value = map.get(key).map(|v| v.value().clone());
        Ok(value)
    }

    async fn get_all(&self, ns: &str) -> SdlResult<Vec<String>> {
        let Some(map) = self.namespaces.get(ns) else { return Ok(vec![]); };
        let keys = map.iter().map(|e| e.key().clone()).collect();
        Ok(keys)
    }

    async fn set(&self, ns: &str, key: &str, value: Bytes) -> SdlResult<()> {
        self.namespaces
            .entry(ns.to_string())
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }

    async fn set_if_not_exists(&self, ns: &str, key: &str, value: Bytes) -> SdlResult<bool> {
        let map = self.namespaces.entry(ns.to_string()).or_default();
        // entry() holds the shard lock, so check-and-insert is one step.
        let written = match map.entry(key.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
        };
        Ok(written)
    }

    async fn delete(&self, ns: &str, keys: &[String]) -> SdlResult<()> {
        let Some(map) = self.namespaces.get(ns) else { return Ok(()); };
        for k in keys {
            map.remove(k);
        }
        Ok(())
    }
}
