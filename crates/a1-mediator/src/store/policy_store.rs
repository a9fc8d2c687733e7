//! Policy type and instance operations.
//!
//! The store holds no mutable state of its own. Conflicting type registrations
//! are arbitrated by the SDL's atomic `set_if_not_exists`; everything else is a
//! fixed sequence of single-key calls.
//!
//! Multi-key sequences are ordered, not atomic:
//! - create/replace writes the payload, then the metadata;
//! - delete removes handler statuses and metadata, then the payload.
//!
//! So metadata never outlives or precedes its payload. A failure between the
//! two steps leaves a payload without metadata; the caller sees
//! `StorageUnavailable` and repeating the operation completes it.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use serde_json::Value;

use a1_core::error::{A1Error, Result};
use a1_core::keys::{self, KeyError, RecordKey};
use a1_core::model::{
    EnforcementStatus, HandlerId, HandlerStatus, InstanceMetadata, InstanceStatus, PolicyInstanceId,
    PolicyTypeId, PolicyTypeRecord, PolicyTypeSchema,
};

use super::classify;
use super::values::{decode, encode, epoch_millis};
use crate::config::{ListFailurePolicy, StoreSection};
use crate::obs::StoreMetrics;
use crate::sdl::{SdlResult, SharedDataLayer};

pub struct PolicyStore {
    sdl: Arc<dyn SharedDataLayer>,
    ns: String,
    list_failure: ListFailurePolicy,
    metrics: Arc<StoreMetrics>,
}

impl PolicyStore {
    pub fn new(sdl: Arc<dyn SharedDataLayer>, cfg: &StoreSection, metrics: Arc<StoreMetrics>) -> Self {
        Self {
            sdl,
            ns: cfg.namespace.clone(),
            list_failure: cfg.list_failure,
            metrics,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.ns
    }

    // --------------------
    // Policy types
    // --------------------

    /// Register a type once. The schema must carry the id it is registered under.
    pub async fn register_type(&self, type_id: PolicyTypeId, schema: &PolicyTypeSchema) -> Result<()> {
        let res = self.register_type_once(type_id, schema).await;
        self.record("register_type", &res);
        res
    }

    async fn register_type_once(&self, type_id: PolicyTypeId, schema: &PolicyTypeSchema) -> Result<()> {
        if schema.policy_type_id != type_id.get() {
            tracing::debug!(%type_id, embedded = schema.policy_type_id, "policy type mismatch");
            return Err(A1Error::TypeMismatch {
                addressed: type_id,
                embedded: schema.policy_type_id,
            });
        }

        let key = keys::type_key(type_id);
        let record = PolicyTypeRecord {
            schema: schema.clone(),
            created_at: epoch_millis(),
        };
        let value = encode(&record)?;

        let written = self
            .call("set_if_not_exists", &key, self.sdl.set_if_not_exists(&self.ns, &key, value))
            .await?;
        if !written {
            tracing::debug!(%type_id, "policy type already exists");
            return Err(A1Error::TypeAlreadyExists(type_id));
        }

        tracing::info!(%type_id, name = %schema.name, "policy type registered");
        Ok(())
    }

    pub async fn get_type(&self, type_id: PolicyTypeId) -> Result<PolicyTypeSchema> {
        let res = self.load_type(type_id).await.map(|r| r.schema);
        self.record("get_type", &res);
        res
    }

    /// Stored record including the registration timestamp.
    pub async fn get_type_record(&self, type_id: PolicyTypeId) -> Result<PolicyTypeRecord> {
        let res = self.load_type(type_id).await;
        self.record("get_type", &res);
        res
    }

    async fn load_type(&self, type_id: PolicyTypeId) -> Result<PolicyTypeRecord> {
        let key = keys::type_key(type_id);
        let raw = self.get(&key).await?.ok_or_else(|| A1Error::type_not_found(type_id))?;
        decode(&key, &raw)
    }

    /// Delete a type that has no instances left.
    pub async fn delete_type(&self, type_id: PolicyTypeId) -> Result<()> {
        let res = self.delete_type_once(type_id).await;
        self.record("delete_type", &res);
        res
    }

    async fn delete_type_once(&self, type_id: PolicyTypeId) -> Result<()> {
        let key = keys::type_key(type_id);
        if self.get(&key).await?.is_none() {
            return Err(A1Error::type_not_found(type_id));
        }

        // Never degrade here: an unreadable namespace must not look empty.
        let has_instances = self
            .scan()
            .await?
            .iter()
            .any(|k| matches!(k, RecordKey::Instance(t, _) if *t == type_id));
        if has_instances {
            return Err(A1Error::TypeNotEmpty(type_id));
        }

        self.call("delete", &key, self.sdl.delete(&self.ns, std::slice::from_ref(&key)))
            .await?;
        tracing::info!(%type_id, "policy type deleted");
        Ok(())
    }

    /// All registered type ids, ascending.
    pub async fn list_types(&self) -> Result<Vec<PolicyTypeId>> {
        let res = self.scan_for_listing("list_types").await.map(|found| {
            let mut ids: Vec<PolicyTypeId> = found
                .into_iter()
                .filter_map(|k| match k {
                    RecordKey::Type(t) => Some(t),
                    _ => None,
                })
                .collect();
            ids.sort_unstable();
            ids
        });
        self.record("list_types", &res);
        res
    }

    // --------------------
    // Policy instances
    // --------------------

    /// Unconditional create or full replace (last writer wins).
    pub async fn create_or_replace_instance(
        &self,
        type_id: PolicyTypeId,
        instance_id: &PolicyInstanceId,
        payload: &Value,
    ) -> Result<()> {
        let res = self.put_instance(type_id, instance_id, payload).await;
        self.record("create_or_replace_instance", &res);
        res
    }

    async fn put_instance(&self, type_id: PolicyTypeId, instance_id: &PolicyInstanceId, payload: &Value) -> Result<()> {
        if let Some(embedded) = payload.get("policy_type_id") {
            match embedded.as_u64() {
                Some(n) if n == type_id.get() => {}
                Some(n) => return Err(A1Error::TypeMismatch { addressed: type_id, embedded: n }),
                None => {
                    return Err(A1Error::BadRequest("policy_type_id must be a positive integer".into()));
                }
            }
        }

        let type_key = keys::type_key(type_id);
        if self.get(&type_key).await?.is_none() {
            return Err(A1Error::type_not_found(type_id));
        }

        let key = keys::instance_key(type_id, instance_id);
        let replacing = self.get(&key).await?.is_some();

        // Every create is a new declaration: acknowledgements left from a replaced
        // instance, or orphaned by a status write racing a delete, no longer apply.
        let stale = self.handler_keys(type_id, instance_id).await?;
        if !stale.is_empty() {
            tracing::debug!(%type_id, %instance_id, stale = stale.len(), replacing, "clearing handler statuses");
            self.call("delete", &key, self.sdl.delete(&self.ns, &stale)).await?;
        }

        let value = encode(payload)?;
        self.call("set", &key, self.sdl.set(&self.ns, &key, value)).await?;

        let meta_key = keys::metadata_key(type_id, instance_id);
        let meta = encode(&InstanceMetadata { created_at: epoch_millis() })?;
        self.call("set", &meta_key, self.sdl.set(&self.ns, &meta_key, meta)).await?;

        tracing::info!(%type_id, %instance_id, replacing, "policy instance stored");
        Ok(())
    }

    pub async fn get_instance(&self, type_id: PolicyTypeId, instance_id: &PolicyInstanceId) -> Result<Value> {
        let res = self.load_instance(type_id, instance_id).await;
        self.record("get_instance", &res);
        res
    }

    async fn load_instance(&self, type_id: PolicyTypeId, instance_id: &PolicyInstanceId) -> Result<Value> {
        let key = keys::instance_key(type_id, instance_id);
        let raw = self
            .get(&key)
            .await?
            .ok_or_else(|| A1Error::instance_not_found(type_id, instance_id))?;
        decode(&key, &raw)
    }

    pub async fn delete_instance(&self, type_id: PolicyTypeId, instance_id: &PolicyInstanceId) -> Result<()> {
        let res = self.remove_instance(type_id, instance_id).await;
        self.record("delete_instance", &res);
        res
    }

    async fn remove_instance(&self, type_id: PolicyTypeId, instance_id: &PolicyInstanceId) -> Result<()> {
        let key = keys::instance_key(type_id, instance_id);
        if self.get(&key).await?.is_none() {
            return Err(A1Error::instance_not_found(type_id, instance_id));
        }

        let mut dependents = self.handler_keys(type_id, instance_id).await?;
        dependents.push(keys::metadata_key(type_id, instance_id));
        self.call("delete", &key, self.sdl.delete(&self.ns, &dependents)).await?;
        self.call("delete", &key, self.sdl.delete(&self.ns, std::slice::from_ref(&key)))
            .await?;

        tracing::info!(%type_id, %instance_id, "policy instance deleted");
        Ok(())
    }

    /// Instance ids of one type, ascending.
    pub async fn list_instances(&self, type_id: PolicyTypeId) -> Result<Vec<PolicyInstanceId>> {
        let res = self.scan_for_listing("list_instances").await.map(|found| {
            let mut ids: Vec<PolicyInstanceId> = found
                .into_iter()
                .filter_map(|k| match k {
                    RecordKey::Instance(t, i) if t == type_id => Some(i),
                    _ => None,
                })
                .collect();
            ids.sort_unstable();
            ids
        });
        self.record("list_instances", &res);
        res
    }

    // --------------------
    // Handler statuses
    // --------------------

    /// Store one handler's acknowledgement for an existing instance.
    pub async fn record_handler_status(
        &self,
        type_id: PolicyTypeId,
        instance_id: &PolicyInstanceId,
        handler_id: &HandlerId,
        status: HandlerStatus,
    ) -> Result<()> {
        let res = self.put_handler_status(type_id, instance_id, handler_id, status).await;
        self.record("record_handler_status", &res);
        res
    }

    async fn put_handler_status(
        &self,
        type_id: PolicyTypeId,
        instance_id: &PolicyInstanceId,
        handler_id: &HandlerId,
        status: HandlerStatus,
    ) -> Result<()> {
        let instance = keys::instance_key(type_id, instance_id);
        if self.get(&instance).await?.is_none() {
            return Err(A1Error::instance_not_found(type_id, instance_id));
        }
        let key = keys::handler_key(type_id, instance_id, handler_id);
        let value = encode(&status)?;
        self.call("set", &key, self.sdl.set(&self.ns, &key, value)).await?;
        tracing::debug!(%type_id, %instance_id, %handler_id, ?status, "handler status recorded");
        Ok(())
    }

    /// Aggregated status. Once every reporting handler said `DELETED` the
    /// instance is removed and reported as not found.
    pub async fn instance_status(&self, type_id: PolicyTypeId, instance_id: &PolicyInstanceId) -> Result<InstanceStatus> {
        let res = self.aggregate_status(type_id, instance_id).await;
        self.record("instance_status", &res);
        res
    }

    async fn aggregate_status(&self, type_id: PolicyTypeId, instance_id: &PolicyInstanceId) -> Result<InstanceStatus> {
        let key = keys::instance_key(type_id, instance_id);
        if self.get(&key).await?.is_none() {
            return Err(A1Error::instance_not_found(type_id, instance_id));
        }

        let meta_key = keys::metadata_key(type_id, instance_id);
        let created_at = match self.get(&meta_key).await? {
            Some(raw) => Some(decode::<InstanceMetadata>(&meta_key, &raw)?.created_at),
            None => {
                tracing::warn!(%type_id, %instance_id, "policy instance has no metadata record");
                None
            }
        };

        let mut statuses = Vec::new();
        for hk in self.handler_keys(type_id, instance_id).await? {
            // Gone between scan and read: a concurrent delete or replace won.
            if let Some(raw) = self.get(&hk).await? {
                statuses.push(decode::<HandlerStatus>(&hk, &raw)?);
            }
        }

        if !statuses.is_empty() && statuses.iter().all(|s| *s == HandlerStatus::Deleted) {
            tracing::info!(%type_id, %instance_id, "all handlers deleted the instance, reaping");
            self.remove_instance(type_id, instance_id).await?;
            return Err(A1Error::instance_not_found(type_id, instance_id));
        }

        let instance_status = if statuses.contains(&HandlerStatus::Ok) {
            EnforcementStatus::InEffect
        } else {
            EnforcementStatus::NotInEffect
        };
        Ok(InstanceStatus { instance_status, created_at })
    }

    // --------------------
    // SDL plumbing
    // --------------------

    async fn handler_keys(&self, type_id: PolicyTypeId, instance_id: &PolicyInstanceId) -> Result<Vec<String>> {
        let keys = self
            .scan()
            .await?
            .into_iter()
            .filter(|k| matches!(k, RecordKey::Handler(t, i, _) if *t == type_id && i == instance_id))
            .map(|k| k.encode())
            .collect();
        Ok(keys)
    }

    /// Decode every key of the namespace we own. Foreign and corrupt keys are
    /// skipped: the namespace is shared with other components.
    async fn scan(&self) -> Result<Vec<RecordKey>> {
        let raw = self.call("get_all", &self.ns, self.sdl.get_all(&self.ns)).await?;
        let mut out = Vec::with_capacity(raw.len());
        for k in raw {
            match RecordKey::parse(&k) {
                Ok(key) => out.push(key),
                Err(KeyError::Foreign(_)) => {
                    self.metrics.skipped_keys.inc(&[("reason", "foreign")]);
                }
                Err(err @ KeyError::Corrupt { .. }) => {
                    tracing::debug!(%err, "skipping undecodable key");
                    self.metrics.skipped_keys.inc(&[("reason", "corrupt")]);
                }
            }
        }
        Ok(out)
    }

    /// `scan` under the configured list-failure policy.
    async fn scan_for_listing(&self, op: &'static str) -> Result<Vec<RecordKey>> {
        match self.scan().await {
            Ok(found) => Ok(found),
            Err(err) if self.list_failure == ListFailurePolicy::Degrade => {
                tracing::warn!(op, %err, "list failed, answering with an empty result");
                self.metrics.degraded_lists.inc(&[("op", op)]);
                Ok(Vec::new())
            }
            Err(err) => Err(err),
        }
    }

    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        self.call("get", key, self.sdl.get(&self.ns, key)).await
    }

    /// Time, count and classify one SDL call.
    async fn call<T, F>(&self, op: &'static str, key: &str, fut: F) -> Result<T>
    where
        F: Future<Output = SdlResult<T>>,
    {
        let started = Instant::now();
        let res = fut.await;
        self.metrics.sdl_duration.observe(&[("op", op)], started.elapsed());

        match res {
            Ok(v) => {
                self.metrics.sdl_calls.inc(&[("op", op), ("outcome", "ok")]);
                Ok(v)
            }
            Err(err) => {
                let outcome = if err.is_transient() { "unavailable" } else { "rejected" };
                self.metrics.sdl_calls.inc(&[("op", op), ("outcome", outcome)]);
                tracing::warn!(op, key, %err, "sdl call failed");
                Err(classify(err))
            }
        }
    }

    fn record<T>(&self, op: &'static str, res: &Result<T>) {
        let result = match res {
            Ok(_) => "ok",
            Err(e) => e.kind().as_str(),
        };
        self.metrics.store_ops.inc(&[("op", op), ("result", result)]);
    }
}
