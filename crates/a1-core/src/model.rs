//! Policy identifiers and the records persisted in the shared namespace.
//!
//! Identifiers are validated on construction so every value that reaches the
//! key codec encodes to exactly one key and decodes back to itself.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{A1Error, Result};

/// Longest accepted instance / handler id, in bytes.
pub const MAX_ID_BYTES: usize = 256;

/// Positive integer id of a policy type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct PolicyTypeId(u64);

impl PolicyTypeId {
    pub fn new(raw: u64) -> Result<Self> {
        if raw == 0 {
            return Err(A1Error::BadRequest("policy type id must be positive".into()));
        }
        Ok(Self(raw))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for PolicyTypeId {
    type Error = A1Error;

    fn try_from(raw: u64) -> Result<Self> {
        Self::new(raw)
    }
}

impl From<PolicyTypeId> for u64 {
    fn from(id: PolicyTypeId) -> u64 {
        id.0
    }
}

impl fmt::Display for PolicyTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Checks a free-form id segment: non-empty, bounded, no `.` and no whitespace.
/// `.` separates key segments, so allowing it would make keys ambiguous.
fn validate_segment(what: &str, raw: &str) -> Result<()> {
    if raw.is_empty() {
        return Err(A1Error::BadRequest(format!("{what} must not be empty")));
    }
    if raw.len() > MAX_ID_BYTES {
        return Err(A1Error::BadRequest(format!("{what} longer than {MAX_ID_BYTES} bytes")));
    }
    if raw.chars().any(|c| c == '.' || c.is_whitespace() || c.is_control()) {
        return Err(A1Error::BadRequest(format!(
            "{what} must not contain '.', whitespace or control characters: {raw:?}"
        )));
    }
    Ok(())
}

macro_rules! segment_id {
    ($(#[$meta:meta])* $name:ident, $what:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn new(raw: impl Into<String>) -> Result<Self> {
                let raw = raw.into();
                validate_segment($what, &raw)?;
                Ok(Self(raw))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = A1Error;

            fn try_from(raw: String) -> Result<Self> {
                Self::new(raw)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

segment_id!(
    /// Opaque id of a policy instance, unique within its type.
    PolicyInstanceId,
    "policy instance id"
);
segment_id!(
    /// Id of a downstream handler reporting instance statuses.
    HandlerId,
    "handler id"
);

/// Policy type registration body.
///
/// Fields beyond the known ones are kept and returned unchanged on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyTypeSchema {
    /// Must equal the id the type is registered under.
    pub policy_type_id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// JSON schema for instances (opaque to the store).
    pub create_schema: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Value stored under a type key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyTypeRecord {
    pub schema: PolicyTypeSchema,
    /// Unix epoch milliseconds; fixed at registration.
    pub created_at: u64,
}

/// Value stored under a metadata key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceMetadata {
    /// Unix epoch milliseconds of the latest create/replace.
    pub created_at: u64,
}

/// Status reported by one handler for one instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HandlerStatus {
    Ok,
    Error,
    Deleted,
}

/// Aggregated enforcement state of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnforcementStatus {
    #[serde(rename = "IN EFFECT")]
    InEffect,
    #[serde(rename = "NOT IN EFFECT")]
    NotInEffect,
}

/// Instance status view returned to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceStatus {
    pub instance_status: EnforcementStatus,
    /// Absent while the metadata record is missing (interrupted create).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<u64>,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn type_id_rejects_zero() {
        assert!(PolicyTypeId::new(0).is_err());
        assert_eq!(PolicyTypeId::new(20000).unwrap().get(), 20000);
    }

    #[test]
    fn instance_id_rejects_separator_and_whitespace() {
        assert!(PolicyInstanceId::new("qos").is_ok());
        assert!(PolicyInstanceId::new("").is_err());
        assert!(PolicyInstanceId::new("a.b").is_err());
        assert!(PolicyInstanceId::new("a b").is_err());
        assert!(HandlerId::new("x".repeat(MAX_ID_BYTES + 1)).is_err());
    }

    #[test]
    fn ids_deserialize_through_validation() {
        let bad: std::result::Result<PolicyInstanceId, _> = serde_json::from_str("\"x.y\"");
        assert!(bad.is_err());
        let bad: std::result::Result<PolicyTypeId, _> = serde_json::from_str("0");
        assert!(bad.is_err());
    }

    #[test]
    fn type_schema_keeps_extra_fields() {
        let body = serde_json::json!({
            "policy_type_id": 20000,
            "name": "Admission Control",
            "create_schema": { "type": "object" },
            "vendor": { "owner": "ran" }
        });
        let schema: PolicyTypeSchema = serde_json::from_value(body.clone()).unwrap();
        assert_eq!(schema.extra["vendor"]["owner"], "ran");
        assert_eq!(schema.description, "");

        let mut expected = body;
        expected["description"] = serde_json::json!("");
        assert_eq!(serde_json::to_value(&schema).unwrap(), expected);
    }

    #[test]
    fn status_wire_names() {
        assert_eq!(serde_json::to_string(&HandlerStatus::Ok).unwrap(), "\"OK\"");
        assert_eq!(serde_json::to_string(&EnforcementStatus::NotInEffect).unwrap(), "\"NOT IN EFFECT\"");
    }
}
