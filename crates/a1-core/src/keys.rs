//! Key codec for the shared namespace.
//!
//! Every record this service writes lives in one flat namespace next to
//! entries owned by other components. Each record kind gets its own prefix and
//! no prefix is a prefix of another, so classification is mutually exclusive:
//!
//! ```text
//! a1.policy_type.<type>
//! a1.policy_instance.<type>.<instance>
//! a1.policy_inst_metadata.<type>.<instance>
//! a1.policy_handler.<type>.<instance>.<handler>
//! ```
//!
//! The prefixes are persisted state. Changing one is a data migration.

use std::fmt;

use thiserror::Error;

use crate::model::{HandlerId, PolicyInstanceId, PolicyTypeId};

pub const TYPE_PREFIX: &str = "a1.policy_type.";
pub const INSTANCE_PREFIX: &str = "a1.policy_instance.";
pub const METADATA_PREFIX: &str = "a1.policy_inst_metadata.";
pub const HANDLER_PREFIX: &str = "a1.policy_handler.";

/// Record kind carried by a key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    Type,
    Instance,
    Metadata,
    Handler,
}

impl KeyKind {
    pub const ALL: [KeyKind; 4] = [KeyKind::Type, KeyKind::Instance, KeyKind::Metadata, KeyKind::Handler];

    pub fn prefix(self) -> &'static str {
        match self {
            KeyKind::Type => TYPE_PREFIX,
            KeyKind::Instance => INSTANCE_PREFIX,
            KeyKind::Metadata => METADATA_PREFIX,
            KeyKind::Handler => HANDLER_PREFIX,
        }
    }

    /// Classify a raw key by exact prefix match, ignoring surrounding whitespace
    /// the storage layer may have introduced. `None` means the key is not ours.
    pub fn of(raw: &str) -> Option<KeyKind> {
        let key = raw.trim();
        KeyKind::ALL.into_iter().find(|k| key.starts_with(k.prefix()))
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            KeyKind::Type => "policy type",
            KeyKind::Instance => "policy instance",
            KeyKind::Metadata => "instance metadata",
            KeyKind::Handler => "handler status",
        };
        f.write_str(s)
    }
}

/// Key decoding failures. Never surfaced to clients: listing skips such keys.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// Key carries one of our prefixes but the remainder does not decode.
    #[error("corrupt {kind} key {key:?}: {reason}")]
    Corrupt {
        kind: KeyKind,
        key: String,
        reason: &'static str,
    },
    /// Key belongs to some other tenant of the namespace.
    #[error("foreign key {0:?}")]
    Foreign(String),
}

/// Typed view of every key the store writes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordKey {
    Type(PolicyTypeId),
    Instance(PolicyTypeId, PolicyInstanceId),
    Metadata(PolicyTypeId, PolicyInstanceId),
    Handler(PolicyTypeId, PolicyInstanceId, HandlerId),
}

impl RecordKey {
    pub fn kind(&self) -> KeyKind {
        match self {
            RecordKey::Type(_) => KeyKind::Type,
            RecordKey::Instance(..) => KeyKind::Instance,
            RecordKey::Metadata(..) => KeyKind::Metadata,
            RecordKey::Handler(..) => KeyKind::Handler,
        }
    }

    pub fn encode(&self) -> String {
        match self {
            RecordKey::Type(t) => format!("{TYPE_PREFIX}{t}"),
            RecordKey::Instance(t, i) => format!("{INSTANCE_PREFIX}{t}.{i}"),
            RecordKey::Metadata(t, i) => format!("{METADATA_PREFIX}{t}.{i}"),
            RecordKey::Handler(t, i, h) => format!("{HANDLER_PREFIX}{t}.{i}.{h}"),
        }
    }

    /// Decode a raw key from the namespace.
    pub fn parse(raw: &str) -> Result<RecordKey, KeyError> {
        let key = raw.trim();
        let kind = KeyKind::of(key).ok_or_else(|| KeyError::Foreign(raw.to_string()))?;
        let rest = &key[kind.prefix().len()..];
        let corrupt = |reason| KeyError::Corrupt { kind, key: raw.to_string(), reason };

        match kind {
            KeyKind::Type => parse_type_segment(rest).map(RecordKey::Type).ok_or_else(|| corrupt("bad type id")),
            KeyKind::Instance | KeyKind::Metadata => {
                let (t, i) = rest.split_once('.').ok_or_else(|| corrupt("missing instance id"))?;
                let t = parse_type_segment(t).ok_or_else(|| corrupt("bad type id"))?;
                let i = PolicyInstanceId::new(i).map_err(|_| corrupt("bad instance id"))?;
                Ok(if kind == KeyKind::Instance {
                    RecordKey::Instance(t, i)
                } else {
                    RecordKey::Metadata(t, i)
                })
            }
            KeyKind::Handler => {
                let mut parts = rest.splitn(3, '.');
                let (Some(t), Some(i), Some(h)) = (parts.next(), parts.next(), parts.next()) else {
                    return Err(corrupt("expected type.instance.handler"));
                };
                let t = parse_type_segment(t).ok_or_else(|| corrupt("bad type id"))?;
                let i = PolicyInstanceId::new(i).map_err(|_| corrupt("bad instance id"))?;
                let h = HandlerId::new(h).map_err(|_| corrupt("bad handler id"))?;
                Ok(RecordKey::Handler(t, i, h))
            }
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

/// Canonical base-10 only: no sign, no leading zeros, no zero.
fn parse_type_segment(s: &str) -> Option<PolicyTypeId> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) || s.starts_with('0') {
        return None;
    }
    s.parse::<u64>().ok().and_then(|n| PolicyTypeId::new(n).ok())
}

pub fn type_key(type_id: PolicyTypeId) -> String {
    RecordKey::Type(type_id).encode()
}

pub fn instance_key(type_id: PolicyTypeId, instance_id: &PolicyInstanceId) -> String {
    RecordKey::Instance(type_id, instance_id.clone()).encode()
}

pub fn metadata_key(type_id: PolicyTypeId, instance_id: &PolicyInstanceId) -> String {
    RecordKey::Metadata(type_id, instance_id.clone()).encode()
}

pub fn handler_key(type_id: PolicyTypeId, instance_id: &PolicyInstanceId, handler_id: &HandlerId) -> String {
    RecordKey::Handler(type_id, instance_id.clone(), handler_id.clone()).encode()
}

/// Decode a key already known to be a type key.
pub fn decode_type_id(raw: &str) -> Result<PolicyTypeId, KeyError> {
    match RecordKey::parse(raw)? {
        RecordKey::Type(t) => Ok(t),
        other => Err(KeyError::Corrupt {
            kind: other.kind(),
            key: raw.to_string(),
            reason: "not a policy type key",
        }),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn t(n: u64) -> PolicyTypeId {
        PolicyTypeId::new(n).unwrap()
    }

    #[test]
    fn no_prefix_shadows_another() {
        for a in KeyKind::ALL {
            for b in KeyKind::ALL {
                if a != b {
                    assert!(!a.prefix().starts_with(b.prefix()), "{a} shadowed by {b}");
                }
            }
        }
    }

    #[test]
    fn type_id_roundtrip_over_range() {
        for n in (1..=2_000u64).chain([20000, 1006001, u32::MAX as u64, u64::MAX]) {
            assert_eq!(decode_type_id(&type_key(t(n))).unwrap(), t(n));
        }
    }

    #[test]
    fn non_canonical_type_ids_are_corrupt() {
        for raw in ["a1.policy_type.", "a1.policy_type.007", "a1.policy_type.+7", "a1.policy_type.0", "a1.policy_type.1x"] {
            assert!(matches!(decode_type_id(raw), Err(KeyError::Corrupt { .. })), "{raw}");
        }
    }

    #[test]
    fn numeric_instance_ids_never_look_like_types() {
        let i = PolicyInstanceId::new("20000").unwrap();
        assert_eq!(KeyKind::of(&instance_key(t(1), &i)), Some(KeyKind::Instance));
        assert_eq!(KeyKind::of(&metadata_key(t(1), &i)), Some(KeyKind::Metadata));
        assert!(decode_type_id(&instance_key(t(1), &i)).is_err());
    }

    #[test]
    fn whitespace_is_trimmed_before_matching() {
        assert_eq!(decode_type_id("  a1.policy_type.20000 ").unwrap(), t(20000));
        assert!(matches!(RecordKey::parse("other.app.key"), Err(KeyError::Foreign(_))));
    }
}
