//! Key codec vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::HashSet;

use a1_core::keys::{self, KeyError, KeyKind, RecordKey};
use a1_core::model::{HandlerId, PolicyInstanceId, PolicyTypeId};

mod vector_loader;
use vector_loader::load;

fn kind_name(kind: KeyKind) -> &'static str {
    match kind {
        KeyKind::Type => "type",
        KeyKind::Instance => "instance",
        KeyKind::Metadata => "metadata",
        KeyKind::Handler => "handler",
    }
}

#[test]
fn valid_key_vectors() {
    for v in load("keys_valid.json") {
        let ex = v.expect.expect("missing expect block");
        let parsed = RecordKey::parse(&v.key).unwrap_or_else(|e| panic!("vector={}: {e}", v.description));

        assert_eq!(kind_name(parsed.kind()), ex.kind, "vector={}", v.description);
        assert_eq!(KeyKind::of(&v.key), Some(parsed.kind()), "vector={}", v.description);

        let type_id = PolicyTypeId::new(ex.type_id).unwrap();
        let expected = match ex.kind.as_str() {
            "type" => RecordKey::Type(type_id),
            "instance" => RecordKey::Instance(type_id, PolicyInstanceId::new(ex.instance_id.clone().unwrap()).unwrap()),
            "metadata" => RecordKey::Metadata(type_id, PolicyInstanceId::new(ex.instance_id.clone().unwrap()).unwrap()),
            "handler" => RecordKey::Handler(
                type_id,
                PolicyInstanceId::new(ex.instance_id.clone().unwrap()).unwrap(),
                HandlerId::new(ex.handler_id.clone().unwrap()).unwrap(),
            ),
            other => panic!("unknown kind {other}"),
        };
        assert_eq!(parsed, expected, "vector={}", v.description);

        let encoded = ex.encoded.unwrap_or_else(|| v.key.clone());
        assert_eq!(parsed.encode(), encoded, "vector={}", v.description);
    }
}

#[test]
fn invalid_key_vectors() {
    for v in load("keys_invalid.json") {
        let code = v.expect_error.expect("missing expect_error block").code;
        let err = RecordKey::parse(&v.key).expect_err("expected error");
        let got = match err {
            KeyError::Corrupt { .. } => "CORRUPT",
            KeyError::Foreign(_) => "FOREIGN",
        };
        assert_eq!(got, code, "vector={}", v.description);
    }
}

#[test]
fn type_scan_matches_reference_namespace() {
    let namespace = [
        "a1.policy_instance.1006001.qos",
        "a1.policy_type.1006001",
        "a1.policy_type.20000",
        "a1.policy_inst_metadata.1006001.qos",
    ];
    let ids: HashSet<u64> = namespace
        .iter()
        .filter(|k| KeyKind::of(k) == Some(KeyKind::Type))
        .filter_map(|k| keys::decode_type_id(k).ok())
        .map(PolicyTypeId::get)
        .collect();
    assert_eq!(ids, HashSet::from([1006001, 20000]));
}

#[test]
fn encoders_agree_with_record_key() {
    let t = PolicyTypeId::new(20000).unwrap();
    let i = PolicyInstanceId::new("qos").unwrap();
    let h = HandlerId::new("xapp").unwrap();
    assert_eq!(keys::type_key(t), "a1.policy_type.20000");
    assert_eq!(keys::instance_key(t, &i), "a1.policy_instance.20000.qos");
    assert_eq!(keys::metadata_key(t, &i), "a1.policy_inst_metadata.20000.qos");
    assert_eq!(keys::handler_key(t, &i, &h), "a1.policy_handler.20000.qos.xapp");
}
