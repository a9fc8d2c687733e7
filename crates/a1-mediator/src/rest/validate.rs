//! Instance payload checks against the owning type's `create_schema`.

use jsonschema::JSONSchema;
use serde_json::Value;

use a1_core::error::{A1Error, Result};
use a1_core::model::PolicyTypeId;

/// A `create_schema` must compile before the type is registered.
pub fn schema_compiles(type_id: PolicyTypeId, create_schema: &Value) -> Result<()> {
    JSONSchema::compile(create_schema)
        .map(|_| ())
        .map_err(|e| A1Error::BadRequest(format!("create_schema of policy type {type_id} is not a valid schema: {e}")))
}

pub fn conforms(type_id: PolicyTypeId, create_schema: &Value, payload: &Value) -> Result<()> {
    let compiled = JSONSchema::compile(create_schema)
        .map_err(|e| A1Error::Internal(format!("stored create_schema of policy type {type_id} does not compile: {e}")))?;

    if let Err(errors) = compiled.validate(payload) {
        let reasons: Vec<String> = errors.map(|e| e.to_string()).collect();
        tracing::debug!(%type_id, ?reasons, "policy instance rejected by create_schema");
        return Err(A1Error::BadRequest(format!(
            "policy instance does not conform to policy type {type_id}: {}",
            reasons.join("; ")
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;

    use super::*;

    fn window_schema() -> Value {
        json!({
            "type": "object",
            "properties": { "window_length": { "type": "integer", "minimum": 1 } },
            "required": ["window_length"]
        })
    }

    #[test]
    fn conforming_payload_passes() {
        let t = PolicyTypeId::new(20000).unwrap();
        assert!(conforms(t, &window_schema(), &json!({ "window_length": 5 })).is_ok());
    }

    #[test]
    fn violations_are_bad_requests() {
        let t = PolicyTypeId::new(20000).unwrap();
        for payload in [json!({ "window_length": 0 }), json!({}), json!("text")] {
            let err = conforms(t, &window_schema(), &payload).unwrap_err();
            assert!(matches!(err, A1Error::BadRequest(_)), "{payload}");
        }
    }

    #[test]
    fn broken_schema_is_refused_at_registration() {
        let t = PolicyTypeId::new(20000).unwrap();
        assert!(schema_compiles(t, &window_schema()).is_ok());
        let err = schema_compiles(t, &json!({ "type": 12 })).unwrap_err();
        assert!(matches!(err, A1Error::BadRequest(_)));
    }
}
