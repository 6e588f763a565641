//! Moving records across the backend boundary.
//!
//! Outbound: record, then JSON, then the descriptor's outbound transforms.
//! Inbound: wire JSON, then inbound transforms, then the key is taken from
//! the client-shaped JSON, then the record is decoded.

use ens_meta::{extract_identity, EntityDescriptor};
use ens_resolve::HandlerError;
use ens_types::{Identity, Keyed, Operation};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::RuntimeResult;

/// Serialize a record and shape it for the backend.
pub(crate) fn encode<T: Serialize>(descriptor: &EntityDescriptor, record: &T) -> RuntimeResult<Value> {
    let value = serde_json::to_value(record)?;
    Ok(descriptor.transformers().outbound(value))
}

pub(crate) fn encode_all<T: Serialize>(
    descriptor: &EntityDescriptor,
    records: &[T],
) -> RuntimeResult<Vec<Value>> {
    records.iter().map(|r| encode(descriptor, r)).collect()
}

/// Key a client-side record without sending it anywhere.
pub(crate) fn identify<T: Serialize>(descriptor: &EntityDescriptor, record: &T) -> RuntimeResult<Identity> {
    let value = serde_json::to_value(record)?;
    Ok(extract_identity(descriptor, Some(&value))?)
}

/// Reshape, key and decode one backend record.
pub(crate) fn decode<T: DeserializeOwned>(
    descriptor: &EntityDescriptor,
    operation: Operation,
    wire: Value,
) -> RuntimeResult<Keyed<T>> {
    let value = descriptor.transformers().inbound(wire);
    let id = extract_identity(descriptor, Some(&value))?;
    let record = serde_json::from_value(value)
        .map_err(|e| HandlerError::malformed(descriptor.name(), operation, e.to_string()))?;
    Ok(Keyed { id, record })
}

pub(crate) fn decode_all<T: DeserializeOwned>(
    descriptor: &EntityDescriptor,
    operation: Operation,
    wire: Vec<Value>,
) -> RuntimeResult<Vec<Keyed<T>>> {
    wire.into_iter()
        .map(|v| decode(descriptor, operation, v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RuntimeError;
    use ens_meta::{KeyError, Transformer};
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Line {
        order_id: i64,
        line_no: i64,
        sku: String,
    }

    fn line_descriptor() -> EntityDescriptor {
        EntityDescriptor::builder("line")
            .identities(["order_id", "line_no"])
            .transformer(Transformer::new(
                "sku_case",
                |mut v: Value| {
                    if let Some(sku) = v.get("SKU").cloned() {
                        v["sku"] = sku;
                    }
                    v
                },
                |mut v: Value| {
                    if let Some(sku) = v.get("sku").cloned() {
                        v["SKU"] = sku;
                    }
                    v
                },
            ))
            .build()
            .unwrap()
    }

    #[test]
    fn encode_applies_outbound_transforms() {
        let line = Line { order_id: 1, line_no: 2, sku: "A-1".into() };
        let wire = encode(&line_descriptor(), &line).unwrap();
        assert_eq!(wire["SKU"], json!("A-1"));
    }

    #[test]
    fn decode_keys_after_inbound_transforms() {
        let keyed: Keyed<Line> = decode(
            &line_descriptor(),
            Operation::Load,
            json!({"order_id": 1, "line_no": 2, "SKU": "A-1"}),
        )
        .unwrap();
        assert_eq!(keyed.id, Identity::from("1_2"));
        assert_eq!(keyed.record.sku, "A-1");
    }

    #[test]
    fn undecodable_record_is_malformed() {
        let err = decode::<Line>(
            &line_descriptor(),
            Operation::LoadAll,
            json!({"order_id": 1, "line_no": 2}),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Handler(HandlerError::Malformed { method: Operation::LoadAll, .. })
        ));
    }

    #[test]
    fn missing_key_field_is_a_key_error() {
        let err = decode::<Value>(&line_descriptor(), Operation::Load, json!({"order_id": 1}))
            .unwrap_err();
        assert!(matches!(err, RuntimeError::Key(KeyError::MissingIdentity { .. })));
    }
}
