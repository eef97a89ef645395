//! In-memory schema engine adapter.
//!
//! A schema here is an ordered list of property names registered under a
//! stable URL. The structural binary form is a MessagePack map; the text form
//! is a JSON object. Values are scalars, byte strings, and lists thereof;
//! this adapter does not nest schema objects inside one another.

use crate::engine::{SchemaEncoding, SchemaEngine};
use crate::error::{SchemaError, SchemaResult};
use bytes::Bytes;
use parking_lot::RwLock;
use rmpv::Value as MpValue;
use std::collections::HashMap;
use tracing::debug;
use types::{SchemaId, SchemaObject, Value};

/// Schema engine backed by registered property declarations.
#[derive(Default)]
pub struct MemorySchemaEngine {
    schemas: RwLock<HashMap<SchemaId, Vec<String>>>,
}

impl MemorySchemaEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a schema definition.
    pub fn register(&self, schema: impl Into<SchemaId>, properties: &[&str]) {
        let schema = schema.into();
        debug!(%schema, properties = properties.len(), "schema registered");
        self.schemas
            .write()
            .insert(schema, properties.iter().map(|p| p.to_string()).collect());
    }

    fn properties_of(&self, schema: &SchemaId) -> SchemaResult<Vec<String>> {
        self.schemas
            .read()
            .get(schema)
            .cloned()
            .ok_or_else(|| SchemaError::UnknownSchema {
                schema: schema.clone(),
            })
    }
}

impl SchemaEngine for MemorySchemaEngine {
    fn decode(&self, schema: &SchemaId, data: &[u8]) -> SchemaResult<SchemaObject> {
        let properties = self.properties_of(schema)?;

        let mut cursor = data;
        let raw = rmpv::decode::read_value(&mut cursor)
            .map_err(|e| SchemaError::decode(schema, e.to_string()))?;
        let entries = match raw {
            MpValue::Map(entries) => entries,
            other => {
                return Err(SchemaError::decode(
                    schema,
                    format!("expected a map, got {:?}", other),
                ))
            }
        };

        let mut object = SchemaObject::new(schema.clone());
        for (key, value) in entries {
            let key = key
                .as_str()
                .ok_or_else(|| SchemaError::decode(schema, "non-string property key"))?
                .to_string();
            if !properties.iter().any(|p| *p == key) {
                return Err(SchemaError::decode(
                    schema,
                    format!("undeclared property '{}'", key),
                ));
            }
            object.set(key, mp_to_value(schema, value)?);
        }
        Ok(object)
    }

    fn decode_json(&self, schema: &SchemaId, doc: &serde_json::Value) -> SchemaResult<SchemaObject> {
        let properties = self.properties_of(schema)?;

        let entries = doc
            .as_object()
            .ok_or_else(|| SchemaError::decode(schema, "expected a JSON object"))?;

        let mut object = SchemaObject::new(schema.clone());
        for (key, value) in entries {
            if !properties.iter().any(|p| p == key) {
                return Err(SchemaError::decode(
                    schema,
                    format!("undeclared property '{}'", key),
                ));
            }
            object.set(key.clone(), json_to_value(schema, value)?);
        }
        Ok(object)
    }

    fn encode(&self, object: &SchemaObject, encoding: SchemaEncoding) -> SchemaResult<Bytes> {
        let schema = object.schema();
        let properties = self.properties_of(schema)?;

        match encoding {
            SchemaEncoding::Binary | SchemaEncoding::Msgpack => {
                let mut entries = Vec::with_capacity(properties.len());
                for name in &properties {
                    let value = object.get(name).unwrap_or(&Value::Nil);
                    entries.push((MpValue::from(name.as_str()), value_to_mp(schema, value)?));
                }
                let mut out = Vec::new();
                rmpv::encode::write_value(&mut out, &MpValue::Map(entries))
                    .map_err(|e| SchemaError::encode(schema, e.to_string()))?;
                Ok(Bytes::from(out))
            }
            SchemaEncoding::Json => {
                let mut map = serde_json::Map::with_capacity(properties.len());
                for name in &properties {
                    let value = object.get(name).unwrap_or(&Value::Nil);
                    map.insert(name.clone(), value_to_json(schema, value)?);
                }
                let text = serde_json::Value::Object(map).to_string();
                Ok(Bytes::from(text.into_bytes()))
            }
        }
    }

    fn property_names(&self, schema: &SchemaId) -> SchemaResult<Vec<String>> {
        self.properties_of(schema)
    }
}

fn mp_to_value(schema: &SchemaId, raw: MpValue) -> SchemaResult<Value> {
    Ok(match raw {
        MpValue::Nil => Value::Nil,
        MpValue::Boolean(b) => Value::Bool(b),
        MpValue::Integer(n) => Value::Int(
            n.as_i64()
                .ok_or_else(|| SchemaError::decode(schema, "integer out of range"))?,
        ),
        MpValue::F32(f) => Value::Float(f as f64),
        MpValue::F64(f) => Value::Float(f),
        MpValue::String(s) => match s.into_str() {
            Some(s) => Value::Text(s),
            None => return Err(SchemaError::decode(schema, "non-utf8 string property")),
        },
        MpValue::Binary(b) => Value::Bytes(Bytes::from(b)),
        MpValue::Array(items) => Value::List(
            items
                .into_iter()
                .map(|item| mp_to_value(schema, item))
                .collect::<SchemaResult<Vec<_>>>()?,
        ),
        other => {
            return Err(SchemaError::decode(
                schema,
                format!("unsupported property value {:?}", other),
            ))
        }
    })
}

fn value_to_mp(schema: &SchemaId, value: &Value) -> SchemaResult<MpValue> {
    Ok(match value {
        Value::Nil => MpValue::Nil,
        Value::Bool(b) => MpValue::from(*b),
        Value::Int(n) => MpValue::from(*n),
        Value::Float(f) => MpValue::F64(*f),
        Value::Text(s) => MpValue::from(s.as_str()),
        Value::Bytes(b) => MpValue::Binary(b.to_vec()),
        Value::List(items) => MpValue::Array(
            items
                .iter()
                .map(|item| value_to_mp(schema, item))
                .collect::<SchemaResult<Vec<_>>>()?,
        ),
        Value::Object(_) => {
            return Err(SchemaError::encode(
                schema,
                "nested schema objects are not supported",
            ))
        }
    })
}

fn json_to_value(schema: &SchemaId, raw: &serde_json::Value) -> SchemaResult<Value> {
    Ok(match raw {
        serde_json::Value::Null => Value::Nil,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                return Err(SchemaError::decode(schema, "number out of range"));
            }
        }
        serde_json::Value::String(s) => Value::Text(s.clone()),
        serde_json::Value::Array(items) => Value::List(
            items
                .iter()
                .map(|item| json_to_value(schema, item))
                .collect::<SchemaResult<Vec<_>>>()?,
        ),
        serde_json::Value::Object(_) => {
            return Err(SchemaError::decode(
                schema,
                "nested objects are not supported",
            ))
        }
    })
}

fn value_to_json(schema: &SchemaId, value: &Value) -> SchemaResult<serde_json::Value> {
    Ok(match value {
        Value::Nil => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(n) => serde_json::Value::from(*n),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .ok_or_else(|| SchemaError::encode(schema, "non-finite float"))?,
        Value::Text(s) => serde_json::Value::String(s.clone()),
        Value::Bytes(b) => match std::str::from_utf8(b) {
            Ok(s) => serde_json::Value::String(s.to_string()),
            Err(_) => {
                return Err(SchemaError::encode(
                    schema,
                    "binary property has no text form",
                ))
            }
        },
        Value::List(items) => serde_json::Value::Array(
            items
                .iter()
                .map(|item| value_to_json(schema, item))
                .collect::<SchemaResult<Vec<_>>>()?,
        ),
        Value::Object(_) => {
            return Err(SchemaError::encode(
                schema,
                "nested schema objects are not supported",
            ))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with_user_schema() -> (MemorySchemaEngine, SchemaId) {
        let engine = MemorySchemaEngine::new();
        let schema = SchemaId::from("test.user.1");
        engine.register(schema.clone(), &["name", "age", "tags"]);
        (engine, schema)
    }

    fn sample_object(schema: &SchemaId) -> SchemaObject {
        SchemaObject::new(schema.clone())
            .with("name", Value::from("alice"))
            .with("age", Value::Int(30))
            .with(
                "tags",
                Value::List(vec![Value::from("admin"), Value::from("ops")]),
            )
    }

    #[test]
    fn test_binary_round_trip() {
        let (engine, schema) = engine_with_user_schema();
        let object = sample_object(&schema);

        let encoded = engine.encode(&object, SchemaEncoding::Binary).unwrap();
        let decoded = engine.decode(&schema, &encoded).unwrap();

        assert_eq!(decoded.get("name"), object.get("name"));
        assert_eq!(decoded.get("age"), object.get("age"));
        assert_eq!(decoded.get("tags"), object.get("tags"));
    }

    #[test]
    fn test_json_round_trip() {
        let (engine, schema) = engine_with_user_schema();
        let object = sample_object(&schema);

        let encoded = engine.encode(&object, SchemaEncoding::Json).unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&encoded).unwrap();
        let decoded = engine.decode_json(&schema, &doc).unwrap();

        assert_eq!(decoded.get("name"), object.get("name"));
        assert_eq!(decoded.get("age"), object.get("age"));
    }

    #[test]
    fn test_property_names_keep_declaration_order() {
        let (engine, schema) = engine_with_user_schema();
        assert_eq!(
            engine.property_names(&schema).unwrap(),
            vec!["name", "age", "tags"]
        );
    }

    #[test]
    fn test_unknown_schema() {
        let engine = MemorySchemaEngine::new();
        let missing = SchemaId::from("test.missing.1");
        assert!(matches!(
            engine.property_names(&missing),
            Err(SchemaError::UnknownSchema { .. })
        ));
        assert!(matches!(
            engine.decode(&missing, b"\x80"),
            Err(SchemaError::UnknownSchema { .. })
        ));
    }

    #[test]
    fn test_undeclared_property_rejected() {
        let (engine, schema) = engine_with_user_schema();
        let rogue = MpValue::Map(vec![(MpValue::from("rank"), MpValue::from(1))]);
        let mut encoded = Vec::new();
        rmpv::encode::write_value(&mut encoded, &rogue).unwrap();

        assert!(matches!(
            engine.decode(&schema, &encoded),
            Err(SchemaError::Decode { .. })
        ));
    }

    #[test]
    fn test_non_map_payload_rejected() {
        let (engine, schema) = engine_with_user_schema();
        let mut encoded = Vec::new();
        rmpv::encode::write_value(&mut encoded, &MpValue::from(7)).unwrap();

        assert!(matches!(
            engine.decode(&schema, &encoded),
            Err(SchemaError::Decode { .. })
        ));
    }

    #[test]
    fn test_missing_properties_encode_as_nil() {
        let (engine, schema) = engine_with_user_schema();
        let object = SchemaObject::new(schema.clone()).with("name", Value::from("bob"));

        let encoded = engine.encode(&object, SchemaEncoding::Json).unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&encoded).unwrap();
        assert_eq!(doc["name"], "bob");
        assert!(doc["age"].is_null());
    }
}
