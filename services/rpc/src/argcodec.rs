//! Schema argument decoding and result encoding.
//!
//! The schema engine does the actual byte⇄struct conversion; this module
//! chooses which encoding applies, validates the envelope, and enforces the
//! reserved-name rule for `schema_out`.

use crate::error::{RpcError, RpcResult};
use bytes::Bytes;
use registry::{CommandMetadata, KeywordArgs};
use schema::{SchemaEncoding, SchemaEngine};
use types::{ContentType, ResponseType, SchemaId, SchemaObject, Value, RESERVED_SCHEMA_OUT};

/// Decode a schema-typed argument payload under the negotiated content type.
pub fn decode_schema_args(
    engine: &dyn SchemaEngine,
    schema_in: &SchemaId,
    payload: &[u8],
    content_type: ContentType,
) -> RpcResult<SchemaObject> {
    match content_type {
        ContentType::Capnp => decode_capnp(engine, schema_in, payload).map_err(|detail| {
            RpcError::invalid_payload(format!(
                "the content is not valid capnp while you provided content_type=capnp: {}",
                detail
            ))
        }),
        ContentType::Json => decode_json(engine, schema_in, payload).map_err(|detail| {
            RpcError::invalid_payload(format!(
                "the content is not valid json while you provided content_type=json: {}",
                detail
            ))
        }),
        // Permissive by observed behavior: any envelope decode failure falls
        // through to JSON, whose failure is then fatal.
        ContentType::Auto => match decode_capnp(engine, schema_in, payload) {
            Ok(object) => Ok(object),
            Err(_) => decode_json(engine, schema_in, payload).map_err(|detail| {
                RpcError::invalid_payload(format!(
                    "the content is neither a valid envelope nor valid json: {}",
                    detail
                ))
            }),
        },
    }
}

fn decode_capnp(
    engine: &dyn SchemaEngine,
    schema_in: &SchemaId,
    payload: &[u8],
) -> Result<SchemaObject, String> {
    let envelope = codec::decode_envelope(payload).map_err(|e| e.to_string())?;
    let mut object = engine
        .decode(schema_in, &envelope.data)
        .map_err(|e| e.to_string())?;
    if envelope.id.is_some() {
        object.set_id(envelope.id);
    }
    Ok(object)
}

fn decode_json(
    engine: &dyn SchemaEngine,
    schema_in: &SchemaId,
    payload: &[u8],
) -> Result<SchemaObject, String> {
    let doc: serde_json::Value = serde_json::from_slice(payload).map_err(|e| e.to_string())?;
    engine.decode_json(schema_in, &doc).map_err(|e| e.to_string())
}

/// Build the keyword arguments for a schema-typed invocation.
///
/// Keys are the input schema's declared property names in declaration order;
/// missing properties arrive as nil. When the command declares an output
/// schema it is injected under the reserved `schema_out` name, after checking
/// the command's own signature does not claim that name.
pub fn keyword_args(
    engine: &dyn SchemaEngine,
    meta: &CommandMetadata,
    object: &SchemaObject,
) -> RpcResult<KeywordArgs> {
    if meta.schema_out.is_some() && meta.declares_arg(RESERVED_SCHEMA_OUT) {
        return Err(RpcError::SignatureConflict {
            command: meta.name.clone(),
        });
    }

    let schema_in = meta
        .schema_in
        .as_ref()
        .ok_or_else(|| RpcError::invalid_payload("command has no input schema"))?;

    let properties = engine
        .property_names(schema_in)
        .map_err(|e| RpcError::invalid_payload(e.to_string()))?;

    let fields = properties
        .into_iter()
        .map(|name| {
            let value = object.get(&name).cloned().unwrap_or(Value::Nil);
            (name, value)
        })
        .collect();

    Ok(KeywordArgs {
        fields,
        schema_out: meta.schema_out.clone(),
    })
}

/// Encode an invocation result under the negotiated response type.
///
/// List results are encoded element-wise, preserving order.
pub fn encode_result(
    engine: &dyn SchemaEngine,
    meta: &CommandMetadata,
    response_type: ResponseType,
    value: Value,
) -> RpcResult<Value> {
    match value {
        Value::List(items) => Ok(Value::List(
            items
                .into_iter()
                .map(|item| encode_single(engine, meta, response_type, item))
                .collect::<RpcResult<Vec<_>>>()?,
        )),
        other => encode_single(engine, meta, response_type, other),
    }
}

fn encode_single(
    engine: &dyn SchemaEngine,
    meta: &CommandMetadata,
    response_type: ResponseType,
    value: Value,
) -> RpcResult<Value> {
    if meta.schema_out.is_some() {
        return match value {
            Value::Object(object) => {
                let encoding = match response_type {
                    ResponseType::Msgpack => SchemaEncoding::Msgpack,
                    ResponseType::Capnp | ResponseType::Auto => SchemaEncoding::Binary,
                    ResponseType::Json => SchemaEncoding::Json,
                };
                encode_object(engine, &object, encoding)
            }
            // No result to type; let it pass as a nil reply.
            Value::Nil => Ok(Value::Nil),
            other => Err(RpcError::Application(anyhow::anyhow!(
                "command '{}' declares an output schema but returned a bare {} value",
                meta.name,
                other.kind()
            ))),
        };
    }

    // No declared output schema: a schema-typed return value still encodes,
    // everything else passes through unchanged.
    match value {
        Value::Object(object) => {
            let encoding = match response_type {
                ResponseType::Json => SchemaEncoding::Json,
                _ => SchemaEncoding::Binary,
            };
            encode_object(engine, &object, encoding)
        }
        other => Ok(other),
    }
}

fn encode_object(
    engine: &dyn SchemaEngine,
    object: &SchemaObject,
    encoding: SchemaEncoding,
) -> RpcResult<Value> {
    let bytes: Bytes = engine
        .encode(object, encoding)
        .map_err(|e| RpcError::Application(anyhow::Error::new(e)))?;
    Ok(Value::Bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use schema::MemorySchemaEngine;

    fn engine() -> (MemorySchemaEngine, SchemaId, SchemaId) {
        let engine = MemorySchemaEngine::new();
        let schema_in = SchemaId::from("test.args.1");
        let schema_out = SchemaId::from("test.result.1");
        engine.register(schema_in.clone(), &["name", "count"]);
        engine.register(schema_out.clone(), &["status"]);
        (engine, schema_in, schema_out)
    }

    fn sample_args(schema_in: &SchemaId) -> SchemaObject {
        SchemaObject::new(schema_in.clone())
            .with("name", Value::from("alice"))
            .with("count", Value::Int(3))
    }

    fn capnp_payload(engine: &MemorySchemaEngine, object: &SchemaObject, id: Option<i64>) -> Vec<u8> {
        let data = engine.encode(object, SchemaEncoding::Binary).unwrap();
        codec::encode_envelope(id, &data)
    }

    #[test]
    fn test_capnp_decode_propagates_id() {
        let (engine, schema_in, _) = engine();
        let payload = capnp_payload(&engine, &sample_args(&schema_in), Some(99));

        let decoded =
            decode_schema_args(&engine, &schema_in, &payload, ContentType::Capnp).unwrap();
        assert_eq!(decoded.id(), Some(99));
        assert_eq!(decoded.get("count"), Some(&Value::Int(3)));
    }

    #[test]
    fn test_capnp_round_trip_equal_on_properties() {
        let (engine, schema_in, _) = engine();
        let original = sample_args(&schema_in);
        let payload = capnp_payload(&engine, &original, None);

        let decoded =
            decode_schema_args(&engine, &schema_in, &payload, ContentType::Capnp).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_explicit_capnp_failure_is_fatal() {
        let (engine, schema_in, _) = engine();
        let err = decode_schema_args(
            &engine,
            &schema_in,
            br#"{"name": "alice"}"#,
            ContentType::Capnp,
        )
        .unwrap_err();
        assert!(err.to_string().contains("content_type=capnp"));
    }

    #[test]
    fn test_auto_prefers_capnp() {
        let (engine, schema_in, _) = engine();
        let payload = capnp_payload(&engine, &sample_args(&schema_in), Some(7));

        let decoded = decode_schema_args(&engine, &schema_in, &payload, ContentType::Auto).unwrap();
        // a JSON fallback would have lost the envelope identifier
        assert_eq!(decoded.id(), Some(7));
    }

    #[test]
    fn test_auto_falls_back_to_json() {
        let (engine, schema_in, _) = engine();
        let decoded = decode_schema_args(
            &engine,
            &schema_in,
            br#"{"name": "bob", "count": 2}"#,
            ContentType::Auto,
        )
        .unwrap();
        assert_eq!(decoded.get("name"), Some(&Value::Text("bob".to_string())));
    }

    #[test]
    fn test_auto_invalid_in_both_forms_fails() {
        let (engine, schema_in, _) = engine();
        let err = decode_schema_args(&engine, &schema_in, b"\xc1\xc1\xc1", ContentType::Auto)
            .unwrap_err();
        assert!(matches!(err, RpcError::InvalidPayload { .. }));
    }

    #[test]
    fn test_keyword_args_in_declaration_order() {
        let (engine, schema_in, schema_out) = engine();
        let meta = CommandMetadata::new("run")
            .with_schema_in(schema_in.clone())
            .with_schema_out(schema_out);

        let args = keyword_args(&engine, &meta, &sample_args(&schema_in)).unwrap();
        let names: Vec<&str> = args.fields.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["name", "count"]);
        assert_eq!(args.schema_out.as_ref().unwrap().as_str(), "test.result.1");
    }

    #[test]
    fn test_missing_properties_become_nil() {
        let (engine, schema_in, _) = engine();
        let meta = CommandMetadata::new("run").with_schema_in(schema_in.clone());
        let partial = SchemaObject::new(schema_in.clone()).with("name", Value::from("x"));

        let args = keyword_args(&engine, &meta, &partial).unwrap();
        assert_eq!(args.get("count"), Some(&Value::Nil));
    }

    #[test]
    fn test_signature_conflict() {
        let (engine, schema_in, schema_out) = engine();
        let meta = CommandMetadata::new("run")
            .with_args(&["schema_out"])
            .with_schema_in(schema_in.clone())
            .with_schema_out(schema_out);

        let err = keyword_args(&engine, &meta, &sample_args(&schema_in)).unwrap_err();
        assert!(matches!(err, RpcError::SignatureConflict { .. }));
    }

    #[test]
    fn test_schema_out_not_injected_without_output_schema() {
        let (engine, schema_in, _) = engine();
        let meta = CommandMetadata::new("run").with_schema_in(schema_in.clone());
        let args = keyword_args(&engine, &meta, &sample_args(&schema_in)).unwrap();
        assert!(args.schema_out.is_none());
    }

    #[test]
    fn test_result_encoding_by_response_type() {
        let (engine, _, schema_out) = engine();
        let meta = CommandMetadata::new("run").with_schema_out(schema_out.clone());
        let result = SchemaObject::new(schema_out.clone()).with("status", Value::from("ok"));

        let json = encode_result(
            &engine,
            &meta,
            ResponseType::Json,
            Value::Object(result.clone()),
        )
        .unwrap();
        let json_bytes = match &json {
            Value::Bytes(b) => b.clone(),
            other => panic!("expected bytes, got {:?}", other),
        };
        assert_eq!(&json_bytes[..], br#"{"status":"ok"}"#);

        let binary = encode_result(
            &engine,
            &meta,
            ResponseType::Auto,
            Value::Object(result.clone()),
        )
        .unwrap();
        let expected = engine.encode(&result, SchemaEncoding::Binary).unwrap();
        assert_eq!(binary, Value::Bytes(expected));
    }

    #[test]
    fn test_list_results_encode_element_wise() {
        let (engine, _, schema_out) = engine();
        let meta = CommandMetadata::new("run").with_schema_out(schema_out.clone());
        let one = SchemaObject::new(schema_out.clone()).with("status", Value::from("a"));
        let two = SchemaObject::new(schema_out.clone()).with("status", Value::from("b"));

        let encoded = encode_result(
            &engine,
            &meta,
            ResponseType::Json,
            Value::List(vec![Value::Object(one), Value::Object(two)]),
        )
        .unwrap();

        match encoded {
            Value::List(items) => {
                assert_eq!(items.len(), 2);
                assert_eq!(
                    items[0],
                    Value::Bytes(Bytes::from_static(br#"{"status":"a"}"#))
                );
                assert_eq!(
                    items[1],
                    Value::Bytes(Bytes::from_static(br#"{"status":"b"}"#))
                );
            }
            other => panic!("expected a list, got {:?}", other),
        }
    }

    #[test]
    fn test_raw_values_pass_through() {
        let (engine, _, _) = engine();
        let meta = CommandMetadata::new("run");
        let encoded =
            encode_result(&engine, &meta, ResponseType::Auto, Value::from("PONG")).unwrap();
        assert_eq!(encoded, Value::Text("PONG".to_string()));
    }

    #[test]
    fn test_untyped_object_return_still_encodes() {
        let (engine, _, schema_out) = engine();
        let meta = CommandMetadata::new("run");
        let object = SchemaObject::new(schema_out).with("status", Value::from("ok"));

        let encoded = encode_result(
            &engine,
            &meta,
            ResponseType::Json,
            Value::Object(object),
        )
        .unwrap();
        assert_eq!(
            encoded,
            Value::Bytes(Bytes::from_static(br#"{"status":"ok"}"#))
        );
    }
}
