//! Native result model and schema-typed values.
//!
//! `Value` is what command callables return and what the wire codec frames.
//! `SchemaObject` is the structured form produced and consumed by the schema
//! engine; the registry and dispatch layers move it around without looking
//! inside.

use bytes::Bytes;
use std::collections::BTreeMap;
use std::fmt;

/// Stable identifier (URL) of an external schema definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(String);

impl SchemaId {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SchemaId {
    fn from(url: &str) -> Self {
        Self(url.to_string())
    }
}

impl From<String> for SchemaId {
    fn from(url: String) -> Self {
        Self(url)
    }
}

/// A schema-typed structured value.
///
/// Carries the schema it was decoded with, an optional identifier (propagated
/// from the argument envelope when present), and the property values. Property
/// iteration order is decided by the schema's declared property list, not by
/// this container.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaObject {
    schema: SchemaId,
    id: Option<i64>,
    fields: BTreeMap<String, Value>,
}

impl SchemaObject {
    pub fn new(schema: SchemaId) -> Self {
        Self {
            schema,
            id: None,
            fields: BTreeMap::new(),
        }
    }

    pub fn schema(&self) -> &SchemaId {
        &self.schema
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Set a property value, replacing any previous one.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    /// Builder-style property assignment.
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.set(name, value);
        self
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// A native value as seen by callables and the wire codec.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Bytes),
    List(Vec<Value>),
    Object(SchemaObject),
}

impl Value {
    /// Bytes of a text or binary value, if this is one.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Text(s) => Some(s.as_bytes()),
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&SchemaObject> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Short tag for log and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
            Self::List(_) => "list",
            Self::Object(_) => "object",
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Bytes> for Value {
    fn from(b: Bytes) -> Self {
        Self::Bytes(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

impl From<SchemaObject> for Value {
    fn from(obj: SchemaObject) -> Self {
        Self::Object(obj)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_properties() {
        let mut obj = SchemaObject::new("test.schema.1".into());
        obj.set("name", Value::from("alice"));
        obj.set("age", Value::Int(30));

        assert_eq!(obj.get("name"), Some(&Value::Text("alice".to_string())));
        assert_eq!(obj.get("missing"), None);
        assert_eq!(obj.field_count(), 2);
    }

    #[test]
    fn test_object_id_propagation() {
        let mut obj = SchemaObject::new("test.schema.1".into());
        assert_eq!(obj.id(), None);
        obj.set_id(Some(42));
        assert_eq!(obj.id(), Some(42));
    }

    #[test]
    fn test_object_equality_on_properties() {
        let a = SchemaObject::new("test.schema.1".into()).with("x", Value::Int(1));
        let b = SchemaObject::new("test.schema.1".into()).with("x", Value::Int(1));
        assert_eq!(a, b);

        let c = SchemaObject::new("test.schema.1".into()).with("x", Value::Int(2));
        assert_ne!(a, c);
    }

    #[test]
    fn test_value_as_bytes() {
        assert_eq!(Value::from("hi").as_bytes(), Some(&b"hi"[..]));
        assert_eq!(
            Value::Bytes(Bytes::from_static(b"\x01\x02")).as_bytes(),
            Some(&[1u8, 2u8][..])
        );
        assert_eq!(Value::Int(1).as_bytes(), None);
    }
}
