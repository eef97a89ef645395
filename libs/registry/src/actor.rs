//! The closed invocation interface actors implement.
//!
//! Actors are registration records, not discovered code: a name, an
//! invocable instance, and the metadata of the commands it exposes. The
//! server never evaluates code at runtime; everything an actor can do is
//! declared when it is registered.

use crate::command::CommandMetadata;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use types::{SchemaId, SchemaObject, Value};

/// Arguments handed to a command invocation.
///
/// No-schema commands receive the raw positional byte fields from the wire;
/// schema commands receive keyword arguments keyed by the input schema's
/// declared property names, in declaration order.
#[derive(Debug, Clone)]
pub enum CallArgs {
    Positional(Vec<Bytes>),
    Keyword(KeywordArgs),
}

impl CallArgs {
    /// Empty positional argument list.
    pub fn none() -> Self {
        Self::Positional(Vec::new())
    }
}

/// Keyword arguments for a schema-typed command.
#[derive(Debug, Clone)]
pub struct KeywordArgs {
    /// `(property name, value)` pairs in schema declaration order.
    pub fields: Vec<(String, Value)>,
    /// Output schema the command should encode its result with, when the
    /// command declares one. Injected by the dispatcher under the reserved
    /// `schema_out` name.
    pub schema_out: Option<SchemaId>,
}

impl KeywordArgs {
    /// Look up a keyword argument by property name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// The decoded argument object these keywords came from, rebuilt.
    pub fn to_object(&self, schema: SchemaId) -> SchemaObject {
        let mut object = SchemaObject::new(schema);
        for (key, value) in &self.fields {
            object.set(key.clone(), value.clone());
        }
        object
    }
}

/// One invocable implementation unit.
///
/// `command` is the command name the metadata was resolved under; a single
/// instance typically matches on it. Failures are application errors: they
/// are reported to the client and never tear down the connection.
#[async_trait]
pub trait ActorInstance: Send + Sync {
    async fn invoke(&self, command: &str, args: CallArgs) -> anyhow::Result<Value>;
}

/// A registration record: everything the registry needs to expose an actor.
pub struct ActorSource {
    pub name: String,
    pub instance: Arc<dyn ActorInstance>,
    pub commands: Vec<CommandMetadata>,
}

impl ActorSource {
    pub fn new(
        name: impl Into<String>,
        instance: Arc<dyn ActorInstance>,
        commands: Vec<CommandMetadata>,
    ) -> Self {
        Self {
            name: name.into(),
            instance,
            commands,
        }
    }
}
