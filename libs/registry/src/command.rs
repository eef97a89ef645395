//! Per-command metadata and method binding.

use crate::actor::{ActorInstance, CallArgs};
use std::sync::Arc;
use types::{SchemaId, Value};

/// Description of one exposed command.
///
/// Built once when its actor is registered, immutable thereafter. The
/// argument signature feeds both generated clients and the server-side
/// keyword binding; `schema_in`/`schema_out` select the marshalling path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMetadata {
    pub name: String,
    /// Declared argument names, in signature order.
    pub args: Vec<String>,
    pub schema_in: Option<SchemaId>,
    pub schema_out: Option<SchemaId>,
    pub description: String,
}

impl CommandMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            schema_in: None,
            schema_out: None,
            description: String::new(),
        }
    }

    pub fn with_args(mut self, args: &[&str]) -> Self {
        self.args = args.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn with_schema_in(mut self, schema: impl Into<SchemaId>) -> Self {
        self.schema_in = Some(schema.into());
        self
    }

    pub fn with_schema_out(mut self, schema: impl Into<SchemaId>) -> Self {
        self.schema_out = Some(schema.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// True when the declared signature names `arg`.
    pub fn declares_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }
}

/// A command bound to its actor's instance, ready to invoke.
///
/// Produced by registry resolution; connection handlers cache these by
/// `(namespace, actor, command)` triple, so repeated resolution of the same
/// address yields the same `Arc` (reference-stable cache hits).
pub struct BoundCommand {
    pub meta: Arc<CommandMetadata>,
    instance: Arc<dyn ActorInstance>,
}

impl BoundCommand {
    pub fn new(meta: Arc<CommandMetadata>, instance: Arc<dyn ActorInstance>) -> Self {
        Self { meta, instance }
    }

    /// Invoke the bound method.
    pub async fn invoke(&self, args: CallArgs) -> anyhow::Result<Value> {
        self.instance.invoke(&self.meta.name, args).await
    }
}
