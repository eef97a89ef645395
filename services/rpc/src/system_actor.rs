//! Built-in `system` actor.
//!
//! Registered at startup under the `system` namespace, it exposes the
//! server's introspection surface as ordinary commands so generated clients
//! can discover what a server offers.

use anyhow::bail;
use async_trait::async_trait;
use registry::{ActorInstance, ActorRegistry, ActorSource, CallArgs, CommandMetadata};
use std::sync::Arc;
use types::{Value, NAMESPACE_SYSTEM};

struct SystemActor {
    registry: Arc<ActorRegistry>,
}

impl SystemActor {
    /// Optional namespace filter from the first positional argument.
    fn namespace_filter(args: &CallArgs) -> Option<String> {
        match args {
            CallArgs::Positional(fields) => fields
                .first()
                .map(|f| String::from_utf8_lossy(f).into_owned())
                .filter(|s| !s.is_empty()),
            CallArgs::Keyword(_) => None,
        }
    }
}

#[async_trait]
impl ActorInstance for SystemActor {
    async fn invoke(&self, command: &str, args: CallArgs) -> anyhow::Result<Value> {
        let namespace = Self::namespace_filter(&args);
        match command {
            "actors_list" => {
                let keys = self.registry.actors_list(namespace.as_deref());
                Ok(Value::Text(serde_json::to_string(&keys)?))
            }
            "actors_methods_list" => {
                let summaries = self.registry.actors_methods_list(namespace.as_deref());
                Ok(Value::Text(serde_json::to_string(&summaries)?))
            }
            other => bail!("unknown system command '{}'", other),
        }
    }
}

/// Register the built-in `system` actor on a registry.
pub fn register_system_actor(registry: &Arc<ActorRegistry>) {
    let instance = Arc::new(SystemActor {
        registry: registry.clone(),
    });
    registry.register(
        ActorSource::new(
            "system",
            instance,
            vec![
                CommandMetadata::new("actors_list")
                    .with_args(&["namespace"])
                    .with_description("list the keys of all registered actors"),
                CommandMetadata::new("actors_methods_list")
                    .with_args(&["namespace"])
                    .with_description("list actors with their command signatures"),
            ],
        ),
        NAMESPACE_SYSTEM,
    );
}
