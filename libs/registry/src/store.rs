//! The actor registry: registration, fallback resolution, introspection.

use crate::actor::ActorSource;
use crate::command::{BoundCommand, CommandMetadata};
use crate::error::{RegistryError, RegistryResult};
use crate::loader::ActorSourceLoader;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use types::constants::actor_key;
use types::{NAMESPACE_DEFAULT, NAMESPACE_SYSTEM};

/// One registered actor, immutable after registration.
struct ActorDescriptor {
    key: String,
    namespace: String,
    name: String,
    instance: Arc<dyn crate::actor::ActorInstance>,
    commands: HashMap<String, Arc<CommandMetadata>>,
}

/// Introspection record for one actor.
#[derive(Debug, Clone, Serialize)]
pub struct ActorSummary {
    pub name: String,
    pub namespace: String,
    pub commands: Vec<CommandSummary>,
}

/// Introspection record for one command.
#[derive(Debug, Clone, Serialize)]
pub struct CommandSummary {
    pub name: String,
    pub args: Vec<String>,
    pub schema_in: Option<String>,
    pub schema_out: Option<String>,
    pub description: String,
}

/// Registry of all actors, keyed `namespace__actor`.
///
/// Shared read-mostly state: registration happens at startup or during
/// administrative windows behind the write lock, resolution takes the read
/// lock. Handlers cache resolved bindings locally, so the lock is off the
/// per-request hot path after first use.
#[derive(Default)]
pub struct ActorRegistry {
    actors: RwLock<HashMap<String, Arc<ActorDescriptor>>>,
}

impl ActorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an actor under a namespace. Re-registration overwrites.
    pub fn register(&self, source: ActorSource, namespace: &str) {
        let key = actor_key(namespace, &source.name);
        info!(key = %key, commands = source.commands.len(), "actor registered");

        let commands = source
            .commands
            .into_iter()
            .map(|meta| (meta.name.clone(), Arc::new(meta)))
            .collect();

        let descriptor = Arc::new(ActorDescriptor {
            key: key.clone(),
            namespace: namespace.to_string(),
            name: source.name,
            instance: source.instance,
            commands,
        });

        self.actors.write().insert(key, descriptor);
    }

    /// Register every actor a loader discovers at a location.
    ///
    /// Returns the number of actors registered. Fails with `SourceNotFound`
    /// when the location is absent.
    pub fn register_location(
        &self,
        location: &Path,
        namespace: &str,
        loader: &dyn ActorSourceLoader,
    ) -> RegistryResult<usize> {
        let sources = loader.load(location)?;
        let count = sources.len();
        debug!(location = %location.display(), namespace, count, "registering actor sources");
        for source in sources {
            self.register(source, namespace);
        }
        Ok(count)
    }

    /// Resolve an address triple to an invocable command.
    ///
    /// Looks up `namespace__actor`; an absent actor retries `system`→`default`
    /// and `default`→`system` before giving up. Binding the instance to the
    /// metadata is idempotent; callers cache the returned `Arc` by triple.
    pub fn resolve(
        &self,
        namespace: &str,
        actor: &str,
        command: &str,
    ) -> RegistryResult<Arc<BoundCommand>> {
        let actors = self.actors.read();

        let mut key = actor_key(namespace, actor);
        if !actors.contains_key(&key) {
            if namespace == NAMESPACE_SYSTEM {
                key = actor_key(NAMESPACE_DEFAULT, actor);
            } else if namespace == NAMESPACE_DEFAULT {
                key = actor_key(NAMESPACE_SYSTEM, actor);
            }
        }

        let descriptor = actors.get(&key).ok_or_else(|| {
            RegistryError::command_not_found(format!("cannot find actor with key '{}'", key))
        })?;

        let meta = descriptor.commands.get(command).ok_or_else(|| {
            RegistryError::command_not_found(format!(
                "cannot find command '{}' on actor '{}'",
                command, key
            ))
        })?;

        debug!(key = %descriptor.key, command, "command resolved");
        Ok(Arc::new(BoundCommand::new(
            meta.clone(),
            descriptor.instance.clone(),
        )))
    }

    /// Keys of all registered actors, optionally filtered by namespace.
    pub fn actors_list(&self, namespace: Option<&str>) -> Vec<String> {
        let actors = self.actors.read();
        let mut keys: Vec<String> = actors
            .values()
            .filter(|d| namespace.map_or(true, |ns| d.namespace == ns))
            .map(|d| d.key.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Full introspection of actors and their command signatures.
    pub fn actors_methods_list(&self, namespace: Option<&str>) -> Vec<ActorSummary> {
        let actors = self.actors.read();
        let mut summaries: Vec<ActorSummary> = actors
            .values()
            .filter(|d| namespace.map_or(true, |ns| d.namespace == ns))
            .map(|d| {
                let mut commands: Vec<CommandSummary> = d
                    .commands
                    .values()
                    .map(|meta| CommandSummary {
                        name: meta.name.clone(),
                        args: meta.args.clone(),
                        schema_in: meta.schema_in.as_ref().map(|s| s.to_string()),
                        schema_out: meta.schema_out.as_ref().map(|s| s.to_string()),
                        description: meta.description.clone(),
                    })
                    .collect();
                commands.sort_by(|a, b| a.name.cmp(&b.name));
                ActorSummary {
                    name: d.name.clone(),
                    namespace: d.namespace.clone(),
                    commands,
                }
            })
            .collect();
        summaries.sort_by(|a, b| (&a.namespace, &a.name).cmp(&(&b.namespace, &b.name)));
        summaries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{ActorInstance, CallArgs};
    use async_trait::async_trait;
    use types::Value;

    struct EchoActor;

    #[async_trait]
    impl ActorInstance for EchoActor {
        async fn invoke(&self, command: &str, _args: CallArgs) -> anyhow::Result<Value> {
            Ok(Value::from(format!("echo:{}", command)))
        }
    }

    fn echo_source(name: &str, commands: &[&str]) -> ActorSource {
        ActorSource::new(
            name,
            Arc::new(EchoActor),
            commands
                .iter()
                .map(|c| CommandMetadata::new(*c))
                .collect(),
        )
    }

    #[test]
    fn test_register_and_resolve() {
        let registry = ActorRegistry::new();
        registry.register(echo_source("wiki", &["render"]), "default");

        let bound = registry.resolve("default", "wiki", "render").unwrap();
        assert_eq!(bound.meta.name, "render");
    }

    #[test]
    fn test_system_falls_back_to_default() {
        let registry = ActorRegistry::new();
        registry.register(echo_source("wiki", &["render"]), "default");

        let bound = registry.resolve("system", "wiki", "render").unwrap();
        assert_eq!(bound.meta.name, "render");
    }

    #[test]
    fn test_default_falls_back_to_system() {
        let registry = ActorRegistry::new();
        registry.register(echo_source("core", &["status"]), "system");

        let bound = registry.resolve("default", "core", "status").unwrap();
        assert_eq!(bound.meta.name, "status");
    }

    #[test]
    fn test_no_fallback_for_other_namespaces() {
        let registry = ActorRegistry::new();
        registry.register(echo_source("wiki", &["render"]), "default");

        assert!(registry.resolve("billing", "wiki", "render").is_err());
    }

    #[test]
    fn test_unknown_actor_and_command() {
        let registry = ActorRegistry::new();
        registry.register(echo_source("wiki", &["render"]), "default");

        assert!(matches!(
            registry.resolve("default", "nosuch", "render"),
            Err(RegistryError::CommandNotFound { .. })
        ));
        assert!(matches!(
            registry.resolve("default", "wiki", "nosuch"),
            Err(RegistryError::CommandNotFound { .. })
        ));
    }

    #[test]
    fn test_fallback_binds_same_metadata() {
        let registry = ActorRegistry::new();
        registry.register(echo_source("wiki", &["render"]), "default");

        let direct = registry.resolve("default", "wiki", "render").unwrap();
        let fallback = registry.resolve("system", "wiki", "render").unwrap();
        assert!(Arc::ptr_eq(&direct.meta, &fallback.meta));
    }

    #[test]
    fn test_reregistration_overwrites() {
        let registry = ActorRegistry::new();
        registry.register(echo_source("wiki", &["render"]), "default");
        registry.register(echo_source("wiki", &["render", "publish"]), "default");

        assert!(registry.resolve("default", "wiki", "publish").is_ok());
        assert_eq!(registry.actors_list(Some("default")).len(), 1);
    }

    #[test]
    fn test_listing() {
        let registry = ActorRegistry::new();
        registry.register(echo_source("wiki", &["render"]), "default");
        registry.register(echo_source("core", &["status"]), "system");

        assert_eq!(
            registry.actors_list(None),
            vec!["default__wiki", "system__core"]
        );
        assert_eq!(registry.actors_list(Some("system")), vec!["system__core"]);

        let summaries = registry.actors_methods_list(Some("default"));
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].commands[0].name, "render");
    }

    #[tokio::test]
    async fn test_bound_invocation() {
        let registry = ActorRegistry::new();
        registry.register(echo_source("wiki", &["render"]), "default");

        let bound = registry.resolve("default", "wiki", "render").unwrap();
        let result = bound.invoke(CallArgs::none()).await.unwrap();
        assert_eq!(result, Value::Text("echo:render".to_string()));
    }

    #[test]
    fn test_concurrent_resolution_and_registration() {
        let registry = Arc::new(ActorRegistry::new());
        registry.register(echo_source("wiki", &["render"]), "default");

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        if i % 2 == 0 {
                            let _ = registry.resolve("default", "wiki", "render").unwrap();
                        } else {
                            registry.register(echo_source("jobs", &["run"]), "default");
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // registration performed between resolutions is visible afterwards
        assert!(registry.resolve("default", "jobs", "run").is_ok());
    }
}
