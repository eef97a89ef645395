//! Actor source discovery.
//!
//! A loader turns a filesystem location into registration records. The
//! registry does not care where records come from; deployments wire in a
//! loader that knows their packaging (a manifest, a plugin table, a test
//! fixture).

use crate::actor::{ActorInstance, ActorSource};
use crate::command::CommandMetadata;
use crate::error::{RegistryError, RegistryResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Yields the actors found at a location.
pub trait ActorSourceLoader: Send + Sync {
    /// Load all actors at `location`.
    ///
    /// Fails with `SourceNotFound` when the location is absent. Loaders skip
    /// entries they consider private; an existing but empty location yields
    /// an empty list, which is not an error.
    fn load(&self, location: &Path) -> RegistryResult<Vec<ActorSource>>;
}

/// Loader over a fixed table of locations.
///
/// The in-process equivalent of a directory of actor files: each known
/// location maps to the registration records it contains.
#[derive(Default)]
pub struct StaticSourceLoader {
    entries: HashMap<PathBuf, Vec<SourceEntry>>,
}

struct SourceEntry {
    name: String,
    instance: Arc<dyn ActorInstance>,
    commands: Vec<CommandMetadata>,
}

impl StaticSourceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an actor under a location.
    pub fn insert(
        &mut self,
        location: impl Into<PathBuf>,
        name: impl Into<String>,
        instance: Arc<dyn ActorInstance>,
        commands: Vec<CommandMetadata>,
    ) {
        self.entries
            .entry(location.into())
            .or_default()
            .push(SourceEntry {
                name: name.into(),
                instance,
                commands,
            });
    }
}

impl ActorSourceLoader for StaticSourceLoader {
    fn load(&self, location: &Path) -> RegistryResult<Vec<ActorSource>> {
        let entries = self
            .entries
            .get(location)
            .ok_or_else(|| RegistryError::source_not_found(location.display().to_string()))?;

        Ok(entries
            .iter()
            .map(|entry| {
                ActorSource::new(
                    entry.name.clone(),
                    entry.instance.clone(),
                    entry.commands.clone(),
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::CallArgs;
    use async_trait::async_trait;
    use types::Value;

    struct NoopActor;

    #[async_trait]
    impl ActorInstance for NoopActor {
        async fn invoke(&self, _command: &str, _args: CallArgs) -> anyhow::Result<Value> {
            Ok(Value::Nil)
        }
    }

    #[test]
    fn test_load_known_location() {
        let mut loader = StaticSourceLoader::new();
        loader.insert(
            "/actors/base",
            "wiki",
            Arc::new(NoopActor),
            vec![CommandMetadata::new("render")],
        );

        let sources = loader.load(Path::new("/actors/base")).unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].name, "wiki");
    }

    #[test]
    fn test_missing_location_is_source_not_found() {
        let loader = StaticSourceLoader::new();
        assert!(matches!(
            loader.load(Path::new("/actors/nope")),
            Err(RegistryError::SourceNotFound { .. })
        ));
    }
}
