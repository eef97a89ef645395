//! Dotted command address parsing.

use crate::error::{RegistryError, RegistryResult};
use std::fmt;
use types::{ACTOR_KEY_SEPARATOR, NAMESPACE_SYSTEM};

/// A fully resolved `namespace.actor.command` triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandAddress {
    pub namespace: String,
    pub actor: String,
    pub command: String,
}

impl CommandAddress {
    /// Parse a dotted address of 1-3 segments.
    ///
    /// Rules:
    /// - `a.b.c` → namespace `a`, actor `b`, command `c`
    /// - `a.b`   → actor `a`, command `b`; namespace is `system` when the
    ///   actor is `system`, otherwise `default_namespace`
    /// - `a`     → namespace `system`, actor `system`, command `a`
    ///
    /// An actor segment written as a registry key (`ns__actor`) has the
    /// embedded namespace marker stripped. Addresses are matched
    /// case-insensitively; input is lowercased before splitting.
    pub fn parse(input: &str, default_namespace: &str) -> RegistryResult<Self> {
        let lowered = input.to_ascii_lowercase();
        let parts: Vec<&str> = lowered.split('.').collect();

        match parts.as_slice() {
            [namespace, actor, command] => Ok(Self {
                namespace: (*namespace).to_string(),
                actor: strip_namespace_marker(actor).to_string(),
                command: (*command).to_string(),
            }),
            [actor, command] => {
                let actor = strip_namespace_marker(actor);
                let namespace = if actor == NAMESPACE_SYSTEM {
                    NAMESPACE_SYSTEM
                } else {
                    default_namespace
                };
                Ok(Self {
                    namespace: namespace.to_string(),
                    actor: actor.to_string(),
                    command: (*command).to_string(),
                })
            }
            [command] if !command.is_empty() => Ok(Self {
                namespace: NAMESPACE_SYSTEM.to_string(),
                actor: NAMESPACE_SYSTEM.to_string(),
                command: (*command).to_string(),
            }),
            _ => Err(RegistryError::malformed_address(input)),
        }
    }

    /// Registry key of the addressed actor (`namespace__actor`).
    pub fn actor_key(&self) -> String {
        types::constants::actor_key(&self.namespace, &self.actor)
    }

    /// The `(namespace, actor, command)` triple as an owned cache key.
    pub fn triple(&self) -> (String, String, String) {
        (
            self.namespace.clone(),
            self.actor.clone(),
            self.command.clone(),
        )
    }
}

impl fmt::Display for CommandAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.namespace, self.actor, self.command)
    }
}

/// Drop a leading `ns__` disambiguation marker from an actor name.
fn strip_namespace_marker(actor: &str) -> &str {
    match actor.split_once(ACTOR_KEY_SEPARATOR) {
        Some((_, rest)) => rest,
        None => actor,
    }
}
