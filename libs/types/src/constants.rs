//! Shared protocol constants.

/// Namespace owning the built-in actors and the single-segment address form.
pub const NAMESPACE_SYSTEM: &str = "system";

/// Namespace used for application actors registered without an explicit one.
pub const NAMESPACE_DEFAULT: &str = "default";

/// Keyword injected into schema-typed invocations to carry the output schema.
/// A command signature must never declare this name itself.
pub const RESERVED_SCHEMA_OUT: &str = "schema_out";

/// Separator between namespace and actor in registry keys (`ns__actor`).
pub const ACTOR_KEY_SEPARATOR: &str = "__";

/// Build the registry key for an actor in a namespace.
pub fn actor_key(namespace: &str, actor: &str) -> String {
    format!("{}{}{}", namespace, ACTOR_KEY_SEPARATOR, actor)
}
