// Attribute Resolver Port (per-signature policy lookup)

use std::collections::HashMap;

use serde::Deserialize;

use crate::domain::policy::TxPolicy;

/// Resolves the transaction policy declared for a call signature.
///
/// `None` means no boundary is demarcated for that signature and the
/// invoker passes the callable through untouched.
pub trait AttributeResolver: Send + Sync {
    fn resolve(&self, signature: &str) -> Option<TxPolicy>;
}

/// Lookup-table resolver (production).
///
/// Explicit replacement for call-time annotation scanning: policies are
/// registered once per signature, either programmatically or from a
/// deserialized configuration table, and resolution is a plain map lookup.
#[derive(Debug, Default, Deserialize)]
pub struct StaticAttributeResolver {
    #[serde(flatten)]
    policies: HashMap<String, TxPolicy>,
}

impl StaticAttributeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a pre-assembled signature -> policy table
    pub fn from_table(policies: HashMap<String, TxPolicy>) -> Self {
        Self { policies }
    }

    /// Register a policy for a signature (builder-style)
    pub fn with_policy(mut self, signature: impl Into<String>, policy: TxPolicy) -> Self {
        self.policies.insert(signature.into(), policy);
        self
    }
}

impl AttributeResolver for StaticAttributeResolver {
    fn resolve(&self, signature: &str) -> Option<TxPolicy> {
        self.policies.get(signature).cloned()
    }
}
