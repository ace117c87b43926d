// Transaction Policy Domain Model

use serde::{Deserialize, Serialize};

use super::error::ErrorKind;

/// Propagation mode requested from the underlying manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Propagation {
    #[default]
    Required,
    RequiresNew,
    Supports,
    Mandatory,
    NotSupported,
    Never,
}

/// Isolation level requested from the underlying manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Isolation {
    #[default]
    Default,
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl std::fmt::Display for Propagation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Propagation::Required => write!(f, "REQUIRED"),
            Propagation::RequiresNew => write!(f, "REQUIRES_NEW"),
            Propagation::Supports => write!(f, "SUPPORTS"),
            Propagation::Mandatory => write!(f, "MANDATORY"),
            Propagation::NotSupported => write!(f, "NOT_SUPPORTED"),
            Propagation::Never => write!(f, "NEVER"),
        }
    }
}

/// Rollback predicate configuration.
///
/// Default: every error kind triggers rollback. Listed exclusions override
/// the default and force a commit-despite-error for that kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackRules {
    #[serde(default)]
    no_rollback_for: Vec<ErrorKind>,
}

impl RollbackRules {
    /// Rules that roll back on every error kind
    pub fn rollback_on_all() -> Self {
        Self::default()
    }

    /// Rules that exclude the given kinds from rollback
    pub fn excluding(kinds: impl IntoIterator<Item = ErrorKind>) -> Self {
        Self {
            no_rollback_for: kinds.into_iter().collect(),
        }
    }

    pub fn rollback_on(&self, kind: &ErrorKind) -> bool {
        !self.no_rollback_for.contains(kind)
    }
}

/// Per-signature transaction policy.
///
/// Resolved once by the attribute resolver, immutable for the duration of
/// one invocation. Propagation, isolation and timeout are carried through
/// to the underlying manager; only the rollback rules are interpreted by
/// the engine itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxPolicy {
    #[serde(default)]
    pub propagation: Propagation,
    #[serde(default)]
    pub isolation: Isolation,
    /// Timeout in milliseconds, enforced by the manager (not this engine)
    #[serde(default)]
    pub timeout_ms: Option<i64>,
    #[serde(default)]
    pub rollback_rules: RollbackRules,
}

impl TxPolicy {
    /// Policy with default propagation/isolation and rollback-on-all rules
    pub fn rollback_on_all() -> Self {
        Self::default()
    }

    /// Policy whose rollback rules exclude the given kinds
    pub fn no_rollback_for(kinds: impl IntoIterator<Item = ErrorKind>) -> Self {
        Self {
            rollback_rules: RollbackRules::excluding(kinds),
            ..Self::default()
        }
    }

    /// Whether an error of this kind forces the boundary to roll back
    pub fn rollback_on(&self, kind: &ErrorKind) -> bool {
        self.rollback_rules.rollback_on(kind)
    }
}
