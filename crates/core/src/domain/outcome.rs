// Callable Termination & Boundary Disposition Types

use super::error::BusinessError;

/// The result container used by fallible return contracts.
/// The failure arm carries the error as ordinary data, without unwinding.
pub type OpResult<V> = std::result::Result<V, BusinessError>;

/// Tagged classification of how a callable terminated.
///
/// Produced exactly once per invocation by the capture adapter, so the
/// evaluator never needs to ask "did it unwind or did it return a failure"
/// anywhere else.
#[derive(Debug)]
pub enum Outcome<V> {
    /// Returned an ordinary value (raw contract)
    Plain(V),
    /// Returned the success arm of the result container
    Success(V),
    /// Returned the failure arm of the result container
    Failure(BusinessError),
    /// Unwound instead of returning
    Raised(BusinessError),
}

/// Final commit-or-rollback decision for one boundary.
/// Decided once per invocation, never revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Commit,
    Rollback,
}

impl std::fmt::Display for Disposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Disposition::Commit => write!(f, "COMMIT"),
            Disposition::Rollback => write!(f, "ROLLBACK"),
        }
    }
}

/// Declared return contract of the wrapped callable.
///
/// Drives how failures surface: a `Fallible` contract absorbs business and
/// resolution errors into the result container; a `Raw` contract always
/// sees them raised one layer up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnContract {
    Raw,
    Fallible,
}

/// Contract-aware value leaving the execution paths.
///
/// `Failure` carries a business-sourced error that the dispatcher converts
/// per contract: into the result container for fallible callables, into a
/// raised invocation failure for raw ones.
#[derive(Debug)]
pub enum Reply<V> {
    Value(V),
    Failure(BusinessError),
}
