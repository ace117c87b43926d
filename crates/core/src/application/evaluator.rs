// Outcome Evaluation - pure decision rules

use std::any::Any;

use tracing::warn;

use crate::domain::error::{BusinessError, ErrorKind};
use crate::domain::outcome::Disposition;
use crate::domain::policy::TxPolicy;

/// Decide the boundary disposition for an error of the given kind.
///
/// Pure function of (error kind, rollback rules); evaluated exactly once
/// per error, never re-evaluated after the handle is resolved. Default
/// rules roll back on every kind; an exclusion forces commit-despite-error.
pub fn disposition_for(policy: &TxPolicy, kind: &ErrorKind) -> Disposition {
    if policy.rollback_on(kind) {
        Disposition::Rollback
    } else {
        Disposition::Commit
    }
}

/// Classify an unwind payload into a business error.
///
/// A `BusinessError` payload keeps its declared kind. Bare string panics
/// are treated as RuntimeError. Anything else becomes an opaque
/// RuntimeError so arbitration can still run.
pub fn classify_panic(payload: Box<dyn Any + Send>) -> BusinessError {
    match payload.downcast::<BusinessError>() {
        Ok(err) => *err,
        Err(payload) => {
            let message = if let Some(s) = payload.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = payload.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic payload".to_string()
            };

            warn!(panic_msg = %message, "Callable unwound with a non-business payload");
            BusinessError::runtime(message)
        }
    }
}
