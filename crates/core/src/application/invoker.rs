// Transaction Invocation Dispatcher

use std::panic::{catch_unwind, UnwindSafe};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::application::evaluator;
use crate::domain::outcome::{Disposition, OpResult, Outcome, Reply, ReturnContract};
use crate::domain::policy::TxPolicy;
use crate::error::{Result, TxError};
use crate::port::attribute_resolver::AttributeResolver;
use crate::port::transaction_manager::{
    BoundaryHandle, Coordinator, DirectTransactionManager, ManagedTransactionManager, ManagerError,
};

/// Demarcates a unit-of-work boundary around arbitrary callables and
/// arbitrates commit vs rollback from how each callable terminated.
///
/// Per invocation: resolve the policy for the signature (none means
/// identity pass-through), require a classified coordinator, run the
/// callable under the direct or managed protocol, and convert the outcome
/// per the callable's declared return contract.
pub struct TransactionInvoker {
    resolver: Arc<dyn AttributeResolver>,
    coordinator: Option<Coordinator>,
}

impl TransactionInvoker {
    /// `coordinator: None` models a configured manager that fits neither
    /// protocol; any demarcated signature then fails fast.
    pub fn new(resolver: Arc<dyn AttributeResolver>, coordinator: Option<Coordinator>) -> Self {
        Self {
            resolver,
            coordinator,
        }
    }

    /// Invoke a raw-contract callable.
    ///
    /// The callable's business error (raised via unwind) surfaces as
    /// `TxError::Invocation` after rollback arbitration; a failed commit or
    /// rollback surfaces as `TxError::Resolution`, so the two are
    /// distinguishable at the call site.
    pub fn invoke<V>(
        &self,
        signature: &str,
        callable: impl FnOnce() -> V + UnwindSafe,
    ) -> Result<V> {
        let Some(policy) = self.resolver.resolve(signature) else {
            debug!(signature, "No transaction attribute; pass-through");
            return Ok(callable());
        };

        let reply = self.run(
            signature,
            &policy,
            ReturnContract::Raw,
            move || capture_raw(callable),
        )?;

        match reply {
            Reply::Value(v) => Ok(v),
            Reply::Failure(err) => Err(TxError::Invocation(err)),
        }
    }

    /// Invoke a fallible-contract callable.
    ///
    /// Business errors and resolution failures are absorbed into the
    /// returned result container; only configuration and begin failures
    /// escape as `TxError`. No error ever unwinds out of this call.
    pub fn invoke_fallible<V>(
        &self,
        signature: &str,
        callable: impl FnOnce() -> OpResult<V> + UnwindSafe,
    ) -> Result<OpResult<V>> {
        let Some(policy) = self.resolver.resolve(signature) else {
            debug!(signature, "No transaction attribute; pass-through");
            return Ok(callable());
        };

        let reply = self.run(
            signature,
            &policy,
            ReturnContract::Fallible,
            move || capture_fallible(callable),
        )?;

        Ok(match reply {
            Reply::Value(v) => Ok(v),
            Reply::Failure(err) => Err(err),
        })
    }

    fn run<V>(
        &self,
        signature: &str,
        policy: &TxPolicy,
        contract: ReturnContract,
        capture: impl FnOnce() -> Outcome<V>,
    ) -> Result<Reply<V>> {
        match self.require_coordinator(signature)? {
            Coordinator::Direct(mgr) => {
                self.run_direct(signature, policy, mgr.as_ref(), contract, capture)
            }
            Coordinator::Managed(mgr) => {
                self.run_managed(signature, policy, mgr.as_ref(), contract, capture)
            }
        }
    }

    fn require_coordinator(&self, signature: &str) -> Result<&Coordinator> {
        self.coordinator.as_ref().ok_or_else(|| {
            error!(
                signature,
                "Demarcated signature but no classifiable transaction manager"
            );
            TxError::Configuration(format!(
                "no usable transaction manager configured for '{signature}'"
            ))
        })
    }

    /// Direct protocol: the engine owns begin/commit/rollback.
    fn run_direct<V>(
        &self,
        signature: &str,
        policy: &TxPolicy,
        mgr: &dyn DirectTransactionManager,
        contract: ReturnContract,
        capture: impl FnOnce() -> Outcome<V>,
    ) -> Result<Reply<V>> {
        let handle = mgr.begin(policy).map_err(|err| {
            error!(signature, error = %err, "Transaction begin failed");
            TxError::Begin(err)
        })?;
        let handle_id = handle.id();
        debug!(signature, %handle_id, "Transaction boundary opened");

        match capture() {
            Outcome::Raised(err) => {
                let disposition = evaluator::disposition_for(policy, &err.kind);
                let resolved = match disposition {
                    Disposition::Rollback => {
                        handle.set_rollback_only();
                        warn!(
                            signature, %handle_id, error_kind = %err.kind,
                            "Callable raised; rolling back"
                        );
                        mgr.rollback(handle)
                    }
                    Disposition::Commit => {
                        // Excluded kind: the boundary completes normally and
                        // the manager's own after-throw rule applies.
                        info!(
                            signature, %handle_id, error_kind = %err.kind,
                            "Callable raised excluded kind; completing normally"
                        );
                        mgr.commit(handle)
                    }
                };
                if let Err(res_err) = resolved {
                    error!(
                        signature, %handle_id, error = %res_err,
                        original_error = %err, "Resolution failed after callable error"
                    );
                    return resolution_failure(contract, res_err);
                }
                debug!(signature, %handle_id, %disposition, "Boundary resolved");
                Ok(Reply::Failure(err))
            }
            Outcome::Failure(err) => {
                // The error is data, not control flow: it was never going to
                // unwind, so it flows back to the caller unchanged even when
                // the boundary rolls back underneath it.
                let disposition = evaluator::disposition_for(policy, &err.kind);
                if disposition == Disposition::Rollback {
                    handle.set_rollback_only();
                    info!(
                        signature, %handle_id, error_kind = %err.kind,
                        "Failure value marks boundary rollback-only"
                    );
                }
                if let Err(res_err) = mgr.commit(handle) {
                    error!(
                        signature, %handle_id, error = %res_err,
                        "Resolution failed after failure value"
                    );
                    return resolution_failure(contract, res_err);
                }
                debug!(signature, %handle_id, %disposition, "Boundary resolved");
                Ok(Reply::Failure(err))
            }
            Outcome::Plain(v) | Outcome::Success(v) => {
                // No raise, no failure value: disposition is unconditionally
                // commit and the rollback predicate is never consulted.
                if let Err(res_err) = mgr.commit(handle) {
                    error!(
                        signature, %handle_id, error = %res_err,
                        "Commit failed after successful callable"
                    );
                    return resolution_failure(contract, res_err);
                }
                debug!(
                    signature, %handle_id, disposition = %Disposition::Commit,
                    "Boundary resolved"
                );
                Ok(Reply::Value(v))
            }
        }
    }

    /// Managed protocol: the manager owns the callback and the resolution.
    fn run_managed<V>(
        &self,
        signature: &str,
        policy: &TxPolicy,
        mgr: &dyn ManagedTransactionManager,
        contract: ReturnContract,
        capture: impl FnOnce() -> Outcome<V>,
    ) -> Result<Reply<V>> {
        // The body smuggles its reply out through this slot; the manager
        // only sees the rollback-only flag it left on the handle.
        let mut slot: Option<Reply<V>> = None;
        let mut capture = Some(capture);

        let executed = mgr.execute(policy, &mut |handle| {
            let Some(capture) = capture.take() else {
                warn!(signature, "Manager invoked transaction body more than once");
                return;
            };
            slot = Some(evaluate_in_boundary(signature, policy, handle, capture()));
        });

        match executed {
            Ok(()) => slot.ok_or_else(|| {
                error!(signature, "Manager completed without invoking the body");
                TxError::Manager(ManagerError::execute(
                    "manager completed without invoking the transaction body",
                ))
            }),
            Err(mgr_err) => {
                // Outermost fatal case: a systemic manager failure, distinct
                // from anything the callable did. Never retried.
                error!(signature, error = %mgr_err, "Managed execution failed");
                match contract {
                    ReturnContract::Fallible => Ok(Reply::Failure(mgr_err.into_business())),
                    ReturnContract::Raw => Err(TxError::Manager(mgr_err)),
                }
            }
        }
    }
}

/// Shared evaluation for the managed body: capture the termination, run the
/// rollback predicate, mark the handle, and hand the manager back a value.
/// The manager performs the actual commit/rollback from the flag.
fn evaluate_in_boundary<V>(
    signature: &str,
    policy: &TxPolicy,
    handle: &BoundaryHandle,
    outcome: Outcome<V>,
) -> Reply<V> {
    let handle_id = handle.id();
    match outcome {
        Outcome::Plain(v) | Outcome::Success(v) => Reply::Value(v),
        Outcome::Failure(err) => {
            if evaluator::disposition_for(policy, &err.kind) == Disposition::Rollback {
                handle.set_rollback_only();
                info!(
                    signature, %handle_id, error_kind = %err.kind,
                    "Failure value marks boundary rollback-only"
                );
            }
            Reply::Failure(err)
        }
        Outcome::Raised(err) => {
            if evaluator::disposition_for(policy, &err.kind) == Disposition::Rollback {
                handle.set_rollback_only();
                warn!(
                    signature, %handle_id, error_kind = %err.kind,
                    "Callable raised; boundary marked rollback-only"
                );
            } else {
                info!(
                    signature, %handle_id, error_kind = %err.kind,
                    "Callable raised excluded kind; boundary left to commit"
                );
            }
            Reply::Failure(err)
        }
    }
}

fn resolution_failure<V>(contract: ReturnContract, err: ManagerError) -> Result<Reply<V>> {
    match contract {
        // The fallible contract absorbs the resolution error, discarding
        // whatever the callable produced.
        ReturnContract::Fallible => Ok(Reply::Failure(err.into_business())),
        ReturnContract::Raw => Err(TxError::Resolution(err)),
    }
}

/// Capture a raw-contract termination as an Outcome
fn capture_raw<V>(callable: impl FnOnce() -> V + UnwindSafe) -> Outcome<V> {
    match catch_unwind(callable) {
        Ok(v) => Outcome::Plain(v),
        Err(payload) => Outcome::Raised(evaluator::classify_panic(payload)),
    }
}

/// Capture a fallible-contract termination as an Outcome.
/// A fallible callable should not unwind, but if it does the raise is still
/// captured so the declared contract can be honored.
fn capture_fallible<V>(callable: impl FnOnce() -> OpResult<V> + UnwindSafe) -> Outcome<V> {
    match catch_unwind(callable) {
        Ok(Ok(v)) => Outcome::Success(v),
        Ok(Err(err)) => Outcome::Failure(err),
        Err(payload) => Outcome::Raised(evaluator::classify_panic(payload)),
    }
}
