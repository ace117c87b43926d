//! Resolution-phase failure arbitration over the direct-protocol manager.
//!
//! Infrastructure errors are never subject to the rollback predicate: they
//! always force a rollback-equivalent disposition and are always reported,
//! as a raised error or a failure value depending solely on the contract.

use std::sync::Arc;

use demarc_core::application::TransactionInvoker;
use demarc_core::domain::{BusinessError, ErrorKind, OpResult, TxPolicy};
use demarc_core::port::{Coordinator, StaticAttributeResolver};
use demarc_core::TxError;
use demarc_infra_memory::{MemoryDirectManager, MemoryStore};

fn setup() -> (TransactionInvoker, Arc<MemoryStore>, Arc<MemoryDirectManager>) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("info")
        .try_init();

    let store = Arc::new(MemoryStore::new());
    let mgr = Arc::new(MemoryDirectManager::new(store.clone()));
    let resolver = StaticAttributeResolver::new()
        .with_policy("BookService::add_book", TxPolicy::rollback_on_all());
    let invoker = TransactionInvoker::new(
        Arc::new(resolver),
        Some(Coordinator::Direct(mgr.clone())),
    );
    (invoker, store, mgr)
}

#[test]
fn test_begin_failure_surfaces_and_callable_never_runs() {
    let (invoker, store, mgr) = setup();
    mgr.fail_next_begin();
    let s = store.clone();

    let err = invoker
        .invoke("BookService::add_book", move || {
            s.put("book:1", "Title");
            1_i64
        })
        .unwrap_err();

    assert!(matches!(err, TxError::Begin(_)));
    assert!(!store.committed_contains("book:1"));
}

#[test]
fn test_begin_failure_surfaces_even_for_fallible_contract() {
    let (invoker, _, mgr) = setup();
    mgr.fail_next_begin();

    // Begin failures happen before the callable runs, so the result
    // container cannot absorb them.
    let err = invoker
        .invoke_fallible("BookService::add_book", || Ok(1_i64))
        .unwrap_err();
    assert!(matches!(err, TxError::Begin(_)));
}

#[test]
fn test_commit_failure_raw_contract_is_distinct_from_invocation_failure() {
    let (invoker, store, mgr) = setup();
    mgr.fail_next_commit();
    let s = store.clone();

    let err = invoker
        .invoke("BookService::add_book", move || {
            s.put("book:1", "Title");
            1_i64
        })
        .unwrap_err();

    assert!(matches!(err, TxError::Resolution(_)));
    assert!(!store.committed_contains("book:1"));
}

#[test]
fn test_commit_failure_fallible_contract_discards_success_value() {
    let (invoker, store, mgr) = setup();
    mgr.fail_next_commit();
    let s = store.clone();

    let result = invoker
        .invoke_fallible("BookService::add_book", move || {
            s.put("book:1", "Title");
            Ok(1_i64)
        })
        .unwrap();

    let failure = result.unwrap_err();
    assert_eq!(failure.kind, ErrorKind::new("CommitError"));
    assert!(!store.committed_contains("book:1"));
}

#[test]
fn test_rollback_failure_after_raised_error_raw_contract() {
    let (invoker, store, mgr) = setup();
    mgr.fail_next_rollback();
    let s = store.clone();

    let err = invoker
        .invoke("BookService::add_book", move || -> i64 {
            s.put("book:1", "Title");
            BusinessError::runtime("boom").raise()
        })
        .unwrap_err();

    // The failed close wins over the callable's own error.
    assert!(matches!(err, TxError::Resolution(_)));
    assert!(!store.committed_contains("book:1"));
}

#[test]
fn test_rollback_failure_after_raised_error_fallible_contract() {
    let (invoker, _, mgr) = setup();
    mgr.fail_next_rollback();

    let result = invoker
        .invoke_fallible("BookService::add_book", || -> OpResult<i64> {
            BusinessError::runtime("boom").raise()
        })
        .unwrap();

    let failure = result.unwrap_err();
    assert_eq!(failure.kind, ErrorKind::new("RollbackError"));
}

#[test]
fn test_commit_failure_after_failure_value_fallible_contract() {
    let (invoker, store, mgr) = setup();
    mgr.fail_next_commit();
    let s = store.clone();

    // Both the callable and the resolution fail; the resolution error is
    // what the caller sees, per the contract-dependent conversion.
    let result = invoker
        .invoke_fallible("BookService::add_book", move || -> OpResult<i64> {
            s.put("book:1", "Title");
            Err(BusinessError::runtime("failure as data"))
        })
        .unwrap();

    let failure = result.unwrap_err();
    assert_eq!(failure.kind, ErrorKind::new("CommitError"));
    assert!(!store.committed_contains("book:1"));
}
