//! End-to-end arbitration over the callback-preferring manager.
//!
//! Same book catalog scenarios as the direct path, but the manager owns
//! the body invocation and resolves the boundary itself from the
//! rollback-only flag; the engine only observes the outcome inside the
//! body.

use std::sync::Arc;

use demarc_core::application::TransactionInvoker;
use demarc_core::domain::{BusinessError, ErrorKind, OpResult, TxPolicy};
use demarc_core::port::{Coordinator, StaticAttributeResolver};
use demarc_core::TxError;
use demarc_infra_memory::{MemoryManagedManager, MemoryStore};

fn setup() -> (TransactionInvoker, Arc<MemoryStore>, Arc<MemoryManagedManager>) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("info")
        .try_init();

    let store = Arc::new(MemoryStore::new());
    let mgr = Arc::new(MemoryManagedManager::new(store.clone()));
    let resolver = StaticAttributeResolver::new()
        .with_policy("BookService::add_book", TxPolicy::rollback_on_all())
        .with_policy(
            "BookService::add_book_lenient",
            TxPolicy::no_rollback_for([ErrorKind::illegal_state()]),
        );
    let invoker = TransactionInvoker::new(
        Arc::new(resolver),
        Some(Coordinator::Managed(mgr.clone())),
    );
    (invoker, store, mgr)
}

#[test]
fn test_successful_callable_commits_write() {
    let (invoker, store, _) = setup();
    let s = store.clone();

    let id = invoker
        .invoke("BookService::add_book", move || {
            s.put("book:1", "Title");
            1_i64
        })
        .unwrap();

    assert_eq!(id, 1);
    assert!(store.committed_contains("book:1"));
}

#[test]
fn test_raised_error_rolls_back_write_and_propagates() {
    let (invoker, store, _) = setup();
    let s = store.clone();

    let err = invoker
        .invoke("BookService::add_book", move || -> i64 {
            s.put("book:1", "Title");
            BusinessError::runtime("exception thrown intentionally").raise()
        })
        .unwrap_err();

    assert!(matches!(err, TxError::Invocation(_)));
    assert!(!store.committed_contains("book:1"));
}

#[test]
fn test_excluded_kind_commits_write_but_error_propagates() {
    let (invoker, store, _) = setup();
    let s = store.clone();

    let err = invoker
        .invoke("BookService::add_book_lenient", move || -> i64 {
            s.put("book:1", "Title");
            BusinessError::illegal_state("exception thrown intentionally").raise()
        })
        .unwrap_err();

    assert!(matches!(err, TxError::Invocation(_)));
    assert!(store.committed_contains("book:1"));
}

#[test]
fn test_fallible_raise_rolls_back_and_returns_failure_value() {
    let (invoker, store, _) = setup();
    let s = store.clone();

    let result = invoker
        .invoke_fallible("BookService::add_book", move || -> OpResult<i64> {
            s.put("book:1", "Title");
            BusinessError::runtime("exception thrown intentionally").raise()
        })
        .unwrap();

    let failure = result.unwrap_err();
    assert_eq!(failure.kind, ErrorKind::runtime());
    assert!(!store.committed_contains("book:1"));
}

#[test]
fn test_failure_as_data_rolls_back_but_value_unchanged() {
    let (invoker, store, _) = setup();
    let s = store.clone();

    let result = invoker
        .invoke_fallible("BookService::add_book", move || -> OpResult<i64> {
            s.put("book:1", "Title");
            Err(BusinessError::runtime("failure as data"))
        })
        .unwrap();

    let failure = result.unwrap_err();
    assert_eq!(failure.message, "failure as data");
    assert!(!store.committed_contains("book:1"));
}

#[test]
fn test_failure_as_data_excluded_kind_commits() {
    let (invoker, store, _) = setup();
    let s = store.clone();

    let result = invoker
        .invoke_fallible("BookService::add_book_lenient", move || -> OpResult<i64> {
            s.put("book:1", "Title");
            Err(BusinessError::illegal_state("failure as data"))
        })
        .unwrap();

    assert!(result.is_err());
    assert!(store.committed_contains("book:1"));
}

#[test]
fn test_systemic_failure_raw_contract_propagates() {
    let (invoker, store, mgr) = setup();
    mgr.fail_next_execute();
    let s = store.clone();

    let err = invoker
        .invoke("BookService::add_book", move || {
            s.put("book:1", "Title");
            1_i64
        })
        .unwrap_err();

    assert!(matches!(err, TxError::Manager(_)));
    assert!(!store.committed_contains("book:1"), "body never ran");
}

#[test]
fn test_systemic_failure_fallible_contract_becomes_failure_value() {
    let (invoker, _, mgr) = setup();
    mgr.fail_next_execute();

    let result = invoker
        .invoke_fallible("BookService::add_book", || Ok(1_i64))
        .unwrap();

    let failure = result.unwrap_err();
    assert_eq!(failure.kind, ErrorKind::new("ManagerError"));
}

#[test]
fn test_internal_commit_failure_fallible_contract() {
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
