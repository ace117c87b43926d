// Application Layer - invocation dispatch and outcome evaluation

pub mod evaluator;
pub mod invoker;

pub use invoker::TransactionInvoker;
