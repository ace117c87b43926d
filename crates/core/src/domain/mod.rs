// Domain Layer - pure arbitration types, no infrastructure

pub mod error;
pub mod outcome;
pub mod policy;

pub use error::{BusinessError, ErrorKind};
pub use outcome::{Disposition, OpResult, Outcome, Reply, ReturnContract};
pub use policy::{Isolation, Propagation, RollbackRules, TxPolicy};
