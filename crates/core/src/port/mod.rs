// Port Layer - Interfaces for external dependencies

pub mod attribute_resolver;
pub mod transaction_manager;

// Re-exports
pub use attribute_resolver::{AttributeResolver, StaticAttributeResolver};
pub use transaction_manager::{
    BoundaryHandle, Coordinator, DirectTransactionManager, ManagedTransactionManager,
    ManagerError, ManagerPhase,
};
