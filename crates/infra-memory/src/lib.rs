// Demarc In-Memory Infrastructure
// Manager-port adapters backed by a staged-write store, used by the
// integration tests and demos. Failure injection covers every
// resolution-phase error path the engine arbitrates.

pub mod direct;
pub mod managed;
pub mod store;

pub use direct::MemoryDirectManager;
pub use managed::MemoryManagedManager;
pub use store::MemoryStore;
