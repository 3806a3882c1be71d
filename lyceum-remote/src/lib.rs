//! LYCEUM Remote - Accessor Boundary and Reference Backend
//!
//! Defines the accessor abstraction over the hosted backend. Each trait
//! method performs exactly one remote call: no caching, no retries, no
//! optimistic logic. The in-memory implementation is the reference backend
//! used by tests and local development.

pub mod memory;
pub mod service;
pub mod session;

pub use memory::InMemoryRemote;
pub use service::RemoteService;
pub use session::{require_identity, Identity, SessionProvider, StaticSession};
