//! Draftbench Storage
//!
//! The storage backend abstraction: one uniform contract
//! (create/read/update/delete/list) over a named hierarchical namespace,
//! with two implementations — the server-side workspace directory
//! (`DiskBackend`) and the browser-granted local directory capability
//! (`GrantedDirBackend`). Both validate every path independently before
//! any I/O; neither relies on the other's enforcement because they are
//! deployed on opposite sides of the trust boundary.

pub mod backend;
pub mod disk;
pub mod granted;
pub mod paths;

pub use backend::StorageBackend;
pub use disk::DiskBackend;
pub use granted::{FsDirHandle, GrantState, GrantedDirBackend, LocalDirHandle};
