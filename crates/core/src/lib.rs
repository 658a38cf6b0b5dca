//! Draftbench Core
//!
//! Dependency-light foundation for the Draftbench workspace: the error
//! taxonomy shared by every layer, the workspace mode flag, the file-item
//! data model, tool outcomes, and the chat stream event types.
//!
//! Heavier concerns (storage I/O, tool execution, provider HTTP) live in
//! their own crates and depend on this one.

pub mod error;
pub mod events;
pub mod files;
pub mod outcome;
pub mod workspace;

pub use error::{CoreError, CoreResult};
pub use events::ChatEvent;
pub use files::{FileItem, FileKind};
pub use outcome::{FileOperation, PendingLocalWrite, ToolOutcome};
pub use workspace::WorkspaceMode;
