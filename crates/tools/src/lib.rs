//! Draftbench Tools
//!
//! The tool contract layer: declarative descriptions of the five file
//! operations bound to executable handlers. Handlers branch on the
//! workspace mode carried by the per-call context — remote mode performs
//! the operation against the storage backend, local mode returns a
//! structured instruction for the client to apply, never both.

pub mod context;
pub mod file_tools;
pub mod trait_def;

pub use context::ToolContext;
pub use file_tools::default_file_tools;
pub use trait_def::{Tool, ToolRegistry};
