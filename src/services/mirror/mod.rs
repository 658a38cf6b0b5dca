//! Client-Side Mirror & Sync

pub mod autosave;
pub mod engine;

pub use autosave::{AutosaveScheduler, DEFAULT_AUTOSAVE_DELAY};
pub use engine::MirrorEngine;
