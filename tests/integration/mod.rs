//! Integration tests
//!
//! End-to-end turns through the orchestrator with a scripted provider:
//! remote mode writing through the disk workspace, and local mode relaying
//! writes into the client mirror.

mod support;

mod conversation;
mod local_relay;
