//! Local-mode turns: relayed writes flow through the mirror engine into a
//! granted local directory, never through the server workspace.

use std::sync::Arc;

use draftbench_core::ChatEvent;
use draftbench_storage::{FsDirHandle, GrantedDirBackend};
use draftbench::MirrorEngine;

use crate::support::{call, collect, orchestrator, request, Round, ScriptedProvider};

#[tokio::test]
async fn relayed_write_lands_in_granted_directory_only() {
    let (server_dir, orchestrator) = orchestrator();
    let client_dir = tempfile::tempdir().unwrap();

    let provider = ScriptedProvider::new(vec![
        Round::tools(vec![call(
            "tc_1",
            "createFile",
            serde_json::json!({
                "fileName": "app.js",
                "content": "console.log('local')",
                "reason": "bootstrap"
            }),
        )]),
        Round::text("Created app.js in your project."),
    ]);

    let rx = orchestrator
        .converse_with(request("add app.js", true), provider)
        .unwrap();
    let events = collect(rx).await;

    // Server workspace untouched in local mode.
    assert!(!server_dir.path().join("app.js").exists());

    // The client mirror applies the relayed write against the granted
    // local directory.
    let handle = Arc::new(FsDirHandle::new(client_dir.path()));
    let mirror = MirrorEngine::new(GrantedDirBackend::new(handle));

    for event in &events {
        if let ChatEvent::ToolResult { tool_id, outcome } = event {
            mirror.on_tool_result(tool_id, outcome).await.unwrap();
        }
    }

    assert_eq!(
        std::fs::read_to_string(client_dir.path().join("app.js")).unwrap(),
        "console.log('local')"
    );
}

#[tokio::test]
async fn replayed_events_apply_once() {
    let (_server_dir, orchestrator) = orchestrator();
    let client_dir = tempfile::tempdir().unwrap();

    let provider = ScriptedProvider::new(vec![
        Round::tools(vec![call(
            "tc_1",
            "updateFile",
            serde_json::json!({
                "fileName": "index.html",
                "content": "<body>v1</body>",
                "reason": "update body"
            }),
        )]),
        Round::text("Updated."),
    ]);

    let rx = orchestrator
        .converse_with(request("update the body", true), provider)
        .unwrap();
    let events = collect(rx).await;

    let handle = Arc::new(FsDirHandle::new(client_dir.path()));
    let mirror = MirrorEngine::new(GrantedDirBackend::new(handle));

    let (tool_id, outcome) = events
        .iter()
        .find_map(|e| match e {
            ChatEvent::ToolResult { tool_id, outcome } => Some((tool_id, outcome)),
            _ => None,
        })
        .unwrap();

    assert!(mirror.on_tool_result(tool_id, outcome).await.unwrap());

    // Simulate a client reconnect replaying the same event after the user
    // edited the file.
    std::fs::write(client_dir.path().join("index.html"), "<body>edited</body>").unwrap();
    assert!(!mirror.on_tool_result(tool_id, outcome).await.unwrap());
    assert_eq!(
        std::fs::read_to_string(client_dir.path().join("index.html")).unwrap(),
        "<body>edited</body>"
    );
}

#[tokio::test]
async fn local_reads_fail_without_aborting_the_turn() {
    let (_server_dir, orchestrator) = orchestrator();

    let provider = ScriptedProvider::new(vec![
        Round::tools(vec![call(
            "tc_1",
            "readFile",
            serde_json::json!({"fileName": "secret.txt"}),
        )]),
        Round::text("I cannot read files in your local workspace."),
    ]);

    let rx = orchestrator
        .converse_with(request("what's in secret.txt?", true), provider)
        .unwrap();
    let events = collect(rx).await;

    let outcome = events
        .iter()
        .find_map(|e| match e {
            ChatEvent::ToolResult { outcome, .. } => Some(outcome),
            _ => None,
        })
        .unwrap();
    assert!(!outcome.is_success());
    assert!(outcome.error().unwrap().contains("local mode"));
    assert!(matches!(events.last(), Some(ChatEvent::StreamEnd { .. })));
}

#[tokio::test]
async fn revoked_grant_blocks_mirror_application() {
    let (_server_dir, orchestrator) = orchestrator();
    let client_dir = tempfile::tempdir().unwrap();

    let provider = ScriptedProvider::new(vec![
        Round::tools(vec![call(
            "tc_1",
            "createFile",
            serde_json::json!({
                "fileName": "blocked.txt",
                "content": "nope",
                "reason": "test"
            }),
        )]),
        Round::text("Done."),
    ]);

    let rx = orchestrator
        .converse_with(request("create blocked.txt", true), provider)
        .unwrap();
    let events = collect(rx).await;

    let handle = Arc::new(FsDirHandle::new(client_dir.path()));
    handle.revoke();
    let mirror = MirrorEngine::new(GrantedDirBackend::new(handle));

    for event in &events {
        if let ChatEvent::ToolResult { tool_id, outcome } = event {
            let result = mirror.on_tool_result(tool_id, outcome).await;
            if outcome.pending_local_write().is_some() {
                assert!(result.is_err(), "revoked grant must deny the write");
            }
        }
    }
    assert!(!client_dir.path().join("blocked.txt").exists());
}
