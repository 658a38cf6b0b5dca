//! Remote-mode conversation turns end to end.

use draftbench_core::ChatEvent;

use crate::support::{call, collect, orchestrator, request, Round, ScriptedProvider};

#[tokio::test]
async fn create_then_list_round_trip() {
    let (dir, orchestrator) = orchestrator();

    let provider = ScriptedProvider::new(vec![
        Round::tools(vec![call(
            "tc_1",
            "createFile",
            serde_json::json!({
                "fileName": "welcome.html",
                "content": "<h1>Hi</h1>",
                "reason": "landing page"
            }),
        )]),
        Round::tools(vec![call(
            "tc_2",
            "listFiles",
            serde_json::json!({}),
        )]),
        Round::text("Created welcome.html."),
    ]);

    let rx = orchestrator
        .converse_with(request("make a landing page", false), provider)
        .unwrap();
    let events = collect(rx).await;

    // The create was applied to the workspace.
    assert_eq!(
        std::fs::read_to_string(dir.path().join("welcome.html")).unwrap(),
        "<h1>Hi</h1>"
    );

    // The listing in the same turn sees the new file exactly once.
    let listed = events
        .iter()
        .find_map(|e| match e {
            ChatEvent::ToolResult { tool_id, outcome } if tool_id == "tc_2" => Some(outcome),
            _ => None,
        })
        .unwrap();
    match listed {
        draftbench_core::ToolOutcome::Listed { files, .. } => {
            assert_eq!(
                files.iter().filter(|f| *f == "welcome.html").count(),
                1
            );
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    assert!(matches!(events.last(), Some(ChatEvent::StreamEnd { .. })));
}

#[tokio::test]
async fn multiple_calls_in_one_round_all_flush_before_end() {
    let (dir, orchestrator) = orchestrator();

    let provider = ScriptedProvider::new(vec![
        Round::tools(vec![
            call(
                "tc_1",
                "createFile",
                serde_json::json!({
                    "fileName": "index.html",
                    "content": "<html></html>",
                    "reason": "page"
                }),
            ),
            call(
                "tc_2",
                "createFile",
                serde_json::json!({
                    "fileName": "style.css",
                    "content": "body {}",
                    "reason": "styles"
                }),
            ),
        ]),
        Round::text("Both files created."),
    ]);

    let rx = orchestrator
        .converse_with(request("page with styles", false), provider)
        .unwrap();
    let events = collect(rx).await;

    assert!(dir.path().join("index.html").exists());
    assert!(dir.path().join("style.css").exists());

    let end = events
        .iter()
        .position(|e| matches!(e, ChatEvent::StreamEnd { .. }))
        .unwrap();
    for id in ["tc_1", "tc_2"] {
        let result = events
            .iter()
            .position(|e| {
                matches!(e, ChatEvent::ToolResult { tool_id, .. } if tool_id == id)
            })
            .unwrap();
        assert!(result < end, "result for {} flushed after StreamEnd", id);
    }
}

#[tokio::test]
async fn per_call_ordering_start_ready_result() {
    let (_dir, orchestrator) = orchestrator();

    let provider = ScriptedProvider::new(vec![
        Round::tools(vec![call(
            "tc_1",
            "deleteFile",
            serde_json::json!({"fileName": "missing.txt", "reason": "cleanup"}),
        )]),
        Round::text("That file was already gone."),
    ]);

    let rx = orchestrator
        .converse_with(request("remove missing.txt", false), provider)
        .unwrap();
    let events = collect(rx).await;

    let for_call: Vec<&ChatEvent> = events
        .iter()
        .filter(|e| e.tool_id() == Some("tc_1"))
        .collect();
    assert_eq!(for_call.len(), 3);
    assert!(matches!(for_call[0], ChatEvent::ToolCallStart { .. }));
    assert!(matches!(for_call[1], ChatEvent::ToolCallReady { .. }));
    // Deleting a missing file is a failure outcome, not a turn abort.
    match for_call[2] {
        ChatEvent::ToolResult { outcome, .. } => {
            assert!(!outcome.is_success());
            assert!(outcome.error().unwrap().contains("Not found"));
        }
        other => panic!("unexpected event: {:?}", other),
    }
    assert!(matches!(events.last(), Some(ChatEvent::StreamEnd { .. })));
}

#[tokio::test]
async fn unknown_provider_fails_before_any_stream() {
    let (_dir, orchestrator) = orchestrator();
    let mut req = request("hello", false);
    req.provider = "mystery".to_string();
    assert!(orchestrator.converse(req).is_err());
}

#[tokio::test]
async fn missing_credential_fails_before_any_stream() {
    let (_dir, orchestrator) = orchestrator();
    let mut req = request("hello", false);
    req.provider = "anthropic".to_string();
    req.model = "claude-sonnet-4-5".to_string();
    // No ANTHROPIC_API_KEY in the test config.
    assert!(orchestrator.converse(req).is_err());
}
