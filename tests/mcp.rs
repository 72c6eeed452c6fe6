//! Stdio transport integration tests

use serde_json::{Value, json};
use talk_mcp::mcp::stdio::serve_streams;

mod common;
use common::Fixture;

/// Feed newline-delimited messages through the stdio loop and collect responses
async fn exchange(fixture: &Fixture, input: &str) -> Vec<Value> {
    let server = fixture.server();
    let mut output = Vec::new();

    serve_streams(&server, input.as_bytes(), &mut output)
        .await
        .unwrap();

    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn lines(messages: &[Value]) -> String {
    messages.iter().map(|m| format!("{m}\n")).collect()
}

#[tokio::test]
async fn test_initialize_handshake() {
    let fixture = Fixture::new();
    let input = lines(&[
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {"protocolVersion": "1999-01-01", "capabilities": {}}
        }),
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        json!({"jsonrpc": "2.0", "id": 2, "method": "ping"}),
    ]);

    let responses = exchange(&fixture, &input).await;

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[0]["result"]["protocolVersion"], "2025-03-26");
    assert!(responses[0]["result"]["instructions"].is_string());
    assert_eq!(responses[1]["id"], 2);
    assert_eq!(responses[1]["result"], json!({}));
}

#[tokio::test]
async fn test_blank_lines_are_skipped() {
    let fixture = Fixture::new();
    let input = format!("\n   \n{}\n\n", json!({"jsonrpc": "2.0", "id": 1, "method": "ping"}));

    let responses = exchange(&fixture, &input).await;

    assert_eq!(responses.len(), 1);
}

#[tokio::test]
async fn test_unknown_method() {
    let fixture = Fixture::new();
    let input = lines(&[json!({"jsonrpc": "2.0", "id": 3, "method": "resources/list"})]);

    let responses = exchange(&fixture, &input).await;

    assert_eq!(responses[0]["error"]["code"], -32601);
}

#[tokio::test]
async fn test_parse_error_then_continue() {
    let fixture = Fixture::new();
    let input = format!(
        "this is not json\n{}\n",
        json!({"jsonrpc": "2.0", "id": 4, "method": "ping"})
    );

    let responses = exchange(&fixture, &input).await;

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["error"]["code"], -32700);
    assert_eq!(responses[0]["id"], Value::Null);
    assert_eq!(responses[1]["id"], 4);
}

#[tokio::test]
async fn test_wrong_jsonrpc_version() {
    let fixture = Fixture::new();
    let input = lines(&[json!({"jsonrpc": "1.0", "id": 5, "method": "ping"})]);

    let responses = exchange(&fixture, &input).await;

    assert_eq!(responses[0]["error"]["code"], -32600);
    assert_eq!(responses[0]["id"], 5);
}

#[tokio::test]
async fn test_batch_is_rejected() {
    let fixture = Fixture::new();
    let input = lines(&[json!([{"jsonrpc": "2.0", "id": 6, "method": "ping"}])]);

    let responses = exchange(&fixture, &input).await;

    assert_eq!(responses[0]["error"]["code"], -32600);
}

#[tokio::test]
async fn test_prompts_list_and_get() {
    let fixture = Fixture::new();
    let input = lines(&[
        json!({"jsonrpc": "2.0", "id": 1, "method": "prompts/list"}),
        json!({
            "jsonrpc": "2.0",
            "id": 2,
            "method": "prompts/get",
            "params": {"name": "spoken_keypoints_prompt"}
        }),
        json!({
            "jsonrpc": "2.0",
            "id": 3,
            "method": "prompts/get",
            "params": {"name": "missing"}
        }),
    ]);

    let responses = exchange(&fixture, &input).await;

    assert_eq!(
        responses[0]["result"]["prompts"][0]["name"],
        "spoken_keypoints_prompt"
    );
    assert_eq!(
        responses[1]["result"]["messages"][0]["content"]["text"],
        talk_mcp::prompt::SPOKEN_KEYPOINTS_PROMPT
    );
    assert_eq!(responses[2]["error"]["code"], -32602);
}

#[tokio::test]
async fn test_voice_persists_across_stdio_calls() {
    let fixture = Fixture::new();
    let input = lines(&[
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": {"name": "set_voice", "arguments": {"voice_id": "v1"}}
        }),
        json!({
            "jsonrpc": "2.0",
            "id": 2,
            "method": "tools/call",
            "params": {"name": "speak", "arguments": {"text": "Refactor complete."}}
        }),
    ]);

    let responses = exchange(&fixture, &input).await;

    assert_eq!(responses[1]["result"]["content"][0]["text"], "Spoken.");
    assert_eq!(fixture.synthesizer.calls()[0].voice_id, "v1");
    assert!(fixture.leftover_artifacts().is_empty());
}

#[tokio::test]
async fn test_client_response_is_ignored() {
    let fixture = Fixture::new();
    let input = lines(&[json!({"jsonrpc": "2.0", "id": 9, "result": {}})]);

    let responses = exchange(&fixture, &input).await;

    assert!(responses.is_empty());
}

#[tokio::test]
async fn test_null_id_gets_a_response() {
    let fixture = Fixture::new();
    let input = lines(&[json!({"jsonrpc": "2.0", "id": null, "method": "ping"})]);

    let responses = exchange(&fixture, &input).await;

    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["id"], Value::Null);
    assert_eq!(responses[0]["result"], json!({}));
}
