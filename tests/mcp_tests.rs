//! MCP server integration tests
//!
//! These tests drive the stdio server with scripted JSON-RPC lines and check
//! the reading list tools end to end.

use feedmark::mcp::types::{JsonRpcRequest, JsonRpcResponse, ToolCallResult};
use feedmark::mcp::{McpServer, ToolRegistry, AVAILABLE_TOOLS, PROTOCOL_VERSION};
use feedmark::storage::ReadingList;
use feedmark::ExtractorConfig;
use serde_json::{json, Value};
use std::time::Duration;
use tempfile::tempdir;

const TIMELINE: &str = r#"<html><body>
    <article data-testid="tweet">
        <div data-testid="User-Name"><span>Ada</span><span>@ada</span></div>
        <div data-testid="tweetText">Notes on the analytical engine</div>
        <a href="https://t.co/engine">t.co/engine</a>
        <a href="https://x.com/ada/status/1">permalink</a>
    </article>
</body></html>"#;

fn registry() -> ToolRegistry {
    ToolRegistry::new(ReadingList::in_memory()).with_extractor_config(
        ExtractorConfig::builder()
            .initial_settle(Duration::ZERO)
            .scroll_settle(Duration::ZERO)
            .build(),
    )
}

fn server() -> McpServer {
    McpServer::with_auth_token(registry(), "")
}

fn call(id: i64, name: &str, arguments: Value) -> String {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": { "name": name, "arguments": arguments }
    })
    .to_string()
}

fn tool_text(response: &JsonRpcResponse) -> String {
    response.result.as_ref().unwrap()["content"][0]["text"]
        .as_str()
        .unwrap()
        .to_string()
}

async fn roundtrip(server: &McpServer, lines: &[String]) -> Vec<JsonRpcResponse> {
    let input = lines.join("\n");
    let mut output = Vec::new();
    server.serve(input.as_bytes(), &mut output).await.unwrap();

    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[test]
fn test_available_tools_listed() {
    assert_eq!(AVAILABLE_TOOLS.len(), 5);
    let names: Vec<_> = registry().definitions().into_iter().map(|d| d.name).collect();
    for tool in AVAILABLE_TOOLS {
        assert!(names.iter().any(|n| n == tool), "missing {}", tool);
    }
}

#[test]
fn test_request_parsing() {
    let request: JsonRpcRequest =
        serde_json::from_str(r#"{"jsonrpc":"2.0","method":"tools/list","id":1}"#).unwrap();
    assert_eq!(request.method, "tools/list");
}

#[tokio::test]
async fn test_session_lifecycle() {
    let server = server();
    let lines = vec![
        json!({"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":PROTOCOL_VERSION}}).to_string(),
        json!({"jsonrpc":"2.0","method":"notifications/initialized"}).to_string(),
        json!({"jsonrpc":"2.0","id":2,"method":"tools/list"}).to_string(),
        String::new(),
        json!({"jsonrpc":"2.0","id":3,"method":"ping"}).to_string(),
    ];

    let responses = roundtrip(&server, &lines).await;

    // The notification and the blank line produce nothing
    assert_eq!(responses.len(), 3);
    assert_eq!(responses[0].id, Some(json!(1)));
    assert_eq!(responses[1].result.as_ref().unwrap()["tools"].as_array().unwrap().len(), 5);
    assert_eq!(responses[2].id, Some(json!(3)));
}

#[tokio::test]
async fn test_extract_preview_and_clear() {
    let server = server();
    let lines = vec![
        call(1, "extract_urls", json!({ "html": TIMELINE, "wait": true })),
        call(2, "get_urls", json!({})),
        call(3, "preview_urls", json!({})),
        call(4, "clear_urls", json!({})),
        call(5, "get_urls", json!({})),
    ];

    let responses = roundtrip(&server, &lines).await;

    let extracted: Value = serde_json::from_str(&tool_text(&responses[0])).unwrap();
    assert_eq!(extracted["success"], json!(true));
    assert_eq!(extracted["saved"], json!(1));

    let listed: Value = serde_json::from_str(&tool_text(&responses[1])).unwrap();
    assert_eq!(listed["urls"][0]["url"], "https://t.co/engine");
    assert_eq!(listed["urls"][0]["author"], "@ada");
    assert_eq!(listed["urls"][0]["postText"], "Notes on the analytical engine");

    let preview = tool_text(&responses[2]);
    assert!(preview.starts_with("URLs: 1\n"));
    assert!(preview.contains("by @ada"));

    let after_clear: Value = serde_json::from_str(&tool_text(&responses[4])).unwrap();
    assert_eq!(after_clear, json!({ "urls": [] }));
}

#[tokio::test]
async fn test_extract_with_no_posts_still_acknowledges() {
    let result = registry()
        .execute(
            "extract_urls",
            json!({ "html": "<html><body><p>empty</p></body></html>", "wait": true }),
        )
        .await;

    assert!(!result.is_error);
    let body: Value = serde_json::from_str(result.first_text().unwrap()).unwrap();
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["saved"], json!(0));
    assert_eq!(body["report"]["scrolled"], json!(true));
}

#[tokio::test]
async fn test_extract_returns_before_pass_finishes() {
    let registry = ToolRegistry::default();
    let result = registry
        .execute("extract_urls", json!({ "html": TIMELINE }))
        .await;

    let body: Value = serde_json::from_str(result.first_text().unwrap()).unwrap();
    assert_eq!(body, json!({ "success": true }));
}

#[tokio::test]
async fn test_serve_finishes_acknowledged_pass_before_returning() {
    let registry = ToolRegistry::new(ReadingList::in_memory()).with_extractor_config(
        ExtractorConfig::builder()
            .initial_settle(Duration::from_millis(300))
            .scroll_settle(Duration::ZERO)
            .build(),
    );
    let server = McpServer::with_auth_token(registry, "");

    let responses = roundtrip(&server, &[call(1, "extract_urls", json!({ "html": TIMELINE }))]).await;
    let ack: Value = serde_json::from_str(&tool_text(&responses[0])).unwrap();
    assert_eq!(ack, json!({ "success": true }));

    let store = server.tools().store();
    let list = store.read().await;
    assert_eq!(list.len(), 1);
    assert_eq!(list.list_all()[0].url, "https://t.co/engine");
}

#[tokio::test]
async fn test_extract_requires_platform_page() {
    let result: ToolCallResult = registry()
        .execute("extract_urls", json!({ "url": "https://news.example.com/" }))
        .await;

    assert!(result.is_error);
    assert!(result.first_text().unwrap().contains("Please navigate to X (Twitter) first!"));
}

#[tokio::test]
async fn test_export_to_directory() {
    let dir = tempdir().unwrap();
    let registry = registry();
    registry
        .execute("extract_urls", json!({ "html": TIMELINE, "wait": true }))
        .await;

    let result = registry
        .execute("export_urls", json!({ "outDir": dir.path().to_str().unwrap() }))
        .await;
    assert!(!result.is_error);

    let body: Value = serde_json::from_str(result.first_text().unwrap()).unwrap();
    let path = body["path"].as_str().unwrap();
    let markdown = std::fs::read_to_string(path).unwrap();
    assert!(markdown.contains("<https://t.co/engine>"));
    assert_eq!(body["count"], json!(1));
}

#[tokio::test]
async fn test_auth_token_enforced_over_stdio() {
    let server = McpServer::with_auth_token(registry(), "letmein");
    let lines = vec![
        json!({"jsonrpc":"2.0","id":1,"method":"tools/list"}).to_string(),
        json!({"jsonrpc":"2.0","id":2,"method":"tools/list","params":{"auth_token":"letmein"}}).to_string(),
    ];

    let responses = roundtrip(&server, &lines).await;
    assert_eq!(responses[0].error.as_ref().unwrap().code, -32001);
    assert!(responses[1].result.is_some());
}

#[tokio::test]
async fn test_malformed_line() {
    let responses = roundtrip(&server(), &["not json".to_string()]).await;
    assert_eq!(responses[0].error.as_ref().unwrap().code, -32700);
}
