//! stdio transport tests
//!
//! Feed newline-delimited messages through `McpServer::serve` and inspect
//! the lines written back.
//!
//! Run with: cargo test --test stdio_tests

use std::io::Cursor;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use helloworld_mcp::mcp::{HelloHandler, McpServer};

fn run(input: &str) -> Vec<Value> {
    let server = McpServer::new(HelloHandler::default());
    let mut output = Vec::new();
    server.serve(Cursor::new(input), &mut output).unwrap();

    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_handshake_session() {
    let input = [
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize"}),
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
        json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call", "params": {"name": "hello"}}),
    ]
    .iter()
    .map(|m| m.to_string() + "\n")
    .collect::<String>();

    let replies = run(&input);
    assert_eq!(replies.len(), 3, "notification must not be answered");

    assert_eq!(replies[0]["id"], 1);
    assert_eq!(replies[0]["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(replies[1]["id"], 2);
    assert_eq!(replies[1]["result"]["tools"][0]["name"], "hello");
    assert_eq!(replies[2]["id"], 3);
    assert_eq!(
        replies[2]["result"]["content"],
        json!([{"type": "text", "text": "Hello, World"}])
    );
}

#[test]
fn test_blank_lines_are_skipped() {
    let replies = run("\n   \n{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"prompts/list\"}\n\n");
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0]["result"], json!({"prompts": []}));
}

#[test]
fn test_parse_error_keeps_serving() {
    let replies = run("{oops\n{\"jsonrpc\":\"2.0\",\"id\":7,\"method\":\"nope\"}\n");
    assert_eq!(replies.len(), 2);

    assert_eq!(replies[0]["id"], Value::Null);
    assert_eq!(replies[0]["error"]["code"], -32700);

    assert_eq!(replies[1]["id"], 7);
    assert_eq!(replies[1]["error"]["code"], -32601);
}

#[test]
fn test_empty_input() {
    assert!(run("").is_empty());
}
