//! Edge case integration tests for engram-mcp.
//!
//! Drives the protocol handler the way the stdio transport does: raw lines
//! and decoded values in, one correlated JSON-RPC response out per request.

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::Mutex;

use engram_mcp::protocol::ProtocolHandler;
use engram_mcp::session::MemorySessionManager;
use engram_mcp::transport::framing;

// ─────────────────────── helpers ───────────────────────

/// Create a MemorySessionManager using a temp .jsonl path.
fn temp_session(dir: &tempfile::TempDir) -> MemorySessionManager {
    let path = dir.path().join("memory.jsonl");
    MemorySessionManager::open(path.to_str().unwrap()).unwrap()
}

/// Create an Arc'd handler for dispatch tests.
fn handler(dir: &tempfile::TempDir) -> Arc<ProtocolHandler> {
    let session = Arc::new(Mutex::new(temp_session(dir)));
    Arc::new(ProtocolHandler::new(session))
}

/// Build an MCP JSON-RPC request.
fn mcp_request(id: Value, method: &str, params: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params
    })
}

/// Build an initialize request for the given protocol version.
fn init_request(version: &str) -> Value {
    mcp_request(
        json!(0),
        "initialize",
        json!({
            "protocolVersion": version,
            "capabilities": {},
            "clientInfo": { "name": "test-client", "version": "1.0" }
        }),
    )
}

/// Build a tools/call request.
fn tool_call(id: i64, name: &str, arguments: Value) -> Value {
    mcp_request(
        json!(id),
        "tools/call",
        json!({ "name": name, "arguments": arguments }),
    )
}

/// Send a decoded message through the handler and unwrap the response.
async fn send(handler: &Arc<ProtocolHandler>, msg: Value) -> Value {
    handler
        .handle_single(msg)
        .await
        .expect("expected a response")
}

// ═══════════════════════════════════════════════════════
// FRAMING & ENVELOPE
// ═══════════════════════════════════════════════════════

/// Malformed JSON gets a parse-error response with a null id, and the
/// handler stays usable for the next line.
#[tokio::test]
async fn test_malformed_json_line() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(&dir);

    let resp = handler.handle_line(r#"{"broken":"#).await.unwrap();
    assert_eq!(resp["error"]["code"], -32700);
    assert_eq!(resp["id"], Value::Null);

    let truncated = handler
        .handle_line(r#"{"jsonrpc":"2.0","id":1,"method":"#)
        .await
        .unwrap();
    assert_eq!(truncated["error"]["code"], -32700);

    // The stream survives: a well-formed request still works.
    let ok = handler
        .handle_line(r#"{"jsonrpc":"2.0","id":2,"method":"tools/list","params":{}}"#)
        .await
        .unwrap();
    assert_eq!(ok["id"], 2);
    assert!(ok["result"]["tools"].is_array());
}

/// An object lacking `method` is answered with exactly "Invalid Request",
/// echoing the id when one is recoverable.
#[tokio::test]
async fn test_invalid_request_message() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(&dir);

    let resp = send(&handler, json!({ "jsonrpc": "2.0", "id": 42 })).await;
    assert_eq!(resp["error"]["code"], -32600);
    assert_eq!(resp["error"]["message"], "Invalid Request");
    assert_eq!(resp["id"], 42);

    // Non-object payload: id is not recoverable, so it is null.
    let resp2 = send(&handler, json!("just a string")).await;
    assert_eq!(resp2["error"]["message"], "Invalid Request");
    assert_eq!(resp2["id"], Value::Null);

    // Wrong jsonrpc version is malformed too.
    let resp3 = send(
        &handler,
        json!({ "jsonrpc": "1.0", "id": "x", "method": "ping" }),
    )
    .await;
    assert_eq!(resp3["error"]["message"], "Invalid Request");
    assert_eq!(resp3["id"], "x");
}

/// Responses are framed as exactly one line each.
#[tokio::test]
async fn test_response_framing() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(&dir);

    let resp = send(&handler, mcp_request(json!(1), "tools/list", json!({}))).await;
    let framed = framing::frame_message(&resp).unwrap();
    assert!(framed.ends_with('\n'));
    assert_eq!(framed.matches('\n').count(), 1);
}

// ═══════════════════════════════════════════════════════
// PROTOCOL NEGOTIATION
// ═══════════════════════════════════════════════════════

/// Unsupported protocol versions are rejected with an error naming the
/// protocol version; supported ones are echoed with server identity.
#[tokio::test]
async fn test_protocol_version_gate() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(&dir);

    let rejected = send(&handler, init_request("0.0.1")).await;
    let message = rejected["error"]["message"].as_str().unwrap().to_lowercase();
    assert!(
        message.contains("protocol version"),
        "error should name the protocol version: {message}"
    );

    let accepted = send(&handler, init_request("2024-11-05")).await;
    let result = &accepted["result"];
    assert_eq!(result["protocolVersion"], "2024-11-05");
    assert_eq!(result["serverInfo"]["name"], "engram-mcp");
    assert!(result["capabilities"]["tools"].is_object());
}

/// tools/list and tools/call work without a prior initialize.
#[tokio::test]
async fn test_no_initialize_required() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(&dir);

    let listed = send(&handler, mcp_request(json!(1), "tools/list", json!({}))).await;
    let tools = listed["result"]["tools"].as_array().unwrap();
    assert!(!tools.is_empty());
    for tool in tools {
        assert!(tool["title"].as_str().is_some_and(|t| !t.is_empty()));
        assert_ne!(tool["title"], tool["name"]);
        assert!(tool["inputSchema"].is_object());
    }

    let called = send(&handler, tool_call(2, "read_graph", json!({}))).await;
    assert!(called["result"]["structuredContent"].is_object());
}

// ═══════════════════════════════════════════════════════
// DISPATCH
// ═══════════════════════════════════════════════════════

/// Two requests with the same id each get their own response.
#[tokio::test]
async fn test_duplicate_ids() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(&dir);

    let first = send(&handler, mcp_request(json!(5), "tools/list", json!({}))).await;
    let second = send(&handler, mcp_request(json!(5), "tools/list", json!({}))).await;

    for resp in [&first, &second] {
        assert_eq!(resp["id"], 5);
        assert!(
            resp.get("result").is_some() || resp.get("error").is_some(),
            "each duplicate must be independently answered: {resp}"
        );
    }
}

/// Unknown method and unknown tool both answer with their own phrasing.
#[tokio::test]
async fn test_unknown_method_and_tool() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(&dir);

    let method = send(&handler, mcp_request(json!(1), "foo/bar/baz", json!({}))).await;
    assert_eq!(method["error"]["code"], -32601);
    let msg = method["error"]["message"].as_str().unwrap().to_lowercase();
    assert!(msg.contains("method not found"), "got: {msg}");

    let tool = send(&handler, tool_call(2, "nonexistent_tool", json!({}))).await;
    assert_eq!(tool["error"]["code"], -32803);
    let msg = tool["error"]["message"].as_str().unwrap().to_lowercase();
    assert!(msg.contains("unknown tool"), "got: {msg}");
}

/// A batch line of N requests yields one array of N responses, and a batch
/// of only notifications yields nothing.
#[tokio::test]
async fn test_batch_requests() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(&dir);

    let batch = json!([
        mcp_request(json!(1), "tools/list", json!({})),
        mcp_request(json!("two"), "tools/list", json!({})),
        mcp_request(json!(3), "tools/list", json!({})),
    ]);
    let resp = handler
        .handle_line(&serde_json::to_string(&batch).unwrap())
        .await
        .unwrap();

    let responses = resp.as_array().expect("batch response should be an array");
    assert_eq!(responses.len(), 3);
    for response in responses {
        assert!(response["result"]["tools"].is_array());
    }
    assert_eq!(responses[1]["id"], "two");

    // Malformed elements are answered in place, not dropped.
    let mixed = json!([
        mcp_request(json!(10), "tools/list", json!({})),
        { "jsonrpc": "2.0", "id": 11 },
    ]);
    let resp = handler
        .handle_line(&serde_json::to_string(&mixed).unwrap())
        .await
        .unwrap();
    let responses = resp.as_array().unwrap();
    assert_eq!(responses.len(), 2);
    assert!(responses
        .iter()
        .any(|r| r["error"]["message"] == "Invalid Request"));

    // An empty batch is itself an invalid request.
    let empty = handler.handle_line("[]").await.unwrap();
    assert_eq!(empty["error"]["code"], -32600);

    // Notifications owe no response, alone or batched.
    let silent = handler
        .handle_line(r#"[{"jsonrpc":"2.0","method":"initialized"}]"#)
        .await;
    assert!(silent.is_none());
}

/// Tens of concurrent calls complete independently with correct
/// id-to-response correlation, regardless of completion order.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_dispatch() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(&dir);

    let mut handles = Vec::new();
    for i in 0..40i64 {
        let handler = Arc::clone(&handler);
        handles.push(tokio::spawn(async move {
            let msg = if i % 2 == 0 {
                tool_call(
                    i,
                    "create_entities",
                    json!({ "entities": [{ "name": format!("node-{i}"), "entityType": "task" }] }),
                )
            } else {
                mcp_request(json!(i), "tools/list", json!({}))
            };
            (i, handler.handle_single(msg).await.unwrap())
        }));
    }

    for handle in handles {
        let (i, resp) = handle.await.unwrap();
        assert_eq!(resp["id"], i, "response must echo its request id");
        assert!(resp.get("result").is_some(), "request {i} failed: {resp}");
    }
}

// ═══════════════════════════════════════════════════════
// ELICITATION
// ═══════════════════════════════════════════════════════

/// A create_entities call missing entityType elicits the same answer every
/// time, with no state change between calls.
#[tokio::test]
async fn test_elicitation_determinism() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(&dir);

    for round in 0..3i64 {
        let resp = send(
            &handler,
            tool_call(round, "create_entities", json!({ "entities": [{ "name": "X" }] })),
        )
        .await;

        let structured = &resp["result"]["structuredContent"];
        assert_eq!(structured["elicitation"], true, "round {round}: {resp}");
        let missing: Vec<&str> = structured["missingFields"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert!(missing.contains(&"entityType"), "round {round}: {missing:?}");
    }

    // The handler never ran, so the graph is still empty.
    let graph = send(&handler, tool_call(99, "read_graph", json!({}))).await;
    assert_eq!(graph["result"]["structuredContent"]["entities"], json!([]));
}

/// Wrong-typed declared fields elicit exactly like missing ones.
#[tokio::test]
async fn test_elicitation_on_invalid_type() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(&dir);

    let resp = send(
        &handler,
        tool_call(
            1,
            "create_entities",
            json!({ "entities": [{ "name": "X", "entityType": 7, "content": "oops" }] }),
        ),
    )
    .await;

    let structured = &resp["result"]["structuredContent"];
    assert_eq!(structured["elicitation"], true);
    let missing = structured["missingFields"].as_array().unwrap();
    assert!(missing.contains(&json!("entityType")));
    assert!(missing.contains(&json!("content")));

    // Top-level wrong type too: query as number.
    let resp = send(&handler, tool_call(2, "search_nodes", json!({ "query": 42 }))).await;
    let structured = &resp["result"]["structuredContent"];
    assert_eq!(structured["elicitation"], true);
    assert_eq!(structured["missingFields"], json!(["query"]));
}

/// Extra undeclared fields never trigger elicitation by themselves.
#[tokio::test]
async fn test_schema_tolerance() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(&dir);

    let resp = send(
        &handler,
        tool_call(
            1,
            "search_nodes",
            json!({ "query": "anything", "verbose": true, "priority": 9, "tags": ["a"] }),
        ),
    )
    .await;

    assert!(resp.get("error").is_none(), "extras must not fail: {resp}");
    let structured = &resp["result"]["structuredContent"];
    assert!(structured.get("elicitation").is_none(), "extras must not elicit: {resp}");
}

// ═══════════════════════════════════════════════════════
// TOOL SEMANTICS
// ═══════════════════════════════════════════════════════

/// The canonical well-formed call: content blocks land as observations,
/// both renderings are present, and nothing elicits.
#[tokio::test]
async fn test_create_entities_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(&dir);

    let resp = send(
        &handler,
        tool_call(
            7,
            "create_entities",
            json!({
                "entities": [{
                    "name": "X",
                    "entityType": "t",
                    "content": [{ "type": "text", "text": "hi" }]
                }]
            }),
        ),
    )
    .await;

    assert_eq!(resp["id"], 7);
    let result = &resp["result"];
    assert!(result["content"].is_array());
    let structured = &result["structuredContent"];
    assert!(structured.is_object());
    assert!(structured.get("elicitation").is_none());
    assert_eq!(structured["entitiesCreated"], 1);
    assert_eq!(structured["entities"][0]["observations"][0], "hi");
}

/// A 1000-entity payload completes and reports an exact count.
#[tokio::test]
async fn test_bulk_create_entities() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(&dir);

    let entities: Vec<Value> = (0..1000)
        .map(|i| {
            json!({
                "name": format!("bulk-{i}"),
                "entityType": "record",
                "content": [{ "type": "text", "text": format!("payload {i}") }]
            })
        })
        .collect();

    let resp = send(&handler, tool_call(1, "create_entities", json!({ "entities": entities }))).await;
    assert_eq!(resp["result"]["structuredContent"]["entitiesCreated"], 1000);

    let stats = send(&handler, tool_call(2, "memory_stats", json!({}))).await;
    assert_eq!(stats["result"]["structuredContent"]["entities"], 1000);
}

/// Multi-byte names and observations survive validation and come back
/// uncorrupted in structuredContent.
#[tokio::test]
async fn test_unicode_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(&dir);

    let name = "🏠首页 — Ünïcödé λ 日本語";
    let observation = "🎨 截图 with émojis & spëcial chars: ñ, ü, العربية";

    let created = send(
        &handler,
        tool_call(
            1,
            "create_entities",
            json!({
                "entities": [{
                    "name": name,
                    "entityType": "ページ",
                    "content": [{ "type": "text", "text": observation }]
                }]
            }),
        ),
    )
    .await;
    let entity = &created["result"]["structuredContent"]["entities"][0];
    assert_eq!(entity["name"], name);
    assert_eq!(entity["observations"][0], observation);

    let found = send(&handler, tool_call(2, "search_nodes", json!({ "query": "首页" }))).await;
    let entities = found["result"]["structuredContent"]["entities"]
        .as_array()
        .unwrap();
    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0]["name"], name);
}

/// Full create/relate/observe/delete pass through the dispatcher, with
/// handler failures relayed as JSON-RPC errors.
#[tokio::test]
async fn test_graph_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(&dir);

    send(
        &handler,
        tool_call(
            1,
            "create_entities",
            json!({ "entities": [
                { "name": "alpha", "entityType": "service" },
                { "name": "beta", "entityType": "service" }
            ]}),
        ),
    )
    .await;

    let related = send(
        &handler,
        tool_call(
            2,
            "create_relations",
            json!({ "relations": [{ "from": "alpha", "to": "beta", "relationType": "depends_on" }] }),
        ),
    )
    .await;
    assert_eq!(related["result"]["structuredContent"]["relationsCreated"], 1);

    let observed = send(
        &handler,
        tool_call(
            3,
            "add_observations",
            json!({ "observations": [{ "entityName": "alpha", "contents": ["handles auth"] }] }),
        ),
    )
    .await;
    assert_eq!(observed["result"]["structuredContent"]["observationsAdded"], 1);

    // Unknown entity: the store's failure comes back as an error, not a crash.
    let failed = send(
        &handler,
        tool_call(
            4,
            "add_observations",
            json!({ "observations": [{ "entityName": "ghost", "contents": ["x"] }] }),
        ),
    )
    .await;
    assert_eq!(failed["error"]["code"], -32850);

    let opened = send(
        &handler,
        tool_call(5, "open_nodes", json!({ "names": ["alpha", "beta"] })),
    )
    .await;
    assert_eq!(
        opened["result"]["structuredContent"]["relations"][0]["relationType"],
        "depends_on"
    );

    let deleted = send(
        &handler,
        tool_call(6, "delete_entities", json!({ "entityNames": ["alpha"] })),
    )
    .await;
    assert_eq!(deleted["result"]["structuredContent"]["entitiesDeleted"], 1);

    // Cascade removed the relation.
    let graph = send(&handler, tool_call(7, "read_graph", json!({}))).await;
    assert_eq!(graph["result"]["structuredContent"]["relations"], json!([]));
}

/// list_files reports the active store as items plus file:// resource links.
#[tokio::test]
async fn test_list_files() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(&dir);

    // Force a save so the file exists on disk.
    send(
        &handler,
        tool_call(
            1,
            "create_entities",
            json!({ "entities": [{ "name": "n", "entityType": "t" }] }),
        ),
    )
    .await;

    let resp = send(&handler, tool_call(2, "list_files", json!({}))).await;
    let structured = &resp["result"]["structuredContent"];
    let items = structured["items"].as_array().unwrap();
    let links = structured["resourceLinks"].as_array().unwrap();
    assert_eq!(items.len(), links.len());
    if let Some(link) = links.first() {
        assert!(link["uri"].as_str().unwrap().starts_with("file://"));
    }
}
