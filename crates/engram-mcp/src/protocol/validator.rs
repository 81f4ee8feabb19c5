//! JSON-RPC envelope validation and classification.

use serde_json::Value;

use crate::types::{JsonRpcNotification, JsonRpcRequest, RequestId, JSONRPC_VERSION};

/// What a decoded JSON value turned out to be.
#[derive(Debug)]
pub enum Classified {
    /// Well-formed request: carries an id and expects exactly one response.
    Request(JsonRpcRequest),
    /// Well-formed but id-less: processed, never answered.
    Notification(JsonRpcNotification),
    /// Malformed envelope. The id is echoed when it could be recovered,
    /// null otherwise.
    Invalid { id: RequestId },
}

/// Classify a decoded JSON value as a request, a notification, or malformed.
pub fn classify(value: Value) -> Classified {
    let Some(obj) = value.as_object() else {
        return Classified::Invalid {
            id: RequestId::Null,
        };
    };

    let id = recover_id(obj.get("id"));
    let version_ok = obj.get("jsonrpc").and_then(Value::as_str) == Some(JSONRPC_VERSION);
    let method_ok = obj.get("method").is_some_and(Value::is_string);

    if !version_ok || !method_ok {
        return Classified::Invalid { id };
    }

    if obj.contains_key("id") {
        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) => Classified::Request(request),
            Err(_) => Classified::Invalid { id },
        }
    } else {
        match serde_json::from_value::<JsonRpcNotification>(value) {
            Ok(notification) => Classified::Notification(notification),
            Err(_) => Classified::Invalid { id },
        }
    }
}

/// Pull a syntactically valid id out of a possibly broken envelope, so even
/// malformed requests are answered under the caller's correlation key.
fn recover_id(id: Option<&Value>) -> RequestId {
    match id {
        Some(Value::String(s)) => RequestId::String(s.clone()),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(n) => RequestId::Number(n),
            None => RequestId::Null,
        },
        _ => RequestId::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn well_formed_request() {
        let classified = classify(json!({
            "jsonrpc": "2.0", "id": 7, "method": "tools/list", "params": {}
        }));
        match classified {
            Classified::Request(req) => {
                assert_eq!(req.id, RequestId::Number(7));
                assert_eq!(req.method, "tools/list");
            }
            other => panic!("expected request, got {other:?}"),
        }
    }

    #[test]
    fn missing_method_is_invalid_but_echoes_id() {
        let classified = classify(json!({ "jsonrpc": "2.0", "id": "abc" }));
        match classified {
            Classified::Invalid { id } => assert_eq!(id, RequestId::String("abc".to_string())),
            other => panic!("expected invalid, got {other:?}"),
        }
    }

    #[test]
    fn wrong_version_is_invalid() {
        let classified = classify(json!({ "jsonrpc": "1.0", "id": 1, "method": "x" }));
        assert!(matches!(classified, Classified::Invalid { .. }));
    }

    #[test]
    fn non_object_has_null_id() {
        let classified = classify(json!([1, 2, 3]));
        match classified {
            Classified::Invalid { id } => assert_eq!(id, RequestId::Null),
            other => panic!("expected invalid, got {other:?}"),
        }
    }

    #[test]
    fn id_less_message_is_notification() {
        let classified = classify(json!({ "jsonrpc": "2.0", "method": "initialized" }));
        match classified {
            Classified::Notification(n) => assert_eq!(n.method, "initialized"),
            other => panic!("expected notification, got {other:?}"),
        }
    }

    #[test]
    fn explicit_null_id_is_a_request() {
        let classified = classify(json!({ "jsonrpc": "2.0", "id": null, "method": "ping" }));
        match classified {
            Classified::Request(req) => assert_eq!(req.id, RequestId::Null),
            other => panic!("expected request, got {other:?}"),
        }
    }
}
