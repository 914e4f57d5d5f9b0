//! Classification of gateway response bodies.
//!
//! MegaPay does not publish a stable response schema, so the body is read as
//! loose JSON and checked against every shape seen in practice.

use serde_json::Value;

const DEFAULT_FAILURE: &str = "Payment initiation failed";

const TRANSACTION_ID_KEYS: [&str; 4] = ["transaction_request_id", "transactionId", "requestId", "ref"];
const MESSAGE_KEYS: [&str; 3] = ["message", "error", "errorMessage"];

/// Known gateway complaints and the text shown instead, checked in order.
const FRIENDLY_MESSAGES: [(&str, &str); 4] = [
    ("insufficient", "Insufficient funds in your merchant account"),
    ("limit", "Transaction limit exceeded. Please contact support."),
    ("invalid api", "API key invalid. Please check your MegaPay account."),
    ("amount", "Invalid amount specified. Please check the transaction fee."),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Accepted { transaction_id: String },
    Rejected { message: String },
}

pub fn classify(body: &Value) -> Classification {
    if is_success(body) {
        Classification::Accepted {
            transaction_id: transaction_id(body),
        }
    } else {
        Classification::Rejected {
            message: friendly_message(&failure_message(body)),
        }
    }
}

/// Truthiness as the gateway's own web clients apply it.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub fn is_success(body: &Value) -> bool {
    let success = body.get("success");
    if success.is_some_and(is_truthy) {
        return true;
    }
    if body.get("status").and_then(Value::as_str) == Some("success") {
        return true;
    }
    if success.and_then(Value::as_str) == Some("200") {
        return true;
    }
    body.get("message")
        .and_then(Value::as_str)
        .is_some_and(|m| m.to_lowercase().contains("success"))
}

fn first_truthy_text(body: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| body.get(*key))
        .find(|v| is_truthy(v))
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
}

pub fn transaction_id(body: &Value) -> String {
    first_truthy_text(body, &TRANSACTION_ID_KEYS).unwrap_or_default()
}

pub fn failure_message(body: &Value) -> String {
    first_truthy_text(body, &MESSAGE_KEYS).unwrap_or_else(|| DEFAULT_FAILURE.to_string())
}

pub fn friendly_message(message: &str) -> String {
    let lower = message.to_lowercase();
    FRIENDLY_MESSAGES
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|(_, friendly)| friendly.to_string())
        .unwrap_or_else(|| message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn accepted(id: &str) -> Classification {
        Classification::Accepted {
            transaction_id: id.to_string(),
        }
    }

    fn rejected(message: &str) -> Classification {
        Classification::Rejected {
            message: message.to_string(),
        }
    }

    #[test]
    fn test_success_shapes() {
        assert_eq!(
            classify(&json!({"success": true, "transaction_request_id": "TR-1"})),
            accepted("TR-1")
        );
        assert_eq!(
            classify(&json!({"success": "200", "transactionId": "T2"})),
            accepted("T2")
        );
        assert_eq!(
            classify(&json!({"status": "success", "requestId": 42})),
            accepted("42")
        );
        assert_eq!(
            classify(&json!({"message": "STK push sent SUCCESSFULLY", "ref": "R9"})),
            accepted("R9")
        );
        assert_eq!(classify(&json!({"success": 1})), accepted(""));
    }

    #[test]
    fn test_falsy_success_is_not_enough() {
        assert!(!is_success(&json!({"success": false})));
        assert!(!is_success(&json!({"success": ""})));
        assert!(!is_success(&json!({"success": 0})));
        assert!(!is_success(&json!({"status": "failed"})));
        assert!(!is_success(&json!({})));
        assert!(!is_success(&json!([])));
    }

    #[test]
    fn test_transaction_id_skips_empty_values() {
        let body = json!({
            "transaction_request_id": "",
            "transactionId": null,
            "requestId": "REQ-7",
            "ref": "R1"
        });
        assert_eq!(transaction_id(&body), "REQ-7");
    }

    #[test]
    fn test_failure_messages_are_mapped() {
        assert_eq!(
            classify(&json!({"success": false, "message": "Insufficient balance"})),
            rejected("Insufficient funds in your merchant account")
        );
        assert_eq!(
            classify(&json!({"error": "Daily LIMIT reached"})),
            rejected("Transaction limit exceeded. Please contact support.")
        );
        assert_eq!(
            classify(&json!({"errorMessage": "Invalid API key supplied"})),
            rejected("API key invalid. Please check your MegaPay account.")
        );
        assert_eq!(
            classify(&json!({"message": "amount is required"})),
            rejected("Invalid amount specified. Please check the transaction fee.")
        );
    }

    #[test]
    fn test_unknown_failures_pass_through() {
        assert_eq!(
            classify(&json!({"message": "Subscriber unreachable"})),
            rejected("Subscriber unreachable")
        );
        assert_eq!(classify(&json!({})), rejected("Payment initiation failed"));
        assert_eq!(
            classify(&json!({"message": "", "error": "Timeout at carrier"})),
            rejected("Timeout at carrier")
        );
    }

    #[test]
    fn test_mapping_order() {
        // "insufficient" wins over "amount" when both appear.
        assert_eq!(
            friendly_message("insufficient amount"),
            "Insufficient funds in your merchant account"
        );
    }
}
