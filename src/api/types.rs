//! Response envelope shared by every endpoint

use serde::{Deserialize, Serialize};

/// Severity of a server message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Info,
    Success,
    Warning,
    Error,
}

/// A message attached to a response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerMessage {
    #[serde(rename = "type")]
    pub message_type: MessageType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    pub message: String,
}

/// `{status, data?, messages?, code?, jwt?}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerResponse<T> {
    /// Status echoed by the server; filled from the HTTP status when absent
    #[serde(default)]
    pub status: u16,

    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<ServerMessage>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt: Option<String>,
}

impl<T> ServerResponse<T> {
    /// An envelope carrying only a status, used for empty bodies
    pub fn empty(status: u16) -> Self {
        Self {
            status,
            data: None,
            messages: Vec::new(),
            code: None,
            jwt: None,
        }
    }

    /// The first message of the envelope, preferring errors
    pub fn first_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.message_type == MessageType::Error)
            .or_else(|| self.messages.first())
            .map(|m| m.message.as_str())
    }

    /// Take the payload
    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_full_envelope() {
        let envelope: ServerResponse<serde_json::Value> = serde_json::from_value(json!({
            "status": 200,
            "data": { "id": "u1" },
            "messages": [
                { "type": "info", "message": "Logged in" },
                { "type": "error", "title": "Oops", "message": "Second" }
            ],
            "jwt": "a.b.c"
        }))
        .unwrap();

        assert_eq!(envelope.status, 200);
        assert_eq!(envelope.jwt.as_deref(), Some("a.b.c"));
        assert_eq!(envelope.first_message(), Some("Second"));
    }

    #[test]
    fn missing_fields_default() {
        let envelope: ServerResponse<Vec<u8>> = serde_json::from_value(json!({})).unwrap();
        assert_eq!(envelope.status, 0);
        assert!(envelope.data.is_none());
        assert!(envelope.messages.is_empty());
        assert_eq!(envelope.first_message(), None);
    }
}
