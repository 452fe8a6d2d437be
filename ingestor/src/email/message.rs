//! Wire structs for the slice of the Gmail REST API this service consumes.
//!
//! Body data is kept as the raw base64url string the API returns; decoding
//! is owned by `email::content` so padding correction stays in one place.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMessagesResponse {
    #[serde(default)]
    pub messages: Vec<MessageRef>,
    pub result_size_estimate: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRef {
    pub id: String,
    pub thread_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    #[serde(default)]
    pub label_ids: Vec<String>,
    pub snippet: Option<String>,
    pub payload: Option<MessagePart>,
}

impl Message {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.payload.as_ref()?.headers.iter().find_map(|h| {
            if h.name.eq_ignore_ascii_case(name) {
                Some(h.value.as_str())
            } else {
                None
            }
        })
    }

    pub fn subject(&self) -> Option<&str> {
        self.header("Subject")
    }

    pub fn sender(&self) -> Option<&str> {
        self.header("From")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePart {
    pub mime_type: Option<String>,
    pub filename: Option<String>,
    #[serde(default)]
    pub headers: Vec<MessageHeader>,
    pub body: Option<MessagePartBody>,
    pub parts: Option<Vec<MessagePart>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageHeader {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePartBody {
    pub attachment_id: Option<String>,
    pub size: Option<i64>,
    /// base64url, unpadded, exactly as Gmail serves it.
    pub data: Option<String>,
}

/// Response shape of `messages.attachments.get`.
#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentBody {
    pub size: Option<i64>,
    pub data: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_full_format_message_deserializes() {
        let value = json!({
            "id": "18f0a1b2c3",
            "threadId": "18f0a1b2c3",
            "labelIds": ["UNREAD", "INBOX"],
            "snippet": "Hi, we are Acme",
            "payload": {
                "mimeType": "multipart/mixed",
                "headers": [
                    {"name": "Subject", "value": "Acme seed round"},
                    {"name": "From", "value": "founder@acme.dev"}
                ],
                "parts": [
                    {
                        "mimeType": "text/plain",
                        "body": {"size": 10, "data": "SGksIHRoZXJl"}
                    },
                    {
                        "mimeType": "application/pdf",
                        "filename": "deck.pdf",
                        "body": {"attachmentId": "att-1", "size": 12345}
                    }
                ]
            }
        });

        let msg: Message = serde_json::from_value(value).unwrap();
        assert_eq!(msg.id, "18f0a1b2c3");
        assert_eq!(msg.subject(), Some("Acme seed round"));
        assert_eq!(msg.sender(), Some("founder@acme.dev"));

        let payload = msg.payload.as_ref().unwrap();
        let parts = payload.parts.as_ref().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].mime_type.as_deref(), Some("text/plain"));
        assert_eq!(
            parts[1].body.as_ref().unwrap().attachment_id.as_deref(),
            Some("att-1")
        );
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let value = json!({
            "id": "m1",
            "payload": {
                "mimeType": "text/plain",
                "headers": [{"name": "subject", "value": "hello"}]
            }
        });

        let msg: Message = serde_json::from_value(value).unwrap();
        assert_eq!(msg.subject(), Some("hello"));
        assert_eq!(msg.sender(), None);
    }

    #[test]
    fn test_empty_list_response() {
        let resp: ListMessagesResponse = serde_json::from_str("{\"resultSizeEstimate\": 0}").unwrap();
        assert!(resp.messages.is_empty());
    }
}
