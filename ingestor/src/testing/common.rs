//! Builders for message-part trees shared across test modules.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

use crate::email::message::{Message, MessageHeader, MessagePart, MessagePartBody};

/// A `text/plain` leaf carrying `text`, base64url-encoded without padding
/// the way Gmail serves it.
pub fn text_part(text: &str) -> MessagePart {
    MessagePart {
        mime_type: Some("text/plain".to_string()),
        body: Some(MessagePartBody {
            data: Some(URL_SAFE_NO_PAD.encode(text)),
            size: Some(text.len() as i64),
            attachment_id: None,
        }),
        ..Default::default()
    }
}

/// An `application/pdf` leaf referencing an out-of-line attachment.
pub fn pdf_part(attachment_id: &str) -> MessagePart {
    MessagePart {
        mime_type: Some("application/pdf".to_string()),
        filename: Some("deck.pdf".to_string()),
        body: Some(MessagePartBody {
            attachment_id: Some(attachment_id.to_string()),
            size: None,
            data: None,
        }),
        ..Default::default()
    }
}

pub fn container(mime_type: &str, children: Vec<MessagePart>) -> MessagePart {
    MessagePart {
        mime_type: Some(mime_type.to_string()),
        parts: Some(children),
        ..Default::default()
    }
}

pub fn message_with_payload(
    id: &str,
    subject: Option<&str>,
    sender: Option<&str>,
    mut payload: MessagePart,
) -> Message {
    let mut headers = Vec::new();
    if let Some(subject) = subject {
        headers.push(MessageHeader {
            name: "Subject".to_string(),
            value: subject.to_string(),
        });
    }
    if let Some(sender) = sender {
        headers.push(MessageHeader {
            name: "From".to_string(),
            value: sender.to_string(),
        });
    }
    payload.headers = headers;

    Message {
        id: id.to_string(),
        label_ids: vec!["UNREAD".to_string(), "INBOX".to_string()],
        snippet: None,
        payload: Some(payload),
    }
}
