//! Content extraction from a message's nested part tree.
//!
//! The walk is pre-order over an explicit work-list so attachment fetches
//! can be awaited inline without boxed recursion. Traversal order is the
//! order of the accumulated fragments.

use anyhow::Context;
use base64::{engine::general_purpose::URL_SAFE, Engine};

use crate::email::message::MessagePart;
use crate::email::FetchAttachment;

pub const MIME_TEXT_PLAIN: &str = "text/plain";
pub const MIME_PDF: &str = "application/pdf";

/// Everything the walk pulled out of one message, in traversal order.
#[derive(Debug, Default)]
pub struct ExtractedContent {
    pub texts: Vec<String>,
    pub pdf_blobs: Vec<Vec<u8>>,
}

/// Gmail serves body data base64url-encoded without padding; other producers
/// pad. Correct to a multiple of four before decoding.
pub fn decode_base64url(data: &str) -> anyhow::Result<Vec<u8>> {
    let mut padded = data.to_string();
    while padded.len() % 4 != 0 {
        padded.push('=');
    }
    URL_SAFE
        .decode(padded.as_bytes())
        .context("invalid base64url data")
}

/// Decodes a text body. Malformed UTF-8 is substituted, never an error.
pub fn decode_text(data: &str) -> anyhow::Result<String> {
    let bytes = decode_base64url(data)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Walks the part tree depth-first, pre-order, collecting decoded
/// `text/plain` fragments and fetched `application/pdf` payloads.
///
/// A part is decoded *and* recursed into when it has children; a container
/// can hold both inline text and nested parts. A failed attachment fetch
/// drops that attachment only and the walk continues.
pub async fn collect_content<F: FetchAttachment>(
    fetcher: &F,
    message_id: &str,
    root: &MessagePart,
) -> ExtractedContent {
    let mut content = ExtractedContent::default();
    let mut work_list = vec![root];

    while let Some(part) = work_list.pop() {
        match part.mime_type.as_deref().unwrap_or("") {
            MIME_TEXT_PLAIN => {
                if let Some(data) = part.body.as_ref().and_then(|b| b.data.as_ref()) {
                    match decode_text(data) {
                        Ok(text) => content.texts.push(text),
                        Err(e) => {
                            tracing::warn!("Skipping undecodable text part of message {message_id}: {e:#}")
                        }
                    }
                }
            }
            MIME_PDF => {
                if let Some(att_id) = part.body.as_ref().and_then(|b| b.attachment_id.as_ref()) {
                    match fetcher.fetch_attachment(message_id, att_id).await {
                        Ok(bytes) => content.pdf_blobs.push(bytes),
                        Err(e) => {
                            tracing::warn!(
                                "Skipping attachment {att_id} of message {message_id}: {e:#}"
                            )
                        }
                    }
                }
            }
            _ => {}
        }

        if let Some(parts) = &part.parts {
            for child in parts.iter().rev() {
                work_list.push(child);
            }
        }
    }

    content
}
