pub mod client;
pub mod content;
pub mod message;

use crate::email::message::{Message, MessageRef};

/// Seam for fetching out-of-line attachment payloads during the tree walk.
/// Returns the decoded attachment bytes.
#[allow(async_fn_in_trait)]
pub trait FetchAttachment {
    async fn fetch_attachment(
        &self,
        message_id: &str,
        attachment_id: &str,
    ) -> anyhow::Result<Vec<u8>>;
}

/// The mailbox operations the ingestion pass depends on.
#[allow(async_fn_in_trait)]
pub trait Mailbox: FetchAttachment {
    async fn list_unread(&self, page_size: u32) -> anyhow::Result<Vec<MessageRef>>;

    async fn get_message(&self, message_id: &str) -> anyhow::Result<Message>;

    /// Clears the unread flag. Called exactly once per processed message,
    /// whatever the processing outcome was.
    async fn mark_as_read(&self, message_id: &str) -> anyhow::Result<()>;
}
