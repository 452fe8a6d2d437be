use std::time::Duration;

use anyhow::{anyhow, Context};
use leaky_bucket::RateLimiter;

use crate::app_config::GmailConfig;
use crate::email::content::decode_base64url;
use crate::email::message::{AttachmentBody, ListMessagesResponse, Message, MessageRef};
use crate::email::{FetchAttachment, Mailbox};
use crate::HttpClient;

macro_rules! gmail_url {
    ($($params:expr),*) => {
        {
            const GMAIL_ENDPOINT: &str = "https://www.googleapis.com/gmail/v1/users/me";
            let list_params = vec![$($params),*];
            let path = list_params.join("/");
            format!("{}/{}", GMAIL_ENDPOINT, path)
        }
    };
}

/// Gmail grants 250 quota units per user per second; the calls used here
/// all cost 5 units.
const GMAIL_QUOTA_PER_SECOND: usize = 250;

struct ApiQuota {
    messages_list: usize,
    messages_get: usize,
    messages_modify: usize,
    attachments_get: usize,
}

const GMAIL_API_QUOTA: ApiQuota = ApiQuota {
    messages_list: 5,
    messages_get: 5,
    messages_modify: 5,
    attachments_get: 5,
};

pub struct GmailClient {
    http_client: HttpClient,
    access_token: String,
    label_filter: Option<String>,
    rate_limiter: RateLimiter,
}

impl GmailClient {
    pub fn new(http_client: HttpClient, cfg: &GmailConfig) -> GmailClient {
        let rate_limiter = RateLimiter::builder()
            .initial(GMAIL_QUOTA_PER_SECOND)
            .interval(Duration::from_secs(1))
            .refill(GMAIL_QUOTA_PER_SECOND)
            .build();

        GmailClient {
            http_client,
            access_token: cfg.access_token.clone(),
            label_filter: cfg.label_filter.clone(),
            rate_limiter,
        }
    }

    async fn get_unread_page(&self, page_size: u32) -> anyhow::Result<ListMessagesResponse> {
        self.rate_limiter
            .acquire(GMAIL_API_QUOTA.messages_list)
            .await;

        let mut query = vec![
            ("labelIds".to_string(), "UNREAD".to_string()),
            ("maxResults".to_string(), page_size.to_string()),
        ];

        // Multiple labelIds params are ANDed by the API.
        if let Some(label) = &self.label_filter {
            query.push(("labelIds".to_string(), label.clone()));
        }

        let resp = self
            .http_client
            .get(gmail_url!("messages"))
            .query(&query)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let resp = check_status(resp, "listing unread messages").await?;

        resp.json::<ListMessagesResponse>()
            .await
            .context("Error listing unread messages")
    }
}

/// Gmail reports failures as a JSON `error` member with a non-2xx status.
async fn check_status(
    resp: reqwest::Response,
    action: &str,
) -> anyhow::Result<reqwest::Response> {
    let status = resp.status();
    if !status.is_success() {
        let json = resp.json::<serde_json::Value>().await.unwrap_or_default();
        return Err(anyhow!("Error {action} ({status}): {json:?}"));
    }
    Ok(resp)
}

impl FetchAttachment for GmailClient {
    async fn fetch_attachment(
        &self,
        message_id: &str,
        attachment_id: &str,
    ) -> anyhow::Result<Vec<u8>> {
        self.rate_limiter
            .acquire(GMAIL_API_QUOTA.attachments_get)
            .await;

        let resp = self
            .http_client
            .get(gmail_url!("messages", message_id, "attachments", attachment_id))
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let resp = check_status(resp, "getting attachment").await?;

        let body = resp
            .json::<AttachmentBody>()
            .await
            .context("Error getting attachment")?;

        let data = body.data.context("Attachment response carried no data")?;
        decode_base64url(&data)
    }
}

impl Mailbox for GmailClient {
    async fn list_unread(&self, page_size: u32) -> anyhow::Result<Vec<MessageRef>> {
        let resp = self.get_unread_page(page_size).await?;
        Ok(resp.messages)
    }

    async fn get_message(&self, message_id: &str) -> anyhow::Result<Message> {
        self.rate_limiter
            .acquire(GMAIL_API_QUOTA.messages_get)
            .await;

        let resp = self
            .http_client
            .get(gmail_url!("messages", message_id))
            .bearer_auth(&self.access_token)
            .query(&[("format", "FULL")])
            .send()
            .await?;

        let resp = check_status(resp, "getting message").await?;

        resp.json::<Message>().await.context("Error getting message")
    }

    async fn mark_as_read(&self, message_id: &str) -> anyhow::Result<()> {
        self.rate_limiter
            .acquire(GMAIL_API_QUOTA.messages_modify)
            .await;

        let resp = self
            .http_client
            .post(gmail_url!("messages", message_id, "modify"))
            .bearer_auth(&self.access_token)
            .json(&serde_json::json!({
                "removeLabelIds": ["UNREAD"],
                "addLabelIds": []
            }))
            .send()
            .await?;

        check_status(resp, "marking message as read").await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_gmail_url() {
        let url = gmail_url!("messages");
        assert_eq!(url, "https://www.googleapis.com/gmail/v1/users/me/messages");
        let url = gmail_url!("messages", "123", "attachments", "att-1");
        assert_eq!(
            url,
            "https://www.googleapis.com/gmail/v1/users/me/messages/123/attachments/att-1"
        );
    }
}
