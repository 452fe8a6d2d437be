use serde_json::{json, Map, Value};

use crate::app_config::AirtableConfig;
use crate::error::{AppError, AppResult};
use crate::store::RecordStore;
use crate::HttpClient;

const AIRTABLE_ENDPOINT: &str = "https://api.airtable.com/v0";

pub struct AirtableClient {
    http_client: HttpClient,
    api_key: String,
    base_id: String,
    table_name: String,
}

impl AirtableClient {
    pub fn new(http_client: HttpClient, cfg: &AirtableConfig) -> AirtableClient {
        AirtableClient {
            http_client,
            api_key: cfg.api_key.clone(),
            base_id: cfg.base_id.clone(),
            table_name: cfg.table_name.clone(),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/{}/{}", AIRTABLE_ENDPOINT, self.base_id, self.table_name)
    }
}

impl RecordStore for AirtableClient {
    async fn insert_record(&self, fields: &Map<String, Value>) -> AppResult<()> {
        let resp = self
            .http_client
            .post(self.table_url())
            .bearer_auth(&self.api_key)
            .json(&json!({ "fields": fields }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::StoreRejected(status.as_u16(), body));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_config::AirtableConfig;

    #[test]
    fn test_table_url() {
        let client = AirtableClient::new(
            HttpClient::new(),
            &AirtableConfig {
                api_key: "key".to_string(),
                base_id: "appBase123".to_string(),
                table_name: "Dealflow".to_string(),
            },
        );
        assert_eq!(
            client.table_url(),
            "https://api.airtable.com/v0/appBase123/Dealflow"
        );
    }
}
