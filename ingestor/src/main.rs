#![allow(dead_code)]

mod app_config;
mod email;
mod error;
mod ingest;
mod pdf;
mod prompt;
mod store;
#[cfg(test)]
mod testing;

use anyhow::Context;
use mimalloc::MiMalloc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app_config::AppConfig;
use crate::email::client::GmailClient;
use crate::ingest::Ingestor;
use crate::prompt::gemini::GeminiClient;
use crate::store::airtable::AirtableClient;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

pub type HttpClient = reqwest::Client;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::Layer::default().with_ansi(false))
        .init();

    // Missing credentials abort here, before any message is touched.
    let cfg = AppConfig::load().context("startup configuration is incomplete")?;

    let http_client = reqwest::ClientBuilder::new().use_rustls_tls().build()?;

    let mailbox = GmailClient::new(http_client.clone(), &cfg.gmail);
    let model = GeminiClient::new(http_client.clone(), &cfg.model);
    let store = AirtableClient::new(http_client, &cfg.airtable);

    let ingestor = Ingestor::new(&cfg, mailbox, model, store);
    let summary = ingestor.run_once().await?;

    tracing::info!("{summary}");

    Ok(())
}
