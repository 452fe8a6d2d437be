//! One pass over the unread queue.
//!
//! Everything fallible for a message happens inside `process_message`; the
//! unread flag is cleared after it returns, on every outcome. A message
//! that fails forever must still leave the queue, or it blocks everything
//! behind it on the next run.

use anyhow::Context;
use chrono::Utc;
use derive_more::derive::Display;
use serde_json::Value;

use crate::app_config::{AppConfig, IngestSettings};
use crate::email::content::collect_content;
use crate::email::Mailbox;
use crate::pdf;
use crate::prompt::record::{parse_record, sanitize_record};
use crate::prompt::ExtractionModel;
use crate::store::RecordStore;

const TIMESTAMP_FIELD: &str = "Last Modified";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Default, Clone, PartialEq, Eq, Display)]
#[display(
    "processed {processed} messages: {persisted} persisted, {skipped} skipped (empty record), {errored} errored"
)]
pub struct ProcessingSummary {
    pub processed: usize,
    pub persisted: usize,
    pub skipped: usize,
    pub errored: usize,
}

enum ProcessOutcome {
    Persisted,
    SkippedEmpty,
}

pub struct Ingestor<M, X, S> {
    page_size: u32,
    settings: IngestSettings,
    mailbox: M,
    model: X,
    store: S,
}

impl<M, X, S> Ingestor<M, X, S>
where
    M: Mailbox,
    X: ExtractionModel,
    S: RecordStore,
{
    pub fn new(cfg: &AppConfig, mailbox: M, model: X, store: S) -> Ingestor<M, X, S> {
        Ingestor {
            page_size: cfg.gmail.page_size,
            settings: cfg.ingest.clone(),
            mailbox,
            model,
            store,
        }
    }

    /// Processes the current unread queue once, sequentially. Errs only when
    /// the queue itself cannot be listed; per-message failures are absorbed
    /// into the summary.
    pub async fn run_once(&self) -> anyhow::Result<ProcessingSummary> {
        let mut summary = ProcessingSummary::default();

        let refs = self
            .mailbox
            .list_unread(self.page_size)
            .await
            .context("Could not list unread messages")?;

        if refs.is_empty() {
            tracing::info!("No unread messages found");
            return Ok(summary);
        }

        for msg_ref in &refs {
            summary.processed += 1;

            match self.process_message(&msg_ref.id).await {
                Ok(ProcessOutcome::Persisted) => summary.persisted += 1,
                Ok(ProcessOutcome::SkippedEmpty) => summary.skipped += 1,
                Err(e) => {
                    summary.errored += 1;
                    tracing::error!("Failed to process message {}: {:#}", msg_ref.id, e);
                }
            }

            // Mark the message read regardless of outcome to avoid
            // reselecting it on the next pass.
            if let Err(e) = self.mailbox.mark_as_read(&msg_ref.id).await {
                tracing::error!("Could not mark message {} as read: {:#}", msg_ref.id, e);
            }
        }

        Ok(summary)
    }

    async fn process_message(&self, message_id: &str) -> anyhow::Result<ProcessOutcome> {
        let message = self.mailbox.get_message(message_id).await?;

        tracing::info!(
            "Processing: {} ({})",
            message.subject().unwrap_or("<no subject>"),
            message.sender().unwrap_or("<unknown sender>")
        );

        let payload = message.payload.as_ref().context("message has no payload")?;
        let content = collect_content(&self.mailbox, message_id, payload).await;

        let mut pdf_texts = Vec::new();
        let mut page_images = Vec::new();
        for (index, blob) in content.pdf_blobs.iter().enumerate() {
            match pdf::extract_text(blob) {
                Ok(text) => pdf_texts.push(text),
                Err(e) => tracing::warn!(
                    "Dropping PDF attachment {index} of message {message_id}: {e:#}"
                ),
            }

            if self.settings.include_page_images {
                match pdf::extract_page_images(blob, self.settings.page_render_width) {
                    Ok(mut images) => page_images.append(&mut images),
                    Err(e) => tracing::warn!(
                        "Could not render pages of PDF attachment {index} of message {message_id}: {e:#}"
                    ),
                }
            }
        }

        let text = canonical_text(message.subject(), &content.texts, &pdf_texts);
        let raw = self.model.generate(&text, &page_images).await?;

        let record = parse_record(&raw, message_id, &self.settings.debug_dir);
        let mut record = sanitize_record(&record);
        if record.is_empty() {
            tracing::warn!("Skipping insert for message {message_id}: no structured data returned");
            return Ok(ProcessOutcome::SkippedEmpty);
        }

        record.insert(
            TIMESTAMP_FIELD.to_string(),
            Value::String(Utc::now().format(TIMESTAMP_FORMAT).to_string()),
        );
        self.store.insert_record(&record).await?;
        tracing::info!("Added row for message {message_id}");

        Ok(ProcessOutcome::Persisted)
    }
}

/// Joins the subject line, body fragments, and PDF texts into the single
/// string handed to the model.
fn canonical_text(subject: Option<&str>, texts: &[String], pdf_texts: &[String]) -> String {
    let mut sections = Vec::with_capacity(texts.len() + pdf_texts.len() + 1);
    if let Some(subject) = subject.filter(|s| !s.is_empty()) {
        sections.push(format!("Subject: {subject}"));
    }
    sections.extend(texts.iter().cloned());
    sections.extend(pdf_texts.iter().cloned());
    sections.join("\n\n")
}
