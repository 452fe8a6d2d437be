use std::{env, path::PathBuf, result::Result};

use anyhow::Context;
use config::{Config, ConfigError};
use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct GmailConfig {
    pub access_token: String,
    /// Extra label the unread query is scoped to, e.g. a "dealflow" label.
    pub label_filter: Option<String>,
    pub page_size: u32,
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub api_key: String,
    pub id: String,
    pub temperature: f64,
}

#[derive(Debug, Clone)]
pub struct AirtableConfig {
    pub api_key: String,
    pub base_id: String,
    pub table_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    pub include_page_images: bool,
    pub page_render_width: i32,
    pub debug_dir: PathBuf,
}

impl Default for IngestSettings {
    fn default() -> Self {
        IngestSettings {
            include_page_images: false,
            page_render_width: 1024,
            debug_dir: PathBuf::from("debug"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct GmailSettings {
    label_filter: Option<String>,
    page_size: u32,
}

impl Default for GmailSettings {
    fn default() -> Self {
        GmailSettings {
            label_filter: None,
            page_size: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct ModelSettings {
    id: String,
    temperature: f64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        ModelSettings {
            id: "gemini-2.5-flash".to_string(),
            temperature: 0.0,
        }
    }
}

/// Tunables read from an optional `config.toml`. Secrets never live here.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    gmail: GmailSettings,
    model: ModelSettings,
    ingest: IngestSettings,
}

impl ConfigFile {
    fn load(path: &str) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .build()?;

        builder.try_deserialize()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gmail: GmailConfig,
    pub model: ModelConfig,
    pub airtable: AirtableConfig,
    pub ingest: IngestSettings,
}

impl AppConfig {
    /// Validates everything once at startup. A missing credential is a fatal
    /// error here, never a per-message one.
    pub fn load() -> anyhow::Result<Self> {
        let path = env::var("APP_CONFIG").unwrap_or_else(|_| "config".to_string());
        let file = ConfigFile::load(&path).context("config file is invalid")?;

        let ConfigFile {
            gmail,
            model,
            ingest,
        } = file;

        Ok(AppConfig {
            gmail: GmailConfig {
                access_token: require_env("GMAIL_ACCESS_TOKEN")?,
                label_filter: gmail.label_filter,
                page_size: gmail.page_size,
            },
            model: ModelConfig {
                api_key: require_env("GEMINI_API_KEY")?,
                id: model.id,
                temperature: model.temperature,
            },
            airtable: AirtableConfig {
                api_key: require_env("AIRTABLE_API_KEY")?,
                base_id: require_env("AIRTABLE_BASE_ID")?,
                table_name: require_env("AIRTABLE_TABLE_NAME")?,
            },
            ingest,
        })
    }
}

fn require_env(key: &str) -> anyhow::Result<String> {
    let value = env::var(key).with_context(|| format!("{key} is required"))?;
    if value.is_empty() {
        anyhow::bail!("{key} is required but empty");
    }
    Ok(value)
}
