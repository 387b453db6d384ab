use std::path::PathBuf;

use anyhow::{Context, Result};
use orderdesk_core::UserId;
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "./orderdesk.toml";

#[derive(Clone, Deserialize)]
pub struct BotConfig {
    pub bot_token: String,
    /// Public HTTPS base URL. Unset means long polling.
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default)]
    pub webhook_secret: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Seed for the admin file when it does not exist yet.
    #[serde(default)]
    pub admin_ids: Vec<UserId>,
    #[serde(default = "default_admins_file")]
    pub admins_file: PathBuf,
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Where the buyer lands after paying. Defaults to the bot's t.me link.
    #[serde(default)]
    pub return_url: Option<String>,
    #[serde(default)]
    pub yookassa: Option<YooKassaConfig>,
}

#[derive(Clone, Deserialize)]
pub struct YooKassaConfig {
    pub shop_id: String,
    pub secret_key: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub receipts: bool,
    #[serde(default = "default_vat_code")]
    pub vat_code: u8,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_port() -> u16 {
    3000
}

fn default_admins_file() -> PathBuf {
    PathBuf::from("admins.json")
}

fn default_currency() -> String {
    "RUB".to_string()
}

fn default_api_url() -> String {
    "https://api.yookassa.ru/v3".to_string()
}

fn default_vat_code() -> u8 {
    1
}

fn default_timeout_secs() -> u64 {
    30
}

impl BotConfig {
    pub fn load() -> Result<Self> {
        let path = std::env::var("ORDERDESK_CONFIG")
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        if let Ok(contents) = std::fs::read_to_string(&path) {
            tracing::info!("Loading config from {}", path);
            return toml::from_str(&contents)
                .with_context(|| format!("Invalid config file {}", path));
        }

        tracing::info!("Loading config from environment");
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from `lookup`, which maps variable names to values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bot_token = var("BOT_TOKEN").context("BOT_TOKEN is not set")?;
        let port = match var("PORT") {
            Some(raw) => raw.parse().with_context(|| format!("Invalid PORT: {}", raw))?,
            None => default_port(),
        };

        let yookassa = match (var("SHOP_ID"), var("SECRET_KEY")) {
            (Some(shop_id), Some(secret_key)) => Some(YooKassaConfig {
                shop_id,
                secret_key,
                api_url: var("YOOKASSA_API_URL").unwrap_or_else(default_api_url),
                receipts: var("RECEIPT_ENABLED").is_some_and(|v| parse_flag(&v)),
                vat_code: var("VAT_CODE")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or_else(default_vat_code),
                timeout_secs: var("GATEWAY_TIMEOUT_SECS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or_else(default_timeout_secs),
            }),
            (None, None) => None,
            _ => {
                tracing::warn!("Only one of SHOP_ID and SECRET_KEY is set, digital store disabled");
                None
            }
        };

        Ok(Self {
            bot_token,
            webhook_url: var("WEBHOOK_URL"),
            webhook_secret: var("WEBHOOK_SECRET"),
            port,
            admin_ids: var("ADMIN_IDS").map(|v| parse_admin_ids(&v)).unwrap_or_default(),
            admins_file: var("ADMINS_FILE").map(PathBuf::from).unwrap_or_else(default_admins_file),
            catalog_path: var("CATALOG_PATH").map(PathBuf::from),
            currency: var("CURRENCY").unwrap_or_else(default_currency),
            return_url: var("RETURN_URL"),
            yookassa,
        })
    }

    pub fn store_enabled(&self) -> bool {
        self.yookassa.is_some()
    }

    /// Full URL Telegram should post updates to.
    pub fn webhook_endpoint(&self) -> Option<String> {
        self.webhook_url
            .as_deref()
            .map(|base| format!("{}/webhook", base.trim_end_matches('/')))
    }
}

/// Comma separated ids; parts that are not integers are skipped.
pub fn parse_admin_ids(raw: &str) -> Vec<UserId> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter_map(|part| match part.parse::<UserId>() {
            Ok(id) => Some(id),
            Err(_) => {
                tracing::warn!("Skipping invalid admin id {:?}", part);
                None
            }
        })
        .collect()
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
