use std::sync::Arc;

use anyhow::{Context, Result};
use orderdesk_core::{Messenger, PaymentAdapter};
use orderdesk_core::models::Catalog;
use orderdesk_core::services::{
    AdminService, CheckoutService, CheckoutSettings, ConversationService, OrderService,
    PaymentCallbackService,
};
use orderdesk_core::store::{AdminStore, PaymentLedger, SessionStore};
use teloxide::Bot;

use crate::config::BotConfig;
use crate::messenger::TelegramMessenger;
use crate::services::payment::YooKassaAdapter;

/// Everything a handler needs, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub bot: Bot,
    pub conversations: Arc<ConversationService>,
    pub admin_service: AdminService,
    pub payments: Arc<PaymentCallbackService>,
    pub webhook_secret: Option<String>,
}

impl AppState {
    /// `bot_username` provides the default return URL for checkouts.
    pub async fn build(config: &BotConfig, bot: Bot, bot_username: &str) -> Result<Self> {
        let admins = AdminStore::load(config.admins_file.clone(), &config.admin_ids).await;
        let admins = Arc::new(admins);
        let catalog = Arc::new(load_catalog(config)?);
        let messenger: Arc<dyn Messenger> =
            Arc::new(TelegramMessenger::new(bot.clone(), config.store_enabled()));

        let checkout = match &config.yookassa {
            Some(yookassa) => {
                let return_url = config
                    .return_url
                    .clone()
                    .unwrap_or_else(|| format!("https://t.me/{}", bot_username));
                let settings = CheckoutSettings {
                    return_url,
                    receipts: yookassa.receipts,
                };
                let gateway: Arc<dyn PaymentAdapter> = Arc::new(YooKassaAdapter::new(yookassa)?);
                Some((gateway, settings))
            }
            None => None,
        };

        Ok(Self::assemble(
            bot,
            admins,
            catalog,
            messenger,
            checkout,
            config.webhook_secret.clone(),
        ))
    }

    /// Wire the services together around the given collaborators.
    pub fn assemble(
        bot: Bot,
        admins: Arc<AdminStore>,
        catalog: Arc<Catalog>,
        messenger: Arc<dyn Messenger>,
        checkout: Option<(Arc<dyn PaymentAdapter>, CheckoutSettings)>,
        webhook_secret: Option<String>,
    ) -> Self {
        let sessions = SessionStore::new();
        let ledger = PaymentLedger::new();
        let checkout = checkout
            .map(|(gateway, settings)| CheckoutService::new(gateway, ledger.clone(), settings));

        let conversations = ConversationService::new(
            sessions.clone(),
            messenger.clone(),
            OrderService::new(admins.clone(), messenger.clone()),
            checkout,
            catalog.clone(),
        );
        let payments = PaymentCallbackService::new(catalog, ledger, sessions, messenger);

        Self {
            bot,
            conversations: Arc::new(conversations),
            admin_service: AdminService::new(admins),
            payments: Arc::new(payments),
            webhook_secret,
        }
    }
}

fn load_catalog(config: &BotConfig) -> Result<Catalog> {
    match &config.catalog_path {
        Some(path) => Catalog::load(path)
            .with_context(|| format!("Failed to load catalog from {}", path.display())),
        None => {
            let products = Catalog::builtin()
                .products()
                .iter()
                .cloned()
                .map(|mut product| {
                    product.currency = config.currency.clone();
                    product
                })
                .collect();
            Ok(Catalog::new(products)?)
        }
    }
}
