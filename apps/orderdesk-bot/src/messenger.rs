use std::path::Path;

use async_trait::async_trait;
use orderdesk_core::{DeliveryError, Messenger, OutgoingMessage, UserId};
use teloxide::prelude::*;
use teloxide::types::{InputFile, ParseMode};

use crate::bot::keyboards;

/// Sends outgoing messages through the Bot API in HTML mode.
#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
    store_enabled: bool,
}

impl TelegramMessenger {
    pub fn new(bot: Bot, store_enabled: bool) -> Self {
        Self { bot, store_enabled }
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send(&self, to: UserId, message: OutgoingMessage) -> Result<(), DeliveryError> {
        let mut request = self
            .bot
            .send_message(ChatId(to), message.text)
            .parse_mode(ParseMode::Html);
        if let Some(keyboard) = &message.keyboard {
            request = request.reply_markup(keyboards::render(keyboard, self.store_enabled));
        }
        request
            .await
            .map(|_| ())
            .map_err(|e| DeliveryError::new(to, e.to_string()))
    }

    async fn send_file(&self, to: UserId, path: &Path, caption: &str) -> Result<(), DeliveryError> {
        self.bot
            .send_document(ChatId(to), InputFile::file(path.to_path_buf()))
            .caption(caption.to_string())
            .parse_mode(ParseMode::Html)
            .await
            .map(|_| ())
            .map_err(|e| DeliveryError::new(to, e.to_string()))
    }
}
