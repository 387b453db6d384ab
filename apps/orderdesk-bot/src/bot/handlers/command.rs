use orderdesk_core::services::AdminCommand;
use orderdesk_core::{BotCommand, Input, texts};
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tracing::{debug, info};

use crate::AppState;
use crate::bot::handlers::sender_of;

pub async fn message_handler(
    bot: Bot,
    msg: Message,
    state: AppState,
) -> Result<(), teloxide::RequestError> {
    if !msg.chat.is_private() {
        debug!(chat_id = msg.chat.id.0, "Ignoring message outside a private chat");
        return Ok(());
    }
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let sender = sender_of(user);
    let user_id = sender.id;

    if let Some(text) = msg.text().filter(|t| t.starts_with('/')) {
        info!(user_id, command = text, "Received command");
        let conversations = &state.conversations;
        let admin_command = match BotCommand::parse(text) {
            Some(BotCommand::Start) => {
                conversations.welcome(user_id).await;
                return Ok(());
            }
            Some(BotCommand::Help) => {
                conversations.help(user_id).await;
                return Ok(());
            }
            Some(BotCommand::Shop) => {
                conversations.show_catalog(user_id).await;
                return Ok(());
            }
            Some(BotCommand::Cancel) => {
                conversations.cancel(user_id).await;
                return Ok(());
            }
            Some(BotCommand::AddAdmin(arg)) => AdminCommand::Add(arg),
            Some(BotCommand::RemoveAdmin(arg)) => AdminCommand::Remove(arg),
            Some(BotCommand::ListAdmins) => AdminCommand::List,
            None => {
                bot.send_message(msg.chat.id, texts::HELP)
                    .parse_mode(ParseMode::Html)
                    .await?;
                return Ok(());
            }
        };

        let reply = state.admin_service.handle(user_id, admin_command).await;
        bot.send_message(msg.chat.id, reply)
            .parse_mode(ParseMode::Html)
            .await?;
        return Ok(());
    }

    let input = Input {
        text: msg.text().map(str::to_string),
        contact_phone: msg.contact().map(|c| c.phone_number.clone()),
    };
    let reaction = state.conversations.handle_message(&sender, &input).await;
    debug!(user_id, ?reaction, "Message handled");
    Ok(())
}
