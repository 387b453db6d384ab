/// Slash commands the bot reacts to. Anything else is fed to the
/// conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Help,
    Shop,
    Cancel,
    AddAdmin(Option<String>),
    RemoveAdmin(Option<String>),
    ListAdmins,
}

impl BotCommand {
    /// Parse `/name[@bot] [arg]`. Unknown commands yield `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let rest = text.strip_prefix('/')?;
        let mut parts = rest.split_whitespace();
        let head = parts.next()?;
        let name = head.split('@').next().unwrap_or(head).to_lowercase();
        let arg = parts.next().map(str::to_string);

        match name.as_str() {
            "start" => Some(BotCommand::Start),
            "help" => Some(BotCommand::Help),
            "shop" => Some(BotCommand::Shop),
            "cancel" => Some(BotCommand::Cancel),
            "addadmin" => Some(BotCommand::AddAdmin(arg)),
            "deladmin" => Some(BotCommand::RemoveAdmin(arg)),
            "admins" => Some(BotCommand::ListAdmins),
            _ => None,
        }
    }
}

/// Inline button payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    StartOrder,
    Help,
    Shop,
    Buy(String),
}

impl CallbackAction {
    const BUY_PREFIX: &'static str = "buy:";

    pub fn parse(data: &str) -> Option<Self> {
        match data.trim() {
            "start_order" => Some(CallbackAction::StartOrder),
            "help" => Some(CallbackAction::Help),
            "shop" => Some(CallbackAction::Shop),
            other => other
                .strip_prefix(Self::BUY_PREFIX)
                .filter(|id| !id.is_empty())
                .map(|id| CallbackAction::Buy(id.to_string())),
        }
    }

    pub fn data(&self) -> String {
        match self {
            CallbackAction::StartOrder => "start_order".to_string(),
            CallbackAction::Help => "help".to_string(),
            CallbackAction::Shop => "shop".to_string(),
            CallbackAction::Buy(id) => format!("{}{}", Self::BUY_PREFIX, id),
        }
    }
}
