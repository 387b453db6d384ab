use std::sync::Arc;

use tracing::{error, info};

use crate::models::UserId;
use crate::store::{AddOutcome, AdminStore, RemoveOutcome};
use crate::texts;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    Add(Option<String>),
    Remove(Option<String>),
    List,
}

/// `/addadmin`, `/deladmin`, `/admins`. Only current admins may run them.
#[derive(Clone)]
pub struct AdminService {
    admins: Arc<AdminStore>,
}

impl AdminService {
    pub fn new(admins: Arc<AdminStore>) -> Self {
        Self { admins }
    }

    pub async fn is_admin(&self, user_id: UserId) -> bool {
        self.admins.contains(user_id).await
    }

    /// Execute `command` for `caller` and return the reply text.
    pub async fn handle(&self, caller: UserId, command: AdminCommand) -> String {
        if !self.is_admin(caller).await {
            info!(caller, ?command, "Rejected admin command from non-admin");
            return texts::NOT_ADMIN.to_string();
        }

        match command {
            AdminCommand::List => {
                let admins = self.admins.list().await;
                if admins.is_empty() {
                    texts::LIST_EMPTY.to_string()
                } else {
                    texts::admin_list(&admins)
                }
            }
            AdminCommand::Add(arg) => {
                let Some(arg) = arg else {
                    return texts::ADD_USAGE.to_string();
                };
                let Ok(id) = arg.parse::<UserId>() else {
                    return texts::INVALID_ID.to_string();
                };
                match self.admins.add(id).await {
                    Ok(AddOutcome::Added) => texts::admin_added(id),
                    Ok(AddOutcome::AlreadyPresent) => texts::ALREADY_ADMIN.to_string(),
                    Err(e) => {
                        error!(caller, admin_id = id, "Failed to persist admin list: {}", e);
                        texts::SAVE_FAILED.to_string()
                    }
                }
            }
            AdminCommand::Remove(arg) => {
                let Some(arg) = arg else {
                    return texts::REMOVE_USAGE.to_string();
                };
                let Ok(id) = arg.parse::<UserId>() else {
                    return texts::INVALID_ID.to_string();
                };
                match self.admins.remove(id).await {
                    Ok(RemoveOutcome::Removed { remaining }) => texts::admin_removed(id, remaining),
                    Ok(RemoveOutcome::NotPresent) => texts::NOT_IN_LIST.to_string(),
                    Err(e) => {
                        error!(caller, admin_id = id, "Failed to persist admin list: {}", e);
                        texts::SAVE_FAILED.to_string()
                    }
                }
            }
        }
    }
}
