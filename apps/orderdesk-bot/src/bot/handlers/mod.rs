use orderdesk_core::Sender;
use teloxide::types::User;

pub mod callback;
pub mod command;

pub fn sender_of(user: &User) -> Sender {
    Sender {
        id: user.id.0 as i64,
        full_name: Some(user.full_name()).filter(|name| !name.trim().is_empty()),
        username: user.username.clone(),
    }
}
