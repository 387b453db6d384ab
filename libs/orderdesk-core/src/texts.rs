//! User-facing replies. All strings are Telegram HTML; anything built from
//! user input goes through [`escape_html`].

use crate::models::{Product, UserId};
use crate::validation::escape_html;

pub const WELCOME: &str = "👋 Hi! This is your shop's delivery bot.\n\n\
    Place an order in a few steps and a courier will bring it to you.";

pub const HELP: &str = "How to place an order:\n\
    1) Tap «Place order»\n\
    2) Share your contact or type your phone number\n\
    3) Enter the delivery address\n\
    4) Write the list of items\n\n\
    An administrator or courier will contact you once the order is sent.\n\n\
    Digital goods: tap «Digital store», pick a product and leave an email or phone \
    for the receipt.\n\
    /cancel drops whatever you started.";

pub const NO_SESSION: &str = "To place an order, send /start and tap «Place order».";

pub const ASK_CONTACT: &str =
    "📝 Great! First, send your phone number so the courier can reach you.";
pub const BAD_CONTACT: &str =
    "❗ Please share your contact with the button or type a number like +79991234567.";
pub const ASK_ADDRESS: &str =
    "📍 Thanks. Now write the delivery address (street, house, entrance, floor).";
pub const BAD_ADDRESS: &str =
    "❗ Please enter the address as text (for example: 15 Lenin St, apt 3, entrance 2).";
pub const ASK_ITEMS: &str =
    "🛒 Write the list of items (for example: bread, milk, eggs). Be as specific as you like.";
pub const BAD_ITEMS: &str = "❗ Please enter the list of items as text.";

pub const ORDER_SENT: &str =
    "✅ Thank you! Your order has been sent. A courier will contact you soon.";
pub const ORDER_DEGRADED: &str = "⚠ Your order was accepted, but some administrators \
    could not be notified. Please try again later.";
pub const NO_ADMINS: &str = "✅ Order accepted, but no administrator is configured yet. \
    The shop owner has to add one.";

pub const CANCELLED: &str = "Cancelled. Send /start to begin again.";
pub const NOTHING_TO_CANCEL: &str = "There is nothing to cancel.";

pub const CATALOG_HEADER: &str = "🛍 Pick a product:";
pub const STORE_DISABLED: &str = "The digital store is not available right now.";
pub const UNKNOWN_PRODUCT: &str = "Product not found.";
pub const BAD_CHECKOUT_CONTACT: &str =
    "❗ Send a valid email (name@example.com) or phone number (+79991234567).";

pub const NOT_ADMIN: &str = "❌ Only an existing admin can manage admins.";
pub const ADD_USAGE: &str = "Usage: /addadmin &lt;user_id&gt;\nExample: /addadmin 123456789";
pub const REMOVE_USAGE: &str = "Usage: /deladmin &lt;user_id&gt;";
pub const INVALID_ID: &str = "Invalid id: it must be a number.";
pub const ALREADY_ADMIN: &str = "This user is already an admin.";
pub const NOT_IN_LIST: &str = "This user is not in the admin list.";
pub const SAVE_FAILED: &str = "❌ Failed to save the admin list.";
pub const LIST_EMPTY: &str = "The admin list is empty.";

pub fn catalog_button(product: &Product) -> String {
    format!("{} – {}", product.name, product.price_display())
}

pub fn ask_checkout_contact(product: &Product) -> String {
    format!(
        "🧾 <b>{}</b> – {}\n\nSend an email or phone number for the receipt.",
        escape_html(&product.name),
        escape_html(&product.price_display())
    )
}

pub fn payment_link(product: &Product, url: &str) -> String {
    format!(
        "🔗 Payment link for <b>{}</b> ({}):\n{}",
        escape_html(&product.name),
        escape_html(&product.price_display()),
        escape_html(url)
    )
}

pub fn payment_failed(description: &str) -> String {
    format!("❌ Could not create the payment: {}", escape_html(description))
}

pub fn delivery_link(product: &Product, url: &str) -> String {
    format!(
        "✅ Payment received! Here is your <b>{}</b>:\n{}",
        escape_html(&product.name),
        escape_html(url)
    )
}

pub fn delivery_caption(product: &Product) -> String {
    format!(
        "✅ Payment received! Here is your <b>{}</b>.",
        escape_html(&product.name)
    )
}

pub fn delivery_file_missing(product: &Product) -> String {
    format!(
        "✅ Payment received for <b>{}</b>, but the file is temporarily unavailable. \
        We will send it to you shortly.",
        escape_html(&product.name)
    )
}

pub fn admin_added(id: UserId) -> String {
    format!("✅ Admin {} added.", id)
}

pub fn admin_removed(id: UserId, remaining: usize) -> String {
    if remaining == 0 {
        format!(
            "✅ Admin {} removed.\n⚠ The admin list is now empty: orders will not reach anyone \
             until an id is added with <code>orderdesk-bot admins add</code>.",
            id
        )
    } else {
        format!("✅ Admin {} removed.", id)
    }
}

pub fn admin_list(admins: &[UserId]) -> String {
    let lines: Vec<String> = admins.iter().map(|a| format!("<code>{}</code>", a)).collect();
    format!("Admins:\n{}", lines.join("\n"))
}
