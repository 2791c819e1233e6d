use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use url::Url;

/// one callback button per row; the layout used by all menus here
pub fn callback_column(buttons: &[(&str, String)]) -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> = buttons
        .iter()
        .map(|(label, data)| vec![InlineKeyboardButton::callback(label.to_string(), data.clone())])
        .collect();
    InlineKeyboardMarkup::new(rows)
}

/// a single url button, used for the public join button under giveaway posts
pub fn url_button(label: &str, link: &str) -> InlineKeyboardMarkup {
    let url = Url::parse(link).unwrap_or_else(|_| {
        // deep links are built from our own bot username; a parse failure
        // here is a programming error, fall back to the bot homepage
        Url::parse("https://t.me").expect("static url")
    });
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::url(label.to_string(), url)]])
}

/// join button carrying the live participant counter in its label
pub fn join_button(button_label: &str, participants: usize, link: &str) -> InlineKeyboardMarkup {
    url_button(&format!("{} ({})", button_label, participants), link)
}

/// captcha on/off toggle shown on the creation preview
pub fn captcha_toggle(enabled: bool, save_label: &str, toggle_label: &str) -> InlineKeyboardMarkup {
    let toggle_data = if enabled { "captcha_off" } else { "captcha_on" };
    callback_column(&[
        (toggle_label, toggle_data.to_string()),
        (save_label, "save_giveaway".to_string()),
    ])
}
