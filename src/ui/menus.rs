use serenity::all::ButtonStyle;
use serenity::builder::{CreateActionRow, CreateButton};

/// The giveaway id is the id of the message carrying this button.
pub const ENTER_BUTTON_ID: &str = "giveaway:enter";

/* Public entry button */
pub fn enter_button_row() -> CreateActionRow {
    CreateActionRow::Buttons(vec![CreateButton::new(ENTER_BUTTON_ID)
        .label("🎁 Enter")
        .style(ButtonStyle::Success)])
}
