pub mod event;
pub mod finance;
pub mod health;
pub mod hub;

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

/// A rendered screen: HTML body plus the inline keyboard that drives
/// navigation. Builders are pure so every card can be tested without a bot.
#[derive(Debug, Clone)]
pub struct Card {
    pub text: String,
    pub keyboard: InlineKeyboardMarkup,
}

impl Card {
    pub fn new(text: String, rows: Vec<Vec<InlineKeyboardButton>>) -> Self {
        Card {
            text,
            keyboard: InlineKeyboardMarkup::new(rows),
        }
    }

    /// A card with no buttons (the keyboard is removed on edit).
    pub fn bare(text: String) -> Self {
        Card {
            text,
            keyboard: InlineKeyboardMarkup::new(Vec::<Vec<InlineKeyboardButton>>::new()),
        }
    }
}

pub fn button(label: &str, callback_data: &str) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(label.to_string(), callback_data.to_string())
}

pub fn back_row(callback_data: &str) -> Vec<InlineKeyboardButton> {
    vec![button("↩️ Voltar", callback_data)]
}

/// Glyph pair for progress bars. Every card shares one renderer and only
/// the glyphs differ per surface.
#[derive(Debug, Clone, Copy)]
pub struct BarTheme {
    pub filled: &'static str,
    pub empty: &'static str,
}

pub const HUB_BAR: BarTheme = BarTheme {
    filled: "🟦",
    empty: "▪️",
};

pub const HEALTH_BAR: BarTheme = BarTheme {
    filled: "▓",
    empty: "░",
};

pub const FINANCE_BAR: BarTheme = BarTheme {
    filled: "🟦",
    empty: "⬛",
};

pub const SLEEP_BAR: BarTheme = BarTheme {
    filled: "█",
    empty: "░",
};

/// Renders `ratio` (0.0..=1.0, clamped) as a fixed-width bar.
pub fn progress_bar(theme: BarTheme, ratio: f64, width: usize) -> String {
    let ratio = ratio.clamp(0.0, 1.0);
    let filled = (ratio * width as f64).round() as usize;
    let filled = filled.min(width);
    let mut bar = String::new();
    for _ in 0..filled {
        bar.push_str(theme.filled);
    }
    for _ in filled..width {
        bar.push_str(theme.empty);
    }
    bar
}

/// Screen for modules that exist on the keyboard but have no flows yet.
pub fn placeholder_card(title: &str, back_data: &str) -> Card {
    let text = format!("🚧 <b>{title}</b>\n\nEm construção...");
    Card::new(text, vec![back_row(back_data)])
}
