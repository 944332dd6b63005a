use chrono::{DateTime, FixedOffset, Timelike};

use super::{button, progress_bar, Card, HUB_BAR};
use crate::utils::datetime::pt_br_date_line;
use crate::utils::format::{escape_html, format_liters, percent_of};

const LINE: &str = "─────────────────────";

/// Everything the hub needs to render, gathered by the caller.
#[derive(Debug, Clone)]
pub struct HubView<'a> {
    pub name: &'a str,
    pub local_now: DateTime<FixedOffset>,
    pub water_today_ml: i64,
    pub water_goal_ml: i64,
}

/// Greeting text and emoji for a local hour, morning 5-11, afternoon 12-17,
/// night otherwise.
pub fn greeting(hour: u32) -> (&'static str, &'static str) {
    match hour {
        5..=11 => ("Bom dia", "☀️"),
        12..=17 => ("Boa tarde", "🌤️"),
        _ => ("Boa noite", "🌙"),
    }
}

fn water_status_emoji(pct: u32) -> &'static str {
    match pct {
        100.. => "✅",
        75..=99 => "🔥",
        50..=74 => "💪",
        _ => "⚡",
    }
}

/// The dashboard card every interaction returns to.
pub fn hub_card(view: &HubView<'_>) -> Card {
    let (salutation, emoji) = greeting(view.local_now.hour());
    let pct = percent_of(view.water_today_ml as f64, view.water_goal_ml as f64);
    let bar = progress_bar(HUB_BAR, view.water_today_ml as f64 / view.water_goal_ml.max(1) as f64, 8);

    let text = format!(
        "{emoji} <b>{salutation}, {name}!</b>\n\
         {LINE}\n\
         📅 {date}\n\n\
         💧 Água: [{bar}] {pct}%\n\
         \u{2003}{current} de {goal} {status}\n\
         {LINE}",
        name = escape_html(view.name),
        date = pt_br_date_line(view.local_now.date_naive()),
        current = format_liters(view.water_today_ml),
        goal = format_liters(view.water_goal_ml),
        status = water_status_emoji(pct),
    );

    Card::new(
        text,
        vec![
            vec![
                button("⏰ Lembretes", "reminders"),
                button("🌙 Dormir", "good_night"),
            ],
            vec![
                button("💧 +250ml", "water_250"),
                button("+500ml", "water_500"),
                button("+1L", "water_1000"),
            ],
            vec![button("📅 Criar Evento", "create_event")],
            vec![button("── 📂 MÓDULOS ──", "show_modules")],
        ],
    )
}

/// The module picker reached from the hub's last row.
pub fn modules_card() -> Card {
    let text = format!("📂 <b>MÓDULOS</b>\n{LINE}\nEscolha um módulo:");
    Card::new(
        text,
        vec![
            vec![button("💪 Saúde", "health")],
            vec![button("📚 Estudos", "studies")],
            vec![button("💰 Finanças", "finances")],
            vec![button("↩️ Voltar", "back_hub")],
        ],
    )
}
