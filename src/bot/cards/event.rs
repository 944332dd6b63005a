use chrono::{Datelike, Timelike};

use super::{button, Card};
use crate::bot::wizard::{DraftFields, WizardState};
use crate::utils::datetime::weekday_long_pt;
use crate::utils::format::escape_html;

const SECTION: &str = "━━━━━━━━━━━━━━━";

fn date_line(fields: &DraftFields) -> String {
    match fields.event_date {
        Some(date) => format!(
            "{:02}/{:02}/{} ({})",
            date.day(),
            date.month(),
            date.year(),
            weekday_long_pt(date.weekday())
        ),
        None => "—".to_string(),
    }
}

fn time_line(fields: &DraftFields) -> String {
    if fields.all_day == Some(true) {
        return "☀️ Dia inteiro".to_string();
    }
    match (fields.start_time, fields.end_time) {
        (Some(start), Some(end)) => format!(
            "⏰ Horário: {:02}:{:02} – {:02}:{:02}",
            start.hour(),
            start.minute(),
            end.hour(),
            end.minute()
        ),
        (Some(start), None) => format!("⏰ Horário: {:02}:{:02}", start.hour(), start.minute()),
        _ => "⏰ Horário: —".to_string(),
    }
}

fn summary_lines(fields: &DraftFields) -> String {
    let title = fields.title.as_deref().unwrap_or("—");
    let location = fields.location.as_deref().unwrap_or("—");
    format!(
        "📌 <b>{}</b>\n📆 Data: {}\n{}\n📍 Local: {}",
        escape_html(title),
        date_line(fields),
        time_line(fields),
        escape_html(location)
    )
}

fn awaiting_label(state: &WizardState) -> &'static str {
    match state {
        WizardState::AwaitingTitle => "o nome do evento",
        WizardState::AwaitingDate { .. } => "a data",
        WizardState::AwaitingAllDay { .. } => "se dura o dia todo",
        WizardState::AwaitingStart { .. } => "o horário de início",
        WizardState::AwaitingEnd { .. } => "o horário de término",
        WizardState::AwaitingLocation { .. } => "o local",
        WizardState::Review => "sua confirmação",
    }
}

/// Anchor card while the wizard collects answers. Lists what is already
/// filled and which question is open.
pub fn creating_card(fields: &DraftFields, state: &WizardState) -> Card {
    let mut text = format!("📅 <b>CRIANDO EVENTO</b>\n{SECTION}");

    if let Some(title) = fields.title.as_deref() {
        text.push_str(&format!("\n✅ Título: {}", escape_html(title)));
    }
    if fields.event_date.is_some() {
        text.push_str(&format!("\n✅ Data: {}", date_line(fields)));
    }
    if fields.all_day == Some(true) {
        text.push_str("\n✅ ☀️ Dia inteiro");
    } else {
        if let Some(start) = fields.start_time {
            text.push_str(&format!("\n✅ Início: {:02}:{:02}", start.hour(), start.minute()));
        }
        if let Some(end) = fields.end_time {
            text.push_str(&format!("\n✅ Fim: {:02}:{:02}", end.hour(), end.minute()));
        }
    }
    if let Some(location) = fields.location.as_deref() {
        text.push_str(&format!("\n✅ Local: {}", escape_html(location)));
    }

    text.push_str(&format!("\n\n💬 Aguardando {}...", awaiting_label(state)));

    Card::new(text, vec![vec![button("❌ Cancelar", "event_cancel")]])
}

/// The one wizard question answered by buttons instead of text.
pub fn allday_card(fields: &DraftFields) -> Card {
    let title = fields.title.as_deref().unwrap_or("—");
    let text = format!(
        "📅 <b>CRIANDO EVENTO</b>\n\
         {SECTION}\n\
         📌 <b>{}</b>\n\
         📆 {}\n\n\
         O evento dura o dia todo?",
        escape_html(title),
        date_line(fields),
    );

    Card::new(
        text,
        vec![
            vec![button("☀️ Sim, dia inteiro", "event_allday_yes")],
            vec![button("⏰ Não, tem horário", "event_allday_no")],
            vec![button("❌ Cancelar", "event_cancel")],
        ],
    )
}

pub fn review_card(fields: &DraftFields) -> Card {
    let text = format!(
        "📋 <b>CONFIRA SEU EVENTO</b>\n{SECTION}\n{}\n\nEstá tudo certo?",
        summary_lines(fields)
    );

    Card::new(
        text,
        vec![
            vec![button("✅ Confirmar", "event_confirm")],
            vec![button("✏️ Editar", "event_edit"), button("❌ Cancelar", "event_cancel")],
        ],
    )
}

/// Field picker opened from the review card. Time rows only exist for
/// timed events.
pub fn edit_menu_card(fields: &DraftFields) -> Card {
    let text = format!(
        "✏️ <b>EDITAR EVENTO</b>\n{SECTION}\n{}\n\nO que você quer alterar?",
        summary_lines(fields)
    );

    let mut rows = vec![vec![
        button("📌 Título", "edit_title"),
        button("📆 Data", "edit_date"),
    ]];
    if fields.all_day != Some(true) {
        rows.push(vec![
            button("⏰ Início", "edit_start"),
            button("⏰ Fim", "edit_end"),
        ]);
    }
    rows.push(vec![button("📍 Local", "edit_location")]);
    rows.push(vec![button("↩️ Voltar", "event_exit")]);

    Card::new(text, rows)
}

pub fn confirmed_card(fields: &DraftFields) -> Card {
    let text = format!(
        "✅ <b>EVENTO CRIADO!</b>\n{SECTION}\n{}\n\nPode deixar que eu te lembro! 😉",
        summary_lines(fields)
    );

    Card::new(text, vec![vec![button("🏠 Voltar ao Hub", "hub")]])
}
