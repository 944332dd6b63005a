use super::{back_row, button, progress_bar, Card, HEALTH_BAR, SLEEP_BAR};
use crate::utils::format::{escape_html, format_duration_hm, format_liters, percent_of};

const HEADER: &str = "═══════════════";
const SECTION: &str = "━━━━━━━━━━━━━━━";

/// Ten hours fills a sleep bar completely.
const SLEEP_BAR_FULL_MIN: f64 = 600.0;

#[derive(Debug, Clone)]
pub struct HealthView {
    pub last_night_minutes: Option<i64>,
    pub water_today_ml: i64,
    pub water_goal_ml: i64,
}

/// One row of the weekly sleep chart; `minutes` is None when the day has no
/// completed night.
#[derive(Debug, Clone)]
pub struct SleepDay {
    pub label: &'static str,
    pub minutes: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct WaterEntry {
    pub time_label: String,
    pub amount_ml: i64,
}

#[derive(Debug, Clone)]
pub struct WaterView {
    pub today_ml: i64,
    pub goal_ml: i64,
    pub recent: Vec<WaterEntry>,
}

fn sleep_quality_emoji(minutes: i64) -> &'static str {
    match minutes {
        m if m >= 480 => "😊",
        m if m >= 420 => "😐",
        m if m >= 360 => "😴",
        _ => "😫",
    }
}

fn sleep_average_emoji(minutes: i64) -> &'static str {
    match minutes {
        m if m >= 420 => "✅",
        m if m >= 360 => "⚠️",
        _ => "❌",
    }
}

pub fn health_card(view: &HealthView) -> Card {
    let sleep_line = match view.last_night_minutes {
        Some(minutes) => format!(
            "Última noite: {} {}",
            format_duration_hm(minutes),
            sleep_quality_emoji(minutes)
        ),
        None => "Última noite: sem registro".to_string(),
    };

    let pct = percent_of(view.water_today_ml as f64, view.water_goal_ml as f64);
    let bar = progress_bar(
        HEALTH_BAR,
        view.water_today_ml as f64 / view.water_goal_ml.max(1) as f64,
        10,
    );

    let text = format!(
        "💪 <b>SAÚDE</b>\n\
         {HEADER}\n\n\
         😴 <b>SONO</b>\n\
         {sleep_line}\n\
         {SECTION}\n\
         💧 <b>HIDRATAÇÃO</b>\n\
         [{bar}] {pct}%\n\
         {current} de {goal}",
        current = format_liters(view.water_today_ml),
        goal = format_liters(view.water_goal_ml),
    );

    Card::new(
        text,
        vec![
            vec![button("😴 Sono", "health_sleep"), button("💧 Água", "health_water")],
            vec![
                button("🏃 Atividade", "health_activity"),
                button("📊 Estatísticas", "health_stats"),
            ],
            back_row("back_hub"),
        ],
    )
}

/// Weekly chart plus one insight line derived from the data.
pub fn sleep_card(days: &[SleepDay]) -> Card {
    let mut lines = Vec::with_capacity(days.len());
    for day in days {
        match day.minutes {
            Some(minutes) => {
                let bar = progress_bar(SLEEP_BAR, minutes as f64 / SLEEP_BAR_FULL_MIN, 8);
                lines.push(format!(
                    "<code>{}</code> {} {} {}",
                    day.label,
                    bar,
                    format_duration_hm(minutes),
                    sleep_quality_emoji(minutes)
                ));
            }
            None => lines.push(format!(
                "<code>{}</code> {} —",
                day.label,
                progress_bar(SLEEP_BAR, 0.0, 8)
            )),
        }
    }

    let tracked: Vec<i64> = days.iter().filter_map(|d| d.minutes).collect();
    let average_line = if tracked.is_empty() {
        "Média: sem dados".to_string()
    } else {
        let avg = tracked.iter().sum::<i64>() / tracked.len() as i64;
        format!(
            "Média: {} {}",
            format_duration_hm(avg),
            sleep_average_emoji(avg)
        )
    };

    let text = format!(
        "😴 <b>SONO — ÚLTIMOS 7 DIAS</b>\n\
         {HEADER}\n\n\
         {chart}\n\
         {SECTION}\n\
         {average_line}\n\n\
         💡 {insight}",
        chart = lines.join("\n"),
        insight = sleep_insight(&tracked),
    );

    Card::new(text, vec![back_row("health")])
}

/// One-line reading of the week, worst signal first.
pub fn sleep_insight(tracked_minutes: &[i64]) -> &'static str {
    if tracked_minutes.is_empty() {
        return "Sem registros de sono esta semana.";
    }
    let min = tracked_minutes.iter().min().copied().unwrap_or(0);
    let max = tracked_minutes.iter().max().copied().unwrap_or(0);
    let avg = tracked_minutes.iter().sum::<i64>() / tracked_minutes.len() as i64;

    if tracked_minutes.len() >= 3 && max - min > 180 {
        "😵 Horários irregulares. Tente dormir sempre no mesmo horário."
    } else if avg >= 480 {
        "🌟 Excelente semana de sono!"
    } else if avg >= 420 {
        "✅ Boa média de sono. Continue assim!"
    } else if avg >= 360 {
        "⚠️ Média abaixo do ideal. Tente dormir mais cedo."
    } else {
        "❌ Sono insuficiente. Priorize seu descanso!"
    }
}

pub fn water_card(view: &WaterView) -> Card {
    let pct = percent_of(view.today_ml as f64, view.goal_ml as f64);
    let bar = progress_bar(
        HEALTH_BAR,
        view.today_ml as f64 / view.goal_ml.max(1) as f64,
        10,
    );

    let history = if view.recent.is_empty() {
        "Nenhum registro hoje.".to_string()
    } else {
        view.recent
            .iter()
            .map(|entry| format!("• {} — {}ml", entry.time_label, entry.amount_ml))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let text = format!(
        "💧 <b>HIDRATAÇÃO</b>\n\
         {HEADER}\n\n\
         [{bar}] {pct}%\n\
         Hoje: {current} de {goal}\n\n\
         <b>Últimos registros</b>\n\
         {history}",
        current = format_liters(view.today_ml),
        goal = format_liters(view.goal_ml),
    );

    Card::new(
        text,
        vec![
            vec![
                button("+250ml", "water_250"),
                button("+500ml", "water_500"),
                button("+1L", "water_1000"),
            ],
            vec![button("✏️ Inserir manualmente", "water_insert")],
            back_row("health"),
        ],
    )
}

fn morning_feedback(slept_minutes: Option<i64>) -> String {
    match slept_minutes {
        None => "Não encontrei seu registro de sono de ontem.".to_string(),
        Some(m) if m < 360 => format!(
            "😴 Você dormiu pouco ({}). Tente descansar hoje.",
            format_duration_hm(m)
        ),
        Some(m) if m < 420 => format!(
            "🙂 {} de sono. Quase lá, mire em 7h ou mais.",
            format_duration_hm(m)
        ),
        Some(m) if m <= 540 => format!("✅ Ótima noite de sono! ({})", format_duration_hm(m)),
        Some(m) => format!(
            "😪 Você dormiu bastante ({}). Aproveite a energia!",
            format_duration_hm(m)
        ),
    }
}

/// Shown right after the wake-up tap; the hub returns on its own afterwards.
pub fn good_morning_card(name: &str, slept_minutes: Option<i64>, refresh_secs: u64) -> Card {
    let text = format!(
        "☀️ <b>Bom dia, {}!</b>\n\n{}\n\nRetornando ao Hub em {} segundos...",
        escape_html(name),
        morning_feedback(slept_minutes),
        refresh_secs
    );
    Card::bare(text)
}

fn night_feedback(local_hour: u32) -> &'static str {
    match local_hour {
        18..=21 => "🌙 Indo dormir cedo, excelente para a saúde!",
        22 | 23 => "😴 Bom horário para dormir. Descanse bem!",
        _ => "🦉 Já é madrugada! Tente dormir mais cedo amanhã.",
    }
}

pub fn good_night_card(name: &str, awake_minutes: Option<i64>, local_hour: u32) -> Card {
    let awake_line = match awake_minutes {
        Some(m) => format!("Você ficou acordado por {} hoje.\n", format_duration_hm(m)),
        None => String::new(),
    };

    let text = format!(
        "🌙 <b>Boa noite, {}!</b>\n\n{}{}\n\nBons sonhos! ✨",
        escape_html(name),
        awake_line,
        night_feedback(local_hour)
    );

    Card::new(
        text,
        vec![
            vec![button("☀️ Acordei!", "good_morning")],
            back_row("back_hub"),
        ],
    )
}
