/// Escapes text interpolated into HTML-mode Telegram messages.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Formats a value as Brazilian currency, e.g. "R$ 1.234,56".
pub fn format_brl(value: f64) -> String {
    let negative = value < 0.0;
    let cents = (value.abs() * 100.0).round() as i64;
    let whole = cents / 100;
    let frac = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    let offset = digits.len() % 3;
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (i + 3 - offset) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}R$ {grouped},{frac:02}")
}

/// Millilitres rendered as litres with one decimal, e.g. "1.2L".
pub fn format_liters(ml: i64) -> String {
    format!("{:.1}L", ml as f64 / 1000.0)
}

/// Minutes rendered as "7h05"; spans under an hour as "45min".
pub fn format_duration_hm(minutes: i64) -> String {
    let minutes = minutes.max(0);
    if minutes < 60 {
        return format!("{minutes}min");
    }
    format!("{}h{:02}", minutes / 60, minutes % 60)
}

/// Percentage of goal reached, clamped to 0..=100 for display.
pub fn percent_of(current: f64, goal: f64) -> u32 {
    if goal <= 0.0 {
        return 0;
    }
    ((current / goal * 100.0).round().clamp(0.0, 100.0)) as u32
}
