use chrono::{
    DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc,
    Weekday,
};

const WEEKDAYS_LONG: [&str; 7] = [
    "segunda-feira",
    "terça-feira",
    "quarta-feira",
    "quinta-feira",
    "sexta-feira",
    "sábado",
    "domingo",
];

const WEEKDAYS_SHORT: [&str; 7] = ["seg", "ter", "qua", "qui", "sex", "sáb", "dom"];

const MONTHS: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

pub fn local_offset(offset_hours: i32) -> FixedOffset {
    let clamped = offset_hours.clamp(-12, 14);
    FixedOffset::east_opt(clamped * 3600).unwrap_or_else(|| Utc.fix())
}

pub fn local_now(offset_hours: i32) -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&local_offset(offset_hours))
}

pub fn weekday_long_pt(weekday: Weekday) -> &'static str {
    WEEKDAYS_LONG[weekday.num_days_from_monday() as usize]
}

pub fn weekday_short_pt(weekday: Weekday) -> &'static str {
    WEEKDAYS_SHORT[weekday.num_days_from_monday() as usize]
}

pub fn month_name_pt(month: u32) -> &'static str {
    MONTHS
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("?")
}

/// Date line for the hub card, e.g. "quinta-feira, 13 de fevereiro".
pub fn pt_br_date_line(date: NaiveDate) -> String {
    use chrono::Datelike;
    format!(
        "{}, {} de {}",
        weekday_long_pt(date.weekday()),
        date.day(),
        month_name_pt(date.month())
    )
}

pub fn parse_br_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%d/%m/%Y").ok()
}

pub fn parse_hhmm(input: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(input.trim(), "%H:%M").ok()
}

pub fn parse_rfc3339_utc(input: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(input)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// UTC bounds (as RFC3339 strings) of one local calendar day.
pub fn day_bounds_utc(date: NaiveDate, offset: FixedOffset) -> (String, String) {
    let start = date.and_time(NaiveTime::MIN);
    let end = start + Duration::days(1);
    (
        local_to_utc_rfc3339(start, offset),
        local_to_utc_rfc3339(end, offset),
    )
}

/// UTC bounds (as RFC3339 strings) of one local calendar month.
pub fn month_bounds_utc(year: i32, month: u32, offset: FixedOffset) -> (String, String) {
    let start = NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN);
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let end = NaiveDate::from_ymd_opt(next_year, next_month, 1).unwrap_or(NaiveDate::MIN);
    (
        local_to_utc_rfc3339(start.and_time(NaiveTime::MIN), offset),
        local_to_utc_rfc3339(end.and_time(NaiveTime::MIN), offset),
    )
}

fn local_to_utc_rfc3339(ndt: NaiveDateTime, offset: FixedOffset) -> String {
    match offset.from_local_datetime(&ndt).single() {
        Some(dt) => dt.with_timezone(&Utc).to_rfc3339(),
        None => Utc.from_utc_datetime(&ndt).to_rfc3339(),
    }
}
