use chrono::{Local, TimeZone};

use crate::domain::email::Sender;

const DATE_FORMAT: &str = "%d/%m/%Y, %I:%M %p";

/// `dd/mm/yyyy, hh:mm AM` in local time.
pub fn format_date(epoch_ms: i64) -> String {
    format_date_in(epoch_ms, &Local)
}

pub fn format_date_in<Tz>(epoch_ms: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    match tz.timestamp_millis_opt(epoch_ms).single() {
        Some(dt) => dt.format(DATE_FORMAT).to_string(),
        None => String::from("(invalid date)"),
    }
}

pub fn sender_line(sender: &Sender) -> String {
    format!("{} <{}>", sender.name, sender.email)
}

/// Collapse whitespace and cut to `max_chars`, adding an ellipsis when cut.
pub fn one_line(s: &str, max_chars: usize) -> String {
    let flat = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let mut out: String = flat.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}
