//! Pure formatting helpers for comment entries.
//!
//! These are deliberately free of UI state: timestamps take an explicit
//! `now` so the bucketing is testable, and the name/initials derivations
//! never return an empty string (degenerate emails fall back to the raw
//! address, then to "Unknown").

use chrono::{DateTime, Local, Utc};

const MINUTE: i64 = 60;
const HOUR: i64 = 3_600;
const DAY: i64 = 86_400;
const WEEK: i64 = 604_800;

const FALLBACK_NAME: &str = "Unknown";

/// Render `ts` relative to `now`: "just now", "n minute(s) ago",
/// "n hour(s) ago", "n day(s) ago", or an absolute local date once the
/// elapsed time reaches a week. Future timestamps clamp to "just now".
pub fn format_relative_time(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = (now - ts).num_seconds().max(0);

    if elapsed < MINUTE {
        return "just now".to_string();
    }
    if elapsed < HOUR {
        return pluralize(elapsed / MINUTE, "minute");
    }
    if elapsed < DAY {
        return pluralize(elapsed / HOUR, "hour");
    }
    if elapsed < WEEK {
        return pluralize(elapsed / DAY, "day");
    }

    // Older than a week: absolute date in local time, e.g. "Mar 4, 2026, 09:15".
    ts.with_timezone(&Local)
        .format("%b %-d, %Y, %H:%M")
        .to_string()
}

/// Relative time against the current instant.
pub fn relative_time(ts: DateTime<Utc>) -> String {
    format_relative_time(ts, Utc::now())
}

fn pluralize(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}

/// Display name for a comment author.
///
/// A non-blank explicit display name wins. Otherwise the email's local part
/// is split on `.`/`_` (empty tokens skipped) and title-cased, so
/// `jane.smith@example.com` becomes `Jane Smith`.
pub fn derive_display_name(email: &str, display_name: Option<&str>) -> String {
    if let Some(name) = display_name {
        let trimmed = name.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let local_part = email.split('@').next().unwrap_or("");
    let tokens: Vec<String> = local_part
        .split(['.', '_'])
        .filter(|token| !token.is_empty())
        .map(title_case)
        .collect();

    if !tokens.is_empty() {
        return tokens.join(" ");
    }

    let trimmed = email.trim();
    if trimmed.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Avatar initials for a comment author: the first letters of the first two
/// display-name tokens, uppercased; a single token yields one letter.
pub fn derive_initials(email: &str, display_name: Option<&str>) -> String {
    let name = derive_display_name(email, display_name);
    let mut tokens = name.split_whitespace();

    let first = tokens.next().and_then(first_letter);
    let second = tokens.next().and_then(first_letter);

    match (first, second) {
        (Some(a), Some(b)) => format!("{a}{b}"),
        (Some(a), None) => a.to_string(),
        // derive_display_name never returns an empty string, but stay total.
        (None, _) => "?".to_string(),
    }
}

fn first_letter(token: &str) -> Option<String> {
    token
        .chars()
        .next()
        .map(|ch| ch.to_uppercase().collect::<String>())
}

fn title_case(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => {
            let head: String = first.to_uppercase().collect();
            let tail: String = chars.flat_map(|ch| ch.to_lowercase()).collect();
            format!("{head}{tail}")
        }
        None => String::new(),
    }
}
