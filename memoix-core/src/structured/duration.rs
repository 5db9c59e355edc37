//! Recipe durations: ISO-8601 (`PT1H30M`) and free text ("6 hours 20 minutes").

use std::sync::LazyLock;

use regex::Regex;

static ISO_DURATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^P(?:(?P<d>\d+(?:\.\d+)?)D)?(?:T(?:(?P<h>\d+(?:\.\d+)?)H)?(?:(?P<m>\d+(?:\.\d+)?)M)?(?:(?P<s>\d+(?:\.\d+)?)S)?)?$",
    )
    .expect("Invalid ISO duration regex")
});

/// English unit words inside an ISO string: "PT1Hour30Minutes"
static ISO_WORD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d)\s*(hours?|hrs?|minutes?|mins?|seconds?|secs?|days?)")
        .expect("Invalid ISO word regex")
});

static FREE_TEXT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?P<n>\d+(?:\.\d+)?)\s*(?P<unit>days?|hours?|hrs?|h|minutes?|mins?|m|seconds?|secs?|s)\b",
    )
    .expect("Invalid free-text duration regex")
});

/// Parse a duration into whole minutes. Returns `None` for anything unreadable
/// or zero.
pub fn parse_minutes(raw: &str) -> Option<u32> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    let mut chars = s.chars();
    let looks_iso = matches!(chars.next(), Some('P' | 'p'))
        && chars
            .next()
            .is_some_and(|c| c.is_ascii_digit() || c.eq_ignore_ascii_case(&'t'));
    let minutes = if looks_iso {
        parse_iso(&normalize_iso_words(s))
    } else {
        parse_free_text(s)
    }?;
    let rounded = minutes.round();
    (rounded >= 1.0 && rounded < f64::from(u32::MAX)).then_some(rounded as u32)
}

/// Rewrite English unit words into ISO designators and drop spaces.
fn normalize_iso_words(s: &str) -> String {
    let replaced = ISO_WORD_REGEX.replace_all(s, |caps: &regex::Captures| {
        let designator = match caps[2].to_lowercase().chars().next() {
            Some('h') => "H",
            Some('m') => "M",
            Some('s') => "S",
            _ => "D",
        };
        format!("{}{}", &caps[1], designator)
    });
    replaced.split_whitespace().collect()
}

fn parse_iso(s: &str) -> Option<f64> {
    let caps = ISO_DURATION_REGEX.captures(s)?;
    let part = |name: &str| -> f64 {
        caps.name(name)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .unwrap_or(0.0)
    };
    Some(part("d") * 1440.0 + part("h") * 60.0 + part("m") + part("s") / 60.0)
}

fn parse_free_text(s: &str) -> Option<f64> {
    let mut total = 0.0;
    let mut any = false;
    for caps in FREE_TEXT_REGEX.captures_iter(s) {
        let n: f64 = caps["n"].parse().ok()?;
        let factor = match caps["unit"].to_lowercase().chars().next() {
            Some('d') => 1440.0,
            Some('h') => 60.0,
            Some('m') => 1.0,
            _ => 1.0 / 60.0,
        };
        total += n * factor;
        any = true;
    }
    any.then_some(total)
}

/// Format minutes for display: "6 hr 20 min", "45 min", "2 hr".
pub fn format_minutes(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    match (hours, mins) {
        (0, m) => format!("{m} min"),
        (h, 0) => format!("{h} hr"),
        (h, m) => format!("{h} hr {m} min"),
    }
}

/// Recipe time: total if present, otherwise prep + cook.
pub fn recipe_time(total: Option<&str>, prep: Option<&str>, cook: Option<&str>) -> Option<String> {
    if let Some(total) = total.and_then(parse_minutes) {
        return Some(format_minutes(total));
    }
    let sum = prep.and_then(parse_minutes).unwrap_or(0) + cook.and_then(parse_minutes).unwrap_or(0);
    (sum > 0).then(|| format_minutes(sum))
}
