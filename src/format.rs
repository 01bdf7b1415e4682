//! Display formatting for posts: view counts, dates, truncation, links.
//! Everything here is pure; "now" is always passed in.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::OnceCell;
use regex::Regex;

/// Abbreviate a view count using the Indian numbering the site uses
/// (crore, million, lakh, thousand). Highest threshold wins; always floors.
pub fn format_views(views: u64) -> String {
    const STEPS: [(u64, &str); 4] = [
        (10_000_000, "cr"),
        (1_000_000, "M"),
        (100_000, "L"),
        (1_000, "k"),
    ];
    for (step, suffix) in STEPS {
        if views >= step {
            return format!("{}{}", views / step, suffix);
        }
    }
    views.to_string()
}

/// Parse the timestamps the backend emits (`2024-04-05 10:22:11`, RFC 3339,
/// or a bare date).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Long date without time, e.g. "April 5, 2024".
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// [`format_long_date`] on a raw backend timestamp. Unparseable input is
/// returned as-is.
pub fn format_date(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(dt) => format_long_date(dt.date()),
        None => raw.to_string(),
    }
}

/// How [`truncate`] bounds its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Truncate {
    Words(usize),
    Chars(usize),
}

const ELLIPSIS: &str = "...";

/// Cut `text` at the limit and append "..." if it exceeds it; otherwise
/// return it unchanged.
pub fn truncate(text: &str, mode: Truncate) -> String {
    match mode {
        Truncate::Words(limit) => {
            let words: Vec<&str> = text.split_whitespace().collect();
            if words.len() > limit {
                format!("{}{ELLIPSIS}", words[..limit].join(" "))
            } else {
                text.to_string()
            }
        }
        Truncate::Chars(limit) => {
            if text.chars().count() > limit {
                let head: String = text.chars().take(limit).collect();
                format!("{head}{ELLIPSIS}")
            } else {
                text.to_string()
            }
        }
    }
}

/// "5 min read"
pub fn read_time_label(minutes: u32) -> String {
    format!("{minutes} min read")
}

/// Canonical post path, `/<category>/<slug>/`.
pub fn post_url(category_slug: &str, slug: &str) -> String {
    format!("/{category_slug}/{slug}/")
}

/// Avatars come back as site-relative paths; absolute URLs pass through.
pub fn avatar_url(base_url: &str, avatar: &str) -> String {
    if avatar.starts_with("http://") || avatar.starts_with("https://") || avatar.is_empty() {
        return avatar.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        avatar.trim_start_matches('/')
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharePlatform {
    Facebook,
    Twitter,
    WhatsApp,
}

pub fn share_url(platform: SharePlatform, page_url: &str) -> String {
    let (endpoint, key) = match platform {
        SharePlatform::Facebook => ("https://www.facebook.com/sharer/sharer.php", "u"),
        SharePlatform::Twitter => ("https://twitter.com/intent/tweet", "url"),
        SharePlatform::WhatsApp => ("https://api.whatsapp.com/send", "text"),
    };
    reqwest::Url::parse_with_params(endpoint, &[(key, page_url)])
        .map(|u| u.to_string())
        .unwrap_or_else(|_| endpoint.to_string())
}

/// Decode entities, strip tags and collapse whitespace in backend text
/// (meta descriptions and excerpts sometimes carry editor markup).
pub fn clean_text(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
    let stripped = re_tags.replace_all(&decoded, " ");

    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    re_ws.replace_all(&stripped, " ").trim().to_string()
}

/// "3 hours ago" / "in 2 days", following the usual distance buckets
/// (minutes, about N hours, days, about/over/almost N years).
pub fn relative_time(then: NaiveDateTime, now: NaiveDateTime) -> String {
    let delta = now - then;
    let future = delta.num_seconds() < 0;
    let secs = delta.num_seconds().unsigned_abs();
    let distance = distance_words(secs);
    if future {
        format!("in {distance}")
    } else {
        format!("{distance} ago")
    }
}

fn distance_words(secs: u64) -> String {
    const MIN: u64 = 60;
    const HOUR: u64 = 60 * MIN;
    const DAY: u64 = 24 * HOUR;
    const MONTH: u64 = 30 * DAY;
    const YEAR: u64 = 365 * DAY;

    let plural = |n: u64, unit: &str| {
        if n == 1 {
            format!("1 {unit}")
        } else {
            format!("{n} {unit}s")
        }
    };
    // round to nearest minute
    let minutes = (secs + 30) / MIN;

    match secs {
        s if s < 30 => "less than a minute".to_string(),
        s if s < 45 * MIN - 30 => plural(minutes.max(1), "minute"),
        s if s < 90 * MIN - 30 => "about 1 hour".to_string(),
        s if s < DAY - 30 => format!("about {}", plural((minutes + 30) / 60, "hour")),
        s if s < 42 * HOUR - 30 => "1 day".to_string(),
        s if s < MONTH - 30 => plural((secs + DAY / 2) / DAY, "day"),
        s if s < 45 * DAY => "about 1 month".to_string(),
        s if s < 2 * MONTH => "about 2 months".to_string(),
        s if s < YEAR => plural(((secs + MONTH / 2) / MONTH).min(12), "month"),
        _ => {
            let years = secs / YEAR;
            let rem_months = (secs % YEAR) / MONTH;
            match rem_months {
                0..=2 => format!("about {}", plural(years, "year")),
                3..=8 => format!("over {}", plural(years, "year")),
                _ => format!("almost {}", plural(years + 1, "year")),
            }
        }
    }
}
