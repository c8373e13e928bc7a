//! String helpers used while normalizing metadata.

use crate::UNKNOWN_ARTIST;

/// Low resolution dimension markers found in provider image URLs
pub const LOW_RES_MARKERS: &[&str] = &["150x150", "50x50"];

/// Replacement dimension for upgraded thumbnails
pub const HIGH_RES_MARKER: &str = "500x500";

/// Capitalize the first letter of every whitespace-separated word and
/// lowercase the rest, collapsing runs of whitespace.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decode the handful of HTML entities providers leave in titles
pub fn decode_html_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    // &amp; last so "&amp;quot;" decodes to "&quot;" rather than '"'
    text.replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Rewrite plain HTTP (and protocol-relative) URLs to HTTPS
pub fn force_https(url: &str) -> String {
    let url = url.trim();
    if url.get(..7).is_some_and(|scheme| scheme.eq_ignore_ascii_case("http://")) {
        format!("https://{}", &url[7..])
    } else if let Some(rest) = url.strip_prefix("//") {
        format!("https://{}", rest)
    } else {
        url.to_string()
    }
}

/// Swap known low resolution markers for the high resolution variant
pub fn upgrade_thumbnail(url: &str) -> String {
    LOW_RES_MARKERS
        .iter()
        .fold(url.to_string(), |acc, marker| acc.replace(marker, HIGH_RES_MARKER))
}

/// Parse a duration given as whole seconds ("245") or clock text
/// ("4:05", "1:02:03"). Returns `None` for anything else.
pub fn parse_duration(text: &str) -> Option<u32> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if !text.contains(':') {
        return text.parse::<u32>().ok().or_else(|| {
            // "245.7" style floats round to the nearest second
            text.parse::<f64>()
                .ok()
                .filter(|secs| secs.is_finite() && *secs >= 0.0 && *secs <= u32::MAX as f64)
                .map(|secs| secs.round() as u32)
        });
    }

    let parts: Vec<&str> = text.split(':').collect();
    if parts.len() > 3 || parts.iter().any(|p| p.is_empty()) {
        return None;
    }

    let mut total: u32 = 0;
    for (idx, part) in parts.iter().enumerate() {
        let value: u32 = part.parse().ok()?;
        // Every component after the first is a base-60 digit
        if idx > 0 && value >= 60 {
            return None;
        }
        total = total.checked_mul(60)?.checked_add(value)?;
    }
    Some(total)
}

/// Read a four digit year from the start of a date-like string
pub fn leading_year(text: &str) -> Option<u32> {
    let digits = text.trim().get(..4)?;
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().filter(|year| *year > 0)
}

/// Whether an artist value is a placeholder rather than a real name:
/// empty, purely numeric, or some spelling of "unknown (artist)"
pub fn is_placeholder_artist(value: &str) -> bool {
    let value = value.trim();
    value.is_empty()
        || value.chars().all(|c| c.is_ascii_digit() || c == ',' || c.is_whitespace())
        || value.eq_ignore_ascii_case("unknown")
        || value.eq_ignore_ascii_case(UNKNOWN_ARTIST)
}
