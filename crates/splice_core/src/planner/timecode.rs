//! Strict `MM:SS` / `HH:MM:SS` timecode parsing.

/// Parse a timecode into seconds.
///
/// Hours and minutes are unsigned integers; seconds may carry a decimal
/// fraction (`01:02.5`). Anything else, including signs, empty fields and
/// more than three fields, is rejected.
pub fn parse_timecode(text: &str) -> Option<f64> {
    let parts: Vec<&str> = text.trim().split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [m, s] => ("0", *m, *s),
        [h, m, s] => (*h, *m, *s),
        _ => return None,
    };

    let hours = parse_integer(hours)?;
    let minutes = parse_integer(minutes)?;
    let seconds = parse_seconds(seconds)?;

    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

fn parse_integer(field: &str) -> Option<f64> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse::<u64>().ok().map(|v| v as f64)
}

fn parse_seconds(field: &str) -> Option<f64> {
    let (whole, fraction) = match field.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (field, None),
    };
    parse_integer(whole)?;
    if let Some(f) = fraction {
        if f.is_empty() || !f.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
    }
    field.parse().ok()
}

/// Render seconds as `HH:MM:SS.mmm` for messages.
pub fn format_timecode(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let ms = total_ms % 1000;
    let total_s = total_ms / 1000;
    format!(
        "{:02}:{:02}:{:02}.{:03}",
        total_s / 3600,
        (total_s / 60) % 60,
        total_s % 60,
        ms
    )
}
