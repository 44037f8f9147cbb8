//! Formatting helpers shared by the renderers.

const SIZE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
const KIBI: f64 = 1024.0;

/// Human-readable file size using 1024-based units.
///
/// The value is rounded to two decimals and trailing zeros are dropped, so
/// `1536` becomes `"1.5 KB"` and `1024` becomes `"1 KB"`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= KIBI && unit < SIZE_UNITS.len() - 1 {
        value /= KIBI;
        unit += 1;
    }

    format!("{} {}", trim_decimals(value), SIZE_UNITS[unit])
}

/// Two-decimal rendering without trailing zeros (`1.50` -> `1.5`, `2.00` -> `2`).
pub fn trim_decimals(value: f64) -> String {
    let fixed = format!("{:.2}", value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Escape text for insertion into HTML markup.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape text and turn line breaks into `<br>` tags.
pub fn text_to_html_lines(text: &str) -> String {
    escape_html(text).replace("\r\n", "\n").replace('\n', "<br>")
}
