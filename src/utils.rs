// src/utils.rs

/// First `max` characters of `text` (char-boundary safe)
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Shorten `text` for a table cell, appending "..." when it was cut
pub fn ellipsize(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}...", truncate_chars(text, max))
    } else {
        text.to_string()
    }
}

/// Trim an optional model-provided value, dropping the placeholders models like to emit
pub fn clean_optional(value: Option<String>) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();
    match trimmed.to_lowercase().as_str() {
        "" | "null" | "none" | "n/a" | "na" | "not specified" | "unknown" => None,
        _ => Some(trimmed.to_string()),
    }
}

/// Escape `%`, `_` and `\` so a user query matches literally in `LIKE ... ESCAPE '\'`
pub fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
