use serde_json::Value;

/// Utility functions for terminal output

/// Hide all but the last four characters of a secret
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.is_empty() {
        return "(not set)".to_string();
    }
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(8), tail)
}

/// Remove a surrounding markdown code fence, with or without a language tag
pub fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // drop the info string, e.g. `json`
    match body.find('\n') {
        Some(idx) => body[idx + 1..].trim(),
        None => body.trim(),
    }
}

/// Parse assistant content as JSON, tolerating a code fence
pub fn parse_json_content(content: &str) -> Option<Value> {
    serde_json::from_str(strip_code_fences(content)).ok()
}

/// Pretty-print content when it is JSON, otherwise return it trimmed
pub fn pretty_content(content: &str) -> String {
    match parse_json_content(content) {
        Some(value) if value.is_object() || value.is_array() => {
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| content.trim().to_string())
        }
        _ => content.trim().to_string(),
    }
}
