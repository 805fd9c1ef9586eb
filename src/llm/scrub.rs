use crate::error::GenerationError;

const MAX_API_ERROR_CHARS: usize = 200;
const REDACTED: &str = "[REDACTED]";

fn is_secret_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}

/// Redact `sk-` style keys, bearer tokens, and the configured key itself.
pub fn scrub_secrets(input: &str, api_key: Option<&str>) -> String {
    let mut scrubbed = match api_key {
        Some(key) if !key.is_empty() => input.replace(key, REDACTED),
        _ => input.to_string(),
    };

    for marker in ["sk-", "Bearer "] {
        let mut search_from = 0;
        while let Some(rel) = scrubbed[search_from..].find(marker) {
            let start = search_from + rel;
            let token_start = start + marker.len();
            let token_len: usize = scrubbed[token_start..]
                .chars()
                .take_while(|c| is_secret_char(*c))
                .map(char::len_utf8)
                .sum();
            if token_len == 0 {
                search_from = token_start;
                continue;
            }
            scrubbed.replace_range(start..token_start + token_len, REDACTED);
            search_from = start + REDACTED.len();
        }
    }

    scrubbed
}

/// Scrub secrets and truncate to a loggable length.
pub fn sanitize_api_error(input: &str, api_key: Option<&str>) -> String {
    let scrubbed = scrub_secrets(input, api_key);
    if scrubbed.chars().count() <= MAX_API_ERROR_CHARS {
        return scrubbed;
    }
    let truncated: String = scrubbed.chars().take(MAX_API_ERROR_CHARS).collect();
    format!("{truncated}...")
}

/// Build a sanitized provider error from a failed HTTP response.
pub async fn api_error(
    provider: &str,
    api_key: Option<&str>,
    response: reqwest::Response,
) -> GenerationError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read provider error body>".to_string());
    GenerationError::Api {
        provider: provider.to_string(),
        status,
        message: sanitize_api_error(&body, api_key),
    }
}

pub fn request_error(provider: &str, api_key: Option<&str>, err: &reqwest::Error) -> GenerationError {
    GenerationError::Request {
        provider: provider.to_string(),
        message: sanitize_api_error(&err.to_string(), api_key),
    }
}
