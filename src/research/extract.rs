use serde_json::Value;
use tracing::warn;

use super::ResearchError;

/// Parses raw assistant output as a single JSON value.
///
/// Falls back to the first fenced code block, then to the first balanced
/// top-level `{...}` span, before giving up with `MalformedResponse`.
pub fn parse_response(raw: &str) -> Result<Value, ResearchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ResearchError::MalformedResponse {
            reason: "response body is empty".to_owned(),
        });
    }

    let direct_error = match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => return Ok(value),
        Err(error) => error,
    };

    if let Some(block) = first_fenced_block(trimmed)
        && let Ok(value) = serde_json::from_str::<Value>(block.trim())
    {
        warn!("recovered JSON from fenced code block in assistant response");
        return Ok(value);
    }

    if let Some(span) = first_object_span(trimmed)
        && let Ok(value) = serde_json::from_str::<Value>(span)
    {
        warn!("recovered JSON from embedded object span in assistant response");
        return Ok(value);
    }

    Err(ResearchError::MalformedResponse {
        reason: direct_error.to_string(),
    })
}

/// Body of the first ``` fence, without its language tag line.
fn first_fenced_block(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after_fence = &text[open + 3..];
    let body_start = match after_fence.find('\n') {
        Some(newline) if is_language_tag(&after_fence[..newline]) => newline + 1,
        _ => 0,
    };
    let body = &after_fence[body_start..];
    let close = body.find("```")?;
    Some(&body[..close])
}

fn is_language_tag(line: &str) -> bool {
    line.trim()
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
}

fn first_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0_usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}
