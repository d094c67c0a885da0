//! Recovery of structured output from free-form model replies.
//!
//! Despite the prompt's instructions, models wrap JSON in code fences or
//! surround it with prose often enough that we locate the first balanced
//! top-level object ourselves instead of feeding the raw reply to serde.

use ratescan_core::{Error, Result};

/// Return the first top-level JSON object inside `reply`.
///
/// Tolerates a leading ``` / ```json fence pair and any text around the
/// object. Fails with `Error::Parse` if no `{` is present or the braces
/// never balance. Brace counting is byte-level and deliberately naive about
/// braces inside string literals, matching how far we trust model output.
pub fn first_json_object(reply: &str) -> Result<&str> {
    let mut t = reply.trim();

    if let Some(rest) = t.strip_prefix("```") {
        let rest = rest
            .strip_prefix("json")
            .or_else(|| rest.strip_prefix("JSON"))
            .unwrap_or(rest);
        t = rest.trim_start();
        if let Some(stripped) = t.trim_end().strip_suffix("```") {
            t = stripped.trim_end();
        }
    }

    if t.starts_with('{') && t.ends_with('}') {
        return Ok(t);
    }

    let Some(start) = t.find('{') else {
        return Err(Error::Parse("no '{' found in model output".to_string()));
    };

    let mut depth = 0usize;
    for (i, b) in t.as_bytes().iter().enumerate().skip(start) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(&t[start..=i]);
                }
            }
            _ => {}
        }
    }
    Err(Error::Parse(
        "unbalanced braces in model output".to_string(),
    ))
}
