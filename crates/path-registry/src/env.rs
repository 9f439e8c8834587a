//! Environment variable substitution in configuration text.
//!
//! Supports `${VAR}` and `${VAR:-default}`. An empty variable counts as
//! unset when a default is given.

use quicklook_common::{QuicklookError, QuicklookResult};

/// Expand `${...}` references in `content`.
pub fn expand_env_vars(content: &str) -> QuicklookResult<String> {
    let mut result = String::with_capacity(content.len());
    let mut rest = content;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let end = matching_brace(after).ok_or_else(|| {
            QuicklookError::config(format!(
                "Unclosed variable substitution: ${{{}",
                after.lines().next().unwrap_or_default()
            ))
        })?;

        result.push_str(&resolve_var_expr(&after[..end])?);
        rest = &after[end + 1..];
    }

    result.push_str(rest);
    Ok(result)
}

/// Byte offset of the `}` closing an expression, allowing nested braces in
/// the default value.
fn matching_brace(s: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (i, c) in s.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn resolve_var_expr(expr: &str) -> QuicklookResult<String> {
    match expr.split_once(":-") {
        Some((name, default)) => match std::env::var(name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        },
        None => std::env::var(expr.trim()).map_err(|_| {
            QuicklookError::config(format!("Environment variable {} not set", expr.trim()))
        }),
    }
}
