//! FSH string literal escaping shared by the concept parser and the
//! requirement generator.

use crate::{Result, SgexError};
use serde::{Deserialize, Serialize};

/// How free text containing line breaks is rendered into a quoted assignment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NewlinePolicy {
    /// Emit `\n`, `\r` and `\t` escape sequences inside a single-line string
    #[default]
    Escape,
    /// Emit multi-line text as a `"""` block
    TripleQuote,
    /// Refuse multi-line text in single-line fields
    Reject,
}

/// Escape special characters in FSH strings
pub fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// Inverse of [`escape_string`]
///
/// Unknown escape sequences are kept verbatim, backslash included.
pub fn unescape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}

/// Render free text as an FSH string literal, quotes included
pub fn quote_text(value: &str, policy: NewlinePolicy) -> Result<String> {
    let multiline = value.contains('\n') || value.contains('\r');

    match policy {
        NewlinePolicy::TripleQuote if multiline && !value.contains("\"\"\"") => {
            Ok(format!("\"\"\"{}\"\"\"", value))
        }
        NewlinePolicy::Reject if multiline => Err(SgexError::invalid_argument(format!(
            "line breaks are not allowed in single-line values: {:?}",
            value
        ))),
        _ => Ok(format!("\"{}\"", escape_string(value))),
    }
}

/// Render a code value as an FSH code token (`#code`)
///
/// A leading `#` in the input is accepted. Codes containing whitespace or
/// quotes use the quoted form `#"my code"`.
pub fn format_code(code: &str) -> String {
    let code = code.trim().trim_start_matches('#');
    if code.chars().any(|c| c.is_whitespace() || c == '"') {
        format!("#\"{}\"", escape_string(code))
    } else {
        format!("#{}", code)
    }
}
