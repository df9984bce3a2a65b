//! Quote-aware token scanning for single FSH lines
//!
//! Splitting on `"` breaks as soon as a display string contains an escaped
//! quote, so lines are scanned character by character instead, tracking
//! whether the cursor is inside a string literal.

/// A token recognised on an FSH line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineToken {
    /// `#code` or `#"quoted code"`, without the leading `#`
    Code(String),
    /// `"..."` or `"""..."""`, escapes decoded for the single-quoted form
    Str(String),
}

impl LineToken {
    pub fn into_text(self) -> String {
        match self {
            LineToken::Code(text) | LineToken::Str(text) => text,
        }
    }
}

/// Scan a line into code and string tokens
///
/// Bare words that are neither codes nor strings (keywords, `=`, paths) are
/// skipped. An unterminated string runs to the end of the line.
pub fn tokenize_line(line: &str) -> Vec<LineToken> {
    let chars: Vec<char> = line.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            c if c.is_whitespace() => i += 1,
            '#' => {
                i += 1;
                if chars.get(i) == Some(&'"') {
                    let (text, next) = scan_string(&chars, i);
                    tokens.push(LineToken::Code(text));
                    i = next;
                } else {
                    let start = i;
                    while i < chars.len() && !chars[i].is_whitespace() && chars[i] != '"' {
                        i += 1;
                    }
                    let code: String = chars[start..i].iter().collect();
                    if !code.is_empty() {
                        tokens.push(LineToken::Code(code));
                    }
                }
            }
            '"' => {
                let (text, next) = scan_string(&chars, i);
                tokens.push(LineToken::Str(text));
                i = next;
            }
            _ => {
                while i < chars.len() && !chars[i].is_whitespace() && chars[i] != '"' {
                    i += 1;
                }
            }
        }
    }

    tokens
}

/// Extract only the string literals of a line, in order
pub fn quoted_strings(line: &str) -> Vec<String> {
    tokenize_line(line)
        .into_iter()
        .filter_map(|token| match token {
            LineToken::Str(text) => Some(text),
            LineToken::Code(_) => None,
        })
        .collect()
}

/// Scan a string literal starting at the opening quote at `start`.
/// Returns the decoded text and the index just past the closing quote.
fn scan_string(chars: &[char], start: usize) -> (String, usize) {
    let len = chars.len();

    // Triple-quoted string """..."""
    if start + 2 < len && chars[start + 1] == '"' && chars[start + 2] == '"' {
        let mut i = start + 3;
        let body_start = i;
        while i < len {
            if i + 2 < len && chars[i] == '"' && chars[i + 1] == '"' && chars[i + 2] == '"' {
                return (chars[body_start..i].iter().collect(), i + 3);
            }
            i += 1;
        }
        return (chars[body_start..].iter().collect(), len);
    }

    let mut text = String::new();
    let mut i = start + 1;
    while i < len {
        match chars[i] {
            '"' => return (text, i + 1),
            '\\' => {
                match chars.get(i + 1) {
                    Some('"') => text.push('"'),
                    Some('\\') => text.push('\\'),
                    Some('n') => text.push('\n'),
                    Some('r') => text.push('\r'),
                    Some('t') => text.push('\t'),
                    Some(other) => {
                        text.push('\\');
                        text.push(*other);
                    }
                    None => text.push('\\'),
                }
                i += 2;
            }
            c => {
                text.push(c);
                i += 1;
            }
        }
    }

    (text, len)
}
