//! Line-oriented concept extraction from DAK CodeSystem FSH
//!
//! The parser is a best-effort reader: it never fails, and malformed input
//! yields an empty or partial concept list.
//!
//! ```fsh
//! * #VAR2 "Label"
//!   * ^definition = """
//!     Multi-line
//!     definition
//!   """
//!   * ^property[+].code = #"table"
//!   * ^property[=].valueString = "IMMZ.DT.1"
//! ```

use crate::concept::Concept;
use crate::tokenizer::{LineToken, quoted_strings, tokenize_line};
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, trace, warn};

/// Prefix of a top-level concept declaration (column 0)
pub const CONCEPT_MARKER: &str = "* #";

const TRIPLE_QUOTE: &str = "\"\"\"";

/// Caret assignments the parser understands on lines below a concept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaretTarget {
    Definition,
    /// `designation[..].<field>`; `fresh` is set for the `[+]` index
    Designation { field: DesignationField, fresh: bool },
    PropertyCode,
    PropertyValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DesignationField {
    Use,
    Language,
    Value,
}

fn caret_assignment(line: &str) -> Option<(CaretTarget, &str)> {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    let re = REGEX.get_or_init(|| {
        Regex::new(
            r"^\s*\*\s*\^(definition|designation\[([^\]]*)\]\.(value|use|language)|property\[[^\]]*\]\.code|property\[[^\]]*\]\.valueString)\s*=\s*(.*)$",
        )
        .expect("caret assignment regex is valid")
    });

    let caps = re.captures(line)?;
    let path = caps.get(1)?.as_str();
    let value = caps.get(4)?.as_str();
    let target = if path == "definition" {
        CaretTarget::Definition
    } else if let (Some(index), Some(field)) = (caps.get(2), caps.get(3)) {
        let field = match field.as_str() {
            "use" => DesignationField::Use,
            "language" => DesignationField::Language,
            _ => DesignationField::Value,
        };
        CaretTarget::Designation {
            field,
            fresh: index.as_str().trim() == "+",
        }
    } else if path.ends_with(".code") {
        CaretTarget::PropertyCode
    } else {
        CaretTarget::PropertyValue
    };
    Some((target, value))
}

/// Multi-line field being captured from a `"""` block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockField {
    Definition,
    Cql,
}

#[derive(Debug)]
struct BlockCapture {
    field: BlockField,
    lines: Vec<String>,
}

/// Property pairing state: a `code` line waits for its `valueString`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum PropertyState {
    #[default]
    Idle,
    SeekingValue(String),
}

/// What the designation being built carries
///
/// Only a designation whose `use` is `cql` feeds [`Concept::cql`]. A bare
/// `"""` value with neither `use` nor `language` is read as CQL too.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum DesignationState {
    #[default]
    Unspecified,
    Cql,
    Other,
}

/// Parser for the concept section of CodeSystem FSH documents
#[derive(Debug, Default)]
pub struct ConceptParser {
    concepts: Vec<Concept>,
    current: Option<usize>,
    capture: Option<BlockCapture>,
    property: PropertyState,
    designation: DesignationState,
}

impl ConceptParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse FSH source into concepts, in source order
    pub fn parse(mut self, source: &str) -> Vec<Concept> {
        let lines: Vec<&str> = source.lines().collect();
        let mut cursor = 0;

        while cursor < lines.len() {
            self.process_line(lines[cursor], cursor + 1);
            cursor += 1;
        }

        self.flush_capture();
        debug!(
            "Parsed {} concepts from {} lines",
            self.concepts.len(),
            lines.len()
        );
        self.concepts
    }

    fn process_line(&mut self, line: &str, line_number: usize) {
        if line.starts_with(CONCEPT_MARKER) {
            self.flush_capture();
            self.property = PropertyState::Idle;
            self.designation = DesignationState::Unspecified;
            self.start_concept(&line[CONCEPT_MARKER.len() - 1..], line_number);
            return;
        }

        if self.capture.is_some() {
            self.continue_capture(line);
            return;
        }

        let Some(index) = self.current else {
            if !line.trim().is_empty() {
                trace!("Line {}: outside any concept, discarded", line_number);
            }
            return;
        };

        let Some((target, value)) = caret_assignment(line) else {
            return;
        };

        match target {
            CaretTarget::Definition => self.assign_text(index, BlockField::Definition, value),
            CaretTarget::Designation { field, fresh } => {
                if fresh {
                    self.designation = DesignationState::Unspecified;
                }
                self.designation_line(index, field, value, line_number);
            }
            CaretTarget::PropertyCode => {
                let code = tokenize_line(value).into_iter().find_map(|token| match token {
                    LineToken::Code(code) => Some(code),
                    LineToken::Str(_) => None,
                });
                self.property = match code {
                    Some(code) => PropertyState::SeekingValue(code),
                    None => PropertyState::Idle,
                };
            }
            CaretTarget::PropertyValue => {
                let state = std::mem::take(&mut self.property);
                match state {
                    PropertyState::SeekingValue(code) => {
                        if let Some(text) = quoted_strings(value).into_iter().next() {
                            self.concepts[index].set_property(&code, text);
                        }
                    }
                    PropertyState::Idle => {
                        trace!("Line {}: valueString without property code", line_number);
                    }
                }
            }
        }
    }

    fn designation_line(
        &mut self,
        index: usize,
        field: DesignationField,
        value: &str,
        line_number: usize,
    ) {
        match field {
            DesignationField::Use => {
                let is_cql = tokenize_line(value)
                    .into_iter()
                    .next()
                    .is_some_and(|token| token.into_text().eq_ignore_ascii_case("cql"));
                self.designation = if is_cql {
                    DesignationState::Cql
                } else {
                    DesignationState::Other
                };
            }
            DesignationField::Language => {
                if self.designation == DesignationState::Unspecified {
                    self.designation = DesignationState::Other;
                }
            }
            DesignationField::Value => {
                let is_cql = match self.designation {
                    DesignationState::Cql => true,
                    DesignationState::Unspecified => value.trim_start().starts_with(TRIPLE_QUOTE),
                    DesignationState::Other => false,
                };
                if is_cql {
                    self.assign_text(index, BlockField::Cql, value);
                } else {
                    trace!("Line {}: non-CQL designation ignored", line_number);
                }
            }
        }
    }

    /// Handle the remainder of a concept line, starting at `#`
    fn start_concept(&mut self, rest: &str, line_number: usize) {
        let tokens: Vec<String> = tokenize_line(rest)
            .into_iter()
            .map(LineToken::into_text)
            .collect();

        if tokens.len() < 2 {
            trace!("Line {}: concept without display, skipped", line_number);
            self.current = None;
            return;
        }

        let mut tokens = tokens.into_iter();
        let code = tokens.next().unwrap_or_default();
        let display = tokens.next().unwrap_or_default();
        let mut concept = Concept::new(code, display);
        if let Some(definition) = tokens.next() {
            concept.definition = definition.trim().to_string();
        }

        if self.concepts.iter().any(|c| c.code == concept.code) {
            warn!(
                "Line {}: duplicate concept code '{}'",
                line_number, concept.code
            );
        }

        self.concepts.push(concept);
        self.current = Some(self.concepts.len() - 1);
    }

    /// Assign a definition or CQL value, opening a block capture for `"""`
    fn assign_text(&mut self, index: usize, field: BlockField, value: &str) {
        let value = value.trim_start();

        if let Some(body) = value.strip_prefix(TRIPLE_QUOTE) {
            if let Some(end) = body.find(TRIPLE_QUOTE) {
                self.set_field(index, field, body[..end].trim().to_string());
            } else {
                self.capture = Some(BlockCapture {
                    field,
                    lines: vec![body.to_string()],
                });
            }
            return;
        }

        if value.starts_with('"')
            && let Some(text) = quoted_strings(value).into_iter().next()
        {
            self.set_field(index, field, text);
        }
    }

    fn continue_capture(&mut self, line: &str) {
        let Some(capture) = self.capture.as_mut() else {
            return;
        };

        let trimmed = line.trim_end();
        if let Some(last) = trimmed.strip_suffix(TRIPLE_QUOTE) {
            capture.lines.push(last.to_string());
            self.flush_capture();
        } else {
            capture.lines.push(line.to_string());
        }
    }

    /// Move an open block capture into the current concept
    fn flush_capture(&mut self) {
        let Some(capture) = self.capture.take() else {
            return;
        };
        if let Some(index) = self.current {
            let text = capture.lines.join("\n").trim().to_string();
            self.set_field(index, capture.field, text);
        }
    }

    fn set_field(&mut self, index: usize, field: BlockField, text: String) {
        let concept = &mut self.concepts[index];
        match field {
            BlockField::Definition => concept.definition = text,
            BlockField::Cql => concept.cql = Some(text),
        }
    }
}

/// Parse FSH source into concepts
pub fn parse_concepts(source: &str) -> Vec<Concept> {
    ConceptParser::new().parse(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert!(parse_concepts("").is_empty());
    }

    #[test]
    fn test_simple_concepts_in_order() {
        let fsh = r#"CodeSystem: IMMZ.D2
* #C1 "First"
* #C2 "Second"
* #C3 "Third"
"#;
        let codes: Vec<String> = parse_concepts(fsh).into_iter().map(|c| c.code).collect();
        assert_eq!(codes, vec!["C1", "C2", "C3"]);
    }

    #[test]
    fn test_indented_marker_is_not_a_concept() {
        let fsh = "* #PARENT \"Parent\"\n  * #CHILD \"Child\"\n";
        let concepts = parse_concepts(fsh);
        assert_eq!(concepts.len(), 1);
        assert_eq!(concepts[0].code, "PARENT");
    }

    #[test]
    fn test_concept_without_display_is_skipped() {
        let fsh = "* #ONLYCODE\n* ^definition = \"orphan\"\n* #OK \"Fine\"\n";
        let concepts = parse_concepts(fsh);
        assert_eq!(concepts.len(), 1);
        assert_eq!(concepts[0].code, "OK");
        assert_eq!(concepts[0].definition, "");
    }

    #[test]
    fn test_content_before_first_concept_is_discarded() {
        let fsh = r#"* ^definition = "stray"
* ^property[+].code = #"table"
* ^property[=].valueString = "STRAY.DT"
* #A "Alpha"
"#;
        let concepts = parse_concepts(fsh);
        assert_eq!(concepts.len(), 1);
        assert_eq!(concepts[0].definition, "");
        assert_eq!(concepts[0].table_ref, None);
    }

    #[test]
    fn test_single_line_definition_is_unescaped() {
        let fsh = "* #A \"Alpha\"\n* ^definition = \"Says \\\"hello\\\"\"\n";
        let concepts = parse_concepts(fsh);
        assert_eq!(concepts[0].definition, "Says \"hello\"");
    }

    #[test]
    fn test_inline_definition_token() {
        let fsh = r#"* #A "Alpha" "The first letter""#;
        assert_eq!(parse_concepts(fsh)[0].definition, "The first letter");
    }

    #[test]
    fn test_block_open_and_close_on_same_line() {
        let fsh = "* #A \"Alpha\"\n* ^definition = \"\"\"Compact\"\"\"\n";
        assert_eq!(parse_concepts(fsh)[0].definition, "Compact");
    }

    #[test]
    fn test_capture_flushed_at_next_concept() {
        let fsh = "* #A \"Alpha\"\n* ^definition = \"\"\"Open\nstill open\n* #B \"Beta\"\n";
        let concepts = parse_concepts(fsh);
        assert_eq!(concepts.len(), 2);
        assert_eq!(concepts[0].definition, "Open\nstill open");
        assert_eq!(concepts[1].definition, "");
    }

    #[test]
    fn test_unterminated_block_runs_to_eof() {
        let fsh = "* #A \"Alpha\"\n* ^designation[+].value = \"\"\"define \"X\":\n  true\n";
        let concepts = parse_concepts(fsh);
        assert_eq!(concepts[0].cql.as_deref(), Some("define \"X\":\n  true"));
    }

    #[test]
    fn test_language_designation_is_not_cql() {
        let fsh = "* #DE1 \"Client age\"\n* ^designation[+].language = #fr\n* ^designation[=].value = \"Age du client\"\n";
        assert_eq!(parse_concepts(fsh)[0].cql, None);
    }

    #[test]
    fn test_cql_designation_after_language_designation() {
        let fsh = r#"* #DE1 "Client age"
* ^designation[+].language = #fr
* ^designation[=].value = """Age du client"""
* ^designation[+].use = #"cql"
* ^designation[=].value = "AgeInYears()"
"#;
        assert_eq!(parse_concepts(fsh)[0].cql.as_deref(), Some("AgeInYears()"));
    }

    #[test]
    fn test_designation_use_does_not_leak_into_next_concept() {
        let fsh = r#"* #A "Alpha"
* ^designation[+].use = #cql
* ^designation[=].value = "true"
* #B "Beta"
* ^designation[=].value = "plain label"
"#;
        let concepts = parse_concepts(fsh);
        assert_eq!(concepts[0].cql.as_deref(), Some("true"));
        assert_eq!(concepts[1].cql, None);
    }

    #[test]
    fn test_other_use_designation_is_ignored() {
        let fsh = "* #A \"Alpha\"\n* ^designation[+].use = #synonym\n* ^designation[=].value = \"\"\"Alt\"\"\"\n";
        assert_eq!(parse_concepts(fsh)[0].cql, None);
    }

    #[test]
    fn test_windows_line_endings() {
        let fsh = "* #A \"Alpha\"\r\n* ^definition = \"\"\"Line1\r\nLine2\"\"\"\r\n";
        assert_eq!(parse_concepts(fsh)[0].definition, "Line1\nLine2");
    }
}
