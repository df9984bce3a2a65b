//! Concept extraction tests against DAK-shaped CodeSystem files

use sgex_core::{Concept, parse_concepts};

const DECISION_VARIABLES: &str = r#"CodeSystem: IMMZ.D2.DT
Title: "IMMZ.D2 Decision Support Variables"
Description: "Variables used by the IMMZ.D2 decision tables"
* ^experimental = true
* ^caseSensitive = false

* #IMMZ.D2.DE1 "Client age"
* ^definition = """
    Age of the client in completed years
    at the time of the visit
"""
* ^property[+].code = #"table"
* ^property[=].valueString = "IMMZ.D2.DT.BCG"
* ^property[+].code = #"tab"
* ^property[=].valueString = "Eligibility"
* ^designation[+].use = #"cql"
* ^designation[=].value = """
define "Client age":
  AgeInYears()
"""

* #IMMZ.D2.DE2 "Live vaccine given in the last 4 weeks"
* ^definition = "Whether a live vaccine was given in the last 4 weeks"
* ^property[+].code = #"table"
* ^property[=].valueString = "IMMZ.D2.DT.MR"

* #IMMZ.D2.DE3 "HIV status \"unknown\""
"#;

fn codes(concepts: &[Concept]) -> Vec<&str> {
    concepts.iter().map(|c| c.code.as_str()).collect()
}

#[test]
fn test_decision_variables_fixture() {
    let concepts = parse_concepts(DECISION_VARIABLES);
    assert_eq!(
        codes(&concepts),
        vec!["IMMZ.D2.DE1", "IMMZ.D2.DE2", "IMMZ.D2.DE3"]
    );

    let age = &concepts[0];
    assert_eq!(age.display, "Client age");
    assert_eq!(
        age.definition,
        "Age of the client in completed years\n    at the time of the visit"
    );
    assert_eq!(age.table_ref.as_deref(), Some("IMMZ.D2.DT.BCG"));
    assert_eq!(age.tab_ref.as_deref(), Some("Eligibility"));
    assert_eq!(age.cql.as_deref(), Some("define \"Client age\":\n  AgeInYears()"));

    let live = &concepts[1];
    assert_eq!(
        live.definition,
        "Whether a live vaccine was given in the last 4 weeks"
    );
    assert_eq!(live.table_ref.as_deref(), Some("IMMZ.D2.DT.MR"));
    assert_eq!(live.tab_ref, None);
    assert_eq!(live.cql, None);

    assert_eq!(concepts[2].display, "HIV status \"unknown\"");
}

#[test]
fn test_order_preserved_with_interleaved_content() {
    let fsh = r#"* #C1 "One"
* ^definition = """Block
* not a concept, indented marker below
  * #NESTED "ignored"
"""
* #C2 "Two"
* ^property[+].code = #"tab"
* ^property[=].valueString = "Main"
* #C3 "Three"
"#;
    let concepts = parse_concepts(fsh);
    assert_eq!(codes(&concepts), vec!["C1", "C2", "C3"]);
    assert_eq!(
        concepts[0].definition,
        "Block\n* not a concept, indented marker below\n  * #NESTED \"ignored\""
    );
}

#[test]
fn test_multiline_definition_capture() {
    let fsh = "* #VAR1 \"Label\"\n* ^definition = \"\"\"Line1\nLine2\"\"\"\n";
    let concepts = parse_concepts(fsh);
    assert_eq!(concepts[0].definition, "Line1\nLine2");
}

#[test]
fn test_escaped_quote_display() {
    let concepts = parse_concepts(r#"* #VAR1 "Has \"quoted\" text""#);
    assert_eq!(concepts.len(), 1);
    assert_eq!(concepts[0].code, "VAR1");
    assert_eq!(concepts[0].display, r#"Has "quoted" text"#);
}

#[test]
fn test_table_pairing() {
    let fsh = r#"* #VAR2 "Label"
* ^property[+].code = #"table"
* ^property[=].valueString = "IMMZ.DT.1"
"#;
    let concepts = parse_concepts(fsh);
    assert_eq!(concepts[0].code, "VAR2");
    assert_eq!(concepts[0].table_ref.as_deref(), Some("IMMZ.DT.1"));
}

#[test]
fn test_missing_value_string_does_not_leak_into_next_property() {
    let fsh = r#"* #VAR3 "Label"
* ^property[+].code = #"table"
* ^property[+].code = #"tab"
* ^property[=].valueString = "Overview"
* #VAR4 "Other"
* ^property[=].valueString = "ORPHAN.DT"
"#;
    let concepts = parse_concepts(fsh);
    assert_eq!(concepts[0].table_ref, None);
    assert_eq!(concepts[0].tab_ref.as_deref(), Some("Overview"));
    assert_eq!(concepts[1].table_ref, None);
    assert!(concepts[1].properties.is_empty());
}

#[test]
fn test_three_properties_in_any_order() {
    let fsh = r#"* #VAR5 "Label"
* ^property[+].code = #"tab"
* ^property[=].valueString = "Dosing"
* ^property[+].code = #unit
* ^property[=].valueString = "mg"
* ^property[+].code = #"table"
* ^property[=].valueString = "IMMZ.DT.9"
"#;
    let concept = &parse_concepts(fsh)[0];
    assert_eq!(concept.tab_ref.as_deref(), Some("Dosing"));
    assert_eq!(concept.table_ref.as_deref(), Some("IMMZ.DT.9"));
    assert_eq!(
        concept.properties.get("unit").map(String::as_str),
        Some("mg")
    );
}

#[test]
fn test_quoted_code_with_spaces() {
    let concepts = parse_concepts(r#"* #"Has space" "Display""#);
    assert_eq!(concepts[0].code, "Has space");
}

#[test]
fn test_empty_and_whitespace_input() {
    assert!(parse_concepts("").is_empty());
    assert!(parse_concepts("\n\n   \n").is_empty());
    assert!(parse_concepts("CodeSystem: Empty\nTitle: \"Nothing\"\n").is_empty());
}

#[test]
fn test_translated_designations_leave_cql_alone() {
    let fsh = r#"* #IMMZ.D2.DE1 "Client age"
* ^designation[+].language = #fr
* ^designation[=].value = "Age du client"
* ^designation[+].language = #es
* ^designation[=].value = """Edad del cliente"""
* #IMMZ.D2.DE4 "Dose number"
* ^designation[+].language = #fr
* ^designation[=].value = "Numéro de dose"
* ^designation[+].use = #"cql"
* ^designation[=].value = "DoseNumber"
"#;
    let concepts = parse_concepts(fsh);
    assert_eq!(concepts[0].cql, None);
    assert_eq!(concepts[0].display, "Client age");
    assert_eq!(concepts[1].cql.as_deref(), Some("DoseNumber"));
}
