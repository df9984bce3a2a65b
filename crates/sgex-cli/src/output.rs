//! Output formatting for concept listings

use colored::*;
use serde_json::json;
use sgex_core::{Concept, FileConcepts, Result};

use crate::OutputFormat;

/// Output formatter for different formats
pub struct OutputFormatter {
    format: OutputFormat,
    use_colors: bool,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, use_colors: bool) -> Self {
        Self { format, use_colors }
    }

    /// Print the concepts of one file
    pub fn print_concepts(&self, path: &str, concepts: &[&Concept]) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                println!("{}", self.heading(path));
                self.print_concept_rows(concepts);
                println!("\n  {} concepts", concepts.len());
                Ok(())
            }
            OutputFormat::Json => {
                let result = json!({
                    "path": path,
                    "concepts": concepts,
                });
                println!("{}", serde_json::to_string_pretty(&result)?);
                Ok(())
            }
        }
    }

    /// Print concepts of every scanned file
    pub fn print_scan(&self, results: &[FileConcepts]) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                for file in results {
                    println!("{}", self.heading(&file.path.display().to_string()));
                    let concepts: Vec<&Concept> = file.concepts.iter().collect();
                    self.print_concept_rows(&concepts);
                }
                let total: usize = results.iter().map(|f| f.concepts.len()).sum();
                println!("\n{}", "Summary:".bold());
                println!("  Files scanned: {}", results.len());
                println!("  Concepts found: {}", total);
                Ok(())
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(results)?);
                Ok(())
            }
        }
    }

    fn heading(&self, text: &str) -> String {
        if self.use_colors {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn print_concept_rows(&self, concepts: &[&Concept]) {
        for concept in concepts {
            let code = if self.use_colors {
                concept.code.cyan().to_string()
            } else {
                concept.code.clone()
            };
            let mut row = format!("  {}  {}", code, concept.display);
            if let Some(table) = &concept.table_ref {
                row.push_str(&format!("  [table: {}]", table));
            }
            if let Some(tab) = &concept.tab_ref {
                row.push_str(&format!("  [tab: {}]", tab));
            }
            if concept.cql.is_some() {
                row.push_str("  [cql]");
            }
            println!("{}", row);
        }
    }
}
