//! Final report: pending students ordered by identifier.

use std::collections::BTreeMap;
use std::io::{self, Write};

/// One student without a final-project submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub identifier: String,
    pub name: String,
}

/// Report entries in ascending identifier order, plus the total.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportSet {
    entries: Vec<ReportEntry>,
}

impl ReportSet {
    /// Build the report from the aggregator's identifier to name mapping.
    pub fn from_mapping(mapping: &BTreeMap<String, String>) -> Self {
        // BTreeMap iterates in key order, which is lexicographic for String.
        let entries = mapping
            .iter()
            .map(|(identifier, name)| ReportEntry {
                identifier: identifier.clone(),
                name: name.clone(),
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn total(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the plain-text report: `identifier name` lines, then the total.
    pub fn render<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for entry in &self.entries {
            writeln!(out, "{} {}", entry.identifier, entry.name)?;
        }
        writeln!(out, "{}", self.summary_line())
    }

    pub fn summary_line(&self) -> String {
        format!("Total: {} students", self.total())
    }
}
