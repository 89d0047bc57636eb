//! Session reports in Markdown, CSV and JSON.
//!
//! Rendering reads only the session and its long-term memory, so the same
//! inputs always produce the same bytes.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use medi_core::entities::{MemoryEntry, Session};
use medi_core::enums::{ReportFormat, ResponseSource};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::AssistantError;

const CSV_HEADER: &[&str] = &[
    "entry_id",
    "query_id",
    "query_type",
    "query_text",
    "response_text",
    "confidence",
    "source",
    "stored_at",
];

/// A rendered report, ready to print or write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub format: ReportFormat,
    pub file_name: String,
    pub content: String,
}

impl Report {
    /// Write the report into `dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    pub fn write_to(&self, dir: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.content)?;
        Ok(path)
    }
}

/// Aggregate figures over a session's memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReportSummary {
    pub entry_count: usize,
    pub average_confidence: f64,
    pub live_count: usize,
    pub mock_count: usize,
    /// Entry count per query type, keyed by its snake_case name.
    pub by_query_type: BTreeMap<String, usize>,
}

impl ReportSummary {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_entries(entries: &[MemoryEntry]) -> Self {
        let mut by_query_type = BTreeMap::new();
        let mut live_count = 0;
        let mut total_confidence = 0.0;
        for entry in entries {
            *by_query_type
                .entry(entry.query_type.as_str().to_string())
                .or_insert(0) += 1;
            if entry.source == ResponseSource::Live {
                live_count += 1;
            }
            total_confidence += entry.confidence;
        }
        let average_confidence = if entries.is_empty() {
            0.0
        } else {
            total_confidence / entries.len() as f64
        };
        Self {
            entry_count: entries.len(),
            average_confidence,
            live_count,
            mock_count: entries.len() - live_count,
            by_query_type,
        }
    }
}

/// The JSON report document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SessionReport {
    pub session: Session,
    pub summary: ReportSummary,
    pub entries: Vec<MemoryEntry>,
}

#[derive(Debug, Clone)]
pub struct ReportGenerator {
    title: String,
}

impl ReportGenerator {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    /// Render a session's memory in the requested format.
    ///
    /// # Errors
    ///
    /// Returns `AssistantError::NotFound` when there are no entries, or
    /// `AssistantError::Serialization` if JSON encoding fails.
    pub fn render(
        &self,
        session: &Session,
        entries: &[MemoryEntry],
        format: ReportFormat,
    ) -> Result<Report, AssistantError> {
        if entries.is_empty() {
            return Err(AssistantError::NotFound {
                entity: "memory entries for session",
                id: session.id.clone(),
            });
        }
        let content = match format {
            ReportFormat::Markdown => self.markdown(session, entries),
            ReportFormat::Csv => csv(entries),
            ReportFormat::Json => {
                let doc = SessionReport {
                    session: session.clone(),
                    summary: ReportSummary::from_entries(entries),
                    entries: entries.to_vec(),
                };
                serde_json::to_string_pretty(&doc)?
            }
        };
        Ok(Report {
            format,
            file_name: format!("{}_report.{}", session.id, format.extension()),
            content,
        })
    }

    fn markdown(&self, session: &Session, entries: &[MemoryEntry]) -> String {
        let summary = ReportSummary::from_entries(entries);
        let mut out = String::new();

        let _ = writeln!(out, "# {}: Research Session Summary\n", self.title);
        let _ = writeln!(out, "**Session ID:** {}  ", session.id);
        let _ = writeln!(out, "**Researcher:** {}  ", session.researcher_id);
        let _ = writeln!(out, "**Project:** {}  ", session.project_id);
        let _ = writeln!(out, "**Disease Focus:** {}  ", session.disease_focus);
        let _ = writeln!(out, "**Started:** {}\n", session.created_at.to_rfc3339());

        let breakdown = summary
            .by_query_type
            .iter()
            .map(|(kind, count)| format!("{count} {}", kind.replace('_', " ")))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(out, "## Executive Summary\n");
        let _ = writeln!(
            out,
            "This research session focused on {} with {} approved responses. \
             Query breakdown: {breakdown}. \
             Average confidence score across responses: {:.1}%. \
             Sources: {} live, {} mock.\n",
            session.disease_focus,
            summary.entry_count,
            summary.average_confidence * 100.0,
            summary.live_count,
            summary.mock_count,
        );

        let _ = writeln!(out, "## Query Type Distribution\n");
        let _ = writeln!(out, "| Query type | Responses |");
        let _ = writeln!(out, "|------------|-----------|");
        for (kind, count) in &summary.by_query_type {
            let _ = writeln!(out, "| {} | {count} |", kind.replace('_', " "));
        }
        out.push('\n');

        let _ = writeln!(out, "## Entries\n");
        for (i, entry) in entries.iter().enumerate() {
            let _ = writeln!(out, "### {}. {}\n", i + 1, entry.query_type.as_str().replace('_', " "));
            let _ = writeln!(out, "**Query:** {}  ", entry.query_text);
            let _ = writeln!(
                out,
                "**Confidence:** {:.1}% ({})  ",
                entry.confidence * 100.0,
                entry.source
            );
            let _ = writeln!(out, "**Stored:** {}\n", entry.stored_at.to_rfc3339());
            let _ = writeln!(out, "{}\n", entry.response_text.trim_end());
        }
        out
    }
}

fn csv(entries: &[MemoryEntry]) -> String {
    let mut out = CSV_HEADER.join(",");
    out.push('\n');
    for entry in entries {
        let row = [
            entry.id.clone(),
            entry.query_id.clone(),
            entry.query_type.as_str().to_string(),
            entry.query_text.clone(),
            entry.response_text.clone(),
            entry.confidence.to_string(),
            entry.source.as_str().to_string(),
            entry.stored_at.to_rfc3339(),
        ];
        let line = row
            .iter()
            .map(|field| csv_field(field))
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Quote a field if it contains a delimiter, quote or line break.
fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
