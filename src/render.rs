// =============================================================================
// Tabular rendering
// =============================================================================
//
// Renderers take the column headings and flat display records of a snapshot;
// nothing upstream depends on how they present them.
// =============================================================================

use std::io::Write;

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use crate::dashboard::{DashboardSnapshot, SkippedSymbol};
use crate::types::{DisplayRecord, DISPLAY_COLUMNS};

pub trait TableRenderer {
    fn render(
        &mut self,
        columns: &[&str],
        records: &[DisplayRecord],
        skipped: &[SkippedSymbol],
    ) -> Result<()>;
}

/// Render a full snapshot through `renderer`.
pub fn render_snapshot(renderer: &mut dyn TableRenderer, snapshot: &DashboardSnapshot) -> Result<()> {
    let records: Vec<DisplayRecord> = snapshot.rows.iter().map(|r| r.to_display()).collect();
    renderer.render(&DISPLAY_COLUMNS, &records, &snapshot.skipped)
}

// =============================================================================
// Plain-text table
// =============================================================================

/// Space-aligned columns with a header rule, followed by one line per
/// skipped symbol.
pub struct TextTableRenderer<W: Write> {
    out: W,
}

impl<W: Write> TextTableRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn display_width(s: &str) -> usize {
    s.chars().count()
}

impl<W: Write> TableRenderer for TextTableRenderer<W> {
    fn render(
        &mut self,
        columns: &[&str],
        records: &[DisplayRecord],
        skipped: &[SkippedSymbol],
    ) -> Result<()> {
        let mut widths: Vec<usize> = columns.iter().map(|c| display_width(c)).collect();
        for record in records {
            for (i, column) in columns.iter().enumerate() {
                let cell = record.get(column).unwrap_or("");
                widths[i] = widths[i].max(display_width(cell));
            }
        }

        let line = |cells: Vec<&str>| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| {
                    let pad = width.saturating_sub(display_width(cell));
                    format!("{cell}{}", " ".repeat(pad))
                })
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        writeln!(self.out, "{}", line(columns.to_vec())).context("failed to write table header")?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(self.out, "{}", line(rule.iter().map(String::as_str).collect()))
            .context("failed to write table rule")?;

        for record in records {
            let cells: Vec<&str> = columns
                .iter()
                .map(|c| record.get(c).unwrap_or(""))
                .collect();
            writeln!(self.out, "{}", line(cells)).context("failed to write table row")?;
        }

        if !skipped.is_empty() {
            writeln!(self.out).context("failed to write table footer")?;
            for s in skipped {
                writeln!(self.out, "skipped {}: {}", s.symbol, s.reason)
                    .context("failed to write table footer")?;
            }
        }

        self.out.flush().context("failed to flush table output")?;
        Ok(())
    }
}

// =============================================================================
// JSON
// =============================================================================

/// `{ "rows": [ { column: value, ... } ], "skipped": [...] }`, pretty-printed.
pub struct JsonRenderer<W: Write> {
    out: W,
}

impl<W: Write> JsonRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TableRenderer for JsonRenderer<W> {
    fn render(
        &mut self,
        columns: &[&str],
        records: &[DisplayRecord],
        skipped: &[SkippedSymbol],
    ) -> Result<()> {
        let rows: Vec<Value> = records
            .iter()
            .map(|record| {
                let object: Map<String, Value> = columns
                    .iter()
                    .map(|c| {
                        let value = record.get(c).map_or(Value::Null, |v| Value::String(v.to_string()));
                        (c.to_string(), value)
                    })
                    .collect();
                Value::Object(object)
            })
            .collect();

        let body = serde_json::json!({ "rows": rows, "skipped": skipped });
        serde_json::to_writer_pretty(&mut self.out, &body).context("failed to write JSON output")?;
        writeln!(self.out).context("failed to write JSON output")?;
        self.out.flush().context("failed to flush JSON output")?;
        Ok(())
    }
}
