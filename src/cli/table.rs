//! Table formatting utilities for CLI list commands
//!
//! One formatter renders employee and qualification lists in every list
//! format (aligned text, CSV, Markdown, bare ids) and appends the paging
//! footer for the interactive formats.

use console::{measure_text_width, pad_str, style, Alignment};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{escape_csv, truncate_str};
use crate::cli::OutputFormat;
use crate::core::query::{highlight_matches, QueryView, Searchable};

/// A typed cell value with semantic meaning for formatting
#[derive(Debug, Clone)]
pub enum CellValue {
    /// Backend id (cyan)
    Id(i64),
    /// Plain text, truncated to the column
    Text(String),
    /// Text with every occurrence of the search term emphasized
    Highlighted { text: String, term: String },
    /// Names joined with ", " (e.g. skills)
    List(Vec<String>),
    /// Right-aligned count
    Count(usize),
    /// Empty/placeholder
    Empty,
}

impl CellValue {
    /// Highlighted text when a search term is active, plain text otherwise
    pub fn searched(text: impl Into<String>, term: &str) -> Self {
        let text = text.into();
        if term.trim().is_empty() {
            CellValue::Text(text)
        } else {
            CellValue::Highlighted {
                text,
                term: term.trim().to_string(),
            }
        }
    }

    /// Format for aligned terminal output (with colors if terminal)
    pub fn format_tsv(&self, width: usize) -> String {
        match self {
            CellValue::Id(id) => format!("{:<width$}", style(id).cyan(), width = width),
            CellValue::Text(s) => pad(&truncate_str(s, width.saturating_sub(2)), width),
            CellValue::Highlighted { text, term } => {
                let truncated = truncate_str(text, width.saturating_sub(2));
                let marked = highlight_matches(&truncated, term, |m| style(m).yellow().bold().to_string());
                pad(&marked, width)
            }
            CellValue::List(items) => pad(&truncate_str(&items.join(", "), width.saturating_sub(2)), width),
            CellValue::Count(n) => format!("{:>width$}", n, width = width),
            CellValue::Empty => pad(&style("-").dim().to_string(), width),
        }
    }

    /// Format for CSV output (RFC 4180, no colors)
    pub fn format_csv(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            other => escape_csv(&other.raw()),
        }
    }

    /// Format for Markdown output (no colors, escaped pipes)
    pub fn format_md(&self) -> String {
        let raw = match self {
            CellValue::Empty => "-".to_string(),
            other => other.raw(),
        };
        raw.replace('|', "\\|")
    }

    /// Get raw string value (no formatting)
    pub fn raw(&self) -> String {
        match self {
            CellValue::Id(id) => id.to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Highlighted { text, .. } => text.clone(),
            CellValue::List(items) => items.join(", "),
            CellValue::Count(n) => n.to_string(),
            CellValue::Empty => String::new(),
        }
    }

    /// Get the display width of this cell's content (for dynamic column sizing)
    pub fn display_width(&self) -> usize {
        match self {
            CellValue::Empty => 1,
            other => other.raw().chars().count(),
        }
    }
}

/// Left-pad by visible width so ANSI styling does not skew columns
fn pad(s: &str, width: usize) -> String {
    if measure_text_width(s) >= width {
        s.to_string()
    } else {
        pad_str(s, width, Alignment::Left, None).into_owned()
    }
}

/// Column definition with header label and maximum width
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub key: &'static str,
    pub header: &'static str,
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str, width: usize) -> Self {
        Self { key, header, width }
    }
}

/// A row of cell values for table output
pub struct TableRow {
    pub id: Option<i64>,
    pub cells: Vec<(&'static str, CellValue)>,
}

impl TableRow {
    pub fn new(id: Option<i64>) -> Self {
        Self { id, cells: Vec::new() }
    }

    pub fn cell(mut self, key: &'static str, value: CellValue) -> Self {
        self.cells.push((key, value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

/// Position of the printed page within the filtered list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInfo {
    pub start: usize,
    pub end: usize,
    pub total: usize,
    pub current: usize,
    pub total_pages: usize,
    pub pages: Vec<usize>,
}

impl PageInfo {
    pub fn from_view<T: Searchable + Clone>(view: &QueryView<T>) -> Self {
        Self {
            start: view.start_item(),
            end: view.end_item(),
            total: view.total_items(),
            current: view.current_page(),
            total_pages: view.total_pages(),
            pages: view.page_numbers(),
        }
    }

    /// "Showing 21-23 of 23 employees"
    pub fn summary(&self, noun: &str) -> String {
        if self.total == 0 {
            format!("No {noun} found")
        } else {
            format!("Showing {}-{} of {} {}", self.start, self.end, self.total, noun)
        }
    }

    /// Page picker, e.g. `< 2 3 [4] 5 6 >`; arrows mark hidden pages
    pub fn picker(&self) -> String {
        let mut parts = Vec::with_capacity(self.pages.len() + 2);
        if self.pages.first().is_some_and(|&p| p > 1) {
            parts.push("<".to_string());
        }
        for &page in &self.pages {
            if page == self.current {
                parts.push(format!("[{page}]"));
            } else {
                parts.push(page.to_string());
            }
        }
        if self.pages.last().is_some_and(|&p| p < self.total_pages) {
            parts.push(">".to_string());
        }
        parts.join(" ")
    }
}

/// Table formatter that outputs rows in various formats
pub struct TableFormatter<'a> {
    columns: &'a [ColumnDef],
    noun: &'static str,
    page: Option<PageInfo>,
}

impl<'a> TableFormatter<'a> {
    /// `noun` is the plural used in the footer ("employees")
    pub fn new(columns: &'a [ColumnDef], noun: &'static str) -> Self {
        Self {
            columns,
            noun,
            page: None,
        }
    }

    /// Append a paging footer to aligned output
    pub fn with_page(mut self, page: PageInfo) -> Self {
        self.page = Some(page);
        self
    }

    /// Output rows in the specified format
    pub fn output(&self, rows: &[TableRow], format: OutputFormat) {
        match format {
            OutputFormat::Csv => self.output_csv(rows),
            OutputFormat::Md => self.output_md(rows),
            OutputFormat::Id => self.output_ids(rows),
            _ => self.output_tsv(rows),
        }
    }

    /// Calculate dynamic column widths based on actual content
    fn calculate_widths(&self, rows: &[TableRow]) -> Vec<usize> {
        self.columns
            .iter()
            .map(|col| {
                let content = rows
                    .iter()
                    .filter_map(|r| r.get(col.key))
                    .map(CellValue::display_width)
                    .max()
                    .unwrap_or(0);
                col.header.len().max(content + 2).min(col.width)
            })
            .collect()
    }

    fn output_tsv(&self, rows: &[TableRow]) {
        let widths = self.calculate_widths(rows);

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(col, &w)| format!("{:<w$}", style(col.header).bold(), w = w))
            .collect();
        println!("{}", header.join(" "));

        let total_width: usize = widths.iter().sum::<usize>() + widths.len().saturating_sub(1);
        println!("{}", "-".repeat(total_width));

        for row in rows {
            let parts: Vec<String> = self
                .columns
                .iter()
                .zip(&widths)
                .map(|(col, &w)| match row.get(col.key) {
                    Some(value) => value.format_tsv(w),
                    None => CellValue::Empty.format_tsv(w),
                })
                .collect();
            println!("{}", parts.join(" ").trim_end());
        }

        if let Some(page) = &self.page {
            println!();
            println!("{}", style(page.summary(self.noun)).dim());
            if page.total_pages > 1 {
                println!("{} {}", style("Page").dim(), page.picker());
            }
        }
    }

    fn output_csv(&self, rows: &[TableRow]) {
        let headers: Vec<&str> = self.columns.iter().map(|c| c.key).collect();
        println!("{}", headers.join(","));

        for row in rows {
            let values: Vec<String> = self
                .columns
                .iter()
                .map(|col| row.get(col.key).map(CellValue::format_csv).unwrap_or_default())
                .collect();
            println!("{}", values.join(","));
        }
    }

    fn output_md(&self, rows: &[TableRow]) {
        let mut builder = Builder::default();
        builder.push_record(self.columns.iter().map(|c| c.header.to_string()));
        for row in rows {
            builder.push_record(self.columns.iter().map(|col| {
                row.get(col.key)
                    .map(CellValue::format_md)
                    .unwrap_or_else(|| "-".to_string())
            }));
        }
        println!("{}", builder.build().with(Style::markdown()));
    }

    fn output_ids(&self, rows: &[TableRow]) {
        for id in rows.iter().filter_map(|r| r.id) {
            println!("{id}");
        }
    }
}
