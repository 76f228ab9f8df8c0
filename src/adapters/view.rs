//! Terminal rendering of the listing and the savings widget.

use std::fmt;

use chrono::Local;

use crate::domain::{
    filters::{FilterField, FilterState},
    models::{file::FileRecord, savings::StorageSavings},
};

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListView {
    Loading,
    Error(String),
    Empty,
    Populated(Vec<FileRecord>),
}

impl ListView {
    pub fn is_error(&self) -> bool {
        matches!(self, ListView::Error(_))
    }
}

impl fmt::Display for ListView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListView::Loading => writeln!(f, "Loading files..."),
            ListView::Error(_) => writeln!(f, "Failed to load files."),
            ListView::Empty => writeln!(f, "No files"),
            ListView::Populated(files) => {
                writeln!(f, "Uploaded Files")?;
                for file in files {
                    write_row(f, file)?;
                }
                Ok(())
            }
        }
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, file: &FileRecord) -> fmt::Result {
    writeln!(f, "- {}  [{}]", file.original_filename, file.id)?;
    writeln!(
        f,
        "    {} \u{2022} {:.2} KB",
        file.file_type,
        file.size as f64 / 1024.0
    )?;
    writeln!(
        f,
        "    Uploaded {}",
        file.uploaded_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
    )
}

/// Human readable byte count, two decimals, 1024-based.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, SIZE_UNITS[unit])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavingsView {
    Loading,
    Loaded(StorageSavings),
}

impl fmt::Display for SavingsView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Storage Savings")?;
        match self {
            SavingsView::Loading => writeln!(f, "  Loading..."),
            SavingsView::Loaded(savings) => {
                writeln!(f, "  Saved:   {}", format_bytes(savings.total_savings))?;
                writeln!(
                    f,
                    "  Deduped: {}",
                    group_thousands(savings.total_deduplicated_files)
                )
            }
        }
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// One line per filter field, `-` for unset.
pub fn render_filters(filters: &FilterState) -> String {
    FilterField::ALL
        .iter()
        .map(|field| {
            let value = filters.get(*field);
            let shown = if value.is_empty() { "-" } else { value };
            let unit = if field.is_size() && !value.is_empty() {
                " KB"
            } else {
                ""
            };
            format!("  {:<12}{}{}\n", field.key(), shown, unit)
        })
        .collect()
}
