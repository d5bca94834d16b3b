// src/process/mod.rs
use csv::ReaderBuilder;
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub mod trimming;

use trimming::clean_row;

/// One CSV data row: trimmed header → trimmed cell. Every value stays a string.
pub type RawRow = BTreeMap<String, String>;

/// A structural problem in the CSV that did not stop parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// 0-based index of the data record (header excluded).
    pub record: usize,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ParsedCsv {
    pub rows: Vec<RawRow>,
    pub warnings: Vec<ParseWarning>,
}

/// Parse a header-row CSV body into cleaned rows, in document order.
///
/// - blank lines are skipped
/// - short records keep only the columns they have; extra fields are ignored
/// - unreadable records are skipped
///
/// All of the above are reported as warnings and logged, never returned as errors.
pub fn parse_csv(text: &str) -> ParsedCsv {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut out = ParsedCsv::default();

    let headers: Vec<String> = match rdr.headers() {
        Ok(h) => h.iter().map(str::to_string).collect(),
        Err(e) => {
            warn!(error = %e, "CSV header row unreadable");
            out.warnings.push(ParseWarning {
                record: 0,
                message: format!("unreadable header row: {}", e),
            });
            return out;
        }
    };

    for (idx, result) in rdr.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                out.warnings.push(ParseWarning {
                    record: idx,
                    message: format!("unreadable record: {}", e),
                });
                continue;
            }
        };

        if record.len() != headers.len() {
            out.warnings.push(ParseWarning {
                record: idx,
                message: format!(
                    "expected {} fields, found {}",
                    headers.len(),
                    record.len()
                ),
            });
        }

        // zip stops at the shorter side: missing cells are absent, extras dropped
        let row = clean_row(
            headers
                .iter()
                .map(String::as_str)
                .zip(record.iter()),
        );
        out.rows.push(row);
    }

    // an unterminated quote swallows the rest of the body without a reader
    // error; escaped quotes come in pairs, so an odd count means one is open
    if text.bytes().filter(|&b| b == b'"').count() % 2 == 1 {
        out.warnings.push(ParseWarning {
            record: out.rows.len().saturating_sub(1),
            message: "unterminated quoted field".to_string(),
        });
    }

    if !out.warnings.is_empty() {
        warn!(count = out.warnings.len(), warnings = ?out.warnings, "CSV parse errors");
    }
    debug!(rows = out.rows.len(), columns = headers.len(), "parsed CSV");
    out
}
