//! # CSV Table Format
//!
//! Minimal RFC 4180 style encoding for the response log.
//!
//! - Fields containing `,`, `"`, CR or LF are quoted; quotes are doubled.
//! - Rows end with `\n`; the parser also accepts `\r\n`.
//! - Exports meant for spreadsheets can neutralize formula prefixes
//!   (`=`, `+`, `-`, `@`) by prepending a single quote.
//!
//! File I/O lives in [`crate::log`]; this module only transforms text.

use crate::SurveyError;
use std::borrow::Cow;

/// Whether a cell would be interpreted as a formula by a spreadsheet.
fn needs_formula_guard(value: &str) -> bool {
    let trimmed = value.trim_start();
    matches!(trimmed.chars().next(), Some('=' | '+' | '-' | '@'))
}

/// Escape one field.
#[must_use]
pub fn escape_field(value: &str, neutralize: bool) -> Cow<'_, str> {
    let guarded: Cow<'_, str> = if neutralize && needs_formula_guard(value) {
        Cow::Owned(format!("'{}", value))
    } else {
        Cow::Borrowed(value)
    };

    if guarded.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", guarded.replace('"', "\"\"")))
    } else {
        guarded
    }
}

/// Encode a header and rows. Short rows are padded with empty cells.
#[must_use]
pub fn encode_table(columns: &[String], rows: &[Vec<String>], neutralize: bool) -> String {
    let mut out = String::new();
    push_row(&mut out, columns.iter().map(String::as_str), neutralize);
    for row in rows {
        let cells = (0..columns.len()).map(|i| row.get(i).map_or("", String::as_str));
        push_row(&mut out, cells, neutralize);
    }
    out
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, neutralize: bool) {
    for (i, cell) in cells.enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&escape_field(cell, neutralize));
    }
    out.push('\n');
}

/// Parse CSV text into rows of cells. The first row is the header.
///
/// Blank lines are skipped. An unterminated quoted field is an error.
pub fn parse_table(text: &str) -> Result<Vec<Vec<String>>, SurveyError> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                other => field.push(other),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => in_quotes = true,
            ',' => row.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => finish_row(&mut rows, &mut row, &mut field),
            other => field.push(other),
        }
    }

    if in_quotes {
        return Err(SurveyError::SerializationError(
            "Unterminated quoted field in CSV".to_string(),
        ));
    }
    finish_row(&mut rows, &mut row, &mut field);
    Ok(rows)
}

fn finish_row(rows: &mut Vec<Vec<String>>, row: &mut Vec<String>, field: &mut String) {
    if row.is_empty() && field.is_empty() {
        return;
    }
    row.push(std::mem::take(field));
    rows.push(std::mem::take(row));
}

// =============================================================================
// TESTS
// =============================================================================
