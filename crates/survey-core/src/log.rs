//! # Response Log
//!
//! Ordered, append-only collection of submitted responses, optionally
//! mirrored to a CSV file.
//!
//! The in-memory log is the source of truth. When a mirror file is
//! configured it is rewritten after every append; if that write fails the
//! response stays in memory and the failure is handed back to the caller.

use crate::formats::csv::{encode_table, parse_table};
use crate::primitives::MAX_RESPONSE_LOG_SIZE;
use crate::response::{FIXED_COLUMNS, TIMESTAMP_COLUMN};
use crate::{SurveyError, SurveyResponse};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tabular view of the log: header plus one row per response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Outcome of [`ResponseLog::append`].
#[derive(Debug)]
pub struct AppendReport {
    /// Zero-based position of the new record.
    pub position: usize,
    /// Whether the record reached the mirror file.
    pub persisted: bool,
    /// Why the mirror write failed, if it did.
    pub mirror_error: Option<SurveyError>,
}

/// The response log.
#[derive(Debug, Default)]
pub struct ResponseLog {
    records: Vec<SurveyResponse>,
    mirror: Option<PathBuf>,
}

impl ResponseLog {
    /// Create an empty, memory-only log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty log mirrored to `path`.
    ///
    /// Nothing is written until the first append.
    #[must_use]
    pub fn with_mirror(path: impl Into<PathBuf>) -> Self {
        Self {
            records: Vec::new(),
            mirror: Some(path.into()),
        }
    }

    /// Open a mirrored log, restoring any records already in `path`.
    ///
    /// A missing file yields an empty log.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SurveyError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::with_mirror(path));
        }

        let metadata = std::fs::metadata(path)
            .map_err(|e| SurveyError::IoError(format!("Cannot read log metadata: {}", e)))?;
        if metadata.len() > MAX_RESPONSE_LOG_SIZE {
            return Err(SurveyError::SerializationError(format!(
                "Response log size {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_RESPONSE_LOG_SIZE
            )));
        }

        let text = std::fs::read_to_string(path)
            .map_err(|e| SurveyError::IoError(format!("Read response log: {}", e)))?;
        let mut log = Self::from_csv(&text)?;
        log.mirror = Some(path.to_path_buf());
        Ok(log)
    }

    /// Parse a memory-only log from CSV text.
    pub fn from_csv(text: &str) -> Result<Self, SurveyError> {
        let mut rows = parse_table(text)?.into_iter();
        let Some(header) = rows.next() else {
            return Ok(Self::new());
        };

        let mut records = Vec::new();
        for (index, row) in rows.enumerate() {
            if row.len() > header.len() {
                return Err(SurveyError::SerializationError(format!(
                    "Row {} has {} cells but the header has {}",
                    index + 1,
                    row.len(),
                    header.len()
                )));
            }
            let fields = header
                .iter()
                .map(String::as_str)
                .zip(row.iter().map(String::as_str).chain(std::iter::repeat("")));
            records.push(SurveyResponse::from_fields(fields)?);
        }

        Ok(Self {
            records,
            mirror: None,
        })
    }

    /// Append a response and refresh the mirror file.
    pub fn append(&mut self, response: SurveyResponse) -> AppendReport {
        let position = self.push(response);

        let mirror_error = self.flush().err();
        AppendReport {
            position,
            persisted: self.mirror.is_some() && mirror_error.is_none(),
            mirror_error,
        }
    }

    /// Append a response in memory only, returning its position.
    ///
    /// The caller is responsible for writing [`Self::mirror_snapshot`].
    pub fn push(&mut self, response: SurveyResponse) -> usize {
        self.records.push(response);
        self.records.len() - 1
    }

    /// Mirror path and the CSV text it should hold. `None` for memory-only logs.
    #[must_use]
    pub fn mirror_snapshot(&self) -> Option<(PathBuf, String)> {
        self.mirror.as_ref().map(|path| (path.clone(), self.to_csv()))
    }

    /// Rewrite the mirror file from memory. No-op for memory-only logs.
    pub fn flush(&self) -> Result<(), SurveyError> {
        match self.mirror_snapshot() {
            Some((path, csv)) => Self::write_mirror(&path, &csv),
            None => Ok(()),
        }
    }

    /// Replace `path` with `csv`: write `<path>.tmp`, then rename over it.
    pub fn write_mirror(path: &Path, csv: &str) -> Result<(), SurveyError> {
        let mut tmp = path.as_os_str().to_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        std::fs::write(&tmp, csv)
            .map_err(|e| SurveyError::IoError(format!("Write response log: {}", e)))?;
        std::fs::rename(&tmp, path)
            .map_err(|e| SurveyError::IoError(format!("Replace response log: {}", e)))
    }

    /// Records in submission order.
    #[must_use]
    pub fn records(&self) -> &[SurveyResponse] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Path of the mirror file, if any.
    #[must_use]
    pub fn mirror_path(&self) -> Option<&Path> {
        self.mirror.as_deref()
    }

    /// Header of the table: every field name in order of first appearance,
    /// with `timestamp` last.
    #[must_use]
    pub fn columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = FIXED_COLUMNS.iter().map(|c| (*c).to_string()).collect();
        for record in &self.records {
            for (key, _) in record.answers() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }
        columns.push(TIMESTAMP_COLUMN.to_string());
        columns
    }

    /// The log as a table. Cells of columns a record does not have are empty.
    #[must_use]
    pub fn table(&self) -> ResponseTable {
        let columns = self.columns();
        let rows = self
            .records
            .iter()
            .map(|record| {
                let fields = record.fields();
                columns
                    .iter()
                    .map(|column| {
                        fields
                            .iter()
                            .find(|(k, _)| *k == column.as_str())
                            .map(|(_, v)| v.clone())
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .collect();
        ResponseTable { columns, rows }
    }

    /// The log as CSV, exactly as stored in the mirror file.
    #[must_use]
    pub fn to_csv(&self) -> String {
        let table = self.table();
        encode_table(&table.columns, &table.rows, false)
    }

    /// The log as CSV for download: formula prefixes are neutralized.
    #[must_use]
    pub fn export_csv(&self) -> String {
        let table = self.table();
        encode_table(&table.columns, &table.rows, true)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QuestionSetKind;
    use chrono::NaiveDate;

    fn response(tool: &str, kind: QuestionSetKind, answers: &[(&str, &str)]) -> SurveyResponse {
        let at = NaiveDate::from_ymd_opt(2024, 11, 5)
            .and_then(|d| d.and_hms_opt(10, 0, 0))
            .expect("valid datetime");
        SurveyResponse::new(
            "TSG".into(),
            tool.into(),
            "NA".into(),
            "Not Installed".into(),
            kind,
            answers
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            at,
        )
    }

    #[test]
    fn memory_only_append_is_not_persisted() {
        let mut log = ResponseLog::new();
        let report = log.append(response("T", QuestionSetKind::Adoption, &[]));
        assert_eq!(report.position, 0);
        assert!(!report.persisted);
        assert!(report.mirror_error.is_none());
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn columns_are_union_in_first_appearance_order() {
        let mut log = ResponseLog::new();
        log.append(response(
            "A",
            QuestionSetKind::Adoption,
            &[("usage_duration", "1-3 months")],
        ));
        log.append(response(
            "B",
            QuestionSetKind::Deployment,
            &[("rollout_urgency", "Within a week"), ("usage_duration", "")],
        ));

        assert_eq!(
            log.columns(),
            vec![
                "department",
                "tool",
                "user",
                "system_number",
                "question_set",
                "usage_duration",
                "rollout_urgency",
                "timestamp",
            ]
        );
        let table = log.table();
        assert_eq!(table.rows[0][6], "");
        assert_eq!(table.rows[1][6], "Within a week");
    }

    #[test]
    fn empty_log_still_has_a_header() {
        let log = ResponseLog::new();
        assert_eq!(
            log.to_csv(),
            "department,tool,user,system_number,question_set,timestamp\n"
        );
        assert!(log.table().rows.is_empty());
    }

    #[test]
    fn csv_text_restores_records() {
        let mut log = ResponseLog::new();
        log.append(response(
            "A",
            QuestionSetKind::Adoption,
            &[("valuable_features", "Easy to use, Other")],
        ));
        log.append(response(
            "B",
            QuestionSetKind::Deployment,
            &[("rollout_urgency", "Within a week")],
        ));

        let restored = ResponseLog::from_csv(&log.to_csv()).expect("parse");
        assert_eq!(restored.records(), log.records());
    }

    #[test]
    fn blank_optional_answers_survive_reload() {
        let mut log = ResponseLog::new();
        log.append(response(
            "A",
            QuestionSetKind::Adoption,
            &[("usage_duration", "1-3 months"), ("suggestions", "")],
        ));
        log.append(response(
            "B",
            QuestionSetKind::Deployment,
            &[("rollout_urgency", "Within a week"), ("rollout_blockers", "")],
        ));

        let restored = ResponseLog::from_csv(&log.to_csv()).expect("parse");
        assert_eq!(restored.records(), log.records());
        assert_eq!(restored.records()[0].answer("suggestions"), Some(""));
        assert_eq!(restored.records()[0].answer("rollout_blockers"), None);
        assert_eq!(restored.records()[1].answer("suggestions"), None);
    }

    #[test]
    fn export_neutralizes_formulas() {
        let mut log = ResponseLog::new();
        log.append(response(
            "A",
            QuestionSetKind::Adoption,
            &[("suggestions", "=HYPERLINK(\"x\")")],
        ));
        assert!(log.to_csv().contains("\"=HYPERLINK(\"\"x\"\")\""));
        assert!(log.export_csv().contains("\"'=HYPERLINK(\"\"x\"\")\""));
    }

    #[test]
    fn push_defers_the_mirror_write() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("responses.csv");
        let mut log = ResponseLog::with_mirror(&path);

        assert_eq!(log.push(response("A", QuestionSetKind::Adoption, &[])), 0);
        assert!(!path.exists());

        let (target, csv) = log.mirror_snapshot().expect("mirrored");
        assert_eq!(target, path);
        ResponseLog::write_mirror(&target, &csv).expect("write");
        assert_eq!(ResponseLog::open(&path).expect("open").len(), 1);
    }

    #[test]
    fn memory_only_log_has_no_snapshot() {
        let mut log = ResponseLog::new();
        log.push(response("A", QuestionSetKind::Adoption, &[]));
        assert!(log.mirror_snapshot().is_none());
    }

    #[test]
    fn row_wider_than_header_is_rejected() {
        let text = "department,tool\nFinance,T,extra\n";
        assert!(ResponseLog::from_csv(text).is_err());
    }
}
