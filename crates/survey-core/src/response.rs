//! # Survey Response
//!
//! A submitted survey record. Responses are immutable: they are created by
//! the wizard once every check has passed, or restored from a log file.

use crate::primitives::TIMESTAMP_FORMAT;
use crate::{QuestionSetKind, SurveyError};
use chrono::NaiveDateTime;

/// Column names that precede the answers in every record.
pub const FIXED_COLUMNS: [&str; 5] = [
    "department",
    "tool",
    "user",
    "system_number",
    "question_set",
];

/// Column name of the submission timestamp; always the last column.
pub const TIMESTAMP_COLUMN: &str = "timestamp";

/// One submitted survey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyResponse {
    department: String,
    tool: String,
    user: String,
    system_number: String,
    question_set: QuestionSetKind,
    answers: Vec<(String, String)>,
    submitted_at: NaiveDateTime,
}

impl SurveyResponse {
    /// Assemble a response from already-validated parts.
    pub(crate) fn new(
        department: String,
        tool: String,
        user: String,
        system_number: String,
        question_set: QuestionSetKind,
        answers: Vec<(String, String)>,
        submitted_at: NaiveDateTime,
    ) -> Self {
        Self {
            department,
            tool,
            user,
            system_number,
            question_set,
            answers,
            submitted_at,
        }
    }

    #[must_use]
    pub fn department(&self) -> &str {
        &self.department
    }

    #[must_use]
    pub fn tool(&self) -> &str {
        &self.tool
    }

    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    #[must_use]
    pub fn system_number(&self) -> &str {
        &self.system_number
    }

    #[must_use]
    pub fn question_set(&self) -> QuestionSetKind {
        self.question_set
    }

    #[must_use]
    pub fn submitted_at(&self) -> NaiveDateTime {
        self.submitted_at
    }

    /// Submission time formatted as `YYYY-MM-DD HH:MM:SS`.
    #[must_use]
    pub fn timestamp(&self) -> String {
        self.submitted_at.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Answers as `(question key, flattened value)` in question order.
    #[must_use]
    pub fn answers(&self) -> &[(String, String)] {
        &self.answers
    }

    /// Look up one answer by question key.
    #[must_use]
    pub fn answer(&self, key: &str) -> Option<&str> {
        self.answers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The flat record: fixed columns, answers, then the timestamp.
    #[must_use]
    pub fn fields(&self) -> Vec<(&str, String)> {
        let mut fields = Vec::with_capacity(FIXED_COLUMNS.len() + self.answers.len() + 1);
        fields.push((FIXED_COLUMNS[0], self.department.clone()));
        fields.push((FIXED_COLUMNS[1], self.tool.clone()));
        fields.push((FIXED_COLUMNS[2], self.user.clone()));
        fields.push((FIXED_COLUMNS[3], self.system_number.clone()));
        fields.push((FIXED_COLUMNS[4], self.question_set.to_string()));
        fields.extend(self.answers.iter().map(|(k, v)| (k.as_str(), v.clone())));
        fields.push((TIMESTAMP_COLUMN, self.timestamp()));
        fields
    }

    /// Rebuild a response from a flat record (one CSV row keyed by header).
    ///
    /// Cells that are empty because another question set introduced the
    /// column are dropped; every other non-fixed column becomes an answer.
    pub fn from_fields<'a, I>(fields: I) -> Result<Self, SurveyError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut department = None;
        let mut tool = None;
        let mut user = None;
        let mut system_number = None;
        let mut question_set = None;
        let mut submitted_at = None;
        let mut cells = Vec::new();

        for (column, value) in fields {
            match column {
                "department" => department = Some(value.to_string()),
                "tool" => tool = Some(value.to_string()),
                "user" => user = Some(value.to_string()),
                "system_number" => system_number = Some(value.to_string()),
                "question_set" => question_set = Some(value.parse::<QuestionSetKind>()?),
                TIMESTAMP_COLUMN => {
                    let parsed = NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
                        .map_err(|e| {
                            SurveyError::SerializationError(format!(
                                "Invalid timestamp '{}': {}",
                                value, e
                            ))
                        })?;
                    submitted_at = Some(parsed);
                }
                key => cells.push((key, value)),
            }
        }

        let question_set = question_set.unwrap_or_default();
        let set = question_set.question_set();
        let answers = cells
            .into_iter()
            .filter(|(key, value)| set.question(key).is_some() || !value.is_empty())
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();

        Ok(Self {
            department: department.ok_or_else(|| missing_column("department"))?,
            tool: tool.ok_or_else(|| missing_column("tool"))?,
            user: user.ok_or_else(|| missing_column("user"))?,
            system_number: system_number.ok_or_else(|| missing_column("system_number"))?,
            question_set,
            answers,
            submitted_at: submitted_at.ok_or_else(|| missing_column(TIMESTAMP_COLUMN))?,
        })
    }
}

fn missing_column(name: &str) -> SurveyError {
    SurveyError::SerializationError(format!("Missing column '{}'", name))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 11, 5)
            .and_then(|d| d.and_hms_opt(h, m, s))
            .expect("valid datetime")
    }

    fn sample() -> SurveyResponse {
        SurveyResponse::new(
            "Finance".into(),
            "SMS & Tally Fnf Reco".into(),
            "Shruti Dixit".into(),
            "RVS1094".into(),
            QuestionSetKind::Adoption,
            vec![
                ("usage_duration".into(), "1-3 months".into()),
                ("suggestions".into(), String::new()),
            ],
            at(9, 30, 5),
        )
    }

    #[test]
    fn fields_put_timestamp_last() {
        let response = sample();
        let fields = response.fields();
        assert_eq!(fields.first().map(|(k, _)| *k), Some("department"));
        assert_eq!(
            fields.last(),
            Some(&(TIMESTAMP_COLUMN, "2024-11-05 09:30:05".to_string()))
        );
    }

    #[test]
    fn rebuilds_from_its_own_fields() {
        let response = sample();
        let fields = response.fields();
        let restored =
            SurveyResponse::from_fields(fields.iter().map(|(k, v)| (*k, v.as_str())))
                .expect("restore");
        assert_eq!(restored, response);
    }

    #[test]
    fn foreign_empty_columns_are_dropped() {
        let row = [
            ("department", "Finance"),
            ("tool", "SMS & Tally Fnf Reco"),
            ("user", "Anmol Dubey"),
            ("system_number", "RVS120A"),
            ("question_set", "adoption"),
            ("usage_duration", "1-3 months"),
            ("rollout_blockers", ""),
            ("timestamp", "2024-11-05 09:30:05"),
        ];
        let restored = SurveyResponse::from_fields(row).expect("restore");
        assert_eq!(restored.answers().len(), 1);
        assert_eq!(restored.answer("usage_duration"), Some("1-3 months"));
    }

    #[test]
    fn missing_fixed_column_is_an_error() {
        let row = [("department", "Finance"), ("timestamp", "2024-11-05 09:30:05")];
        assert!(SurveyResponse::from_fields(row).is_err());
    }

    #[test]
    fn bad_timestamp_is_an_error() {
        let row = [
            ("department", "Finance"),
            ("tool", "T"),
            ("user", "U"),
            ("system_number", "RVS120A"),
            ("timestamp", "yesterday"),
        ];
        assert!(matches!(
            SurveyResponse::from_fields(row),
            Err(SurveyError::SerializationError(_))
        ));
    }
}
