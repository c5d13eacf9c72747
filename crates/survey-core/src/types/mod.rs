//! # Core Type Definitions
//!
//! This module contains the small shared vocabulary of the survey engine:
//! - Wizard steps (`Step`)
//! - Question-set variants (`QuestionSetKind`)
//! - Raw answers as submitted by a client (`Answer`)
//! - Error types (`SurveyError`)

use crate::primitives::PROGRESS_STEPS;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// WIZARD STEP
// =============================================================================

/// A step of the survey wizard.
///
/// The wizard is linear: 1 → 2 → 3 → 4 → 5 → 6. Step 6 is terminal until
/// the session is reset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Pick a department.
    #[default]
    Department,
    /// Pick a tool of the chosen department.
    Tool,
    /// Pick the respondent's name.
    User,
    /// Enter and validate the system number.
    SystemNumber,
    /// Answer the question set bound to the tool.
    Questions,
    /// Submission confirmed.
    Confirmation,
}

impl Step {
    /// All steps in wizard order.
    pub const ALL: [Step; 6] = [
        Step::Department,
        Step::Tool,
        Step::User,
        Step::SystemNumber,
        Step::Questions,
        Step::Confirmation,
    ];

    /// One-based step number.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Department => 1,
            Self::Tool => 2,
            Self::User => 3,
            Self::SystemNumber => 4,
            Self::Questions => 5,
            Self::Confirmation => 6,
        }
    }

    /// Step from its one-based number.
    #[must_use]
    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.number() == number)
    }

    /// The step that follows this one, if any.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        Self::from_number(self.number().saturating_add(1))
    }

    /// The step before this one, if any.
    #[must_use]
    pub fn previous(self) -> Option<Self> {
        self.number().checked_sub(1).and_then(Self::from_number)
    }

    /// Human-readable title of the step.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Department => "Department Selection",
            Self::Tool => "Tool Selection",
            Self::User => "User Selection",
            Self::SystemNumber => "System Information",
            Self::Questions => "Survey Questions",
            Self::Confirmation => "Submitted",
        }
    }

    /// Progress through the form as an integer percentage.
    ///
    /// Returns `None` for the confirmation step, which has no progress bar.
    #[must_use]
    pub fn progress_percent(self) -> Option<u8> {
        let n = self.number();
        if n > PROGRESS_STEPS {
            return None;
        }
        Some(((u16::from(n) * 100) / u16::from(PROGRESS_STEPS)) as u8)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.number(), self.title())
    }
}

// =============================================================================
// QUESTION SET KIND
// =============================================================================

/// Which questionnaire a tool's respondents answer at step 5.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum QuestionSetKind {
    /// Tool is installed and in daily use.
    #[default]
    Adoption,
    /// Tool is still being built.
    Development,
    /// Tool is built but not installed on the respondent's system.
    Deployment,
}

impl QuestionSetKind {
    /// Stable identifier, used in the CSV log and in TOML catalogs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Adoption => "adoption",
            Self::Development => "development",
            Self::Deployment => "deployment",
        }
    }
}

impl fmt::Display for QuestionSetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionSetKind {
    type Err = SurveyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "adoption" => Ok(Self::Adoption),
            "development" => Ok(Self::Development),
            "deployment" => Ok(Self::Deployment),
            other => Err(SurveyError::SerializationError(format!(
                "Unknown question set '{}'",
                other
            ))),
        }
    }
}

// =============================================================================
// ANSWER
// =============================================================================

/// A raw answer to one question, as sent by a client.
///
/// Answers are untyped on the wire; the validator checks them against the
/// question they answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    /// Scale value (e.g. satisfaction 1-5).
    Number(i64),
    /// Single choice or free text.
    Text(String),
    /// Multi-select choices.
    List(Vec<String>),
}

impl Answer {
    /// Create a text answer.
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Create a multi-select answer.
    #[must_use]
    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Whether the answer carries no content.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Number(_) => false,
            Self::Text(s) => s.trim().is_empty(),
            Self::List(items) => items.iter().all(|i| i.trim().is_empty()),
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the survey engine.
///
/// Nearly all of them are user-input validation failures; their `Display`
/// text is shown to the respondent as-is.
#[derive(Debug, Error)]
pub enum SurveyError {
    /// The department is not in the catalog.
    #[error("Unknown department '{0}'")]
    UnknownDepartment(String),

    /// The tool does not belong to the selected department.
    #[error("Unknown tool '{tool}' for department '{department}'")]
    UnknownTool { department: String, tool: String },

    /// The respondent is not listed for the selected tool.
    #[error("'{user}' is not a listed user of '{tool}'")]
    UnknownUser { tool: String, user: String },

    /// The system number is shorter than the minimum length.
    #[error("System number should be at least {min} characters long")]
    SystemNumberTooShort { min: usize },

    /// The system number exceeds the maximum accepted length.
    #[error("System number must be at most {max} characters long")]
    SystemNumberTooLong { max: usize },

    /// The system number is not on the tool's allow-list.
    #[error(
        "The tool '{tool}' is not installed on system {system_number}. Please contact IT support if you believe this is an error."
    )]
    SystemNotInstalled { tool: String, system_number: String },

    /// A required question was left empty.
    #[error("{message}")]
    MissingAnswer { key: String, message: String },

    /// A choice answer is not one of the offered options.
    #[error("'{value}' is not a valid option for '{key}'")]
    InvalidChoice { key: String, value: String },

    /// A scale answer is outside its range.
    #[error("'{key}' must be between {min} and {max}, got {value}")]
    ScaleOutOfRange {
        key: String,
        value: i64,
        min: i64,
        max: i64,
    },

    /// The answer has the wrong shape for its question.
    #[error("'{key}' expects {expected}")]
    AnswerTypeMismatch { key: String, expected: &'static str },

    /// A free-text answer is too long.
    #[error("'{key}' must be at most {max} characters")]
    AnswerTooLong { key: String, max: usize },

    /// The answer refers to a question that is not in the active set.
    #[error("Unknown question '{0}'")]
    UnknownQuestion(String),

    /// The action is not available at the current step.
    #[error("Action requires step {expected}, but the survey is at step {actual}")]
    WrongStep { expected: Step, actual: Step },

    /// Back navigation is not possible from this step.
    #[error("Cannot go back from step {0}")]
    CannotGoBack(Step),

    /// The session is missing a value an earlier step should have set.
    #[error("Session has no {0} selected")]
    IncompleteSession(&'static str),

    /// A catalog definition is malformed.
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

impl SurveyError {
    /// Whether this error is a rejection of user input (as opposed to a
    /// navigation or infrastructure failure).
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::UnknownDepartment(_)
                | Self::UnknownTool { .. }
                | Self::UnknownUser { .. }
                | Self::SystemNumberTooShort { .. }
                | Self::SystemNumberTooLong { .. }
                | Self::SystemNotInstalled { .. }
                | Self::MissingAnswer { .. }
                | Self::InvalidChoice { .. }
                | Self::ScaleOutOfRange { .. }
                | Self::AnswerTypeMismatch { .. }
                | Self::AnswerTooLong { .. }
                | Self::UnknownQuestion(_)
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================
