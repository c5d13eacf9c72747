//! # Survey Primitives
//!
//! Fixed runtime constants for the survey engine.
//!
//! These values are compiled into the binary and are immutable at runtime.

/// Minimum number of characters a system number must have before the
/// allow-list is even consulted.
pub const MIN_SYSTEM_NUMBER_LENGTH: usize = 5;

/// Upper bound on system number length accepted at the API boundary.
pub const MAX_SYSTEM_NUMBER_LENGTH: usize = 64;

/// Number of steps shown in the progress indicator ("Step n of 5").
///
/// The confirmation step (6) is terminal and sits outside the progress bar.
pub const PROGRESS_STEPS: u8 = 5;

/// Format of the submission timestamp, both in memory and in the CSV file.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Separator used to flatten multi-select answers into a single cell.
pub const MULTI_SELECT_SEPARATOR: &str = ", ";

/// Default file name of the CSV response log and of the admin export.
pub const DEFAULT_RESPONSES_FILE: &str = "survey_responses.csv";

/// Maximum length (in characters) of a free-text answer.
pub const MAX_TEXT_ANSWER_LENGTH: usize = 4000;

/// Maximum size of a response log file read at startup (50 MB).
pub const MAX_RESPONSE_LOG_SIZE: u64 = 50 * 1024 * 1024;
