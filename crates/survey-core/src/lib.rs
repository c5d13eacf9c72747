//! # survey-core
//!
//! The survey engine - THE LOGIC.
//!
//! This crate implements the automation tools survey: a five-screen wizard
//! that walks a respondent through department, tool, name and system number
//! selection before a tool-specific questionnaire, plus the response log the
//! submissions land in.
//!
//! ## Flow
//!
//! ```text
//! Catalog ──► WizardState ──► validator ──► SurveyResponse ──► ResponseLog ──► CSV
//! ```
//!
//! ## Architectural Constraints
//!
//! - Has NO async, NO network dependencies (pure Rust)
//! - Does not log: every failure is a `SurveyError` handed to the caller
//! - Does not read the clock: submission time is passed in

// =============================================================================
// MODULES
// =============================================================================

pub mod catalog;
pub mod formats;
pub mod log;
pub mod primitives;
pub mod questions;
pub mod response;
pub mod session;
pub mod types;
pub mod validator;
pub mod wizard;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{Answer, QuestionSetKind, Step, SurveyError};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use catalog::{Catalog, Department, ToolEntry};
pub use log::{AppendReport, ResponseLog, ResponseTable};
pub use questions::{Question, QuestionKind, QuestionSet};
pub use response::SurveyResponse;
pub use session::SurveySession;
pub use validator::{is_valid_format, is_valid_system, validate_answers, validate_system_number};
pub use wizard::{WizardAction, WizardState};
