//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use survey_core::{
    Answer, Catalog, Department, Question, QuestionKind, QuestionSetKind, ResponseTable, Step,
    SurveySession,
};

/// File name offered for the CSV download.
pub const EXPORT_FILENAME: &str = survey_core::primitives::DEFAULT_RESPONSES_FILE;

/// Media type of the CSV download.
pub const EXPORT_CONTENT_TYPE: &str = "text/csv";

/// Message shown by the admin panel when the log is empty.
pub const NO_RESPONSES_MESSAGE: &str = "No responses collected yet.";

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// STATUS RESPONSE
// =============================================================================

/// Server status response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub response_count: usize,
    pub active_sessions: usize,
    pub department_count: usize,
    pub tool_count: usize,
    /// Whether responses are mirrored to a CSV file.
    pub persistent: bool,
    /// Whether admin logins are possible at all.
    pub admin_enabled: bool,
}

// =============================================================================
// CATALOG RESPONSE
// =============================================================================

/// The lookup tables, without system allow-lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogResponse {
    pub departments: Vec<DepartmentJson>,
}

/// One department of the catalog response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentJson {
    pub name: String,
    pub tools: Vec<ToolJson>,
}

/// One tool of the catalog response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolJson {
    pub name: String,
    pub users: Vec<String>,
    pub question_set: QuestionSetKind,
}

impl From<&Department> for DepartmentJson {
    fn from(department: &Department) -> Self {
        Self {
            name: department.name.clone(),
            tools: department
                .tools
                .iter()
                .map(|tool| ToolJson {
                    name: tool.name.clone(),
                    users: tool.users.clone(),
                    question_set: tool.question_set,
                })
                .collect(),
        }
    }
}

impl From<&Catalog> for CatalogResponse {
    fn from(catalog: &Catalog) -> Self {
        Self {
            departments: catalog.departments().iter().map(DepartmentJson::from).collect(),
        }
    }
}

// =============================================================================
// WIZARD VIEW
// =============================================================================

/// One question of the active set, as shown at step 5.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionJson {
    pub key: String,
    pub section: String,
    pub prompt: String,
    /// `single_choice`, `ordered_choice`, `multi_choice`, `scale` or `free_text`.
    pub kind: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<i64>,
}

impl From<&Question> for QuestionJson {
    fn from(question: &Question) -> Self {
        let (min, max, default) = match question.kind {
            QuestionKind::Scale { min, max, default } => (Some(min), Some(max), Some(default)),
            _ => (None, None, None),
        };
        Self {
            key: question.key.to_string(),
            section: question.section.to_string(),
            prompt: question.prompt.to_string(),
            kind: question.kind.name().to_string(),
            required: question.required,
            options: question
                .kind
                .options()
                .iter()
                .map(|o| (*o).to_string())
                .collect(),
            min,
            max,
            default,
        }
    }
}

/// Everything a client needs to render the current screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardView {
    pub session_id: String,
    /// One-based step number (1-6).
    pub step: u8,
    pub step_name: Step,
    pub title: String,
    /// Integer percentage for steps 1-5; absent on the confirmation.
    pub progress_percent: Option<u8>,
    pub department: Option<String>,
    pub tool: Option<String>,
    pub user: Option<String>,
    pub system_number: Option<String>,
    pub question_set: Option<QuestionSetKind>,
    /// Choices offered at steps 1-3.
    pub options: Vec<String>,
    /// Previously entered value for this step, to pre-fill the input.
    pub selected: Option<String>,
    /// Questions of the active set at step 5.
    pub questions: Vec<QuestionJson>,
    pub draft_answers: BTreeMap<String, Answer>,
    pub is_admin: bool,
}

impl WizardView {
    /// Build the view of one session.
    pub fn new(session_id: &str, session: &SurveySession, catalog: &Catalog) -> Self {
        let wizard = session.wizard();
        let step = wizard.step();
        let question_set = wizard.question_set(catalog);
        let questions = match (step, question_set) {
            (Step::Questions, Some(kind)) => kind
                .question_set()
                .questions
                .iter()
                .map(QuestionJson::from)
                .collect(),
            _ => Vec::new(),
        };

        Self {
            session_id: session_id.to_string(),
            step: step.number(),
            step_name: step,
            title: step.title().to_string(),
            progress_percent: step.progress_percent(),
            department: wizard.department().map(str::to_string),
            tool: wizard.tool().map(str::to_string),
            user: wizard.user().map(str::to_string),
            system_number: wizard.system_number().map(str::to_string),
            question_set,
            options: wizard.options(catalog),
            selected: wizard.current_selection().map(str::to_string),
            questions,
            draft_answers: wizard.draft_answers().clone(),
            is_admin: session.is_admin(),
        }
    }
}

// =============================================================================
// SESSION RESPONSES
// =============================================================================

/// Response of session create/get and of wizard actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub success: bool,
    pub session: Option<WizardView>,
    /// Whether this request appended a response to the log.
    #[serde(default)]
    pub submitted: bool,
    pub error: Option<String>,
}

impl SessionResponse {
    pub fn success(view: WizardView) -> Self {
        Self {
            success: true,
            session: Some(view),
            submitted: false,
            error: None,
        }
    }

    pub fn submitted(view: WizardView) -> Self {
        Self {
            submitted: true,
            ..Self::success(view)
        }
    }

    /// A rejected action. The view shows the unchanged state, drafts included.
    pub fn rejected(view: WizardView, msg: impl Into<String>) -> Self {
        Self {
            success: false,
            session: Some(view),
            submitted: false,
            error: Some(msg.into()),
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            session: None,
            submitted: false,
            error: Some(msg.into()),
        }
    }
}

/// Response of session deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub error: Option<String>,
}

// =============================================================================
// ADMIN
// =============================================================================

/// Admin login request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

/// Admin login/logout response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminResponse {
    pub success: bool,
    pub is_admin: bool,
    pub error: Option<String>,
}

impl AdminResponse {
    pub fn success(is_admin: bool) -> Self {
        Self {
            success: true,
            is_admin,
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            is_admin: false,
            error: Some(msg.into()),
        }
    }
}

/// All collected responses as a table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponsesResponse {
    pub success: bool,
    pub count: usize,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Set when there is nothing to show.
    pub message: Option<String>,
    pub error: Option<String>,
}

impl ResponsesResponse {
    pub fn from_table(table: ResponseTable) -> Self {
        let count = table.rows.len();
        Self {
            success: true,
            count,
            columns: table.columns,
            rows: table.rows,
            message: (count == 0).then(|| NO_RESPONSES_MESSAGE.to_string()),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            count: 0,
            columns: Vec::new(),
            rows: Vec::new(),
            message: None,
            error: Some(msg.into()),
        }
    }
}

/// CSV export response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportResponse {
    pub success: bool,
    pub data: Option<String>, // Base64 encoded CSV
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub count: usize,
    pub error: Option<String>,
}

impl ExportResponse {
    pub fn success(csv: &str, count: usize) -> Self {
        Self {
            success: true,
            data: Some(base64::Engine::encode(
                &base64::engine::general_purpose::STANDARD,
                csv.as_bytes(),
            )),
            filename: Some(EXPORT_FILENAME.to_string()),
            content_type: Some(EXPORT_CONTENT_TYPE.to_string()),
            count,
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            filename: None,
            content_type: None,
            count: 0,
            error: Some(msg.into()),
        }
    }
}
