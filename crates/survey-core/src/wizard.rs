//! # Wizard Controller
//!
//! The step state machine of the survey:
//!
//! ```text
//! 1 department → 2 tool → 3 user → 4 system number → 5 questions → 6 confirmation
//! ```
//!
//! Every operation is only valid at its own step; anything else is rejected
//! with [`SurveyError::WrongStep`] and leaves the state untouched.
//!
//! ## Back navigation
//!
//! Going back keeps everything entered so far, so moving forward again
//! pre-fills the previous choice. Choosing a *different* department or tool
//! drops the later answers that were filtered by the old choice.

use crate::validator::{validate_answers, validate_system_number};
use crate::{Answer, Catalog, QuestionSetKind, Step, SurveyError, SurveyResponse};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// ACTIONS
// =============================================================================

/// A navigation action (tagged union).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum WizardAction {
    SelectDepartment {
        department: String,
    },
    SelectTool {
        tool: String,
    },
    SelectUser {
        user: String,
    },
    EnterSystemNumber {
        system_number: String,
    },
    Submit {
        #[serde(default)]
        answers: BTreeMap<String, Answer>,
    },
    Back,
    Reset,
}

// =============================================================================
// STATE
// =============================================================================

/// Per-session wizard state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WizardState {
    step: Step,
    department: Option<String>,
    tool: Option<String>,
    user: Option<String>,
    system_number: Option<String>,
    answers: BTreeMap<String, Answer>,
}

impl WizardState {
    /// Fresh wizard at step 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn step(&self) -> Step {
        self.step
    }

    #[must_use]
    pub fn department(&self) -> Option<&str> {
        self.department.as_deref()
    }

    #[must_use]
    pub fn tool(&self) -> Option<&str> {
        self.tool.as_deref()
    }

    #[must_use]
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    #[must_use]
    pub fn system_number(&self) -> Option<&str> {
        self.system_number.as_deref()
    }

    /// Answers entered at step 5 so far (kept across Back and failed submits).
    #[must_use]
    pub fn draft_answers(&self) -> &BTreeMap<String, Answer> {
        &self.answers
    }

    /// Question set of the selected tool.
    #[must_use]
    pub fn question_set(&self, catalog: &Catalog) -> Option<QuestionSetKind> {
        catalog.question_set(self.department.as_deref()?, self.tool.as_deref()?)
    }

    /// Choices offered at the current step (steps 1-3); empty otherwise.
    #[must_use]
    pub fn options(&self, catalog: &Catalog) -> Vec<String> {
        match self.step {
            Step::Department => catalog.department_names().map(str::to_string).collect(),
            Step::Tool => self
                .department()
                .and_then(|d| catalog.tool_names(d))
                .map(|tools| tools.into_iter().map(str::to_string).collect())
                .unwrap_or_default(),
            Step::User => self
                .department()
                .zip(self.tool())
                .and_then(|(d, t)| catalog.users(d, t))
                .map(<[String]>::to_vec)
                .unwrap_or_default(),
            Step::SystemNumber | Step::Questions | Step::Confirmation => Vec::new(),
        }
    }

    /// Value previously entered for the current step, used to pre-fill it.
    #[must_use]
    pub fn current_selection(&self) -> Option<&str> {
        match self.step {
            Step::Department => self.department(),
            Step::Tool => self.tool(),
            Step::User => self.user(),
            Step::SystemNumber => self.system_number(),
            Step::Questions | Step::Confirmation => None,
        }
    }

    // =========================================================================
    // TRANSITIONS
    // =========================================================================

    /// Step 1 → 2.
    pub fn select_department(
        &mut self,
        catalog: &Catalog,
        department: &str,
    ) -> Result<Step, SurveyError> {
        self.expect_step(Step::Department)?;
        if catalog.department(department).is_none() {
            return Err(SurveyError::UnknownDepartment(department.to_string()));
        }

        if self.department() != Some(department) {
            self.tool = None;
            self.user = None;
            self.system_number = None;
            self.answers.clear();
        }
        self.department = Some(department.to_string());
        Ok(self.advance())
    }

    /// Step 2 → 3.
    pub fn select_tool(&mut self, catalog: &Catalog, tool: &str) -> Result<Step, SurveyError> {
        self.expect_step(Step::Tool)?;
        let department = selected(&self.department, "department")?;
        if catalog.tool(department, tool).is_none() {
            return Err(SurveyError::UnknownTool {
                department: department.to_string(),
                tool: tool.to_string(),
            });
        }

        if self.tool() != Some(tool) {
            self.user = None;
            self.system_number = None;
            self.answers.clear();
        }
        self.tool = Some(tool.to_string());
        Ok(self.advance())
    }

    /// Step 3 → 4.
    pub fn select_user(&mut self, catalog: &Catalog, user: &str) -> Result<Step, SurveyError> {
        self.expect_step(Step::User)?;
        let department = selected(&self.department, "department")?;
        let tool = selected(&self.tool, "tool")?;
        let listed = catalog
            .users(department, tool)
            .is_some_and(|users| users.iter().any(|u| u == user));
        if !listed {
            return Err(SurveyError::UnknownUser {
                tool: tool.to_string(),
                user: user.to_string(),
            });
        }

        self.user = Some(user.to_string());
        Ok(self.advance())
    }

    /// Step 4 → 5. The system number must pass both validator checks.
    pub fn enter_system_number(
        &mut self,
        catalog: &Catalog,
        system_number: &str,
    ) -> Result<Step, SurveyError> {
        self.expect_step(Step::SystemNumber)?;
        let department = selected(&self.department, "department")?;
        let tool = selected(&self.tool, "tool")?;
        validate_system_number(catalog, department, tool, system_number)?;

        self.system_number = Some(system_number.to_string());
        Ok(self.advance())
    }

    /// Step 5 → 6. Returns the response to append to the log.
    ///
    /// The answers are kept as a draft even when validation fails, so the
    /// respondent does not lose them.
    pub fn submit(
        &mut self,
        catalog: &Catalog,
        answers: BTreeMap<String, Answer>,
        submitted_at: NaiveDateTime,
    ) -> Result<SurveyResponse, SurveyError> {
        self.expect_step(Step::Questions)?;
        self.answers = answers;

        let department = selected(&self.department, "department")?.to_string();
        let tool = selected(&self.tool, "tool")?.to_string();
        let user = selected(&self.user, "user")?.to_string();
        let system_number = selected(&self.system_number, "system number")?.to_string();

        let kind = catalog
            .question_set(&department, &tool)
            .ok_or_else(|| SurveyError::UnknownTool {
                department: department.clone(),
                tool: tool.clone(),
            })?;
        validate_system_number(catalog, &department, &tool, &system_number)?;
        let fields = validate_answers(kind.question_set(), &self.answers)?;

        let response = SurveyResponse::new(
            department,
            tool,
            user,
            system_number,
            kind,
            fields,
            submitted_at,
        );
        self.advance();
        Ok(response)
    }

    /// Go back one step. Not possible from step 1 or from the confirmation.
    pub fn back(&mut self) -> Result<Step, SurveyError> {
        match self.step {
            Step::Department | Step::Confirmation => Err(SurveyError::CannotGoBack(self.step)),
            current => {
                self.step = current.previous().unwrap_or_default();
                Ok(self.step)
            }
        }
    }

    /// Return to step 1 and forget every answer.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Apply a tagged action. Only `Submit` produces a response.
    pub fn apply(
        &mut self,
        catalog: &Catalog,
        action: WizardAction,
        now: NaiveDateTime,
    ) -> Result<Option<SurveyResponse>, SurveyError> {
        match action {
            WizardAction::SelectDepartment { department } => {
                self.select_department(catalog, &department)?;
            }
            WizardAction::SelectTool { tool } => {
                self.select_tool(catalog, &tool)?;
            }
            WizardAction::SelectUser { user } => {
                self.select_user(catalog, &user)?;
            }
            WizardAction::EnterSystemNumber { system_number } => {
                self.enter_system_number(catalog, &system_number)?;
            }
            WizardAction::Submit { answers } => {
                return self.submit(catalog, answers, now).map(Some);
            }
            WizardAction::Back => {
                self.back()?;
            }
            WizardAction::Reset => self.reset(),
        }
        Ok(None)
    }

    fn expect_step(&self, expected: Step) -> Result<(), SurveyError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(SurveyError::WrongStep {
                expected,
                actual: self.step,
            })
        }
    }

    fn advance(&mut self) -> Step {
        if let Some(next) = self.step.next() {
            self.step = next;
        }
        self.step
    }
}

fn selected<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str, SurveyError> {
    value.as_deref().ok_or(SurveyError::IncompleteSession(name))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 11, 5)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .expect("valid datetime")
    }

    fn at_system_step(catalog: &Catalog) -> WizardState {
        let mut wizard = WizardState::new();
        wizard.select_department(catalog, "Finance").expect("department");
        wizard
            .select_tool(catalog, "SMS & Tally Fnf Reco")
            .expect("tool");
        wizard.select_user(catalog, "Anmol Dubey").expect("user");
        wizard
    }

    #[test]
    fn starts_at_department() {
        let wizard = WizardState::new();
        assert_eq!(wizard.step(), Step::Department);
        assert_eq!(
            wizard.options(&Catalog::builtin()),
            vec!["Finance", "CSD", "TSG"]
        );
    }

    #[test]
    fn options_are_filtered_by_earlier_choices() {
        let catalog = Catalog::builtin();
        let mut wizard = WizardState::new();
        wizard.select_department(&catalog, "TSG").expect("department");
        assert_eq!(wizard.options(&catalog).len(), 3);

        wizard
            .select_tool(&catalog, "RA Invoice Tracker")
            .expect("tool");
        assert_eq!(
            wizard.options(&catalog),
            vec!["Rekha Pujari", "Kokil Goswami", "Sonika"]
        );
    }

    #[test]
    fn action_at_wrong_step_is_rejected_without_change() {
        let catalog = Catalog::builtin();
        let mut wizard = WizardState::new();
        let before = wizard.clone();

        let err = wizard
            .select_tool(&catalog, "SMS & Tally Fnf Reco")
            .expect_err("wrong step");
        assert!(matches!(
            err,
            SurveyError::WrongStep {
                expected: Step::Tool,
                actual: Step::Department
            }
        ));
        assert_eq!(wizard, before);
    }

    #[test]
    fn tool_from_other_department_rejected() {
        let catalog = Catalog::builtin();
        let mut wizard = WizardState::new();
        wizard.select_department(&catalog, "Finance").expect("department");
        assert!(matches!(
            wizard.select_tool(&catalog, "RA Invoice Tracker"),
            Err(SurveyError::UnknownTool { .. })
        ));
        assert_eq!(wizard.step(), Step::Tool);
    }

    #[test]
    fn short_system_number_blocks_advance() {
        let catalog = Catalog::builtin();
        let mut wizard = at_system_step(&catalog);
        assert!(wizard.enter_system_number(&catalog, "RVS1").is_err());
        assert_eq!(wizard.step(), Step::SystemNumber);
        assert_eq!(wizard.system_number(), None);
    }

    #[test]
    fn unlisted_system_number_blocks_advance() {
        let catalog = Catalog::builtin();
        let mut wizard = at_system_step(&catalog);
        assert!(matches!(
            wizard.enter_system_number(&catalog, "RVS0F5C"),
            Err(SurveyError::SystemNotInstalled { .. })
        ));
        assert_eq!(wizard.step(), Step::SystemNumber);
    }

    #[test]
    fn back_preserves_and_prefills() {
        let catalog = Catalog::builtin();
        let mut wizard = at_system_step(&catalog);
        wizard
            .enter_system_number(&catalog, "RVS120A")
            .expect("system");

        assert_eq!(wizard.back().expect("back"), Step::SystemNumber);
        assert_eq!(wizard.current_selection(), Some("RVS120A"));
        assert_eq!(wizard.back().expect("back"), Step::User);
        assert_eq!(wizard.current_selection(), Some("Anmol Dubey"));
        assert_eq!(wizard.system_number(), Some("RVS120A"));
    }

    #[test]
    fn changing_department_drops_dependent_answers() {
        let catalog = Catalog::builtin();
        let mut wizard = at_system_step(&catalog);
        for _ in 0..3 {
            wizard.back().expect("back");
        }
        assert_eq!(wizard.step(), Step::Department);

        wizard.select_department(&catalog, "CSD").expect("department");
        assert_eq!(wizard.tool(), None);
        assert_eq!(wizard.user(), None);
    }

    #[test]
    fn reselecting_same_department_keeps_answers() {
        let catalog = Catalog::builtin();
        let mut wizard = at_system_step(&catalog);
        for _ in 0..3 {
            wizard.back().expect("back");
        }

        wizard
            .select_department(&catalog, "Finance")
            .expect("department");
        assert_eq!(wizard.tool(), Some("SMS & Tally Fnf Reco"));
        assert_eq!(wizard.current_selection(), Some("SMS & Tally Fnf Reco"));
    }

    #[test]
    fn back_is_refused_at_the_ends() {
        let mut wizard = WizardState::new();
        assert!(matches!(
            wizard.back(),
            Err(SurveyError::CannotGoBack(Step::Department))
        ));
    }

    #[test]
    fn failed_submit_keeps_draft_and_step() {
        let catalog = Catalog::builtin();
        let mut wizard = at_system_step(&catalog);
        wizard
            .enter_system_number(&catalog, "RVS120A")
            .expect("system");

        let mut answers = BTreeMap::new();
        answers.insert("usage_duration".to_string(), Answer::text("1-3 months"));
        assert!(wizard.submit(&catalog, answers, now()).is_err());
        assert_eq!(wizard.step(), Step::Questions);
        assert_eq!(wizard.draft_answers().len(), 1);
    }

    #[test]
    fn reset_returns_to_start() {
        let catalog = Catalog::builtin();
        let mut wizard = at_system_step(&catalog);
        wizard.reset();
        assert_eq!(wizard, WizardState::new());
    }

    #[test]
    fn question_set_follows_selected_tool() {
        let catalog = Catalog::builtin();
        let mut wizard = WizardState::new();
        assert_eq!(wizard.question_set(&catalog), None);

        wizard.select_department(&catalog, "CSD").expect("department");
        wizard
            .select_tool(&catalog, "Realme Claim Update Tool")
            .expect("tool");
        assert_eq!(
            wizard.question_set(&catalog),
            Some(QuestionSetKind::Development)
        );
    }

    #[test]
    fn apply_dispatches_actions() {
        let catalog = Catalog::builtin();
        let mut wizard = WizardState::new();
        let produced = wizard
            .apply(
                &catalog,
                WizardAction::SelectDepartment {
                    department: "TSG".into(),
                },
                now(),
            )
            .expect("apply");
        assert!(produced.is_none());
        assert_eq!(wizard.step(), Step::Tool);

        wizard
            .apply(&catalog, WizardAction::Back, now())
            .expect("back");
        assert_eq!(wizard.step(), Step::Department);
        assert_eq!(wizard.department(), Some("TSG"));

        wizard
            .apply(&catalog, WizardAction::Reset, now())
            .expect("reset");
        assert_eq!(wizard.department(), None);
    }
}
