//! # Session Module
//!
//! Per-respondent state: the wizard plus the admin-authenticated flag.
//!
//! - One `SurveySession` per user session, passed explicitly to handlers
//! - Reset clears the wizard but keeps the admin flag
//! - The response log is shared and lives outside the session

use crate::wizard::{WizardAction, WizardState};
use crate::{Catalog, SurveyError, SurveyResponse};
use chrono::NaiveDateTime;

/// A user session.
#[derive(Debug, Clone, Default)]
pub struct SurveySession {
    wizard: WizardState,
    admin_authenticated: bool,
}

impl SurveySession {
    /// Create a new session at step 1, not authenticated.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a reference to the wizard.
    #[must_use]
    pub fn wizard(&self) -> &WizardState {
        &self.wizard
    }

    /// Apply a wizard action. See [`WizardState::apply`].
    pub fn apply(
        &mut self,
        catalog: &Catalog,
        action: WizardAction,
        now: NaiveDateTime,
    ) -> Result<Option<SurveyResponse>, SurveyError> {
        self.wizard.apply(catalog, action, now)
    }

    /// Start the survey over. The admin flag survives.
    pub fn reset(&mut self) {
        self.wizard.reset();
    }

    /// Whether the admin password was accepted in this session.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.admin_authenticated
    }

    /// Mark the session as admin-authenticated.
    pub fn grant_admin(&mut self) {
        self.admin_authenticated = true;
    }

    /// Log the admin out.
    pub fn revoke_admin(&mut self) {
        self.admin_authenticated = false;
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Step;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 11, 5)
            .and_then(|d| d.and_hms_opt(8, 0, 0))
            .expect("valid datetime")
    }

    #[test]
    fn reset_keeps_admin_flag() {
        let catalog = Catalog::builtin();
        let mut session = SurveySession::new();
        session.grant_admin();
        session
            .apply(
                &catalog,
                WizardAction::SelectDepartment {
                    department: "CSD".into(),
                },
                now(),
            )
            .expect("select");

        session.reset();
        assert!(session.is_admin());
        assert_eq!(session.wizard().step(), Step::Department);
        assert_eq!(session.wizard().department(), None);
    }

    #[test]
    fn reset_action_keeps_admin_flag() {
        let catalog = Catalog::builtin();
        let mut session = SurveySession::new();
        session.grant_admin();
        session
            .apply(&catalog, WizardAction::Reset, now())
            .expect("reset");
        assert!(session.is_admin());

        session.revoke_admin();
        assert!(!session.is_admin());
    }
}
