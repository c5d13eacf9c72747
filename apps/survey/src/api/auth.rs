//! # Admin Authentication
//!
//! Password gate for the admin panel.
//!
//! ## Configuration
//!
//! - `SURVEY_ADMIN_PASSWORD`: the admin password. There is no built-in
//!   fallback: when the variable is unset or empty, every login is refused.
//!
//! A successful login marks the caller's survey session as admin; the flag
//! lives until logout or until the session is deleted.

use subtle::ConstantTimeEq;

/// Environment variable holding the admin password.
pub const ADMIN_PASSWORD_ENV: &str = "SURVEY_ADMIN_PASSWORD";

/// The admin password check.
#[derive(Clone, Default)]
pub struct AdminGate {
    password: Option<String>,
}

impl std::fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminGate")
            .field("configured", &self.is_configured())
            .finish()
    }
}

impl AdminGate {
    /// Create a gate. An empty password counts as unset.
    #[must_use]
    pub fn new(password: Option<String>) -> Self {
        Self {
            password: password.filter(|p| !p.is_empty()),
        }
    }

    /// Create a gate from `SURVEY_ADMIN_PASSWORD`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(std::env::var(ADMIN_PASSWORD_ENV).ok())
    }

    /// Whether a password is configured. An unconfigured gate refuses all logins.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.password.is_some()
    }

    /// Check a candidate password.
    pub fn verify(&self, candidate: &str) -> bool {
        let Some(expected) = &self.password else {
            return false;
        };

        // Pad both sides to the same length so ct_eq always runs over the
        // same number of bytes and the length does not leak through timing.
        let provided = candidate.as_bytes();
        let expected = expected.as_bytes();
        let max_len = provided.len().max(expected.len());
        let mut padded_provided = vec![0u8; max_len];
        let mut padded_expected = vec![0u8; max_len];
        padded_provided[..provided.len()].copy_from_slice(provided);
        padded_expected[..expected.len()].copy_from_slice(expected);

        let bytes_match: bool = padded_provided.ct_eq(&padded_expected).into();
        bytes_match && provided.len() == expected.len()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_gate_refuses_everything() {
        let gate = AdminGate::new(None);
        assert!(!gate.is_configured());
        assert!(!gate.verify(""));
        assert!(!gate.verify("admin123"));
    }

    #[test]
    fn empty_password_counts_as_unset() {
        let gate = AdminGate::new(Some(String::new()));
        assert!(!gate.is_configured());
        assert!(!gate.verify(""));
    }

    #[test]
    fn exact_password_only() {
        let gate = AdminGate::new(Some("s3cret".to_string()));
        assert!(gate.verify("s3cret"));
        assert!(!gate.verify("s3cre"));
        assert!(!gate.verify("s3cret "));
        assert!(!gate.verify("S3CRET"));
        assert!(!gate.verify("s3cret\0"));
    }

    #[test]
    fn debug_does_not_print_password() {
        let gate = AdminGate::new(Some("s3cret".to_string()));
        assert!(!format!("{:?}", gate).contains("s3cret"));
    }
}
