//! # Validator
//!
//! The two gates of the wizard:
//! - step 4: the system number must be long enough AND on the tool's
//!   allow-list before the respondent may continue
//! - step 5: every required question of the active set must be answered
//!   before the response may be submitted
//!
//! Validation is pure; it never mutates wizard state.

use crate::primitives::{
    MAX_SYSTEM_NUMBER_LENGTH, MAX_TEXT_ANSWER_LENGTH, MIN_SYSTEM_NUMBER_LENGTH,
    MULTI_SELECT_SEPARATOR,
};
use crate::questions::{Question, QuestionKind, QuestionSet};
use crate::{Answer, Catalog, SurveyError};
use std::collections::BTreeMap;

// =============================================================================
// SYSTEM NUMBER
// =============================================================================

/// Whether the system number has the minimum length.
///
/// Length is counted in characters, not bytes.
#[must_use]
pub fn is_valid_format(system_number: &str) -> bool {
    system_number.chars().count() >= MIN_SYSTEM_NUMBER_LENGTH
}

/// Whether the system number is on the allow-list of (department, tool).
///
/// Matching is exact and case-sensitive. Unknown departments or tools have
/// an empty allow-list.
#[must_use]
pub fn is_valid_system(catalog: &Catalog, department: &str, tool: &str, system_number: &str) -> bool {
    catalog
        .allowed_systems(department, tool)
        .is_some_and(|systems| systems.contains(system_number))
}

/// Check a system number, reporting the first failed rule.
///
/// The length rule is reported before the allow-list rule.
pub fn validate_system_number(
    catalog: &Catalog,
    department: &str,
    tool: &str,
    system_number: &str,
) -> Result<(), SurveyError> {
    if system_number.chars().count() > MAX_SYSTEM_NUMBER_LENGTH {
        return Err(SurveyError::SystemNumberTooLong {
            max: MAX_SYSTEM_NUMBER_LENGTH,
        });
    }
    if !is_valid_format(system_number) {
        return Err(SurveyError::SystemNumberTooShort {
            min: MIN_SYSTEM_NUMBER_LENGTH,
        });
    }
    if !is_valid_system(catalog, department, tool, system_number) {
        return Err(SurveyError::SystemNotInstalled {
            tool: tool.to_string(),
            system_number: system_number.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// ANSWERS
// =============================================================================

/// Validate answers against a question set and flatten them to text cells.
///
/// Returns one `(key, value)` pair per question, in question order.
/// Optional questions left blank yield an empty string; scale questions left
/// blank take their default.
pub fn validate_answers(
    set: &QuestionSet,
    answers: &BTreeMap<String, Answer>,
) -> Result<Vec<(String, String)>, SurveyError> {
    if let Some(unknown) = answers.keys().find(|k| set.question(k).is_none()) {
        return Err(SurveyError::UnknownQuestion(unknown.clone()));
    }

    let mut fields = Vec::with_capacity(set.questions.len());
    for question in set.questions {
        let value = match answers.get(question.key).filter(|a| !a.is_blank()) {
            Some(answer) => flatten_answer(question, answer)?,
            None => match question.kind {
                QuestionKind::Scale { default, .. } => default.to_string(),
                _ if question.required => {
                    return Err(SurveyError::MissingAnswer {
                        key: question.key.to_string(),
                        message: question.missing_message.to_string(),
                    });
                }
                _ => String::new(),
            },
        };
        fields.push((question.key.to_string(), value));
    }
    Ok(fields)
}

/// Check a single non-blank answer against its question.
fn flatten_answer(question: &Question, answer: &Answer) -> Result<String, SurveyError> {
    let key = question.key;
    match (question.kind, answer) {
        (
            QuestionKind::SingleChoice { options } | QuestionKind::OrderedChoice { options },
            Answer::Text(value),
        ) => {
            if options.contains(&value.as_str()) {
                Ok(value.clone())
            } else {
                Err(invalid_choice(key, value))
            }
        }
        (QuestionKind::SingleChoice { .. } | QuestionKind::OrderedChoice { .. }, _) => {
            Err(mismatch(key, "a single option"))
        }

        (QuestionKind::MultiChoice { options }, Answer::List(items)) => {
            let mut picked: Vec<&str> = Vec::with_capacity(items.len());
            for item in items.iter().map(String::as_str) {
                if item.trim().is_empty() {
                    continue;
                }
                if !options.contains(&item) {
                    return Err(invalid_choice(key, item));
                }
                if !picked.contains(&item) {
                    picked.push(item);
                }
            }
            Ok(picked.join(MULTI_SELECT_SEPARATOR))
        }
        (QuestionKind::MultiChoice { .. }, _) => Err(mismatch(key, "a list of options")),

        (QuestionKind::Scale { min, max, .. }, Answer::Number(value)) => {
            if (min..=max).contains(value) {
                Ok(value.to_string())
            } else {
                Err(SurveyError::ScaleOutOfRange {
                    key: key.to_string(),
                    value: *value,
                    min,
                    max,
                })
            }
        }
        (QuestionKind::Scale { .. }, _) => Err(mismatch(key, "a number")),

        (QuestionKind::FreeText, Answer::Text(text)) => {
            if text.chars().count() > MAX_TEXT_ANSWER_LENGTH {
                return Err(SurveyError::AnswerTooLong {
                    key: key.to_string(),
                    max: MAX_TEXT_ANSWER_LENGTH,
                });
            }
            Ok(text.trim().to_string())
        }
        (QuestionKind::FreeText, _) => Err(mismatch(key, "text")),
    }
}

fn invalid_choice(key: &str, value: &str) -> SurveyError {
    SurveyError::InvalidChoice {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn mismatch(key: &str, expected: &'static str) -> SurveyError {
    SurveyError::AnswerTypeMismatch {
        key: key.to_string(),
        expected,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QuestionSetKind;

    fn adoption_answers() -> BTreeMap<String, Answer> {
        let mut answers = BTreeMap::new();
        answers.insert("usage_duration".into(), Answer::text("1-3 months"));
        answers.insert("satisfaction".into(), Answer::Number(4));
        answers.insert(
            "valuable_features".into(),
            Answer::list(["Easy to use", "Improves accuracy"]),
        );
        answers.insert("time_saved".into(), Answer::text("1-2 hours"));
        answers.insert("automation_percentage".into(), Answer::text("51-75%"));
        answers.insert("time_utilization".into(), Answer::text("Reconciliations"));
        answers.insert("error_reduction".into(), Answer::text("Yes"));
        answers.insert("job_satisfaction".into(), Answer::text("Positively"));
        answers
    }

    fn adoption() -> &'static QuestionSet {
        QuestionSetKind::Adoption.question_set()
    }

    #[test]
    fn finance_example_system_numbers() {
        let catalog = Catalog::builtin();
        let (dept, tool) = ("Finance", "SMS & Tally Fnf Reco");

        assert!(validate_system_number(&catalog, dept, tool, "RVS120A").is_ok());
        assert!(matches!(
            validate_system_number(&catalog, dept, tool, "XXXX"),
            Err(SurveyError::SystemNumberTooShort { min: 5 })
        ));
        assert!(matches!(
            validate_system_number(&catalog, dept, tool, "XXXXX"),
            Err(SurveyError::SystemNotInstalled { .. })
        ));
    }

    #[test]
    fn allow_list_is_case_sensitive() {
        let catalog = Catalog::builtin();
        assert!(!is_valid_system(&catalog, "Finance", "SMS & Tally Fnf Reco", "rvs120a"));
        assert!(!is_valid_system(&catalog, "Finance", "SMS & Tally Fnf Reco", "RVS120A "));
    }

    #[test]
    fn unknown_pair_has_empty_allow_list() {
        let catalog = Catalog::builtin();
        assert!(!is_valid_system(&catalog, "Finance", "RA Invoice Tracker", "RVS0F5C"));
        assert!(!is_valid_system(&catalog, "HR", "Payroll", "RVS0F5C"));
    }

    #[test]
    fn format_counts_characters() {
        assert!(!is_valid_format(""));
        assert!(!is_valid_format("ABCD"));
        assert!(is_valid_format("ABCDE"));
        assert!(!is_valid_format("ÄÖÜß"));
    }

    #[test]
    fn overlong_system_number_rejected() {
        let catalog = Catalog::builtin();
        let long = "R".repeat(MAX_SYSTEM_NUMBER_LENGTH + 1);
        assert!(matches!(
            validate_system_number(&catalog, "Finance", "SMS & Tally Fnf Reco", &long),
            Err(SurveyError::SystemNumberTooLong { .. })
        ));
    }

    #[test]
    fn complete_answers_flatten_in_question_order() {
        let fields = validate_answers(adoption(), &adoption_answers()).expect("valid");
        let keys: Vec<_> = fields.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, adoption().keys().collect::<Vec<_>>());

        let features = fields
            .iter()
            .find(|(k, _)| k == "valuable_features")
            .map(|(_, v)| v.as_str());
        assert_eq!(features, Some("Easy to use, Improves accuracy"));

        let suggestions = fields.iter().find(|(k, _)| k == "suggestions");
        assert_eq!(suggestions.map(|(_, v)| v.as_str()), Some(""));
    }

    #[test]
    fn empty_feature_selection_rejected() {
        let mut answers = adoption_answers();
        answers.insert("valuable_features".into(), Answer::List(vec![]));

        let err = validate_answers(adoption(), &answers).expect_err("must reject");
        assert_eq!(err.to_string(), "Please select at least one valuable feature");
    }

    #[test]
    fn missing_required_text_rejected() {
        let mut answers = adoption_answers();
        answers.insert("time_utilization".into(), Answer::text("  "));
        assert!(matches!(
            validate_answers(adoption(), &answers),
            Err(SurveyError::MissingAnswer { key, .. }) if key == "time_utilization"
        ));
    }

    #[test]
    fn omitted_scale_takes_default() {
        let mut answers = adoption_answers();
        answers.remove("satisfaction");
        let fields = validate_answers(adoption(), &answers).expect("valid");
        assert!(fields.contains(&("satisfaction".to_string(), "3".to_string())));
    }

    #[test]
    fn scale_out_of_range_rejected() {
        let mut answers = adoption_answers();
        answers.insert("satisfaction".into(), Answer::Number(6));
        assert!(matches!(
            validate_answers(adoption(), &answers),
            Err(SurveyError::ScaleOutOfRange { value: 6, .. })
        ));
    }

    #[test]
    fn choice_outside_options_rejected() {
        let mut answers = adoption_answers();
        answers.insert("error_reduction".into(), Answer::text("Maybe"));
        assert!(matches!(
            validate_answers(adoption(), &answers),
            Err(SurveyError::InvalidChoice { .. })
        ));
    }

    #[test]
    fn wrong_answer_shape_rejected() {
        let mut answers = adoption_answers();
        answers.insert("valuable_features".into(), Answer::text("Other"));
        assert!(matches!(
            validate_answers(adoption(), &answers),
            Err(SurveyError::AnswerTypeMismatch { .. })
        ));
    }

    #[test]
    fn unknown_question_rejected() {
        let mut answers = adoption_answers();
        answers.insert("rollout_blockers".into(), Answer::list(["Other"]));
        assert!(matches!(
            validate_answers(adoption(), &answers),
            Err(SurveyError::UnknownQuestion(k)) if k == "rollout_blockers"
        ));
    }

    #[test]
    fn duplicate_selections_collapse() {
        let mut answers = adoption_answers();
        answers.insert("valuable_features".into(), Answer::list(["Other", "Other"]));
        let fields = validate_answers(adoption(), &answers).expect("valid");
        assert!(fields.contains(&("valuable_features".to_string(), "Other".to_string())));
    }
}
