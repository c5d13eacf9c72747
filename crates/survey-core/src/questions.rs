//! # Question Sets
//!
//! The three questionnaires shown at step 5. Which one a respondent sees is
//! decided by the tool they picked (see [`crate::Catalog::question_set`]).
//!
//! Question keys double as CSV column names, so they must never collide with
//! the fixed response columns (`department`, `tool`, ...).

use crate::QuestionSetKind;

// =============================================================================
// QUESTION MODEL
// =============================================================================

/// Input shape of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    /// Pick exactly one option (radio buttons).
    SingleChoice { options: &'static [&'static str] },
    /// Pick exactly one option from an ordered range (slider over labels).
    OrderedChoice { options: &'static [&'static str] },
    /// Pick any number of options.
    MultiChoice { options: &'static [&'static str] },
    /// Integer scale with an inclusive range and a default position.
    Scale { min: i64, max: i64, default: i64 },
    /// Free text.
    FreeText,
}

impl QuestionKind {
    /// Options offered by choice questions; empty otherwise.
    #[must_use]
    pub const fn options(&self) -> &'static [&'static str] {
        match self {
            Self::SingleChoice { options }
            | Self::OrderedChoice { options }
            | Self::MultiChoice { options } => *options,
            Self::Scale { .. } | Self::FreeText => &[],
        }
    }

    /// Short name of the input shape.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SingleChoice { .. } => "single_choice",
            Self::OrderedChoice { .. } => "ordered_choice",
            Self::MultiChoice { .. } => "multi_choice",
            Self::Scale { .. } => "scale",
            Self::FreeText => "free_text",
        }
    }
}

/// One question of a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    /// Stable key; also the CSV column name.
    pub key: &'static str,
    /// Section heading the question is grouped under.
    pub section: &'static str,
    /// Prompt shown to the respondent.
    pub prompt: &'static str,
    /// Input shape.
    pub kind: QuestionKind,
    /// Whether submission is blocked while this question is empty.
    pub required: bool,
    /// Message shown when a required answer is missing.
    pub missing_message: &'static str,
}

/// A named questionnaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionSet {
    pub kind: QuestionSetKind,
    pub title: &'static str,
    pub questions: &'static [Question],
}

impl QuestionSet {
    /// Find a question by key.
    #[must_use]
    pub fn question(&self, key: &str) -> Option<&'static Question> {
        self.questions.iter().find(|q| q.key == key)
    }

    /// Question keys in display order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> {
        self.questions.iter().map(|q| q.key)
    }
}

impl QuestionSetKind {
    /// The questionnaire for this kind.
    #[must_use]
    pub fn question_set(self) -> &'static QuestionSet {
        match self {
            Self::Adoption => &ADOPTION,
            Self::Development => &DEVELOPMENT,
            Self::Deployment => &DEPLOYMENT,
        }
    }
}

// =============================================================================
// SHARED OPTION LISTS
// =============================================================================

const VALUE_OPTIONS: &[&str] = &[
    "Easy to use",
    "Reduces manual work",
    "Improves accuracy",
    "Speeds up processes",
    "Other",
];

const DAILY_TIME_OPTIONS: &[&str] = &[
    "30-60 minutes",
    "1-2 hours",
    "2-4 hours",
    "More than 4 hours",
];

const SATISFACTION_SCALE: QuestionKind = QuestionKind::Scale {
    min: 1,
    max: 5,
    default: 3,
};

const ADDITIONAL_FEEDBACK: Question = Question {
    key: "additional_feedback",
    section: "Feedback",
    prompt: "Please share any additional comments or feedback about your experience with the automation tool: (Optional)",
    kind: QuestionKind::FreeText,
    required: false,
    missing_message: "",
};

// =============================================================================
// ADOPTION (tool in daily use)
// =============================================================================

static ADOPTION: QuestionSet = QuestionSet {
    kind: QuestionSetKind::Adoption,
    title: "Tool Usage and Impact",
    questions: &[
        Question {
            key: "usage_duration",
            section: "Tool Usage and Satisfaction",
            prompt: "How long have you been using this tool?",
            kind: QuestionKind::SingleChoice {
                options: &["Less than 1 month", "1-3 months", "More than 3 months"],
            },
            required: true,
            missing_message: "Please tell us how long you have been using the tool",
        },
        Question {
            key: "satisfaction",
            section: "Tool Usage and Satisfaction",
            prompt: "On a scale of 1-5, how satisfied are you with the tool? (1 = Very Dissatisfied, 5 = Very Satisfied)",
            kind: SATISFACTION_SCALE,
            required: true,
            missing_message: "Please rate your satisfaction",
        },
        Question {
            key: "valuable_features",
            section: "Tool Usage and Satisfaction",
            prompt: "What aspects of the tool do you find most valuable? (Select all that apply)",
            kind: QuestionKind::MultiChoice {
                options: VALUE_OPTIONS,
            },
            required: true,
            missing_message: "Please select at least one valuable feature",
        },
        Question {
            key: "time_saved",
            section: "Time and Productivity Impact",
            prompt: "On average, how much time do you save daily by using this tool?",
            kind: QuestionKind::OrderedChoice {
                options: DAILY_TIME_OPTIONS,
            },
            required: true,
            missing_message: "Please select how much time you save daily",
        },
        Question {
            key: "automation_percentage",
            section: "Time and Productivity Impact",
            prompt: "What percentage of your previous manual tasks has been automated?",
            kind: QuestionKind::OrderedChoice {
                options: &["0-25%", "26-50%", "51-75%", "76-100%"],
            },
            required: true,
            missing_message: "Please select how much of your work has been automated",
        },
        Question {
            key: "time_utilization",
            section: "Time and Productivity Impact",
            prompt: "How are you utilizing the time saved through automation?",
            kind: QuestionKind::FreeText,
            required: true,
            missing_message: "Please describe how you use the time saved",
        },
        Question {
            key: "error_reduction",
            section: "Process Improvement",
            prompt: "Have you noticed any reduction in errors since using the automation tool?",
            kind: QuestionKind::SingleChoice {
                options: &["Yes", "No", "Errors have increased"],
            },
            required: true,
            missing_message: "Please tell us whether errors have been reduced",
        },
        Question {
            key: "suggestions",
            section: "Process Improvement",
            prompt: "Do you have any suggestions for improving the tool?",
            kind: QuestionKind::FreeText,
            required: false,
            missing_message: "",
        },
        Question {
            key: "job_satisfaction",
            section: "Process Improvement",
            prompt: "How has the automation tool affected your job satisfaction?",
            kind: QuestionKind::SingleChoice {
                options: &["Positively", "No Change", "Negatively"],
            },
            required: true,
            missing_message: "Please tell us how the tool affected your job satisfaction",
        },
        ADDITIONAL_FEEDBACK,
    ],
};

// =============================================================================
// DEVELOPMENT (tool still being built)
// =============================================================================

static DEVELOPMENT: QuestionSet = QuestionSet {
    kind: QuestionSetKind::Development,
    title: "Upcoming Tool Expectations",
    questions: &[
        Question {
            key: "development_awareness",
            section: "Development Status",
            prompt: "Are you aware of the current development status of this tool?",
            kind: QuestionKind::SingleChoice {
                options: &["Yes", "Partially", "No"],
            },
            required: true,
            missing_message: "Please tell us whether you know the development status",
        },
        Question {
            key: "current_manual_effort",
            section: "Current Workload",
            prompt: "How much time do you currently spend daily on the work this tool will automate?",
            kind: QuestionKind::OrderedChoice {
                options: DAILY_TIME_OPTIONS,
            },
            required: true,
            missing_message: "Please select how much time the manual work takes",
        },
        Question {
            key: "expected_features",
            section: "Expectations",
            prompt: "What do you expect to value most in the finished tool? (Select all that apply)",
            kind: QuestionKind::MultiChoice {
                options: VALUE_OPTIONS,
            },
            required: true,
            missing_message: "Please select at least one expected benefit",
        },
        Question {
            key: "confidence",
            section: "Expectations",
            prompt: "On a scale of 1-5, how confident are you that the tool will meet your needs? (1 = Not Confident, 5 = Very Confident)",
            kind: SATISFACTION_SCALE,
            required: true,
            missing_message: "Please rate your confidence",
        },
        Question {
            key: "requirements",
            section: "Expectations",
            prompt: "Are there requirements the development team should know about?",
            kind: QuestionKind::FreeText,
            required: false,
            missing_message: "",
        },
        ADDITIONAL_FEEDBACK,
    ],
};

// =============================================================================
// DEPLOYMENT (tool built but not installed)
// =============================================================================

static DEPLOYMENT: QuestionSet = QuestionSet {
    kind: QuestionSetKind::Deployment,
    title: "Rollout Readiness",
    questions: &[
        Question {
            key: "installation_awareness",
            section: "Installation Status",
            prompt: "Were you aware that this tool is not yet installed on your system?",
            kind: QuestionKind::SingleChoice {
                options: &["Yes", "No"],
            },
            required: true,
            missing_message: "Please tell us whether you knew the tool is not installed",
        },
        Question {
            key: "rollout_urgency",
            section: "Installation Status",
            prompt: "How soon do you need the tool installed?",
            kind: QuestionKind::OrderedChoice {
                options: &[
                    "Within a week",
                    "Within a month",
                    "Within a quarter",
                    "Not needed",
                ],
            },
            required: true,
            missing_message: "Please select how soon you need the tool",
        },
        Question {
            key: "rollout_blockers",
            section: "Rollout",
            prompt: "What is holding back the rollout on your side? (Select all that apply)",
            kind: QuestionKind::MultiChoice {
                options: &[
                    "Awaiting IT installation",
                    "System compatibility",
                    "Training not completed",
                    "Access permissions",
                    "Other",
                ],
            },
            required: true,
            missing_message: "Please select at least one rollout blocker",
        },
        Question {
            key: "current_manual_effort",
            section: "Current Workload",
            prompt: "How much time do you currently spend daily on the work this tool automates?",
            kind: QuestionKind::OrderedChoice {
                options: DAILY_TIME_OPTIONS,
            },
            required: true,
            missing_message: "Please select how much time the manual work takes",
        },
        Question {
            key: "training_needed",
            section: "Rollout",
            prompt: "Will you need training before using the tool?",
            kind: QuestionKind::SingleChoice {
                options: &["Yes", "No"],
            },
            required: true,
            missing_message: "Please tell us whether you need training",
        },
        ADDITIONAL_FEEDBACK,
    ],
};

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::FIXED_COLUMNS;
    use std::collections::BTreeSet;

    const ALL_KINDS: [QuestionSetKind; 3] = [
        QuestionSetKind::Adoption,
        QuestionSetKind::Development,
        QuestionSetKind::Deployment,
    ];

    #[test]
    fn each_kind_maps_to_its_own_set() {
        for kind in ALL_KINDS {
            assert_eq!(kind.question_set().kind, kind);
        }
    }

    #[test]
    fn keys_are_unique_within_a_set() {
        for kind in ALL_KINDS {
            let set = kind.question_set();
            let keys: BTreeSet<_> = set.keys().collect();
            assert_eq!(keys.len(), set.questions.len(), "{kind}");
        }
    }

    #[test]
    fn keys_never_shadow_fixed_columns() {
        for kind in ALL_KINDS {
            for key in kind.question_set().keys() {
                assert!(!FIXED_COLUMNS.contains(&key), "{key} in {kind}");
            }
        }
    }

    #[test]
    fn required_questions_have_a_message() {
        for kind in ALL_KINDS {
            for q in kind.question_set().questions {
                assert_eq!(q.required, !q.missing_message.is_empty(), "{}", q.key);
            }
        }
    }

    #[test]
    fn scale_defaults_lie_in_range() {
        for kind in ALL_KINDS {
            for q in kind.question_set().questions {
                if let QuestionKind::Scale { min, max, default } = q.kind {
                    assert!(min <= default && default <= max, "{}", q.key);
                }
            }
        }
    }

    #[test]
    fn adoption_matches_the_usage_questionnaire() {
        let keys: Vec<_> = QuestionSetKind::Adoption.question_set().keys().collect();
        assert_eq!(
            keys,
            vec![
                "usage_duration",
                "satisfaction",
                "valuable_features",
                "time_saved",
                "automation_percentage",
                "time_utilization",
                "error_reduction",
                "suggestions",
                "job_satisfaction",
                "additional_feedback",
            ]
        );
    }
}
