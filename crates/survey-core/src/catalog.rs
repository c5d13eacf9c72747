//! # Catalog
//!
//! The static lookup tables behind the survey:
//! - department → tool → ordered respondent names
//! - (department, tool) → allow-list of system numbers
//! - tool → question-set kind
//!
//! Departments and tools keep their declaration order so selectors list them
//! the way the catalog author wrote them. A catalog can be built in
//! ([`Catalog::builtin`]) or deserialized from a document; both go through
//! the same consistency checks.

use crate::{QuestionSetKind, SurveyError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// ENTRIES
// =============================================================================

/// One tool of a department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolEntry {
    /// Display name, unique within its department.
    pub name: String,
    /// Respondents allowed to answer for this tool. Duplicates are allowed
    /// and carry no identity beyond display.
    pub users: Vec<String>,
    /// System numbers the tool is installed on. Matching is exact.
    #[serde(default)]
    pub systems: BTreeSet<String>,
    /// Questionnaire answered by this tool's respondents.
    #[serde(default)]
    pub question_set: QuestionSetKind,
}

/// A department and its tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    /// Display name, unique within the catalog.
    pub name: String,
    /// Tools in declaration order.
    pub tools: Vec<ToolEntry>,
}

impl Department {
    /// Find a tool by exact name.
    #[must_use]
    pub fn tool(&self, name: &str) -> Option<&ToolEntry> {
        self.tools.iter().find(|t| t.name == name)
    }
}

/// Raw catalog document, before consistency checks.
#[derive(Debug, Deserialize)]
struct CatalogDocument {
    departments: Vec<Department>,
}

// =============================================================================
// CATALOG
// =============================================================================

/// Validated lookup tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CatalogDocument")]
pub struct Catalog {
    departments: Vec<Department>,
}

impl TryFrom<CatalogDocument> for Catalog {
    type Error = SurveyError;

    fn try_from(doc: CatalogDocument) -> Result<Self, Self::Error> {
        Self::new(doc.departments)
    }
}

impl Catalog {
    /// Build a catalog, checking that:
    /// - there is at least one department
    /// - department names are unique and non-empty
    /// - every department has at least one tool, with unique non-empty names
    /// - every tool lists at least one user
    pub fn new(departments: Vec<Department>) -> Result<Self, SurveyError> {
        if departments.is_empty() {
            return Err(SurveyError::InvalidCatalog(
                "catalog has no departments".to_string(),
            ));
        }

        let mut seen_departments = BTreeSet::new();
        for department in &departments {
            if department.name.trim().is_empty() {
                return Err(SurveyError::InvalidCatalog(
                    "department name is empty".to_string(),
                ));
            }
            if !seen_departments.insert(department.name.as_str()) {
                return Err(SurveyError::InvalidCatalog(format!(
                    "duplicate department '{}'",
                    department.name
                )));
            }
            if department.tools.is_empty() {
                return Err(SurveyError::InvalidCatalog(format!(
                    "department '{}' has no tools",
                    department.name
                )));
            }

            let mut seen_tools = BTreeSet::new();
            for tool in &department.tools {
                if tool.name.trim().is_empty() {
                    return Err(SurveyError::InvalidCatalog(format!(
                        "department '{}' has a tool with an empty name",
                        department.name
                    )));
                }
                if !seen_tools.insert(tool.name.as_str()) {
                    return Err(SurveyError::InvalidCatalog(format!(
                        "duplicate tool '{}' in department '{}'",
                        tool.name, department.name
                    )));
                }
                if tool.users.is_empty() {
                    return Err(SurveyError::InvalidCatalog(format!(
                        "tool '{}' in department '{}' has no users",
                        tool.name, department.name
                    )));
                }
            }
        }

        Ok(Self { departments })
    }

    /// All departments in declaration order.
    #[must_use]
    pub fn departments(&self) -> &[Department] {
        &self.departments
    }

    /// Department names in declaration order.
    pub fn department_names(&self) -> impl Iterator<Item = &str> {
        self.departments.iter().map(|d| d.name.as_str())
    }

    /// Find a department by exact name.
    #[must_use]
    pub fn department(&self, name: &str) -> Option<&Department> {
        self.departments.iter().find(|d| d.name == name)
    }

    /// Find a tool of a department.
    #[must_use]
    pub fn tool(&self, department: &str, tool: &str) -> Option<&ToolEntry> {
        self.department(department)?.tool(tool)
    }

    /// Tool names of a department, or `None` if the department is unknown.
    #[must_use]
    pub fn tool_names(&self, department: &str) -> Option<Vec<&str>> {
        self.department(department)
            .map(|d| d.tools.iter().map(|t| t.name.as_str()).collect())
    }

    /// Respondents of a tool, or `None` if the pair is unknown.
    #[must_use]
    pub fn users(&self, department: &str, tool: &str) -> Option<&[String]> {
        self.tool(department, tool).map(|t| t.users.as_slice())
    }

    /// Allow-list of a tool, or `None` if the pair is unknown.
    #[must_use]
    pub fn allowed_systems(&self, department: &str, tool: &str) -> Option<&BTreeSet<String>> {
        self.tool(department, tool).map(|t| &t.systems)
    }

    /// Question set bound to a tool, or `None` if the pair is unknown.
    #[must_use]
    pub fn question_set(&self, department: &str, tool: &str) -> Option<QuestionSetKind> {
        self.tool(department, tool).map(|t| t.question_set)
    }

    /// Every (department, tool) pair in declaration order.
    pub fn pairs(&self) -> impl Iterator<Item = (&Department, &ToolEntry)> {
        self.departments
            .iter()
            .flat_map(|d| d.tools.iter().map(move |t| (d, t)))
    }

    /// The catalog the survey ships with.
    ///
    /// Sentinel system values such as `"Not Installed "` (trailing space
    /// included) are kept verbatim: matching is exact.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            departments: vec![
                department(
                    "Finance",
                    vec![
                        tool(
                            "SMS & Tally Fnf Reco",
                            &["Anmol Dubey", "Shruti Dixit"],
                            &["RVS120A", "RVS1094"],
                            QuestionSetKind::Adoption,
                        ),
                        tool(
                            "Samsung Collections Reco",
                            &["NA", "NA"],
                            &["Not Installed"],
                            QuestionSetKind::Deployment,
                        ),
                    ],
                ),
                department(
                    "CSD",
                    vec![
                        tool(
                            "STN MIS Update Tool",
                            &["Inderjeet", "Dushyant Kumar"],
                            &["RVSBF0", "RVS0E77"],
                            QuestionSetKind::Adoption,
                        ),
                        tool(
                            "Realme Claim Update Tool",
                            &["Hari Kishan", "Mohit Senger"],
                            &["In Development"],
                            QuestionSetKind::Development,
                        ),
                        tool(
                            "RV SMS Claim Update Tool",
                            &["Hari Kishan", "Mohit Senger"],
                            &["In Development"],
                            QuestionSetKind::Development,
                        ),
                    ],
                ),
                department(
                    "TSG",
                    vec![
                        tool(
                            "RA Invoice Tracker",
                            &["Rekha Pujari", "Kokil Goswami", "Sonika"],
                            &["RVS0F5C", "RVS0F42", "RVS1034"],
                            QuestionSetKind::Adoption,
                        ),
                        tool(
                            "RA PO Extraction Tool",
                            &["NA", "NA"],
                            &["Not Installed ", "Not Installed"],
                            QuestionSetKind::Deployment,
                        ),
                        tool(
                            "Telecom RAN KPI",
                            &["NA", "NA"],
                            &["Developed but Not Installed ", "Developed but Not Installed"],
                            QuestionSetKind::Deployment,
                        ),
                    ],
                ),
            ],
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn department(name: &str, tools: Vec<ToolEntry>) -> Department {
    Department {
        name: name.to_string(),
        tools,
    }
}

fn tool(name: &str, users: &[&str], systems: &[&str], question_set: QuestionSetKind) -> ToolEntry {
    ToolEntry {
        name: name.to_string(),
        users: users.iter().map(|u| (*u).to_string()).collect(),
        systems: systems.iter().map(|s| (*s).to_string()).collect(),
        question_set,
    }
}

// =============================================================================
// TESTS
// =============================================================================
