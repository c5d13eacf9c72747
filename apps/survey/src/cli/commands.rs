//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api::{self, AdminGate, AppState, NO_RESPONSES_MESSAGE};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use survey_core::{Catalog, ResponseLog, SurveyError, validate_system_number};

// =============================================================================
// FILE VALIDATION
// =============================================================================

/// Maximum catalog file size (1 MB).
const MAX_CATALOG_FILE_SIZE: u64 = 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), SurveyError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| SurveyError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(SurveyError::SerializationError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Resolve an input path: symlinks and `..` are resolved and the target
/// must be a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, SurveyError> {
    let canonical = path.canonicalize().map_err(|e| {
        SurveyError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(SurveyError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Resolve an output path: the parent directory must exist.
fn validate_output_path(path: &Path) -> Result<PathBuf, SurveyError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        SurveyError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(SurveyError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| SurveyError::IoError("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

// =============================================================================
// LOADING
// =============================================================================

/// Load the catalog: the TOML file when given, the built-in tables otherwise.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog, SurveyError> {
    let Some(path) = path else {
        return Ok(Catalog::builtin());
    };

    let path = validate_file_path(path)?;
    validate_file_size(&path, MAX_CATALOG_FILE_SIZE)?;
    let text = std::fs::read_to_string(&path)
        .map_err(|e| SurveyError::IoError(format!("Read catalog: {}", e)))?;
    toml::from_str::<Catalog>(&text).map_err(|e| SurveyError::InvalidCatalog(e.to_string()))
}

/// Load the response log for the server.
///
/// Unless `memory_only`, previous responses are restored from `path` and
/// every new response is written back to it. A file that cannot be loaded
/// is moved aside to `<path>.unreadable-<time>` and the server starts with
/// an empty log on the same path; if the move fails too, the log stays in
/// memory so the unreadable file is never overwritten.
pub fn load_response_log(path: &Path, memory_only: bool) -> ResponseLog {
    if memory_only {
        return ResponseLog::new();
    }

    let error = match ResponseLog::open(path) {
        Ok(log) => return log,
        Err(e) => e,
    };

    let mut aside = path.as_os_str().to_os_string();
    aside.push(format!(
        ".unreadable-{}",
        chrono::Local::now().format("%Y%m%d%H%M%S")
    ));
    let aside = PathBuf::from(aside);

    match std::fs::rename(path, &aside) {
        Ok(()) => {
            tracing::warn!(
                event = "response_log_unreadable",
                error = %error,
                moved_to = %aside.display(),
                "Response log could not be loaded; starting with an empty log"
            );
            ResponseLog::with_mirror(path)
        }
        Err(move_error) => {
            tracing::warn!(
                event = "response_log_unreadable",
                error = %error,
                move_error = %move_error,
                "Response log could not be loaded or moved; keeping responses in memory only"
            );
            ResponseLog::new()
        }
    }
}

fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(
    catalog: Catalog,
    responses_path: &Path,
    memory_only: bool,
    host: &str,
    port: u16,
) -> Result<(), SurveyError> {
    let log = load_response_log(responses_path, memory_only);
    let admin = AdminGate::from_env();

    println!("Survey Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:        {}", host);
    println!("  Port:        {}", port);
    if memory_only {
        println!("  Responses:   in memory only");
    } else {
        println!("  Responses:   {:?}", responses_path);
    }
    println!("  Restored:    {}", log.len());
    println!(
        "  Admin panel: {}",
        if admin.is_configured() {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!();
    println!("Endpoints:");
    println!("  POST /sessions                   - Start a survey");
    println!("  POST /sessions/{{id}}/actions      - Apply a wizard action");
    println!("  POST /sessions/{{id}}/admin/login  - Admin login");
    println!("  GET  /status                     - Server status");
    println!("  GET  /health                     - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let state = AppState::new(catalog, log, admin);
    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, state).await
}

// =============================================================================
// CATALOG COMMAND
// =============================================================================

/// List departments, tools, users and allowed systems.
pub fn cmd_catalog(catalog: &Catalog, json_mode: bool) -> Result<(), SurveyError> {
    if json_mode {
        let value = serde_json::to_value(catalog.departments())
            .map_err(|e| SurveyError::SerializationError(e.to_string()))?;
        print_json(&serde_json::json!({ "departments": value }));
        return Ok(());
    }

    println!("Survey Catalog");
    println!("==============");
    for department in catalog.departments() {
        println!();
        println!("{}", department.name);
        for tool in &department.tools {
            println!("  {} [{}]", tool.name, tool.question_set);
            println!("    Users:   {}", tool.users.join(", "));
            let systems: Vec<String> = tool.systems.iter().map(|s| format!("{:?}", s)).collect();
            println!("    Systems: {}", systems.join(", "));
        }
    }

    Ok(())
}

// =============================================================================
// CHECK-SYSTEM COMMAND
// =============================================================================

/// Validate a system number. An invalid number is reported as an error.
pub fn cmd_check_system(
    catalog: &Catalog,
    json_mode: bool,
    department: &str,
    tool: &str,
    system_number: &str,
) -> Result<(), SurveyError> {
    let result = validate_system_number(catalog, department, tool, system_number);

    if json_mode {
        print_json(&serde_json::json!({
            "department": department,
            "tool": tool,
            "system_number": system_number,
            "valid": result.is_ok(),
            "error": result.as_ref().err().map(ToString::to_string),
        }));
    } else if result.is_ok() {
        println!("System {} is valid for '{}'", system_number, tool);
    }

    result
}

// =============================================================================
// RESPONSES COMMAND
// =============================================================================

/// Show collected responses.
pub fn cmd_responses(path: &Path, json_mode: bool, all: bool) -> Result<(), SurveyError> {
    let log = ResponseLog::open(path)?;

    let mut by_set: BTreeMap<String, usize> = BTreeMap::new();
    for record in log.records() {
        *by_set.entry(record.question_set().to_string()).or_default() += 1;
    }
    let latest = log.records().iter().map(|r| r.submitted_at()).max();

    if json_mode {
        let mut output = serde_json::json!({
            "responses": path.to_string_lossy(),
            "count": log.len(),
            "by_question_set": by_set,
            "latest": latest.map(|t| t.to_string()),
        });
        if all {
            let table = serde_json::to_value(log.table())
                .map_err(|e| SurveyError::SerializationError(e.to_string()))?;
            output["table"] = table;
        }
        print_json(&output);
        return Ok(());
    }

    println!("Survey Responses");
    println!("================");
    println!("File:  {:?}", path);
    println!();

    if log.is_empty() {
        println!("{}", NO_RESPONSES_MESSAGE);
        return Ok(());
    }

    println!("Total: {}", log.len());
    for (set, count) in &by_set {
        println!("  {:<12} {}", set, count);
    }
    if let Some(latest) = latest {
        println!("Latest: {}", latest);
    }

    if all {
        let table = log.table();
        println!();
        println!("{}", table.columns.join(" | "));
        for row in &table.rows {
            println!("{}", row.join(" | "));
        }
    }

    Ok(())
}

// =============================================================================
// EXPORT COMMAND
// =============================================================================

/// Write the response log to `output` as spreadsheet-safe CSV.
pub fn cmd_export(path: &Path, output: &Path) -> Result<(), SurveyError> {
    let log = ResponseLog::open(path)?;
    let output = validate_output_path(output)?;

    std::fs::write(&output, log.export_csv())
        .map_err(|e| SurveyError::IoError(format!("Write export: {}", e)))?;

    println!("Exported {} responses to {:?}", log.len(), output);
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
