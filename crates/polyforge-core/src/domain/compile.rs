//! Compilation check results.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::diagnostic::{Diagnostic, Severity};
use crate::language::Language;

/// Aggregate counts over a compile report's diagnostics.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ErrorSummary {
    pub total_errors: usize,
    pub total_warnings: usize,
    pub critical_errors: usize,
    pub fixable_errors: usize,
    /// Distinct error kinds, sorted.
    pub error_types: Vec<String>,
    /// Distinct warning kinds, sorted.
    pub warning_types: Vec<String>,
    /// Error category -> count.
    pub error_categories: BTreeMap<String, usize>,
}

impl ErrorSummary {
    /// Summarize a set of errors and warnings.
    pub fn from_diagnostics(errors: &[Diagnostic], warnings: &[Diagnostic]) -> Self {
        let critical_errors = errors
            .iter()
            .filter(|e| e.severity == Severity::Critical)
            .count();
        let fixable_errors = errors.iter().filter(|e| e.kind.is_fixable()).count();

        let error_types: BTreeSet<&str> = errors.iter().map(|e| e.kind.as_str()).collect();
        let warning_types: BTreeSet<&str> = warnings.iter().map(|w| w.kind.as_str()).collect();

        let mut error_categories = BTreeMap::new();
        for error in errors {
            if let Some(category) = &error.category {
                *error_categories.entry(category.clone()).or_insert(0) += 1;
            }
        }

        Self {
            total_errors: errors.len(),
            total_warnings: warnings.len(),
            critical_errors,
            fixable_errors,
            error_types: error_types.into_iter().map(str::to_string).collect(),
            warning_types: warning_types.into_iter().map(str::to_string).collect(),
            error_categories,
        }
    }
}

/// Result of checking whether a project compiles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompileReport {
    pub success: bool,
    pub language: Language,
    pub project_dir: PathBuf,
    /// Commands that were executed, one argv per invocation.
    pub commands: Vec<Vec<String>>,
    /// Captured stdout (concatenated across invocations).
    pub output: String,
    /// Captured stderr (concatenated across invocations).
    pub error_output: String,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    pub files_checked: Vec<PathBuf>,
    pub timestamp: DateTime<Utc>,
    pub summary: ErrorSummary,
}

impl CompileReport {
    /// Create an empty (not yet successful) report.
    pub fn new(language: Language, project_dir: PathBuf) -> Self {
        Self {
            success: false,
            language,
            project_dir,
            commands: Vec::new(),
            output: String::new(),
            error_output: String::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            files_checked: Vec::new(),
            timestamp: Utc::now(),
            summary: ErrorSummary::default(),
        }
    }

    /// Recompute the summary and success flag from the diagnostics.
    pub fn finalize(mut self) -> Self {
        self.summary = ErrorSummary::from_diagnostics(&self.errors, &self.warnings);
        self.success = self.errors.is_empty();
        self
    }
}

/// Fix suggestions derived from a compile report.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FixSuggestions {
    pub critical: Vec<String>,
    pub recommended: Vec<String>,
    pub general: Vec<String>,
}
