//! Normalized diagnostic types.

use serde::{Deserialize, Serialize};

/// Severity level for a diagnostic or recommendation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

/// What kind of problem a diagnostic describes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    CompilationError,
    CompilationWarning,
    SyntaxError,
    MissingImport,
    TimeoutError,
    ToolNotFound,
    UnsupportedLanguage,
    NoSourceFiles,
    CheckFailed,
    CompilationFailed,
    FileReadError,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::CompilationError => "compilation_error",
            DiagnosticKind::CompilationWarning => "compilation_warning",
            DiagnosticKind::SyntaxError => "syntax_error",
            DiagnosticKind::MissingImport => "missing_import",
            DiagnosticKind::TimeoutError => "timeout_error",
            DiagnosticKind::ToolNotFound => "tool_not_found",
            DiagnosticKind::UnsupportedLanguage => "unsupported_language",
            DiagnosticKind::NoSourceFiles => "no_source_files",
            DiagnosticKind::CheckFailed => "check_failed",
            DiagnosticKind::CompilationFailed => "compilation_failed",
            DiagnosticKind::FileReadError => "file_read_error",
        }
    }

    /// Kinds an automated fixer can usually resolve.
    pub fn is_fixable(&self) -> bool {
        matches!(self, DiagnosticKind::SyntaxError | DiagnosticKind::MissingImport)
    }
}

/// A single normalized diagnostic from tool output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,

    pub severity: Severity,

    /// Human-readable message (usually the matched output line).
    pub message: String,

    /// Source file path as printed by the tool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Line number (1-indexed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,

    /// Column number (1-indexed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,

    /// Tool-specific code (e.g. "CS0246", "E0308", "TS2304").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Error category from the per-language table (e.g. "type mismatch").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
            file: None,
            line: None,
            column: None,
            code: None,
            category: None,
            suggestion: None,
        }
    }

    /// Shorthand for a critical compilation error.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::CompilationError, Severity::Critical, message)
    }

    /// Shorthand for a medium compilation warning.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::CompilationWarning, Severity::Medium, message)
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_location(mut self, file: impl Into<String>, line: u32, column: Option<u32>) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self.column = column;
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}
