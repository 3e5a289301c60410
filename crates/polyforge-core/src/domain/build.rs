//! Restore/build/test cycle results.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::language::Language;

/// Outcome of one build-cycle step.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StepOutcome {
    pub success: bool,
    pub command: Vec<String>,
    pub output: String,
    /// stderr of the tool, or the execution failure message.
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_code: Option<i32>,
    pub duration_ms: u64,
}

/// Result of restore -> build -> test.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuildCycleReport {
    /// Restore and build both succeeded; test failures do not count.
    pub success: bool,
    pub language: Language,
    pub project_dir: PathBuf,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restore: Option<StepOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<StepOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<StepOutcome>,
}

impl BuildCycleReport {
    pub fn new(language: Language, project_dir: PathBuf) -> Self {
        Self {
            success: false,
            language,
            project_dir,
            timestamp: Utc::now(),
            restore: None,
            build: None,
            test: None,
        }
    }
}

/// Which tool binaries answer `--version` / `--help`.
pub type ToolAvailability = BTreeMap<String, bool>;

/// Static facts about a project's build configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuildInfo {
    pub language: Language,
    pub project_dir: PathBuf,
    pub project_files: Vec<PathBuf>,
    pub config_files: Vec<PathBuf>,
    pub has_dependencies: bool,
}
