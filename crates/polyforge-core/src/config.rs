//! Runtime configuration.
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML
//! file (`polyforge.toml` in the working directory or an explicit path),
//! then `POLYFORGE_*` environment variables. CLI flags are applied on top
//! by the binary.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ForgeError, Result};
use crate::exec::Operation;
use crate::language::Language;

/// File name looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "polyforge.toml";

/// Per-operation timeouts in seconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TimeoutConfig {
    pub restore: u64,
    pub build: u64,
    pub compile: u64,
    /// Per-file checks (`py_compile`, `node --check`).
    pub compile_per_file: u64,
    pub test: u64,
    pub coverage: u64,
    pub clean: u64,
    /// `<tool> --version` availability probes.
    pub probe: u64,
    /// Application runs.
    pub run: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            restore: 300,
            build: 600,
            compile: 300,
            compile_per_file: 30,
            test: 600,
            coverage: 300,
            clean: 120,
            probe: 10,
            run: 30,
        }
    }
}

impl TimeoutConfig {
    pub fn for_operation(&self, op: Operation) -> u64 {
        match op {
            Operation::Restore => self.restore,
            Operation::Build => self.build,
            Operation::Compile => self.compile,
            Operation::Test => self.test,
            Operation::Coverage => self.coverage,
            Operation::Clean => self.clean,
        }
    }

    fn slot_mut(&mut self, op: Operation) -> &mut u64 {
        match op {
            Operation::Restore => &mut self.restore,
            Operation::Build => &mut self.build,
            Operation::Compile => &mut self.compile,
            Operation::Test => &mut self.test,
            Operation::Coverage => &mut self.coverage,
            Operation::Clean => &mut self.clean,
        }
    }
}

/// Thresholds applied by the pass/fail gate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GateThresholds {
    /// Minimum test success rate, as a percentage.
    pub min_success_rate: f64,

    /// Fail the gate when no tests were executed.
    pub require_tests: bool,

    /// Fail the gate on compiler warnings as well as errors.
    pub deny_warnings: bool,
}

impl Default for GateThresholds {
    fn default() -> Self {
        Self {
            min_success_rate: 0.0,
            require_tests: true,
            deny_warnings: false,
        }
    }
}

/// Top-level polyforge configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ForgeConfig {
    pub timeouts: TimeoutConfig,

    /// Run the coverage stage after tests.
    pub coverage: bool,

    /// Result file globs keyed by language (e.g. `go = ["report.json"]`),
    /// replacing the built-in patterns for that language.
    pub result_files: BTreeMap<String, Vec<String>>,

    pub gate: GateThresholds,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            timeouts: TimeoutConfig::default(),
            coverage: true,
            result_files: BTreeMap::new(),
            gate: GateThresholds::default(),
        }
    }
}

impl ForgeConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: ForgeConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Load from `explicit` (which must exist) or `./polyforge.toml` when
    /// present, then apply environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let base = match explicit {
            Some(path) => {
                debug!(path = %path.display(), "loading config");
                Self::from_file(path)?
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    debug!(path = %default_path.display(), "loading config");
                    Self::from_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };
        base.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply `POLYFORGE_*` overrides read through `lookup`.
    ///
    /// Recognised keys: `POLYFORGE_TIMEOUT_<OP>_SECS` for each operation,
    /// `POLYFORGE_COVERAGE` and `POLYFORGE_MIN_SUCCESS_RATE`.
    pub fn apply_env_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        for op in Operation::ALL {
            let key = format!("POLYFORGE_TIMEOUT_{}_SECS", op.as_str().to_ascii_uppercase());
            if let Some(value) = lookup(&key) {
                let secs = value.trim().parse::<u64>().map_err(|_| {
                    ForgeError::InvalidConfig(format!("{key} must be a number of seconds"))
                })?;
                *self.timeouts.slot_mut(op) = secs;
            }
        }

        if let Some(value) = lookup("POLYFORGE_COVERAGE") {
            self.coverage = parse_bool(&value).ok_or_else(|| {
                ForgeError::InvalidConfig("POLYFORGE_COVERAGE must be true or false".into())
            })?;
        }

        if let Some(value) = lookup("POLYFORGE_MIN_SUCCESS_RATE") {
            self.gate.min_success_rate = value.trim().parse::<f64>().map_err(|_| {
                ForgeError::InvalidConfig("POLYFORGE_MIN_SUCCESS_RATE must be a number".into())
            })?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Result file globs configured for `language`, if overridden.
    pub fn result_patterns(&self, language: Language) -> Option<&[String]> {
        self.result_files.get(language.key()).map(Vec::as_slice)
    }

    fn validate(&self) -> Result<()> {
        let rate = self.gate.min_success_rate;
        if !(0.0..=100.0).contains(&rate) {
            return Err(ForgeError::InvalidConfig(format!(
                "gate.min_success_rate must be within 0..=100, got {rate}"
            )));
        }
        for key in self.result_files.keys() {
            key.parse::<Language>()?;
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
