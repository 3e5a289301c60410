//! Grouping free-text test scenarios into test-file categories.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

const MAX_METHOD_NAME_LEN: usize = 100;

/// Category a scenario is filed under; one generated test file each.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioCategory {
    Basic,
    Integration,
    EdgeCases,
    Performance,
    Security,
    Api,
    Ui,
    Data,
}

impl ScenarioCategory {
    /// Table order, which also breaks ties between equal keyword counts.
    pub const ALL: [ScenarioCategory; 8] = [
        ScenarioCategory::Basic,
        ScenarioCategory::Integration,
        ScenarioCategory::EdgeCases,
        ScenarioCategory::Performance,
        ScenarioCategory::Security,
        ScenarioCategory::Api,
        ScenarioCategory::Ui,
        ScenarioCategory::Data,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioCategory::Basic => "basic",
            ScenarioCategory::Integration => "integration",
            ScenarioCategory::EdgeCases => "edge_cases",
            ScenarioCategory::Performance => "performance",
            ScenarioCategory::Security => "security",
            ScenarioCategory::Api => "api",
            ScenarioCategory::Ui => "ui",
            ScenarioCategory::Data => "data",
        }
    }

    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            ScenarioCategory::Basic => &[
                "basic",
                "simple",
                "standard",
                "default",
                "core",
                "fundamental",
                "primary",
            ],
            ScenarioCategory::Integration => &[
                "integration",
                "end-to-end",
                "e2e",
                "workflow",
                "complete",
                "full",
                "system",
            ],
            ScenarioCategory::EdgeCases => &[
                "edge",
                "boundary",
                "limit",
                "extreme",
                "corner",
                "invalid",
                "error",
                "exception",
            ],
            ScenarioCategory::Performance => &[
                "performance",
                "load",
                "stress",
                "speed",
                "benchmark",
                "timeout",
                "memory",
                "cpu",
            ],
            ScenarioCategory::Security => &[
                "security",
                "auth",
                "permission",
                "access",
                "vulnerability",
                "injection",
                "xss",
            ],
            ScenarioCategory::Api => &[
                "api", "rest", "http", "endpoint", "request", "response", "json", "xml",
            ],
            ScenarioCategory::Ui => &[
                "ui",
                "interface",
                "user",
                "click",
                "button",
                "form",
                "page",
                "browser",
            ],
            ScenarioCategory::Data => &[
                "data",
                "database",
                "sql",
                "crud",
                "storage",
                "persistence",
                "migration",
            ],
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ScenarioCategory::Basic => "Basic functionality and core features",
            ScenarioCategory::Integration => "Integration and end-to-end testing scenarios",
            ScenarioCategory::EdgeCases => "Edge cases and boundary testing",
            ScenarioCategory::Performance => "Performance and load testing scenarios",
            ScenarioCategory::Security => "Security testing scenarios",
            ScenarioCategory::Api => "API testing scenarios",
            ScenarioCategory::Ui => "User interface testing scenarios",
            ScenarioCategory::Data => "Data and database testing scenarios",
        }
    }

    /// Suffix of the generated test class / file name.
    pub fn file_suffix(&self) -> &'static str {
        match self {
            ScenarioCategory::Basic => "BasicTests",
            ScenarioCategory::Integration => "IntegrationTests",
            ScenarioCategory::EdgeCases => "EdgeCaseTests",
            ScenarioCategory::Performance => "PerformanceTests",
            ScenarioCategory::Security => "SecurityTests",
            ScenarioCategory::Api => "ApiTests",
            ScenarioCategory::Ui => "UiTests",
            ScenarioCategory::Data => "DataTests",
        }
    }

    /// Number of this category's keywords found in `lowercase` text.
    fn hits(&self, lowercase: &str) -> usize {
        self.keywords()
            .iter()
            .filter(|keyword| lowercase.contains(*keyword))
            .count()
    }
}

/// Best category for one scenario: most keyword hits, first in table
/// order on ties, `Basic` when nothing matches.
pub fn categorize_scenario(scenario: &str) -> ScenarioCategory {
    let lower = scenario.to_lowercase();
    let mut best = (ScenarioCategory::Basic, 0);
    for category in ScenarioCategory::ALL {
        let hits = category.hits(&lower);
        if hits > best.1 {
            best = (category, hits);
        }
    }
    best.0
}

/// Group scenarios by category in table order, dropping empty groups.
/// Scenarios keep their input order within a group; unmatched ones are
/// appended to `Basic` after the ones that matched it.
pub fn categorize_scenarios<S: AsRef<str>>(scenarios: &[S]) -> Vec<(ScenarioCategory, Vec<String>)> {
    let mut groups: BTreeMap<ScenarioCategory, Vec<String>> = BTreeMap::new();
    let mut unmatched = Vec::new();

    for scenario in scenarios {
        let scenario = scenario.as_ref();
        let lower = scenario.to_lowercase();
        if ScenarioCategory::ALL.iter().all(|c| c.hits(&lower) == 0) {
            unmatched.push(scenario.to_string());
            continue;
        }
        groups
            .entry(categorize_scenario(scenario))
            .or_default()
            .push(scenario.to_string());
    }
    if !unmatched.is_empty() {
        groups.entry(ScenarioCategory::Basic).or_default().extend(unmatched);
    }

    // BTreeMap iteration follows declaration order, i.e. table order.
    groups.into_iter().collect()
}

/// Counts per category for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategorizationSummary {
    pub total_scenarios: usize,
    pub categories_found: usize,
    pub distribution: BTreeMap<ScenarioCategory, usize>,
}

pub fn categorization_summary<S: AsRef<str>>(scenarios: &[S]) -> CategorizationSummary {
    let groups = categorize_scenarios(scenarios);
    CategorizationSummary {
        total_scenarios: scenarios.len(),
        categories_found: groups.len(),
        distribution: groups
            .iter()
            .map(|(category, items)| (*category, items.len()))
            .collect(),
    }
}

/// Turn scenario text into a PascalCase identifier usable as a test
/// method name in every target language.
pub fn sanitize_method_name(scenario: &str) -> String {
    let mut name: String = scenario
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();

    if name.is_empty() {
        return "Scenario".to_string();
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert_str(0, "Scenario");
    }
    name.truncate(MAX_METHOD_NAME_LEN);
    name
}
