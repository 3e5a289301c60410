//! Finding source and test files in a generated project.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::domain::{TestCategory, TestDiscovery};
use crate::error::{ForgeError, Result};
use crate::language::{Language, SKIPPED_DIRS};

/// Globs (relative to the project root) that identify test files.
pub fn test_file_patterns(language: Language) -> &'static [&'static str] {
    match language {
        Language::CSharp => &["**/*Tests.cs", "**/*Test.cs", "**/Test*.cs"],
        Language::Java => &["**/src/test/**/*Test.java", "**/src/test/**/*Tests.java"],
        Language::Python => &["**/test_*.py", "**/*_test.py", "**/tests.py"],
        Language::JavaScript => &["**/*.test.js", "**/*.spec.js", "**/test/**/*.js"],
        Language::TypeScript => &["**/*.test.ts", "**/*.spec.ts"],
        Language::Go => &["**/*_test.go"],
        Language::Rust => &["**/tests/**/*.rs"],
    }
}

/// Compile a list of globs into one matcher.
pub fn compile_globs<S: AsRef<str>>(patterns: &[S]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern.as_ref()).map_err(|e| {
            ForgeError::InvalidConfig(format!("invalid glob {}: {e}", pattern.as_ref()))
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| ForgeError::InvalidConfig(format!("invalid glob set: {e}")))
}

fn is_skipped(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIPPED_DIRS.contains(&name))
}

/// Every regular file under `root`, outside build and cache directories,
/// in sorted order.
pub fn walk_project_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_skipped(e))
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(err) => {
                debug!(error = %err, "skipping unreadable entry");
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(DirEntry::into_path)
        .collect();
    files.sort();
    files
}

/// Source files of `language` under `root`.
pub fn find_source_files(root: &Path, language: Language) -> Vec<PathBuf> {
    walk_project_files(root)
        .into_iter()
        .filter(|p| language.is_source_file(p))
        .collect()
}

/// Files under `root` whose relative path matches `globs`.
pub fn find_matching_files(root: &Path, globs: &GlobSet) -> Vec<PathBuf> {
    walk_project_files(root)
        .into_iter()
        .filter(|path| {
            let relative = path.strip_prefix(root).unwrap_or(path);
            globs.is_match(relative)
        })
        .collect()
}

pub fn categorize_test_file(path: &Path) -> TestCategory {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    if name.contains("integration") {
        TestCategory::Integration
    } else if name.contains("functional") || name.contains("e2e") {
        TestCategory::Functional
    } else if name.contains("unit") || name.contains("test") {
        TestCategory::Unit
    } else {
        TestCategory::Other
    }
}

/// Rough number of tests in `content`; at least 1 for any test file.
pub fn estimate_test_count(content: &str, language: Language) -> u32 {
    let re = match language {
        Language::CSharp => regex!(r"\[(?:Test|TestMethod|Fact|Theory)\b"),
        Language::Java => regex!(r"@(?:Test|ParameterizedTest)\b"),
        Language::Python => regex!(r"\bdef test_\w+"),
        Language::JavaScript | Language::TypeScript => regex!(r"\b(?:it|test)\s*\("),
        Language::Go => regex!(r"\bfunc Test\w+"),
        Language::Rust => regex!(r"#\[test\]"),
    };
    (re.find_iter(content).count() as u32).max(1)
}

/// Find and categorize the test files of a project.
///
/// Failures (an unreadable directory, a bad glob) are recorded in
/// `error` rather than returned.
pub fn discover_tests(project_dir: &Path, language: Language) -> TestDiscovery {
    let mut discovery = TestDiscovery::empty(language, project_dir.to_path_buf());

    if !project_dir.is_dir() {
        discovery.error = Some(format!(
            "Test discovery failed: {} is not a directory",
            project_dir.display()
        ));
        return discovery;
    }

    let globs = match compile_globs(test_file_patterns(language)) {
        Ok(globs) => globs,
        Err(err) => {
            warn!(error = %err, "test discovery failed");
            discovery.error = Some(format!("Test discovery failed: {err}"));
            return discovery;
        }
    };

    let mut files = find_matching_files(project_dir, &globs);

    // Rust unit tests live inline under src/.
    if language == Language::Rust {
        for path in find_source_files(project_dir, Language::Rust) {
            if files.contains(&path) {
                continue;
            }
            let inline = std::fs::read_to_string(&path)
                .map(|content| content.contains("#[test]"))
                .unwrap_or(false);
            if inline {
                files.push(path);
            }
        }
        files.sort();
    }

    let mut categories: BTreeMap<TestCategory, Vec<PathBuf>> = BTreeMap::new();
    let mut estimate = 0u32;
    for path in &files {
        categories
            .entry(categorize_test_file(path))
            .or_default()
            .push(path.clone());
        estimate += std::fs::read_to_string(path)
            .map(|content| estimate_test_count(&content, language))
            .unwrap_or(1);
    }

    debug!(
        language = %language,
        files = files.len(),
        estimate,
        "discovered tests"
    );
    discovery.test_files = files;
    discovery.test_count_estimate = estimate;
    discovery.categories = categories;
    discovery
}
