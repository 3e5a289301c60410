//! Project structure listings (`## Project Structure` sections).

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Basenames treated as directories even when they look like files.
const DIRECTORY_NAMES: &[&str] = &[
    "src",
    "test",
    "tests",
    "bin",
    "obj",
    "dist",
    "build",
    "docs",
    "assets",
    "static",
    "public",
    "private",
    "lib",
    "libs",
    "vendor",
    "node_modules",
    "packages",
    "components",
    "services",
    "models",
    "views",
    "controllers",
    "utils",
    "helpers",
    "config",
    "scripts",
];

/// Words that mark a line as prose rather than a path.
const DESCRIPTION_WORDS: &[&str] = &["list", "files", "folders", "create", "contains", "include"];

const MAX_PATH_LEN: usize = 100;

/// Paths listed under the first structure section that yields any.
///
/// Sections are `## Project|File|Directory|Folder Structure` headings
/// (case-insensitive) and run to the next `##` or the end of input.
pub fn extract_project_structure(markdown: &str) -> Vec<String> {
    let section =
        regex!(r"(?is)##[ \t]*(?:project|file|directory|folder)[ \t]*structure[ \t]*\n(.*?)(?:##|\z)");

    section
        .captures_iter(markdown)
        .map(|caps| parse_structure_text(&caps[1]))
        .find(|paths| !paths.is_empty())
        .unwrap_or_default()
}

fn parse_structure_text(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| {
            !(line.starts_with('[')
                || line.starts_with('(')
                || line.to_ascii_lowercase().starts_with("note"))
        })
        .filter_map(path_from_line)
        .collect()
}

fn path_from_line(line: &str) -> Option<String> {
    // Tree glyphs first, then list markers and numbering.
    let line = line.trim_start_matches(|c: char| {
        matches!(c, '│' | '├' | '└' | '─' | '┬' | '┌' | '|' | '`' | ' ' | '\t' | '\u{a0}')
    });
    let line = regex!(r"^[-*+•]+\s*").replace(line, "");
    let line = regex!(r"^\d+\.\s*").replace(&line, "");
    let line = line.replace('`', "");
    // Trailing `# comment` annotations.
    let line = match line.find(" #") {
        Some(idx) => &line[..idx],
        None => line.as_str(),
    };
    let path = line.trim();

    if path.len() < 2 || !is_valid_path(path) {
        return None;
    }
    Some(path.to_string())
}

fn is_valid_path(path: &str) -> bool {
    if path.len() > MAX_PATH_LEN {
        return false;
    }
    let lower = path.to_ascii_lowercase();
    if DESCRIPTION_WORDS.iter().any(|w| lower.contains(w)) {
        return false;
    }
    regex!(r"^[A-Za-z0-9_./\\-]+$").is_match(path)
}

/// Unify separators, drop duplicates, and order parents before children.
pub fn normalize_structure(paths: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut normalized: Vec<String> = paths
        .iter()
        .map(|path| {
            let unified = path.replace('\\', "/");
            regex!(r"/{2,}")
                .replace_all(&unified, "/")
                .trim_matches('/')
                .to_string()
        })
        .filter(|path| !path.is_empty() && seen.insert(path.clone()))
        .collect();

    normalized.sort_by(|a, b| {
        let depth = |p: &str| p.matches('/').count();
        depth(a).cmp(&depth(b)).then_with(|| a.cmp(b))
    });
    normalized
}

/// Whether a listed path names a directory: trailing separator, no
/// extension, or a well-known directory name.
pub fn is_directory_path(path: &str) -> bool {
    if path.ends_with('/') || path.ends_with('\\') {
        return true;
    }
    let basename = path.rsplit(['/', '\\']).next().unwrap_or(path);
    if !basename.contains('.') {
        return true;
    }
    DIRECTORY_NAMES.contains(&basename.to_ascii_lowercase().as_str())
}

/// Summary of a parsed structure listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StructureMetadata {
    pub total_items: usize,
    pub directories: usize,
    pub files: usize,
    /// Display names, sorted.
    pub languages: BTreeSet<String>,
    pub frameworks: BTreeSet<String>,
    pub has_tests: bool,
    pub has_docs: bool,
}

pub fn structure_metadata(paths: &[String]) -> StructureMetadata {
    let mut meta = StructureMetadata {
        total_items: paths.len(),
        ..StructureMetadata::default()
    };

    for path in paths {
        let lower = path.to_ascii_lowercase();
        if lower.contains("test") {
            meta.has_tests = true;
        }
        if lower.contains("doc") || lower.contains("readme") {
            meta.has_docs = true;
        }

        if is_directory_path(path) {
            meta.directories += 1;
            continue;
        }
        meta.files += 1;

        let ext = Path::new(&lower)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_string();
        let (language, framework) = match ext.as_str() {
            "cs" => ("C#", Some(".NET")),
            "py" => ("Python", None),
            "js" => ("JavaScript", Some("Node.js")),
            "ts" => ("TypeScript", None),
            "java" => ("Java", None),
            "cpp" | "cc" => ("C++", None),
            "c" => ("C", None),
            "go" => ("Go", None),
            "rs" => ("Rust", None),
            _ => continue,
        };
        meta.languages.insert(language.to_string());
        if let Some(framework) = framework {
            meta.frameworks.insert(framework.to_string());
        }
    }
    meta
}
