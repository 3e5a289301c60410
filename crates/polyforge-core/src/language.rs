//! Supported target languages and their static properties.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ForgeError;

/// Directories never walked when looking for sources or tests.
pub const SKIPPED_DIRS: &[&str] = &[
    "bin",
    "obj",
    "target",
    "node_modules",
    "__pycache__",
    ".git",
];

/// A target language of a generated project.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    CSharp,
    Java,
    Python,
    JavaScript,
    TypeScript,
    Go,
    Rust,
}

impl Language {
    /// All languages in table order.
    pub const ALL: [Language; 7] = [
        Language::CSharp,
        Language::Java,
        Language::Python,
        Language::JavaScript,
        Language::TypeScript,
        Language::Go,
        Language::Rust,
    ];

    /// Canonical lowercase key.
    pub fn key(&self) -> &'static str {
        match self {
            Language::CSharp => "csharp",
            Language::Java => "java",
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Go => "go",
            Language::Rust => "rust",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Language::CSharp => "C#",
            Language::Java => "Java",
            Language::Python => "Python",
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
            Language::Go => "Go",
            Language::Rust => "Rust",
        }
    }

    /// Source file extensions, without the leading dot.
    pub fn source_extensions(&self) -> &'static [&'static str] {
        match self {
            Language::CSharp => &["cs"],
            Language::Java => &["java"],
            Language::Python => &["py"],
            Language::JavaScript => &["js", "mjs"],
            Language::TypeScript => &["ts"],
            Language::Go => &["go"],
            Language::Rust => &["rs"],
        }
    }

    /// Extension appended to generated files that have none.
    pub fn default_extension(&self) -> &'static str {
        self.source_extensions()[0]
    }

    /// Primary build manifest of a project in this language.
    pub fn build_file(&self) -> &'static str {
        match self {
            Language::CSharp => "*.csproj",
            Language::Java => "pom.xml",
            Language::Python => "requirements.txt",
            Language::JavaScript | Language::TypeScript => "package.json",
            Language::Go => "go.mod",
            Language::Rust => "Cargo.toml",
        }
    }

    /// Whether a file path has one of this language's source extensions.
    pub fn is_source_file(&self, path: &std::path::Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.source_extensions().contains(&ext))
            .unwrap_or(false)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Language {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csharp" | "c#" | "cs" | "dotnet" => Ok(Language::CSharp),
            "java" => Ok(Language::Java),
            "python" | "py" => Ok(Language::Python),
            "javascript" | "js" | "node" | "node.js" | "nodejs" => Ok(Language::JavaScript),
            "typescript" | "ts" => Ok(Language::TypeScript),
            "go" | "golang" => Ok(Language::Go),
            "rust" | "rs" => Ok(Language::Rust),
            other => Err(ForgeError::UnsupportedLanguage(other.to_string())),
        }
    }
}

/// File extension for a fenced-code language tag, used when a generated
/// file name has no extension. Falls back to `txt`.
pub fn extension_for_tag(tag: &str) -> &'static str {
    if let Ok(lang) = tag.parse::<Language>() {
        return lang.default_extension();
    }
    match tag.to_ascii_lowercase().as_str() {
        "cpp" | "c++" => "cpp",
        "c" => "c",
        "php" => "php",
        "ruby" | "rb" => "rb",
        "html" => "html",
        "css" => "css",
        "json" => "json",
        "xml" => "xml",
        "yaml" | "yml" => "yml",
        "toml" => "toml",
        "sql" => "sql",
        "bash" | "sh" | "shell" => "sh",
        "powershell" | "ps1" => "ps1",
        "markdown" | "md" => "md",
        _ => "txt",
    }
}
