//! Fenced code blocks, inline file references and dependency names.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::language::Language;

/// Names that show up as headings in LLM output but are not files.
const PLACEHOLDER_NAMES: &[&str] = &[
    "file contents",
    "filename1",
    "filename2",
    "example",
    "sample",
    "code",
    "output",
    "result",
    "content",
];

const FILENAME_PREFIXES: &[&str] = &["file:", "filename:", "name:", "create:", "generate:"];

/// Python modules never reported as dependencies.
const PYTHON_BUILTIN_IMPORTS: &[&str] = &["os", "sys", "re", "json", "datetime"];

/// A file extracted from markdown: a `##`/`###` heading naming it followed
/// by a fenced block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CodeBlock {
    pub filename: String,
    pub content: String,
    /// Fence tag, `text` when the fence had none.
    pub language: String,
}

/// Extract every heading + fenced block pair from `markdown`.
///
/// Headings that do not name a usable file (placeholders such as
/// `Example`, or text without any alphanumeric) are skipped.
pub fn extract_code_blocks(markdown: &str) -> Vec<CodeBlock> {
    let re = regex!(r"(?ms)^#{2,3}[ \t]*([^\n]+?)[ \t]*\n```([\w+#-]*)[ \t]*\n(.*?)\n```");

    re.captures_iter(markdown)
        .filter_map(|caps| {
            let filename = clean_filename(&caps[1]);
            if !is_valid_filename(&filename) {
                return None;
            }
            let language = match caps.get(2).map(|m| m.as_str()) {
                Some(tag) if !tag.is_empty() => tag.to_string(),
                _ => "text".to_string(),
            };
            Some(CodeBlock {
                filename,
                content: caps[3].trim().to_string(),
                language,
            })
        })
        .collect()
}

/// Inline `` `name.ext` `` references in prose.
pub fn extract_file_references(text: &str) -> Vec<String> {
    regex!(r"`([^`\n]+\.[A-Za-z0-9]+)`")
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .filter(|name| is_valid_filename(name))
        .collect()
}

/// Strip markdown emphasis and `file:`-style prefixes from a heading.
pub fn clean_filename(raw: &str) -> String {
    let mut name: String = raw
        .chars()
        .filter(|c| !matches!(c, '`' | '*' | '#' | '[' | ']'))
        .collect::<String>()
        .trim()
        .to_string();

    for prefix in FILENAME_PREFIXES {
        let lower = name.to_ascii_lowercase();
        if lower.starts_with(prefix) {
            name = name[prefix.len()..].trim().to_string();
        }
    }
    name
}

pub fn is_valid_filename(name: &str) -> bool {
    let name = name.trim();
    if name.is_empty() {
        return false;
    }
    if PLACEHOLDER_NAMES.contains(&name.to_ascii_lowercase().as_str()) {
        return false;
    }
    name.chars().any(|c| c.is_ascii_alphanumeric())
}

/// Third-party dependencies referenced by generated `content`, sorted and
/// de-duplicated. Languages without a rule yield nothing.
pub fn extract_dependencies(content: &str, language: Language) -> Vec<String> {
    let mut deps = BTreeSet::new();

    match language {
        Language::CSharp => {
            for caps in regex!(r#"<PackageReference\s+Include="([^"]+)""#).captures_iter(content) {
                deps.insert(caps[1].to_string());
            }
            for caps in regex!(r"(?m)^\s*using\s+([\w.]+)\s*;").captures_iter(content) {
                let namespace = &caps[1];
                if !namespace.starts_with("System") {
                    deps.insert(namespace.to_string());
                }
            }
        }
        Language::Python => {
            let re = regex!(r"(?m)^\s*(?:from\s+(\w+)|import\s+(\w+))");
            for caps in re.captures_iter(content) {
                let Some(module) = caps.get(1).or_else(|| caps.get(2)) else {
                    continue;
                };
                if !PYTHON_BUILTIN_IMPORTS.contains(&module.as_str()) {
                    deps.insert(module.as_str().to_string());
                }
            }
        }
        Language::JavaScript | Language::TypeScript => {
            let re = regex!(
                r#"require\(\s*['"]([^'"]+)['"]\s*\)|import\s+[^'";]*?\bfrom\s+['"]([^'"]+)['"]"#
            );
            for caps in re.captures_iter(content) {
                let Some(module) = caps.get(1).or_else(|| caps.get(2)) else {
                    continue;
                };
                let module = module.as_str();
                if !module.starts_with("./") && !module.starts_with("../") {
                    deps.insert(module.to_string());
                }
            }
        }
        Language::Java | Language::Go | Language::Rust => {}
    }

    deps.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"Here is the project.

## Project Structure

- src/
- src/main.py

### `src/main.py`
```python
import requests

def main():
    print("hi")
```

### Example
```python
print("not a file")
```

## File: requirements.txt
```
requests==2.31.0
```
"#;

    #[test]
    fn test_extract_code_blocks() {
        let blocks = extract_code_blocks(RESPONSE);
        assert_eq!(blocks.len(), 2);

        assert_eq!(blocks[0].filename, "src/main.py");
        assert_eq!(blocks[0].language, "python");
        assert!(blocks[0].content.starts_with("import requests"));
        assert!(blocks[0].content.ends_with("print(\"hi\")"));

        assert_eq!(blocks[1].filename, "requirements.txt");
        assert_eq!(blocks[1].language, "text");
        assert_eq!(blocks[1].content, "requests==2.31.0");
    }

    #[test]
    fn test_clean_filename() {
        assert_eq!(clean_filename("**`Program.cs`**"), "Program.cs");
        assert_eq!(clean_filename("Filename: app.js"), "app.js");
        assert_eq!(clean_filename("[main.go]"), "main.go");
    }

    #[test]
    fn test_invalid_filenames() {
        assert!(!is_valid_filename(""));
        assert!(!is_valid_filename("   "));
        assert!(!is_valid_filename("Sample"));
        assert!(!is_valid_filename("---"));
        assert!(is_valid_filename("Dockerfile"));
    }

    #[test]
    fn test_extract_file_references() {
        let refs = extract_file_references("Edit `config.json` and `example`, then run `app.py`.");
        assert_eq!(refs, vec!["config.json", "app.py"]);
    }

    #[test]
    fn test_csharp_dependencies() {
        let csproj = r#"<ItemGroup>
  <PackageReference Include="xunit" Version="2.6.1" />
  <PackageReference Include="Moq" Version="4.20.0" />
</ItemGroup>"#;
        let source = "using System;\nusing System.Linq;\nusing Newtonsoft.Json;\n";
        let deps = extract_dependencies(&format!("{csproj}\n{source}"), Language::CSharp);
        assert_eq!(deps, vec!["Moq", "Newtonsoft.Json", "xunit"]);
    }

    #[test]
    fn test_python_dependencies() {
        let source = "import os\nimport requests\nfrom flask import Flask\nimport requests\n";
        assert_eq!(
            extract_dependencies(source, Language::Python),
            vec!["flask", "requests"]
        );
    }

    #[test]
    fn test_js_dependencies_skip_relative() {
        let source = r#"const express = require('express');
import { render } from "react-dom";
import util from './util';
const cfg = require("../config");
"#;
        assert_eq!(
            extract_dependencies(source, Language::TypeScript),
            vec!["express", "react-dom"]
        );
    }

    #[test]
    fn test_go_has_no_dependency_rule() {
        assert!(extract_dependencies("import \"fmt\"", Language::Go).is_empty());
    }
}
