//! Writing extracted files and structure listings into a project directory.

use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{ForgeError, Result};
use crate::extract::{is_directory_path, CodeBlock};
use crate::language::extension_for_tag;

const INVALID_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*'];

/// Names that never get an extension appended.
const BARE_FILE_NAMES: &[&str] = &["dockerfile", "makefile"];

fn is_reserved_name(component: &str) -> bool {
    let stem = component.split('.').next().unwrap_or(component).to_ascii_uppercase();
    match stem.as_str() {
        "CON" | "PRN" | "AUX" | "NUL" => true,
        _ => {
            let digit = |prefix: &str| {
                stem.strip_prefix(prefix)
                    .is_some_and(|d| d.len() == 1 && matches!(d.as_bytes()[0], b'1'..=b'9'))
            };
            digit("COM") || digit("LPT")
        }
    }
}

/// Validate a generated relative path and turn it into a `PathBuf`.
///
/// Rejects absolute paths, `..`, characters Windows cannot store and
/// reserved device names, so generated names cannot escape the project.
pub fn safe_relative_path(name: &str) -> Result<PathBuf> {
    let trimmed = name.trim();
    let invalid = |reason: &str| ForgeError::InvalidPath(format!("{trimmed}: {reason}"));

    if trimmed.is_empty() {
        return Err(invalid("empty path"));
    }
    if trimmed.starts_with('/') || trimmed.starts_with('\\') || Path::new(trimmed).is_absolute() {
        return Err(invalid("absolute path"));
    }
    if let Some(c) = trimmed.chars().find(|c| INVALID_CHARS.contains(c)) {
        return Err(invalid(&format!("invalid character {c:?}")));
    }

    let unified = trimmed.replace('\\', "/");
    let mut path = PathBuf::new();
    for component in Path::new(&unified).components() {
        match component {
            Component::Normal(part) => {
                let part = part.to_string_lossy();
                if is_reserved_name(&part) {
                    return Err(invalid(&format!("reserved name {part}")));
                }
                path.push(&*part);
            }
            Component::CurDir => {}
            Component::ParentDir => return Err(invalid("parent directory component")),
            Component::RootDir | Component::Prefix(_) => return Err(invalid("absolute path")),
        }
    }

    if path.as_os_str().is_empty() {
        return Err(invalid("empty path"));
    }
    Ok(path)
}

/// Directories and files made by [`ProjectWriter::create_structure`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatedStructure {
    pub directories: Vec<PathBuf>,
    pub files: Vec<PathBuf>,
}

/// Writes generated files under a project root.
#[derive(Debug, Clone)]
pub struct ProjectWriter {
    root: PathBuf,
}

impl ProjectWriter {
    /// Create a writer rooted at `root`, creating the directory if needed.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File name a block is written under: `gitignore` becomes
    /// `.gitignore`, and names without an extension get the one for the
    /// block's language (except `Dockerfile`/`Makefile`).
    pub fn target_name(block: &CodeBlock) -> String {
        let (dir, base) = match block.filename.rsplit_once('/') {
            Some((dir, base)) => (Some(dir), base),
            None => (None, block.filename.as_str()),
        };

        let lower = base.to_ascii_lowercase();
        let base = if lower == "gitignore" {
            ".gitignore".to_string()
        } else if !base.contains('.') && !BARE_FILE_NAMES.contains(&lower.as_str()) {
            format!("{base}.{}", extension_for_tag(&block.language))
        } else {
            base.to_string()
        };

        match dir {
            Some(dir) => format!("{dir}/{base}"),
            None => base,
        }
    }

    /// Write one extracted block; returns the path written.
    pub fn write_block(&self, block: &CodeBlock) -> Result<PathBuf> {
        let relative = safe_relative_path(&Self::target_name(block))?;
        let path = self.root.join(relative);
        self.write_atomic(&path, block.content.as_bytes())?;
        debug!(path = %path.display(), bytes = block.content.len(), "wrote block");
        Ok(path)
    }

    /// Write every block, stopping at the first failure.
    pub fn write_blocks(&self, blocks: &[CodeBlock]) -> Result<Vec<PathBuf>> {
        blocks.iter().map(|block| self.write_block(block)).collect()
    }

    /// Create directories and empty files for a structure listing.
    ///
    /// Existing files are left untouched and not reported.
    pub fn create_structure(&self, paths: &[String]) -> Result<CreatedStructure> {
        let mut created = CreatedStructure::default();

        for listed in paths {
            let path = self.root.join(safe_relative_path(listed)?);
            if is_directory_path(listed) {
                fs::create_dir_all(&path)?;
                created.directories.push(path);
                continue;
            }

            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            if !path.exists() {
                fs::File::create(&path)?;
                created.files.push(path);
            }
        }

        debug!(
            root = %self.root.display(),
            directories = created.directories.len(),
            files = created.files.len(),
            "created structure"
        );
        Ok(created)
    }

    // Temp file in the target directory, then rename into place.
    fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<()> {
        let parent = path.parent().unwrap_or(&self.root);
        fs::create_dir_all(parent)?;
        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(data)?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(filename: &str, language: &str, content: &str) -> CodeBlock {
        CodeBlock {
            filename: filename.to_string(),
            content: content.to_string(),
            language: language.to_string(),
        }
    }

    fn make_writer() -> (tempfile::TempDir, ProjectWriter) {
        let dir = tempfile::tempdir().unwrap();
        let writer = ProjectWriter::new(dir.path().join("project")).unwrap();
        (dir, writer)
    }

    #[test]
    fn test_write_block_creates_parents() {
        let (_dir, writer) = make_writer();
        let path = writer
            .write_block(&block("src/models/user.py", "python", "class User: pass"))
            .unwrap();
        assert_eq!(path, writer.root().join("src/models/user.py"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "class User: pass");
    }

    #[test]
    fn test_write_block_overwrites() {
        let (_dir, writer) = make_writer();
        writer.write_block(&block("a.txt", "text", "one")).unwrap();
        let path = writer.write_block(&block("a.txt", "text", "two")).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "two");
    }

    #[test]
    fn test_target_name_rules() {
        assert_eq!(ProjectWriter::target_name(&block("Program", "csharp", "")), "Program.cs");
        assert_eq!(ProjectWriter::target_name(&block("src/main", "go", "")), "src/main.go");
        assert_eq!(ProjectWriter::target_name(&block("Dockerfile", "dockerfile", "")), "Dockerfile");
        assert_eq!(ProjectWriter::target_name(&block("gitignore", "text", "")), ".gitignore");
        assert_eq!(ProjectWriter::target_name(&block("notes", "unknown", "")), "notes.txt");
        assert_eq!(ProjectWriter::target_name(&block("app.js", "typescript", "")), "app.js");
    }

    #[test]
    fn test_rejects_unsafe_paths() {
        for name in [
            "../escape.py",
            "src/../../escape.py",
            "/etc/passwd",
            "\\windows\\system32",
            "what?.py",
            "a<b>.cs",
            "CON",
            "src/com1.txt",
            "lpt9",
            "",
        ] {
            let err = safe_relative_path(name).unwrap_err();
            assert!(matches!(err, ForgeError::InvalidPath(_)), "{name}");
        }
        assert!(safe_relative_path("console.py").is_ok());
        assert!(safe_relative_path("com10.txt").is_ok());
        assert_eq!(
            safe_relative_path("./src\\lib.rs").unwrap(),
            PathBuf::from("src").join("lib.rs")
        );
    }

    #[test]
    fn test_write_block_rejects_escape() {
        let (dir, writer) = make_writer();
        let err = writer.write_block(&block("../outside.py", "python", "x")).unwrap_err();
        assert!(matches!(err, ForgeError::InvalidPath(_)));
        assert!(!dir.path().join("outside.py").exists());
    }

    #[test]
    fn test_create_structure() {
        let (_dir, writer) = make_writer();
        fs::create_dir_all(writer.root().join("src")).unwrap();
        fs::write(writer.root().join("src/existing.py"), "keep").unwrap();

        let created = writer
            .create_structure(&[
                "src".to_string(),
                "src/existing.py".to_string(),
                "tests/".to_string(),
                "tests/test_app.py".to_string(),
            ])
            .unwrap();

        assert_eq!(
            created.directories,
            vec![writer.root().join("src"), writer.root().join("tests")]
        );
        assert_eq!(created.files, vec![writer.root().join("tests/test_app.py")]);
        assert_eq!(
            fs::read_to_string(writer.root().join("src/existing.py")).unwrap(),
            "keep"
        );
        assert!(writer.root().join("tests/test_app.py").is_file());
    }
}
