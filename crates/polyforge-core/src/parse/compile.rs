//! Compiler output normalization.
//!
//! Each line of tool output is classified by a per-language pattern table.
//! The first matching pattern wins and error patterns are tried before
//! warning patterns, so one output line yields at most one diagnostic.
//! Aggregate failure markers (`Build FAILED.`, `could not compile`, ...)
//! only become a diagnostic when nothing more specific was found.

use std::collections::HashSet;

use serde::Deserialize;

use crate::domain::{CompileReport, Diagnostic, DiagnosticKind, FixSuggestions};
use crate::language::Language;

/// Errors and warnings reduced from one tool's output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedDiagnostics {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl ParsedDiagnostics {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Append another batch, keeping order.
    pub fn extend(&mut self, other: ParsedDiagnostics) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

/// Source position parsed from a standalone location line.
#[derive(Debug, Clone, PartialEq)]
struct Location {
    file: String,
    line: u32,
    column: Option<u32>,
}

/// How a single output line was classified.
#[derive(Debug)]
enum Line {
    Error(Diagnostic),
    Warning(Diagnostic),
    /// Location printed before the diagnostic it belongs to (python, node).
    LocationBefore(Location),
    /// Location printed after the diagnostic (rustc `-->` lines).
    LocationAfter(Location),
    /// Aggregate "the build failed" line.
    FailureMarker(String),
    /// Indented continuation of the previous diagnostic (javac `symbol:`).
    Detail(String),
    Ignore,
}

/// Parse a tool's stdout and stderr into errors and warnings.
pub fn parse_compiler_output(language: Language, stdout: &str, stderr: &str) -> ParsedDiagnostics {
    let mut collector = Collector::default();
    for line in stdout.lines().chain(stderr.lines()) {
        if line.trim().is_empty() {
            continue;
        }
        collector.push(classify(language, line));
    }
    collector.finish(language)
}

fn classify(language: Language, line: &str) -> Line {
    match language {
        Language::CSharp => classify_csharp(line),
        Language::Java => classify_java(line),
        Language::Python => classify_python(line),
        Language::JavaScript | Language::TypeScript => classify_javascript(line),
        Language::Go => classify_go(line),
        Language::Rust => classify_rust(line),
    }
}

#[derive(Default)]
struct Collector {
    parsed: ParsedDiagnostics,
    pending: Option<Location>,
    markers: Vec<String>,
    seen: HashSet<(bool, String, Option<String>, Option<u32>)>,
    /// Index of the last pushed diagnostic: (is_error, index).
    last: Option<(bool, usize)>,
}

impl Collector {
    fn push(&mut self, line: Line) {
        match line {
            Line::Error(diag) => self.add(true, diag),
            Line::Warning(diag) => self.add(false, diag),
            Line::LocationBefore(loc) => self.pending = Some(loc),
            Line::LocationAfter(loc) => {
                if let Some((is_error, idx)) = self.last {
                    let list = if is_error {
                        &mut self.parsed.errors
                    } else {
                        &mut self.parsed.warnings
                    };
                    if let Some(diag) = list.get_mut(idx) {
                        if diag.file.is_none() {
                            diag.file = Some(loc.file);
                            diag.line = Some(loc.line);
                            diag.column = loc.column;
                        }
                    }
                }
            }
            Line::FailureMarker(text) => self.markers.push(text),
            Line::Detail(text) => {
                if let Some((is_error, idx)) = self.last {
                    let list = if is_error {
                        &mut self.parsed.errors
                    } else {
                        &mut self.parsed.warnings
                    };
                    if let Some(diag) = list.get_mut(idx) {
                        diag.message.push_str("; ");
                        diag.message.push_str(&text);
                    }
                }
            }
            Line::Ignore => {}
        }
    }

    fn add(&mut self, is_error: bool, mut diag: Diagnostic) {
        if diag.file.is_none() {
            if let Some(loc) = self.pending.take() {
                diag = diag.with_location(loc.file, loc.line, loc.column);
            }
        }

        // dotnet and maven repeat every diagnostic in their closing summary
        let key = (is_error, diag.message.clone(), diag.file.clone(), diag.line);
        if !self.seen.insert(key) {
            self.last = None;
            return;
        }

        let list = if is_error {
            &mut self.parsed.errors
        } else {
            &mut self.parsed.warnings
        };
        list.push(diag);
        self.last = Some((is_error, list.len() - 1));
    }

    fn finish(mut self, language: Language) -> ParsedDiagnostics {
        if self.parsed.errors.is_empty() {
            if let Some(marker) = self.markers.into_iter().next() {
                self.parsed.errors.push(Diagnostic::error(marker));
            }
        }
        for error in &mut self.parsed.errors {
            if error.category.is_none() {
                error.category = Some(categorize(language, error).to_string());
            }
        }
        self.parsed
    }
}

fn number(caps: &regex::Captures<'_>, name: &str) -> Option<u32> {
    caps.name(name).and_then(|m| m.as_str().parse().ok())
}

fn located(diag: Diagnostic, caps: &regex::Captures<'_>) -> Diagnostic {
    match (caps.name("file"), number(caps, "line")) {
        (Some(file), Some(line)) => {
            diag.with_location(file.as_str().trim(), line, number(caps, "col"))
        }
        (Some(file), None) => diag.with_file(file.as_str().trim()),
        _ => diag,
    }
}

fn with_code(diag: Diagnostic, caps: &regex::Captures<'_>) -> Diagnostic {
    match caps.name("code") {
        Some(code) => diag.with_code(code.as_str()),
        None => diag,
    }
}

// ---------------------------------------------------------------------------
// Per-language pattern tables
// ---------------------------------------------------------------------------

fn classify_csharp(line: &str) -> Line {
    let text = line.trim();

    let located_error =
        regex!(r"^(?P<file>.+?)\((?P<line>\d+),(?P<col>\d+)\): error (?P<code>CS\d+): .+");
    if let Some(caps) = located_error.captures(text) {
        return Line::Error(with_code(located(Diagnostic::error(text), &caps), &caps));
    }
    let bare_error = regex!(r"error (?P<code>(?:CS|MSB|NETSDK|NU)\d+): .+");
    if let Some(caps) = bare_error.captures(text) {
        return Line::Error(with_code(Diagnostic::error(text), &caps));
    }
    if regex!(r"Build FAILED\.").is_match(text) {
        return Line::FailureMarker(text.to_string());
    }

    let located_warning =
        regex!(r"^(?P<file>.+?)\((?P<line>\d+),(?P<col>\d+)\): warning (?P<code>CS\d+): .+");
    if let Some(caps) = located_warning.captures(text) {
        return Line::Warning(with_code(located(Diagnostic::warning(text), &caps), &caps));
    }
    let bare_warning = regex!(r"warning (?P<code>(?:CS|MSB|NETSDK|NU)\d+): .+");
    if let Some(caps) = bare_warning.captures(text) {
        return Line::Warning(with_code(Diagnostic::warning(text), &caps));
    }
    Line::Ignore
}

/// Maven's generic advice lines carry `[ERROR]` but no diagnostic.
fn is_maven_noise(text: &str) -> bool {
    let rest = text.trim_start_matches("[ERROR]").trim();
    rest.is_empty()
        || rest.starts_with("-> [Help")
        || rest.starts_with("Re-run Maven")
        || rest.starts_with("For more information")
        || rest.starts_with("To see the full stack")
        || rest.starts_with("Failed to execute goal")
        || rest.starts_with("[Help")
}

/// `[ERROR]   symbol:   variable foo`: maven indents javac's context lines
/// under the located error they belong to.
fn maven_continuation(text: &str) -> Option<&str> {
    let rest = text
        .strip_prefix("[ERROR]")
        .or_else(|| text.strip_prefix("[WARNING]"))?;
    if rest.starts_with("  ") {
        Some(rest.trim())
    } else {
        None
    }
}

fn classify_java(line: &str) -> Line {
    let text = line.trim();
    if text.starts_with("[ERROR]") && is_maven_noise(text) {
        return Line::Ignore;
    }
    if let Some(detail) = maven_continuation(text) {
        return Line::Detail(detail.to_string());
    }

    let maven_error =
        regex!(r"^\[ERROR\] (?P<file>\S+?\.java):\[(?P<line>\d+),(?P<col>\d+)\] .+");
    if let Some(caps) = maven_error.captures(text) {
        return Line::Error(located(Diagnostic::error(text), &caps));
    }
    let javac_error = regex!(r"^(?:\[ERROR\] )?(?P<file>\S+?\.java):(?P<line>\d+): error: .+");
    if let Some(caps) = javac_error.captures(text) {
        return Line::Error(located(Diagnostic::error(text), &caps));
    }
    if text.contains("COMPILATION ERROR") || text.contains("BUILD FAILURE") {
        return Line::FailureMarker(text.to_string());
    }
    if regex!(r"^\[ERROR\] .+").is_match(text) {
        return Line::Error(Diagnostic::error(text));
    }

    let maven_warning =
        regex!(r"^\[WARNING\] (?P<file>\S+?\.java):\[(?P<line>\d+),(?P<col>\d+)\] .+");
    if let Some(caps) = maven_warning.captures(text) {
        return Line::Warning(located(Diagnostic::warning(text), &caps));
    }
    let javac_warning =
        regex!(r"^(?:\[WARNING\] )?(?P<file>\S+?\.java):(?P<line>\d+): warning: .+");
    if let Some(caps) = javac_warning.captures(text) {
        return Line::Warning(located(Diagnostic::warning(text), &caps));
    }
    if regex!(r"^\[WARNING\] .+").is_match(text) {
        return Line::Warning(Diagnostic::warning(text));
    }
    Line::Ignore
}

fn classify_python(line: &str) -> Line {
    let text = line.trim();

    let location = regex!(r#"^File "(?P<file>.+?)", line (?P<line>\d+)"#);
    if let Some(caps) = location.captures(text) {
        if let (Some(file), Some(line)) = (caps.name("file"), number(&caps, "line")) {
            return Line::LocationBefore(Location {
                file: file.as_str().to_string(),
                line,
                column: None,
            });
        }
    }

    let error = regex!(
        r"^(?:Sorry: )?(?P<kind>SyntaxError|IndentationError|TabError|ImportError|ModuleNotFoundError|NameError): .+"
    );
    if let Some(caps) = error.captures(text) {
        let kind = match caps.name("kind").map(|m| m.as_str()) {
            Some("SyntaxError" | "IndentationError" | "TabError") => DiagnosticKind::SyntaxError,
            Some("ImportError" | "ModuleNotFoundError") => DiagnosticKind::MissingImport,
            _ => DiagnosticKind::CompilationError,
        };
        let mut diag = Diagnostic::error(text);
        diag.kind = kind;
        return Line::Error(diag);
    }

    if regex!(r"(?:DeprecationWarning|FutureWarning|SyntaxWarning): .+").is_match(text) {
        return Line::Warning(Diagnostic::warning(text));
    }
    Line::Ignore
}

fn classify_javascript(line: &str) -> Line {
    let text = line.trim();

    let tsc = regex!(
        r"^(?P<file>.+?\.[cm]?[jt]sx?)(?:\((?P<line>\d+),(?P<col>\d+)\)|:(?P<line2>\d+):(?P<col2>\d+)) ?[-:] ?error (?P<code>TS\d+): .+"
    );
    if let Some(caps) = tsc.captures(text) {
        let line_no = number(&caps, "line").or_else(|| number(&caps, "line2"));
        let col = number(&caps, "col").or_else(|| number(&caps, "col2"));
        let mut diag = with_code(Diagnostic::error(text), &caps);
        if let (Some(file), Some(line_no)) = (caps.name("file"), line_no) {
            diag = diag.with_location(file.as_str(), line_no, col);
        }
        return Line::Error(diag);
    }

    let node_location = regex!(r"^(?P<file>\S+\.(?:js|mjs|cjs|ts)):(?P<line>\d+)$");
    if let Some(caps) = node_location.captures(text) {
        if let (Some(file), Some(line)) = (caps.name("file"), number(&caps, "line")) {
            return Line::LocationBefore(Location {
                file: file.as_str().to_string(),
                line,
                column: None,
            });
        }
    }

    let error = regex!(r"^(?:Uncaught )?(?P<kind>SyntaxError|ReferenceError|TypeError): .+");
    if let Some(caps) = error.captures(text) {
        let mut diag = Diagnostic::error(text);
        if caps.name("kind").map(|m| m.as_str()) == Some("SyntaxError") {
            diag.kind = DiagnosticKind::SyntaxError;
        }
        return Line::Error(diag);
    }

    if regex!(r"Warning: .+").is_match(text) {
        return Line::Warning(Diagnostic::warning(text));
    }
    Line::Ignore
}

fn classify_go(line: &str) -> Line {
    let text = line.trim();

    let position = regex!(r"^(?P<file>[^\s:]+\.go):(?P<line>\d+):(?:(?P<col>\d+):)? .+");
    if let Some(caps) = position.captures(text) {
        return Line::Error(located(Diagnostic::error(text), &caps));
    }
    if regex!(r"^(?:can't load package|package .+ is not in|no required module provides).*")
        .is_match(text)
    {
        return Line::Error(Diagnostic::error(text));
    }
    if text.contains("build failed") {
        return Line::FailureMarker(text.to_string());
    }
    if regex!(r"^warning: .+").is_match(text) {
        return Line::Warning(Diagnostic::warning(text));
    }
    Line::Ignore
}

// Cargo `--message-format=json` records; only the fields used here.
#[derive(Debug, Deserialize)]
struct CargoRecord {
    reason: String,
    #[serde(default)]
    message: Option<CargoMessage>,
}

#[derive(Debug, Deserialize)]
struct CargoMessage {
    message: String,
    level: String,
    #[serde(default)]
    code: Option<CargoCode>,
    #[serde(default)]
    spans: Vec<CargoSpan>,
}

#[derive(Debug, Deserialize)]
struct CargoCode {
    code: String,
}

#[derive(Debug, Deserialize)]
struct CargoSpan {
    file_name: String,
    line_start: u32,
    column_start: u32,
    is_primary: bool,
}

fn classify_cargo_json(record: CargoRecord) -> Line {
    if record.reason != "compiler-message" {
        return Line::Ignore;
    }
    let Some(msg) = record.message else {
        return Line::Ignore;
    };

    let code = msg.code.as_ref().map(|c| c.code.clone());
    let text = match &code {
        Some(code) => format!("{}[{}]: {}", msg.level, code, msg.message),
        None => format!("{}: {}", msg.level, msg.message),
    };

    let mut diag = if msg.level.starts_with("error") {
        if msg.message.starts_with("aborting due to") {
            return Line::FailureMarker(text);
        }
        Diagnostic::error(text)
    } else if msg.level == "warning" {
        if msg.message.ends_with("warning emitted") || msg.message.ends_with("warnings emitted") {
            return Line::Ignore;
        }
        Diagnostic::warning(text)
    } else {
        return Line::Ignore;
    };

    if let Some(code) = code {
        diag = diag.with_code(code);
    }
    if let Some(span) = msg.spans.iter().find(|s| s.is_primary) {
        diag = diag.with_location(&span.file_name, span.line_start, Some(span.column_start));
    }

    if diag.kind == DiagnosticKind::CompilationError {
        Line::Error(diag)
    } else {
        Line::Warning(diag)
    }
}

fn classify_rust(line: &str) -> Line {
    if line.starts_with('{') {
        if let Ok(record) = serde_json::from_str::<CargoRecord>(line) {
            return classify_cargo_json(record);
        }
    }

    let text = line.trim();
    let span = regex!(r"^--> (?P<file>[^:]+):(?P<line>\d+):(?P<col>\d+)$");
    if let Some(caps) = span.captures(text) {
        if let (Some(file), Some(line)) = (caps.name("file"), number(&caps, "line")) {
            return Line::LocationAfter(Location {
                file: file.as_str().to_string(),
                line,
                column: number(&caps, "col"),
            });
        }
    }

    if let Some(caps) = regex!(r"^error\[(?P<code>E\d+)\]: .+").captures(text) {
        return Line::Error(with_code(Diagnostic::error(text), &caps));
    }
    if regex!(r"^error: (?:could not compile|aborting due to)").is_match(text)
        || text.starts_with("could not compile")
    {
        return Line::FailureMarker(text.to_string());
    }
    if regex!(r"^error: .+").is_match(text) {
        return Line::Error(Diagnostic::error(text));
    }

    if regex!(r"^warning: .*generated \d+ warnings?").is_match(text)
        || text.starts_with("warning: build failed")
    {
        return Line::Ignore;
    }
    if regex!(r"^warning: .+").is_match(text) {
        return Line::Warning(Diagnostic::warning(text));
    }
    Line::Ignore
}

// ---------------------------------------------------------------------------
// Error categories
// ---------------------------------------------------------------------------

/// Category label for an error, from the language's category table.
pub fn categorize(language: Language, diagnostic: &Diagnostic) -> &'static str {
    let message = diagnostic.message.as_str();
    let lower = message.to_ascii_lowercase();
    let code = diagnostic.code.as_deref().unwrap_or_default();

    match language {
        Language::CSharp => match code {
            "CS0103" => "undefined symbol",
            "CS0117" => "missing member",
            "CS0246" => "type or namespace not found",
            "CS1002" | "CS1026" => "syntax error",
            "CS0029" => "type conversion",
            "CS0161" => "missing return",
            "CS0120" => "object reference required",
            _ => "other",
        },
        Language::Python => {
            if message.contains("IndentationError") || message.contains("TabError") {
                "indentation error"
            } else if message.contains("SyntaxError") {
                "syntax error"
            } else if message.contains("NameError") {
                "name error"
            } else if message.contains("ImportError") || message.contains("ModuleNotFoundError") {
                "import error"
            } else {
                "other"
            }
        }
        Language::Java => {
            if lower.contains("cannot find symbol") {
                "symbol not found"
            } else if lower.contains("incompatible types") {
                "type mismatch"
            } else if lower.contains("missing return statement") {
                "missing return"
            } else {
                "other"
            }
        }
        Language::JavaScript | Language::TypeScript => match code {
            "TS2304" | "TS2552" | "TS2307" => "reference error",
            "TS2322" | "TS2345" | "TS2339" => "type error",
            "TS1005" | "TS1128" => "syntax error",
            _ if message.contains("SyntaxError") => "syntax error",
            _ if message.contains("ReferenceError") => "reference error",
            _ if message.contains("TypeError") => "type error",
            _ => "other",
        },
        Language::Go => {
            if message.contains("undefined:") {
                "undefined symbol"
            } else if lower.contains("syntax error") {
                "syntax error"
            } else {
                "other"
            }
        }
        Language::Rust => {
            if lower.contains("cannot find") {
                "symbol not found"
            } else if lower.contains("mismatched types") {
                "type mismatch"
            } else if lower.contains("borrow") {
                "borrow"
            } else {
                "other"
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Fix suggestions
// ---------------------------------------------------------------------------

/// Turn a compile report into ordered fix suggestions.
pub fn suggest_fixes(report: &CompileReport) -> FixSuggestions {
    let mut fixes = FixSuggestions::default();

    for error in &report.errors {
        let lower = error.message.to_ascii_lowercase();
        if error.kind == DiagnosticKind::SyntaxError {
            fixes
                .critical
                .push(format!("Fix syntax error: {}", error.message));
        } else if error.kind == DiagnosticKind::MissingImport {
            fixes.recommended.push(import_suggestion(error));
        } else if lower.contains("undefined") || lower.contains("not found") {
            fixes
                .critical
                .push(format!("Define missing symbol: {}", error.message));
        } else if lower.contains("type") {
            fixes
                .recommended
                .push(format!("Check type compatibility: {}", error.message));
        }
    }

    for warning in &report.warnings {
        if warning.kind == DiagnosticKind::MissingImport {
            fixes.recommended.push(import_suggestion(warning));
        }
    }

    fixes.general = general_suggestions(report.language)
        .iter()
        .map(|s| s.to_string())
        .collect();
    fixes
}

fn import_suggestion(diag: &Diagnostic) -> String {
    diag.suggestion
        .clone()
        .unwrap_or_else(|| format!("Resolve import: {}", diag.message))
}

fn general_suggestions(language: Language) -> &'static [&'static str] {
    match language {
        Language::Python => &[
            "Ensure all imports are available: pip install -r requirements.txt",
            "Check indentation consistency (use spaces or tabs, not mixed)",
            "Verify Python version compatibility",
        ],
        Language::CSharp => &[
            "Run 'dotnet restore' to download packages",
            "Check project target framework compatibility",
            "Ensure all referenced assemblies are available",
        ],
        Language::Java => &[
            "Run 'mvn compile' to check compilation",
            "Verify classpath and dependencies",
            "Check Java version compatibility",
        ],
        Language::JavaScript => &[
            "Run 'npm install' to install dependencies",
            "Check Node.js version compatibility",
            "Verify module paths and imports",
        ],
        Language::TypeScript => &[
            "Run 'npm install' to install dependencies and type definitions",
            "Check tsconfig.json compiler options",
            "Verify module paths and imports",
        ],
        Language::Go => &[
            "Run 'go mod tidy' to sync module requirements",
            "Check that every package is imported and used",
            "Verify Go version in go.mod",
        ],
        Language::Rust => &[
            "Run 'cargo fetch' to download dependencies",
            "Check crate features and editions in Cargo.toml",
            "Follow the compiler's help notes for borrow and lifetime errors",
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Severity;
    use std::path::PathBuf;

    #[test]
    fn test_csharp_errors_with_location_and_summary_dedup() {
        let stdout = "\
Program.cs(10,17): error CS0246: The type or namespace name 'Foo' could not be found [/app/App.csproj]
Program.cs(12,5): warning CS0168: The variable 'x' is declared but never used [/app/App.csproj]

Build FAILED.

Program.cs(12,5): warning CS0168: The variable 'x' is declared but never used [/app/App.csproj]
Program.cs(10,17): error CS0246: The type or namespace name 'Foo' could not be found [/app/App.csproj]
    1 Warning(s)
    1 Error(s)
";
        let parsed = parse_compiler_output(Language::CSharp, stdout, "");
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.warnings.len(), 1);

        let error = &parsed.errors[0];
        assert_eq!(error.file.as_deref(), Some("Program.cs"));
        assert_eq!(error.line, Some(10));
        assert_eq!(error.column, Some(17));
        assert_eq!(error.code.as_deref(), Some("CS0246"));
        assert_eq!(error.category.as_deref(), Some("type or namespace not found"));
        assert_eq!(error.severity, Severity::Critical);
    }

    #[test]
    fn test_csharp_failure_marker_without_details() {
        let parsed = parse_compiler_output(Language::CSharp, "Build FAILED.\n", "");
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].message, "Build FAILED.");
        assert_eq!(parsed.errors[0].category.as_deref(), Some("other"));
    }

    #[test]
    fn test_csharp_nuget_warning() {
        let out = "/app/App.csproj : warning NU1603: App depends on Foo (>= 1.0.0) but Foo 1.0.0 was not found.";
        let parsed = parse_compiler_output(Language::CSharp, out, "");
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.warnings.len(), 1);
        assert_eq!(parsed.warnings[0].code.as_deref(), Some("NU1603"));
    }

    #[test]
    fn test_java_maven_errors_skip_noise() {
        let stdout = "\
[INFO] Compiling 2 source files
[WARNING] /src/main/java/App.java:[3,8] unchecked conversion
[ERROR] COMPILATION ERROR :
[ERROR] /src/main/java/App.java:[5,9] cannot find symbol
[ERROR] /src/main/java/App.java:[7,16] incompatible types: String cannot be converted to int
[ERROR] Failed to execute goal org.apache.maven.plugins:maven-compiler-plugin:3.11.0:compile
[ERROR] -> [Help 1]
[ERROR]
[ERROR] Re-run Maven using the -X switch to enable full debug logging.
[ERROR] For more information about the errors and possible solutions, please read the following articles:
";
        let parsed = parse_compiler_output(Language::Java, stdout, "");
        assert_eq!(parsed.errors.len(), 2);
        assert_eq!(parsed.warnings.len(), 1);
        assert_eq!(parsed.errors[0].line, Some(5));
        assert_eq!(parsed.errors[0].category.as_deref(), Some("symbol not found"));
        assert_eq!(parsed.errors[1].category.as_deref(), Some("type mismatch"));
        assert_eq!(parsed.warnings[0].file.as_deref(), Some("/src/main/java/App.java"));
    }

    #[test]
    fn test_java_continuation_lines_belong_to_their_error() {
        let stdout = "\
[INFO] --- maven-compiler-plugin:3.11.0:compile (default-compile) @ app ---
[INFO] Compiling 1 source file with javac [debug target 17] to target/classes
[INFO] -------------------------------------------------------------
[ERROR] COMPILATION ERROR : 
[INFO] -------------------------------------------------------------
[ERROR] /p/src/main/java/App.java:[5,9] cannot find symbol
[ERROR]   symbol:   variable foo
[ERROR]   location: class App
[INFO] 1 error
[INFO] -------------------------------------------------------------
[INFO] BUILD FAILURE
[ERROR] Failed to execute goal org.apache.maven.plugins:maven-compiler-plugin:3.11.0:compile (default-compile) on project app: Compilation failure
[ERROR] /p/src/main/java/App.java:[5,9] cannot find symbol
[ERROR]   symbol:   variable foo
[ERROR]   location: class App
[ERROR] -> [Help 1]
";
        let parsed = parse_compiler_output(Language::Java, stdout, "");
        assert_eq!(parsed.errors.len(), 1);
        let error = &parsed.errors[0];
        assert_eq!(error.file.as_deref(), Some("/p/src/main/java/App.java"));
        assert_eq!(error.line, Some(5));
        assert_eq!(error.column, Some(9));
        assert_eq!(error.category.as_deref(), Some("symbol not found"));
        assert!(error.message.ends_with("; symbol:   variable foo; location: class App"));
    }

    #[test]
    fn test_python_location_attaches_to_syntax_error() {
        let stderr = "  File \"app/main.py\", line 4\n    def broken(:\n               ^\nSyntaxError: invalid syntax\n";
        let parsed = parse_compiler_output(Language::Python, "", stderr);
        assert_eq!(parsed.errors.len(), 1);

        let error = &parsed.errors[0];
        assert_eq!(error.kind, DiagnosticKind::SyntaxError);
        assert_eq!(error.file.as_deref(), Some("app/main.py"));
        assert_eq!(error.line, Some(4));
        assert_eq!(error.category.as_deref(), Some("syntax error"));
    }

    #[test]
    fn test_python_indentation_and_warning() {
        let stderr = "\
  File \"a.py\", line 2
IndentationError: unexpected indent
/a.py:1: DeprecationWarning: the imp module is deprecated
";
        let parsed = parse_compiler_output(Language::Python, "", stderr);
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].category.as_deref(), Some("indentation error"));
        assert_eq!(parsed.warnings.len(), 1);
    }

    #[test]
    fn test_javascript_node_check() {
        let stderr = "\
/work/src/app.js:3
  const = 5;
        ^

SyntaxError: Unexpected token '='
    at internalCompileFunction (node:internal/vm:76:18)
";
        let parsed = parse_compiler_output(Language::JavaScript, "", stderr);
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].kind, DiagnosticKind::SyntaxError);
        assert_eq!(parsed.errors[0].file.as_deref(), Some("/work/src/app.js"));
        assert_eq!(parsed.errors[0].line, Some(3));
    }

    #[test]
    fn test_typescript_tsc_formats() {
        let stdout = "\
src/index.ts(4,7): error TS2322: Type 'string' is not assignable to type 'number'.
src/util.ts:9:3 - error TS2304: Cannot find name 'foo'.
";
        let parsed = parse_compiler_output(Language::TypeScript, stdout, "");
        assert_eq!(parsed.errors.len(), 2);
        assert_eq!(parsed.errors[0].code.as_deref(), Some("TS2322"));
        assert_eq!(parsed.errors[0].category.as_deref(), Some("type error"));
        assert_eq!(parsed.errors[1].file.as_deref(), Some("src/util.ts"));
        assert_eq!(parsed.errors[1].line, Some(9));
        assert_eq!(parsed.errors[1].column, Some(3));
        assert_eq!(parsed.errors[1].category.as_deref(), Some("reference error"));
    }

    #[test]
    fn test_go_build_errors() {
        let stderr = "\
# example.com/app
./main.go:7:2: undefined: fmt.Printn
./util.go:3:1: syntax error: non-declaration statement outside function body
";
        let parsed = parse_compiler_output(Language::Go, "", stderr);
        assert_eq!(parsed.errors.len(), 2);
        assert_eq!(parsed.errors[0].file.as_deref(), Some("./main.go"));
        assert_eq!(parsed.errors[0].category.as_deref(), Some("undefined symbol"));
        assert_eq!(parsed.errors[1].category.as_deref(), Some("syntax error"));
    }

    #[test]
    fn test_rust_text_output() {
        let stderr = "\
warning: unused variable: `x`
 --> src/main.rs:2:9
error[E0308]: mismatched types
 --> src/main.rs:3:18
  |
3 |     let y: u32 = \"a\";
  |                  ^^^ expected `u32`, found `&str`

warning: `demo` (bin \"demo\") generated 1 warning
error: could not compile `demo` (bin \"demo\") due to 1 previous error; 1 warning emitted
";
        let parsed = parse_compiler_output(Language::Rust, "", stderr);
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.warnings.len(), 1);

        let error = &parsed.errors[0];
        assert_eq!(error.code.as_deref(), Some("E0308"));
        assert_eq!(error.file.as_deref(), Some("src/main.rs"));
        assert_eq!(error.line, Some(3));
        assert_eq!(error.column, Some(18));
        assert_eq!(error.category.as_deref(), Some("type mismatch"));
        assert_eq!(parsed.warnings[0].line, Some(2));
    }

    #[test]
    fn test_rust_cargo_json_messages() {
        let stdout = concat!(
            r#"{"reason":"compiler-artifact","package_id":"demo 0.1.0"}"#,
            "\n",
            r#"{"reason":"compiler-message","message":{"message":"cannot find value `z` in this scope","level":"error","code":{"code":"E0425","explanation":null},"spans":[{"file_name":"src/lib.rs","line_start":5,"column_start":13,"is_primary":true}]}}"#,
            "\n",
            r#"{"reason":"compiler-message","message":{"message":"unused import: `std::fmt`","level":"warning","code":null,"spans":[{"file_name":"src/lib.rs","line_start":1,"column_start":5,"is_primary":true}]}}"#,
            "\n",
            r#"{"reason":"compiler-message","message":{"message":"aborting due to 1 previous error","level":"error","code":null,"spans":[]}}"#,
            "\n",
            r#"{"reason":"build-finished","success":false}"#,
        );
        let stderr = "error: could not compile `demo` (lib) due to 1 previous error\n";
        let parsed = parse_compiler_output(Language::Rust, stdout, stderr);

        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.warnings.len(), 1);
        let error = &parsed.errors[0];
        assert_eq!(error.message, "error[E0425]: cannot find value `z` in this scope");
        assert_eq!(error.code.as_deref(), Some("E0425"));
        assert_eq!(error.line, Some(5));
        assert_eq!(error.category.as_deref(), Some("symbol not found"));
    }

    #[test]
    fn test_rust_marker_only_counts_once() {
        let stderr = "error: could not compile `demo`\nerror: aborting due to 2 previous errors\n";
        let parsed = parse_compiler_output(Language::Rust, "", stderr);
        assert_eq!(parsed.errors.len(), 1);
    }

    #[test]
    fn test_clean_output_has_no_diagnostics() {
        let parsed = parse_compiler_output(Language::Go, "ok\n", "");
        assert!(parsed.is_clean());
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn test_suggest_fixes() {
        let mut report = CompileReport::new(Language::Python, PathBuf::from("."));
        report.errors = vec![
            Diagnostic::new(DiagnosticKind::SyntaxError, Severity::Critical, "bad token"),
            Diagnostic::error("NameError: name 'foo' is undefined"),
            Diagnostic::error("argument type mismatch"),
        ];
        report.warnings = vec![
            Diagnostic::new(DiagnosticKind::MissingImport, Severity::Medium, "Module 'requests' may not be available")
                .with_suggestion("Install with: pip install requests"),
        ];

        let fixes = suggest_fixes(&report);
        assert_eq!(
            fixes.critical,
            vec![
                "Fix syntax error: bad token".to_string(),
                "Define missing symbol: NameError: name 'foo' is undefined".to_string(),
            ]
        );
        assert_eq!(
            fixes.recommended,
            vec![
                "Check type compatibility: argument type mismatch".to_string(),
                "Install with: pip install requests".to_string(),
            ]
        );
        assert_eq!(fixes.general.len(), 3);
    }
}
