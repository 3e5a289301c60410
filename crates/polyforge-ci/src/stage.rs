//! Per-language tool-chain stage tables.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use polyforge_core::{ForgeError, Language, Operation, StageConfig, TimeoutConfig};
use serde::{Deserialize, Serialize};

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|p| p.to_string()).collect()
}

/// Command for `operation` in a `language` project, if the tool-chain has one.
pub fn command_for(language: Language, operation: Operation) -> Option<Vec<String>> {
    use Language::*;
    use Operation::*;

    let parts: &[&str] = match (language, operation) {
        (CSharp, Restore) => &["dotnet", "restore"],
        (CSharp, Build) => &["dotnet", "build"],
        (CSharp, Compile) => &["dotnet", "build", "--verbosity", "detailed"],
        (CSharp, Test) => &[
            "dotnet",
            "test",
            "--logger",
            "trx",
            "--logger",
            "console;verbosity=detailed",
        ],
        (CSharp, Coverage) => &["dotnet", "test", "--collect:XPlat Code Coverage"],
        (CSharp, Clean) => &["dotnet", "clean"],

        (Java, Restore) => &["mvn", "dependency:resolve"],
        (Java, Build) => &["mvn", "compile", "test-compile"],
        (Java, Compile) => &["mvn", "compile", "-X"],
        (Java, Test) => &["mvn", "test"],
        (Java, Coverage) => &["mvn", "test", "jacoco:report"],
        (Java, Clean) => &["mvn", "clean"],

        (Python, Restore) => &["pip", "install", "-r", "requirements.txt"],
        (Python, Build) => &["python", "-m", "compileall", "-q", "."],
        (Python, Compile) => &["python", "-m", "py_compile"],
        (Python, Test) => &[
            "pytest",
            "--junitxml=pytest-results.xml",
            "--verbose",
            "--tb=short",
        ],
        (Python, Coverage) => &["pytest", "--cov=.", "--cov-report=xml", "--cov-report=term"],
        (Python, Clean) => return None,

        (JavaScript, Restore) | (TypeScript, Restore) => &["npm", "install"],
        (JavaScript, Build) => &["npm", "run", "build"],
        (JavaScript, Compile) => &["node", "--check"],
        (TypeScript, Build) | (TypeScript, Compile) => &["npx", "tsc", "--noEmit"],
        (JavaScript, Test) | (TypeScript, Test) => &["npm", "test"],
        (JavaScript, Coverage) | (TypeScript, Coverage) => &["npm", "run", "test:coverage"],
        (JavaScript, Clean) | (TypeScript, Clean) => &["npm", "run", "clean"],

        (Go, Restore) => &["go", "mod", "download"],
        (Go, Build) => &["go", "build", "./..."],
        (Go, Compile) => &["go", "build", "-v", "./..."],
        (Go, Test) => &["go", "test", "-v", "-json", "./..."],
        (Go, Coverage) => &["go", "test", "-cover", "-coverprofile=coverage.out", "./..."],
        (Go, Clean) => &["go", "clean"],

        (Rust, Restore) => &["cargo", "fetch"],
        (Rust, Build) => &["cargo", "build"],
        (Rust, Compile) => &["cargo", "check", "--message-format=json"],
        (Rust, Test) => &["cargo", "test"],
        (Rust, Coverage) => &["cargo", "tarpaulin", "--out", "xml"],
        (Rust, Clean) => &["cargo", "clean"],
    };
    Some(argv(parts))
}

/// Stage name, e.g. `go_test`.
pub fn stage_name(language: Language, operation: Operation) -> String {
    format!("{}_{}", language.key(), operation.as_str())
}

/// Stage for `operation`, with its timeout taken from `timeouts`.
pub fn stage_for(
    language: Language,
    operation: Operation,
    timeouts: &TimeoutConfig,
) -> Option<StageConfig> {
    command_for(language, operation).map(|command| {
        StageConfig::new(
            stage_name(language, operation),
            command,
            timeouts.for_operation(operation),
        )
    })
}

/// Whether the compile check runs once per source file instead of once
/// per project.
pub fn checks_per_file(language: Language) -> bool {
    matches!(language, Language::Python | Language::JavaScript)
}

/// Compile check of a single file (`py_compile`, `node --check`).
pub fn per_file_compile_stage(
    language: Language,
    file: &Path,
    timeouts: &TimeoutConfig,
) -> Option<StageConfig> {
    if !checks_per_file(language) {
        return None;
    }
    stage_for(language, Operation::Compile, timeouts).map(|stage| {
        stage
            .with_args([file.to_string_lossy().into_owned()])
            .with_timeout(timeouts.compile_per_file)
    })
}

/// Availability probe for a tool: `<tool> --version` or `<tool> --help`.
pub fn probe_stage(tool: &str, flag: &str, timeouts: &TimeoutConfig) -> StageConfig {
    StageConfig::new(
        format!("probe_{tool}"),
        vec![tool.to_string(), flag.to_string()],
        timeouts.probe,
    )
}

/// Globs (relative to the project root) of result files a test run
/// leaves behind, most specific first.
pub fn result_file_patterns(language: Language) -> &'static [&'static str] {
    match language {
        Language::CSharp => &["**/TestResults/*.trx"],
        Language::Java => &["**/target/surefire-reports/*.xml"],
        Language::Python => &["pytest-results.xml", "test-results.xml"],
        Language::JavaScript | Language::TypeScript => &["test-results.xml", "junit.xml"],
        Language::Go => &["test-results.json"],
        Language::Rust => &[],
    }
}

// ---------------------------------------------------------------------------
// Application runs
// ---------------------------------------------------------------------------

/// How an application is launched by the app runner.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RunKind {
    Console,
    Test,
    TestCoverage,
    Debug,
    Release,
    Bench,
}

impl RunKind {
    pub const ALL: [RunKind; 6] = [
        RunKind::Console,
        RunKind::Test,
        RunKind::TestCoverage,
        RunKind::Debug,
        RunKind::Release,
        RunKind::Bench,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RunKind::Console => "console",
            RunKind::Test => "test",
            RunKind::TestCoverage => "test_coverage",
            RunKind::Debug => "debug",
            RunKind::Release => "release",
            RunKind::Bench => "bench",
        }
    }
}

impl fmt::Display for RunKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunKind {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        RunKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| ForgeError::InvalidConfig(format!("unknown run kind: {s}")))
    }
}

/// Command that launches a project as `kind`, if the language supports it.
pub fn run_command(language: Language, kind: RunKind) -> Option<Vec<String>> {
    use Language::*;
    use RunKind::*;

    let parts: &[&str] = match (language, kind) {
        (CSharp, Console) => &["dotnet", "run"],
        (CSharp, Test) => &["dotnet", "test", "--verbosity", "normal"],
        (CSharp, TestCoverage) => &["dotnet", "test", "--collect:XPlat Code Coverage"],
        (CSharp, Debug) => &["dotnet", "run", "--configuration", "Debug"],
        (CSharp, Release) => &["dotnet", "run", "--configuration", "Release"],

        (Java, Console) => &["mvn", "exec:java"],
        (Java, Test) => &["mvn", "test"],
        (Java, TestCoverage) => &["mvn", "test", "jacoco:report"],
        (Java, Debug) => &[
            "mvn",
            "exec:java",
            "-Dexec.args=-agentlib:jdwp=transport=dt_socket,server=y,suspend=n,address=5005",
        ],

        (Python, Console) => &["python", "main.py"],
        (Python, Test) => &["pytest", "-v"],
        (Python, TestCoverage) => &["pytest", "--cov=.", "--cov-report=html"],
        (Python, Debug) => &["python", "-m", "pdb", "main.py"],

        (JavaScript, Console) => &["node", "index.js"],
        (JavaScript, Debug) => &["node", "--inspect", "index.js"],
        (TypeScript, Console) => &["npm", "start"],
        (JavaScript, Test) | (TypeScript, Test) => &["npm", "test"],
        (JavaScript, TestCoverage) | (TypeScript, TestCoverage) => {
            &["npm", "run", "test:coverage"]
        }

        (Go, Console) => &["go", "run", "main.go"],
        (Go, Test) => &["go", "test", "-v", "./..."],
        (Go, TestCoverage) => &["go", "test", "-coverprofile=coverage.out", "./..."],
        (Go, Debug) => &["dlv", "debug"],
        (Go, Bench) => &["go", "test", "-bench=.", "./..."],

        (Rust, Console) => &["cargo", "run"],
        (Rust, Test) => &["cargo", "test"],
        (Rust, TestCoverage) => &["cargo", "tarpaulin"],
        (Rust, Debug) => &["cargo", "run", "--", "--debug"],
        (Rust, Release) => &["cargo", "run", "--release"],
        (Rust, Bench) => &["cargo", "bench"],

        _ => return None,
    };
    Some(argv(parts))
}

/// Run kinds that have a command for `language`.
pub fn available_run_kinds(language: Language) -> Vec<RunKind> {
    RunKind::ALL
        .into_iter()
        .filter(|kind| run_command(language, *kind).is_some())
        .collect()
}

// ---------------------------------------------------------------------------
// Runtime requirements
// ---------------------------------------------------------------------------

/// An environment variable a runtime reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvRequirement {
    pub name: &'static str,
    /// Missing critical variables make the project not ready to run.
    pub critical: bool,
}

/// What a language runtime needs to launch a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeRequirements {
    pub commands: &'static [&'static str],
    /// File name patterns; `*` marks a wildcard prefix (`*.csproj`).
    pub files: &'static [&'static str],
    pub env: &'static [EnvRequirement],
}

pub fn runtime_requirements(language: Language) -> RuntimeRequirements {
    match language {
        Language::CSharp => RuntimeRequirements {
            commands: &["dotnet"],
            files: &["*.csproj", "*.sln"],
            env: &[],
        },
        Language::Java => RuntimeRequirements {
            commands: &["java", "mvn"],
            files: &["pom.xml", "build.gradle"],
            env: &[EnvRequirement {
                name: "JAVA_HOME",
                critical: true,
            }],
        },
        Language::Python => RuntimeRequirements {
            commands: &["python"],
            files: &["requirements.txt", "setup.py", "main.py"],
            env: &[],
        },
        Language::JavaScript => RuntimeRequirements {
            commands: &["node", "npm"],
            files: &["package.json"],
            env: &[],
        },
        Language::TypeScript => RuntimeRequirements {
            commands: &["node", "npm", "npx"],
            files: &["package.json", "tsconfig.json"],
            env: &[],
        },
        Language::Go => RuntimeRequirements {
            commands: &["go"],
            files: &["go.mod"],
            env: &[
                EnvRequirement {
                    name: "GOPATH",
                    critical: false,
                },
                EnvRequirement {
                    name: "GOROOT",
                    critical: false,
                },
            ],
        },
        Language::Rust => RuntimeRequirements {
            commands: &["cargo", "rustc"],
            files: &["Cargo.toml"],
            env: &[],
        },
    }
}

/// Match a file name against a requirement pattern (`pom.xml`, `*.csproj`).
pub fn file_pattern_matches(pattern: &str, file_name: &str) -> bool {
    match pattern.strip_prefix('*') {
        Some(suffix) => file_name.ends_with(suffix),
        None => file_name == pattern,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_language_has_test_and_build_stages() {
        let timeouts = TimeoutConfig::default();
        for language in Language::ALL {
            for op in [Operation::Restore, Operation::Build, Operation::Test] {
                let stage = stage_for(language, op, &timeouts)
                    .unwrap_or_else(|| panic!("{language} {op}"));
                assert!(!stage.command.is_empty());
                assert_eq!(stage.timeout_secs, timeouts.for_operation(op));
            }
        }
    }

    #[test]
    fn test_stage_names_and_timeouts() {
        let timeouts = TimeoutConfig::default();
        let stage = stage_for(Language::Go, Operation::Test, &timeouts).unwrap();
        assert_eq!(stage.name, "go_test");
        assert_eq!(stage.command_line(), "go test -v -json ./...");
        assert_eq!(stage.timeout_secs, 600);

        let stage = stage_for(Language::Java, Operation::Restore, &timeouts).unwrap();
        assert_eq!(stage.timeout_secs, 300);
        assert!(stage_for(Language::Python, Operation::Clean, &timeouts).is_none());
    }

    #[test]
    fn test_per_file_compile_stage() {
        let timeouts = TimeoutConfig::default();
        let stage =
            per_file_compile_stage(Language::JavaScript, Path::new("src/app.js"), &timeouts)
                .unwrap();
        assert_eq!(stage.command, vec!["node", "--check", "src/app.js"]);
        assert_eq!(stage.timeout_secs, 30);

        let stage =
            per_file_compile_stage(Language::Python, Path::new("calc.py"), &timeouts).unwrap();
        assert_eq!(stage.command_line(), "python -m py_compile calc.py");

        assert!(per_file_compile_stage(Language::Go, Path::new("main.go"), &timeouts).is_none());
    }

    #[test]
    fn test_run_kinds() {
        assert_eq!(
            run_command(Language::Rust, RunKind::Release).unwrap(),
            vec!["cargo", "run", "--release"]
        );
        assert!(run_command(Language::Python, RunKind::Release).is_none());
        assert_eq!("test-coverage".parse::<RunKind>().unwrap(), RunKind::TestCoverage);
        assert!("launch".parse::<RunKind>().is_err());
        assert_eq!(
            available_run_kinds(Language::CSharp),
            vec![
                RunKind::Console,
                RunKind::Test,
                RunKind::TestCoverage,
                RunKind::Debug,
                RunKind::Release
            ]
        );
    }

    #[test]
    fn test_java_home_is_critical() {
        let reqs = runtime_requirements(Language::Java);
        assert_eq!(reqs.env.len(), 1);
        assert_eq!(reqs.env[0].name, "JAVA_HOME");
        assert!(reqs.env[0].critical);
        assert!(runtime_requirements(Language::Go).env.iter().all(|e| !e.critical));
    }

    #[test]
    fn test_file_pattern_matches() {
        assert!(file_pattern_matches("*.csproj", "App.csproj"));
        assert!(!file_pattern_matches("*.csproj", "App.cs"));
        assert!(file_pattern_matches("pom.xml", "pom.xml"));
        assert!(!file_pattern_matches("pom.xml", "old-pom.xml"));
    }
}
