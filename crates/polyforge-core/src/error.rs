//! Error taxonomy for polyforge.

/// Errors produced while running an external tool.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("stage {stage} has an empty command")]
    EmptyCommand { stage: String },

    #[error("tool not found: {tool}")]
    ToolNotFound { tool: String },

    #[error("{command} timed out after {secs} seconds")]
    Timeout { command: String, secs: u64 },

    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// polyforge domain errors.
#[derive(Debug, thiserror::Error)]
pub enum ForgeError {
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("result file parse error: {0}")]
    ResultParse(String),

    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("execution error: {0}")]
    Exec(#[from] ExecError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for polyforge operations.
pub type Result<T> = std::result::Result<T, ForgeError>;
