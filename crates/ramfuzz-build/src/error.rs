use miette::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BuildError>;

/// Why a project configuration or compilation database could not be loaded.
#[derive(Error, Diagnostic, Debug)]
pub enum BuildError {
    #[error("could not read project file: {0}")]
    #[diagnostic(code(ramfuzz::build::io))]
    ReadConfig(#[from] std::io::Error),

    #[error("invalid ramfuzz.toml: {0}")]
    #[diagnostic(code(ramfuzz::build::toml))]
    ParseToml(#[from] toml::de::Error),

    #[error("invalid compilation database: {0}")]
    #[diagnostic(
        code(ramfuzz::build::compile_commands),
        help("expected a JSON array of {{directory, file, command|arguments}} objects")
    )]
    ParseJson(#[from] serde_json::Error),

    #[error("{0}")]
    #[diagnostic(code(ramfuzz::build::invalid))]
    Validation(String),
}
