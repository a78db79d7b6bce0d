use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown {kind}: '{value}'")]
    UnknownStatus { kind: &'static str, value: String },
    #[error("unknown report stage: '{0}'")]
    UnknownStage(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
