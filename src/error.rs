use thiserror::Error;

pub type TabcalcResult<T> = Result<T, TabcalcError>;

#[derive(Error, Debug)]
pub enum TabcalcError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Table source error: {0}")]
    Source(String),

    #[error("Validation error: {0}")]
    Validation(String),
}
