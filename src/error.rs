use thiserror::Error;

#[derive(Debug, Error)]
pub enum TsqlTemplateError {
    #[error(transparent)]
    MssqlError(#[from] tiberius::error::Error),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter conversion error: {0}")]
    ParameterError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),
}
