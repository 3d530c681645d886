use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    /// No usable credential; the presentation layer shows the setup banner.
    #[error("Core is not configured: {reason}")]
    Unconfigured { reason: String },

    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
