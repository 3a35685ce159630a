#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Unknown job kind: '{0}'")]
    UnknownJobKind(String),

    #[error("Validation failed: {0}")]
    Validation(String),
}
