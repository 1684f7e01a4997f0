use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InspectorError {
    #[error("must pass a valid map when creating an inspector")]
    MissingHostMap,
    #[error("an inspector needs a backend to query")]
    MissingBackend,
    #[error("an inspector needs a cursor sink")]
    MissingCursorSink,
    #[error("invalid inspector options: {0}")]
    InvalidOptions(String),
    #[error("a toolbar cannot be initialized without main tools")]
    EmptyToolbar,
}
