use thiserror::Error;
#[derive(Debug, Error)]
pub enum ScopeError {
    #[error("sample rate must be greater than zero")]
    InvalidSampleRate,
    #[error("window must be longer than zero seconds, got {0}")]
    InvalidWindow(f64),
    #[error("no endpoint selected")]
    EndpointRequired,
    #[error("malformed stream payload: {0}")]
    Decode(#[from] serde_json::Error),
}
