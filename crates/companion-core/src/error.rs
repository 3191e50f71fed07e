use thiserror::Error;

/// Errors raised while decoding a single inbound data frame. These never
/// tear down the connection; the frame is logged and dropped.
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Unrecognized message type")]
    UnknownType,
}
