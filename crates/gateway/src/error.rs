//! Error types for the gateway crate

use thiserror::Error;

/// Errors surfaced by the gateway's synchronous call surface
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Non-zero result envelope from a synchronous engine call
    #[error("engine call failed (code {code}): {message}")]
    EngineCall { code: i32, message: String },

    /// Malformed envelope or payload coming back from the engine
    #[error("decode failed: {0}")]
    Decode(String),

    /// A payload could not be serialized for the engine
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The engine answered success but omitted the expected data
    #[error("engine returned no data where {0} was expected")]
    MissingData(&'static str),

    /// A kline window must hold at least one bar
    #[error("invalid kline window capacity: {0}")]
    InvalidCapacity(usize),
}

impl From<serde_json::Error> for GatewayError {
    fn from(e: serde_json::Error) -> Self {
        GatewayError::Serialization(e.to_string())
    }
}
