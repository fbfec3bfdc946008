//! Result envelope decoding
//!
//! Every synchronous engine call returns the same JSON wrapper
//! `{errorCode, message, data}`. One decoding rule covers init, start,
//! close, ping, order entry and queries alike; there are no per-call
//! special cases.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::GatewayError;

/// Generic success/error wrapper returned by every synchronous engine call.
/// Transient: decoded and discarded as soon as the call returns.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub error_code: i32,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl Envelope {
    /// Parse the raw envelope text
    pub fn parse(raw: &str) -> Result<Self, GatewayError> {
        serde_json::from_str(raw).map_err(|e| GatewayError::Decode(format!("envelope: {e}")))
    }

    /// Extract `data`, surfacing a non-zero `errorCode` as an error.
    /// An error envelope never exposes its `data`.
    pub fn into_data(self) -> Result<Option<Value>, GatewayError> {
        if self.error_code != 0 {
            return Err(GatewayError::EngineCall {
                code: self.error_code,
                message: self.message,
            });
        }
        Ok(self.data)
    }
}

/// Decode a call result whose `data` must deserialize into `T`
pub fn decode_data<T: DeserializeOwned>(raw: &str, what: &'static str) -> Result<T, GatewayError> {
    let data = Envelope::parse(raw)?
        .into_data()?
        .ok_or(GatewayError::MissingData(what))?;
    serde_json::from_value(data).map_err(|e| GatewayError::Decode(format!("{what}: {e}")))
}

/// Decode a call result whose `data` is irrelevant
pub fn decode_unit(raw: &str) -> Result<(), GatewayError> {
    Envelope::parse(raw)?.into_data()?;
    Ok(())
}
