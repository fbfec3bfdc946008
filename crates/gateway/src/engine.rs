//! Execution engine port
//!
//! The engine is an opaque, independently threaded collaborator. It is
//! specified here only at its interface: synchronous calls that return a
//! raw JSON result envelope, and asynchronous events it delivers by
//! calling into the bound [`EngineEvents`] sink from its own threads:
//! an unmanaged pool of unspecified size, with no ordering guarantees
//! across units.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Engine operating mode selected at init time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Real,
    Sim,
    Backtest,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Real => "REAL",
            Mode::Sim => "SIM",
            Mode::Backtest => "BACKTEST",
        }
    }
}

/// Connection configuration serialized into the engine's init call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectConfig {
    pub log_utc: bool,
    pub log_level: String,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            log_utc: false,
            log_level: "INFO".to_string(),
            api_key: None,
            api_secret: None,
        }
    }
}

/// Per-symbol trading configuration for the trade-event channel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeConfig {
    pub leverage: u32,
    pub margin_mode: String,
}

impl Default for TradeConfig {
    fn default() -> Self {
        Self {
            leverage: 1,
            margin_mode: "CROSSED".to_string(),
        }
    }
}

/// Callback surface the engine invokes from its own threads.
///
/// Payloads arrive as UTF-8 JSON text; the dispatcher decodes them once at
/// this boundary. Implementations must tolerate arbitrary concurrent entry.
pub trait EngineEvents: Send + Sync {
    /// Tick update for a unit's market subscription
    fn on_tick(&self, unit_id: &str, payload: &str);

    /// Candle bar update for a unit's kline subscription
    fn on_kline(&self, unit_id: &str, payload: &str);

    /// Trading event (`ORDER` or `POSITION` discriminator) for a unit
    fn on_trade_event(&self, unit_id: &str, event_type: &str, payload: &str);
}

/// Synchronous call surface of the execution engine.
///
/// Every call blocks until the engine answers and returns the raw JSON
/// result envelope; [`crate::envelope`] applies the one decoding rule.
/// `bind` installs the event sink once, before any subscription; it is
/// the native boundary's equivalent of registering callback pointers.
pub trait ExecutionEngine: Send + Sync {
    /// Install the callback sink events are delivered to
    fn bind(&self, sink: Arc<dyn EngineEvents>);

    fn init(&self, exchange: &str, mode: &str, config_json: &str) -> String;
    fn start(&self) -> String;
    fn close(&self) -> String;
    fn get_server_ping(&self) -> String;

    fn subscribe_tick(&self, unit_id: &str, symbol: &str) -> String;
    fn subscribe_kline(
        &self,
        unit_id: &str,
        symbol: &str,
        interval: &str,
        init_count: usize,
    ) -> String;
    fn init_symbol_trade(&self, unit_id: &str, symbol: &str, config_json: &str) -> String;

    fn new_order(&self, symbol: &str, order_json: &str) -> String;
    fn cancel_order(&self, symbol: &str, order_id: &str) -> String;
    fn cancel_orders(&self, symbol: &str) -> String;
    fn get_positions(&self, symbol: &str) -> String;
    fn get_account(&self, symbol: &str) -> String;
}
