//! Hermes Gateway
//!
//! Subscription dispatch and candle aggregation over an opaque execution
//! engine. The engine delivers market data and trade events by calling in
//! from its own threads; the gateway demultiplexes every callback to the
//! registered per-unit handler while serializing all delivery for a unit,
//! and maintains a bounded, gap-aware rolling window of candle bars per
//! kline subscription.
//!
//! ## Architecture
//!
//! ```text
//! Engine thread ──> Dispatcher (EngineEvents)
//!                      │ unit lock (acquire)
//!                      │ registry lookup
//!                      │ candle window transition   (kline path only)
//!                      │ strategy handler
//!                      ▼ unit lock (release)
//!
//! Strategy code ──> Gateway ──> ExecutionEngine (sync calls, envelopes)
//! ```
//!
//! ## Ordering model
//!
//! Within one unit, callback bodies are fully serialized across tick,
//! kline and trade channels; FIFO order among them is only as strong as
//! the engine's delivery order. Across units there is no relationship;
//! callbacks run fully in parallel.

pub mod dispatch;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod locks;
pub mod registry;
pub mod window;

mod gateway;

// Re-export commonly used types
pub use dispatch::{Dispatcher, EVENT_ORDER, EVENT_POSITION};
pub use engine::{ConnectConfig, EngineEvents, ExecutionEngine, Mode, TradeConfig};
pub use envelope::Envelope;
pub use error::GatewayError;
pub use gateway::Gateway;
pub use registry::{
    KlineHandler, KlineState, OrderHandler, PositionHandler, SubscriptionRegistry, TickHandler,
    TickState, TradeState,
};
pub use window::{CandleWindow, WindowEvent};
