//! Wire-level domain entities
//!
//! Field names and casing follow the engine's JSON wire format, so these
//! types deserialize directly from callback payloads and envelope `data`.

mod account;
mod bar;
mod order;
mod position;
mod tick;

pub use account::Account;
pub use bar::Bar;
pub use order::{Order, OrderRequest, OrderStatus, OrderType, Side, TimeInForce};
pub use position::{Position, PositionSide};
pub use tick::{BookLevel, Tick};
