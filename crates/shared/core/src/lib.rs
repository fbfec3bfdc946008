//! Hermes Core Domain
//!
//! Pure domain types for the hermes market-data gateway.
//! Every payload crossing the engine boundary is decoded once into one of
//! these records; internal code never re-inspects raw JSON.
//! This crate contains no locking, no I/O, and is 100% unit testable.

pub mod entities;

// Re-export commonly used types at crate root
pub use entities::{
    Account,
    Bar,
    BookLevel,
    // Trade-event payloads
    Order,
    OrderRequest,
    OrderStatus,
    OrderType,
    Position,
    PositionSide,
    Side,
    // Market payloads
    Tick,
    TimeInForce,
};
