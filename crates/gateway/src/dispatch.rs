//! Callback demultiplexer
//!
//! Entry points the engine invokes from its own threads. Each callback
//! decodes its payload, takes the unit's lock, looks up the registration,
//! mutates window state (kline path), then invokes the strategy handler,
//! all while the lock is held, so a unit never observes two overlapping
//! callback bodies across any channel kind. Different units proceed fully
//! in parallel.
//!
//! Known constraints, inherent to this serialization model:
//! - a slow or blocking handler stalls all later callbacks for its unit
//!   until it returns; there is no callback deadline
//! - a handler may call the synchronous trading surface freely (it takes
//!   no unit lock), but re-registering its *own* unit from inside a
//!   callback would self-deadlock
//! - a handler panic unwinds through the entry point to the engine thread;
//!   the unit lock is released on unwind and the unit stays serviceable

use log::{debug, warn};
use serde::de::DeserializeOwned;

use hermes_core::{Bar, Order, Position, Tick};

use crate::engine::EngineEvents;
use crate::locks::UnitLocks;
use crate::registry::{KlineState, SubscriptionRegistry};

/// Trade-event discriminator for order updates
pub const EVENT_ORDER: &str = "ORDER";

/// Trade-event discriminator for position updates
pub const EVENT_POSITION: &str = "POSITION";

/// Dispatch context: owns the unit lock domain and the subscription
/// registry. Constructed once at startup and handed to the engine as its
/// callback sink; there is no process-global state.
#[derive(Default)]
pub struct Dispatcher {
    locks: UnitLocks,
    registry: SubscriptionRegistry,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn locks(&self) -> &UnitLocks {
        &self.locks
    }

    pub(crate) fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }

    /// Decode a callback payload; a malformed payload is fatal to this one
    /// invocation only (logged, handler skipped).
    fn decode<T: DeserializeOwned>(channel: &str, unit_id: &str, payload: &str) -> Option<T> {
        match serde_json::from_str(payload) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("undecodable {channel} payload for unit {unit_id}, handler skipped: {e}");
                None
            }
        }
    }
}

impl EngineEvents for Dispatcher {
    fn on_tick(&self, unit_id: &str, payload: &str) {
        let Some(tick) = Self::decode::<Tick>("tick", unit_id, payload) else {
            return;
        };

        let lock = self.locks.lock_for(unit_id);
        let _unit = lock.lock();

        let Some(state) = self.registry.tick(unit_id) else {
            return;
        };
        let mut state = state.lock();
        (state.handler)(&tick);
    }

    fn on_kline(&self, unit_id: &str, payload: &str) {
        let Some(bar) = Self::decode::<Bar>("kline", unit_id, payload) else {
            return;
        };

        let lock = self.locks.lock_for(unit_id);
        let _unit = lock.lock();

        let Some(state) = self.registry.kline(unit_id) else {
            return;
        };
        let mut state = state.lock();

        // The window commits before the handler runs: a faulting handler
        // degrades this one callback, never the stored history.
        let event = state.window.apply(bar.clone());
        if !event.notifies() {
            return;
        }

        let KlineState { handler, window } = &mut *state;
        if let Some(handler) = handler {
            handler(window.bars(), &bar);
        }
    }

    fn on_trade_event(&self, unit_id: &str, event_type: &str, payload: &str) {
        match event_type {
            EVENT_ORDER => {
                let Some(order) = Self::decode::<Order>("order event", unit_id, payload) else {
                    return;
                };

                let lock = self.locks.lock_for(unit_id);
                let _unit = lock.lock();

                let Some(state) = self.registry.trade(unit_id) else {
                    return;
                };
                let mut state = state.lock();
                if let Some(handler) = &mut state.on_order {
                    handler(&order);
                }
            }
            EVENT_POSITION => {
                let Some(position) = Self::decode::<Position>("position event", unit_id, payload)
                else {
                    return;
                };

                let lock = self.locks.lock_for(unit_id);
                let _unit = lock.lock();

                let Some(state) = self.registry.trade(unit_id) else {
                    return;
                };
                let mut state = state.lock();
                if let Some(handler) = &mut state.on_position {
                    handler(&position);
                }
            }
            other => {
                debug!("trade event {other} for unit {unit_id} ignored");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{TickState, TradeState};
    use crate::window::CandleWindow;
    use chrono::{TimeZone, Utc};
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn bar_json(minute: u32, close: u32) -> String {
        format!(
            r#"{{"symbol":"BTCUSDT","interval":"1m","datetime":"2024-03-01T09:{minute:02}:00Z",
                 "open":{close},"high":{close},"low":{close},"close":{close},
                 "volume":1,"turnover":1}}"#
        )
    }

    fn tick_json() -> String {
        r#"{"symbol":"BTCUSDT","datetime":"2024-03-01T09:00:00Z",
            "open":1,"high":1,"low":1,"close":1,"volume":1,"turnover":1}"#
            .to_string()
    }

    #[test]
    fn test_tick_delivered_verbatim() {
        let dispatcher = Dispatcher::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        dispatcher.registry().register_tick(
            "u1",
            TickState {
                handler: Box::new(move |tick: &Tick| sink.lock().push(tick.clone())),
            },
        );

        dispatcher.on_tick("u1", &tick_json());
        dispatcher.on_tick("u1", &tick_json());

        assert_eq!(seen.lock().len(), 2);
        assert_eq!(seen.lock()[0].symbol, "BTCUSDT");
    }

    #[test]
    fn test_unregistered_unit_is_dropped() {
        let dispatcher = Dispatcher::new();
        // No registration at all: must not panic, lock is created lazily
        dispatcher.on_tick("ghost", &tick_json());
        dispatcher.on_kline("ghost", &bar_json(0, 1));
        assert_eq!(dispatcher.locks().len(), 1);
    }

    #[test]
    fn test_kline_notification_skips_out_of_order() {
        let dispatcher = Dispatcher::new();
        let notified = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&notified);
        dispatcher.registry().register_kline(
            "u1",
            KlineState {
                handler: Some(Box::new(move |window: &[Bar], bar: &Bar| {
                    sink.lock().push((window.len(), bar.datetime));
                })),
                window: CandleWindow::new(3),
            },
        );

        dispatcher.on_kline("u1", &bar_json(1, 10));
        dispatcher.on_kline("u1", &bar_json(2, 20));
        dispatcher.on_kline("u1", &bar_json(2, 21)); // replace
        dispatcher.on_kline("u1", &bar_json(0, 5)); // out of order, silent
        dispatcher.on_kline("u1", &bar_json(3, 30));

        let notified = notified.lock();
        assert_eq!(notified.len(), 4);
        assert_eq!(notified[0].0, 1);
        assert_eq!(
            notified[3].1,
            Utc.with_ymd_and_hms(2024, 3, 1, 9, 3, 0).unwrap()
        );
    }

    #[test]
    fn test_window_commits_even_without_handler() {
        let dispatcher = Dispatcher::new();
        let state = dispatcher.registry().register_kline(
            "u1",
            KlineState {
                handler: None,
                window: CandleWindow::new(3),
            },
        );

        dispatcher.on_kline("u1", &bar_json(0, 1));
        dispatcher.on_kline("u1", &bar_json(1, 2));

        assert_eq!(state.lock().window.len(), 2);
    }

    #[test]
    fn test_malformed_payload_skips_handler() {
        let dispatcher = Dispatcher::new();
        let count = Arc::new(Mutex::new(0u32));
        let sink = Arc::clone(&count);
        dispatcher.registry().register_tick(
            "u1",
            TickState {
                handler: Box::new(move |_| *sink.lock() += 1),
            },
        );

        dispatcher.on_tick("u1", "{ not json");
        assert_eq!(*count.lock(), 0);

        // The unit is still serviceable afterwards
        dispatcher.on_tick("u1", &tick_json());
        assert_eq!(*count.lock(), 1);
    }

    #[test]
    fn test_trade_event_discriminator_routing() {
        let dispatcher = Dispatcher::new();
        let orders = Arc::new(Mutex::new(0u32));
        let positions = Arc::new(Mutex::new(0u32));
        let order_sink = Arc::clone(&orders);
        let position_sink = Arc::clone(&positions);
        dispatcher.registry().register_trade(
            "u1",
            TradeState {
                on_order: Some(Box::new(move |_| *order_sink.lock() += 1)),
                on_position: Some(Box::new(move |_| *position_sink.lock() += 1)),
            },
        );

        let order = r#"{"symbol":"BTCUSDT","clientOrderId":"c1","side":"BUY",
                        "orderType":"LIMIT","price":100,"quantity":1,"traded":0,
                        "status":"SUBMITTED","datetime":"2024-03-01T09:00:00Z"}"#;
        let position = r#"{"symbol":"BTCUSDT","amount":1,"cost":100,
                           "side":"BUY","positionSide":"LONG"}"#;

        dispatcher.on_trade_event("u1", EVENT_ORDER, order);
        dispatcher.on_trade_event("u1", EVENT_POSITION, position);
        dispatcher.on_trade_event("u1", "BALANCE", "{}"); // unknown: ignored

        assert_eq!(*orders.lock(), 1);
        assert_eq!(*positions.lock(), 1);
    }
}
