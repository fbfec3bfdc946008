//! Subscription registry
//!
//! Three independent mappings from unit id to handler state, one per
//! channel kind. The maps themselves tolerate concurrent access (lookups
//! from engine threads can race a registration), while all *state* access
//! happens under the owning unit's lock, enforced at the dispatch and
//! registration call sites rather than here.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

use hermes_core::{Bar, Order, Position, Tick};

use crate::window::CandleWindow;

/// Tick handler: invoked with each decoded tick, serialized per unit
pub type TickHandler = Box<dyn FnMut(&Tick) + Send>;

/// Kline handler: invoked with the post-transition window and the bar
/// that triggered the update
pub type KlineHandler = Box<dyn FnMut(&[Bar], &Bar) + Send>;

/// Handler for `ORDER` trade events
pub type OrderHandler = Box<dyn FnMut(&Order) + Send>;

/// Handler for `POSITION` trade events
pub type PositionHandler = Box<dyn FnMut(&Position) + Send>;

/// Tick subscription state
pub struct TickState {
    pub handler: TickHandler,
}

/// Kline subscription state: optional handler plus its rolling window
pub struct KlineState {
    pub handler: Option<KlineHandler>,
    pub window: CandleWindow,
}

/// Trade-event subscription state
#[derive(Default)]
pub struct TradeState {
    pub on_order: Option<OrderHandler>,
    pub on_position: Option<PositionHandler>,
}

/// Registry of all three channel kinds.
///
/// Registration has overwrite semantics: a later registration for the same
/// unit installs a fresh state (handler *and* window), and the previous
/// one becomes unreachable for every subsequent lookup.
#[derive(Default)]
pub struct SubscriptionRegistry {
    ticks: DashMap<String, Arc<Mutex<TickState>>>,
    klines: DashMap<String, Arc<Mutex<KlineState>>>,
    trades: DashMap<String, Arc<Mutex<TradeState>>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install tick state for a unit, replacing any prior registration
    pub fn register_tick(&self, unit_id: &str, state: TickState) -> Arc<Mutex<TickState>> {
        let state = Arc::new(Mutex::new(state));
        self.ticks.insert(unit_id.to_string(), Arc::clone(&state));
        state
    }

    pub fn tick(&self, unit_id: &str) -> Option<Arc<Mutex<TickState>>> {
        self.ticks.get(unit_id).map(|e| Arc::clone(e.value()))
    }

    pub fn unregister_tick(&self, unit_id: &str) {
        self.ticks.remove(unit_id);
    }

    /// Install kline state for a unit, replacing any prior registration
    pub fn register_kline(&self, unit_id: &str, state: KlineState) -> Arc<Mutex<KlineState>> {
        let state = Arc::new(Mutex::new(state));
        self.klines.insert(unit_id.to_string(), Arc::clone(&state));
        state
    }

    pub fn kline(&self, unit_id: &str) -> Option<Arc<Mutex<KlineState>>> {
        self.klines.get(unit_id).map(|e| Arc::clone(e.value()))
    }

    pub fn unregister_kline(&self, unit_id: &str) {
        self.klines.remove(unit_id);
    }

    /// Install trade-event state for a unit, replacing any prior registration
    pub fn register_trade(&self, unit_id: &str, state: TradeState) -> Arc<Mutex<TradeState>> {
        let state = Arc::new(Mutex::new(state));
        self.trades.insert(unit_id.to_string(), Arc::clone(&state));
        state
    }

    pub fn trade(&self, unit_id: &str) -> Option<Arc<Mutex<TradeState>>> {
        self.trades.get(unit_id).map(|e| Arc::clone(e.value()))
    }

    pub fn unregister_trade(&self, unit_id: &str) {
        self.trades.remove(unit_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_miss() {
        let registry = SubscriptionRegistry::new();
        assert!(registry.tick("nobody").is_none());
        assert!(registry.kline("nobody").is_none());
        assert!(registry.trade("nobody").is_none());
    }

    #[test]
    fn test_registration_replaces_state() {
        let registry = SubscriptionRegistry::new();

        let first = registry.register_kline(
            "unit-1",
            KlineState {
                handler: None,
                window: CandleWindow::new(5),
            },
        );
        let second = registry.register_kline(
            "unit-1",
            KlineState {
                handler: None,
                window: CandleWindow::new(9),
            },
        );

        let looked_up = registry.kline("unit-1").unwrap();
        assert!(Arc::ptr_eq(&looked_up, &second));
        assert!(!Arc::ptr_eq(&looked_up, &first));
        assert_eq!(looked_up.lock().window.capacity(), 9);
    }

    #[test]
    fn test_unregister_leaves_other_channels() {
        let registry = SubscriptionRegistry::new();
        registry.register_tick(
            "unit-1",
            TickState {
                handler: Box::new(|_| {}),
            },
        );
        registry.register_trade("unit-1", TradeState::default());

        registry.unregister_tick("unit-1");
        assert!(registry.tick("unit-1").is_none());
        assert!(registry.trade("unit-1").is_some());
    }
}
