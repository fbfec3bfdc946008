//! Gateway façade
//!
//! Consumer-facing surface over the execution engine: lifecycle calls,
//! handler registration, order entry and queries. One `Gateway` owns one
//! engine and one dispatch context; construct it at startup and share it.
//! Strategy handlers may call back into it (e.g. to place orders) without
//! deadlocking, since the synchronous surface takes no unit lock.

use std::sync::Arc;

use log::info;

use hermes_core::{Account, Bar, OrderRequest, Position};

use crate::dispatch::Dispatcher;
use crate::engine::{ConnectConfig, EngineEvents, ExecutionEngine, Mode, TradeConfig};
use crate::envelope::{decode_data, decode_unit};
use crate::error::GatewayError;
use crate::registry::{
    KlineHandler, KlineState, OrderHandler, PositionHandler, TickHandler, TickState, TradeState,
};
use crate::window::CandleWindow;

pub struct Gateway {
    engine: Arc<dyn ExecutionEngine>,
    dispatcher: Arc<Dispatcher>,
}

impl Gateway {
    /// Create a gateway over an engine and install its callback sink.
    pub fn new(engine: Arc<dyn ExecutionEngine>) -> Self {
        let dispatcher = Arc::new(Dispatcher::new());
        engine.bind(Arc::clone(&dispatcher) as Arc<dyn EngineEvents>);
        Self { engine, dispatcher }
    }

    /// Initialize the engine for an exchange in the given mode.
    pub fn init(
        &self,
        exchange: &str,
        mode: Mode,
        config: &ConnectConfig,
    ) -> Result<(), GatewayError> {
        let config_json = serde_json::to_string(config)?;
        info!("initializing engine for {exchange} in {} mode", mode.as_str());
        decode_unit(&self.engine.init(exchange, mode.as_str(), &config_json))
    }

    pub fn start(&self) -> Result<(), GatewayError> {
        decode_unit(&self.engine.start())
    }

    pub fn close(&self) -> Result<(), GatewayError> {
        decode_unit(&self.engine.close())
    }

    /// Round-trip latency to the engine's upstream, in milliseconds
    pub fn server_ping(&self) -> Result<u64, GatewayError> {
        decode_data(&self.engine.get_server_ping(), "ping")
    }

    /// Subscribe a unit to the tick stream of `symbol`.
    ///
    /// A repeated call for the same unit replaces the previous handler;
    /// the replaced handler receives no further invocations. Registration
    /// holds the unit lock, so it cannot race an in-flight callback.
    pub fn subscribe_tick(
        &self,
        unit_id: &str,
        symbol: &str,
        handler: TickHandler,
    ) -> Result<(), GatewayError> {
        let lock = self.dispatcher.locks().lock_for(unit_id);
        let _unit = lock.lock();

        self.dispatcher
            .registry()
            .register_tick(unit_id, TickState { handler });
        decode_unit(&self.engine.subscribe_tick(unit_id, symbol))
    }

    /// Subscribe a unit to candle bars.
    ///
    /// Seeds the rolling window from the engine's synchronous history
    /// fetch and returns the seeded window. The unit lock is held across
    /// the fetch, so the first live bar cannot interleave with seeding;
    /// it is then ordered against the last historical bar by the same
    /// three-way rule as any other update.
    pub fn subscribe_kline(
        &self,
        unit_id: &str,
        symbol: &str,
        interval: &str,
        capacity: usize,
        handler: Option<KlineHandler>,
    ) -> Result<Vec<Bar>, GatewayError> {
        if capacity == 0 {
            return Err(GatewayError::InvalidCapacity(capacity));
        }

        let lock = self.dispatcher.locks().lock_for(unit_id);
        let _unit = lock.lock();

        let state = self.dispatcher.registry().register_kline(
            unit_id,
            KlineState {
                handler,
                window: CandleWindow::new(capacity),
            },
        );

        let raw = self
            .engine
            .subscribe_kline(unit_id, symbol, interval, capacity);
        let history: Vec<Bar> = decode_data(&raw, "kline history")?;

        let mut state = state.lock();
        state.window.seed(history);
        Ok(state.window.bars().to_vec())
    }

    /// Open the trade-event channel for a unit on `symbol`.
    pub fn connect_trade(
        &self,
        unit_id: &str,
        symbol: &str,
        config: &TradeConfig,
        on_order: Option<OrderHandler>,
        on_position: Option<PositionHandler>,
    ) -> Result<(), GatewayError> {
        let config_json = serde_json::to_string(config)?;

        let lock = self.dispatcher.locks().lock_for(unit_id);
        let _unit = lock.lock();

        self.dispatcher.registry().register_trade(
            unit_id,
            TradeState {
                on_order,
                on_position,
            },
        );
        decode_unit(&self.engine.init_symbol_trade(unit_id, symbol, &config_json))
    }

    /// Remove a unit's tick registration.
    ///
    /// The unit lock remains, since other channels of the unit may still be
    /// active. The engine keeps delivering; ticks for a removed key find
    /// no registration and are dropped.
    pub fn unsubscribe_tick(&self, unit_id: &str) {
        let lock = self.dispatcher.locks().lock_for(unit_id);
        let _unit = lock.lock();
        self.dispatcher.registry().unregister_tick(unit_id);
    }

    /// Remove a unit's kline registration, discarding its window.
    pub fn unsubscribe_kline(&self, unit_id: &str) {
        let lock = self.dispatcher.locks().lock_for(unit_id);
        let _unit = lock.lock();
        self.dispatcher.registry().unregister_kline(unit_id);
    }

    /// Remove a unit's trade-event registration.
    pub fn disconnect_trade(&self, unit_id: &str) {
        let lock = self.dispatcher.locks().lock_for(unit_id);
        let _unit = lock.lock();
        self.dispatcher.registry().unregister_trade(unit_id);
    }

    /// Submit an order; returns the engine's order id.
    pub fn new_order(&self, symbol: &str, order: &OrderRequest) -> Result<String, GatewayError> {
        let order_json = serde_json::to_string(order)?;
        decode_data(&self.engine.new_order(symbol, &order_json), "order id")
    }

    pub fn cancel_order(&self, symbol: &str, order_id: &str) -> Result<(), GatewayError> {
        decode_unit(&self.engine.cancel_order(symbol, order_id))
    }

    pub fn cancel_orders(&self, symbol: &str) -> Result<(), GatewayError> {
        decode_unit(&self.engine.cancel_orders(symbol))
    }

    pub fn positions(&self, symbol: &str) -> Result<Vec<Position>, GatewayError> {
        decode_data(&self.engine.get_positions(symbol), "positions")
    }

    pub fn account(&self, symbol: &str) -> Result<Account, GatewayError> {
        decode_data(&self.engine.get_account(symbol), "account")
    }
}
