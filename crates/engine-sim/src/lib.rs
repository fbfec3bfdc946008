//! Scripted execution engine
//!
//! In-process [`ExecutionEngine`] for gateway tests and demos. Synchronous
//! calls answer from a scriptable envelope queue (success by default) and
//! are recorded for assertion; events are delivered to the bound sink
//! either inline or from freshly spawned OS threads, mimicking the real
//! engine's unmanaged callback pool.

use std::collections::VecDeque;
use std::sync::Arc;
use std::thread;

use log::warn;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use hermes_core::{Account, Bar, OrderRequest};
use hermes_gateway::{EngineEvents, ExecutionEngine};

/// One recorded synchronous call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub args: Vec<String>,
}

/// Event delivered by [`SimEngine::emit_parallel`]
#[derive(Debug, Clone)]
pub enum SimEvent {
    Tick {
        unit_id: String,
        payload: String,
    },
    Kline {
        unit_id: String,
        payload: String,
    },
    TradeEvent {
        unit_id: String,
        event_type: String,
        payload: String,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SimEnvelope<T: Serialize> {
    error_code: i32,
    message: String,
    data: Option<T>,
}

/// Build a success envelope carrying `data`
pub fn ok<T: Serialize>(data: Option<T>) -> String {
    envelope(0, "", data)
}

/// Build an error envelope
pub fn err(code: i32, message: &str) -> String {
    envelope::<Value>(code, message, None)
}

fn envelope<T: Serialize>(error_code: i32, message: &str, data: Option<T>) -> String {
    serde_json::to_string(&SimEnvelope {
        error_code,
        message: message.to_string(),
        data,
    })
    .unwrap_or_else(|_| r#"{"errorCode":-1,"message":"envelope encode failed","data":null}"#.into())
}

/// Scripted engine: canned envelopes out, recorded calls in, events
/// delivered through the bound sink.
#[derive(Default)]
pub struct SimEngine {
    sink: Mutex<Option<Arc<dyn EngineEvents>>>,
    calls: Mutex<Vec<RecordedCall>>,
    scripted: Mutex<VecDeque<String>>,
    kline_history: Mutex<Vec<Bar>>,
}

impl SimEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// History returned by `subscribe_kline` (unless a scripted response
    /// is queued)
    pub fn set_kline_history(&self, bars: Vec<Bar>) {
        *self.kline_history.lock() = bars;
    }

    /// Queue a raw envelope to be returned by the next synchronous call
    pub fn script_response(&self, raw: impl Into<String>) {
        self.scripted.lock().push_back(raw.into());
    }

    /// Queue an error envelope for the next synchronous call
    pub fn fail_next(&self, code: i32, message: &str) {
        self.script_response(err(code, message));
    }

    /// Synchronous calls received so far
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    fn sink(&self) -> Option<Arc<dyn EngineEvents>> {
        self.sink.lock().clone()
    }

    fn record(&self, method: &'static str, args: &[&str]) {
        self.calls.lock().push(RecordedCall {
            method,
            args: args.iter().map(|a| a.to_string()).collect(),
        });
    }

    fn scripted_or<F: FnOnce() -> String>(&self, default: F) -> String {
        self.scripted.lock().pop_front().unwrap_or_else(default)
    }

    /// Deliver a tick callback on the calling thread
    pub fn emit_tick(&self, unit_id: &str, payload: &str) {
        if let Some(sink) = self.sink() {
            sink.on_tick(unit_id, payload);
        } else {
            warn!("tick for {unit_id} dropped: no sink bound");
        }
    }

    /// Deliver a kline callback on the calling thread
    pub fn emit_kline(&self, unit_id: &str, payload: &str) {
        if let Some(sink) = self.sink() {
            sink.on_kline(unit_id, payload);
        } else {
            warn!("kline for {unit_id} dropped: no sink bound");
        }
    }

    /// Serialize a bar and deliver it as a kline callback
    pub fn emit_kline_bar(&self, unit_id: &str, bar: &Bar) {
        match serde_json::to_string(bar) {
            Ok(payload) => self.emit_kline(unit_id, &payload),
            Err(e) => warn!("bar for {unit_id} dropped: {e}"),
        }
    }

    /// Deliver a trade-event callback on the calling thread
    pub fn emit_trade_event(&self, unit_id: &str, event_type: &str, payload: &str) {
        if let Some(sink) = self.sink() {
            sink.on_trade_event(unit_id, event_type, payload);
        } else {
            warn!("trade event for {unit_id} dropped: no sink bound");
        }
    }

    /// Deliver a batch of events concurrently, one fresh OS thread per
    /// event, and wait for every delivery to finish. A delivery whose
    /// handler panics is logged and does not abort the batch.
    pub fn emit_parallel(&self, events: Vec<SimEvent>) {
        let Some(sink) = self.sink() else {
            warn!("batch of {} events dropped: no sink bound", events.len());
            return;
        };

        let handles: Vec<_> = events
            .into_iter()
            .map(|event| {
                let sink = Arc::clone(&sink);
                thread::spawn(move || match event {
                    SimEvent::Tick { unit_id, payload } => sink.on_tick(&unit_id, &payload),
                    SimEvent::Kline { unit_id, payload } => sink.on_kline(&unit_id, &payload),
                    SimEvent::TradeEvent {
                        unit_id,
                        event_type,
                        payload,
                    } => sink.on_trade_event(&unit_id, &event_type, &payload),
                })
            })
            .collect();

        for handle in handles {
            if handle.join().is_err() {
                warn!("event delivery thread panicked in a handler");
            }
        }
    }
}

impl ExecutionEngine for SimEngine {
    fn bind(&self, sink: Arc<dyn EngineEvents>) {
        *self.sink.lock() = Some(sink);
    }

    fn init(&self, exchange: &str, mode: &str, config_json: &str) -> String {
        self.record("init", &[exchange, mode, config_json]);
        self.scripted_or(|| ok::<Value>(None))
    }

    fn start(&self) -> String {
        self.record("start", &[]);
        self.scripted_or(|| ok::<Value>(None))
    }

    fn close(&self) -> String {
        self.record("close", &[]);
        self.scripted_or(|| ok::<Value>(None))
    }

    fn get_server_ping(&self) -> String {
        self.record("get_server_ping", &[]);
        self.scripted_or(|| ok(Some(3u64)))
    }

    fn subscribe_tick(&self, unit_id: &str, symbol: &str) -> String {
        self.record("subscribe_tick", &[unit_id, symbol]);
        self.scripted_or(|| ok::<Value>(None))
    }

    fn subscribe_kline(
        &self,
        unit_id: &str,
        symbol: &str,
        interval: &str,
        init_count: usize,
    ) -> String {
        let count = init_count.to_string();
        self.record("subscribe_kline", &[unit_id, symbol, interval, &count]);
        self.scripted_or(|| ok(Some(self.kline_history.lock().clone())))
    }

    fn init_symbol_trade(&self, unit_id: &str, symbol: &str, config_json: &str) -> String {
        self.record("init_symbol_trade", &[unit_id, symbol, config_json]);
        self.scripted_or(|| ok::<Value>(None))
    }

    fn new_order(&self, symbol: &str, order_json: &str) -> String {
        self.record("new_order", &[symbol, order_json]);
        self.scripted_or(|| match serde_json::from_str::<OrderRequest>(order_json) {
            Ok(order) => ok(Some(order.client_order_id)),
            Err(e) => err(400, &format!("malformed order: {e}")),
        })
    }

    fn cancel_order(&self, symbol: &str, order_id: &str) -> String {
        self.record("cancel_order", &[symbol, order_id]);
        self.scripted_or(|| ok::<Value>(None))
    }

    fn cancel_orders(&self, symbol: &str) -> String {
        self.record("cancel_orders", &[symbol]);
        self.scripted_or(|| ok::<Value>(None))
    }

    fn get_positions(&self, symbol: &str) -> String {
        self.record("get_positions", &[symbol]);
        self.scripted_or(|| ok(Some(Vec::<Value>::new())))
    }

    fn get_account(&self, symbol: &str) -> String {
        self.record("get_account", &[symbol]);
        self.scripted_or(|| {
            ok(Some(Account {
                asset: "USDT".to_string(),
                balance: Decimal::from(10_000),
                available: Decimal::from(10_000),
                frozen: Decimal::ZERO,
            }))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_gateway::Envelope;

    #[derive(Default)]
    struct RecordingSink {
        ticks: Mutex<Vec<(String, String)>>,
        events: Mutex<Vec<(String, String)>>,
    }

    impl EngineEvents for RecordingSink {
        fn on_tick(&self, unit_id: &str, payload: &str) {
            self.ticks
                .lock()
                .push((unit_id.to_string(), payload.to_string()));
        }

        fn on_kline(&self, _unit_id: &str, _payload: &str) {}

        fn on_trade_event(&self, unit_id: &str, event_type: &str, _payload: &str) {
            self.events
                .lock()
                .push((unit_id.to_string(), event_type.to_string()));
        }
    }

    #[test]
    fn test_emit_reaches_bound_sink() {
        let engine = SimEngine::new();
        let sink = Arc::new(RecordingSink::default());
        engine.bind(Arc::clone(&sink) as Arc<dyn EngineEvents>);

        engine.emit_tick("u1", "{}");
        engine.emit_trade_event("u1", "ORDER", "{}");

        assert_eq!(sink.ticks.lock().len(), 1);
        assert_eq!(sink.events.lock()[0].1, "ORDER");
    }

    #[test]
    fn test_unbound_emit_is_dropped() {
        let engine = SimEngine::new();
        engine.emit_tick("u1", "{}"); // must not panic
    }

    #[test]
    fn test_scripted_responses_pop_in_order() {
        let engine = SimEngine::new();
        engine.fail_next(7, "down for maintenance");

        let first = Envelope::parse(&engine.start()).unwrap();
        assert_eq!(first.error_code, 7);

        let second = Envelope::parse(&engine.start()).unwrap();
        assert_eq!(second.error_code, 0);
    }

    #[test]
    fn test_calls_recorded() {
        let engine = SimEngine::new();
        engine.init("BINANCE", "SIM", "{}");
        engine.subscribe_tick("u1", "BTCUSDT");

        let calls = engine.calls();
        assert_eq!(calls[0].method, "init");
        assert_eq!(calls[1].args, vec!["u1", "BTCUSDT"]);
    }
}
