//! Minimal strategy wired through the gateway: a fast/slow SMA cross on
//! one-minute candles, fed by the scripted engine.
//!
//! Run with: cargo run -p hermes-gateway --example sma_cross

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use engine_sim::SimEngine;
use hermes_core::{Bar, OrderRequest, Side};
use hermes_gateway::{ConnectConfig, ExecutionEngine, Gateway, Mode};

const FAST: usize = 3;
const SLOW: usize = 8;

fn sma(bars: &[Bar], period: usize) -> Option<Decimal> {
    if bars.len() < period {
        return None;
    }
    let sum: Decimal = bars[bars.len() - period..].iter().map(|b| b.close).sum();
    Some(sum / Decimal::from(period as u64))
}

fn bar_at(minute: i64, close: Decimal) -> Bar {
    let open_time = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    Bar {
        symbol: "BTCUSDT".to_string(),
        interval: "1m".to_string(),
        datetime: open_time + Duration::minutes(minute),
        open: close,
        high: close,
        low: close,
        close,
        volume: dec!(1),
        turnover: close,
    }
}

fn main() {
    env_logger::init();

    println!("=== SMA cross demo ===\n");

    let engine = Arc::new(SimEngine::new());
    let gateway = Arc::new(Gateway::new(
        Arc::clone(&engine) as Arc<dyn ExecutionEngine>
    ));

    gateway
        .init("BINANCE", Mode::Sim, &ConnectConfig::default())
        .expect("init");
    gateway.start().expect("start");

    // Downtrend history, so the first rallying live bars cross upward
    let history: Vec<Bar> = (0..SLOW as i64)
        .map(|i| bar_at(i, dec!(42100) - Decimal::from(i as u64) * dec!(10)))
        .collect();
    engine.set_kline_history(history);

    let strategy = Arc::clone(&gateway);
    let initial = gateway
        .subscribe_kline(
            "sma-unit",
            "BTCUSDT",
            "1m",
            SLOW * 2,
            Some(Box::new(move |window: &[Bar], bar: &Bar| {
                let (Some(fast), Some(slow)) = (sma(window, FAST), sma(window, SLOW)) else {
                    return;
                };
                println!(
                    "bar {}  close {:>8}  fast {:>10.2}  slow {:>10.2}",
                    bar.datetime.format("%H:%M"),
                    bar.close,
                    fast,
                    slow
                );
                if fast > slow {
                    let request = OrderRequest::market("BTCUSDT", Side::Buy, dec!(0.1));
                    match strategy.new_order("BTCUSDT", &request) {
                        Ok(order_id) => println!("  crossed up -> bought 0.1 ({order_id})"),
                        Err(e) => println!("  order rejected: {e}"),
                    }
                }
            })),
        )
        .expect("subscribe_kline");
    println!("seeded {} historical bars\n", initial.len());

    // Live bars rallying through the slow average
    for (i, close) in [42050, 42120, 42200, 42300].into_iter().enumerate() {
        engine.emit_kline_bar(
            "sma-unit",
            &bar_at(SLOW as i64 + i as i64, Decimal::from(close as u64)),
        );
    }

    let orders = engine
        .calls()
        .iter()
        .filter(|c| c.method == "new_order")
        .count();
    println!("\norders placed: {orders}");

    gateway.close().expect("close");
}
