use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One candle bar as delivered by the engine.
///
/// `datetime` is the bar's open time and is the sole ordering key: the
/// aggregation window compares instants, never the serialized text.
/// A bar arriving with the same `datetime` as an earlier one supersedes it
/// wholesale; fields are never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub symbol: String,
    pub interval: String,
    pub datetime: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    pub turnover: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_bar_wire_round_trip() {
        let bar = Bar {
            symbol: "BTCUSDT".to_string(),
            interval: "1m".to_string(),
            datetime: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
            open: dec!(42000.5),
            high: dec!(42010),
            low: dec!(41990.25),
            close: dec!(42005),
            volume: dec!(13.7),
            turnover: dec!(575468.5),
        };

        let json = serde_json::to_string(&bar).unwrap();
        let back: Bar = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bar);
    }

    #[test]
    fn test_bar_decodes_numeric_prices() {
        // The engine emits plain JSON numbers; Decimal must accept them.
        let json = r#"{
            "symbol": "BTCUSDT",
            "interval": "1m",
            "datetime": "2024-03-01T09:00:00Z",
            "open": 42000.5,
            "high": 42010,
            "low": 41990.25,
            "close": 42005,
            "volume": 13.7,
            "turnover": 575468.5
        }"#;

        let bar: Bar = serde_json::from_str(json).unwrap();
        assert_eq!(bar.open, dec!(42000.5));
        assert_eq!(bar.datetime, Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap());
    }
}
