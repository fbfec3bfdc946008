use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order side (Buy or Sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Returns the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

/// Order type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Limit,
    Market,
}

/// Time in force
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeInForce {
    /// Good Till Cancelled
    Gtc,
    /// Immediate Or Cancel
    Ioc,
    /// Fill Or Kill
    Fok,
}

/// Order lifecycle status as reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Submitted,
    PartiallyFilled,
    Filled,
    Cancelled,
    Rejected,
}

impl OrderStatus {
    /// Whether no further updates can arrive for this order
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::Cancelled | OrderStatus::Rejected
        )
    }
}

/// Order state delivered on the trade-event channel (`ORDER` discriminator)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub symbol: String,
    pub client_order_id: String,
    pub side: Side,
    pub order_type: OrderType,
    /// Limit price; absent for market orders
    pub price: Option<Decimal>,
    pub quantity: Decimal,
    /// Quantity filled so far
    pub traded: Decimal,
    pub status: OrderStatus,
    pub datetime: DateTime<Utc>,
}

/// Order submission request, serialized and handed to the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    /// Client-assigned order ID for correlation; generated if not supplied
    pub client_order_id: String,
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    /// Price (required for limit orders)
    pub price: Option<Decimal>,
    pub quantity: Decimal,
    pub time_in_force: TimeInForce,
}

impl OrderRequest {
    /// Create a new limit order request
    pub fn limit(
        symbol: impl Into<String>,
        side: Side,
        quantity: Decimal,
        price: Decimal,
        time_in_force: TimeInForce,
    ) -> Self {
        Self {
            client_order_id: Uuid::new_v4().to_string(),
            symbol: symbol.into(),
            side,
            order_type: OrderType::Limit,
            price: Some(price),
            quantity,
            time_in_force,
        }
    }

    /// Create a new market order request
    pub fn market(symbol: impl Into<String>, side: Side, quantity: Decimal) -> Self {
        Self {
            client_order_id: Uuid::new_v4().to_string(),
            symbol: symbol.into(),
            side,
            order_type: OrderType::Market,
            price: None,
            quantity,
            // Market orders are always IOC
            time_in_force: TimeInForce::Ioc,
        }
    }

    /// Override the generated client order id
    pub fn with_client_order_id(mut self, id: impl Into<String>) -> Self {
        self.client_order_id = id.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_limit_request() {
        let req = OrderRequest::limit("BTCUSDT", Side::Buy, dec!(0.5), dec!(42000), TimeInForce::Gtc);
        assert_eq!(req.order_type, OrderType::Limit);
        assert_eq!(req.price, Some(dec!(42000)));
        assert!(!req.client_order_id.is_empty());
    }

    #[test]
    fn test_market_request_is_ioc() {
        let req = OrderRequest::market("BTCUSDT", Side::Sell, dec!(1));
        assert_eq!(req.order_type, OrderType::Market);
        assert_eq!(req.time_in_force, TimeInForce::Ioc);
        assert!(req.price.is_none());
    }

    #[test]
    fn test_order_event_decodes_wire_casing() {
        let json = r#"{
            "symbol": "BTCUSDT",
            "clientOrderId": "abc-1",
            "side": "BUY",
            "orderType": "LIMIT",
            "price": 42000,
            "quantity": 0.5,
            "traded": 0.2,
            "status": "PARTIALLY_FILLED",
            "datetime": "2024-03-01T09:00:01Z"
        }"#;

        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.status, OrderStatus::PartiallyFilled);
        assert!(!order.status.is_terminal());
        assert_eq!(order.side, Side::Buy);
    }
}
