use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Side;

/// Position direction for hedged accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionSide {
    Long,
    Short,
    /// One-way position mode
    Both,
}

/// Position state delivered on the trade-event channel (`POSITION` discriminator)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub symbol: String,
    /// Net quantity; sign follows `side`
    pub amount: Decimal,
    /// Average entry cost
    pub cost: Decimal,
    pub side: Side,
    pub position_side: PositionSide,
}

impl Position {
    /// Whether the position is flat
    pub fn is_flat(&self) -> bool {
        self.amount.is_zero()
    }
}
