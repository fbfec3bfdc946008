use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Account snapshot returned by the engine's account query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Settlement asset, e.g. "USDT"
    pub asset: String,
    pub balance: Decimal,
    pub available: Decimal,
    pub frozen: Decimal,
}
