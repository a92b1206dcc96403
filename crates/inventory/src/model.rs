//! Ledger record types: products and their owned history.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockledger_core::{CostRecordId, MovementId, PriceRecordId, ProductId};

/// Alert threshold applied when none is given at product creation.
pub const DEFAULT_ALERT_THRESHOLD: u32 = 10;

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// A receipt into stock.
    In,
    /// An issue out of stock.
    Out,
}

impl Direction {
    /// Display label used by the movement export and UI layers.
    pub fn label(self) -> &'static str {
        match self {
            Direction::In => "receipt",
            Direction::Out => "issue",
        }
    }
}

impl core::fmt::Display for Direction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Derived tri-state stock classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    /// Stock level ≤ 0.
    Rupture,
    /// 0 < stock level ≤ alert threshold (inclusive).
    Alerte,
    /// Stock level above the alert threshold.
    Normal,
}

/// A tracked product.
///
/// Base cost/price are the fallback values used whenever no negotiated
/// cost/price record is currently active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub description: String,
    pub base_cost: Decimal,
    pub base_price: Decimal,
    pub alert_threshold: u32,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// One entry in a product's purchase-cost history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostRecord {
    pub id: CostRecordId,
    pub product_id: ProductId,
    pub cost: Decimal,
    pub supplier: Option<String>,
    pub active: bool,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One entry in a product's negotiated sale-price history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub id: PriceRecordId,
    pub product_id: ProductId,
    pub price: Decimal,
    pub client: Option<String>,
    pub active: bool,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A recorded stock change. Immutable once recorded; corrections are
/// modeled as new compensating movements.
///
/// `price_ref` is meaningful only for `out` movements and `cost_ref` only
/// for `in` movements. A reference on the opposite direction is stored but
/// ignored at valuation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub id: MovementId,
    pub product_id: ProductId,
    pub direction: Direction,
    pub quantity: u32,
    pub price_ref: Option<PriceRecordId>,
    pub cost_ref: Option<CostRecordId>,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}
