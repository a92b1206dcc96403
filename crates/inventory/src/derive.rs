//! Derivation engine: pure functions over a product's recorded history.
//!
//! Nothing here reads the store or mutates anything. Every function takes
//! the ordered history of a single product (creation order, as returned by
//! the ledger-store queries) and computes a non-stored fact from it.

use rust_decimal::Decimal;

use stockledger_core::ProductId;

use crate::model::{CostRecord, Direction, Movement, PriceRecord, Product, StockStatus};

/// Sum of `in` quantities minus sum of `out` quantities.
///
/// No movements means level 0. The result is signed: nothing prevents an
/// `out` movement from driving stock below zero.
pub fn stock_level(movements: &[Movement]) -> i64 {
    movements
        .iter()
        .map(|m| match m.direction {
            Direction::In => i64::from(m.quantity),
            Direction::Out => -i64::from(m.quantity),
        })
        .sum()
}

/// Classify a stock level against an alert threshold.
///
/// The threshold comparison is inclusive: a level exactly at the threshold
/// is `alerte`, one unit above it is `normal`.
pub fn stock_status(level: i64, alert_threshold: u32) -> StockStatus {
    if level <= 0 {
        StockStatus::Rupture
    } else if level <= i64::from(alert_threshold) {
        StockStatus::Alerte
    } else {
        StockStatus::Normal
    }
}

/// Cost of the most recently created *active* cost record, else the
/// product's base cost.
///
/// With history in creation order, `max_by_key` keeps the last of any
/// equally-timestamped records, so ties resolve to the newest insertion.
pub fn current_cost(product: &Product, costs: &[CostRecord]) -> Decimal {
    costs
        .iter()
        .filter(|c| c.active)
        .max_by_key(|c| c.created_at)
        .map(|c| c.cost)
        .unwrap_or(product.base_cost)
}

/// Price of the most recently created *active* price record, else the
/// product's base sale price.
pub fn current_price(product: &Product, prices: &[PriceRecord]) -> Decimal {
    prices
        .iter()
        .filter(|p| p.active)
        .max_by_key(|p| p.created_at)
        .map(|p| p.price)
        .unwrap_or(product.base_price)
}

/// Current price minus current cost. A negative margin is a valid signal,
/// not an error.
pub fn margin(product: &Product, costs: &[CostRecord], prices: &[PriceRecord]) -> Decimal {
    current_price(product, prices) - current_cost(product, costs)
}

/// Stock level × current cost. Valuation always reflects today's cost
/// basis, never the per-movement historical cost.
pub fn stock_value(product: &Product, movements: &[Movement], costs: &[CostRecord]) -> Decimal {
    Decimal::from(stock_level(movements)) * current_cost(product, costs)
}

/// Value of a single movement.
///
/// `out`: quantity × referenced price record if one is attached, else
/// quantity × current price. `in`: symmetric over the cost record. A
/// reference on the opposite direction is ignored. The base-value fallback
/// makes this total.
pub fn movement_value(
    movement: &Movement,
    product: &Product,
    costs: &[CostRecord],
    prices: &[PriceRecord],
) -> Decimal {
    let quantity = Decimal::from(movement.quantity);
    match movement.direction {
        Direction::Out => {
            let unit = movement
                .price_ref
                .and_then(|id| prices.iter().find(|p| p.id == id))
                .map(|p| p.price)
                .unwrap_or_else(|| current_price(product, prices));
            quantity * unit
        }
        Direction::In => {
            let unit = movement
                .cost_ref
                .and_then(|id| costs.iter().find(|c| c.id == id))
                .map(|c| c.cost)
                .unwrap_or_else(|| current_cost(product, costs));
            quantity * unit
        }
    }
}

/// A product together with its full recorded history, as loaded from the
/// ledger store. All record vectors are in creation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductHistory {
    pub product: Product,
    pub movements: Vec<Movement>,
    pub cost_records: Vec<CostRecord>,
    pub price_records: Vec<PriceRecord>,
}

impl ProductHistory {
    pub fn stock_level(&self) -> i64 {
        stock_level(&self.movements)
    }

    pub fn stock_status(&self) -> StockStatus {
        stock_status(self.stock_level(), self.product.alert_threshold)
    }

    pub fn current_cost(&self) -> Decimal {
        current_cost(&self.product, &self.cost_records)
    }

    pub fn current_price(&self) -> Decimal {
        current_price(&self.product, &self.price_records)
    }

    pub fn margin(&self) -> Decimal {
        margin(&self.product, &self.cost_records, &self.price_records)
    }

    pub fn stock_value(&self) -> Decimal {
        stock_value(&self.product, &self.movements, &self.cost_records)
    }

    pub fn movement_value(&self, movement: &Movement) -> Decimal {
        movement_value(
            movement,
            &self.product,
            &self.cost_records,
            &self.price_records,
        )
    }

    /// Collapse the history into its derived facts.
    pub fn snapshot(&self) -> ProductSnapshot {
        let level = self.stock_level();
        ProductSnapshot {
            product: self.product.clone(),
            stock_level: level,
            status: stock_status(level, self.product.alert_threshold),
            current_cost: self.current_cost(),
            current_price: self.current_price(),
            margin: self.margin(),
            stock_value: self.stock_value(),
        }
    }
}

/// Derived, non-stored facts about one product at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSnapshot {
    pub product: Product,
    pub stock_level: i64,
    pub status: StockStatus,
    pub current_cost: Decimal,
    pub current_price: Decimal,
    pub margin: Decimal,
    pub stock_value: Decimal,
}

/// Dashboard aggregate over the whole ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerSummary {
    pub total_products: usize,
    pub total_movements: usize,
    pub products_in_rupture: Vec<ProductId>,
    pub products_in_alerte: Vec<ProductId>,
    pub total_stock_value: Decimal,
}

/// Fold per-product snapshots into the ledger-wide summary.
pub fn summarize<'a, I>(snapshots: I, total_movements: usize) -> LedgerSummary
where
    I: IntoIterator<Item = &'a ProductSnapshot>,
{
    let mut summary = LedgerSummary {
        total_products: 0,
        total_movements,
        products_in_rupture: Vec::new(),
        products_in_alerte: Vec::new(),
        total_stock_value: Decimal::ZERO,
    };

    for snap in snapshots {
        summary.total_products += 1;
        summary.total_stock_value += snap.stock_value;
        match snap.status {
            StockStatus::Rupture => summary.products_in_rupture.push(snap.product.id),
            StockStatus::Alerte => summary.products_in_alerte.push(snap.product.id),
            StockStatus::Normal => {}
        }
    }

    summary
}
