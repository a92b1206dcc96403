//! Inventory domain: products, cost/price history, stock movements.
//!
//! Stock levels, alert states, and valuation are never stored; they are
//! derived on demand from the append-only movement and price/cost history
//! (see [`derive`]). Writes go through [`recorder::MovementRecorder`], which
//! validates and appends against the [`store::LedgerStore`] port.

pub mod derive;
pub mod export;
pub mod model;
pub mod pricing;
pub mod recorder;
pub mod store;

pub use derive::{LedgerSummary, ProductHistory, ProductSnapshot};
pub use model::{
    CostRecord, Direction, Movement, PriceRecord, Product, StockStatus, DEFAULT_ALERT_THRESHOLD,
};
pub use pricing::PriceOption;
pub use recorder::MovementRecorder;
pub use store::{
    LedgerStore, NewCostRecord, NewMovement, NewPriceRecord, NewProduct, ProductPatch,
};
