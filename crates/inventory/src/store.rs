//! Ledger-store port: the data-access boundary the domain writes and reads
//! through.
//!
//! Any relational or embedded store can satisfy this contract; the
//! reference implementation lives in `stockledger-infra`. Implementations
//! own identifier and creation-timestamp assignment, and must assign
//! timestamps monotonically so that "most recently created" is well
//! defined. History queries return records in creation order.
//!
//! Each method is one serializable unit of work: the activate-exclusively
//! semantics of [`LedgerStore::insert_price_record`] /
//! [`LedgerStore::set_price_active`] (and the cost-side twins) must be
//! atomic with respect to concurrent writers on the same product.

use rust_decimal::Decimal;

use stockledger_core::{CostRecordId, DomainResult, MovementId, PriceRecordId, ProductId};

use crate::derive::{summarize, LedgerSummary, ProductHistory, ProductSnapshot};
use crate::model::{CostRecord, Direction, Movement, PriceRecord, Product};
use crate::pricing::{price_options, PriceOption};

/// Product fields as supplied by the caller; the store assigns identity and
/// timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub description: String,
    pub base_cost: Decimal,
    pub base_price: Decimal,
    pub alert_threshold: u32,
}

/// Partial product update; `None` fields are left untouched. Any applied
/// patch refreshes the product's `modified_at`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPatch {
    pub description: Option<String>,
    pub base_cost: Option<Decimal>,
    pub base_price: Option<Decimal>,
    pub alert_threshold: Option<u32>,
}

/// Cost-record fields as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCostRecord {
    pub product_id: ProductId,
    pub cost: Decimal,
    pub supplier: Option<String>,
    pub active: bool,
    pub comment: Option<String>,
}

/// Price-record fields as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPriceRecord {
    pub product_id: ProductId,
    pub price: Decimal,
    pub client: Option<String>,
    pub active: bool,
    pub comment: Option<String>,
}

/// Movement fields as supplied by the caller. Movements are append-only:
/// the port deliberately has no movement update or delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMovement {
    pub product_id: ProductId,
    pub direction: Direction,
    pub quantity: u32,
    pub price_ref: Option<PriceRecordId>,
    pub cost_ref: Option<CostRecordId>,
    pub comment: Option<String>,
}

/// Durable record storage for products, cost/price history, and movements.
///
/// Lookups of missing records fail with `DomainError::NotFound`; other
/// persistence failures pass through as `DomainError::Storage`.
pub trait LedgerStore {
    // --- products ---

    fn insert_product(&self, draft: NewProduct) -> DomainResult<Product>;

    fn product(&self, id: ProductId) -> DomainResult<Product>;

    /// All products, in creation order.
    fn products(&self) -> DomainResult<Vec<Product>>;

    fn update_product(&self, id: ProductId, patch: ProductPatch) -> DomainResult<Product>;

    /// Deletes the product and cascades to every cost record, price record,
    /// and movement it owns.
    fn delete_product(&self, id: ProductId) -> DomainResult<()>;

    // --- cost history ---

    /// Appends a cost record. When `draft.active` is true, every existing
    /// cost record of the product is deactivated first, atomically, so at
    /// most one record is active per product.
    fn insert_cost_record(&self, draft: NewCostRecord) -> DomainResult<CostRecord>;

    fn cost_record(&self, id: CostRecordId) -> DomainResult<CostRecord>;

    /// Full cost history of a product, in creation order.
    fn cost_records(&self, product_id: ProductId) -> DomainResult<Vec<CostRecord>>;

    fn active_cost_records(&self, product_id: ProductId) -> DomainResult<Vec<CostRecord>>;

    /// Sets the active flag. Activating deactivates all sibling records of
    /// the same product in the same unit of work; deactivating touches only
    /// the target.
    fn set_cost_active(&self, id: CostRecordId, active: bool) -> DomainResult<CostRecord>;

    /// Deletes the record and clears `cost_ref` on any movement that
    /// referenced it. The movements themselves are kept.
    fn delete_cost_record(&self, id: CostRecordId) -> DomainResult<()>;

    // --- price history ---

    /// Appends a price record; same exclusivity contract as
    /// [`LedgerStore::insert_cost_record`].
    fn insert_price_record(&self, draft: NewPriceRecord) -> DomainResult<PriceRecord>;

    fn price_record(&self, id: PriceRecordId) -> DomainResult<PriceRecord>;

    /// Full price history of a product, in creation order.
    fn price_records(&self, product_id: ProductId) -> DomainResult<Vec<PriceRecord>>;

    fn active_price_records(&self, product_id: ProductId) -> DomainResult<Vec<PriceRecord>>;

    /// Sets the active flag; same exclusivity contract as
    /// [`LedgerStore::set_cost_active`].
    fn set_price_active(&self, id: PriceRecordId, active: bool) -> DomainResult<PriceRecord>;

    /// Deletes the record and clears `price_ref` on any movement that
    /// referenced it.
    fn delete_price_record(&self, id: PriceRecordId) -> DomainResult<()>;

    // --- movements ---

    /// Appends a movement with a store-assigned timestamp. Fails with
    /// `NotFound` if the product does not exist.
    fn insert_movement(&self, draft: NewMovement) -> DomainResult<Movement>;

    fn movement(&self, id: MovementId) -> DomainResult<Movement>;

    /// All movements across products, in creation order.
    fn movements(&self) -> DomainResult<Vec<Movement>>;

    /// All movements of one product, in creation order.
    fn movements_for_product(&self, product_id: ProductId) -> DomainResult<Vec<Movement>>;

    /// Sum of movement quantities in one direction for a product.
    fn quantity_total(&self, product_id: ProductId, direction: Direction) -> DomainResult<u64>;

    // --- derived reads (composed from the queries above) ---

    /// Load a product together with its full history.
    fn history(&self, product_id: ProductId) -> DomainResult<ProductHistory> {
        Ok(ProductHistory {
            product: self.product(product_id)?,
            movements: self.movements_for_product(product_id)?,
            cost_records: self.cost_records(product_id)?,
            price_records: self.price_records(product_id)?,
        })
    }

    /// Derived facts for one product.
    fn snapshot(&self, product_id: ProductId) -> DomainResult<ProductSnapshot> {
        Ok(self.history(product_id)?.snapshot())
    }

    /// Dashboard aggregate over every product in the ledger.
    fn summary(&self) -> DomainResult<LedgerSummary> {
        let mut snapshots = Vec::new();
        for product in self.products()? {
            snapshots.push(self.snapshot(product.id)?);
        }
        let total_movements = self.movements()?.len();
        Ok(summarize(&snapshots, total_movements))
    }

    /// Selectable prices for a product: base price first, then active
    /// negotiated prices, each with a display label.
    fn price_options(&self, product_id: ProductId) -> DomainResult<Vec<PriceOption>> {
        let product = self.product(product_id)?;
        let active = self.active_price_records(product_id)?;
        Ok(price_options(&product, &active))
    }
}

/// Allow passing stores by reference wherever a `LedgerStore` is expected.
impl<T: LedgerStore + ?Sized> LedgerStore for &T {
    fn insert_product(&self, draft: NewProduct) -> DomainResult<Product> {
        (**self).insert_product(draft)
    }

    fn product(&self, id: ProductId) -> DomainResult<Product> {
        (**self).product(id)
    }

    fn products(&self) -> DomainResult<Vec<Product>> {
        (**self).products()
    }

    fn update_product(&self, id: ProductId, patch: ProductPatch) -> DomainResult<Product> {
        (**self).update_product(id, patch)
    }

    fn delete_product(&self, id: ProductId) -> DomainResult<()> {
        (**self).delete_product(id)
    }

    fn insert_cost_record(&self, draft: NewCostRecord) -> DomainResult<CostRecord> {
        (**self).insert_cost_record(draft)
    }

    fn cost_record(&self, id: CostRecordId) -> DomainResult<CostRecord> {
        (**self).cost_record(id)
    }

    fn cost_records(&self, product_id: ProductId) -> DomainResult<Vec<CostRecord>> {
        (**self).cost_records(product_id)
    }

    fn active_cost_records(&self, product_id: ProductId) -> DomainResult<Vec<CostRecord>> {
        (**self).active_cost_records(product_id)
    }

    fn set_cost_active(&self, id: CostRecordId, active: bool) -> DomainResult<CostRecord> {
        (**self).set_cost_active(id, active)
    }

    fn delete_cost_record(&self, id: CostRecordId) -> DomainResult<()> {
        (**self).delete_cost_record(id)
    }

    fn insert_price_record(&self, draft: NewPriceRecord) -> DomainResult<PriceRecord> {
        (**self).insert_price_record(draft)
    }

    fn price_record(&self, id: PriceRecordId) -> DomainResult<PriceRecord> {
        (**self).price_record(id)
    }

    fn price_records(&self, product_id: ProductId) -> DomainResult<Vec<PriceRecord>> {
        (**self).price_records(product_id)
    }

    fn active_price_records(&self, product_id: ProductId) -> DomainResult<Vec<PriceRecord>> {
        (**self).active_price_records(product_id)
    }

    fn set_price_active(&self, id: PriceRecordId, active: bool) -> DomainResult<PriceRecord> {
        (**self).set_price_active(id, active)
    }

    fn delete_price_record(&self, id: PriceRecordId) -> DomainResult<()> {
        (**self).delete_price_record(id)
    }

    fn insert_movement(&self, draft: NewMovement) -> DomainResult<Movement> {
        (**self).insert_movement(draft)
    }

    fn movement(&self, id: MovementId) -> DomainResult<Movement> {
        (**self).movement(id)
    }

    fn movements(&self) -> DomainResult<Vec<Movement>> {
        (**self).movements()
    }

    fn movements_for_product(&self, product_id: ProductId) -> DomainResult<Vec<Movement>> {
        (**self).movements_for_product(product_id)
    }

    fn quantity_total(&self, product_id: ProductId, direction: Direction) -> DomainResult<u64> {
        (**self).quantity_total(product_id, direction)
    }
}
