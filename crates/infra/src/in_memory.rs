//! In-memory ledger store.
//!
//! Intended for tests/dev. Not optimized for performance: tables are plain
//! vectors in creation order, scanned linearly. A single `RwLock` over the
//! whole ledger serializes writers, which makes the activate-exclusively
//! sequences atomic as the port contract requires.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Duration, Utc};

use stockledger_core::{
    CostRecordId, DomainError, DomainResult, MovementId, PriceRecordId, ProductId,
};
use stockledger_inventory::model::{CostRecord, Direction, Movement, PriceRecord, Product};
use stockledger_inventory::store::{
    LedgerStore, NewCostRecord, NewMovement, NewPriceRecord, NewProduct, ProductPatch,
};

#[derive(Debug, Default)]
struct LedgerState {
    products: Vec<Product>,
    cost_records: Vec<CostRecord>,
    price_records: Vec<PriceRecord>,
    movements: Vec<Movement>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl LedgerState {
    /// Strictly monotonic creation timestamps. Writes landing within the
    /// same clock instant get nudged forward a microsecond so that
    /// "most recently created" stays unambiguous.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let mut now = Utc::now();
        if let Some(last) = self.last_timestamp {
            if now <= last {
                now = last + Duration::microseconds(1);
            }
        }
        self.last_timestamp = Some(now);
        now
    }

    fn ensure_product(&self, id: ProductId) -> DomainResult<()> {
        if self.products.iter().any(|p| p.id == id) {
            Ok(())
        } else {
            Err(DomainError::not_found())
        }
    }
}

/// In-memory implementation of the [`LedgerStore`] port.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    state: RwLock<LedgerState>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> DomainResult<RwLockReadGuard<'_, LedgerState>> {
        self.state
            .read()
            .map_err(|_| DomainError::storage("ledger lock poisoned"))
    }

    fn write(&self) -> DomainResult<RwLockWriteGuard<'_, LedgerState>> {
        self.state
            .write()
            .map_err(|_| DomainError::storage("ledger lock poisoned"))
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn insert_product(&self, draft: NewProduct) -> DomainResult<Product> {
        let mut state = self.write()?;
        let now = state.next_timestamp();
        let product = Product {
            id: ProductId::new(),
            description: draft.description,
            base_cost: draft.base_cost,
            base_price: draft.base_price,
            alert_threshold: draft.alert_threshold,
            created_at: now,
            modified_at: now,
        };
        state.products.push(product.clone());
        Ok(product)
    }

    fn product(&self, id: ProductId) -> DomainResult<Product> {
        self.read()?
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(DomainError::not_found)
    }

    fn products(&self) -> DomainResult<Vec<Product>> {
        Ok(self.read()?.products.clone())
    }

    fn update_product(&self, id: ProductId, patch: ProductPatch) -> DomainResult<Product> {
        let mut state = self.write()?;
        let now = state.next_timestamp();
        let product = state
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(DomainError::not_found)?;

        if let Some(description) = patch.description {
            product.description = description;
        }
        if let Some(base_cost) = patch.base_cost {
            product.base_cost = base_cost;
        }
        if let Some(base_price) = patch.base_price {
            product.base_price = base_price;
        }
        if let Some(alert_threshold) = patch.alert_threshold {
            product.alert_threshold = alert_threshold;
        }
        product.modified_at = now;
        Ok(product.clone())
    }

    fn delete_product(&self, id: ProductId) -> DomainResult<()> {
        let mut state = self.write()?;
        state.ensure_product(id)?;

        // Referential ownership: the product takes its history with it.
        state.products.retain(|p| p.id != id);
        state.cost_records.retain(|c| c.product_id != id);
        state.price_records.retain(|p| p.product_id != id);
        state.movements.retain(|m| m.product_id != id);
        tracing::debug!(product_id = %id, "product and history removed");
        Ok(())
    }

    fn insert_cost_record(&self, draft: NewCostRecord) -> DomainResult<CostRecord> {
        let mut state = self.write()?;
        state.ensure_product(draft.product_id)?;
        if draft.active {
            for record in state
                .cost_records
                .iter_mut()
                .filter(|c| c.product_id == draft.product_id)
            {
                record.active = false;
            }
        }
        let now = state.next_timestamp();
        let record = CostRecord {
            id: CostRecordId::new(),
            product_id: draft.product_id,
            cost: draft.cost,
            supplier: draft.supplier,
            active: draft.active,
            comment: draft.comment,
            created_at: now,
        };
        state.cost_records.push(record.clone());
        Ok(record)
    }

    fn cost_record(&self, id: CostRecordId) -> DomainResult<CostRecord> {
        self.read()?
            .cost_records
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(DomainError::not_found)
    }

    fn cost_records(&self, product_id: ProductId) -> DomainResult<Vec<CostRecord>> {
        Ok(self
            .read()?
            .cost_records
            .iter()
            .filter(|c| c.product_id == product_id)
            .cloned()
            .collect())
    }

    fn active_cost_records(&self, product_id: ProductId) -> DomainResult<Vec<CostRecord>> {
        Ok(self
            .read()?
            .cost_records
            .iter()
            .filter(|c| c.product_id == product_id && c.active)
            .cloned()
            .collect())
    }

    fn set_cost_active(&self, id: CostRecordId, active: bool) -> DomainResult<CostRecord> {
        let mut state = self.write()?;
        let product_id = state
            .cost_records
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.product_id)
            .ok_or_else(DomainError::not_found)?;

        if active {
            for record in state
                .cost_records
                .iter_mut()
                .filter(|c| c.product_id == product_id)
            {
                record.active = false;
            }
        }
        let record = state
            .cost_records
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(DomainError::not_found)?;
        record.active = active;
        Ok(record.clone())
    }

    fn delete_cost_record(&self, id: CostRecordId) -> DomainResult<()> {
        let mut state = self.write()?;
        if !state.cost_records.iter().any(|c| c.id == id) {
            return Err(DomainError::not_found());
        }
        state.cost_records.retain(|c| c.id != id);
        // Movements keep no "used cost"; valuation falls back to current cost.
        for movement in state.movements.iter_mut() {
            if movement.cost_ref == Some(id) {
                movement.cost_ref = None;
            }
        }
        Ok(())
    }

    fn insert_price_record(&self, draft: NewPriceRecord) -> DomainResult<PriceRecord> {
        let mut state = self.write()?;
        state.ensure_product(draft.product_id)?;
        if draft.active {
            for record in state
                .price_records
                .iter_mut()
                .filter(|p| p.product_id == draft.product_id)
            {
                record.active = false;
            }
        }
        let now = state.next_timestamp();
        let record = PriceRecord {
            id: PriceRecordId::new(),
            product_id: draft.product_id,
            price: draft.price,
            client: draft.client,
            active: draft.active,
            comment: draft.comment,
            created_at: now,
        };
        state.price_records.push(record.clone());
        Ok(record)
    }

    fn price_record(&self, id: PriceRecordId) -> DomainResult<PriceRecord> {
        self.read()?
            .price_records
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(DomainError::not_found)
    }

    fn price_records(&self, product_id: ProductId) -> DomainResult<Vec<PriceRecord>> {
        Ok(self
            .read()?
            .price_records
            .iter()
            .filter(|p| p.product_id == product_id)
            .cloned()
            .collect())
    }

    fn active_price_records(&self, product_id: ProductId) -> DomainResult<Vec<PriceRecord>> {
        Ok(self
            .read()?
            .price_records
            .iter()
            .filter(|p| p.product_id == product_id && p.active)
            .cloned()
            .collect())
    }

    fn set_price_active(&self, id: PriceRecordId, active: bool) -> DomainResult<PriceRecord> {
        let mut state = self.write()?;
        let product_id = state
            .price_records
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.product_id)
            .ok_or_else(DomainError::not_found)?;

        if active {
            for record in state
                .price_records
                .iter_mut()
                .filter(|p| p.product_id == product_id)
            {
                record.active = false;
            }
        }
        let record = state
            .price_records
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(DomainError::not_found)?;
        record.active = active;
        Ok(record.clone())
    }

    fn delete_price_record(&self, id: PriceRecordId) -> DomainResult<()> {
        let mut state = self.write()?;
        if !state.price_records.iter().any(|p| p.id == id) {
            return Err(DomainError::not_found());
        }
        state.price_records.retain(|p| p.id != id);
        for movement in state.movements.iter_mut() {
            if movement.price_ref == Some(id) {
                movement.price_ref = None;
            }
        }
        Ok(())
    }

    fn insert_movement(&self, draft: NewMovement) -> DomainResult<Movement> {
        let mut state = self.write()?;
        state.ensure_product(draft.product_id)?;
        if let Some(price_ref) = draft.price_ref {
            if !state.price_records.iter().any(|p| p.id == price_ref) {
                return Err(DomainError::not_found());
            }
        }
        if let Some(cost_ref) = draft.cost_ref {
            if !state.cost_records.iter().any(|c| c.id == cost_ref) {
                return Err(DomainError::not_found());
            }
        }
        let now = state.next_timestamp();
        let movement = Movement {
            id: MovementId::new(),
            product_id: draft.product_id,
            direction: draft.direction,
            quantity: draft.quantity,
            price_ref: draft.price_ref,
            cost_ref: draft.cost_ref,
            comment: draft.comment,
            created_at: now,
        };
        state.movements.push(movement.clone());
        Ok(movement)
    }

    fn movement(&self, id: MovementId) -> DomainResult<Movement> {
        self.read()?
            .movements
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or_else(DomainError::not_found)
    }

    fn movements(&self) -> DomainResult<Vec<Movement>> {
        Ok(self.read()?.movements.clone())
    }

    fn movements_for_product(&self, product_id: ProductId) -> DomainResult<Vec<Movement>> {
        Ok(self
            .read()?
            .movements
            .iter()
            .filter(|m| m.product_id == product_id)
            .cloned()
            .collect())
    }

    fn quantity_total(&self, product_id: ProductId, direction: Direction) -> DomainResult<u64> {
        Ok(self
            .read()?
            .movements
            .iter()
            .filter(|m| m.product_id == product_id && m.direction == direction)
            .map(|m| u64::from(m.quantity))
            .sum())
    }
}
