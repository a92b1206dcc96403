//! Movement recorder: validates and appends new records through the
//! ledger-store port.
//!
//! Validation happens before any store call, so a failed operation leaves
//! prior state unchanged. Deliberately absent: a stock-sufficiency check on
//! `out` movements. The source business rules accept over-issuing and read
//! the resulting negative level as a rupture signal.

use rust_decimal::Decimal;

use stockledger_core::{CostRecordId, DomainError, DomainResult, PriceRecordId, ProductId};

use crate::model::{CostRecord, Movement, PriceRecord, Product, DEFAULT_ALERT_THRESHOLD};
use crate::store::{
    LedgerStore, NewCostRecord, NewMovement, NewPriceRecord, NewProduct, ProductPatch,
};

/// Write-side service over a [`LedgerStore`].
#[derive(Debug)]
pub struct MovementRecorder<S> {
    store: S,
}

impl<S: LedgerStore> MovementRecorder<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Read access to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Create a product. The alert threshold defaults to
    /// [`DEFAULT_ALERT_THRESHOLD`] when not given.
    pub fn create_product(
        &self,
        description: impl Into<String>,
        base_cost: Decimal,
        base_price: Decimal,
        alert_threshold: Option<u32>,
    ) -> DomainResult<Product> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(DomainError::validation("description cannot be empty"));
        }
        ensure_non_negative(base_cost, "base cost")?;
        ensure_non_negative(base_price, "base price")?;

        let product = self.store.insert_product(NewProduct {
            description,
            base_cost,
            base_price,
            alert_threshold: alert_threshold.unwrap_or(DEFAULT_ALERT_THRESHOLD),
        })?;
        tracing::info!(product_id = %product.id, "product created");
        Ok(product)
    }

    /// Apply a partial update; the store refreshes `modified_at`.
    pub fn update_product(&self, id: ProductId, patch: ProductPatch) -> DomainResult<Product> {
        if let Some(description) = &patch.description {
            if description.trim().is_empty() {
                return Err(DomainError::validation("description cannot be empty"));
            }
        }
        if let Some(cost) = patch.base_cost {
            ensure_non_negative(cost, "base cost")?;
        }
        if let Some(price) = patch.base_price {
            ensure_non_negative(price, "base price")?;
        }

        let product = self.store.update_product(id, patch)?;
        tracing::info!(product_id = %product.id, "product updated");
        Ok(product)
    }

    /// Delete a product and, by cascade, its whole history.
    pub fn delete_product(&self, id: ProductId) -> DomainResult<()> {
        self.store.delete_product(id)?;
        tracing::info!(product_id = %id, "product deleted with history");
        Ok(())
    }

    /// Append a movement.
    ///
    /// Fails with a validation error on zero quantity and with `NotFound`
    /// if the product or a supplied price/cost reference does not exist.
    /// A reference whose direction does not match is accepted; valuation
    /// ignores it.
    pub fn record_movement(&self, draft: NewMovement) -> DomainResult<Movement> {
        if draft.quantity == 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        self.store.product(draft.product_id)?;
        if let Some(price_ref) = draft.price_ref {
            self.store.price_record(price_ref)?;
        }
        if let Some(cost_ref) = draft.cost_ref {
            self.store.cost_record(cost_ref)?;
        }

        let movement = self.store.insert_movement(draft)?;
        tracing::info!(
            movement_id = %movement.id,
            product_id = %movement.product_id,
            direction = movement.direction.label(),
            quantity = movement.quantity,
            "movement recorded"
        );
        Ok(movement)
    }

    /// Append a negotiated price record. When `active`, the store
    /// deactivates every other price record of the product in the same unit
    /// of work, keeping at most one active.
    pub fn record_price(
        &self,
        product_id: ProductId,
        price: Decimal,
        client: Option<String>,
        comment: Option<String>,
        active: bool,
    ) -> DomainResult<PriceRecord> {
        ensure_non_negative(price, "price")?;
        self.store.product(product_id)?;

        let record = self.store.insert_price_record(NewPriceRecord {
            product_id,
            price,
            client,
            active,
            comment,
        })?;
        tracing::info!(record_id = %record.id, product_id = %product_id, "price recorded");
        Ok(record)
    }

    /// Append a purchase-cost record; symmetric to
    /// [`MovementRecorder::record_price`].
    pub fn record_cost(
        &self,
        product_id: ProductId,
        cost: Decimal,
        supplier: Option<String>,
        comment: Option<String>,
        active: bool,
    ) -> DomainResult<CostRecord> {
        ensure_non_negative(cost, "cost")?;
        self.store.product(product_id)?;

        let record = self.store.insert_cost_record(NewCostRecord {
            product_id,
            cost,
            supplier,
            active,
            comment,
        })?;
        tracing::info!(record_id = %record.id, product_id = %product_id, "cost recorded");
        Ok(record)
    }

    /// Flip a price record's active flag.
    ///
    /// Activating an inactive record deactivates its siblings; deactivating
    /// an active record leaves the product with no active negotiated price,
    /// so `current_price` falls back to the base price.
    pub fn toggle_price_active(
        &self,
        product_id: ProductId,
        record_id: PriceRecordId,
    ) -> DomainResult<PriceRecord> {
        let record = self.store.price_record(record_id)?;
        if record.product_id != product_id {
            return Err(DomainError::not_found());
        }

        let updated = self.store.set_price_active(record_id, !record.active)?;
        tracing::info!(
            record_id = %record_id,
            product_id = %product_id,
            active = updated.active,
            "price toggled"
        );
        Ok(updated)
    }

    /// Cost-side twin of [`MovementRecorder::toggle_price_active`].
    pub fn toggle_cost_active(
        &self,
        product_id: ProductId,
        record_id: CostRecordId,
    ) -> DomainResult<CostRecord> {
        let record = self.store.cost_record(record_id)?;
        if record.product_id != product_id {
            return Err(DomainError::not_found());
        }

        let updated = self.store.set_cost_active(record_id, !record.active)?;
        tracing::info!(
            record_id = %record_id,
            product_id = %product_id,
            active = updated.active,
            "cost toggled"
        );
        Ok(updated)
    }
}

fn ensure_non_negative(value: Decimal, what: &str) -> DomainResult<()> {
    if value < Decimal::ZERO {
        return Err(DomainError::validation(format!("{what} cannot be negative")));
    }
    Ok(())
}
