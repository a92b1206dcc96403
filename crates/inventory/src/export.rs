//! Tabular movement export.
//!
//! Projects movements (with resolved product description and direction
//! label) into rows, after an optional date-range/direction/product filter,
//! and writes them as CSV. A UTF-8 BOM is emitted first so spreadsheet
//! tools pick up the encoding.

use std::collections::HashMap;
use std::io::Write;

use chrono::NaiveDate;
use serde::Serialize;

use stockledger_core::{DomainError, DomainResult, ProductId};

use crate::model::{Direction, Movement};
use crate::store::LedgerStore;

/// Movement filter; `None` fields match everything. Date bounds are
/// inclusive whole days in UTC.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovementFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub direction: Option<Direction>,
    pub product_id: Option<ProductId>,
}

impl MovementFilter {
    pub fn matches(&self, movement: &Movement) -> bool {
        let day = movement.created_at.date_naive();
        if self.from.is_some_and(|from| day < from) {
            return false;
        }
        if self.to.is_some_and(|to| day > to) {
            return false;
        }
        if self.direction.is_some_and(|d| movement.direction != d) {
            return false;
        }
        if self.product_id.is_some_and(|p| movement.product_id != p) {
            return false;
        }
        true
    }
}

/// One export row. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovementRow {
    pub date: String,
    pub product: String,
    pub direction: String,
    pub quantity: u32,
    pub comment: String,
}

/// Project a movement into a row, given its product's description.
pub fn project(movement: &Movement, description: &str) -> MovementRow {
    MovementRow {
        date: movement.created_at.format("%d.%m.%Y %H:%M").to_string(),
        product: description.to_string(),
        direction: movement.direction.label().to_string(),
        quantity: movement.quantity,
        comment: movement.comment.clone().unwrap_or_default(),
    }
}

/// Filtered export rows over the whole ledger, in movement creation order.
pub fn rows<S: LedgerStore>(store: &S, filter: &MovementFilter) -> DomainResult<Vec<MovementRow>> {
    let descriptions: HashMap<ProductId, String> = store
        .products()?
        .into_iter()
        .map(|p| (p.id, p.description))
        .collect();

    store
        .movements()?
        .iter()
        .filter(|m| filter.matches(m))
        .map(|m| {
            let description = descriptions
                .get(&m.product_id)
                .ok_or_else(DomainError::not_found)?;
            Ok(project(m, description))
        })
        .collect()
}

/// Write rows as CSV with a header row, preceded by a UTF-8 BOM.
pub fn write_csv<W: Write>(rows: &[MovementRow], mut out: W) -> Result<(), csv::Error> {
    out.write_all("\u{feff}".as_bytes())?;
    let mut writer = csv::Writer::from_writer(out);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use stockledger_core::MovementId;

    fn movement_on(day: NaiveDate, direction: Direction, product_id: ProductId) -> Movement {
        Movement {
            id: MovementId::new(),
            product_id,
            direction,
            quantity: 7,
            price_ref: None,
            cost_ref: None,
            comment: Some("restock".to_string()),
            created_at: Utc
                .from_utc_datetime(&day.and_hms_opt(14, 30, 0).expect("valid time")),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn filter_date_bounds_are_inclusive() {
        let product_id = ProductId::new();
        let m = movement_on(date(2025, 3, 15), Direction::In, product_id);

        let inside = MovementFilter {
            from: Some(date(2025, 3, 15)),
            to: Some(date(2025, 3, 15)),
            ..Default::default()
        };
        assert!(inside.matches(&m));

        let before = MovementFilter {
            from: Some(date(2025, 3, 16)),
            ..Default::default()
        };
        assert!(!before.matches(&m));

        let after = MovementFilter {
            to: Some(date(2025, 3, 14)),
            ..Default::default()
        };
        assert!(!after.matches(&m));
    }

    #[test]
    fn filter_by_direction_and_product() {
        let product_id = ProductId::new();
        let m = movement_on(date(2025, 3, 15), Direction::Out, product_id);

        let matching = MovementFilter {
            direction: Some(Direction::Out),
            product_id: Some(product_id),
            ..Default::default()
        };
        assert!(matching.matches(&m));

        let wrong_direction = MovementFilter {
            direction: Some(Direction::In),
            ..Default::default()
        };
        assert!(!wrong_direction.matches(&m));

        let wrong_product = MovementFilter {
            product_id: Some(ProductId::new()),
            ..Default::default()
        };
        assert!(!wrong_product.matches(&m));
    }

    #[test]
    fn project_formats_timestamp_and_labels() {
        let m = movement_on(date(2025, 3, 5), Direction::In, ProductId::new());
        let row = project(&m, "Widget");
        assert_eq!(row.date, "05.03.2025 14:30");
        assert_eq!(row.product, "Widget");
        assert_eq!(row.direction, "receipt");
        assert_eq!(row.quantity, 7);
        assert_eq!(row.comment, "restock");
    }

    #[test]
    fn csv_output_has_bom_and_header() {
        let m = movement_on(date(2025, 3, 5), Direction::Out, ProductId::new());
        let rows = vec![project(&m, "Widget")];

        let mut buf = Vec::new();
        write_csv(&rows, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.starts_with('\u{feff}'));
        let mut lines = text.trim_start_matches('\u{feff}').lines();
        assert_eq!(lines.next(), Some("date,product,direction,quantity,comment"));
        assert_eq!(
            lines.next(),
            Some("05.03.2025 14:30,Widget,issue,7,restock")
        );
    }
}
