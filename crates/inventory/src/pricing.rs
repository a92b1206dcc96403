//! Selectable-price lookup for a product.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockledger_core::PriceRecordId;

use crate::model::{PriceRecord, Product};

/// One selectable price, tagged with a display label. `record_id` is `None`
/// for the product's base price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceOption {
    pub record_id: Option<PriceRecordId>,
    pub price: Decimal,
    pub label: String,
}

/// Ordered price options: base price first, then the active negotiated
/// prices in creation order, client-annotated where a client is recorded.
pub fn price_options(product: &Product, active_prices: &[PriceRecord]) -> Vec<PriceOption> {
    let mut options = vec![PriceOption {
        record_id: None,
        price: product.base_price,
        label: format!("base price: {}", product.base_price),
    }];

    for record in active_prices.iter().filter(|p| p.active) {
        let label = match &record.client {
            Some(client) => format!("{} ({client})", record.price),
            None => record.price.to_string(),
        };
        options.push(PriceOption {
            record_id: Some(record.id),
            price: record.price,
            label,
        });
    }

    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use stockledger_core::ProductId;

    fn test_product() -> Product {
        let now = Utc::now();
        Product {
            id: ProductId::new(),
            description: "Widget".to_string(),
            base_cost: dec!(10.00),
            base_price: dec!(15.00),
            alert_threshold: 10,
            created_at: now,
            modified_at: now,
        }
    }

    fn negotiated(product: &Product, price: Decimal, client: Option<&str>) -> PriceRecord {
        PriceRecord {
            id: PriceRecordId::new(),
            product_id: product.id,
            price,
            client: client.map(str::to_string),
            active: true,
            comment: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn base_price_comes_first() {
        let product = test_product();
        let options = price_options(&product, &[]);
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].record_id, None);
        assert_eq!(options[0].price, dec!(15.00));
        assert_eq!(options[0].label, "base price: 15.00");
    }

    #[test]
    fn negotiated_prices_follow_with_client_labels() {
        let product = test_product();
        let anonymous = negotiated(&product, dec!(18.00), None);
        let for_acme = negotiated(&product, dec!(20.00), Some("Acme"));
        let options = price_options(&product, &[anonymous.clone(), for_acme.clone()]);

        assert_eq!(options.len(), 3);
        assert_eq!(options[1].record_id, Some(anonymous.id));
        assert_eq!(options[1].label, "18.00");
        assert_eq!(options[2].record_id, Some(for_acme.id));
        assert_eq!(options[2].label, "20.00 (Acme)");
    }
}
