//! The single persisted store document

use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Product, StockInfo, Topping};
use shared::order::Order;

/// Everything the stall knows, serialized as one JSON value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreDocument {
    /// Bumped on every committed write
    #[serde(default)]
    pub version: u64,
    /// Last issued order number counter (1..=999)
    #[serde(default)]
    pub order_seq: u32,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub toppings: Vec<Topping>,
    #[serde(default)]
    pub stock: Vec<StockInfo>,
    #[serde(default)]
    pub orders: Vec<Order>,
}

impl StoreDocument {
    pub fn product(&self, id: i64) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn product_mut(&mut self, id: i64) -> Option<&mut Product> {
        self.products.iter_mut().find(|p| p.id == id)
    }

    pub fn topping(&self, id: i64) -> Option<&Topping> {
        self.toppings.iter().find(|t| t.id == id)
    }

    pub fn topping_mut(&mut self, id: i64) -> Option<&mut Topping> {
        self.toppings.iter_mut().find(|t| t.id == id)
    }

    pub fn stock(&self, product_id: i64) -> Option<&StockInfo> {
        self.stock.iter().find(|s| s.product_id == product_id)
    }

    pub fn stock_mut(&mut self, product_id: i64) -> Option<&mut StockInfo> {
        self.stock.iter_mut().find(|s| s.product_id == product_id)
    }

    pub fn order(&self, id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    pub fn order_mut(&mut self, id: &str) -> AppResult<&mut Order> {
        self.orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| AppError::order_not_found(id))
    }

    pub fn require_product(&self, id: i64) -> AppResult<&Product> {
        self.product(id)
            .ok_or_else(|| AppError::product_not_found(id.to_string()))
    }

    pub fn require_topping(&self, id: i64) -> AppResult<&Topping> {
        self.topping(id).ok_or_else(|| {
            AppError::with_message(ErrorCode::ToppingNotFound, format!("Topping {} not found", id))
                .with_detail("topping_id", id)
        })
    }

    /// Whether any stored order currently holds this number
    pub fn order_number_in_use(&self, number: &str) -> bool {
        self.orders.iter().any(|o| o.order_number == number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_default() {
        // Older documents written before stock tracking still load
        let doc: StoreDocument =
            serde_json::from_str(r#"{"products":[],"orders":[]}"#).unwrap();
        assert_eq!(doc.version, 0);
        assert!(doc.stock.is_empty());
        assert!(doc.toppings.is_empty());
    }

    #[test]
    fn test_lookup_misses_map_to_codes() {
        let mut doc = StoreDocument::default();
        assert_eq!(
            doc.require_product(1).unwrap_err().code,
            ErrorCode::ProductNotFound
        );
        assert_eq!(
            doc.require_topping(2).unwrap_err().code,
            ErrorCode::ToppingNotFound
        );
        assert_eq!(doc.order_mut("x").unwrap_err().code, ErrorCode::OrderNotFound);
    }
}
