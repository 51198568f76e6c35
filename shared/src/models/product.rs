//! Product Model

use serde::{Deserialize, Serialize};

/// Product entity (menu item sold at the stall)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    /// Unit price (yen)
    pub price: f64,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    pub is_available: bool,
    /// Minutes the kitchen needs for one batch
    #[serde(default)]
    pub preparation_minutes: Option<u32>,
    /// Toppings that may be added to this product
    #[serde(default)]
    pub topping_ids: Vec<i64>,
    #[serde(default)]
    pub sort_order: i32,
}

impl Product {
    /// Whether the given topping can be added to this product
    pub fn offers_topping(&self, topping_id: i64) -> bool {
        self.topping_ids.contains(&topping_id)
    }
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub price: f64,
    pub category: String,
    pub description: Option<String>,
    pub is_available: Option<bool>,
    pub preparation_minutes: Option<u32>,
    pub topping_ids: Option<Vec<i64>>,
    pub sort_order: Option<i32>,
    /// Initial stock; `None` disables stock tracking for the product
    pub initial_stock: Option<u32>,
    pub low_stock_threshold: Option<u32>,
}

/// Update product payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub is_available: Option<bool>,
    pub preparation_minutes: Option<u32>,
    pub topping_ids: Option<Vec<i64>>,
    pub sort_order: Option<i32>,
}

impl ProductUpdate {
    /// Apply the set fields onto an existing product
    pub fn apply_to(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(description) = self.description {
            product.description = Some(description);
        }
        if let Some(is_available) = self.is_available {
            product.is_available = is_available;
        }
        if let Some(minutes) = self.preparation_minutes {
            product.preparation_minutes = Some(minutes);
        }
        if let Some(topping_ids) = self.topping_ids {
            product.topping_ids = topping_ids;
        }
        if let Some(sort_order) = self.sort_order {
            product.sort_order = sort_order;
        }
    }
}
