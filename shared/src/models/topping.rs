//! Topping Model

use serde::{Deserialize, Serialize};

/// Topping entity (extra added to a product line)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topping {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub is_available: bool,
}

/// Create topping payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToppingCreate {
    pub name: String,
    pub price: f64,
    pub is_available: Option<bool>,
}

/// Update topping payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToppingUpdate {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub is_available: Option<bool>,
}

impl ToppingUpdate {
    pub fn apply_to(self, topping: &mut Topping) {
        if let Some(name) = self.name {
            topping.name = name;
        }
        if let Some(price) = self.price {
            topping.price = price;
        }
        if let Some(is_available) = self.is_available {
            topping.is_available = is_available;
        }
    }
}
