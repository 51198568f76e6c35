//! Cart reducer
//!
//! Pure `(Cart, CartAction) -> Cart`. The total is recomputed from the lines
//! after every action, so `total == Σ line_total` always holds.

use super::money;
use super::status::PaymentMethod;
use super::types::{CreateOrderRequest, OrderLineInput};
use crate::error::{AppError, AppResult, ErrorCode};
use crate::models::{Product, Topping};
use crate::util::{new_request_id, non_blank};
use serde::{Deserialize, Serialize};

/// One cart line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: Product,
    /// Selected toppings, unique by id
    #[serde(default)]
    pub toppings: Vec<Topping>,
    pub quantity: u32,
    pub line_total: f64,
}

impl CartItem {
    pub fn new(product: Product, toppings: Vec<Topping>, quantity: u32) -> Self {
        let mut unique: Vec<Topping> = Vec::with_capacity(toppings.len());
        for topping in toppings {
            if !unique.iter().any(|t| t.id == topping.id) {
                unique.push(topping);
            }
        }
        let mut item = Self {
            product,
            toppings: unique,
            quantity: clamp_quantity(quantity),
            line_total: 0.0,
        };
        item.recompute();
        item
    }

    fn recompute(&mut self) {
        self.line_total = money::line_total(
            self.product.price,
            self.toppings.iter().map(|t| t.price),
            self.quantity,
        );
    }
}

/// Cart actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CartAction {
    /// Always appends a new line, even for an identical product+toppings combo
    Add {
        product: Product,
        #[serde(default)]
        toppings: Vec<Topping>,
        quantity: u32,
    },
    /// Out-of-range index is ignored
    Remove { index: usize },
    /// Quantity is clamped to at least 1
    ChangeQuantity { index: usize, quantity: u32 },
    Clear,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub items: Vec<CartItem>,
    pub total: f64,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reduce(mut self, action: CartAction) -> Cart {
        match action {
            CartAction::Add {
                product,
                toppings,
                quantity,
            } => {
                self.items.push(CartItem::new(product, toppings, quantity));
            }
            CartAction::Remove { index } => {
                if index < self.items.len() {
                    self.items.remove(index);
                }
            }
            CartAction::ChangeQuantity { index, quantity } => {
                if let Some(item) = self.items.get_mut(index) {
                    item.quantity = clamp_quantity(quantity);
                    item.recompute();
                }
            }
            CartAction::Clear => self.items.clear(),
        }
        self.total = money::sum(self.items.iter().map(|i| i.line_total));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Build the checkout request; an empty cart never reaches the server
    pub fn to_order_request(
        &self,
        payment_method: Option<PaymentMethod>,
        special_instructions: Option<String>,
    ) -> AppResult<CreateOrderRequest> {
        if self.is_empty() {
            return Err(AppError::new(ErrorCode::OrderEmpty));
        }
        Ok(CreateOrderRequest {
            items: self
                .items
                .iter()
                .map(|item| OrderLineInput {
                    product_id: item.product.id,
                    topping_ids: item.toppings.iter().map(|t| t.id).collect(),
                    quantity: item.quantity,
                })
                .collect(),
            payment_method,
            special_instructions: non_blank(special_instructions),
            request_id: Some(new_request_id()),
        })
    }
}

/// Floor only; the server rejects quantities above its limit
fn clamp_quantity(quantity: u32) -> u32 {
    quantity.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i64, price: f64) -> Product {
        Product {
            id,
            name: format!("product-{}", id),
            price,
            category: "food".into(),
            description: None,
            is_available: true,
            preparation_minutes: None,
            topping_ids: vec![100, 101],
            sort_order: 0,
        }
    }

    fn topping(id: i64, price: f64) -> Topping {
        Topping {
            id,
            name: format!("topping-{}", id),
            price,
            is_available: true,
        }
    }

    fn assert_total_invariant(cart: &Cart) {
        let expected = money::sum(cart.items.iter().map(|i| {
            money::line_total(
                i.product.price,
                i.toppings.iter().map(|t| t.price),
                i.quantity,
            )
        }));
        assert_eq!(cart.total, expected);
    }

    fn add(product: Product, toppings: Vec<Topping>, quantity: u32) -> CartAction {
        CartAction::Add {
            product,
            toppings,
            quantity,
        }
    }

    #[test]
    fn test_add_same_item_then_remove_first() {
        let cart = Cart::new().reduce(add(product(1, 600.0), vec![topping(100, 50.0)], 2));
        assert_eq!(cart.items[0].line_total, 1300.0);
        assert_eq!(cart.total, 1300.0);

        let cart = cart.reduce(add(product(1, 600.0), vec![topping(100, 50.0)], 2));
        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.total, 2600.0);

        let cart = cart.reduce(CartAction::Remove { index: 0 });
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.total, cart.items[0].line_total);
        assert_eq!(cart.total, 1300.0);
    }

    #[test]
    fn test_quantity_clamped_to_one() {
        let cart = Cart::new().reduce(add(product(1, 500.0), vec![], 0));
        assert_eq!(cart.items[0].quantity, 1);

        let cart = cart.reduce(CartAction::ChangeQuantity {
            index: 0,
            quantity: 0,
        });
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 1);
        assert_eq!(cart.total, 500.0);

        let cart = cart.reduce(CartAction::ChangeQuantity {
            index: 0,
            quantity: 4,
        });
        assert_eq!(cart.total, 2000.0);

        // No upper cap here; the order endpoint owns the range check
        let cart = cart.reduce(CartAction::ChangeQuantity {
            index: 0,
            quantity: 1500,
        });
        assert_eq!(cart.items[0].quantity, 1500);
        assert_eq!(cart.total, 750_000.0);
    }

    #[test]
    fn test_out_of_range_is_noop() {
        let cart = Cart::new().reduce(add(product(1, 500.0), vec![], 1));
        let same = cart
            .clone()
            .reduce(CartAction::Remove { index: 5 })
            .reduce(CartAction::ChangeQuantity {
                index: 9,
                quantity: 3,
            });
        assert_eq!(same, cart);
    }

    #[test]
    fn test_duplicate_toppings_collapse() {
        let cart = Cart::new().reduce(add(
            product(1, 400.0),
            vec![topping(100, 50.0), topping(100, 50.0), topping(101, 30.0)],
            1,
        ));
        assert_eq!(cart.items[0].toppings.len(), 2);
        assert_eq!(cart.total, 480.0);
    }

    #[test]
    fn test_total_invariant_over_action_sequence() {
        let actions = vec![
            add(product(1, 600.0), vec![topping(100, 50.0)], 2),
            add(product(2, 350.0), vec![], 3),
            add(product(3, 0.1), vec![topping(101, 0.2)], 3),
            CartAction::ChangeQuantity {
                index: 1,
                quantity: 1,
            },
            CartAction::Remove { index: 0 },
            CartAction::Remove { index: 7 },
            add(product(1, 600.0), vec![], 1),
            CartAction::ChangeQuantity {
                index: 2,
                quantity: 0,
            },
        ];

        let mut cart = Cart::new();
        for action in actions {
            let before = cart.items.len();
            let is_valid_remove = matches!(action, CartAction::Remove { index } if index < before);
            cart = cart.reduce(action);
            if is_valid_remove {
                assert_eq!(cart.items.len(), before - 1);
            }
            assert_total_invariant(&cart);
        }

        let cart = cart.reduce(CartAction::Clear);
        assert!(cart.is_empty());
        assert_eq!(cart.total, 0.0);
    }

    #[test]
    fn test_to_order_request() {
        let err = Cart::new().to_order_request(None, None).unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderEmpty);

        let cart = Cart::new().reduce(add(product(1, 600.0), vec![topping(100, 50.0)], 2));
        let req = cart
            .to_order_request(Some(PaymentMethod::Cash), Some("  ".into()))
            .unwrap();
        assert_eq!(req.items.len(), 1);
        assert_eq!(req.items[0].product_id, 1);
        assert_eq!(req.items[0].topping_ids, vec![100]);
        assert_eq!(req.items[0].quantity, 2);
        assert_eq!(req.special_instructions, None);

        // Every checkout gets its own idempotency key
        let again = cart.to_order_request(None, None).unwrap();
        assert!(req.request_id.is_some());
        assert_ne!(req.request_id, again.request_id);
    }
}
