//! Stock Model

use serde::{Deserialize, Serialize};

/// Per-product stock counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockInfo {
    pub product_id: i64,
    pub current: u32,
    pub initial: u32,
    /// Units held back (e.g. set aside for staff meals)
    #[serde(default)]
    pub reserved: u32,
    pub low_stock_threshold: u32,
    #[serde(default)]
    pub updated_at: i64,
}

impl StockInfo {
    pub fn new(product_id: i64, initial: u32, low_stock_threshold: u32) -> Self {
        Self {
            product_id,
            current: initial,
            initial,
            reserved: 0,
            low_stock_threshold,
            updated_at: 0,
        }
    }

    /// Units that can still be sold
    pub fn available(&self) -> u32 {
        self.current.saturating_sub(self.reserved)
    }

    pub fn is_low(&self) -> bool {
        self.available() <= self.low_stock_threshold
    }

    pub fn is_sold_out(&self) -> bool {
        self.available() == 0
    }
}

/// Admin stock adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StockAdjustment {
    /// Add (positive) or remove (negative) units
    Delta { amount: i64 },
    /// Overwrite the current count
    Set { current: u32 },
    /// Change the reserved count
    Reserve { reserved: u32 },
    /// Change the low-stock threshold
    Threshold { low_stock_threshold: u32 },
    /// Restore `current` to `initial`
    Reset,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_subtracts_reserved() {
        let mut stock = StockInfo::new(1, 20, 5);
        stock.reserved = 3;
        assert_eq!(stock.available(), 17);
        assert!(!stock.is_low());

        stock.current = 8;
        assert_eq!(stock.available(), 5);
        assert!(stock.is_low());

        stock.current = 2;
        assert_eq!(stock.available(), 0);
        assert!(stock.is_sold_out());
    }

    #[test]
    fn test_adjustment_wire_format() {
        let adj: StockAdjustment =
            serde_json::from_str(r#"{"kind":"delta","amount":-4}"#).unwrap();
        assert!(matches!(adj, StockAdjustment::Delta { amount: -4 }));
        let adj: StockAdjustment = serde_json::from_str(r#"{"kind":"reset"}"#).unwrap();
        assert!(matches!(adj, StockAdjustment::Reset));
    }
}
