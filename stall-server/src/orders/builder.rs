//! 下单时的价格快照与库存扣减
//!
//! 名称和单价在这里从当前菜单复制到订单行，之后菜单改动不影响历史订单。

use std::collections::BTreeMap;

use crate::store::StoreDocument;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::order::money::{self, MAX_QUANTITY};
use shared::order::{OrderItem, OrderLineInput, OrderTopping};

/// Resolve requested lines against the catalog
pub fn build_items(doc: &StoreDocument, lines: &[OrderLineInput]) -> AppResult<Vec<OrderItem>> {
    if lines.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty));
    }
    lines
        .iter()
        .enumerate()
        .map(|(index, line)| build_item(doc, index, line))
        .collect()
}

fn build_item(doc: &StoreDocument, index: usize, line: &OrderLineInput) -> AppResult<OrderItem> {
    if line.quantity == 0 || line.quantity > MAX_QUANTITY {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("Quantity must be between 1 and {}", MAX_QUANTITY),
        )
        .with_detail("line", index)
        .with_detail("quantity", line.quantity));
    }

    let product = doc.require_product(line.product_id)?;
    if !product.is_available {
        return Err(AppError::with_message(
            ErrorCode::ProductUnavailable,
            format!("{} is not available", product.name),
        )
        .with_detail("product_id", product.id));
    }

    let mut toppings: Vec<OrderTopping> = Vec::with_capacity(line.topping_ids.len());
    for &topping_id in &line.topping_ids {
        if toppings.iter().any(|t| t.topping_id == topping_id) {
            continue;
        }
        let topping = doc.require_topping(topping_id)?;
        if !product.offers_topping(topping_id) {
            return Err(AppError::with_message(
                ErrorCode::ToppingNotOffered,
                format!("{} cannot be added to {}", topping.name, product.name),
            )
            .with_detail("product_id", product.id)
            .with_detail("topping_id", topping_id));
        }
        if !topping.is_available {
            return Err(AppError::with_message(
                ErrorCode::ProductUnavailable,
                format!("{} is not available", topping.name),
            )
            .with_detail("topping_id", topping_id));
        }
        toppings.push(OrderTopping {
            topping_id,
            name: topping.name.clone(),
            price: topping.price,
        });
    }

    let line_total = money::line_total(
        product.price,
        toppings.iter().map(|t| t.price),
        line.quantity,
    );

    Ok(OrderItem {
        product_id: product.id,
        product_name: product.name.clone(),
        unit_price: product.price,
        toppings,
        quantity: line.quantity,
        line_total,
    })
}

fn quantities_by_product(items: &[OrderItem]) -> BTreeMap<i64, u32> {
    let mut needed = BTreeMap::new();
    for item in items {
        *needed.entry(item.product_id).or_insert(0u32) += item.quantity;
    }
    needed
}

/// Take stock for tracked products; all-or-nothing
pub fn reserve_stock(doc: &mut StoreDocument, items: &[OrderItem], now: i64) -> AppResult<()> {
    let needed = quantities_by_product(items);

    for (&product_id, &quantity) in &needed {
        if let Some(stock) = doc.stock(product_id)
            && stock.available() < quantity
        {
            return Err(AppError::with_message(
                ErrorCode::ProductOutOfStock,
                format!("Only {} left", stock.available()),
            )
            .with_detail("product_id", product_id)
            .with_detail("available", stock.available())
            .with_detail("requested", quantity));
        }
    }

    for (product_id, quantity) in needed {
        if let Some(stock) = doc.stock_mut(product_id) {
            stock.current -= quantity;
            stock.updated_at = now;
        }
    }
    Ok(())
}

/// Return stock taken by a cancelled order
pub fn release_stock(doc: &mut StoreDocument, items: &[OrderItem], now: i64) {
    for (product_id, quantity) in quantities_by_product(items) {
        if let Some(stock) = doc.stock_mut(product_id) {
            stock.current = stock.current.saturating_add(quantity);
            stock.updated_at = now;
        }
    }
}

/// `created_at` plus the slowest line's preparation time
pub fn estimate_pickup(
    doc: &StoreDocument,
    items: &[OrderItem],
    created_at: i64,
    default_minutes: u32,
) -> i64 {
    let minutes = items
        .iter()
        .map(|item| {
            doc.product(item.product_id)
                .and_then(|p| p.preparation_minutes)
                .unwrap_or(default_minutes)
        })
        .max()
        .unwrap_or(default_minutes);
    created_at + i64::from(minutes) * 60_000
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::seed::default_document;

    fn line(product_id: i64, topping_ids: Vec<i64>, quantity: u32) -> OrderLineInput {
        OrderLineInput {
            product_id,
            topping_ids,
            quantity,
        }
    }

    #[test]
    fn test_snapshot_prices_and_totals() {
        let doc = default_document();
        // 焼きそば 600 + マヨネーズ 50, x2
        let items = build_items(&doc, &[line(1, vec![101, 101], 2)]).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].unit_price, 600.0);
        assert_eq!(items[0].toppings.len(), 1);
        assert_eq!(items[0].line_total, 1300.0);
    }

    #[test]
    fn test_rejections() {
        let mut doc = default_document();
        assert_eq!(
            build_items(&doc, &[]).unwrap_err().code,
            ErrorCode::OrderEmpty
        );
        assert_eq!(
            build_items(&doc, &[line(1, vec![], 0)]).unwrap_err().code,
            ErrorCode::ValueOutOfRange
        );
        assert_eq!(
            build_items(&doc, &[line(1, vec![], MAX_QUANTITY + 1)])
                .unwrap_err()
                .code,
            ErrorCode::ValueOutOfRange
        );
        assert_eq!(
            build_items(&doc, &[line(999, vec![], 1)]).unwrap_err().code,
            ErrorCode::ProductNotFound
        );
        assert_eq!(
            build_items(&doc, &[line(1, vec![9999], 1)]).unwrap_err().code,
            ErrorCode::ToppingNotFound
        );
        // ラムネ offers no toppings
        assert_eq!(
            build_items(&doc, &[line(6, vec![101], 1)]).unwrap_err().code,
            ErrorCode::ToppingNotOffered
        );

        doc.product_mut(1).unwrap().is_available = false;
        assert_eq!(
            build_items(&doc, &[line(1, vec![], 1)]).unwrap_err().code,
            ErrorCode::ProductUnavailable
        );
    }

    #[test]
    fn test_stock_reserve_is_all_or_nothing() {
        let mut doc = default_document();
        doc.stock_mut(2).unwrap().current = 1;
        let items = build_items(&doc, &[line(1, vec![], 3), line(2, vec![], 2)]).unwrap();

        let before = doc.stock(1).unwrap().current;
        let err = reserve_stock(&mut doc, &items, 0).unwrap_err();
        assert_eq!(err.code, ErrorCode::ProductOutOfStock);
        assert_eq!(doc.stock(1).unwrap().current, before);

        let items = build_items(&doc, &[line(1, vec![], 3), line(1, vec![101], 2)]).unwrap();
        reserve_stock(&mut doc, &items, 0).unwrap();
        assert_eq!(doc.stock(1).unwrap().current, before - 5);

        release_stock(&mut doc, &items, 0);
        assert_eq!(doc.stock(1).unwrap().current, before);
    }

    #[test]
    fn test_estimate_uses_slowest_line() {
        let mut doc = default_document();
        // 焼きそば 8 min, 唐揚げ 12 min
        let items = build_items(&doc, &[line(1, vec![], 1), line(3, vec![], 1)]).unwrap();
        assert_eq!(estimate_pickup(&doc, &items, 0, 10), 12 * 60_000);

        doc.product_mut(6).unwrap().preparation_minutes = None;
        let items = build_items(&doc, &[line(6, vec![], 1)]).unwrap();
        assert_eq!(estimate_pickup(&doc, &items, 1_000, 10), 1_000 + 10 * 60_000);
    }
}
