//! Catalog Service - 菜单、配料与库存管理
//!
//! 所有写操作都走 [`DocumentStorage::update`]，提交后广播 [`ChangeNotice`]。
//! 已下单的订单保存的是价格快照，这里的修改不会影响历史订单。

use crate::message::MessageBus;
use crate::store::{DocumentStorage, StoreDocument};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::message::{ChangeAction, ChangeNotice, Resource};
use shared::models::{
    Product, ProductCreate, ProductUpdate, StockAdjustment, StockInfo, Topping, ToppingCreate,
    ToppingUpdate,
};
use shared::order::money;
use shared::util::{now_millis, snowflake_id};

const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 10;

#[derive(Debug, Clone)]
pub struct CatalogService {
    storage: DocumentStorage,
    bus: MessageBus,
}

impl CatalogService {
    pub fn new(storage: DocumentStorage, bus: MessageBus) -> Self {
        Self { storage, bus }
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Products ordered by `sort_order`
    pub fn get_products(&self) -> AppResult<Vec<Product>> {
        let mut products = self.storage.load()?.products;
        products.sort_by_key(|p| (p.sort_order, p.id));
        Ok(products)
    }

    pub fn get_product(&self, id: i64) -> AppResult<Product> {
        let doc = self.storage.load()?;
        doc.require_product(id).cloned()
    }

    pub fn create_product(&self, data: ProductCreate) -> AppResult<Product> {
        let name = require_name(&data.name)?;
        validate_price(data.price)?;

        let ((product, stock), version) = self.storage.update(|doc: &mut StoreDocument| {
            let topping_ids = data.topping_ids.unwrap_or_default();
            validate_topping_ids(doc, &topping_ids)?;

            let product = Product {
                id: snowflake_id(),
                name,
                price: data.price,
                category: data.category.trim().to_string(),
                description: data.description,
                is_available: data.is_available.unwrap_or(true),
                preparation_minutes: data.preparation_minutes,
                topping_ids,
                sort_order: data
                    .sort_order
                    .unwrap_or_else(|| doc.products.len() as i32),
            };
            doc.products.push(product.clone());

            let stock = data.initial_stock.map(|initial| StockInfo {
                updated_at: now_millis(),
                ..StockInfo::new(
                    product.id,
                    initial,
                    data.low_stock_threshold
                        .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD),
                )
            });
            if let Some(stock) = &stock {
                doc.stock.push(stock.clone());
            }
            Ok::<_, AppError>((product, stock))
        })?;

        tracing::info!(product_id = product.id, name = %product.name, "Product created");
        self.notify(Resource::Product, ChangeAction::Created, product.id, version, &product);
        if let Some(stock) = stock {
            self.notify(Resource::Stock, ChangeAction::Created, stock.product_id, version, &stock);
        }
        Ok(product)
    }

    pub fn update_product(&self, id: i64, data: ProductUpdate) -> AppResult<Product> {
        if let Some(name) = &data.name {
            require_name(name)?;
        }
        if let Some(price) = data.price {
            validate_price(price)?;
        }

        let (product, version) = self.storage.update(|doc: &mut StoreDocument| {
            if let Some(topping_ids) = &data.topping_ids {
                validate_topping_ids(doc, topping_ids)?;
            }
            let product = doc
                .product_mut(id)
                .ok_or_else(|| AppError::product_not_found(id.to_string()))?;
            data.apply_to(product);
            product.name = product.name.trim().to_string();
            Ok::<_, AppError>(product.clone())
        })?;

        tracing::info!(product_id = id, "Product updated");
        self.notify(Resource::Product, ChangeAction::Updated, id, version, &product);
        Ok(product)
    }

    /// Remove a product and its stock entry
    pub fn delete_product(&self, id: i64) -> AppResult<bool> {
        let (_, version) = self.storage.update(|doc: &mut StoreDocument| {
            doc.require_product(id)?;
            doc.products.retain(|p| p.id != id);
            doc.stock.retain(|s| s.product_id != id);
            Ok::<_, AppError>(())
        })?;

        tracing::info!(product_id = id, "Product deleted");
        self.bus.publish(ChangeNotice::new(
            Resource::Product,
            ChangeAction::Deleted,
            Some(id.to_string()),
            version,
        ));
        Ok(true)
    }

    // =========================================================================
    // Toppings
    // =========================================================================

    pub fn get_toppings(&self) -> AppResult<Vec<Topping>> {
        Ok(self.storage.load()?.toppings)
    }

    pub fn create_topping(&self, data: ToppingCreate) -> AppResult<Topping> {
        let name = require_name(&data.name)?;
        validate_price(data.price)?;

        let (topping, version) = self.storage.update(|doc: &mut StoreDocument| {
            let topping = Topping {
                id: snowflake_id(),
                name,
                price: data.price,
                is_available: data.is_available.unwrap_or(true),
            };
            doc.toppings.push(topping.clone());
            Ok::<_, AppError>(topping)
        })?;

        tracing::info!(topping_id = topping.id, name = %topping.name, "Topping created");
        self.notify(Resource::Topping, ChangeAction::Created, topping.id, version, &topping);
        Ok(topping)
    }

    pub fn update_topping(&self, id: i64, data: ToppingUpdate) -> AppResult<Topping> {
        if let Some(name) = &data.name {
            require_name(name)?;
        }
        if let Some(price) = data.price {
            validate_price(price)?;
        }

        let (topping, version) = self.storage.update(|doc: &mut StoreDocument| {
            doc.require_topping(id)?;
            let topping = doc
                .topping_mut(id)
                .ok_or_else(|| AppError::not_found(format!("Topping {}", id)))?;
            data.apply_to(topping);
            topping.name = topping.name.trim().to_string();
            Ok::<_, AppError>(topping.clone())
        })?;

        tracing::info!(topping_id = id, "Topping updated");
        self.notify(Resource::Topping, ChangeAction::Updated, id, version, &topping);
        Ok(topping)
    }

    // =========================================================================
    // Stock
    // =========================================================================

    pub fn get_stock(&self) -> AppResult<Vec<StockInfo>> {
        Ok(self.storage.load()?.stock)
    }

    /// Manual stock correction
    ///
    /// `Set` starts tracking a product that has no stock entry yet;
    /// every other adjustment needs an existing entry.
    pub fn adjust_stock(&self, product_id: i64, adjustment: StockAdjustment) -> AppResult<StockInfo> {
        let (stock, version) = self.storage.update(|doc: &mut StoreDocument| {
            doc.require_product(product_id)?;
            let now = now_millis();

            if doc.stock(product_id).is_none() {
                match adjustment {
                    StockAdjustment::Set { current } => {
                        doc.stock.push(StockInfo {
                            updated_at: now,
                            ..StockInfo::new(product_id, current, DEFAULT_LOW_STOCK_THRESHOLD)
                        });
                    }
                    _ => {
                        return Err(AppError::with_message(
                            ErrorCode::NotFound,
                            format!("Product {} has no stock tracking", product_id),
                        )
                        .with_detail("product_id", product_id));
                    }
                }
            } else if let Some(stock) = doc.stock_mut(product_id) {
                apply_adjustment(stock, &adjustment)?;
                stock.updated_at = now;
            }

            doc.stock(product_id)
                .cloned()
                .ok_or_else(|| AppError::internal("Stock entry vanished during update"))
        })?;

        tracing::info!(
            product_id,
            adjustment = ?adjustment,
            current = stock.current,
            available = stock.available(),
            "Stock adjusted"
        );
        self.notify(Resource::Stock, ChangeAction::Updated, product_id, version, &stock);
        Ok(stock)
    }

    fn notify<T: serde::Serialize>(
        &self,
        resource: Resource,
        action: ChangeAction,
        id: i64,
        version: u64,
        data: &T,
    ) {
        self.bus.publish(
            ChangeNotice::new(resource, action, Some(id.to_string()), version).with_data(data),
        );
    }
}

fn apply_adjustment(stock: &mut StockInfo, adjustment: &StockAdjustment) -> AppResult<()> {
    match *adjustment {
        StockAdjustment::Delta { amount } => {
            let next = i64::from(stock.current) + amount;
            stock.current = u32::try_from(next).map_err(|_| {
                AppError::with_message(
                    ErrorCode::ValueOutOfRange,
                    format!("Stock cannot become {}", next),
                )
                .with_detail("current", stock.current)
                .with_detail("amount", amount)
            })?;
        }
        StockAdjustment::Set { current } => stock.current = current,
        StockAdjustment::Reserve { reserved } => {
            if reserved > stock.current {
                return Err(AppError::with_message(
                    ErrorCode::ValueOutOfRange,
                    "Reserved units exceed current stock",
                )
                .with_detail("current", stock.current)
                .with_detail("reserved", reserved));
            }
            stock.reserved = reserved;
        }
        StockAdjustment::Threshold {
            low_stock_threshold,
        } => stock.low_stock_threshold = low_stock_threshold,
        StockAdjustment::Reset => stock.current = stock.initial,
    }
    Ok(())
}

fn require_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::new(ErrorCode::RequiredField).with_detail("field", "name"));
    }
    Ok(name.to_string())
}

fn validate_price(price: f64) -> AppResult<()> {
    if !money::is_valid_price(price) {
        return Err(AppError::new(ErrorCode::ProductInvalidPrice).with_detail("price", price));
    }
    Ok(())
}

fn validate_topping_ids(doc: &StoreDocument, topping_ids: &[i64]) -> AppResult<()> {
    for &topping_id in topping_ids {
        doc.require_topping(topping_id)?;
    }
    Ok(())
}
