//! 默认菜单 (首次启动和重置时写入)

use super::document::StoreDocument;
use shared::models::{Product, StockInfo, Topping};

struct SeedProduct {
    id: i64,
    name: &'static str,
    price: f64,
    category: &'static str,
    description: &'static str,
    preparation_minutes: u32,
    topping_ids: &'static [i64],
    initial_stock: u32,
}

const MAYONNAISE: i64 = 101;
const AONORI: i64 = 102;
const FRIED_EGG: i64 = 103;
const CHEESE: i64 = 104;
const CONDENSED_MILK: i64 = 105;
const LARGE: i64 = 106;

const TOPPINGS: &[(i64, &str, f64)] = &[
    (MAYONNAISE, "マヨネーズ", 50.0),
    (AONORI, "青のり", 0.0),
    (FRIED_EGG, "目玉焼き", 100.0),
    (CHEESE, "チーズ", 100.0),
    (CONDENSED_MILK, "練乳", 50.0),
    (LARGE, "大盛り", 150.0),
];

const PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        id: 1,
        name: "焼きそば",
        price: 600.0,
        category: "food",
        description: "ソース焼きそば",
        preparation_minutes: 8,
        topping_ids: &[MAYONNAISE, AONORI, FRIED_EGG, LARGE],
        initial_stock: 80,
    },
    SeedProduct {
        id: 2,
        name: "たこ焼き (8個)",
        price: 500.0,
        category: "food",
        description: "外はカリッと中はとろり",
        preparation_minutes: 10,
        topping_ids: &[MAYONNAISE, AONORI, CHEESE],
        initial_stock: 60,
    },
    SeedProduct {
        id: 3,
        name: "唐揚げ",
        price: 450.0,
        category: "food",
        description: "揚げたて5個入り",
        preparation_minutes: 12,
        topping_ids: &[MAYONNAISE, LARGE],
        initial_stock: 50,
    },
    SeedProduct {
        id: 4,
        name: "フランクフルト",
        price: 300.0,
        category: "food",
        description: "",
        preparation_minutes: 5,
        topping_ids: &[CHEESE],
        initial_stock: 40,
    },
    SeedProduct {
        id: 5,
        name: "かき氷",
        price: 300.0,
        category: "dessert",
        description: "いちご・メロン・ブルーハワイ",
        preparation_minutes: 3,
        topping_ids: &[CONDENSED_MILK],
        initial_stock: 100,
    },
    SeedProduct {
        id: 6,
        name: "ラムネ",
        price: 200.0,
        category: "drink",
        description: "",
        preparation_minutes: 1,
        topping_ids: &[],
        initial_stock: 120,
    },
];

const LOW_STOCK_THRESHOLD: u32 = 10;

/// Fresh document with the default festival menu and no orders
pub fn default_document() -> StoreDocument {
    let now = shared::util::now_millis();

    let toppings = TOPPINGS
        .iter()
        .map(|&(id, name, price)| Topping {
            id,
            name: name.to_string(),
            price,
            is_available: true,
        })
        .collect();

    let products = PRODUCTS
        .iter()
        .enumerate()
        .map(|(index, p)| Product {
            id: p.id,
            name: p.name.to_string(),
            price: p.price,
            category: p.category.to_string(),
            description: (!p.description.is_empty()).then(|| p.description.to_string()),
            is_available: true,
            preparation_minutes: Some(p.preparation_minutes),
            topping_ids: p.topping_ids.to_vec(),
            sort_order: index as i32,
        })
        .collect();

    let stock = PRODUCTS
        .iter()
        .map(|p| StockInfo {
            updated_at: now,
            ..StockInfo::new(p.id, p.initial_stock, LOW_STOCK_THRESHOLD)
        })
        .collect();

    StoreDocument {
        version: 0,
        order_seq: 0,
        products,
        toppings,
        stock,
        orders: Vec::new(),
    }
}
