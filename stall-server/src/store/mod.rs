//! 持久化层 - 单文档存储
//!
//! 整个摊位状态（商品、配料、库存、订单）存为一个 JSON 文档，
//! 存放在 redb 的固定键下。

pub mod document;
pub mod error;
pub mod seed;
pub mod storage;

pub use document::StoreDocument;
pub use error::{StorageError, StorageResult};
pub use storage::{DOCUMENT_KEY, DocumentStorage};
