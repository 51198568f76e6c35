//! 服务层 - 服务器核心服务
//!
//! # 服务列表
//!
//! - [`CatalogService`] - 菜单、配料、库存管理
//! - [`app`] - 路由组装与 HTTP 中间件

pub mod catalog_service;
pub mod app;

pub use catalog_service::CatalogService;
pub use app::{build_app, build_router};
