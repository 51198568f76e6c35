//! Stall Server - 祭り屋台注文システムのバックエンド
//!
//! # 架构概述
//!
//! 本模块是摊位服务的主入口，提供以下核心功能：
//!
//! - **文档存储** (`store`): redb 单文档存储，版本号 + 乐观并发
//! - **订单** (`orders`): 下单、状态流转、收款、取餐号
//! - **菜单** (`services/catalog_service`): 商品、配料、库存
//! - **消息总线** (`message`): 写入提交后广播变更通知
//! - **HTTP API** (`api`): RESTful API + SSE 推送
//!
//! # 模块结构
//!
//! ```text
//! stall-server/src/
//! ├── core/          # 配置、状态、错误、服务器
//! ├── store/         # redb 文档存储
//! ├── orders/        # 订单业务
//! ├── services/      # 菜单服务、路由组装
//! ├── message/       # 消息总线
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 日志、校验、响应包装
//! ```

pub mod api;
pub mod core;
pub mod message;
pub mod orders;
pub mod services;
pub mod store;
pub mod utils;

// Re-export 公共类型
pub use crate::core::{Config, Server, ServerState};
pub use message::{ChangeNotice, MessageBus};
pub use orders::OrdersManager;
pub use services::CatalogService;
pub use store::DocumentStorage;
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::init_logger_with_file;

/// 准备运行环境：加载 `.env`、创建工作目录、初始化日志
pub fn setup_environment() -> anyhow::Result<Config> {
    // .env 不存在不是错误
    let _ = dotenv::dotenv();

    let config = Config::from_env();
    std::fs::create_dir_all(&config.work_dir)?;
    std::fs::create_dir_all(config.data_dir())?;

    init_logger_with_file(
        Some(&config.log_level),
        Some(config.is_production()),
        config.log_dir.as_deref(),
    );
    api::health::mark_started();

    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
       _        _ _
   ___| |_ __ _| | |
  / __| __/ _` | | |
  \__ \ || (_| | | |
  |___/\__\__,_|_|_|
   お祭り屋台 注文サーバー
    "#
    );
}
