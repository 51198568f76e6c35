use axum::Router;

use crate::core::{Config, Result};
use crate::message::MessageBus;
use crate::orders::{OrderSettings, OrdersManager};
use crate::services::CatalogService;
use crate::store::{DocumentStorage, StoreDocument, seed};
use shared::error::{AppError, AppResult};
use shared::message::{ChangeAction, ChangeNotice, Resource};

/// 服务器状态 - 持有所有服务的共享引用
///
/// 所有字段内部都是 `Arc`，clone 只复制引用。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | storage | DocumentStorage | redb 文档存储 |
/// | message_bus | MessageBus | 变更通知广播 |
/// | orders | OrdersManager | 订单读写 |
/// | catalog | CatalogService | 菜单、配料、库存 |
///
/// # 使用示例
///
/// ```ignore
/// let state = ServerState::initialize(&config)?;
/// let orders = state.orders.get_orders(&OrderQuery::default())?;
/// let mut rx = state.message_bus.subscribe();
/// ```
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 文档存储 (redb)
    pub storage: DocumentStorage,
    /// 消息总线
    pub message_bus: MessageBus,
    pub orders: OrdersManager,
    pub catalog: CatalogService,
}

impl ServerState {
    /// 用已打开的存储组装服务
    pub fn new(config: Config, storage: DocumentStorage) -> Self {
        let message_bus = MessageBus::with_capacity(config.event_channel_capacity);
        let orders = OrdersManager::new(
            storage.clone(),
            message_bus.clone(),
            OrderSettings::from(&config),
        );
        let catalog = CatalogService::new(storage.clone(), message_bus.clone());
        Self {
            config,
            storage,
            message_bus,
            orders,
            catalog,
        }
    }

    /// 初始化服务器状态
    ///
    /// 打开 (或创建) `work_dir/data/stall.redb`，首次启动时写入默认菜单。
    pub fn initialize(config: &Config) -> Result<Self> {
        let db_path = config.database_path();
        let storage = DocumentStorage::open(&db_path)?;
        tracing::info!(path = %db_path.display(), "Document storage opened");
        Ok(Self::new(config.clone(), storage))
    }

    /// 内存存储的状态 (测试、单次运行工具)
    pub fn in_memory(config: Config) -> Result<Self> {
        let storage = DocumentStorage::open_in_memory()?;
        Ok(Self::new(config, storage))
    }

    /// 绑定状态后的完整路由
    pub fn router(&self) -> Router {
        crate::services::build_router(self.clone())
    }

    /// 恢复默认菜单并清空所有订单，返回新的版本号
    pub fn reset_data(&self) -> AppResult<u64> {
        let (_, version) = self.storage.update(|doc: &mut StoreDocument| {
            *doc = seed::default_document();
            Ok::<_, AppError>(())
        })?;

        tracing::warn!(version, "Store data reset to defaults");
        self.message_bus.publish(ChangeNotice::new(
            Resource::Store,
            ChangeAction::Reset,
            None,
            version,
        ));
        Ok(version)
    }
}
