use std::path::PathBuf;

use shared::order::FreshnessThresholds;

/// 服务器配置 - 摊位服务的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖（也可写在 `.env` 中）：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./stall-data | 工作目录 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | (未设置) | 日志文件目录，未设置时只输出到终端 |
/// | ORDER_NUMBER_PREFIX | A | 取餐号前缀 |
/// | DEFAULT_PREP_MINUTES | 10 | 商品未设置制作时间时的默认值 |
/// | READY_WARM_AFTER_SECS | 300 | 出餐后多久变为 "warm" |
/// | READY_URGENT_AFTER_SECS | 600 | 出餐后多久变为 "urgent" |
/// | EVENT_CHANNEL_CAPACITY | 1024 | 变更通知广播通道容量 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/stall HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库和日志
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    /// 取餐号前缀 (A001, A002 ...)
    pub order_number_prefix: String,
    /// 默认制作时间 (分钟)
    pub default_prep_minutes: u32,
    /// 取餐架保温提示阈值
    pub freshness: FreshnessThresholds,
    /// 广播通道容量
    pub event_channel_capacity: usize,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置或无法解析，使用默认值
    pub fn from_env() -> Self {
        let defaults = FreshnessThresholds::default();
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./stall-data".into()),
            http_port: env_parse("HTTP_PORT", 3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.trim().is_empty()),
            order_number_prefix: std::env::var("ORDER_NUMBER_PREFIX")
                .ok()
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| "A".into()),
            default_prep_minutes: env_parse("DEFAULT_PREP_MINUTES", 10),
            freshness: FreshnessThresholds {
                warm_after_secs: env_parse("READY_WARM_AFTER_SECS", defaults.warm_after_secs),
                urgent_after_secs: env_parse(
                    "READY_URGENT_AFTER_SECS",
                    defaults.urgent_after_secs,
                ),
            },
            event_channel_capacity: env_parse("EVENT_CHANNEL_CAPACITY", 1024),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 数据目录 (work_dir/data)
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("data")
    }

    /// 数据库文件路径
    pub fn database_path(&self) -> PathBuf {
        self.data_dir().join("stall.redb")
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
