//! 健康检查路由
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /health | GET | 简单健康检查 |
//! | /health/detailed | GET | 详细健康检查 (存储 + 推送订阅) |
//!
//! # 响应示例
//!
//! ```json
//! {
//!   "success": true,
//!   "code": 0,
//!   "message": "Success",
//!   "data": { "status": "ok", "version": "0.1.0" }
//! }
//! ```

use axum::{Json, Router, extract::State, routing::get};
use serde::{Deserialize, Serialize};
use std::time::{Instant, SystemTime};

use crate::core::ServerState;
use crate::utils::{ApiResponse, ok};

/// 健康检查路由
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/detailed", get(detailed_health))
}

/// 简单健康检查响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// 状态 (ok | error)
    pub status: String,
    /// 版本号
    pub version: String,
}

/// 详细健康检查响应
#[derive(Serialize)]
pub struct DetailedHealthResponse {
    status: &'static str,
    version: &'static str,
    environment: String,
    /// 运行时间 (秒)
    uptime_seconds: u64,
    checks: HealthChecks,
}

/// 健康检查详情
#[derive(Serialize)]
pub struct HealthChecks {
    /// 文档存储检查
    storage: CheckResult,
    /// 推送通道检查
    message_bus: CheckResult,
}

/// 单项检查结果
#[derive(Serialize)]
pub struct CheckResult {
    /// 状态 (ok | error)
    status: &'static str,
    /// 延迟 (毫秒)
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl CheckResult {
    fn ok_with_message(message: impl Into<String>) -> Self {
        Self {
            status: "ok",
            latency_ms: None,
            message: Some(message.into()),
        }
    }

    fn ok_with_latency(latency_ms: u64, message: impl Into<String>) -> Self {
        Self {
            status: "ok",
            latency_ms: Some(latency_ms),
            message: Some(message.into()),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            latency_ms: None,
            message: Some(message.into()),
        }
    }
}

// 服务器启动时间 (懒加载静态变量)
static START_TIME: std::sync::OnceLock<SystemTime> = std::sync::OnceLock::new();

/// 记录启动时间，main 启动时调用一次
pub fn mark_started() {
    START_TIME.get_or_init(SystemTime::now);
}

fn get_uptime_seconds() -> u64 {
    let start = START_TIME.get_or_init(SystemTime::now);
    SystemTime::now()
        .duration_since(*start)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// 基础健康检查
pub async fn health() -> Json<ApiResponse<HealthResponse>> {
    ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// 包含组件状态的详细健康检查
pub async fn detailed_health(
    State(state): State<ServerState>,
) -> Json<ApiResponse<DetailedHealthResponse>> {
    let started = Instant::now();
    let storage = match state.storage.version() {
        Ok(version) => CheckResult::ok_with_latency(
            started.elapsed().as_millis() as u64,
            format!("document version {}", version),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Storage health check failed");
            CheckResult::error(e.to_string())
        }
    };

    let message_bus = if state.message_bus.shutdown_token().is_cancelled() {
        CheckResult::error("shutting down")
    } else {
        CheckResult::ok_with_message(format!(
            "{} subscribers",
            state.message_bus.subscriber_count()
        ))
    };

    let status = if storage.status == "ok" && message_bus.status == "ok" {
        "ok"
    } else {
        "error"
    };

    ok(DetailedHealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
        uptime_seconds: get_uptime_seconds(),
        checks: HealthChecks {
            storage,
            message_bus,
        },
    })
}
