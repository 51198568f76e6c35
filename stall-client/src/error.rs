//! Client error types

use std::time::Duration;

use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// Attempt did not finish within the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection-level failure (DNS, refused, reset)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Server answered with an error status or `success: false`
    #[error("HTTP {status}: {message}")]
    Http {
        status: u16,
        /// `ErrorCode` from the envelope, when the body had one
        code: Option<u16>,
        message: String,
    },

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rejected locally before any request was sent
    #[error("Validation error: {0}")]
    Validation(String),

    /// Cancelled by the caller
    #[error("Request aborted")]
    Aborted,

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Whether another attempt may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Timeout(_) => true,
            ClientError::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            ClientError::Http { status, .. } => {
                *status >= 500 || *status == 408 || *status == 429
            }
            _ => false,
        }
    }

    /// The request never reached the server (connect failed)
    pub fn is_unsent(&self) -> bool {
        matches!(self, ClientError::Network(e) if e.is_connect())
    }

    /// HTTP status, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Server error code from the envelope
    pub fn code(&self) -> Option<u16> {
        match self {
            ClientError::Http { code, .. } => *code,
            _ => None,
        }
    }

    /// Message shown to stall staff and customers
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Http { status, .. } => match status {
                503 => "システムメンテナンス中です。しばらくしてから再度お試しください。".into(),
                500 => "サーバーエラーが発生しました。しばらくしてから再度お試しください。".into(),
                404 => "データが見つかりません。".into(),
                400 => "入力内容に誤りがあります。".into(),
                409 => "他の操作と競合しました。画面を更新してください。".into(),
                401 | 403 => "この操作を行う権限がありません。".into(),
                other => format!("エラーが発生しました (HTTP {})。", other),
            },
            ClientError::Timeout(_) => {
                "通信がタイムアウトしました。ネットワーク環境をご確認ください。".into()
            }
            ClientError::Network(_) => {
                "サーバーに接続できません。ネットワーク接続をご確認ください。".into()
            }
            ClientError::InvalidResponse(_) | ClientError::Serialization(_) => {
                "サーバーからの応答を読み取れませんでした。".into()
            }
            ClientError::Validation(message) => message.clone(),
            ClientError::Aborted => "リクエストがキャンセルされました。".into(),
        }
    }
}

impl From<shared::AppError> for ClientError {
    fn from(err: shared::AppError) -> Self {
        ClientError::Validation(err.message)
    }
}
