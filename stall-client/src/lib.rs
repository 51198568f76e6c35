//! Stall Client - HTTP client for the stall server
//!
//! Typed API calls with per-attempt timeout and exponential backoff,
//! plus a background order poller for pickup displays.

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod poller;
pub mod retry;

pub use api::{HealthStatus, StallApi};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::{HttpClient, path_segment};
pub use poller::{OrderPoller, OrderSource, PollSnapshot};
pub use retry::{RetryMode, RetryPolicy, fetch_with_retry, fetch_with_retry_mode};

// Re-export shared types for convenience
pub use shared::ApiResponse;
pub use shared::order::{Cart, CartAction, CartItem};
