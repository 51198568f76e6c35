//! Shared types for the festival stall workspace
//!
//! Domain models, the cart reducer, the order lifecycle, error codes and
//! the API envelope used by both `stall-server` and `stall-client`.

pub mod error;
pub mod message;
pub mod models;
pub mod order;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use message::{ChangeAction, ChangeNotice, Resource};
