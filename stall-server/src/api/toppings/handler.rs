//! Topping API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::utils::validation::{MAX_NAME_LEN, validate_optional_text, validate_required_text};
use crate::utils::{ApiResponse, AppResult, ok};
use shared::models::{Topping, ToppingCreate, ToppingUpdate};

/// GET /api/toppings
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<Vec<Topping>>>> {
    Ok(ok(state.catalog.get_toppings()?))
}

/// POST /api/toppings
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ToppingCreate>,
) -> AppResult<Json<ApiResponse<Topping>>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    Ok(ok(state.catalog.create_topping(payload)?))
}

/// PUT /api/toppings/:id
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ToppingUpdate>,
) -> AppResult<Json<ApiResponse<Topping>>> {
    validate_optional_text(&payload.name, "name", MAX_NAME_LEN)?;
    Ok(ok(state.catalog.update_topping(id, payload)?))
}
