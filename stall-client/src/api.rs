//! Typed wrappers over the stall server REST API

use serde::{Deserialize, Serialize};
use shared::models::{Product, StockAdjustment, StockInfo, Topping};
use shared::util::new_request_id;
use shared::order::{
    CancelRequest, Cart, CreateOrderRequest, Order, OrderPatch, OrderQuery, OrderStatus,
    OrderSummary, PaymentMethod, PaymentRequest, ReadyOrder, StatusUpdateRequest,
};

use crate::http::path_segment;
use crate::{ClientError, ClientResult, HttpClient};

/// `GET /health` payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Deserialize)]
struct ResetResponse {
    version: u64,
}

/// Stall API client
///
/// Thin layer over [`HttpClient`]; every call inherits its retry policy.
#[derive(Debug, Clone)]
pub struct StallApi {
    http: HttpClient,
}

impl StallApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub async fn health(&self) -> ClientResult<HealthStatus> {
        self.http.get("/health").await
    }

    // ========== Catalog ==========

    pub async fn products(&self) -> ClientResult<Vec<Product>> {
        self.http.get("/api/products").await
    }

    pub async fn toppings(&self) -> ClientResult<Vec<Topping>> {
        self.http.get("/api/toppings").await
    }

    pub async fn stock(&self) -> ClientResult<Vec<StockInfo>> {
        self.http.get("/api/stock").await
    }

    pub async fn adjust_stock(
        &self,
        product_id: i64,
        adjustment: StockAdjustment,
    ) -> ClientResult<StockInfo> {
        self.http
            .post(&format!("/api/stock/{}/adjust", product_id), &adjustment)
            .await
    }

    // ========== Orders ==========

    pub async fn orders(&self, query: &OrderQuery) -> ClientResult<Vec<Order>> {
        self.http.get(&orders_path(query)?).await
    }

    pub async fn order(&self, id: &str) -> ClientResult<Order> {
        self.http.get(&order_path(id, "")?).await
    }

    pub async fn order_by_number(&self, order_number: &str) -> ClientResult<Order> {
        self.http
            .get(&format!("/api/orders/number/{}", path_segment(order_number)?))
            .await
    }

    /// Place an order; retries are safe because the request carries a `request_id`
    ///
    /// A request without one gets a fresh key here, shared by all attempts.
    pub async fn create_order(&self, request: &CreateOrderRequest) -> ClientResult<Order> {
        if request.request_id.is_some() {
            return self.http.post_idempotent("/api/orders", request).await;
        }
        let keyed = CreateOrderRequest {
            request_id: Some(new_request_id()),
            ..request.clone()
        };
        self.http.post_idempotent("/api/orders", &keyed).await
    }

    /// Submit the cart as a new order
    ///
    /// An empty cart fails locally with [`ClientError::Validation`].
    pub async fn checkout(
        &self,
        cart: &Cart,
        payment_method: Option<PaymentMethod>,
        special_instructions: Option<String>,
    ) -> ClientResult<Order> {
        let request = cart.to_order_request(payment_method, special_instructions)?;
        self.create_order(&request).await
    }

    pub async fn update_order(&self, id: &str, patch: &OrderPatch) -> ClientResult<Order> {
        self.http.patch(&order_path(id, "")?, patch).await
    }

    pub async fn update_order_status(
        &self,
        id: &str,
        status: OrderStatus,
        reason: Option<String>,
    ) -> ClientResult<Order> {
        let body = StatusUpdateRequest { status, reason };
        self.http
            .patch(&order_path(id, "/status")?, &body)
            .await
    }

    pub async fn cancel_order(&self, id: &str, reason: impl Into<String>) -> ClientResult<Order> {
        let body = CancelRequest {
            reason: reason.into(),
        };
        self.http
            .post(&order_path(id, "/cancel")?, &body)
            .await
    }

    pub async fn record_payment(
        &self,
        id: &str,
        payment_method: PaymentMethod,
        amount: f64,
    ) -> ClientResult<()> {
        let body = PaymentRequest {
            payment_method,
            amount,
        };
        self.http
            .post_no_content(&order_path(id, "/payment")?, &body)
            .await
    }

    pub async fn ready_board(&self) -> ClientResult<Vec<ReadyOrder>> {
        self.http.get("/api/orders/ready").await
    }

    /// Remove terminal orders, returns how many were purged
    pub async fn purge_history(&self, before: Option<i64>) -> ClientResult<usize> {
        let path = match before {
            Some(before) => format!("/api/orders/history?before={}", before),
            None => "/api/orders/history".to_string(),
        };
        self.http.delete(&path).await
    }

    // ========== Dashboard / System ==========

    pub async fn summary(&self) -> ClientResult<OrderSummary> {
        self.http.get("/api/dashboard/summary").await
    }

    /// Reset the store to the default menu, returns the new version
    pub async fn reset_data(&self) -> ClientResult<u64> {
        let response: ResetResponse = self.http.post_empty("/api/system/reset").await?;
        Ok(response.version)
    }
}

/// `/api/orders/{id}{suffix}` with the id percent-encoded
fn order_path(id: &str, suffix: &str) -> ClientResult<String> {
    Ok(format!("/api/orders/{}{}", path_segment(id)?, suffix))
}

fn orders_path(query: &OrderQuery) -> ClientResult<String> {
    let mut params = Vec::new();
    if let Some(status) = query.status {
        params.push(format!("status={}", status.as_str()));
    }
    if let Some(payment_status) = query.payment_status {
        let value = serde_json::to_value(payment_status)?;
        let value = value
            .as_str()
            .ok_or_else(|| ClientError::InvalidResponse("payment_status".into()))?
            .to_string();
        params.push(format!("payment_status={}", value));
    }
    if params.is_empty() {
        Ok("/api/orders".to_string())
    } else {
        Ok(format!("/api/orders?{}", params.join("&")))
    }
}
