//! # Order Endpoints
//!
//! Order submission and post-hoc lifecycle changes, plus the tender-type
//! enumeration.
//!
//! ## Idempotent Submission
//! `create` sends the checkout's `client_request_id` both in the body and
//! as the `Idempotency-Key` header. A retried request - manual retry after
//! a timeout, or the outbox flusher racing a manual retry - is deduped by
//! the server and answered with the original order id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vendra_core::{OrderItem, OrderRequest, PaymentEntry, PaymentMethod};

use crate::error::ClientResult;
use crate::http::HttpClient;

// =============================================================================
// Response Types
// =============================================================================

/// The backend's answer to an accepted order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAck {
    /// Assigned order id - the key for the receipt view.
    pub order_id: String,

    /// Human-readable receipt number, if the backend issues one.
    #[serde(default)]
    pub receipt_number: Option<String>,
}

/// A stored order as returned by `GET /orders/:id`.
///
/// Mirrors the submitted payload so the receipt view can verify the
/// round-trip: same items, quantities, and totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    pub order_id: String,
    #[serde(default)]
    pub receipt_number: Option<String>,
    pub items: Vec<OrderItem>,
    pub customer_id: Option<String>,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub payments: Vec<PaymentEntry>,
    pub ewallet_cents: i64,
    pub loyalty_points_used: i64,
    pub created_at: DateTime<Utc>,
}

/// Body for `POST /orders/refund`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundRequest {
    pub order_id: String,
    /// Refund amount; None refunds the full order.
    pub amount_cents: Option<i64>,
    pub reason: String,
}

// =============================================================================
// Orders API
// =============================================================================

/// Order and payment-method endpoints.
#[derive(Debug, Clone)]
pub struct OrdersApi {
    http: HttpClient,
}

impl OrdersApi {
    pub(crate) fn new(http: HttpClient) -> Self {
        OrdersApi { http }
    }

    /// Enumerates the tender types the store accepts.
    pub async fn payment_methods(&self) -> ClientResult<Vec<PaymentMethod>> {
        self.http.get("/payment-methods").await
    }

    /// Submits a completed sale.
    pub async fn create(&self, request: &OrderRequest) -> ClientResult<OrderAck> {
        let key = request.client_request_id.to_string();
        self.http.post_idempotent("/orders", request, &key).await
    }

    /// Fetches a stored order for the receipt view.
    pub async fn by_id(&self, order_id: &str) -> ClientResult<OrderReceipt> {
        self.http.get(&format!("/orders/{}", order_id)).await
    }

    /// Cancels an order.
    pub async fn cancel(&self, order_id: &str) -> ClientResult<OrderReceipt> {
        self.http
            .post_empty(&format!("/orders/{}/cancel", order_id))
            .await
    }

    /// Deletes an order outright.
    pub async fn delete(&self, order_id: &str) -> ClientResult<()> {
        self.http.delete(&format!("/orders/{}", order_id)).await
    }

    /// Refunds an order, fully or partially.
    pub async fn refund(&self, request: &RefundRequest) -> ClientResult<OrderReceipt> {
        self.http.post("/orders/refund", request).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
