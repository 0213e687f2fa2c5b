//! # Order Payload
//!
//! The outbound order-creation payload and its builder.
//!
//! ## Snapshot Pattern
//! Order items freeze what the cart lines held (name, unit price, discount,
//! tax rates) so the stored order reproduces the sale exactly even if the
//! catalog changes afterwards.
//!
//! ## Idempotency
//! Every request carries a client-generated `client_request_id` (UUID v4).
//! The same id is reused verbatim across retries of the same checkout and
//! is also sent as the `Idempotency-Key` header, so a retried request after
//! a timeout can never create a duplicate order.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::cart::{Cart, CartLine};
use crate::checkout::{CheckoutTotals, Tender};
use crate::types::{DiscountRate, PaymentEntry, TaxRate};

// =============================================================================
// Order Item
// =============================================================================

/// One frozen line of a submitted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderItem {
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name: String,
    pub quantity: i64,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// Line-level discount.
    pub discount: DiscountRate,
    /// Tax rates at time of sale (frozen).
    pub tax_rates: Vec<TaxRate>,
}

impl From<&CartLine> for OrderItem {
    fn from(line: &CartLine) -> Self {
        OrderItem {
            product_id: line.product_id.clone(),
            name: line.name.clone(),
            quantity: line.quantity,
            unit_price_cents: line.unit_price_cents,
            discount: line.discount,
            tax_rates: line.tax_rates.clone(),
        }
    }
}

// =============================================================================
// Order Request
// =============================================================================

/// The complete body for `POST /orders`.
///
/// Totals are carried so the receipt can be rendered without refetching,
/// but the server recomputes and re-validates everything - including the
/// loyalty and eWallet caps - before accepting the order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderRequest {
    /// Idempotency key, generated once per checkout and kept across retries.
    #[ts(as = "String")]
    pub client_request_id: Uuid,

    /// Frozen order lines.
    pub items: Vec<OrderItem>,

    /// Attached customer, or None for a guest sale.
    pub customer_id: Option<String>,

    /// Cart-level discount.
    pub discount: DiscountRate,

    /// Subtotal after line discounts, before the cart discount.
    pub subtotal_cents: i64,

    /// Tax total after the cart discount.
    pub tax_cents: i64,

    /// Grand total.
    pub total_cents: i64,

    /// Tendered payments.
    pub payments: Vec<PaymentEntry>,

    /// eWallet amount applied.
    pub ewallet_cents: i64,

    /// Loyalty points redeemed.
    pub loyalty_points_used: i64,

    /// Store this lane belongs to.
    pub store_id: String,

    /// Branch within the store.
    pub branch_id: String,

    /// Whether this order originated from an online channel.
    pub is_online: bool,
}

impl OrderRequest {
    /// Builds the payload from a settled checkout.
    ///
    /// `request_id` comes from the session so that a retried submission
    /// reuses the key; this builder never generates one.
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        request_id: Uuid,
        cart: &Cart,
        totals: &CheckoutTotals,
        tender: &Tender,
        customer_id: Option<String>,
        store_id: &str,
        branch_id: &str,
    ) -> Self {
        OrderRequest {
            client_request_id: request_id,
            items: cart.lines.iter().map(OrderItem::from).collect(),
            customer_id,
            discount: totals.discount,
            subtotal_cents: totals.subtotal_cents,
            tax_cents: totals.tax_cents,
            total_cents: totals.total_cents,
            payments: tender.payments.clone(),
            ewallet_cents: tender.ewallet_cents,
            loyalty_points_used: tender.loyalty_points,
            store_id: store_id.to_string(),
            branch_id: branch_id.to_string(),
            is_online: false,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::compute_totals;
    use crate::types::Product;

    fn product(id: &str, price_cents: i64, tax_bps: &[u32]) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            barcode: None,
            price_cents,
            original_price_cents: None,
            stock: 100,
            is_weighted: false,
            tax_rates: tax_bps.iter().map(|b| TaxRate::from_bps(*b)).collect(),
            is_active: true,
        }
    }

    fn settled_request() -> OrderRequest {
        let mut cart = Cart::new();
        cart.add_product(&product("p-1", 1000, &[500]), 2).unwrap();
        cart.set_line_discount("p-1", DiscountRate::from_percent(10.0))
            .unwrap();

        let mut tender = Tender::new();
        tender
            .add_payment(PaymentEntry {
                method_id: "pm-cash".to_string(),
                method_name: "Cash".to_string(),
                amount_cents: 1890,
            })
            .unwrap();

        let totals =
            compute_totals(&cart, DiscountRate::zero(), &tender, None).unwrap();

        OrderRequest::build(
            Uuid::new_v4(),
            &cart,
            &totals,
            &tender,
            None,
            "store-001",
            "branch-01",
        )
    }

    #[test]
    fn test_build_snapshots_cart() {
        let request = settled_request();

        assert_eq!(request.items.len(), 1);
        assert_eq!(request.items[0].product_id, "p-1");
        assert_eq!(request.items[0].quantity, 2);
        assert_eq!(request.items[0].unit_price_cents, 1000);
        assert_eq!(request.subtotal_cents, 1800);
        assert_eq!(request.tax_cents, 90);
        assert_eq!(request.total_cents, 1890);
        assert_eq!(request.payments.len(), 1);
        assert!(!request.is_online);
    }

    /// Round trip: serializing and re-reading the payload
    /// reproduces items, quantities, and totals exactly.
    #[test]
    fn test_payload_round_trip() {
        let request = settled_request();

        let json = serde_json::to_string(&request).unwrap();
        let back: OrderRequest = serde_json::from_str(&json).unwrap();

        assert_eq!(back, request);
    }

    /// The wire format is camelCase with the idempotency key present.
    #[test]
    fn test_wire_field_names() {
        let request = settled_request();
        let value = serde_json::to_value(&request).unwrap();

        assert!(value.get("clientRequestId").is_some());
        assert!(value.get("totalCents").is_some());
        assert!(value.get("loyaltyPointsUsed").is_some());
        assert!(value.get("client_request_id").is_none());
    }
}
