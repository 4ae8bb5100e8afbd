//! Shared fixtures for Linen Loft integration tests.
//!
//! The tests under `tests/` run the storefront search engine and the admin
//! order lifecycle end-to-end over their in-memory stores, so they need no
//! database.
//!
//! ```bash
//! cargo test -p linen-loft-integration-tests
//! ```

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;

use linen_loft_admin::models::Order;
use linen_loft_admin::orders::{InMemoryOrderStore, OrderLifecycle, PaymentProvider};
use linen_loft_core::{OrderId, OrderStatus, PaymentStatus, ProductId};
use linen_loft_storefront::catalog::{CatalogItem, InMemoryCatalog};
use linen_loft_storefront::search::{DEFAULT_MAX_LIMIT, ScoringPolicy, SearchEngine};

// =============================================================================
// Catalog
// =============================================================================

/// An in-stock product with no flags, tags or descriptions.
#[must_use]
pub fn product(id: i32, name: &str) -> CatalogItem {
    CatalogItem {
        id: ProductId::new(id),
        name: name.to_string(),
        slug: name.to_lowercase().replace(' ', "-"),
        category: "Bedding".to_string(),
        short_description: String::new(),
        description: String::new(),
        tags: Vec::new(),
        price: Decimal::new(7900, 2),
        original_price: None,
        bestseller: false,
        featured: false,
        is_new: false,
        on_sale: false,
        in_stock: true,
        rating: None,
    }
}

/// Search engine over `items` with the default scoring policy.
#[must_use]
pub fn search_engine(items: impl IntoIterator<Item = CatalogItem>) -> SearchEngine<InMemoryCatalog> {
    SearchEngine::new(
        InMemoryCatalog::new().with_items(items),
        Arc::new(ScoringPolicy::default()),
        DEFAULT_MAX_LIMIT,
    )
}

// =============================================================================
// Orders
// =============================================================================

/// Fixed reference time for order fixtures.
#[must_use]
pub fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0)
        .single()
        .unwrap_or_default()
}

/// An order numbered `LL-{2000 + id}`, created `id` minutes after
/// [`reference_time`].
#[must_use]
pub fn order(id: i32, status: OrderStatus, payment_status: PaymentStatus) -> Order {
    let created = reference_time() + Duration::minutes(i64::from(id));
    Order {
        id: OrderId::new(id),
        order_number: format!("LL-{}", 2000 + id),
        status,
        payment_status,
        tracking_number: None,
        notes: None,
        estimated_delivery: None,
        total: Decimal::new(18_500, 2),
        created_at: created,
        updated_at: created,
        items: Vec::new(),
    }
}

/// Order lifecycle over an in-memory store seeded with `orders`.
#[must_use]
pub fn order_lifecycle<P: PaymentProvider>(
    orders: impl IntoIterator<Item = Order>,
    payments: P,
) -> OrderLifecycle<InMemoryOrderStore, P> {
    OrderLifecycle::new(InMemoryOrderStore::new(orders), payments)
}
