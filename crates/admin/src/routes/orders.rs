//! Order management route handlers.

use std::fmt::Display;
use std::str::FromStr;

use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    routing::get,
};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, instrument};

use linen_loft_core::{OrderStatus, PaymentStatus};

use crate::error::{AppError, Result};
use crate::middleware::{RequireAdminAuth, RequireOrderManager};
use crate::models::Order;
use crate::orders::{
    BulkActionRequest, OrderAnalytics, OrderFilter, OrderListing, Page, RefundResult,
    StatusUpdate,
};
use crate::state::AppState;

/// Deserialize empty strings as None, parsing everything else with `FromStr`.
fn empty_string_as_none<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Order list query parameters.
///
/// Dates are `YYYY-MM-DD`; `to` includes the whole day.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOrdersQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub status: Option<OrderStatus>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub to: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub per_page: Option<u32>,
}

impl ListOrdersQuery {
    /// Compile the query parameters into an order filter.
    #[must_use]
    pub fn filter(&self) -> OrderFilter {
        let mut clauses = Vec::new();

        if let Some(status) = self.status {
            clauses.push(OrderFilter::Status(status));
        }
        if let Some(payment_status) = self.payment_status {
            clauses.push(OrderFilter::PaymentStatus(payment_status));
        }
        if let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            clauses.push(OrderFilter::Search(term.to_string()));
        }
        if let Some(from) = self.from {
            clauses.push(OrderFilter::CreatedFrom(from.and_time(NaiveTime::MIN).and_utc()));
        }
        if let Some(next_day) = self.to.and_then(|to| to.succ_opt()) {
            clauses.push(OrderFilter::CreatedBefore(
                next_day.and_time(NaiveTime::MIN).and_utc(),
            ));
        }

        OrderFilter::All(clauses)
    }
}

/// Pagination metadata.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub total_pages: u64,
}

/// Response for `GET /api/admin/orders`.
#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    pub orders: Vec<Order>,
    pub pagination: Pagination,
    pub analytics: OrderAnalytics,
}

impl From<OrderListing> for OrderListResponse {
    fn from(listing: OrderListing) -> Self {
        Self {
            pagination: Pagination {
                page: listing.page.page,
                per_page: listing.page.per_page,
                total: listing.total,
                total_pages: listing.page.total_pages(listing.total),
            },
            orders: listing.orders,
            analytics: listing.analytics,
        }
    }
}

/// Response for `PATCH /api/admin/orders`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkActionResponse {
    pub count: u64,
    /// Same value as `count`, kept for older dashboard clients.
    pub updated_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<RefundResult>>,
}

/// List orders with pagination and analytics.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn list_orders(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    query: std::result::Result<Query<ListOrdersQuery>, QueryRejection>,
) -> Result<Json<OrderListResponse>> {
    let Query(query) = query.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    let page = Page::new(
        query.page,
        query.per_page,
        state.config().orders_per_page_max,
    );
    let listing = state.orders().list(&query.filter(), page).await?;

    Ok(Json(listing.into()))
}

/// Change one order's status, tracking number or notes.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn update_order(
    RequireOrderManager(admin): RequireOrderManager,
    State(state): State<AppState>,
    body: std::result::Result<Json<StatusUpdate>, JsonRejection>,
) -> Result<Json<Order>> {
    let Json(command) = body.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    let order = state.orders().update_status(command).await?;
    info!(order_number = %order.order_number, admin = %admin.name, "Order updated by admin");

    Ok(Json(order))
}

/// Apply a bulk action to a selection of orders.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn bulk_update_orders(
    RequireOrderManager(admin): RequireOrderManager,
    State(state): State<AppState>,
    body: std::result::Result<Json<BulkActionRequest>, JsonRejection>,
) -> Result<Json<BulkActionResponse>> {
    let Json(request) = body.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    let outcome = state.orders().bulk_action(request).await?;
    info!(count = outcome.count, admin = %admin.name, "Bulk action by admin");

    Ok(Json(BulkActionResponse {
        count: outcome.count,
        updated_count: outcome.count,
        results: outcome.results,
    }))
}

/// Create the order routes router.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api/admin/orders",
        get(list_orders)
            .put(update_order)
            .patch(bulk_update_orders),
    )
}
