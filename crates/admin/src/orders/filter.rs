//! Typed order filters and pagination.

use chrono::{DateTime, Utc};

use linen_loft_core::{OrderStatus, PaymentStatus};

use crate::models::Order;

/// Predicate over orders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderFilter {
    Status(OrderStatus),
    PaymentStatus(PaymentStatus),
    /// Case-insensitive substring of order number, notes or tracking number.
    Search(String),
    /// Created at or after.
    CreatedFrom(DateTime<Utc>),
    /// Created strictly before.
    CreatedBefore(DateTime<Utc>),
    /// Every clause matches. An empty list matches everything.
    All(Vec<OrderFilter>),
}

impl OrderFilter {
    /// A filter that matches every order.
    #[must_use]
    pub const fn everything() -> Self {
        Self::All(Vec::new())
    }

    /// Evaluate the filter against an order.
    #[must_use]
    pub fn matches(&self, order: &Order) -> bool {
        match self {
            Self::Status(status) => order.status == *status,
            Self::PaymentStatus(status) => order.payment_status == *status,
            Self::Search(term) => {
                let term = term.to_lowercase();
                let hit = |field: &str| field.to_lowercase().contains(&term);
                hit(&order.order_number)
                    || order.notes.as_deref().is_some_and(hit)
                    || order.tracking_number.as_deref().is_some_and(hit)
            }
            Self::CreatedFrom(from) => order.created_at >= *from,
            Self::CreatedBefore(before) => order.created_at < *before,
            Self::All(clauses) => clauses.iter().all(|clause| clause.matches(order)),
        }
    }
}

/// Default page size for order listings.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub per_page: u32,
}

impl Page {
    /// Build a page request, clamping `page` to at least 1 and `per_page`
    /// to `1..=max_per_page`.
    #[must_use]
    pub fn new(page: Option<u32>, per_page: Option<u32>, max_per_page: u32) -> Self {
        let max_per_page = max_per_page.max(1);
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page
                .unwrap_or(DEFAULT_PER_PAGE)
                .clamp(1, max_per_page),
        }
    }

    /// Rows to skip.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }

    /// Number of pages needed for `total` rows.
    #[must_use]
    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.per_page))
    }
}
