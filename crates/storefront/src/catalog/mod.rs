//! Catalog store: the read-only product and category source for search.
//!
//! The search engine never talks to a database directly. It describes what
//! it wants as a typed [`CatalogFilter`] / [`CategoryFilter`] and a
//! [`CatalogStore`] adapter compiles that into its native query form:
//!
//! - [`PgCatalogStore`] compiles filters to SQL with `sqlx::QueryBuilder`
//! - [`InMemoryCatalog`] evaluates filters directly against a snapshot

mod filter;
mod memory;
mod postgres;

use std::future::Future;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use linen_loft_core::{CategoryId, ProductId};

use crate::db::RepositoryError;

pub use filter::{CatalogFilter, CatalogQuery, CategoryFilter, CategoryQuery};
pub use memory::InMemoryCatalog;
pub use postgres::PgCatalogStore;

/// A product as seen by search.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    /// Name of the category the product belongs to.
    pub category: String,
    pub short_description: String,
    pub description: String,
    pub tags: Vec<String>,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub bestseller: bool,
    pub featured: bool,
    pub is_new: bool,
    pub on_sale: bool,
    pub in_stock: bool,
    /// Average review rating, 0 to 5.
    pub rating: Option<f64>,
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub active: bool,
}

/// Read access to the catalog.
///
/// Implementations must return items in a stable order (the retrieval order),
/// which ranking preserves for equally scored items.
pub trait CatalogStore: Send + Sync {
    /// Find products matching `query.filter`, at most `query.limit` of them.
    fn find_items(
        &self,
        query: &CatalogQuery,
    ) -> impl Future<Output = Result<Vec<CatalogItem>, RepositoryError>> + Send;

    /// Find categories matching `query.filter`, at most `query.limit` of them.
    fn find_categories(
        &self,
        query: &CategoryQuery,
    ) -> impl Future<Output = Result<Vec<Category>, RepositoryError>> + Send;
}
