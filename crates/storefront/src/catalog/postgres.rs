//! `PostgreSQL` catalog store.
//!
//! Filters are compiled into a `WHERE` clause with `sqlx::QueryBuilder`; every
//! user-supplied term is bound, never interpolated.

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use linen_loft_core::{CategoryId, ProductId};

use super::{
    CatalogFilter, CatalogItem, CatalogQuery, CatalogStore, Category, CategoryFilter,
    CategoryQuery,
};
use crate::db::{RepositoryError, like_pattern};

const PRODUCT_SELECT: &str = r"
    SELECT
        p.id, p.name, p.slug, c.name AS category,
        p.short_description, p.description, p.tags,
        p.price, p.original_price,
        p.bestseller, p.featured, p.is_new, p.on_sale, p.in_stock,
        p.rating
    FROM catalog.products p
    JOIN catalog.categories c ON c.id = p.category_id
    WHERE ";

const CATEGORY_SELECT: &str = r"
    SELECT c.id, c.name, c.slug, c.active
    FROM catalog.categories c
    WHERE ";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    slug: String,
    category: String,
    short_description: String,
    description: String,
    tags: Vec<String>,
    price: Decimal,
    original_price: Option<Decimal>,
    bestseller: bool,
    featured: bool,
    is_new: bool,
    on_sale: bool,
    in_stock: bool,
    rating: Option<f64>,
}

impl From<ProductRow> for CatalogItem {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            slug: row.slug,
            category: row.category,
            short_description: row.short_description,
            description: row.description,
            tags: row.tags,
            price: row.price,
            original_price: row.original_price,
            bestseller: row.bestseller,
            featured: row.featured,
            is_new: row.is_new,
            on_sale: row.on_sale,
            in_stock: row.in_stock,
            rating: row.rating,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: i32,
    name: String,
    slug: String,
    active: bool,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(row.id),
            name: row.name,
            slug: row.slug,
            active: row.active,
        }
    }
}

// =============================================================================
// Store
// =============================================================================

/// Catalog store backed by the storefront database.
#[derive(Debug, Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    /// Create a new catalog store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl CatalogStore for PgCatalogStore {
    #[instrument(skip_all, fields(limit = query.limit))]
    async fn find_items(&self, query: &CatalogQuery) -> Result<Vec<CatalogItem>, RepositoryError> {
        let mut builder = build_product_query(query);
        let rows = builder
            .build_query_as::<ProductRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip_all, fields(limit = query.limit))]
    async fn find_categories(
        &self,
        query: &CategoryQuery,
    ) -> Result<Vec<Category>, RepositoryError> {
        let mut builder = build_category_query(query);
        let rows = builder
            .build_query_as::<CategoryRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

fn build_product_query(query: &CatalogQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(PRODUCT_SELECT);
    push_catalog_filter(&mut builder, &query.filter);
    builder.push(" ORDER BY p.id LIMIT ");
    builder.push_bind(sql_limit(query.limit));
    builder
}

fn build_category_query(query: &CategoryQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(CATEGORY_SELECT);
    push_category_filter(&mut builder, &query.filter);
    builder.push(" ORDER BY c.name, c.id LIMIT ");
    builder.push_bind(sql_limit(query.limit));
    builder
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

fn push_catalog_filter(builder: &mut QueryBuilder<'static, Postgres>, filter: &CatalogFilter) {
    match filter {
        CatalogFilter::NameEquals(term) => {
            builder.push("LOWER(p.name) = LOWER(");
            builder.push_bind(term.clone());
            builder.push(")");
        }
        CatalogFilter::NameContains(term) => push_ilike(builder, "p.name", term),
        CatalogFilter::ShortDescriptionContains(term) => {
            push_ilike(builder, "p.short_description", term);
        }
        CatalogFilter::DescriptionContains(term) => push_ilike(builder, "p.description", term),
        CatalogFilter::HasTag(term) => {
            builder.push("EXISTS (SELECT 1 FROM unnest(p.tags) AS tag WHERE LOWER(tag) = LOWER(");
            builder.push_bind(term.clone());
            builder.push("))");
        }
        CatalogFilter::CategoryNameContains(term) => push_ilike(builder, "c.name", term),
        CatalogFilter::InStock => {
            builder.push("p.in_stock");
        }
        CatalogFilter::Any(clauses) => {
            push_group(builder, clauses, " OR ", "FALSE", push_catalog_filter);
        }
        CatalogFilter::All(clauses) => {
            push_group(builder, clauses, " AND ", "TRUE", push_catalog_filter);
        }
    }
}

fn push_category_filter(builder: &mut QueryBuilder<'static, Postgres>, filter: &CategoryFilter) {
    match filter {
        CategoryFilter::Active => {
            builder.push("c.active");
        }
        CategoryFilter::NameContains(term) => push_ilike(builder, "c.name", term),
        CategoryFilter::Any(clauses) => {
            push_group(builder, clauses, " OR ", "FALSE", push_category_filter);
        }
        CategoryFilter::All(clauses) => {
            push_group(builder, clauses, " AND ", "TRUE", push_category_filter);
        }
    }
}

fn push_ilike(builder: &mut QueryBuilder<'static, Postgres>, column: &str, term: &str) {
    builder.push(column);
    builder.push(" ILIKE ");
    builder.push_bind(like_pattern(term));
}

fn push_group<T>(
    builder: &mut QueryBuilder<'static, Postgres>,
    clauses: &[T],
    separator: &str,
    empty: &str,
    push: fn(&mut QueryBuilder<'static, Postgres>, &T),
) {
    if clauses.is_empty() {
        builder.push(empty);
        return;
    }

    builder.push("(");
    for (i, clause) in clauses.iter().enumerate() {
        if i > 0 {
            builder.push(separator);
        }
        push(builder, clause);
    }
    builder.push(")");
}
