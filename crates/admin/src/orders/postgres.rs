//! `PostgreSQL` order store.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use linen_loft_core::{OrderId, OrderLineItemId, OrderStatus, PaymentStatus, ProductId};

use super::analytics::average;
use super::{OrderAnalytics, OrderFilter, OrderStore, Page};
use crate::db::{RepositoryError, like_pattern};
use crate::models::{Order, OrderLineItem, OrderUpdate};

const ORDER_SELECT: &str = r"
    SELECT
        o.id, o.order_number, o.status, o.payment_status,
        o.tracking_number, o.notes, o.estimated_delivery,
        o.total, o.created_at, o.updated_at
    FROM admin.orders o
    WHERE ";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    order_number: String,
    status: OrderStatus,
    payment_status: PaymentStatus,
    tracking_number: Option<String>,
    notes: Option<String>,
    estimated_delivery: Option<DateTime<Utc>>,
    total: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderLineItem>) -> Order {
        Order {
            id: OrderId::new(self.id),
            order_number: self.order_number,
            status: self.status,
            payment_status: self.payment_status,
            tracking_number: self.tracking_number,
            notes: self.notes,
            estimated_delivery: self.estimated_delivery,
            total: self.total,
            created_at: self.created_at,
            updated_at: self.updated_at,
            items,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LineItemRow {
    id: i32,
    order_id: i32,
    product_id: i32,
    product_name: String,
    quantity: i32,
    unit_price: Decimal,
}

impl From<LineItemRow> for OrderLineItem {
    fn from(row: LineItemRow) -> Self {
        Self {
            id: OrderLineItemId::new(row.id),
            product_id: ProductId::new(row.product_id),
            product_name: row.product_name,
            quantity: row.quantity,
            unit_price: row.unit_price,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TotalsRow {
    order_count: i64,
    total_revenue: Decimal,
    grand_total: Decimal,
}

#[derive(Debug, sqlx::FromRow)]
struct StatusCountRow {
    status: OrderStatus,
    count: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentStatusCountRow {
    payment_status: PaymentStatus,
    count: i64,
}

// =============================================================================
// Store
// =============================================================================

/// Order store backed by the admin database.
#[derive(Debug, Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    /// Create a new order store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl OrderStore for PgOrderStore {
    #[instrument(skip(self), fields(order_id = %id))]
    async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        let mut orders = fetch_orders(&mut conn, build_by_ids_query(&[id])).await?;
        Ok(orders.pop())
    }

    #[instrument(skip(self, update), fields(order_id = %id))]
    async fn update_by_id(
        &self,
        id: OrderId,
        update: &OrderUpdate,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let mut builder = build_update(update);
        builder.push(" WHERE id = ");
        builder.push_bind(id);
        let result = builder.build().execute(&mut *tx).await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        let order = fetch_orders(&mut tx, build_by_ids_query(&[id]))
            .await?
            .pop()
            .ok_or(RepositoryError::NotFound)?;
        tx.commit().await?;

        Ok(order)
    }

    #[instrument(skip(self, ids, update), fields(count = ids.len()))]
    async fn update_many(
        &self,
        ids: &[OrderId],
        update: &OrderUpdate,
        unless_status: &[OrderStatus],
    ) -> Result<u64, RepositoryError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = build_update_many(ids, update, unless_status)
            .build()
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn find_many(&self, ids: &[OrderId]) -> Result<Vec<Order>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.acquire().await?;
        fetch_orders(&mut conn, build_by_ids_query(ids)).await
    }

    #[instrument(skip(self, filter))]
    async fn list(
        &self,
        filter: &OrderFilter,
        page: Page,
    ) -> Result<(Vec<Order>, u64), RepositoryError> {
        let mut conn = self.pool.acquire().await?;

        let total: i64 = build_count_query(filter)
            .build_query_scalar()
            .fetch_one(&mut *conn)
            .await?;
        let orders = fetch_orders(&mut conn, build_list_query(filter, page)).await?;

        Ok((orders, to_count(total)?))
    }

    #[instrument(skip(self, filter))]
    async fn aggregate(&self, filter: &OrderFilter) -> Result<OrderAnalytics, RepositoryError> {
        let mut conn = self.pool.acquire().await?;

        let totals: TotalsRow = build_totals_query(filter)
            .build_query_as()
            .fetch_one(&mut *conn)
            .await?;
        let statuses: Vec<StatusCountRow> = build_histogram_query(filter, "status")
            .build_query_as()
            .fetch_all(&mut *conn)
            .await?;
        let payment_statuses: Vec<PaymentStatusCountRow> =
            build_histogram_query(filter, "payment_status")
                .build_query_as()
                .fetch_all(&mut *conn)
                .await?;

        let order_count = to_count(totals.order_count)?;
        let mut analytics = OrderAnalytics {
            order_count,
            total_revenue: totals.total_revenue,
            average_order_value: average(totals.grand_total, order_count),
            ..OrderAnalytics::default()
        };
        for row in statuses {
            analytics.status_counts.insert(row.status, to_count(row.count)?);
        }
        for row in payment_statuses {
            analytics
                .payment_status_counts
                .insert(row.payment_status, to_count(row.count)?);
        }

        Ok(analytics)
    }
}

fn to_count(value: i64) -> Result<u64, RepositoryError> {
    u64::try_from(value)
        .map_err(|_| RepositoryError::DataCorruption(format!("negative row count {value}")))
}

/// Run an order query and attach line items to every row.
async fn fetch_orders(
    conn: &mut PgConnection,
    mut builder: QueryBuilder<'static, Postgres>,
) -> Result<Vec<Order>, RepositoryError> {
    let rows: Vec<OrderRow> = builder.build_query_as().fetch_all(&mut *conn).await?;
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let order_ids: Vec<i32> = rows.iter().map(|row| row.id).collect();
    let item_rows: Vec<LineItemRow> = sqlx::query_as(
        r"
        SELECT id, order_id, product_id, product_name, quantity, unit_price
        FROM admin.order_line_items
        WHERE order_id = ANY($1)
        ORDER BY id
        ",
    )
    .bind(&order_ids)
    .fetch_all(&mut *conn)
    .await?;

    let mut items: HashMap<i32, Vec<OrderLineItem>> = HashMap::new();
    for row in item_rows {
        items.entry(row.order_id).or_default().push(row.into());
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let line_items = items.remove(&row.id).unwrap_or_default();
            row.into_order(line_items)
        })
        .collect())
}

// =============================================================================
// Query Builders
// =============================================================================

fn build_by_ids_query(ids: &[OrderId]) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(ORDER_SELECT);
    builder.push("o.id = ANY(");
    builder.push_bind(ids.to_vec());
    builder.push(") ORDER BY o.id");
    builder
}

fn build_list_query(filter: &OrderFilter, page: Page) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(ORDER_SELECT);
    push_order_filter(&mut builder, filter);
    builder.push(" ORDER BY o.created_at DESC, o.id DESC LIMIT ");
    builder.push_bind(i64::from(page.per_page));
    builder.push(" OFFSET ");
    builder.push_bind(i64::try_from(page.offset()).unwrap_or(i64::MAX));
    builder
}

fn build_count_query(filter: &OrderFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM admin.orders o WHERE ");
    push_order_filter(&mut builder, filter);
    builder
}

fn build_totals_query(filter: &OrderFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(
        r"
        SELECT
            COUNT(*) AS order_count,
            COALESCE(SUM(o.total) FILTER (WHERE o.payment_status = 'PAID'), 0) AS total_revenue,
            COALESCE(SUM(o.total), 0) AS grand_total
        FROM admin.orders o
        WHERE ",
    );
    push_order_filter(&mut builder, filter);
    builder
}

/// `column` is one of the fixed status column names, never user input.
fn build_histogram_query(filter: &OrderFilter, column: &str) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!(
        "SELECT o.{column}, COUNT(*) AS count FROM admin.orders o WHERE "
    ));
    push_order_filter(&mut builder, filter);
    builder.push(format!(" GROUP BY o.{column}"));
    builder
}

/// `UPDATE` prefix setting every provided field plus `updated_at`.
fn build_update(update: &OrderUpdate) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("UPDATE admin.orders SET updated_at = NOW()");
    if let Some(status) = update.status {
        builder.push(", status = ");
        builder.push_bind(status);
    }
    if let Some(payment_status) = update.payment_status {
        builder.push(", payment_status = ");
        builder.push_bind(payment_status);
    }
    if let Some(tracking_number) = &update.tracking_number {
        builder.push(", tracking_number = ");
        builder.push_bind(tracking_number.clone());
    }
    if let Some(notes) = &update.notes {
        builder.push(", notes = ");
        builder.push_bind(notes.clone());
    }
    if let Some(estimated_delivery) = update.estimated_delivery {
        builder.push(", estimated_delivery = ");
        builder.push_bind(estimated_delivery);
    }
    builder
}

fn build_update_many(
    ids: &[OrderId],
    update: &OrderUpdate,
    unless_status: &[OrderStatus],
) -> QueryBuilder<'static, Postgres> {
    let mut builder = build_update(update);
    builder.push(" WHERE id = ANY(");
    builder.push_bind(ids.to_vec());
    builder.push(")");
    if !unless_status.is_empty() {
        builder.push(" AND status NOT IN (");
        let mut statuses = builder.separated(", ");
        for status in unless_status {
            statuses.push_bind(*status);
        }
        builder.push(")");
    }
    builder
}

fn push_order_filter(builder: &mut QueryBuilder<'static, Postgres>, filter: &OrderFilter) {
    match filter {
        OrderFilter::Status(status) => {
            builder.push("o.status = ");
            builder.push_bind(*status);
        }
        OrderFilter::PaymentStatus(status) => {
            builder.push("o.payment_status = ");
            builder.push_bind(*status);
        }
        OrderFilter::Search(term) => {
            let pattern = like_pattern(term);
            builder.push("(o.order_number ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR o.notes ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR o.tracking_number ILIKE ");
            builder.push_bind(pattern);
            builder.push(")");
        }
        OrderFilter::CreatedFrom(from) => {
            builder.push("o.created_at >= ");
            builder.push_bind(*from);
        }
        OrderFilter::CreatedBefore(before) => {
            builder.push("o.created_at < ");
            builder.push_bind(*before);
        }
        OrderFilter::All(clauses) => {
            if clauses.is_empty() {
                builder.push("TRUE");
                return;
            }
            builder.push("(");
            for (i, clause) in clauses.iter().enumerate() {
                if i > 0 {
                    builder.push(" AND ");
                }
                push_order_filter(builder, clause);
            }
            builder.push(")");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalized(sql: &str) -> String {
        sql.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_list_query_binds_filters() {
        let filter = OrderFilter::All(vec![
            OrderFilter::Status(OrderStatus::Shipped),
            OrderFilter::Search("LL-10".into()),
        ]);
        let builder = build_list_query(&filter, Page::new(Some(2), Some(25), 100));
        let sql = normalized(builder.sql());

        assert!(sql.ends_with(
            "WHERE (o.status = $1 AND (o.order_number ILIKE $2 OR o.notes ILIKE $3 OR o.tracking_number ILIKE $4)) ORDER BY o.created_at DESC, o.id DESC LIMIT $5 OFFSET $6"
        ));
        assert!(!sql.contains("LL-10"));
    }

    #[test]
    fn test_everything_compiles_to_true() {
        let builder = build_count_query(&OrderFilter::everything());
        assert_eq!(
            normalized(builder.sql()),
            "SELECT COUNT(*) FROM admin.orders o WHERE TRUE"
        );
    }

    #[test]
    fn test_update_only_sets_provided_fields() {
        let update = OrderUpdate {
            status: Some(OrderStatus::Cancelled),
            notes: Some("Cancelled by admin".into()),
            ..OrderUpdate::default()
        };
        let builder = build_update(&update);
        assert_eq!(
            normalized(builder.sql()),
            "UPDATE admin.orders SET updated_at = NOW(), status = $1, notes = $2"
        );
    }

    #[test]
    fn test_update_many_guards_statuses() {
        let update = OrderUpdate {
            status: Some(OrderStatus::Cancelled),
            ..OrderUpdate::default()
        };
        let ids = [OrderId::new(1), OrderId::new(2)];

        let guarded = build_update_many(
            &ids,
            &update,
            &[OrderStatus::Delivered, OrderStatus::Refunded],
        );
        assert_eq!(
            normalized(guarded.sql()),
            "UPDATE admin.orders SET updated_at = NOW(), status = $1 WHERE id = ANY($2) AND status NOT IN ($3, $4)"
        );

        let unguarded = build_update_many(&ids, &update, &[]);
        assert!(normalized(unguarded.sql()).ends_with("WHERE id = ANY($2)"));
    }

    #[test]
    fn test_histogram_groups_by_column() {
        let builder = build_histogram_query(
            &OrderFilter::PaymentStatus(PaymentStatus::Paid),
            "payment_status",
        );
        assert!(normalized(builder.sql()).ends_with(
            "WHERE o.payment_status = $1 GROUP BY o.payment_status"
        ));
    }
}
