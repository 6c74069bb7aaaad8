//! # Sale Repository
//!
//! Sale headers and their line items.
//!
//! ## Sale Storage
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  sales                              sale_items                          │
//! │  ┌────────────────────────────┐     ┌──────────────────────────────┐   │
//! │  │ id, tenant_id, user_id     │ 1─* │ sale_id, line_number         │   │
//! │  │ sale_number (unique/tenant)│     │ product_id                   │   │
//! │  │ subtotal/tax/discount/total│     │ name/sku/category snapshot   │   │
//! │  │ status, cancelled_at       │     │ quantity, unit_price_cents   │   │
//! │  └────────────────────────────┘     └──────────────────────────────┘   │
//! │                                                                         │
//! │  Headers are never deleted; cancellation only flips `status`.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;
use mostrador_core::{Sale, SaleFilter, SaleItem, SaleStatus};

const SALE_COLUMNS: &str = r#"
    id, tenant_id, user_id, sale_number, status,
    subtotal_cents, tax_cents, tax_rate_bps, discount_cents, total_cents,
    payment_method, customer_name, notes, created_at, cancelled_at
"#;

/// Repository for sales and sale items.
pub struct SaleRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> SaleRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        SaleRepository { conn }
    }

    /// Inserts a sale header.
    ///
    /// ## Errors
    /// `DbError::UniqueViolation { field: "sale_number" }` on a sale number
    /// collision within the tenant.
    pub async fn insert(&mut self, sale: &Sale) -> DbResult<()> {
        debug!(sale_id = %sale.id, sale_number = %sale.sale_number, "Inserting sale");

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, tenant_id, user_id, sale_number, status,
                subtotal_cents, tax_cents, tax_rate_bps, discount_cents, total_cents,
                payment_method, customer_name, notes, created_at, cancelled_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.tenant_id)
        .bind(&sale.user_id)
        .bind(&sale.sale_number)
        .bind(sale.status)
        .bind(sale.subtotal_cents)
        .bind(sale.tax_cents)
        .bind(sale.tax_rate_bps)
        .bind(sale.discount_cents)
        .bind(sale.total_cents)
        .bind(sale.payment_method)
        .bind(&sale.customer_name)
        .bind(&sale.notes)
        .bind(sale.created_at)
        .bind(sale.cancelled_at)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    /// Inserts one line item at position `line_number` (0-based).
    pub async fn insert_item(&mut self, item: &SaleItem, line_number: usize) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sale_items (
                id, sale_id, line_number, product_id, name_snapshot, sku_snapshot,
                category_snapshot, quantity, unit_price_cents, subtotal_cents, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&item.id)
        .bind(&item.sale_id)
        .bind(line_number as i64)
        .bind(&item.product_id)
        .bind(&item.name_snapshot)
        .bind(&item.sku_snapshot)
        .bind(&item.category_snapshot)
        .bind(item.quantity)
        .bind(item.unit_price_cents)
        .bind(item.subtotal_cents)
        .bind(item.created_at)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    /// Locks the sale row and returns its status.
    ///
    /// `None` means no such sale for the tenant.
    pub async fn lock(&mut self, tenant_id: &str, id: &str) -> DbResult<Option<SaleStatus>> {
        debug!(sale_id = %id, tenant_id = %tenant_id, "Locking sale row");

        let status = sqlx::query_scalar::<_, SaleStatus>(
            r#"
            UPDATE sales SET status = status
            WHERE id = ?1 AND tenant_id = ?2
            RETURNING status
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(status)
    }

    /// Flips a completed sale to cancelled. Returns `false` if the sale was
    /// not in `completed` state.
    pub async fn mark_cancelled(
        &mut self,
        tenant_id: &str,
        id: &str,
        now: DateTime<Utc>,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE sales SET status = ?3, cancelled_at = ?4
            WHERE id = ?1 AND tenant_id = ?2 AND status = ?5
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(SaleStatus::Cancelled)
        .bind(now)
        .bind(SaleStatus::Completed)
        .execute(&mut *self.conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn get(&mut self, tenant_id: &str, id: &str) -> DbResult<Option<Sale>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1 AND tenant_id = ?2");

        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(sale)
    }

    /// Line items of a sale in the order they were requested.
    ///
    /// Only call with a sale id already resolved within the tenant.
    pub async fn items(&mut self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT
                id, sale_id, product_id, name_snapshot, sku_snapshot,
                category_snapshot, quantity, unit_price_cents, subtotal_cents, created_at
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY line_number
            "#,
        )
        .bind(sale_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(items)
    }

    /// Sales of the tenant, newest first.
    pub async fn list(&mut self, tenant_id: &str, filter: &SaleFilter) -> DbResult<Vec<Sale>> {
        debug!(tenant_id = %tenant_id, limit = filter.limit, offset = filter.offset, "Listing sales");

        let sql = format!(
            "SELECT {SALE_COLUMNS} FROM sales \
             WHERE tenant_id = ?1 \
               AND (?2 IS NULL OR created_at >= ?2) \
               AND (?3 IS NULL OR created_at < ?3) \
               AND (?4 IS NULL OR status = ?4) \
             ORDER BY created_at DESC, rowid DESC \
             LIMIT ?5 OFFSET ?6"
        );

        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(tenant_id)
            .bind(filter.from)
            .bind(filter.to)
            .bind(filter.status)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(sales)
    }
}
