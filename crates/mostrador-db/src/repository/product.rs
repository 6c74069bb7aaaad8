//! # Product Repository
//!
//! Product rows, always read together with their inventory row so callers
//! see `current_stock` next to the catalog fields, and with the name of
//! their category.
//!
//! ```text
//! products p ──LEFT JOIN── inventory i  ON i.product_id = p.id
//!                                       AND i.tenant_id = p.tenant_id
//!            ──LEFT JOIN── categories c ON c.id = p.category_id
//!                                       AND c.tenant_id = p.tenant_id
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;
use mostrador_core::{Product, ProductUpdate};

const PRODUCT_SELECT: &str = r#"
    SELECT
        p.id,
        p.tenant_id,
        p.sku,
        p.name,
        p.description,
        p.category_id,
        c.name AS category_name,
        p.cost_price_cents,
        p.sale_price_cents,
        p.min_stock,
        p.is_active,
        COALESCE(i.current_stock, 0) AS current_stock,
        p.created_at,
        p.updated_at
    FROM products p
    LEFT JOIN inventory i ON i.product_id = p.id AND i.tenant_id = p.tenant_id
    LEFT JOIN categories c ON c.id = p.category_id AND c.tenant_id = p.tenant_id
"#;

/// Repository for product rows.
pub struct ProductRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> ProductRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        ProductRepository { conn }
    }

    /// Inserts a product row. The inventory row is inserted separately.
    ///
    /// ## Errors
    /// `DbError::UniqueViolation { field: "sku" }` for a duplicate SKU in
    /// the same tenant.
    pub async fn insert(&mut self, product: &Product) -> DbResult<()> {
        debug!(product_id = %product.id, tenant_id = %product.tenant_id, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, tenant_id, sku, name, description, category_id,
                cost_price_cents, sale_price_cents, min_stock, is_active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&product.id)
        .bind(&product.tenant_id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category_id)
        .bind(product.cost_price_cents)
        .bind(product.sale_price_cents)
        .bind(product.min_stock)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    /// Gets a product of the tenant by id, active or not.
    pub async fn get(&mut self, tenant_id: &str, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("{PRODUCT_SELECT} WHERE p.id = ?1 AND p.tenant_id = ?2");

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(product)
    }

    /// Lists products ordered by name.
    ///
    /// `search` (already trimmed) matches a substring of name or SKU; an
    /// empty string matches everything. `category_id` narrows to one
    /// category.
    pub async fn list(
        &mut self,
        tenant_id: &str,
        search: &str,
        category_id: Option<&str>,
        include_inactive: bool,
        limit: u32,
        offset: u32,
    ) -> DbResult<Vec<Product>> {
        debug!(tenant_id = %tenant_id, search = %search, limit, offset, "Listing products");

        let sql = format!(
            r#"{PRODUCT_SELECT}
            WHERE p.tenant_id = ?1
              AND (?2 = '' OR p.name LIKE '%' || ?2 || '%' OR p.sku LIKE '%' || ?2 || '%')
              AND (?3 IS NULL OR p.category_id = ?3)
              AND (?4 OR p.is_active = 1)
            ORDER BY p.name COLLATE NOCASE, p.id
            LIMIT ?5 OFFSET ?6"#
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(tenant_id)
            .bind(search)
            .bind(category_id)
            .bind(include_inactive)
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut *self.conn)
            .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Active products, ordered by name, for inventory reports.
    pub async fn list_active(&mut self, tenant_id: &str) -> DbResult<Vec<Product>> {
        let sql = format!(
            "{PRODUCT_SELECT} WHERE p.tenant_id = ?1 AND p.is_active = 1 \
             ORDER BY p.name COLLATE NOCASE, p.id"
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(tenant_id)
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(products)
    }

    /// Active products at or below their minimum stock, emptiest first.
    pub async fn low_stock(&mut self, tenant_id: &str) -> DbResult<Vec<Product>> {
        let sql = format!(
            "{PRODUCT_SELECT} WHERE p.tenant_id = ?1 AND p.is_active = 1 \
             AND COALESCE(i.current_stock, 0) <= p.min_stock \
             ORDER BY COALESCE(i.current_stock, 0), p.name COLLATE NOCASE"
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(tenant_id)
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(products)
    }

    /// Applies a partial update in one statement.
    ///
    /// `None` keeps a column. For the nullable text columns (`sku`,
    /// `description`, `category_id`) an empty string stores NULL.
    ///
    /// Being a single write, it is also the row lock of the unit of work
    /// it runs in. Returns `false` if no product of the tenant has `id`.
    pub async fn update(
        &mut self,
        tenant_id: &str,
        id: &str,
        update: &ProductUpdate,
        now: DateTime<Utc>,
    ) -> DbResult<bool> {
        debug!(product_id = %id, tenant_id = %tenant_id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                sku              = CASE WHEN ?3 IS NULL THEN sku
                                        ELSE NULLIF(?3, '') END,
                name             = COALESCE(?4, name),
                description      = CASE WHEN ?5 IS NULL THEN description
                                        ELSE NULLIF(?5, '') END,
                cost_price_cents = COALESCE(?6, cost_price_cents),
                sale_price_cents = COALESCE(?7, sale_price_cents),
                min_stock        = COALESCE(?8, min_stock),
                is_active        = COALESCE(?9, is_active),
                category_id      = CASE WHEN ?10 IS NULL THEN category_id
                                        ELSE NULLIF(?10, '') END,
                updated_at       = ?11
            WHERE id = ?1 AND tenant_id = ?2
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(update.sku.as_deref().map(str::trim))
        .bind(update.name.as_deref().map(str::trim))
        .bind(&update.description)
        .bind(update.cost_price_cents)
        .bind(update.sale_price_cents)
        .bind(update.min_stock)
        .bind(update.is_active)
        .bind(update.category_id.as_deref().map(str::trim))
        .bind(now)
        .execute(&mut *self.conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
