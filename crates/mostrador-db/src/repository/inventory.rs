//! # Inventory Repository
//!
//! Stock rows and the movement log.
//!
//! ## Stock Row Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  create product ──► insert()            current_stock = 0              │
//! │                                                                         │
//! │  any stock change, inside one unit of work:                            │
//! │    lock_stock()      no-op UPDATE ... RETURNING current_stock          │
//! │    set_stock()       current_stock = previous + delta                  │
//! │    insert_movement() previous, delta, new, type, reference             │
//! │                                                                         │
//! │  inventory_movements rejects UPDATE/DELETE (triggers)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;
use mostrador_core::{InventoryMovement, InventoryRecord};

const MOVEMENT_COLUMNS: &str = r#"
    id, tenant_id, product_id, movement_type, quantity,
    previous_stock, new_stock, reference_id, notes, actor_id, created_at
"#;

/// Repository for inventory rows and movements.
pub struct InventoryRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> InventoryRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        InventoryRepository { conn }
    }

    /// Creates the stock row of a new product with zero stock.
    pub async fn insert(
        &mut self,
        tenant_id: &str,
        product_id: &str,
        now: DateTime<Utc>,
    ) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO inventory (product_id, tenant_id, current_stock, last_updated)
            VALUES (?1, ?2, 0, ?3)
            "#,
        )
        .bind(product_id)
        .bind(tenant_id)
        .bind(now)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    /// Locks the stock row and returns its current value.
    ///
    /// Waits for any other writer to finish first, so the value returned is
    /// the committed one. `None` means no such row for the tenant.
    pub async fn lock_stock(&mut self, tenant_id: &str, product_id: &str) -> DbResult<Option<i64>> {
        debug!(product_id = %product_id, tenant_id = %tenant_id, "Locking stock row");

        let stock = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE inventory SET current_stock = current_stock
            WHERE product_id = ?1 AND tenant_id = ?2
            RETURNING current_stock
            "#,
        )
        .bind(product_id)
        .bind(tenant_id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(stock)
    }

    /// Writes a new stock value. The caller holds the row lock.
    pub async fn set_stock(
        &mut self,
        tenant_id: &str,
        product_id: &str,
        new_stock: i64,
        now: DateTime<Utc>,
    ) -> DbResult<()> {
        sqlx::query(
            r#"
            UPDATE inventory SET current_stock = ?3, last_updated = ?4
            WHERE product_id = ?1 AND tenant_id = ?2
            "#,
        )
        .bind(product_id)
        .bind(tenant_id)
        .bind(new_stock)
        .bind(now)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    /// Reads a stock row without locking it.
    pub async fn get(
        &mut self,
        tenant_id: &str,
        product_id: &str,
    ) -> DbResult<Option<InventoryRecord>> {
        let record = sqlx::query_as::<_, InventoryRecord>(
            r#"
            SELECT product_id, tenant_id, current_stock, last_updated
            FROM inventory
            WHERE product_id = ?1 AND tenant_id = ?2
            "#,
        )
        .bind(product_id)
        .bind(tenant_id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(record)
    }

    /// Appends a movement to the log.
    pub async fn insert_movement(&mut self, movement: &InventoryMovement) -> DbResult<()> {
        debug!(
            product_id = %movement.product_id,
            movement_type = movement.movement_type.as_str(),
            quantity = movement.quantity,
            "Appending inventory movement"
        );

        sqlx::query(
            r#"
            INSERT INTO inventory_movements (
                id, tenant_id, product_id, movement_type, quantity,
                previous_stock, new_stock, reference_id, notes, actor_id, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&movement.id)
        .bind(&movement.tenant_id)
        .bind(&movement.product_id)
        .bind(movement.movement_type)
        .bind(movement.quantity)
        .bind(movement.previous_stock)
        .bind(movement.new_stock)
        .bind(&movement.reference_id)
        .bind(&movement.notes)
        .bind(&movement.actor_id)
        .bind(movement.created_at)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    /// Movements of one product, newest first.
    pub async fn movements_for_product(
        &mut self,
        tenant_id: &str,
        product_id: &str,
        limit: u32,
        offset: u32,
    ) -> DbResult<Vec<InventoryMovement>> {
        let sql = format!(
            "SELECT {MOVEMENT_COLUMNS} FROM inventory_movements \
             WHERE tenant_id = ?1 AND product_id = ?2 \
             ORDER BY created_at DESC, rowid DESC \
             LIMIT ?3 OFFSET ?4"
        );

        let movements = sqlx::query_as::<_, InventoryMovement>(&sql)
            .bind(tenant_id)
            .bind(product_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(movements)
    }

    /// Movements caused by one sale (debits and cancellation credits),
    /// oldest first.
    pub async fn movements_for_reference(
        &mut self,
        tenant_id: &str,
        reference_id: &str,
    ) -> DbResult<Vec<InventoryMovement>> {
        let sql = format!(
            "SELECT {MOVEMENT_COLUMNS} FROM inventory_movements \
             WHERE tenant_id = ?1 AND reference_id = ?2 \
             ORDER BY rowid"
        );

        let movements = sqlx::query_as::<_, InventoryMovement>(&sql)
            .bind(tenant_id)
            .bind(reference_id)
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(movements)
    }
}
