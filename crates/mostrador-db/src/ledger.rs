//! # Stock Ledger
//!
//! Owns the authoritative stock of every product and the append-only log
//! of how it changed.
//!
//! ## One Stock Change
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  apply(delta)                          inside the caller's unit of work│
//! │     │                                                                   │
//! │     ├─► lock_stock()  ──► None ──────────────► NotFound                │
//! │     │        │                                                          │
//! │     │        ▼ previous                                                 │
//! │     ├─► new = previous + delta                                          │
//! │     │        │                                                          │
//! │     │        ├── new > MAX_STOCK_QUANTITY ────► Validation (OutOfRange)│
//! │     │        ├── new < 0 ─────────────────────► InsufficientStock      │
//! │     │        ▼                                                          │
//! │     ├─► set_stock(new)                                                  │
//! │     └─► insert_movement(previous, delta, new)                           │
//! │                                                                         │
//! │  Both writes or neither: an error leaves the unit of work to roll back. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `reserve_and_debit` and `credit` run inside a unit of work owned by the
//! caller and never commit. `restock` and `register_manual_movement` open
//! and commit their own.

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::pool::Database;
use crate::repository::{InventoryRepository, ProductRepository};
use crate::unit_of_work::UnitOfWork;
use mostrador_core::validation::{
    validate_movement_delta, validate_notes, validate_stock_amount,
};
use mostrador_core::{
    CoreError, CoreResult, InventoryMovement, InventoryStatus, MovementType, Product,
    ValidationError, MAX_STOCK_QUANTITY,
};

// =============================================================================
// Movement Context
// =============================================================================

/// Who and what a stock change belongs to.
///
/// ## Example
/// ```rust,ignore
/// let ctx = MovementContext::new(&tenant_id, &product_id)
///     .actor(&user_id)
///     .reference(&sale_id);
/// ledger.reserve_and_debit(&mut uow, &ctx, 3).await?;
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MovementContext<'a> {
    pub tenant_id: &'a str,
    pub product_id: &'a str,
    pub actor_id: Option<&'a str>,
    pub reference_id: Option<&'a str>,
    pub notes: Option<&'a str>,
}

impl<'a> MovementContext<'a> {
    pub fn new(tenant_id: &'a str, product_id: &'a str) -> Self {
        MovementContext {
            tenant_id,
            product_id,
            actor_id: None,
            reference_id: None,
            notes: None,
        }
    }

    pub fn actor(mut self, actor_id: &'a str) -> Self {
        self.actor_id = Some(actor_id);
        self
    }

    /// The sale that caused the movement.
    pub fn reference(mut self, reference_id: &'a str) -> Self {
        self.reference_id = Some(reference_id);
        self
    }

    pub fn notes(mut self, notes: Option<&'a str>) -> Self {
        self.notes = notes;
        self
    }
}

// =============================================================================
// Stock Ledger
// =============================================================================

#[derive(Debug, Clone)]
pub struct StockLedger {
    db: Database,
}

impl StockLedger {
    pub fn new(db: Database) -> Self {
        StockLedger { db }
    }

    /// Current stock of a product of the tenant.
    pub async fn get_current_stock(&self, tenant_id: &str, product_id: &str) -> CoreResult<i64> {
        let mut conn = self.db.acquire().await?;
        let record = InventoryRepository::new(&mut conn)
            .get(tenant_id, product_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Product", product_id))?;

        Ok(record.current_stock)
    }

    /// Debits `quantity` units for a sale.
    ///
    /// Locks the stock row, checks availability and writes the new stock
    /// together with a `SALE` movement. Does not commit.
    ///
    /// ## Errors
    /// - `Validation` if `quantity` is not positive
    /// - `NotFound` if the product has no stock row in the tenant
    /// - `InsufficientStock` if `current_stock < quantity`
    pub async fn reserve_and_debit(
        &self,
        uow: &mut UnitOfWork,
        ctx: &MovementContext<'_>,
        quantity: i64,
    ) -> CoreResult<InventoryMovement> {
        validate_stock_amount(quantity)?;
        apply(uow, ctx, -quantity, MovementType::Sale).await
    }

    /// Credits `quantity` units back (restock or sale cancellation).
    /// Does not commit.
    pub async fn credit(
        &self,
        uow: &mut UnitOfWork,
        ctx: &MovementContext<'_>,
        quantity: i64,
        movement_type: MovementType,
    ) -> CoreResult<InventoryMovement> {
        validate_stock_amount(quantity)?;
        apply(uow, ctx, quantity, movement_type).await
    }

    /// Records goods received, in its own unit of work.
    pub async fn restock(
        &self,
        ctx: &MovementContext<'_>,
        quantity: i64,
    ) -> CoreResult<InventoryMovement> {
        validate_notes(ctx.notes)?;

        let mut uow = self.db.begin().await?;
        let movement = self
            .credit(&mut uow, ctx, quantity, MovementType::Restock)
            .await?;
        uow.commit().await?;

        info!(
            tenant_id = %ctx.tenant_id,
            product_id = %ctx.product_id,
            quantity,
            new_stock = movement.new_stock,
            "Product restocked"
        );
        Ok(movement)
    }

    /// Ad-hoc adjustment outside the sale flow, in its own unit of work.
    ///
    /// `delta` may be negative but not zero, and may not take stock below
    /// zero.
    pub async fn register_manual_movement(
        &self,
        ctx: &MovementContext<'_>,
        delta: i64,
    ) -> CoreResult<InventoryMovement> {
        validate_movement_delta(delta)?;
        validate_notes(ctx.notes)?;

        let mut uow = self.db.begin().await?;
        let movement = apply(&mut uow, ctx, delta, MovementType::Manual).await?;
        uow.commit().await?;

        info!(
            tenant_id = %ctx.tenant_id,
            product_id = %ctx.product_id,
            delta,
            new_stock = movement.new_stock,
            "Manual inventory movement registered"
        );
        Ok(movement)
    }

    /// Movements of a product, newest first.
    pub async fn movement_history(
        &self,
        tenant_id: &str,
        product_id: &str,
        limit: u32,
        offset: u32,
    ) -> CoreResult<Vec<InventoryMovement>> {
        let mut conn = self.db.acquire().await?;

        if ProductRepository::new(&mut conn)
            .get(tenant_id, product_id)
            .await?
            .is_none()
        {
            return Err(CoreError::not_found("Product", product_id));
        }

        let movements = InventoryRepository::new(&mut conn)
            .movements_for_product(tenant_id, product_id, limit, offset)
            .await?;
        Ok(movements)
    }

    /// Active products at or below their minimum stock.
    pub async fn low_stock(&self, tenant_id: &str) -> CoreResult<Vec<Product>> {
        let mut conn = self.db.acquire().await?;
        let products = ProductRepository::new(&mut conn).low_stock(tenant_id).await?;
        Ok(products)
    }

    /// Stock, value and level of every active product.
    ///
    /// The stock value saturates at `i64::MAX` cents instead of wrapping.
    pub async fn summary(&self, tenant_id: &str) -> CoreResult<Vec<InventoryStatus>> {
        let mut conn = self.db.acquire().await?;
        let products = ProductRepository::new(&mut conn)
            .list_active(tenant_id)
            .await?;

        Ok(products
            .into_iter()
            .map(|p| InventoryStatus {
                level: p.stock_level(),
                stock_value_cents: p
                    .sale_price()
                    .checked_mul_quantity(p.current_stock)
                    .map_or(i64::MAX, |value| value.cents()),
                product_id: p.id,
                name: p.name,
                sku: p.sku,
                current_stock: p.current_stock,
                min_stock: p.min_stock,
            })
            .collect())
    }
}

/// Applies a signed delta under the row lock and logs it.
async fn apply(
    uow: &mut UnitOfWork,
    ctx: &MovementContext<'_>,
    delta: i64,
    movement_type: MovementType,
) -> CoreResult<InventoryMovement> {
    let previous = uow
        .inventory()
        .lock_stock(ctx.tenant_id, ctx.product_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Product", ctx.product_id))?;

    let new_stock = match previous.checked_add(delta) {
        Some(stock) if stock <= MAX_STOCK_QUANTITY => stock,
        _ => {
            return Err(ValidationError::OutOfRange {
                field: "current_stock".to_string(),
                min: 0,
                max: MAX_STOCK_QUANTITY,
            }
            .into())
        }
    };
    if new_stock < 0 {
        let product_name = uow
            .products()
            .get(ctx.tenant_id, ctx.product_id)
            .await?
            .map(|p| p.name)
            .unwrap_or_else(|| ctx.product_id.to_string());

        warn!(
            tenant_id = %ctx.tenant_id,
            product_id = %ctx.product_id,
            available = previous,
            requested = delta.saturating_neg(),
            "Stock change rejected: insufficient stock"
        );
        return Err(CoreError::InsufficientStock {
            product_id: ctx.product_id.to_string(),
            product_name,
            available: previous,
            requested: delta.saturating_neg(),
        });
    }

    let now = Utc::now();
    let movement = InventoryMovement {
        id: Uuid::new_v4().to_string(),
        tenant_id: ctx.tenant_id.to_string(),
        product_id: ctx.product_id.to_string(),
        movement_type,
        quantity: delta,
        previous_stock: previous,
        new_stock,
        reference_id: ctx.reference_id.map(str::to_string),
        notes: ctx.notes.map(str::to_string),
        actor_id: ctx.actor_id.map(str::to_string),
        created_at: now,
    };

    let mut inventory = uow.inventory();
    inventory
        .set_stock(ctx.tenant_id, ctx.product_id, new_stock, now)
        .await?;
    inventory.insert_movement(&movement).await?;

    debug!(
        product_id = %ctx.product_id,
        movement_type = movement_type.as_str(),
        previous_stock = previous,
        new_stock,
        "Stock updated"
    );
    Ok(movement)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::DbConfig;
    use mostrador_core::{NewProduct, StockLevel};

    const TENANT: &str = "tenant-a";
    const ACTOR: &str = "user-1";

    async fn setup() -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = db
            .catalog()
            .create_product(
                TENANT,
                ACTOR,
                NewProduct {
                    sku: Some("CAFE-250".to_string()),
                    name: "Café 250g".to_string(),
                    sale_price_cents: 8500,
                    cost_price_cents: 5000,
                    min_stock: Some(3),
                    initial_stock: 10,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        (db, product.id)
    }

    #[tokio::test]
    async fn test_debit_writes_stock_and_movement() {
        let (db, product_id) = setup().await;
        let ledger = db.ledger();

        let mut uow = db.begin().await.unwrap();
        let ctx = MovementContext::new(TENANT, &product_id)
            .actor(ACTOR)
            .reference("sale-1");
        let movement = ledger.reserve_and_debit(&mut uow, &ctx, 3).await.unwrap();
        uow.commit().await.unwrap();

        assert_eq!(movement.previous_stock, 10);
        assert_eq!(movement.new_stock, 7);
        assert_eq!(movement.quantity, -3);
        assert_eq!(movement.movement_type, MovementType::Sale);
        assert_eq!(movement.reference_id.as_deref(), Some("sale-1"));
        assert_eq!(ledger.get_current_stock(TENANT, &product_id).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_debit_beyond_stock_is_rejected() {
        let (db, product_id) = setup().await;
        let ledger = db.ledger();

        let mut uow = db.begin().await.unwrap();
        let ctx = MovementContext::new(TENANT, &product_id);
        let err = ledger
            .reserve_and_debit(&mut uow, &ctx, 11)
            .await
            .unwrap_err();
        drop(uow);

        match err {
            CoreError::InsufficientStock {
                product_name,
                available,
                requested,
                ..
            } => {
                assert_eq!(product_name, "Café 250g");
                assert_eq!(available, 10);
                assert_eq!(requested, 11);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
        assert_eq!(ledger.get_current_stock(TENANT, &product_id).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_uncommitted_unit_of_work_rolls_back() {
        let (db, product_id) = setup().await;
        let ledger = db.ledger();

        {
            let mut uow = db.begin().await.unwrap();
            let ctx = MovementContext::new(TENANT, &product_id);
            ledger.reserve_and_debit(&mut uow, &ctx, 4).await.unwrap();
        }

        assert_eq!(ledger.get_current_stock(TENANT, &product_id).await.unwrap(), 10);
        let history = ledger
            .movement_history(TENANT, &product_id, 50, 0)
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].movement_type, MovementType::Restock);
    }

    #[tokio::test]
    async fn test_manual_movement() {
        let (db, product_id) = setup().await;
        let ledger = db.ledger();

        let ctx = MovementContext::new(TENANT, &product_id)
            .actor(ACTOR)
            .notes(Some("broken jar"));
        let movement = ledger.register_manual_movement(&ctx, -2).await.unwrap();
        assert_eq!(movement.movement_type, MovementType::Manual);
        assert_eq!(movement.new_stock, 8);
        assert_eq!(movement.notes.as_deref(), Some("broken jar"));

        assert!(matches!(
            ledger.register_manual_movement(&ctx, -9).await,
            Err(CoreError::InsufficientStock { available: 8, requested: 9, .. })
        ));
        assert!(matches!(
            ledger.register_manual_movement(&ctx, 0).await,
            Err(CoreError::Validation(_))
        ));
        assert_eq!(ledger.get_current_stock(TENANT, &product_id).await.unwrap(), 8);
    }

    #[tokio::test]
    async fn test_restock_and_history_order() {
        let (db, product_id) = setup().await;
        let ledger = db.ledger();

        let ctx = MovementContext::new(TENANT, &product_id).actor(ACTOR);
        ledger.restock(&ctx, 5).await.unwrap();
        assert!(ledger.restock(&ctx, 0).await.is_err());

        let history = ledger
            .movement_history(TENANT, &product_id, 50, 0)
            .await
            .unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].new_stock, 15);
        assert_eq!(history[1].new_stock, 10);
        for movement in &history {
            assert_eq!(movement.new_stock, movement.previous_stock + movement.quantity);
        }
    }

    #[tokio::test]
    async fn test_extreme_amounts_are_rejected_without_writing() {
        let (db, product_id) = setup().await;
        let ledger = db.ledger();
        let ctx = MovementContext::new(TENANT, &product_id).actor(ACTOR);

        assert!(matches!(
            ledger.restock(&ctx, i64::MAX).await,
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert!(matches!(
            ledger.register_manual_movement(&ctx, i64::MIN).await,
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert!(matches!(
            ledger.register_manual_movement(&ctx, i64::MAX).await,
            Err(CoreError::Validation(_))
        ));

        // Each step is in range, but the resulting stock is not.
        ledger.restock(&ctx, MAX_STOCK_QUANTITY - 10).await.unwrap();
        assert!(matches!(
            ledger.restock(&ctx, 1).await,
            Err(CoreError::Validation(ValidationError::OutOfRange { ref field, .. })) if field == "current_stock"
        ));

        assert_eq!(
            ledger.get_current_stock(TENANT, &product_id).await.unwrap(),
            MAX_STOCK_QUANTITY
        );
        let history = ledger
            .movement_history(TENANT, &product_id, 50, 0)
            .await
            .unwrap();
        assert_eq!(history.len(), 2);
    }

    #[tokio::test]
    async fn test_other_tenant_sees_nothing() {
        let (db, product_id) = setup().await;
        let ledger = db.ledger();

        assert!(matches!(
            ledger.get_current_stock("tenant-b", &product_id).await,
            Err(CoreError::NotFound { .. })
        ));
        let ctx = MovementContext::new("tenant-b", &product_id);
        assert!(matches!(
            ledger.restock(&ctx, 5).await,
            Err(CoreError::NotFound { .. })
        ));
        assert!(matches!(
            ledger.movement_history("tenant-b", &product_id, 10, 0).await,
            Err(CoreError::NotFound { .. })
        ));
        assert_eq!(ledger.get_current_stock(TENANT, &product_id).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_low_stock_and_summary() {
        let (db, product_id) = setup().await;
        let ledger = db.ledger();

        assert!(ledger.low_stock(TENANT).await.unwrap().is_empty());

        let ctx = MovementContext::new(TENANT, &product_id);
        ledger.register_manual_movement(&ctx, -7).await.unwrap();

        let low = ledger.low_stock(TENANT).await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].current_stock, 3);

        let summary = ledger.summary(TENANT).await.unwrap();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].level, StockLevel::Low);
        assert_eq!(summary[0].stock_value_cents, 3 * 8500);
    }

    #[tokio::test]
    async fn test_movements_cannot_be_rewritten() {
        let (db, product_id) = setup().await;

        let mut uow = db.begin().await.unwrap();
        let result = sqlx::query("DELETE FROM inventory_movements WHERE product_id = ?1")
            .bind(&product_id)
            .execute(uow.connection())
            .await;
        assert!(result.is_err());
    }
}
