//! # Sale Orchestrator
//!
//! Turns a multi-line sale request into a sale, its line items and the
//! matching stock movements, all in one unit of work.
//!
//! ## Create Sale Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  validate_sale_request()                 nothing written yet            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  db.begin() ──────────────────────────── UnitOfWork ──────────────┐    │
//! │       │                                                            │    │
//! │  1. for each product, ascending id:                                │    │
//! │       lock stock row, load product (active, same tenant),          │    │
//! │       stock >= total requested?  else InsufficientStock            │    │
//! │       │                                                            │    │
//! │  2. tenant settings (enable_tax, rate), request overrides them     │    │
//! │  3. subtotal from current catalog prices                           │    │
//! │     tax, discount, total           discount > gross → Validation   │    │
//! │  4. insert sale header (sale number unique per tenant)             │    │
//! │  5. for each line, request order:                                  │    │
//! │       insert line item (price, name, category snapshot), debit     │    │
//! │       │                                                            │    │
//! │  6. commit ◄───────────────────────────────────────────────────────┘    │
//! │                                                                         │
//! │  Any error before 6 drops the unit of work: nothing is persisted.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Cancel Sale Flow
//! ```text
//! lock sale ──► missing/other tenant ──► NotFound
//!     │
//!     ├──► already cancelled ──► AlreadyCancelled
//!     ▼
//! credit every line (SALE_CANCEL) ──► status = cancelled ──► commit
//! ```

use std::collections::HashMap;

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::DbError;
use crate::ledger::{MovementContext, StockLedger};
use crate::pool::Database;
use crate::repository::SaleRepository;
use crate::settings::effective_settings;
use mostrador_core::sale::{
    amount_out_of_range, compute_totals, consolidate_lines, format_sale_number, resolve_tax_rate,
};
use mostrador_core::validation::validate_sale_request;
use mostrador_core::{
    CoreError, CoreResult, CreateSaleRequest, Money, MovementType, Page, Product, Sale,
    SaleDetail, SaleFilter, SaleItem, SaleStatus, DEFAULT_CUSTOMER_NAME,
};

#[derive(Debug, Clone)]
pub struct SaleOrchestrator {
    db: Database,
    ledger: StockLedger,
}

impl SaleOrchestrator {
    pub fn new(db: Database) -> Self {
        SaleOrchestrator {
            ledger: StockLedger::new(db.clone()),
            db,
        }
    }

    /// Creates a completed sale.
    ///
    /// Unit prices come from the catalog at the time of the sale and are
    /// frozen into the line items. Whether tax applies, and at which rate,
    /// comes from the tenant settings unless the request says otherwise.
    ///
    /// ## Errors
    /// - `Validation` for a malformed request, a discount above
    ///   subtotal + tax, or amounts beyond the i64 cent range
    /// - `NotFound` if a product is missing, inactive or owned by another
    ///   tenant
    /// - `InsufficientStock` naming the first product (by id) that lacks
    ///   stock for the total requested across lines
    /// - `Conflict` on a sale number collision
    pub async fn create_sale(
        &self,
        tenant_id: &str,
        actor_id: &str,
        request: CreateSaleRequest,
    ) -> CoreResult<SaleDetail> {
        validate_sale_request(&request)?;

        let demand = consolidate_lines(&request.items);

        debug!(
            tenant_id = %tenant_id,
            lines = request.items.len(),
            products = demand.len(),
            "Creating sale"
        );

        let mut uow = self.db.begin().await?;

        // 1. Lock and check every product before anything is written
        let mut products: HashMap<String, Product> = HashMap::with_capacity(demand.len());
        for wanted in &demand {
            let available = uow
                .inventory()
                .lock_stock(tenant_id, &wanted.product_id)
                .await?
                .ok_or_else(|| CoreError::not_found("Product", &wanted.product_id))?;

            let product = uow
                .products()
                .get(tenant_id, &wanted.product_id)
                .await?
                .filter(|p| p.is_active)
                .ok_or_else(|| CoreError::not_found("Product", &wanted.product_id))?;

            if available < wanted.quantity {
                warn!(
                    tenant_id = %tenant_id,
                    product_id = %product.id,
                    available,
                    requested = wanted.quantity,
                    "Sale rejected: insufficient stock"
                );
                return Err(CoreError::InsufficientStock {
                    product_id: product.id,
                    product_name: product.name,
                    available,
                    requested: wanted.quantity,
                });
            }

            products.insert(product.id.clone(), product);
        }

        // 2. Settings read under the same lock as the stock
        let settings = effective_settings(
            &mut uow.settings(),
            tenant_id,
            self.db.default_tax_rate(),
        )
        .await?;
        let tax_rate = resolve_tax_rate(request.enable_tax, request.tax_rate_bps, &settings);

        // 3. Totals from current catalog prices
        let mut priced = Vec::with_capacity(request.items.len());
        for line in &request.items {
            let product = products
                .get(&line.product_id)
                .ok_or_else(|| CoreError::not_found("Product", &line.product_id))?;
            priced.push((product, line.quantity));
        }
        let totals = compute_totals(
            &priced
                .iter()
                .map(|(p, qty)| (p.sale_price(), *qty))
                .collect::<Vec<_>>(),
            tax_rate,
            Money::from_cents(request.discount_cents),
        )?;

        // 4. Header
        let now = Utc::now();
        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.to_string(),
            user_id: actor_id.to_string(),
            sale_number: format_sale_number(now, &Uuid::new_v4()),
            status: SaleStatus::Completed,
            subtotal_cents: totals.subtotal.cents(),
            tax_cents: totals.tax.cents(),
            tax_rate_bps: tax_rate.map(|r| r.bps() as i64).unwrap_or(0),
            discount_cents: totals.discount.cents(),
            total_cents: totals.total.cents(),
            payment_method: request.payment_method.unwrap_or_default(),
            customer_name: request
                .customer_name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .unwrap_or(DEFAULT_CUSTOMER_NAME)
                .to_string(),
            notes: request.notes.clone(),
            created_at: now,
            cancelled_at: None,
        };
        uow.sales().insert(&sale).await.map_err(|e| match e {
            DbError::UniqueViolation { field, .. } => {
                CoreError::conflict(field, sale.sale_number.as_str())
            }
            other => other.into(),
        })?;

        // 5. Lines in request order, each followed by its debit
        let mut items = Vec::with_capacity(priced.len());
        for (line_number, (product, quantity)) in priced.into_iter().enumerate() {
            let subtotal = product
                .sale_price()
                .checked_mul_quantity(quantity)
                .ok_or_else(|| amount_out_of_range("subtotal_cents"))?;
            let item = SaleItem {
                id: Uuid::new_v4().to_string(),
                sale_id: sale.id.clone(),
                product_id: product.id.clone(),
                name_snapshot: product.name.clone(),
                sku_snapshot: product.sku.clone(),
                category_snapshot: product.category_name.clone(),
                quantity,
                unit_price_cents: product.sale_price_cents,
                subtotal_cents: subtotal.cents(),
                created_at: now,
            };
            uow.sales().insert_item(&item, line_number).await?;

            let ctx = MovementContext::new(tenant_id, &product.id)
                .actor(actor_id)
                .reference(&sale.id);
            self.ledger
                .reserve_and_debit(&mut uow, &ctx, quantity)
                .await?;

            items.push(item);
        }

        // 6.
        uow.commit().await?;

        info!(
            tenant_id = %tenant_id,
            sale_id = %sale.id,
            sale_number = %sale.sale_number,
            total = %sale.total(),
            lines = items.len(),
            "Sale completed"
        );
        Ok(SaleDetail { sale, items })
    }

    /// Cancels a completed sale and returns its stock.
    ///
    /// ## Errors
    /// - `NotFound` if the sale is missing or owned by another tenant
    /// - `AlreadyCancelled` if it was cancelled before (stock untouched)
    pub async fn cancel_sale(
        &self,
        tenant_id: &str,
        actor_id: &str,
        sale_id: &str,
    ) -> CoreResult<SaleDetail> {
        let mut uow = self.db.begin().await?;

        let status = uow
            .sales()
            .lock(tenant_id, sale_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Sale", sale_id))?;
        if !status.can_cancel() {
            warn!(tenant_id = %tenant_id, sale_id = %sale_id, "Sale already cancelled");
            return Err(CoreError::AlreadyCancelled {
                sale_id: sale_id.to_string(),
            });
        }

        let mut items = uow.sales().items(sale_id).await?;
        items.sort_by(|a, b| a.product_id.cmp(&b.product_id));
        for item in &items {
            let ctx = MovementContext::new(tenant_id, &item.product_id)
                .actor(actor_id)
                .reference(sale_id);
            self.ledger
                .credit(&mut uow, &ctx, item.quantity, MovementType::SaleCancel)
                .await?;
        }

        if !uow
            .sales()
            .mark_cancelled(tenant_id, sale_id, Utc::now())
            .await?
        {
            return Err(CoreError::AlreadyCancelled {
                sale_id: sale_id.to_string(),
            });
        }

        let sale = uow
            .sales()
            .get(tenant_id, sale_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Sale", sale_id))?;
        let items = uow.sales().items(sale_id).await?;
        uow.commit().await?;

        info!(
            tenant_id = %tenant_id,
            sale_id = %sale_id,
            lines = items.len(),
            "Sale cancelled"
        );
        Ok(SaleDetail { sale, items })
    }

    /// A sale of the tenant with its line items.
    pub async fn get_sale(&self, tenant_id: &str, sale_id: &str) -> CoreResult<SaleDetail> {
        let mut conn = self.db.acquire().await?;
        let mut sales = SaleRepository::new(&mut conn);

        let sale = sales
            .get(tenant_id, sale_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Sale", sale_id))?;
        let items = sales.items(&sale.id).await?;

        Ok(SaleDetail { sale, items })
    }

    /// Sales of the tenant, newest first.
    pub async fn list_sales(&self, tenant_id: &str, filter: &SaleFilter) -> CoreResult<Vec<Sale>> {
        let mut conn = self.db.acquire().await?;
        let sales = SaleRepository::new(&mut conn)
            .list(tenant_id, filter)
            .await?;
        Ok(sales)
    }

    /// Sales created since midnight UTC, newest first, one page at a time.
    pub async fn sales_today(&self, tenant_id: &str, page: Page) -> CoreResult<Vec<Sale>> {
        let now = Utc::now();
        let midnight = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|t| t.and_utc())
            .unwrap_or(now);

        let filter = SaleFilter {
            from: Some(midnight),
            to: Some(midnight + Duration::days(1)),
            status: None,
            limit: page.limit,
            offset: page.offset,
        };
        self.list_sales(tenant_id, &filter).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
