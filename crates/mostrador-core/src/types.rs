//! # Domain Types
//!
//! Core domain types used throughout Mostrador.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────────┐   │
//! │  │    Product      │   │      Sale       │   │ InventoryMovement   │   │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────────  │   │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  product_id         │   │
//! │  │  tenant_id      │   │  sale_number    │   │  quantity (signed)  │   │
//! │  │  sku (optional) │   │  status         │   │  previous_stock     │   │
//! │  │  sale_price     │   │  total_cents    │   │  new_stock          │   │
//! │  │  current_stock  │   │  items[]        │   │  movement_type      │   │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────────┘   │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────────┐   │
//! │  │    TaxRate      │   │   SaleStatus    │   │   MovementType      │   │
//! │  │  bps (u32)      │   │  Completed      │   │  RESTOCK  SALE      │   │
//! │  │  825 = 8.25%    │   │  Cancelled      │   │  SALE_CANCEL MANUAL │   │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Tenancy
//! Every persisted type carries `tenant_id`. It is always taken from the
//! verified identity of the caller, never from a request body, which is why
//! none of the request types below have a tenant field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 1600 bps = 16%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product in a tenant's catalog, joined with its inventory row.
///
/// Identity (`id`, `tenant_id`) never changes; prices, SKU and the active
/// flag are mutable. Historical sales keep their own price snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub tenant_id: String,
    /// Stock Keeping Unit, unique per tenant when present.
    pub sku: Option<String>,
    pub name: String,
    pub description: Option<String>,
    /// Category of the same tenant, if any.
    pub category_id: Option<String>,
    /// Name of `category_id`, joined on read.
    pub category_name: Option<String>,
    /// Purchase cost in cents (for margin reporting).
    pub cost_price_cents: i64,
    /// Current selling price in cents.
    pub sale_price_cents: i64,
    /// Stock at or below this level counts as low stock.
    pub min_stock: i64,
    /// Inactive products cannot be sold (soft delete).
    pub is_active: bool,
    /// Current stock from the product's inventory row.
    pub current_stock: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the sale price as Money.
    #[inline]
    pub fn sale_price(&self) -> Money {
        Money::from_cents(self.sale_price_cents)
    }

    /// Stock level classification for the inventory screen.
    pub fn stock_level(&self) -> StockLevel {
        StockLevel::classify(self.current_stock, self.min_stock)
    }
}

/// Input for creating a product.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub sku: Option<String>,
    pub name: String,
    pub description: Option<String>,
    /// Must name a category of the same tenant.
    pub category_id: Option<String>,
    #[serde(default)]
    pub cost_price_cents: i64,
    pub sale_price_cents: i64,
    /// Defaults to [`crate::DEFAULT_MIN_STOCK`].
    pub min_stock: Option<i64>,
    /// Opening stock, recorded as a RESTOCK movement.
    #[serde(default)]
    pub initial_stock: i64,
}

/// Partial update of a product. `None` leaves the field unchanged.
///
/// The optional text fields (`sku`, `description`, `category_id`) are
/// cleared by sending an empty string.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductUpdate {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<String>,
    pub cost_price_cents: Option<i64>,
    pub sale_price_cents: Option<i64>,
    pub min_stock: Option<i64>,
    pub is_active: Option<bool>,
}

/// Catalog listing filter.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductFilter {
    /// Substring matched against name and SKU.
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub include_inactive: bool,
    /// Only products of this category.
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default = "default_page_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

impl Default for ProductFilter {
    fn default() -> Self {
        ProductFilter {
            search: String::new(),
            include_inactive: false,
            category_id: None,
            limit: default_page_limit(),
            offset: 0,
        }
    }
}

/// Offset pagination for listings without other filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Page {
    #[serde(default = "default_page_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

impl Default for Page {
    fn default() -> Self {
        Page {
            limit: default_page_limit(),
            offset: 0,
        }
    }
}

fn default_page_limit() -> u32 {
    20
}

// =============================================================================
// Categories
// =============================================================================

/// A product grouping, unique by name within a tenant.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub description: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
}

// =============================================================================
// Tenant Settings
// =============================================================================

/// Per-tenant sale defaults.
///
/// A tenant that never saved settings gets [`TenantSettings::unsaved`]:
/// tax disabled, at the server's default rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TenantSettings {
    pub tenant_id: String,
    /// Whether sales are taxed when the request does not say.
    pub enable_tax: bool,
    /// Rate used when a taxed sale does not give one.
    pub tax_rate_bps: u32,
    #[ts(as = "Option<String>")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TenantSettings {
    pub fn unsaved(tenant_id: &str, default_rate: TaxRate) -> Self {
        TenantSettings {
            tenant_id: tenant_id.to_string(),
            enable_tax: false,
            tax_rate_bps: default_rate.bps(),
            updated_at: None,
        }
    }

    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }
}

/// Partial settings update. `None` keeps the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SettingsUpdate {
    pub enable_tax: Option<bool>,
    pub tax_rate_bps: Option<u32>,
}

// =============================================================================
// Inventory
// =============================================================================

/// The authoritative stock row of a product (one-to-one).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct InventoryRecord {
    pub product_id: String,
    pub tenant_id: String,
    /// Never negative.
    pub current_stock: i64,
    #[ts(as = "String")]
    pub last_updated: DateTime<Utc>,
}

/// Cause of a stock change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    /// Goods received.
    Restock,
    /// Debit caused by a sale.
    Sale,
    /// Compensating credit for a cancelled sale.
    SaleCancel,
    /// Ad-hoc adjustment (count correction, breakage, ...).
    Manual,
}

impl MovementType {
    /// Column value as stored in `inventory_movements.movement_type`.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MovementType::Restock => "RESTOCK",
            MovementType::Sale => "SALE",
            MovementType::SaleCancel => "SALE_CANCEL",
            MovementType::Manual => "MANUAL",
        }
    }
}

/// An append-only ledger entry recording one stock change.
///
/// `new_stock == previous_stock + quantity` always holds.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct InventoryMovement {
    pub id: String,
    pub tenant_id: String,
    pub product_id: String,
    pub movement_type: MovementType,
    /// Signed delta: negative for debits.
    pub quantity: i64,
    pub previous_stock: i64,
    pub new_stock: i64,
    /// Originating sale, for SALE and SALE_CANCEL movements.
    pub reference_id: Option<String>,
    pub notes: Option<String>,
    /// User who caused the movement.
    pub actor_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Stock level bucket shown next to each product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    /// At or below the minimum.
    Low,
    /// Up to twice the minimum.
    Medium,
    High,
}

impl StockLevel {
    pub fn classify(current_stock: i64, min_stock: i64) -> Self {
        if current_stock <= min_stock {
            StockLevel::Low
        } else if current_stock <= min_stock.saturating_mul(2) {
            StockLevel::Medium
        } else {
            StockLevel::High
        }
    }
}

/// One row of the inventory summary.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventoryStatus {
    pub product_id: String,
    pub name: String,
    pub sku: Option<String>,
    pub current_stock: i64,
    pub min_stock: i64,
    /// current_stock × sale price.
    pub stock_value_cents: i64,
    pub level: StockLevel,
}

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a sale.
///
/// ```text
///  create_sale ──► Completed ──cancel_sale──► Cancelled (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    Completed,
    Cancelled,
}

impl SaleStatus {
    /// Whether the `completed → cancelled` transition is allowed.
    #[inline]
    pub const fn can_cancel(&self) -> bool {
        matches!(self, SaleStatus::Completed)
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    Transfer,
}

// =============================================================================
// Sale
// =============================================================================

/// A sale header.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub tenant_id: String,
    /// User who rang up the sale.
    pub user_id: String,
    /// Human-facing identifier, unique per tenant.
    pub sale_number: String,
    pub status: SaleStatus,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    /// Rate the tax was computed with (0 when tax was disabled).
    pub tax_rate_bps: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    pub customer_name: String,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale.
/// Uses the snapshot pattern: name, SKU and unit price are frozen at sale
/// time, so later catalog edits never rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    /// SKU at time of sale (frozen).
    pub sku_snapshot: Option<String>,
    /// Category name at time of sale (frozen).
    pub category_snapshot: Option<String>,
    pub quantity: i64,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// unit_price × quantity.
    pub subtotal_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A sale together with its line items, in insertion order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleDetail {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

// =============================================================================
// Sale Requests
// =============================================================================

/// One requested line: which product and how many.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleLine {
    pub product_id: String,
    pub quantity: i64,
}

/// A multi-line sale request as submitted by the client.
///
/// Prices are never part of the request: unit prices are read from the
/// catalog inside the unit of work.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateSaleRequest {
    pub items: Vec<SaleLine>,
    pub payment_method: Option<PaymentMethod>,
    pub customer_name: Option<String>,
    pub notes: Option<String>,
    /// Overrides the tenant's `enable_tax` setting for this sale.
    pub enable_tax: Option<bool>,
    /// Used when tax applies; falls back to the tenant's rate.
    pub tax_rate_bps: Option<u32>,
    /// Absolute discount in cents, applied after tax.
    #[serde(default)]
    pub discount_cents: i64,
}

/// Sale listing filter (newest first).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleFilter {
    /// Inclusive lower bound on `created_at`.
    #[ts(as = "Option<String>")]
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `created_at`.
    #[ts(as = "Option<String>")]
    pub to: Option<DateTime<Utc>>,
    pub status: Option<SaleStatus>,
    #[serde(default = "default_page_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

impl Default for SaleFilter {
    fn default() -> Self {
        SaleFilter {
            from: None,
            to: None,
            status: None,
            limit: default_page_limit(),
            offset: 0,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
