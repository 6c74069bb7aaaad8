//! # mostrador-core: Pure Business Logic for Mostrador
//!
//! This crate is the **heart** of Mostrador. It contains the business rules
//! of the sale and inventory ledger as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Mostrador Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Mobile Client                                │   │
//! │  │    Products ──► Inventory ──► New Sale ──► Sales History        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTPS + JWT                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/api (axum)                              │   │
//! │  │    POST /sales, POST /sales/{id}/cancel, /inventory, ...        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          mostrador-db (Unit of Work, Ledger, Sales)             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ uses                                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ mostrador-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   sale    │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │  totals   │  │   rules   │  │   │
//! │  │   │   Sale    │  │  TaxRate  │  │ lock plan │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, InventoryMovement, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`sale`] - Sale request planning: line consolidation, lock order, totals
//! - [`error`] - Domain error taxonomy
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use mostrador_core::money::Money;
//! use mostrador_core::sale::compute_totals;
//! use mostrador_core::types::TaxRate;
//!
//! // Two units at $20.00, 10% tax, $1.00 off
//! let lines = [(Money::from_cents(2000), 2)];
//! let totals = compute_totals(&lines, Some(TaxRate::from_bps(1000)), Money::from_cents(100)).unwrap();
//!
//! assert_eq!(totals.subtotal.cents(), 4000);
//! assert_eq!(totals.tax.cents(), 400);
//! assert_eq!(totals.total.cents(), 4300);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod sale;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ErrorCategory, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of lines allowed in a single sale request.
///
/// ## Business Reason
/// Prevents runaway requests and keeps each unit of work short, since the
/// write lock is held for the whole sale.
pub const MAX_SALE_LINES: usize = 100;

/// Maximum quantity of a single line in a sale.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Largest price accepted for a product, in cents ($100,000,000.00).
///
/// Together with [`MAX_STOCK_QUANTITY`] this keeps every line subtotal,
/// sale total and stock valuation inside i64 cents.
pub const MAX_PRICE_CENTS: i64 = 10_000_000_000;

/// Largest stock level a product may hold, and the largest single movement.
pub const MAX_STOCK_QUANTITY: i64 = 100_000_000;

/// Minimum-stock threshold used when a product is created without one.
pub const DEFAULT_MIN_STOCK: i64 = 5;

/// Customer name recorded when a sale is created without one.
pub const DEFAULT_CUSTOMER_NAME: &str = "General Customer";
