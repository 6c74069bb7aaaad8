//! # mostrador-db: Storage and Transactions for Mostrador
//!
//! SQLite storage, the unit of work, and the two services that own the
//! hard invariants: the [`StockLedger`] and the [`SaleOrchestrator`].
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Mostrador Data Flow                              │
//! │                                                                         │
//! │  apps/api handler (POST /api/sales)                                    │
//! │       │  (tenant_id, actor_id) from the verified token                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  mostrador-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────────┐  ┌──────────────┐  ┌──────────────────┐   │   │
//! │  │   │SaleOrchestrator│─►│ StockLedger  │  │     Catalog      │   │   │
//! │  │   └───────┬────────┘  └──────┬───────┘  └────────┬─────────┘   │   │
//! │  │           └──────────┬───────┴───────────────────┘             │   │
//! │  │                      ▼                                          │   │
//! │  │   ┌────────────────────────┐   ┌──────────────────────────┐    │   │
//! │  │   │ UnitOfWork (one tx)    │──►│ Repositories (SQL)       │    │   │
//! │  │   └───────────┬────────────┘   └──────────────────────────┘    │   │
//! │  │               │                                                 │   │
//! │  │   ┌───────────▼────────────┐   ┌──────────────────────────┐    │   │
//! │  │   │ Database (pool.rs)     │   │ Migrations (embedded)    │    │   │
//! │  │   └────────────────────────┘   └──────────────────────────┘    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (WAL) ./data/mostrador.db                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool and session factory
//! - [`unit_of_work`] - Explicit transaction boundary
//! - [`ledger`] - Stock ledger
//! - [`orchestrator`] - Sale creation and cancellation
//! - [`catalog`] - Product management
//! - [`repository`] - SQL per table
//! - [`migrations`] - Embedded schema
//! - [`error`] - Storage errors and their mapping to `CoreError`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mostrador_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./data/mostrador.db")).await?;
//!
//! let sale = db.sales().create_sale(&tenant_id, &user_id, request).await?;
//! let stock = db.ledger().get_current_stock(&tenant_id, &product_id).await?;
//! ```
//!
//! Every public service method returns `Result<T, CoreError>`.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod ledger;
pub mod migrations;
pub mod orchestrator;
pub mod pool;
pub mod repository;
pub mod settings;
pub mod unit_of_work;

// =============================================================================
// Re-exports
// =============================================================================

pub use catalog::Catalog;
pub use error::{DbError, DbResult};
pub use ledger::{MovementContext, StockLedger};
pub use orchestrator::SaleOrchestrator;
pub use pool::{Database, DbConfig};
pub use settings::SettingsService;
pub use unit_of_work::UnitOfWork;
