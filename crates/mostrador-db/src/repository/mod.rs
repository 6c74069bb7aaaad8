//! # Repository Module
//!
//! SQL for each table, behind a small typed API.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Inside a unit of work            Outside (plain reads)                 │
//! │  ─────────────────────            ─────────────────────                 │
//! │  uow.inventory().lock_stock(..)   let mut conn = db.acquire().await?;   │
//! │  uow.sales().insert(..)           ProductRepository::new(&mut conn)     │
//! │       │                                .list(..)                        │
//! │       └───────────────┬───────────────────┘                             │
//! │                       ▼                                                 │
//! │           &mut SqliteConnection (borrowed)                              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A repository borrows a connection instead of owning a pool, so the same
//! query runs inside a transaction or on a pooled connection. Every query
//! filters by `tenant_id`.
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`] - Product rows joined with their stock and category
//! - [`CategoryRepository`] - Product categories
//! - [`InventoryRepository`] - Stock rows, row locks, movement log
//! - [`SaleRepository`] - Sale headers and line items
//! - [`SettingsRepository`] - Per-tenant sale defaults

pub mod category;
pub mod inventory;
pub mod product;
pub mod sale;
pub mod settings;

pub use category::CategoryRepository;
pub use inventory::InventoryRepository;
pub use product::ProductRepository;
pub use sale::SaleRepository;
pub use settings::SettingsRepository;
