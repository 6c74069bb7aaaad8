//! # Mostrador API
//!
//! JSON over HTTP for the mobile client. Handlers only translate: the
//! verified token supplies `(tenant_id, actor_id, role)`, the services in
//! `mostrador-db` do the work, and [`ApiError`] maps the outcome to a
//! status code.
//!
//! ## Routes
//! ```text
//! /api/health                                   GET
//! /api/settings                                 GET  PATCH**
//! /api/categories                               GET  POST*
//! /api/products                                 GET  POST*
//! /api/products/{id}                            GET  PATCH*  DELETE*
//! /api/inventory/low-stock                      GET
//! /api/inventory/summary                        GET
//! /api/inventory/{product_id}/stock             GET
//! /api/inventory/{product_id}/restock           POST*
//! /api/inventory/{product_id}/movements         GET  POST*
//! /api/sales                                    GET  POST
//! /api/sales/today?limit&offset                 GET
//! /api/sales/{id}                               GET
//! /api/sales/{id}/cancel                        POST
//!
//! * admin or manager only
//! ** admin only
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use mostrador_db::Database;

use crate::auth::JwtVerifier;

pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ApiResult};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtVerifier>,
}

impl AppState {
    pub fn new(db: Database, jwt_secret: &str) -> Self {
        AppState {
            db,
            jwt: Arc::new(JwtVerifier::new(jwt_secret)),
        }
    }
}

/// Builds the full router.
pub fn router(state: AppState) -> Router {
    let products = Router::new()
        .route(
            "/",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route(
            "/{id}",
            get(handlers::products::get_product)
                .patch(handlers::products::update_product)
                .delete(handlers::products::deactivate_product),
        );

    let inventory = Router::new()
        .route("/low-stock", get(handlers::inventory::low_stock))
        .route("/summary", get(handlers::inventory::summary))
        .route("/{product_id}/stock", get(handlers::inventory::get_stock))
        .route("/{product_id}/restock", post(handlers::inventory::restock))
        .route(
            "/{product_id}/movements",
            get(handlers::inventory::list_movements).post(handlers::inventory::register_movement),
        );

    let sales = Router::new()
        .route(
            "/",
            get(handlers::sales::list_sales).post(handlers::sales::create_sale),
        )
        .route("/today", get(handlers::sales::sales_today))
        .route("/{id}", get(handlers::sales::get_sale))
        .route("/{id}/cancel", post(handlers::sales::cancel_sale));

    let categories = Router::new().route(
        "/",
        get(handlers::categories::list_categories).post(handlers::categories::create_category),
    );

    let api = Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/settings",
            get(handlers::settings::get_settings).patch(handlers::settings::update_settings),
        )
        .nest("/categories", categories)
        .nest("/products", products)
        .nest("/inventory", inventory)
        .nest("/sales", sales);

    Router::new().nest("/api", api).with_state(state)
}
