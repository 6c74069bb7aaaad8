//! # Seed Data Generator
//!
//! Populates a demo tenant with a corner-shop catalog and a few sales.
//!
//! ## Usage
//! ```bash
//! # Seed ./data/mostrador.db for tenant "demo"
//! cargo run -p mostrador-db --bin seed
//!
//! # Custom database and tenant, with 50 random sales
//! cargo run -p mostrador-db --bin seed -- --db ./dev.db --tenant shop-1 --sales 50
//! ```
//!
//! Products go through the catalog and sales through the orchestrator, so
//! the seeded data has the same movements a real shop would have.

use std::collections::HashMap;
use std::env;

use mostrador_core::{
    CreateSaleRequest, NewCategory, NewProduct, PaymentMethod, ProductFilter, SaleLine,
    SettingsUpdate,
};
use mostrador_db::{Database, DbConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// (SKU prefix, name, sale price cents, cost cents, opening stock)
const CATALOG: &[(&str, &str, i64, i64, i64)] = &[
    ("BEB", "Agua natural 1L", 1500, 800, 48),
    ("BEB", "Refresco de cola 600ml", 2200, 1400, 36),
    ("BEB", "Jugo de naranja 1L", 3800, 2500, 12),
    ("ABA", "Arroz 1kg", 3200, 2100, 20),
    ("ABA", "Frijol negro 1kg", 4100, 2900, 15),
    ("ABA", "Aceite vegetal 1L", 5200, 3900, 10),
    ("ABA", "Azúcar 1kg", 3000, 2000, 18),
    ("PAN", "Pan dulce", 1200, 500, 30),
    ("PAN", "Bolillo", 300, 120, 60),
    ("LAC", "Leche entera 1L", 2900, 2200, 24),
    ("LAC", "Queso fresco 400g", 6500, 4800, 6),
    ("LIM", "Jabón de barra", 1800, 1000, 4),
    ("LIM", "Detergente 1kg", 4500, 3100, 3),
    ("CAF", "Café molido 250g", 8500, 5000, 9),
];

/// (SKU prefix, category name)
const CATEGORIES: &[(&str, &str)] = &[
    ("BEB", "Bebidas"),
    ("ABA", "Abarrotes"),
    ("PAN", "Panadería"),
    ("LAC", "Lácteos"),
    ("LIM", "Limpieza"),
    ("CAF", "Café"),
];

const PAYMENT_METHODS: &[PaymentMethod] =
    &[PaymentMethod::Cash, PaymentMethod::Card, PaymentMethod::Transfer];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./data/mostrador.db");
    let mut tenant_id = String::from("demo");
    let mut sales: usize = 10;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if let Some(value) = args.get(i + 1) {
                    db_path = value.clone();
                    i += 1;
                }
            }
            "--tenant" | "-t" => {
                if let Some(value) = args.get(i + 1) {
                    tenant_id = value.clone();
                    i += 1;
                }
            }
            "--sales" | "-s" => {
                if let Some(value) = args.get(i + 1) {
                    sales = value.parse().unwrap_or(10);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Mostrador Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>       Database file (default: ./data/mostrador.db)");
                println!("  -t, --tenant <ID>     Tenant to seed (default: demo)");
                println!("  -s, --sales <N>       Sales to ring up (default: 10)");
                println!("  -h, --help            Show this help message");
                return Ok(());
            }
            other => warn!(argument = other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    if let Some(parent) = std::path::Path::new(&db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let catalog = db.catalog();

    let existing = catalog
        .list_products(
            &tenant_id,
            &ProductFilter {
                include_inactive: true,
                limit: 1,
                ..Default::default()
            },
        )
        .await?;
    if !existing.is_empty() {
        warn!(tenant_id = %tenant_id, "Tenant already has products, skipping seed");
        return Ok(());
    }

    db.settings()
        .update_settings(
            &tenant_id,
            SettingsUpdate {
                enable_tax: Some(true),
                tax_rate_bps: Some(1600),
            },
        )
        .await?;

    let mut category_ids = HashMap::with_capacity(CATEGORIES.len());
    for (prefix, name) in CATEGORIES {
        let category = catalog
            .create_category(
                &tenant_id,
                NewCategory {
                    name: name.to_string(),
                    description: None,
                },
            )
            .await?;
        category_ids.insert(*prefix, category.id);
    }

    let mut product_ids = Vec::with_capacity(CATALOG.len());
    for (index, (prefix, name, price, cost, stock)) in CATALOG.iter().enumerate() {
        let product = catalog
            .create_product(
                &tenant_id,
                "seed",
                NewProduct {
                    sku: Some(format!("{prefix}-{:03}", index + 1)),
                    name: name.to_string(),
                    description: None,
                    category_id: category_ids.get(prefix).cloned(),
                    cost_price_cents: *cost,
                    sale_price_cents: *price,
                    min_stock: None,
                    initial_stock: *stock,
                },
            )
            .await?;
        product_ids.push(product.id);
    }
    info!(count = product_ids.len(), "Products created");

    let orchestrator = db.sales();
    let mut completed = 0;
    for n in 0..sales {
        let first = n % product_ids.len();
        let second = (n * 7 + 3) % product_ids.len();
        let request = CreateSaleRequest {
            items: vec![
                SaleLine {
                    product_id: product_ids[first].clone(),
                    quantity: 1 + (n % 3) as i64,
                },
                SaleLine {
                    product_id: product_ids[second].clone(),
                    quantity: 1,
                },
            ],
            payment_method: Some(PAYMENT_METHODS[n % PAYMENT_METHODS.len()]),
            // Every other sale opts out of the tenant's 16% tax
            enable_tax: (n % 2 == 1).then_some(false),
            ..Default::default()
        };

        match orchestrator.create_sale(&tenant_id, "seed", request).await {
            Ok(_) => completed += 1,
            // Small opening stocks run out; that is expected here
            Err(e) => warn!(error = %e, "Sale skipped"),
        }
    }
    info!(completed, requested = sales, "Sales created");

    let low = db.ledger().low_stock(&tenant_id).await?;
    info!(low_stock = low.len(), "Seed complete");

    db.close().await;
    Ok(())
}
