//! Racing units of work against a file-backed database with several
//! connections.

use std::time::Duration;

use mostrador_core::{CoreError, CreateSaleRequest, MovementType, NewProduct, SaleLine};
use mostrador_db::{Database, DbConfig};
use tempfile::TempDir;

const TENANT: &str = "tenant-a";

async fn file_db() -> (TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let config = DbConfig::new(dir.path().join("race.db"))
        .max_connections(8)
        .busy_timeout(Duration::from_secs(15));
    let db = Database::new(config).await.unwrap();
    (dir, db)
}

async fn product(db: &Database, name: &str, stock: i64) -> String {
    db.catalog()
        .create_product(
            TENANT,
            "admin",
            NewProduct {
                name: name.to_string(),
                sale_price_cents: 1000,
                initial_stock: stock,
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .id
}

fn request(lines: &[(&str, i64)]) -> CreateSaleRequest {
    CreateSaleRequest {
        items: lines
            .iter()
            .map(|(id, qty)| SaleLine {
                product_id: id.to_string(),
                quantity: *qty,
            })
            .collect(),
        ..Default::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn two_sales_exceeding_stock_exactly_one_wins() {
    let (_dir, db) = file_db().await;
    let p = product(&db, "Product P", 5).await;

    let mut handles = Vec::new();
    for cashier in ["cashier-1", "cashier-2"] {
        let db = db.clone();
        let p = p.clone();
        handles.push(tokio::spawn(async move {
            db.sales()
                .create_sale(TENANT, cashier, request(&[(&p, 3)]))
                .await
        }));
    }

    let mut ok = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => ok += 1,
            Err(CoreError::InsufficientStock {
                available,
                requested,
                ..
            }) => {
                // Observed the stock left by the winner, not the stale 5
                assert_eq!(available, 2);
                assert_eq!(requested, 3);
                rejected += 1;
            }
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!((ok, rejected), (1, 1));
    assert_eq!(db.ledger().get_current_stock(TENANT, &p).await.unwrap(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn many_racing_sales_never_oversell() {
    let (_dir, db) = file_db().await;
    let p = product(&db, "Product P", 7).await;

    let handles: Vec<_> = (0..12)
        .map(|i| {
            let db = db.clone();
            let p = p.clone();
            tokio::spawn(async move {
                db.sales()
                    .create_sale(TENANT, &format!("cashier-{i}"), request(&[(&p, 1)]))
                    .await
            })
        })
        .collect();

    let mut ok = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => ok += 1,
            Err(CoreError::InsufficientStock { available: 0, .. }) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(ok, 7);
    assert_eq!(db.ledger().get_current_stock(TENANT, &p).await.unwrap(), 0);

    let history = db
        .ledger()
        .movement_history(TENANT, &p, 100, 0)
        .await
        .unwrap();
    let sales = history
        .iter()
        .filter(|m| m.movement_type == MovementType::Sale)
        .count();
    assert_eq!(sales, 7);
    assert!(history.iter().all(|m| m.new_stock >= 0));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn opposite_line_order_does_not_deadlock() {
    let (_dir, db) = file_db().await;
    let a = product(&db, "Product A", 50).await;
    let b = product(&db, "Product B", 50).await;

    let mut handles = Vec::new();
    for i in 0..10 {
        let db = db.clone();
        let lines = if i % 2 == 0 {
            vec![(a.clone(), 1), (b.clone(), 2)]
        } else {
            vec![(b.clone(), 2), (a.clone(), 1)]
        };
        handles.push(tokio::spawn(async move {
            let lines: Vec<(&str, i64)> = lines.iter().map(|(id, q)| (id.as_str(), *q)).collect();
            db.sales().create_sale(TENANT, "cashier", request(&lines)).await
        }));
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(db.ledger().get_current_stock(TENANT, &a).await.unwrap(), 40);
    assert_eq!(db.ledger().get_current_stock(TENANT, &b).await.unwrap(), 30);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_cancellations_credit_once() {
    let (_dir, db) = file_db().await;
    let p = product(&db, "Product P", 10).await;
    let sale = db
        .sales()
        .create_sale(TENANT, "cashier", request(&[(&p, 4)]))
        .await
        .unwrap()
        .sale;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let db = db.clone();
            let sale_id = sale.id.clone();
            tokio::spawn(async move { db.sales().cancel_sale(TENANT, "manager", &sale_id).await })
        })
        .collect();

    let mut cancelled = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => cancelled += 1,
            Err(CoreError::AlreadyCancelled { .. }) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(cancelled, 1);
    assert_eq!(db.ledger().get_current_stock(TENANT, &p).await.unwrap(), 10);
}
