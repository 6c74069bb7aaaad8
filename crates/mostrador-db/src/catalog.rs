//! # Product Catalog
//!
//! Tenant-scoped product and category management. A product and its stock
//! row are always created together, so the ledger can rely on the stock
//! row existing for every product.
//!
//! A product's category must belong to the product's tenant; an id from
//! another tenant is reported exactly like one that does not exist.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::DbError;
use crate::ledger::{MovementContext, StockLedger};
use crate::pool::Database;
use crate::repository::{CategoryRepository, ProductRepository};
use crate::unit_of_work::UnitOfWork;
use mostrador_core::validation::{
    validate_new_category, validate_new_product, validate_product_update, validate_search_query,
};
use mostrador_core::{
    Category, CoreError, CoreResult, MovementType, NewCategory, NewProduct, Product,
    ProductFilter, ProductUpdate, DEFAULT_MIN_STOCK,
};

const INITIAL_STOCK_NOTE: &str = "Initial stock";

#[derive(Debug, Clone)]
pub struct Catalog {
    db: Database,
}

/// Duplicate SKUs surface as a conflict naming the SKU.
fn sku_conflict(sku: Option<&str>) -> impl FnOnce(DbError) -> CoreError + '_ {
    move |err| match err {
        DbError::UniqueViolation { field, .. } => {
            CoreError::conflict(field, sku.unwrap_or_default())
        }
        other => other.into(),
    }
}

/// Resolves a category id within the tenant, or `NotFound`.
///
/// Opens the unit of work with the category row lock.
async fn require_category(
    uow: &mut UnitOfWork,
    tenant_id: &str,
    category_id: &str,
) -> CoreResult<Category> {
    uow.categories()
        .lock(tenant_id, category_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Category", category_id))
}

impl Catalog {
    pub fn new(db: Database) -> Self {
        Catalog { db }
    }

    /// Creates a category.
    ///
    /// ## Errors
    /// - `Validation` for a blank or overlong name
    /// - `Conflict` if the name already exists in the tenant
    pub async fn create_category(
        &self,
        tenant_id: &str,
        new_category: NewCategory,
    ) -> CoreResult<Category> {
        validate_new_category(&new_category)?;

        let category = Category {
            id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.to_string(),
            name: new_category.name.trim().to_string(),
            description: new_category.description,
            created_at: Utc::now(),
        };

        let mut uow = self.db.begin().await?;
        uow.categories()
            .insert(&category)
            .await
            .map_err(|err| match err {
                DbError::UniqueViolation { field, .. } => {
                    CoreError::conflict(field, category.name.as_str())
                }
                other => other.into(),
            })?;
        uow.commit().await?;

        info!(tenant_id = %tenant_id, category_id = %category.id, "Category created");
        Ok(category)
    }

    pub async fn list_categories(&self, tenant_id: &str) -> CoreResult<Vec<Category>> {
        let mut conn = self.db.acquire().await?;
        let categories = CategoryRepository::new(&mut conn).list(tenant_id).await?;
        Ok(categories)
    }

    /// Creates a product with its stock row.
    ///
    /// A positive `initial_stock` is recorded as a `RESTOCK` movement in
    /// the same unit of work.
    ///
    /// ## Errors
    /// - `Validation` for bad name, SKU, prices or stock values
    /// - `NotFound` if `category_id` is not a category of the tenant
    /// - `Conflict` if the SKU already exists in the tenant
    pub async fn create_product(
        &self,
        tenant_id: &str,
        actor_id: &str,
        new_product: NewProduct,
    ) -> CoreResult<Product> {
        validate_new_product(&new_product)?;

        let mut uow = self.db.begin().await?;
        let category = match new_product.category_id.as_deref().map(str::trim) {
            Some(category_id) => Some(require_category(&mut uow, tenant_id, category_id).await?),
            None => None,
        };

        let now = Utc::now();
        let sku = new_product.sku.as_deref().map(str::trim).map(str::to_string);
        let mut product = Product {
            id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.to_string(),
            sku,
            name: new_product.name.trim().to_string(),
            description: new_product.description,
            category_id: category.as_ref().map(|c| c.id.clone()),
            category_name: category.map(|c| c.name),
            cost_price_cents: new_product.cost_price_cents,
            sale_price_cents: new_product.sale_price_cents,
            min_stock: new_product.min_stock.unwrap_or(DEFAULT_MIN_STOCK),
            is_active: true,
            current_stock: 0,
            created_at: now,
            updated_at: now,
        };

        uow.products()
            .insert(&product)
            .await
            .map_err(sku_conflict(product.sku.as_deref()))?;
        uow.inventory().insert(tenant_id, &product.id, now).await?;

        if new_product.initial_stock > 0 {
            let ctx = MovementContext::new(tenant_id, &product.id)
                .actor(actor_id)
                .notes(Some(INITIAL_STOCK_NOTE));
            let movement = StockLedger::new(self.db.clone())
                .credit(&mut uow, &ctx, new_product.initial_stock, MovementType::Restock)
                .await?;
            product.current_stock = movement.new_stock;
        }

        uow.commit().await?;

        info!(
            tenant_id = %tenant_id,
            product_id = %product.id,
            initial_stock = product.current_stock,
            "Product created"
        );
        Ok(product)
    }

    /// Gets a product of the tenant, active or not.
    pub async fn get_product(&self, tenant_id: &str, id: &str) -> CoreResult<Product> {
        let mut conn = self.db.acquire().await?;
        ProductRepository::new(&mut conn)
            .get(tenant_id, id)
            .await?
            .ok_or_else(|| CoreError::not_found("Product", id))
    }

    pub async fn list_products(
        &self,
        tenant_id: &str,
        filter: &ProductFilter,
    ) -> CoreResult<Vec<Product>> {
        let search = validate_search_query(&filter.search)?;

        let mut conn = self.db.acquire().await?;
        let products = ProductRepository::new(&mut conn)
            .list(
                tenant_id,
                &search,
                filter.category_id.as_deref(),
                filter.include_inactive,
                filter.limit,
                filter.offset,
            )
            .await?;
        Ok(products)
    }

    /// Updates the given fields of a product.
    ///
    /// An empty `sku`, `description` or `category_id` clears it. Existing
    /// sales keep the prices and names they were sold with.
    pub async fn update_product(
        &self,
        tenant_id: &str,
        id: &str,
        update: ProductUpdate,
    ) -> CoreResult<Product> {
        validate_product_update(&update)?;

        let mut uow = self.db.begin().await?;
        if let Some(category_id) = update
            .category_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
        {
            require_category(&mut uow, tenant_id, category_id).await?;
        }
        let updated = uow
            .products()
            .update(tenant_id, id, &update, Utc::now())
            .await
            .map_err(sku_conflict(update.sku.as_deref()))?;
        if !updated {
            return Err(CoreError::not_found("Product", id));
        }

        let product = uow
            .products()
            .get(tenant_id, id)
            .await?
            .ok_or_else(|| CoreError::not_found("Product", id))?;
        uow.commit().await?;

        info!(tenant_id = %tenant_id, product_id = %id, "Product updated");
        Ok(product)
    }

    /// Soft delete: the product can no longer be sold, its history stays.
    pub async fn deactivate_product(&self, tenant_id: &str, id: &str) -> CoreResult<Product> {
        let product = self
            .update_product(
                tenant_id,
                id,
                ProductUpdate {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .inspect_err(|e| warn!(product_id = %id, error = %e, "Deactivation failed"))?;

        info!(tenant_id = %tenant_id, product_id = %id, "Product deactivated");
        Ok(product)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::DbConfig;

    const TENANT: &str = "tenant-a";
    const ACTOR: &str = "user-1";

    fn coffee() -> NewProduct {
        NewProduct {
            sku: Some("CAFE-250".to_string()),
            name: "Café 250g".to_string(),
            sale_price_cents: 8500,
            cost_price_cents: 5000,
            ..Default::default()
        }
    }

    async fn setup() -> Catalog {
        Database::new(DbConfig::in_memory()).await.unwrap().catalog()
    }

    #[tokio::test]
    async fn test_create_product_with_defaults() {
        let catalog = setup().await;
        let product = catalog.create_product(TENANT, ACTOR, coffee()).await.unwrap();

        assert!(product.is_active);
        assert_eq!(product.min_stock, DEFAULT_MIN_STOCK);
        assert_eq!(product.current_stock, 0);

        let fetched = catalog.get_product(TENANT, &product.id).await.unwrap();
        assert_eq!(fetched.sku.as_deref(), Some("CAFE-250"));
        assert_eq!(fetched.current_stock, 0);
    }

    #[tokio::test]
    async fn test_initial_stock_is_a_restock_movement() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = db
            .catalog()
            .create_product(
                TENANT,
                ACTOR,
                NewProduct {
                    initial_stock: 12,
                    ..coffee()
                },
            )
            .await
            .unwrap();
        assert_eq!(product.current_stock, 12);

        let history = db
            .ledger()
            .movement_history(TENANT, &product.id, 10, 0)
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].movement_type, MovementType::Restock);
        assert_eq!(history[0].previous_stock, 0);
        assert_eq!(history[0].new_stock, 12);
        assert_eq!(history[0].actor_id.as_deref(), Some(ACTOR));
    }

    #[tokio::test]
    async fn test_duplicate_sku_is_a_conflict_within_tenant_only() {
        let catalog = setup().await;
        catalog.create_product(TENANT, ACTOR, coffee()).await.unwrap();

        let err = catalog
            .create_product(TENANT, ACTOR, coffee())
            .await
            .unwrap_err();
        assert!(
            matches!(err, CoreError::Conflict { ref field, ref value } if field == "sku" && value == "CAFE-250")
        );

        // Same SKU under another tenant is fine
        catalog.create_product("tenant-b", ACTOR, coffee()).await.unwrap();

        // Products without SKU never collide
        for _ in 0..2 {
            catalog
                .create_product(
                    TENANT,
                    ACTOR,
                    NewProduct {
                        sku: None,
                        ..coffee()
                    },
                )
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_invalid_product_is_rejected() {
        let catalog = setup().await;
        let err = catalog
            .create_product(
                TENANT,
                ACTOR,
                NewProduct {
                    sale_price_cents: 0,
                    ..coffee()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(catalog
            .list_products(TENANT, &ProductFilter::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_list_search_and_inactive_filter() {
        let catalog = setup().await;
        let coffee = catalog.create_product(TENANT, ACTOR, coffee()).await.unwrap();
        catalog
            .create_product(
                TENANT,
                ACTOR,
                NewProduct {
                    sku: Some("PAN-01".to_string()),
                    name: "Pan dulce".to_string(),
                    sale_price_cents: 1200,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let all = catalog
            .list_products(TENANT, &ProductFilter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Café 250g");

        let filter = ProductFilter {
            search: "pan".to_string(),
            ..Default::default()
        };
        let found = catalog.list_products(TENANT, &filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].sku.as_deref(), Some("PAN-01"));

        catalog.deactivate_product(TENANT, &coffee.id).await.unwrap();
        let active = catalog
            .list_products(TENANT, &ProductFilter::default())
            .await
            .unwrap();
        assert_eq!(active.len(), 1);

        let everything = ProductFilter {
            include_inactive: true,
            ..Default::default()
        };
        assert_eq!(catalog.list_products(TENANT, &everything).await.unwrap().len(), 2);
        assert!(catalog
            .list_products("tenant-b", &everything)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_update_product() {
        let catalog = setup().await;
        let product = catalog.create_product(TENANT, ACTOR, coffee()).await.unwrap();

        let updated = catalog
            .update_product(
                TENANT,
                &product.id,
                ProductUpdate {
                    sale_price_cents: Some(9000),
                    min_stock: Some(2),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.sale_price_cents, 9000);
        assert_eq!(updated.min_stock, 2);
        assert_eq!(updated.name, product.name);

        let err = catalog
            .update_product(
                "tenant-b",
                &product.id,
                ProductUpdate {
                    sale_price_cents: Some(1),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
        assert_eq!(
            catalog.get_product(TENANT, &product.id).await.unwrap().sale_price_cents,
            9000
        );
    }

    #[tokio::test]
    async fn test_update_to_existing_sku_conflicts() {
        let catalog = setup().await;
        catalog.create_product(TENANT, ACTOR, coffee()).await.unwrap();
        let other = catalog
            .create_product(
                TENANT,
                ACTOR,
                NewProduct {
                    sku: Some("CAFE-500".to_string()),
                    ..coffee()
                },
            )
            .await
            .unwrap();

        let err = catalog
            .update_product(
                TENANT,
                &other.id,
                ProductUpdate {
                    sku: Some("CAFE-250".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_optional_fields_can_be_cleared() {
        let catalog = setup().await;
        let product = catalog
            .create_product(
                TENANT,
                ACTOR,
                NewProduct {
                    description: Some("Tostado medio".to_string()),
                    ..coffee()
                },
            )
            .await
            .unwrap();

        // Absent fields are kept
        let kept = catalog
            .update_product(
                TENANT,
                &product.id,
                ProductUpdate {
                    min_stock: Some(1),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(kept.sku.as_deref(), Some("CAFE-250"));
        assert_eq!(kept.description.as_deref(), Some("Tostado medio"));

        let cleared = catalog
            .update_product(
                TENANT,
                &product.id,
                ProductUpdate {
                    sku: Some(String::new()),
                    description: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(cleared.sku, None);
        assert_eq!(cleared.description, None);

        // The freed SKU can be taken by another product
        catalog.create_product(TENANT, ACTOR, coffee()).await.unwrap();
    }

    #[tokio::test]
    async fn test_categories_are_tenant_scoped() {
        let catalog = setup().await;
        let drinks = catalog
            .create_category(
                TENANT,
                NewCategory {
                    name: "Bebidas".to_string(),
                    description: None,
                },
            )
            .await
            .unwrap();
        let bakery = catalog
            .create_category(
                TENANT,
                NewCategory {
                    name: " Panadería ".to_string(),
                    description: Some("Pan del día".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(bakery.name, "Panadería");

        let err = catalog
            .create_category(
                TENANT,
                NewCategory {
                    name: "Bebidas".to_string(),
                    description: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Conflict { ref field, .. } if field == "name"));

        let foreign = catalog
            .create_category(
                "tenant-b",
                NewCategory {
                    name: "Bebidas".to_string(),
                    description: None,
                },
            )
            .await
            .unwrap();

        let names: Vec<_> = catalog
            .list_categories(TENANT)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Bebidas", "Panadería"]);

        let err = catalog
            .create_product(
                TENANT,
                ACTOR,
                NewProduct {
                    category_id: Some(foreign.id.clone()),
                    ..coffee()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { ref entity, .. } if entity == "Category"));

        let product = catalog
            .create_product(
                TENANT,
                ACTOR,
                NewProduct {
                    category_id: Some(drinks.id.clone()),
                    ..coffee()
                },
            )
            .await
            .unwrap();
        assert_eq!(product.category_name.as_deref(), Some("Bebidas"));

        let err = catalog
            .update_product(
                TENANT,
                &product.id,
                ProductUpdate {
                    category_id: Some(foreign.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));

        let moved = catalog
            .update_product(
                TENANT,
                &product.id,
                ProductUpdate {
                    category_id: Some(bakery.id.clone()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(moved.category_id.as_deref(), Some(bakery.id.as_str()));
        assert_eq!(moved.category_name.as_deref(), Some("Panadería"));
    }

    #[tokio::test]
    async fn test_list_by_category() {
        let catalog = setup().await;
        let drinks = catalog
            .create_category(
                TENANT,
                NewCategory {
                    name: "Bebidas".to_string(),
                    description: None,
                },
            )
            .await
            .unwrap();
        catalog
            .create_product(
                TENANT,
                ACTOR,
                NewProduct {
                    sku: Some("AGUA-1L".to_string()),
                    name: "Agua 1L".to_string(),
                    category_id: Some(drinks.id.clone()),
                    sale_price_cents: 1500,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        catalog.create_product(TENANT, ACTOR, coffee()).await.unwrap();

        let filter = ProductFilter {
            category_id: Some(drinks.id.clone()),
            ..Default::default()
        };
        let found = catalog.list_products(TENANT, &filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Agua 1L");
        assert_eq!(found[0].category_name.as_deref(), Some("Bebidas"));

        assert_eq!(
            catalog
                .list_products(TENANT, &ProductFilter::default())
                .await
                .unwrap()
                .len(),
            2
        );
    }
}
