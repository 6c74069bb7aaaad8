//! # Category Repository
//!
//! Product categories of a tenant. Names are unique per tenant.

use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;
use mostrador_core::Category;

const CATEGORY_COLUMNS: &str = "id, tenant_id, name, description, created_at";

pub struct CategoryRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> CategoryRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        CategoryRepository { conn }
    }

    /// Inserts a category.
    ///
    /// ## Errors
    /// `DbError::UniqueViolation { field: "name" }` for a duplicate name in
    /// the same tenant.
    pub async fn insert(&mut self, category: &Category) -> DbResult<()> {
        debug!(category_id = %category.id, tenant_id = %category.tenant_id, "Inserting category");

        sqlx::query(
            r#"
            INSERT INTO categories (id, tenant_id, name, description, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&category.id)
        .bind(&category.tenant_id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.created_at)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    /// Locks a category row of the tenant and returns it.
    ///
    /// A no-op write, so a unit of work that starts with it holds the write
    /// lock before it reads anything. `None` means no such category for
    /// the tenant.
    pub async fn lock(&mut self, tenant_id: &str, id: &str) -> DbResult<Option<Category>> {
        let sql = format!(
            "UPDATE categories SET name = name WHERE id = ?1 AND tenant_id = ?2 \
             RETURNING {CATEGORY_COLUMNS}"
        );

        let category = sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(category)
    }

    /// All categories of the tenant, by name.
    pub async fn list(&mut self, tenant_id: &str) -> DbResult<Vec<Category>> {
        let sql = format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE tenant_id = ?1 \
             ORDER BY name COLLATE NOCASE"
        );

        let categories = sqlx::query_as::<_, Category>(&sql)
            .bind(tenant_id)
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(categories)
    }
}
