//! # Settings Repository
//!
//! At most one `tenant_settings` row per tenant, written by upsert.

use chrono::{DateTime, Utc};
use mostrador_core::{SettingsUpdate, TaxRate, TenantSettings};
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;

pub struct SettingsRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> SettingsRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        SettingsRepository { conn }
    }

    /// The stored row, or `None` if the tenant never saved settings.
    pub async fn get(&mut self, tenant_id: &str) -> DbResult<Option<TenantSettings>> {
        let settings = sqlx::query_as::<_, TenantSettings>(
            r#"
            SELECT tenant_id, enable_tax, tax_rate_bps, updated_at
            FROM tenant_settings
            WHERE tenant_id = ?1
            "#,
        )
        .bind(tenant_id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(settings)
    }

    /// Writes the present fields, keeping stored values for the others.
    ///
    /// The first write of a tenant starts from tax disabled at
    /// `default_rate`.
    pub async fn upsert(
        &mut self,
        tenant_id: &str,
        update: &SettingsUpdate,
        default_rate: TaxRate,
        now: DateTime<Utc>,
    ) -> DbResult<TenantSettings> {
        debug!(tenant_id = %tenant_id, "Saving tenant settings");

        let settings = sqlx::query_as::<_, TenantSettings>(
            r#"
            INSERT INTO tenant_settings (tenant_id, enable_tax, tax_rate_bps, updated_at)
            VALUES (?1, COALESCE(?2, 0), COALESCE(?3, ?4), ?5)
            ON CONFLICT (tenant_id) DO UPDATE SET
                enable_tax   = COALESCE(?2, enable_tax),
                tax_rate_bps = COALESCE(?3, tax_rate_bps),
                updated_at   = ?5
            RETURNING tenant_id, enable_tax, tax_rate_bps, updated_at
            "#,
        )
        .bind(tenant_id)
        .bind(update.enable_tax)
        .bind(update.tax_rate_bps)
        .bind(default_rate.bps())
        .bind(now)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(settings)
    }
}
