//! # Tenant Settings
//!
//! Per-tenant sale defaults: whether sales are taxed and at which rate.
//!
//! ```text
//! tenant_settings row? ──yes──► stored values
//!        │ no
//!        ▼
//! TenantSettings::unsaved(default rate from DbConfig)   tax disabled
//! ```
//!
//! Sales read the settings inside their own unit of work, so a sale sees
//! either the settings before an update or after it, never a mix.

use chrono::Utc;
use tracing::info;

use crate::error::DbResult;
use crate::pool::Database;
use crate::repository::SettingsRepository;
use mostrador_core::validation::validate_settings_update;
use mostrador_core::{CoreResult, SettingsUpdate, TaxRate, TenantSettings};

#[derive(Debug, Clone)]
pub struct SettingsService {
    db: Database,
}

impl SettingsService {
    pub fn new(db: Database) -> Self {
        SettingsService { db }
    }

    /// Settings of the tenant, or the defaults if it never saved any.
    pub async fn get_settings(&self, tenant_id: &str) -> CoreResult<TenantSettings> {
        let mut conn = self.db.acquire().await?;
        let settings = effective_settings(
            &mut SettingsRepository::new(&mut conn),
            tenant_id,
            self.db.default_tax_rate(),
        )
        .await?;
        Ok(settings)
    }

    /// Writes the present fields and keeps the others.
    ///
    /// ## Errors
    /// - `Validation` for a tax rate above 100%
    pub async fn update_settings(
        &self,
        tenant_id: &str,
        update: SettingsUpdate,
    ) -> CoreResult<TenantSettings> {
        validate_settings_update(&update)?;

        let mut uow = self.db.begin().await?;
        let settings = uow
            .settings()
            .upsert(tenant_id, &update, self.db.default_tax_rate(), Utc::now())
            .await?;
        uow.commit().await?;

        info!(
            tenant_id = %tenant_id,
            enable_tax = settings.enable_tax,
            tax_rate_bps = settings.tax_rate_bps,
            "Tenant settings updated"
        );
        Ok(settings)
    }
}

/// The stored settings of a tenant, or [`TenantSettings::unsaved`].
pub(crate) async fn effective_settings(
    repo: &mut SettingsRepository<'_>,
    tenant_id: &str,
    default_rate: TaxRate,
) -> DbResult<TenantSettings> {
    Ok(repo
        .get(tenant_id)
        .await?
        .unwrap_or_else(|| TenantSettings::unsaved(tenant_id, default_rate)))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::DbConfig;
    use mostrador_core::CoreError;

    const TENANT: &str = "tenant-a";

    async fn setup() -> SettingsService {
        let config = DbConfig::in_memory().default_tax_rate(TaxRate::from_bps(800));
        Database::new(config).await.unwrap().settings()
    }

    #[tokio::test]
    async fn test_unsaved_tenant_gets_defaults() {
        let service = setup().await;
        let settings = service.get_settings(TENANT).await.unwrap();
        assert!(!settings.enable_tax);
        assert_eq!(settings.tax_rate_bps, 800);
        assert_eq!(settings.updated_at, None);
    }

    #[tokio::test]
    async fn test_partial_updates_keep_other_fields() {
        let service = setup().await;

        let first = service
            .update_settings(
                TENANT,
                SettingsUpdate {
                    enable_tax: Some(true),
                    tax_rate_bps: None,
                },
            )
            .await
            .unwrap();
        assert!(first.enable_tax);
        assert_eq!(first.tax_rate_bps, 800);
        assert!(first.updated_at.is_some());

        let second = service
            .update_settings(
                TENANT,
                SettingsUpdate {
                    enable_tax: None,
                    tax_rate_bps: Some(1600),
                },
            )
            .await
            .unwrap();
        assert!(second.enable_tax);
        assert_eq!(second.tax_rate_bps, 1600);

        assert_eq!(service.get_settings(TENANT).await.unwrap(), second);
        // Other tenants are untouched
        assert!(!service.get_settings("tenant-b").await.unwrap().enable_tax);
    }

    #[tokio::test]
    async fn test_rate_above_full_is_rejected() {
        let service = setup().await;
        let err = service
            .update_settings(
                TENANT,
                SettingsUpdate {
                    tax_rate_bps: Some(10_001),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(service.get_settings(TENANT).await.unwrap().updated_at, None);
    }
}
