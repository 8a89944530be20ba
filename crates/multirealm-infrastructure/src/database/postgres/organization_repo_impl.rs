// ============================================================================
// Multirealm Infrastructure - PostgreSQL Organization Repository
// File: crates/multirealm-infrastructure/src/database/postgres/organization_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{error, info};

use multirealm_core::domain::{NewOrganization, Organization};
use multirealm_core::error::DomainError;
use multirealm_core::ports::OrganizationRepository;

pub struct PgOrganizationRepository {
    pool: PgPool,
}

impl PgOrganizationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct OrganizationRow {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl From<OrganizationRow> for Organization {
    fn from(row: OrganizationRow) -> Self {
        Organization {
            id: row.id,
            name: row.name,
            description: row.description,
            enabled: row.enabled,
            created_at: row.created_at,
            modified_at: row.modified_at,
        }
    }
}

fn database_error(context: &str, e: sqlx::Error) -> DomainError {
    error!("Database error {}: {}", context, e);
    DomainError::DatabaseError(e.to_string())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl OrganizationRepository for PgOrganizationRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Organization>, DomainError> {
        let row: Option<OrganizationRow> = sqlx::query_as(
            r#"
            SELECT id, name, description, enabled, created_at, modified_at
            FROM organization
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("finding organization by id", e))?;

        Ok(row.map(Into::into))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Organization>, DomainError> {
        // Realm names are case sensitive, so is the lookup.
        let row: Option<OrganizationRow> = sqlx::query_as(
            r#"
            SELECT id, name, description, enabled, created_at, modified_at
            FROM organization
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("finding organization by name", e))?;

        Ok(row.map(Into::into))
    }

    async fn exists_by_name(&self, name: &str) -> Result<bool, DomainError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM organization WHERE name = $1)")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| database_error("checking organization name", e))
    }

    async fn list(&self) -> Result<Vec<Organization>, DomainError> {
        let rows: Vec<OrganizationRow> = sqlx::query_as(
            r#"
            SELECT id, name, description, enabled, created_at, modified_at
            FROM organization
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("listing organizations", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create(&self, organization: &NewOrganization) -> Result<Organization, DomainError> {
        info!("Inserting organization: {}", organization.name);

        let row: OrganizationRow = sqlx::query_as(
            r#"
            INSERT INTO organization (name, description, enabled, created_at)
            VALUES ($1, $2, $3, now())
            RETURNING id, name, description, enabled, created_at, modified_at
            "#,
        )
        .bind(&organization.name)
        .bind(&organization.description)
        .bind(organization.is_enabled())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::OrganizationAlreadyExists(organization.name.clone())
            } else {
                database_error("creating organization", e)
            }
        })?;

        info!("Organization row created: {}", row.id);
        Ok(row.into())
    }

    async fn update(&self, organization: &Organization) -> Result<Organization, DomainError> {
        let row: Option<OrganizationRow> = sqlx::query_as(
            r#"
            UPDATE organization
            SET
                description = $2,
                enabled = $3,
                modified_at = $4
            WHERE id = $1
            RETURNING id, name, description, enabled, created_at, modified_at
            "#,
        )
        .bind(organization.id)
        .bind(&organization.description)
        .bind(organization.enabled)
        .bind(organization.modified_at.unwrap_or_else(Utc::now))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("updating organization", e))?;

        row.map(Into::into)
            .ok_or_else(|| DomainError::OrganizationNotFound(organization.id.to_string()))
    }

    async fn delete(&self, id: i64) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM organization WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| database_error("deleting organization", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::OrganizationNotFound(id.to_string()));
        }
        Ok(())
    }
}
