//! Admin user repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use open_bar_core::{AdminRole, AdminUserId, Cpf, Email};

use super::{AdminDirectory, RepositoryError, conflict_or_database};
use crate::models::{AdminUser, AdminUserChanges, NewAdminUser};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct AdminUserRow {
    id: i32,
    full_name: String,
    cpf: String,
    email: String,
    role: AdminRole,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    user: AdminUserRow,
    password_hash: String,
}

impl TryFrom<AdminUserRow> for AdminUser {
    type Error = RepositoryError;

    fn try_from(row: AdminUserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let cpf = Cpf::parse(&row.cpf).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid CPF in database: {e}"))
        })?;

        Ok(Self {
            id: AdminUserId::new(row.id),
            full_name: row.full_name,
            cpf,
            email,
            role: row.role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const ADMIN_COLUMNS: &str = "id, full_name, cpf, email, role, created_at, updated_at";

fn describe_conflict(constraint: Option<&str>) -> String {
    match constraint {
        Some(c) if c.contains("cpf") => "CPF já cadastrado".to_owned(),
        Some(c) if c.contains("email") => "Email já cadastrado".to_owned(),
        _ => "Administrador já cadastrado".to_owned(),
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for admin user database operations.
pub struct AdminUserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminUserRepository<'a> {
    /// Create a new admin user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

impl AdminDirectory for AdminUserRepository<'_> {
    async fn find(&self, id: AdminUserId) -> Result<Option<AdminUser>, RepositoryError> {
        let sql = format!("SELECT {ADMIN_COLUMNS} FROM admin.admin_user WHERE id = $1");
        let row = sqlx::query_as::<_, AdminUserRow>(&sql)
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn find_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(AdminUser, String)>, RepositoryError> {
        let sql = format!(
            "SELECT {ADMIN_COLUMNS}, password_hash FROM admin.admin_user WHERE email = $1"
        );
        let row = sqlx::query_as::<_, CredentialRow>(&sql)
            .bind(email.as_str())
            .fetch_optional(self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let user = AdminUser::try_from(row.user)?;
        Ok(Some((user, row.password_hash)))
    }

    async fn list(&self) -> Result<Vec<AdminUser>, RepositoryError> {
        let sql = format!("SELECT {ADMIN_COLUMNS} FROM admin.admin_user ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, AdminUserRow>(&sql)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    #[tracing::instrument(skip_all, fields(email = %admin.email, role = %admin.role))]
    async fn create(&self, admin: &NewAdminUser) -> Result<AdminUser, RepositoryError> {
        let sql = format!(
            "INSERT INTO admin.admin_user (full_name, cpf, email, role, password_hash) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {ADMIN_COLUMNS}"
        );
        let row = sqlx::query_as::<_, AdminUserRow>(&sql)
            .bind(&admin.full_name)
            .bind(admin.cpf.as_str())
            .bind(admin.email.as_str())
            .bind(admin.role)
            .bind(&admin.password_hash)
            .fetch_one(self.pool)
            .await
            .map_err(|e| conflict_or_database(e, describe_conflict))?;

        row.try_into()
    }

    #[tracing::instrument(skip(self, changes))]
    async fn update(
        &self,
        id: AdminUserId,
        changes: &AdminUserChanges,
    ) -> Result<Option<AdminUser>, RepositoryError> {
        let sql = format!(
            "UPDATE admin.admin_user SET \
                 full_name = COALESCE($2, full_name), \
                 cpf = COALESCE($3, cpf), \
                 email = COALESCE($4, email), \
                 role = COALESCE($5, role), \
                 password_hash = COALESCE($6, password_hash), \
                 updated_at = now() \
             WHERE id = $1 \
             RETURNING {ADMIN_COLUMNS}"
        );
        let row = sqlx::query_as::<_, AdminUserRow>(&sql)
            .bind(id.as_i32())
            .bind(changes.full_name.as_deref())
            .bind(changes.cpf.as_ref().map(Cpf::as_str))
            .bind(changes.email.as_ref().map(Email::as_str))
            .bind(changes.role)
            .bind(changes.password_hash.as_deref())
            .fetch_optional(self.pool)
            .await
            .map_err(|e| conflict_or_database(e, describe_conflict))?;

        row.map(TryInto::try_into).transpose()
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: AdminUserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM admin.admin_user WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_messages() {
        assert_eq!(describe_conflict(Some("admin_user_cpf_key")), "CPF já cadastrado");
        assert_eq!(describe_conflict(Some("admin_user_email_key")), "Email já cadastrado");
        assert_eq!(describe_conflict(None), "Administrador já cadastrado");
    }

    #[test]
    fn test_corrupt_row_is_rejected() {
        let now = Utc::now();
        let row = AdminUserRow {
            id: 7,
            full_name: "Teste".into(),
            cpf: "123".into(),
            email: "teste@openbar.com.br".into(),
            role: AdminRole::Viewer,
            created_at: now,
            updated_at: now,
        };
        assert!(matches!(
            AdminUser::try_from(row),
            Err(RepositoryError::DataCorruption(_))
        ));
    }
}
