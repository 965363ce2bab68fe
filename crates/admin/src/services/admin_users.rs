//! Admin account management.
//!
//! Callers authorize with [`Permission::ManageAdmins`](open_bar_core::Permission)
//! first; these functions only validate input and enforce the self-protection
//! rules (a manager cannot demote or delete their own account).

use open_bar_core::{AdminRole, AdminUserId, Cpf, Email};
use thiserror::Error;

use super::auth::{self, AuthError};
use crate::db::{AdminDirectory, RepositoryError};
use crate::models::{AdminUser, AdminUserChanges, AdminUserData, NewAdminUser};

/// Errors from admin account management.
#[derive(Debug, Error)]
pub enum AdminUserError {
    /// Client input failed validation.
    #[error("{0}")]
    Invalid(String),

    /// A manager tried to give their own account a lower role.
    #[error("Você não pode remover seu próprio perfil de gerente")]
    SelfDemotion,

    /// An admin tried to delete their own account.
    #[error("Você não pode excluir sua própria conta")]
    SelfDeletion,

    /// The target admin does not exist.
    #[error("Administrador {0} não encontrado")]
    NotFound(AdminUserId),

    /// Password hashing failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Repository/database error, including duplicate email or CPF.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

fn required(value: Option<String>, message: &str) -> Result<String, AdminUserError> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AdminUserError::Invalid(message.to_owned()))
}

fn parse_cpf(raw: &str) -> Result<Cpf, AdminUserError> {
    Cpf::parse(raw).map_err(|_| AdminUserError::Invalid("CPF inválido".to_owned()))
}

fn parse_email(raw: &str) -> Result<Email, AdminUserError> {
    Email::parse(raw).map_err(|_| AdminUserError::Invalid("Email inválido".to_owned()))
}

fn hash_new_password(password: &str) -> Result<String, AdminUserError> {
    auth::validate_password(password)
        .map_err(|e| AdminUserError::Invalid(e.to_string()))?;
    Ok(auth::hash_password(password)?)
}

/// Validate a create payload.
///
/// # Errors
///
/// Returns `AdminUserError::Invalid` for a missing field, an invalid CPF or
/// email, or a short password.
pub fn validate_new(data: AdminUserData) -> Result<NewAdminUser, AdminUserError> {
    let full_name = required(data.nome_completo, "Nome completo é obrigatório")?;
    let cpf = parse_cpf(&required(data.cpf, "CPF é obrigatório")?)?;
    let email = parse_email(&required(data.email, "Email é obrigatório")?)?;
    let role = data
        .role
        .ok_or_else(|| AdminUserError::Invalid("Perfil é obrigatório".to_owned()))?;
    let password = data
        .password
        .ok_or_else(|| AdminUserError::Invalid("Senha é obrigatória".to_owned()))?;

    Ok(NewAdminUser {
        full_name,
        cpf,
        email,
        role,
        password_hash: hash_new_password(&password)?,
    })
}

/// Validate an update payload. Absent and blank fields are left unchanged.
///
/// # Errors
///
/// Returns `AdminUserError::Invalid` for an invalid CPF or email, or a short
/// password.
pub fn validate_changes(data: AdminUserData) -> Result<AdminUserChanges, AdminUserError> {
    let present = |v: Option<String>| v.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty());

    Ok(AdminUserChanges {
        full_name: present(data.nome_completo),
        cpf: present(data.cpf).as_deref().map(parse_cpf).transpose()?,
        email: present(data.email).as_deref().map(parse_email).transpose()?,
        role: data.role,
        password_hash: data
            .password
            .filter(|p| !p.is_empty())
            .as_deref()
            .map(hash_new_password)
            .transpose()?,
    })
}

/// Create an admin account.
///
/// # Errors
///
/// Returns validation errors from [`validate_new`] and
/// `RepositoryError::Conflict` for a duplicate email or CPF.
#[tracing::instrument(skip_all, fields(actor_id = %actor.id))]
pub async fn create<D: AdminDirectory>(
    directory: &D,
    actor: &AdminUser,
    data: AdminUserData,
) -> Result<AdminUser, AdminUserError> {
    let new_admin = validate_new(data)?;
    let created = directory.create(&new_admin).await?;
    tracing::info!(admin_id = %created.id, role = %created.role, "admin created");
    Ok(created)
}

/// Update an admin account.
///
/// Nothing is written when a manager would demote themselves.
///
/// # Errors
///
/// Returns `AdminUserError::SelfDemotion`, `AdminUserError::NotFound`,
/// validation errors from [`validate_changes`] and
/// `RepositoryError::Conflict` for a duplicate email or CPF.
#[tracing::instrument(skip(directory, actor, data), fields(actor_id = %actor.id))]
pub async fn update<D: AdminDirectory>(
    directory: &D,
    actor: &AdminUser,
    target: AdminUserId,
    data: AdminUserData,
) -> Result<AdminUser, AdminUserError> {
    let changes = validate_changes(data)?;

    let demotes_self = actor.id == target
        && actor.role == AdminRole::Manager
        && changes.role.is_some_and(|role| role != AdminRole::Manager);
    if demotes_self {
        return Err(AdminUserError::SelfDemotion);
    }

    let updated = directory
        .update(target, &changes)
        .await?
        .ok_or(AdminUserError::NotFound(target))?;
    tracing::info!(admin_id = %updated.id, "admin updated");
    Ok(updated)
}

/// Delete an admin account.
///
/// # Errors
///
/// Returns `AdminUserError::SelfDeletion` when `target` is the actor and
/// `AdminUserError::NotFound` for an unknown target.
#[tracing::instrument(skip(directory, actor), fields(actor_id = %actor.id))]
pub async fn delete<D: AdminDirectory>(
    directory: &D,
    actor: &AdminUser,
    target: AdminUserId,
) -> Result<(), AdminUserError> {
    if actor.id == target {
        return Err(AdminUserError::SelfDeletion);
    }
    if !directory.delete(target).await? {
        return Err(AdminUserError::NotFound(target));
    }
    tracing::info!(admin_id = %target, "admin deleted");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::test_support::InMemoryDirectory;

    fn data() -> AdminUserData {
        AdminUserData {
            nome_completo: Some("João Lima".into()),
            cpf: Some("111.444.777-35".into()),
            email: Some("joao@openbar.com.br".into()),
            role: Some(AdminRole::Planner),
            password: Some("segredo-123".into()),
        }
    }

    #[test]
    fn test_validate_new() {
        let new_admin = validate_new(data()).unwrap();
        assert_eq!(new_admin.cpf.as_str(), "11144477735");
        assert!(new_admin.password_hash.starts_with("$argon2id$"));

        let invalid = [
            (AdminUserData { cpf: Some("111.444.777-36".into()), ..data() }, "CPF inválido"),
            (AdminUserData { email: Some("joao".into()), ..data() }, "Email inválido"),
            (AdminUserData { nome_completo: Some("  ".into()), ..data() }, "Nome completo é obrigatório"),
            (AdminUserData { role: None, ..data() }, "Perfil é obrigatório"),
            (
                AdminUserData { password: Some("curta".into()), ..data() },
                "A senha deve ter pelo menos 8 caracteres",
            ),
        ];
        for (input, message) in invalid {
            assert_eq!(validate_new(input).unwrap_err().to_string(), message);
        }
    }

    #[test]
    fn test_blank_update_fields_are_ignored() {
        let changes = validate_changes(AdminUserData {
            nome_completo: Some("  ".into()),
            password: Some(String::new()),
            ..AdminUserData::default()
        })
        .unwrap();
        assert!(changes.full_name.is_none());
        assert!(changes.password_hash.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let directory = InMemoryDirectory::new();
        let manager = directory.seed("gerente@openbar.com.br", AdminRole::Manager, "senha-forte");

        create(&directory, &manager, data()).await.unwrap();
        let err = create(
            &directory,
            &manager,
            AdminUserData { cpf: Some("529.982.247-25".into()), ..data() },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AdminUserError::Repository(RepositoryError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_manager_cannot_demote_self() {
        let directory = InMemoryDirectory::new();
        let manager = directory.seed("gerente@openbar.com.br", AdminRole::Manager, "senha-forte");

        let err = update(
            &directory,
            &manager,
            manager.id,
            AdminUserData {
                role: Some(AdminRole::Viewer),
                nome_completo: Some("Outro Nome".into()),
                ..AdminUserData::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AdminUserError::SelfDemotion));

        let stored = directory.get(manager.id).unwrap();
        assert_eq!(stored.role, AdminRole::Manager);
        assert_eq!(stored.full_name, manager.full_name);
    }

    #[tokio::test]
    async fn test_manager_can_demote_others() {
        let directory = InMemoryDirectory::new();
        let manager = directory.seed("gerente@openbar.com.br", AdminRole::Manager, "senha-forte");
        let other = directory.seed("outro@openbar.com.br", AdminRole::Manager, "senha-forte");

        let updated = update(
            &directory,
            &manager,
            other.id,
            AdminUserData { role: Some(AdminRole::Viewer), ..AdminUserData::default() },
        )
        .await
        .unwrap();
        assert_eq!(updated.role, AdminRole::Viewer);
    }

    #[tokio::test]
    async fn test_delete_rules() {
        let directory = InMemoryDirectory::new();
        let manager = directory.seed("gerente@openbar.com.br", AdminRole::Manager, "senha-forte");
        let viewer = directory.seed("leitor@openbar.com.br", AdminRole::Viewer, "senha-forte");

        assert!(matches!(
            delete(&directory, &manager, manager.id).await,
            Err(AdminUserError::SelfDeletion)
        ));
        delete(&directory, &manager, viewer.id).await.unwrap();
        assert!(matches!(
            delete(&directory, &manager, viewer.id).await,
            Err(AdminUserError::NotFound(_))
        ));
    }
}
