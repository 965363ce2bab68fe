//! Authorization gate for admin actions.
//!
//! The acting admin always comes from the authenticated session. A request
//! may repeat its `adminId`, but it can never name somebody else. The admin
//! is re-read from storage on every request so a role change or deletion
//! takes effect immediately, even for a live session.

use open_bar_core::{AdminRole, AdminUserId, Permission};
use thiserror::Error;

use crate::db::{AdminDirectory, RepositoryError};
use crate::models::{AdminSession, AdminUser};

/// Why an action was refused.
#[derive(Debug, Error)]
pub enum AccessError {
    /// No live admin session.
    #[error("Não autenticado")]
    Unauthenticated,

    /// The request's `adminId` is not the logged-in admin.
    #[error("Acesso negado: adminId não corresponde à sessão")]
    ActorMismatch,

    /// The acting admin does not exist.
    #[error("Administrador não encontrado")]
    UnknownAdmin,

    /// The acting admin's role lacks the permission.
    #[error("Acesso negado: perfil {} não pode {}", .role.label(), describe(.permission))]
    Denied {
        role: AdminRole,
        permission: Permission,
    },

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

const fn describe(permission: &Permission) -> &'static str {
    match *permission {
        Permission::ViewCatalog => "visualizar o catálogo",
        Permission::EditCatalog => "editar o catálogo",
        Permission::ManageAdmins => "gerenciar administradores",
    }
}

/// The acting admin id, taken from the live session.
///
/// # Errors
///
/// Returns `AccessError::Unauthenticated` without a session and
/// `AccessError::ActorMismatch` when `requested` names another admin.
pub fn acting_admin(
    requested: Option<AdminUserId>,
    session: Option<&AdminSession>,
) -> Result<AdminUserId, AccessError> {
    let own = session.ok_or(AccessError::Unauthenticated)?.admin.id;
    match requested {
        Some(id) if id != own => {
            tracing::warn!(session_admin = %own, requested = %id, "adminId does not match session");
            Err(AccessError::ActorMismatch)
        }
        _ => Ok(own),
    }
}

/// Load the acting admin and check that their role grants `permission`.
///
/// # Errors
///
/// Returns `AccessError::UnknownAdmin` for an id with no account and
/// `AccessError::Denied` when the role does not allow the action.
#[tracing::instrument(skip(directory))]
pub async fn authorize<D: AdminDirectory>(
    directory: &D,
    actor: AdminUserId,
    permission: Permission,
) -> Result<AdminUser, AccessError> {
    let admin = directory.find(actor).await?.ok_or(AccessError::UnknownAdmin)?;

    if !admin.role.allows(permission) {
        tracing::warn!(admin_id = %admin.id, role = %admin.role, ?permission, "access denied");
        return Err(AccessError::Denied {
            role: admin.role,
            permission,
        });
    }

    Ok(admin)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::services::test_support::InMemoryDirectory;

    #[tokio::test]
    async fn test_role_table_is_enforced() {
        let directory = InMemoryDirectory::new();
        let manager = directory.seed("gerente@openbar.com.br", AdminRole::Manager, "senha-forte");
        let planner = directory.seed("planejador@openbar.com.br", AdminRole::Planner, "senha-forte");
        let viewer = directory.seed("leitor@openbar.com.br", AdminRole::Viewer, "senha-forte");

        for (admin, permission, allowed) in [
            (&manager, Permission::ManageAdmins, true),
            (&planner, Permission::EditCatalog, true),
            (&planner, Permission::ManageAdmins, false),
            (&viewer, Permission::ViewCatalog, true),
            (&viewer, Permission::EditCatalog, false),
        ] {
            let result = authorize(&directory, admin.id, permission).await;
            assert_eq!(result.is_ok(), allowed, "{} / {permission:?}", admin.role);
        }
    }

    #[tokio::test]
    async fn test_denied_message() {
        let directory = InMemoryDirectory::new();
        let viewer = directory.seed("leitor@openbar.com.br", AdminRole::Viewer, "senha-forte");

        let err = authorize(&directory, viewer.id, Permission::EditCatalog)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Acesso negado: perfil Visualizador não pode editar o catálogo"
        );
    }

    #[tokio::test]
    async fn test_unknown_actor() {
        let directory = InMemoryDirectory::new();
        assert!(matches!(
            authorize(&directory, AdminUserId::new(99), Permission::ViewCatalog).await,
            Err(AccessError::UnknownAdmin)
        ));
    }

    #[test]
    fn test_actor_comes_from_session() {
        let directory = InMemoryDirectory::new();
        let admin = directory.seed("leitor@openbar.com.br", AdminRole::Viewer, "senha-forte");
        let session = AdminSession::start(admin, Utc::now());
        let own = session.admin.id;

        assert_eq!(acting_admin(None, Some(&session)).unwrap(), own);
        assert_eq!(acting_admin(Some(own), Some(&session)).unwrap(), own);
    }

    #[test]
    fn test_payload_cannot_name_another_admin() {
        let directory = InMemoryDirectory::new();
        let manager = directory.seed("gerente@openbar.com.br", AdminRole::Manager, "senha-forte");
        let viewer = directory.seed("leitor@openbar.com.br", AdminRole::Viewer, "senha-forte");
        let session = AdminSession::start(viewer, Utc::now());

        assert!(matches!(
            acting_admin(Some(manager.id), Some(&session)),
            Err(AccessError::ActorMismatch)
        ));
        assert!(matches!(
            acting_admin(Some(manager.id), None),
            Err(AccessError::Unauthenticated)
        ));
        assert!(matches!(acting_admin(None, None), Err(AccessError::Unauthenticated)));
    }
}
