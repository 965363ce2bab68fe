//! `POST /functions/admin-auth`: login, session and admin account management.
//!
//! One endpoint dispatches on `action`. Account actions need a logged-in
//! admin with `ManageAdmins`; an `adminId` in the body must be that admin.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use open_bar_core::{AdminUserId, Permission};

use crate::db::{AdminDirectory, AdminUserRepository};
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::AdminContext;
use crate::models::{AdminSession, AdminUserData, session_keys};
use crate::services::auth::{self, AuthError};
use crate::services::{admin_users, authorize};
use crate::state::AppState;

/// Supported `admin-auth` actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthAction {
    Login,
    Logout,
    Session,
    GetAdmins,
    CreateAdmin,
    UpdateAdmin,
    DeleteAdmin,
}

/// `admin-auth` request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminAuthRequest {
    pub action: AuthAction,
    pub email: Option<String>,
    pub password: Option<String>,
    pub admin_id: Option<AdminUserId>,
    pub target_id: Option<AdminUserId>,
    pub user_data: Option<AdminUserData>,
}

/// Turn a body that does not parse into a JSON 400.
pub(crate) fn bad_body(rejection: &JsonRejection) -> AppError {
    AppError::BadRequest(format!("Requisição inválida: {}", rejection.body_text()))
}

fn session_payload(admin_session: &AdminSession) -> Value {
    json!({
        "success": true,
        "admin": admin_session.admin,
        "expiresAt": admin_session.expires_at,
        "permissions": admin_session.admin.role.permissions(),
    })
}

/// `admin-auth` handler.
#[instrument(skip_all)]
pub async fn admin_auth(
    State(state): State<AppState>,
    context: AdminContext,
    body: std::result::Result<Json<AdminAuthRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(request) = body.map_err(|e| bad_body(&e))?;
    let directory = AdminUserRepository::new(state.pool());
    dispatch(&directory, &context, request, Utc::now())
        .await
        .map(Json)
}

/// Run one `admin-auth` action against `directory`.
///
/// # Errors
///
/// Returns `AppError` for missing fields, failed logins, authorization
/// failures and account management errors.
#[instrument(skip_all, fields(action = ?request.action))]
pub async fn dispatch<D: AdminDirectory>(
    directory: &D,
    context: &AdminContext,
    request: AdminAuthRequest,
    now: DateTime<Utc>,
) -> Result<Value> {
    match request.action {
        AuthAction::Login => {
            let (Some(email), Some(password)) = (request.email, request.password) else {
                return Err(AppError::BadRequest(
                    "Email e senha são obrigatórios".to_owned(),
                ));
            };
            let admin_session = auth::login(directory, &email, &password, now).await?;
            auth::store_session(&context.session, &admin_session).await?;
            set_sentry_user(
                admin_session.admin.id.as_i32(),
                Some(admin_session.admin.email.as_str()),
            );
            Ok(session_payload(&admin_session))
        }

        AuthAction::Logout => {
            auth::logout(&context.session).await?;
            clear_sentry_user();
            Ok(json!({ "success": true }))
        }

        AuthAction::Session => {
            let current = context.current.as_ref().ok_or(AuthError::NoSession)?;
            Ok(session_payload(current))
        }

        AuthAction::GetAdmins => {
            authorize(directory, context.actor(request.admin_id)?, Permission::ManageAdmins).await?;
            let admins = directory.list().await?;
            Ok(json!({ "success": true, "admins": admins }))
        }

        AuthAction::CreateAdmin => {
            let actor =
                authorize(directory, context.actor(request.admin_id)?, Permission::ManageAdmins)
                    .await?;
            let data = request
                .user_data
                .ok_or_else(|| AppError::BadRequest("userData é obrigatório".to_owned()))?;
            let admin = admin_users::create(directory, &actor, data).await?;
            Ok(json!({ "success": true, "admin": admin }))
        }

        AuthAction::UpdateAdmin => {
            let actor =
                authorize(directory, context.actor(request.admin_id)?, Permission::ManageAdmins)
                    .await?;
            let target = request
                .target_id
                .ok_or_else(|| AppError::BadRequest("targetId é obrigatório".to_owned()))?;
            let data = request.user_data.unwrap_or_default();
            let admin = admin_users::update(directory, &actor, target, data).await?;

            // Keep the logged-in admin's own session in sync with their record.
            if let Some(current) = &context.current
                && current.admin.id == admin.id
            {
                let refreshed = AdminSession {
                    admin: admin.clone(),
                    expires_at: current.expires_at,
                };
                context
                    .session
                    .insert(session_keys::ADMIN_SESSION, &refreshed)
                    .await?;
            }
            Ok(json!({ "success": true, "admin": admin }))
        }

        AuthAction::DeleteAdmin => {
            let actor =
                authorize(directory, context.actor(request.admin_id)?, Permission::ManageAdmins)
                    .await?;
            let target = request
                .target_id
                .ok_or_else(|| AppError::BadRequest("targetId é obrigatório".to_owned()))?;
            admin_users::delete(directory, &actor, target).await?;
            Ok(json!({ "success": true }))
        }
    }
}
