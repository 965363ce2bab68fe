//! `POST /functions/admin-drinks`: drink catalog management.
//!
//! Every action needs a logged-in admin. `list` needs `ViewCatalog`, every
//! write needs `EditCatalog`.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use open_bar_core::{AdminUserId, DrinkForm, DrinkId, Permission};

use super::admin_auth::bad_body;
use crate::db::{AdminDirectory, AdminUserRepository, DrinkCatalog, DrinkRepository};
use crate::error::{AppError, Result};
use crate::middleware::AdminContext;
use crate::services::{authorize, drinks};
use crate::state::AppState;

/// Supported `admin-drinks` actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrinkAction {
    List,
    Create,
    Update,
    Delete,
}

impl DrinkAction {
    const fn permission(self) -> Permission {
        match self {
            Self::List => Permission::ViewCatalog,
            Self::Create | Self::Update | Self::Delete => Permission::EditCatalog,
        }
    }
}

/// `admin-drinks` request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDrinksRequest {
    pub action: DrinkAction,
    pub admin_id: Option<AdminUserId>,
    pub drink_id: Option<DrinkId>,
    pub drink_data: Option<DrinkForm>,
}

/// `admin-drinks` handler.
#[instrument(skip_all)]
pub async fn admin_drinks(
    State(state): State<AppState>,
    context: AdminContext,
    body: std::result::Result<Json<AdminDrinksRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(request) = body.map_err(|e| bad_body(&e))?;
    let directory = AdminUserRepository::new(state.pool());
    let catalog = DrinkRepository::new(state.pool());
    dispatch(&directory, &catalog, &context, request)
        .await
        .map(Json)
}

/// Run one `admin-drinks` action.
///
/// Authorization happens before the payload is looked at, so a refused
/// write never touches the catalog.
///
/// # Errors
///
/// Returns `AppError` for authorization failures, missing or invalid drink
/// data and unknown drink ids.
#[instrument(skip_all, fields(action = ?request.action))]
pub async fn dispatch<D: AdminDirectory, C: DrinkCatalog>(
    directory: &D,
    catalog: &C,
    context: &AdminContext,
    request: AdminDrinksRequest,
) -> Result<Value> {
    let actor = authorize(
        directory,
        context.actor(request.admin_id)?,
        request.action.permission(),
    )
    .await?;
    tracing::debug!(admin_id = %actor.id, "catalog action authorized");

    let drink_data = || {
        request
            .drink_data
            .clone()
            .ok_or_else(|| AppError::BadRequest("drinkData é obrigatório".to_owned()))
    };

    match request.action {
        DrinkAction::List => {
            let drinks = catalog.list().await?;
            Ok(json!({ "success": true, "drinks": drinks }))
        }
        DrinkAction::Create => {
            let drink = drinks::create(catalog, drink_data()?).await?;
            Ok(json!({ "success": true, "drink": drink }))
        }
        DrinkAction::Update => {
            let drink = drinks::update(catalog, request.drink_id.clone(), drink_data()?).await?;
            Ok(json!({ "success": true, "drink": drink }))
        }
        DrinkAction::Delete => {
            let id = request.drink_id.clone().or_else(|| {
                request
                    .drink_data
                    .as_ref()
                    .and_then(|d| d.id.clone())
                    .map(DrinkId::new)
            });
            drinks::delete(catalog, id).await?;
            Ok(json!({ "success": true }))
        }
    }
}
