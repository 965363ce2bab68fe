//! Postal code lookup for the event address form.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::services::viacep::{Address, normalize_cep};
use crate::state::AppState;

/// Look up the address for a CEP.
#[instrument(skip(state))]
pub async fn lookup(State(state): State<AppState>, Path(cep): Path<String>) -> Result<Json<Address>> {
    let cep = normalize_cep(&cep)
        .ok_or_else(|| AppError::Validation("CEP deve ter 8 dígitos".to_owned()))?;
    state
        .viacep()
        .lookup(&cep)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("CEP não encontrado".to_owned()))
}
