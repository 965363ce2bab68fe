//! Drink catalog browsing.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use open_bar_core::{Drink, DrinkCategory, DrinkId};
use serde::Deserialize;
use tracing::instrument;

use crate::db::{DrinkFilter, DrinkRepository};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Query parameters for the drink list.
#[derive(Debug, Default, Deserialize)]
pub struct DrinkListQuery {
    /// Category slug, blank means all
    #[serde(default)]
    pub categoria: Option<String>,
    /// Only drinks featured on the home page
    #[serde(default)]
    pub destaque: bool,
}

impl DrinkListQuery {
    fn filter(&self) -> Result<DrinkFilter> {
        let category = match self.categoria.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(slug) => Some(
                slug.parse::<DrinkCategory>()
                    .map_err(|_| AppError::Validation(format!("Categoria desconhecida: {slug}")))?,
            ),
        };
        Ok(DrinkFilter {
            category,
            featured_only: self.destaque,
        })
    }
}

/// List drinks ordered by name.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<DrinkListQuery>,
) -> Result<Json<Vec<Drink>>> {
    let filter = query.filter()?;
    let drinks = DrinkRepository::new(state.pool()).list(filter).await?;
    Ok(Json(drinks))
}

/// Show one drink.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Drink>> {
    DrinkRepository::new(state.pool())
        .get(&DrinkId::new(id))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Drink não encontrado".to_owned()))
}
