//! Drink catalog editing.

use open_bar_core::{Drink, DrinkDraft, DrinkError, DrinkForm, DrinkId};
use thiserror::Error;

use crate::db::{DrinkCatalog, RepositoryError};

/// Errors from catalog editing.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The drink payload failed validation.
    #[error(transparent)]
    Invalid(#[from] DrinkError),

    /// Update or delete without a drink id.
    #[error("Id do drink é obrigatório")]
    MissingId,

    /// No drink with this id.
    #[error("Drink {0} não encontrado")]
    NotFound(DrinkId),

    /// Repository/database error, including a duplicate id.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Create a drink. A form without an id gets a fresh UUID.
///
/// # Errors
///
/// Returns `CatalogError::Invalid` for an invalid form and
/// `RepositoryError::Conflict` when the id is taken.
#[tracing::instrument(skip_all)]
pub async fn create<C: DrinkCatalog>(catalog: &C, form: DrinkForm) -> Result<Drink, CatalogError> {
    let mut draft = DrinkDraft::new(form)?;
    let id = draft.id.take().unwrap_or_else(DrinkId::generate);
    let drink = catalog.create(&Drink::from_draft(id, draft)).await?;
    tracing::info!(drink_id = %drink.id, "drink created");
    Ok(drink)
}

/// Replace a drink. The id comes from `id` or, failing that, the form.
///
/// # Errors
///
/// Returns `CatalogError::MissingId` without an id, `CatalogError::Invalid`
/// for an invalid form and `CatalogError::NotFound` for an unknown id.
#[tracing::instrument(skip(catalog, form))]
pub async fn update<C: DrinkCatalog>(
    catalog: &C,
    id: Option<DrinkId>,
    form: DrinkForm,
) -> Result<Drink, CatalogError> {
    let mut draft = DrinkDraft::new(form)?;
    let id = id.or_else(|| draft.id.take()).ok_or(CatalogError::MissingId)?;
    let drink = catalog
        .update(&id, &draft)
        .await?
        .ok_or(CatalogError::NotFound(id))?;
    tracing::info!(drink_id = %drink.id, "drink updated");
    Ok(drink)
}

/// Delete a drink.
///
/// # Errors
///
/// Returns `CatalogError::MissingId` without an id and
/// `CatalogError::NotFound` for an unknown id.
#[tracing::instrument(skip(catalog))]
pub async fn delete<C: DrinkCatalog>(catalog: &C, id: Option<DrinkId>) -> Result<(), CatalogError> {
    let id = id.ok_or(CatalogError::MissingId)?;
    if !catalog.delete(&id).await? {
        return Err(CatalogError::NotFound(id));
    }
    tracing::info!(drink_id = %id, "drink deleted");
    Ok(())
}
