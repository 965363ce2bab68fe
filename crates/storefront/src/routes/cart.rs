//! Cart route handlers.
//!
//! The cart lives in the visitor's session (see
//! [`SessionCartStorage`](crate::services::SessionCartStorage)). Every
//! mutation answers with the full cart so the page can re-render in one go.

use axum::Json;
use open_bar_core::{
    BartenderTier, CartLine, DrinkCategory, DrinkId, DrinkLine, GuestTier, HoursTier, Price,
    ServiceItem, ServiceQuoteLine, TierSelection,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::services::{SessionCart, open_cart};

/// Cart snapshot returned by every cart endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub total: Price,
    #[serde(rename = "totalFormatado")]
    pub total_formatted: String,
    pub drink_count: u32,
}

impl From<&SessionCart> for CartView {
    fn from(cart: &SessionCart) -> Self {
        let total = cart.total();
        Self {
            lines: cart.lines().to_vec(),
            total,
            total_formatted: total.display(),
            drink_count: cart.total_drink_count(),
        }
    }
}

/// Request body for adding a configured service quote.
#[derive(Debug, Deserialize)]
pub struct AddServiceRequest {
    pub item: ServiceItem,
    pub horario: String,
    pub convidados: String,
    pub bartenders: String,
}

/// Request body for adding a drink.
#[derive(Debug, Deserialize)]
pub struct AddDrinkRequest {
    pub id: String,
    pub nome: String,
    #[serde(default)]
    pub imagem_url: Option<String>,
    #[serde(default)]
    pub categoria: Option<DrinkCategory>,
}

/// Request body for changing a line's quantity.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub index: usize,
    pub quantity: i64,
}

/// Request body for removing a line.
#[derive(Debug, Deserialize)]
pub struct RemoveLineRequest {
    pub index: usize,
}

/// Cart badge count.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: u32,
}

/// Resolve the three tier keys, rejecting incomplete selections.
pub(crate) fn complete_selection(
    horario: &str,
    convidados: &str,
    bartenders: &str,
) -> Result<(HoursTier, GuestTier, BartenderTier)> {
    match TierSelection::from_keys(horario, convidados, bartenders) {
        TierSelection {
            hours: Some(hours),
            guests: Some(guests),
            bartenders: Some(bartenders),
        } => Ok((hours, guests, bartenders)),
        _ => Err(AppError::Validation(
            "Selecione horário, convidados e bartenders".to_owned(),
        )),
    }
}

/// Show the cart.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Json<CartView> {
    let cart = open_cart(session).await;
    Json(CartView::from(&cart))
}

/// Add a service quote line.
#[instrument(skip(session, request), fields(item = %request.item.id))]
pub async fn add_service(
    session: Session,
    Json(request): Json<AddServiceRequest>,
) -> Result<Json<CartView>> {
    let (hours, guests, bartenders) =
        complete_selection(&request.horario, &request.convidados, &request.bartenders)?;

    let line = ServiceQuoteLine::new(request.item, hours, guests, bartenders);
    add_breadcrumb("cart", "Service added", &[("total", &line.valor_total_formatado)]);

    let mut cart = open_cart(session).await;
    cart.add_service(line).await?;
    Ok(Json(CartView::from(&cart)))
}

/// Add a drink, or bump its quantity if already in the cart.
#[instrument(skip(session, request), fields(drink = %request.id))]
pub async fn add_drink(
    session: Session,
    Json(request): Json<AddDrinkRequest>,
) -> Result<Json<CartView>> {
    if request.id.trim().is_empty() || request.nome.trim().is_empty() {
        return Err(AppError::Validation("Drink inválido".to_owned()));
    }

    let mut cart = open_cart(session).await;
    let line = cart
        .add_or_increment_drink(DrinkLine {
            id: DrinkId::new(request.id),
            nome: request.nome,
            imagem_url: request.imagem_url,
            categoria: request.categoria,
            quantity: 1,
        })
        .await?;
    add_breadcrumb("cart", "Drink added", &[("drink", line.id.as_str())]);
    Ok(Json(CartView::from(&cart)))
}

/// Set a drink line's quantity; below 1 removes the line.
#[instrument(skip(session))]
pub async fn update(
    session: Session,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<CartView>> {
    let mut cart = open_cart(session).await;
    cart.update_quantity(request.index, request.quantity).await?;
    Ok(Json(CartView::from(&cart)))
}

/// Remove a line by position.
#[instrument(skip(session))]
pub async fn remove(
    session: Session,
    Json(request): Json<RemoveLineRequest>,
) -> Result<Json<CartView>> {
    let mut cart = open_cart(session).await;
    cart.remove_at(request.index).await?;
    Ok(Json(CartView::from(&cart)))
}

/// Empty the cart.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Json<CartView>> {
    let mut cart = open_cart(session).await;
    cart.clear().await?;
    Ok(Json(CartView::from(&cart)))
}

/// Number of drinks in the cart, for the header badge.
#[instrument(skip(session))]
pub async fn count(session: Session) -> Json<CartCount> {
    let cart = open_cart(session).await;
    Json(CartCount {
        count: cart.total_drink_count(),
    })
}
