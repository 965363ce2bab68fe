//! Live quote pricing for the service configurator.

use axum::Json;
use open_bar_core::{Price, TierSelection, price};
use serde::{Deserialize, Serialize};

/// Partial or complete tier selection from the quote form.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct QuotePriceRequest {
    pub horario: String,
    pub convidados: String,
    pub bartenders: String,
}

/// Quote total. Unselected tiers contribute nothing.
#[derive(Debug, Serialize)]
pub struct QuotePrice {
    pub total: Price,
    #[serde(rename = "totalFormatado")]
    pub total_formatted: String,
    /// Whether all three tiers were chosen (required to add to the cart)
    #[serde(rename = "completo")]
    pub complete: bool,
}

/// Price the current selection.
pub async fn price_quote(Json(request): Json<QuotePriceRequest>) -> Json<QuotePrice> {
    let selection =
        TierSelection::from_keys(&request.horario, &request.convidados, &request.bartenders);
    let total = price(&selection);
    Json(QuotePrice {
        total,
        total_formatted: total.display(),
        complete: selection.is_complete(),
    })
}
