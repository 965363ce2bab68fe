//! AbacatePay API client.
//!
//! Every endpoint answers with a `{ "data": ..., "error": ... }` envelope.
//! A non-2xx status or a non-null `error` becomes [`PixError::Api`] carrying
//! the gateway's own message.

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use open_bar_core::{CustomerInfo, PixStatus};

use super::pix::{
    Billing, BillingProduct, BillingRequest, ChargeRequest, ChargeStatus, PixCharge, PixError,
    PixGateway,
};
use crate::config::AbacatePayConfig;

/// AbacatePay API client.
#[derive(Clone)]
pub struct AbacatePayClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CustomerPayload<'a> {
    name: &'a str,
    cellphone: &'a str,
    email: &'a str,
    tax_id: &'a str,
}

impl<'a> From<&'a CustomerInfo> for CustomerPayload<'a> {
    fn from(customer: &'a CustomerInfo) -> Self {
        Self {
            name: &customer.name,
            cellphone: &customer.phone,
            email: &customer.email,
            tax_id: &customer.tax_id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CustomerData {
    id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BillingPayload<'a> {
    frequency: &'static str,
    methods: [&'static str; 1],
    products: &'a [BillingProduct],
    return_url: &'a str,
    completion_url: &'a str,
    customer_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PixQrCodePayload<'a> {
    amount: i64,
    expires_in: u32,
    description: &'a str,
    customer: CustomerPayload<'a>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PixQrCodeData {
    id: Option<String>,
    br_code: Option<String>,
    br_code_base64: Option<String>,
    expires_at: Option<String>,
}

impl AbacatePayClient {
    /// Create a new client with bearer authentication.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &AbacatePayConfig) -> Result<Self, PixError> {
        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", config.api_key.expose_secret());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth_value)
                .map_err(|e| PixError::Malformed(format!("invalid API key format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, PixError> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        unwrap_envelope(status, &text)
    }
}

/// Turn an HTTP status and envelope body into the `data` payload.
fn unwrap_envelope<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, PixError> {
    let parsed: Result<Envelope<T>, _> = serde_json::from_str(body);

    let upstream_error = match &parsed {
        Ok(Envelope {
            error: Some(error), ..
        }) if !error.is_null() => Some(
            error
                .as_str()
                .map_or_else(|| error.to_string(), str::to_owned),
        ),
        _ => None,
    };

    if !status.is_success() || upstream_error.is_some() {
        let message = upstream_error.unwrap_or_else(|| {
            if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("erro desconhecido").to_owned()
            } else {
                body.to_owned()
            }
        });
        return Err(PixError::Api {
            status: status.as_u16(),
            message,
        });
    }

    parsed
        .map_err(|e| PixError::Malformed(e.to_string()))?
        .data
        .ok_or_else(|| PixError::Malformed("response has no data".to_owned()))
}

impl PixGateway for AbacatePayClient {
    #[tracing::instrument(skip_all)]
    async fn create_customer(&self, customer: &CustomerInfo) -> Result<String, PixError> {
        let data: CustomerData = self
            .post("/customer/create", &CustomerPayload::from(customer))
            .await?;
        tracing::debug!(customer_id = %data.id, "gateway customer created");
        Ok(data.id)
    }

    #[tracing::instrument(skip_all, fields(customer_id = %request.customer_id))]
    async fn create_billing(&self, request: &BillingRequest) -> Result<Billing, PixError> {
        let payload = BillingPayload {
            frequency: "ONE_TIME",
            methods: ["PIX"],
            products: &request.products,
            return_url: &request.return_url,
            completion_url: &request.completion_url,
            customer_id: &request.customer_id,
        };
        self.post("/billing/create", &payload).await
    }

    #[tracing::instrument(skip_all, fields(amount_cents = request.amount_cents))]
    async fn create_pix_charge(&self, request: &ChargeRequest) -> Result<PixCharge, PixError> {
        let payload = PixQrCodePayload {
            amount: request.amount_cents,
            expires_in: request.expires_in,
            description: &request.description,
            customer: CustomerPayload::from(&request.customer),
        };
        let data: PixQrCodeData = self.post("/pixQrCode/create", &payload).await?;
        Ok(PixCharge {
            id: data.id,
            br_code: data.br_code,
            qr_code_image: data.br_code_base64,
            expires_at: data.expires_at,
        })
    }

    #[tracing::instrument(skip(self))]
    async fn check_charge(&self, pix_id: &str) -> Result<ChargeStatus, PixError> {
        let response = self
            .client
            .get(self.url("/pixQrCode/check"))
            .query(&[("id", pix_id)])
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        let raw: serde_json::Value = unwrap_envelope(status, &text)?;
        Ok(charge_status_from(raw))
    }
}

fn charge_status_from(raw: serde_json::Value) -> ChargeStatus {
    let status = raw
        .get("status")
        .cloned()
        .and_then(|s| serde_json::from_value::<PixStatus>(s).ok())
        .unwrap_or(PixStatus::Unknown);
    let expires_at = raw
        .get("expiresAt")
        .and_then(serde_json::Value::as_str)
        .map(str::to_owned);
    ChargeStatus {
        status,
        expires_at,
        raw,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_data() {
        let body = r#"{"data":{"id":"cust_123"},"error":null}"#;
        let data: CustomerData = unwrap_envelope(StatusCode::OK, body).unwrap();
        assert_eq!(data.id, "cust_123");
    }

    #[test]
    fn test_envelope_error_surfaces_message() {
        let body = r#"{"data":null,"error":"Invalid taxId"}"#;
        let err = unwrap_envelope::<CustomerData>(StatusCode::OK, body).unwrap_err();
        assert!(matches!(err, PixError::Api { status: 200, ref message } if message == "Invalid taxId"));
        assert_eq!(err.client_message(), "Invalid taxId");
    }

    #[test]
    fn test_http_error_without_envelope() {
        let err = unwrap_envelope::<CustomerData>(StatusCode::UNAUTHORIZED, "").unwrap_err();
        assert!(matches!(err, PixError::Api { status: 401, ref message } if message == "Unauthorized"));
    }

    #[test]
    fn test_missing_data_is_malformed() {
        let err = unwrap_envelope::<CustomerData>(StatusCode::OK, r#"{"error":null}"#).unwrap_err();
        assert!(matches!(err, PixError::Malformed(_)));
    }

    #[test]
    fn test_charge_status_mapping() {
        let status = charge_status_from(serde_json::json!({
            "status": "EXPIRED",
            "expiresAt": "2026-10-18T12:00:00Z"
        }));
        assert_eq!(status.status, PixStatus::Expired);
        assert_eq!(status.expires_at.as_deref(), Some("2026-10-18T12:00:00Z"));

        let odd = charge_status_from(serde_json::json!({ "status": 42 }));
        assert_eq!(odd.status, PixStatus::Unknown);
    }

    #[test]
    fn test_pix_payload_shape() {
        let customer = CustomerInfo {
            name: "Ana".into(),
            email: "ana@exemplo.com".into(),
            phone: "11999990000".into(),
            tax_id: "52998224725".into(),
        };
        let payload = PixQrCodePayload {
            amount: 85_000,
            expires_in: 3600,
            description: "Open Bar",
            customer: CustomerPayload::from(&customer),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["expiresIn"], 3600);
        assert_eq!(json["customer"]["cellphone"], "11999990000");
        assert_eq!(json["customer"]["taxId"], "52998224725");
    }
}
