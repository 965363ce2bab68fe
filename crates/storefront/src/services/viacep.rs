//! Brazilian postal code (CEP) lookup via ViaCEP.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during an address lookup.
#[derive(Debug, Error)]
pub enum ViaCepError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected shape.
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

/// Address returned for a CEP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub cep: String,
    #[serde(default)]
    pub logradouro: String,
    #[serde(default)]
    pub complemento: String,
    #[serde(default)]
    pub bairro: String,
    #[serde(default)]
    pub localidade: String,
    #[serde(default)]
    pub uf: String,
}

/// Strip formatting from a CEP, requiring exactly eight digits.
#[must_use]
pub fn normalize_cep(input: &str) -> Option<String> {
    let digits: String = input
        .chars()
        .filter(|c| !matches!(c, '-' | '.' | ' '))
        .collect();
    (digits.len() == 8 && digits.chars().all(|c| c.is_ascii_digit())).then_some(digits)
}

/// ViaCEP API client.
#[derive(Clone)]
pub struct ViaCepClient {
    client: reqwest::Client,
    base_url: String,
}

impl ViaCepClient {
    /// Create a new client against `base_url` (e.g. `https://viacep.com.br/ws`).
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Look up an address. `cep` must already be normalized.
    ///
    /// Returns `Ok(None)` when ViaCEP does not know the code.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response cannot be parsed.
    #[tracing::instrument(skip(self))]
    pub async fn lookup(&self, cep: &str) -> Result<Option<Address>, ViaCepError> {
        let url = format!("{}/{cep}/json/", self.base_url);
        let response = self.client.get(&url).send().await?;
        if response.status() == reqwest::StatusCode::BAD_REQUEST {
            return Ok(None);
        }
        let body: serde_json::Value = response.error_for_status()?.json().await?;
        parse_lookup(body)
    }
}

fn parse_lookup(body: serde_json::Value) -> Result<Option<Address>, ViaCepError> {
    let unknown = body
        .get("erro")
        .is_some_and(|e| e.as_bool() == Some(true) || e.as_str() == Some("true"));
    if unknown {
        return Ok(None);
    }
    serde_json::from_value(body)
        .map(Some)
        .map_err(|e| ViaCepError::Parse(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_cep() {
        assert_eq!(normalize_cep("01310-100").as_deref(), Some("01310100"));
        assert_eq!(normalize_cep("01.310-100").as_deref(), Some("01310100"));
        assert_eq!(normalize_cep("0131010"), None);
        assert_eq!(normalize_cep("0131010a"), None);
    }

    #[test]
    fn test_parse_unknown_cep() {
        assert_eq!(parse_lookup(serde_json::json!({ "erro": true })).unwrap(), None);
        assert_eq!(parse_lookup(serde_json::json!({ "erro": "true" })).unwrap(), None);
    }

    #[test]
    fn test_parse_address() {
        let address = parse_lookup(serde_json::json!({
            "cep": "01310-100",
            "logradouro": "Avenida Paulista",
            "bairro": "Bela Vista",
            "localidade": "São Paulo",
            "uf": "SP",
            "ibge": "3550308"
        }))
        .unwrap()
        .unwrap();
        assert_eq!(address.localidade, "São Paulo");
        assert_eq!(address.complemento, "");
    }
}
