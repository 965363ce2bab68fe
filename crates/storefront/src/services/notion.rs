//! Notion CRM client.
//!
//! Each event request becomes a page in the configured Notion database.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::config::NotionConfig;

const NOTION_API_URL: &str = "https://api.notion.com/v1/pages";
const NOTION_VERSION: &str = "2022-06-28";

/// Notion text properties are capped at 2000 characters.
const MAX_TEXT_LEN: usize = 2000;

/// Errors that can occur when talking to Notion.
#[derive(Debug, Error)]
pub enum NotionError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Notion rejected the request.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}

/// An event request to record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotionEvent {
    #[serde(alias = "nome")]
    pub name: String,
    pub email: Option<String>,
    #[serde(alias = "telefone")]
    pub phone: Option<String>,
    /// ISO date (`YYYY-MM-DD`)
    #[serde(alias = "dataEvento")]
    pub event_date: Option<String>,
    #[serde(alias = "local")]
    pub location: Option<String>,
    #[serde(alias = "convidados")]
    pub guests: Option<String>,
    #[serde(alias = "tipoEvento")]
    pub event_type: Option<String>,
    #[serde(alias = "observacoes")]
    pub notes: Option<String>,
    /// Quoted value in reais
    #[serde(alias = "valor")]
    pub amount: Option<f64>,
}

#[derive(Deserialize)]
struct CreatedPage {
    id: String,
    #[serde(default)]
    url: Option<String>,
}

/// A page created in Notion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotionPage {
    pub id: String,
    pub url: Option<String>,
}

/// Notion API client.
#[derive(Clone)]
pub struct NotionClient {
    client: reqwest::Client,
    database_id: String,
}

impl NotionClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &NotionConfig) -> Result<Self, NotionError> {
        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", config.api_key.expose_secret());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth_value).map_err(|e| NotionError::Api {
                status: 0,
                message: format!("invalid API key format: {e}"),
            })?,
        );
        headers.insert("Notion-Version", HeaderValue::from_static(NOTION_VERSION));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            database_id: config.database_id.clone(),
        })
    }

    /// Create a page for `event`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or Notion rejects it.
    #[tracing::instrument(skip_all)]
    pub async fn create_event(&self, event: &NotionEvent) -> Result<NotionPage, NotionError> {
        let body = json!({
            "parent": { "database_id": self.database_id },
            "properties": event_properties(event),
        });

        let response = self.client.post(NOTION_API_URL).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_owned))
                .unwrap_or(text);
            tracing::warn!(status = %status, %message, "Notion rejected page");
            return Err(NotionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let page: CreatedPage = response.json().await?;
        tracing::info!(page_id = %page.id, "Notion event created");
        Ok(NotionPage {
            id: page.id,
            url: page.url,
        })
    }
}

fn rich_text(value: &str) -> Value {
    let content: String = value.chars().take(MAX_TEXT_LEN).collect();
    json!({ "rich_text": [{ "text": { "content": content } }] })
}

/// Build the Notion `properties` object, omitting blank fields.
fn event_properties(event: &NotionEvent) -> Value {
    let mut props = serde_json::Map::new();
    let name = if event.name.trim().is_empty() {
        "Evento sem nome"
    } else {
        event.name.trim()
    };
    props.insert(
        "Nome".to_owned(),
        json!({ "title": [{ "text": { "content": name } }] }),
    );

    let present = |v: &Option<String>| {
        v.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
    };

    if let Some(email) = present(&event.email) {
        props.insert("Email".to_owned(), json!({ "email": email }));
    }
    if let Some(phone) = present(&event.phone) {
        props.insert("Telefone".to_owned(), json!({ "phone_number": phone }));
    }
    if let Some(date) = present(&event.event_date) {
        props.insert("Data do Evento".to_owned(), json!({ "date": { "start": date } }));
    }
    for (key, value) in [
        ("Local", &event.location),
        ("Convidados", &event.guests),
        ("Tipo", &event.event_type),
        ("Observações", &event.notes),
    ] {
        if let Some(v) = present(value) {
            props.insert(key.to_owned(), rich_text(&v));
        }
    }
    if let Some(amount) = event.amount {
        props.insert("Valor".to_owned(), json!({ "number": amount }));
    }

    Value::Object(props)
}
