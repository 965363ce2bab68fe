//! PIX payment vocabulary shared by the checkout flow and the public API.

use serde::{Deserialize, Serialize};

/// Charge status as reported by the payment gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PixStatus {
    Pending,
    Paid,
    Expired,
    Cancelled,
    Refunded,
    /// Any status this build does not know about.
    #[serde(other)]
    Unknown,
}

impl PixStatus {
    /// Whether the charge has been paid.
    #[must_use]
    pub const fn is_paid(self) -> bool {
        matches!(self, Self::Paid)
    }
}

/// Errors raised by [`CustomerInfo::validate`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CustomerError {
    #[error("Preencha todos os campos obrigatórios: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}

/// Contact data the gateway needs before it will issue a charge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub tax_id: String,
}

impl CustomerInfo {
    /// Require all four fields to be non-blank and return a trimmed copy.
    ///
    /// # Errors
    ///
    /// Returns [`CustomerError::MissingFields`] listing every blank field.
    pub fn validate(&self) -> Result<Self, CustomerError> {
        let fields = [
            ("email", &self.email),
            ("nome", &self.name),
            ("telefone", &self.phone),
            ("CPF/CNPJ", &self.tax_id),
        ];
        let missing: Vec<&'static str> = fields
            .iter()
            .filter(|(_, v)| v.trim().is_empty())
            .map(|(label, _)| *label)
            .collect();
        if !missing.is_empty() {
            return Err(CustomerError::MissingFields(missing));
        }

        Ok(Self {
            name: self.name.trim().to_owned(),
            email: self.email.trim().to_owned(),
            phone: self.phone.trim().to_owned(),
            tax_id: self.tax_id.trim().to_owned(),
        })
    }
}
