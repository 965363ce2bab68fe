//! Drink catalog entities.
//!
//! [`Drink`] is what the catalog stores and serves. Admin create/update
//! payloads arrive as a loose [`DrinkForm`] and only reach storage after
//! [`DrinkDraft::new`] has validated and normalized them.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Catalog id of a drink (e.g. `"sa-1"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(transparent))]
#[serde(transparent)]
pub struct DrinkId(String);

impl DrinkId {
    /// Wrap an existing id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh random id for drinks created without one.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DrinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Catalog section a drink belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "catalog.drink_category", rename_all = "kebab-case")
)]
#[serde(rename_all = "kebab-case")]
pub enum DrinkCategory {
    DrinksSemAlcool,
    DrinksPadrao,
    Sublime,
}

impl DrinkCategory {
    /// Wire value (`drinks-sem-alcool`, `drinks-padrao`, `sublime`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DrinksSemAlcool => "drinks-sem-alcool",
            Self::DrinksPadrao => "drinks-padrao",
            Self::Sublime => "sublime",
        }
    }

    /// Section title shown to customers.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::DrinksSemAlcool => "Drinks sem álcool",
            Self::DrinksPadrao => "Drinks padrão",
            Self::Sublime => "Sublime",
        }
    }
}

impl std::str::FromStr for DrinkCategory {
    type Err = DrinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "drinks-sem-alcool" => Ok(Self::DrinksSemAlcool),
            "drinks-padrao" => Ok(Self::DrinksPadrao),
            "sublime" => Ok(Self::Sublime),
            other => Err(DrinkError::UnknownCategory(other.to_owned())),
        }
    }
}

/// A tasting note with an intensity level (1 to 5).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Characteristic {
    pub nome: String,
    pub nivel: u8,
}

impl Characteristic {
    /// Lowest allowed level.
    pub const MIN_LEVEL: u8 = 1;
    /// Highest allowed level.
    pub const MAX_LEVEL: u8 = 5;
}

/// A drink as stored in and served from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drink {
    pub id: DrinkId,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao", default)]
    pub description: Option<String>,
    #[serde(rename = "categoria")]
    pub category: DrinkCategory,
    #[serde(rename = "imagem_url", default)]
    pub image_url: Option<String>,
    #[serde(rename = "video_url", default)]
    pub video_url: Option<String>,
    #[serde(rename = "caracteristicas", default)]
    pub characteristics: Vec<Characteristic>,
    #[serde(rename = "ingredientes", default)]
    pub ingredients: Vec<String>,
    #[serde(rename = "destacar_home", default)]
    pub featured: bool,
}

impl Drink {
    /// Materialize a validated draft under `id`.
    #[must_use]
    pub fn from_draft(id: DrinkId, draft: DrinkDraft) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            category: draft.category,
            image_url: draft.image_url,
            video_url: draft.video_url,
            characteristics: draft.characteristics,
            ingredients: draft.ingredients,
            featured: draft.featured,
        }
    }
}

/// Errors raised while validating drink input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DrinkError {
    #[error("Nome do drink é obrigatório")]
    MissingName,
    #[error("Categoria é obrigatória")]
    MissingCategory,
    #[error("Categoria inválida: {0}")]
    UnknownCategory(String),
    #[error("Característica sem nome")]
    UnnamedCharacteristic,
    #[error("Nível da característica \"{name}\" deve estar entre 1 e 5 (recebido {level})")]
    LevelOutOfRange { name: String, level: u8 },
}

/// Admin form payload for creating or updating a drink, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DrinkForm {
    pub id: Option<String>,
    pub nome: String,
    pub descricao: Option<String>,
    pub categoria: Option<DrinkCategory>,
    pub imagem_url: Option<String>,
    pub video_url: Option<String>,
    pub caracteristicas: Vec<Characteristic>,
    pub ingredientes: Vec<String>,
    pub destacar_home: bool,
}

/// A validated, normalized drink payload ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrinkDraft {
    pub id: Option<DrinkId>,
    pub name: String,
    pub description: Option<String>,
    pub category: DrinkCategory,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub characteristics: Vec<Characteristic>,
    pub ingredients: Vec<String>,
    pub featured: bool,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

impl DrinkDraft {
    /// Validate `form`.
    ///
    /// Text fields are trimmed, blank optional fields become `None` and blank
    /// ingredients are dropped.
    ///
    /// # Errors
    ///
    /// Returns a [`DrinkError`] for a blank name, a missing category or a
    /// characteristic outside 1..=5.
    pub fn new(form: DrinkForm) -> Result<Self, DrinkError> {
        let name = form.nome.trim().to_owned();
        if name.is_empty() {
            return Err(DrinkError::MissingName);
        }
        let category = form.categoria.ok_or(DrinkError::MissingCategory)?;

        let characteristics = form
            .caracteristicas
            .into_iter()
            .map(|c| {
                let nome = c.nome.trim().to_owned();
                if nome.is_empty() {
                    return Err(DrinkError::UnnamedCharacteristic);
                }
                if !(Characteristic::MIN_LEVEL..=Characteristic::MAX_LEVEL).contains(&c.nivel) {
                    return Err(DrinkError::LevelOutOfRange {
                        name: nome,
                        level: c.nivel,
                    });
                }
                Ok(Characteristic { nome, nivel: c.nivel })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let ingredients = form
            .ingredientes
            .into_iter()
            .map(|i| i.trim().to_owned())
            .filter(|i| !i.is_empty())
            .collect();

        Ok(Self {
            id: non_blank(form.id).map(DrinkId),
            name,
            description: non_blank(form.descricao),
            category,
            image_url: non_blank(form.imagem_url),
            video_url: non_blank(form.video_url),
            characteristics,
            ingredients,
            featured: form.destacar_home,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> DrinkForm {
        DrinkForm {
            nome: "  Caipirinha ".into(),
            categoria: Some(DrinkCategory::DrinksPadrao),
            caracteristicas: vec![Characteristic {
                nome: "Cítrico".into(),
                nivel: 4,
            }],
            ingredientes: vec!["Limão".into(), "  ".into(), " Cachaça ".into()],
            descricao: Some("   ".into()),
            ..DrinkForm::default()
        }
    }

    #[test]
    fn test_draft_normalizes() {
        let draft = DrinkDraft::new(form()).unwrap();
        assert_eq!(draft.name, "Caipirinha");
        assert_eq!(draft.ingredients, vec!["Limão", "Cachaça"]);
        assert_eq!(draft.description, None);
        assert_eq!(draft.id, None);
    }

    #[test]
    fn test_draft_rejects_blank_name() {
        let mut f = form();
        f.nome = "   ".into();
        assert_eq!(DrinkDraft::new(f), Err(DrinkError::MissingName));
    }

    #[test]
    fn test_draft_requires_category() {
        let mut f = form();
        f.categoria = None;
        assert_eq!(DrinkDraft::new(f), Err(DrinkError::MissingCategory));
    }

    #[test]
    fn test_draft_rejects_level_out_of_range() {
        for level in [0, 6] {
            let mut f = form();
            f.caracteristicas[0].nivel = level;
            assert!(matches!(
                DrinkDraft::new(f),
                Err(DrinkError::LevelOutOfRange { .. })
            ));
        }
    }

    #[test]
    fn test_drink_wire_format() {
        let drink = Drink::from_draft(DrinkId::new("sa-1"), DrinkDraft::new(form()).unwrap());
        let json = serde_json::to_value(&drink).unwrap();
        assert_eq!(json["id"], "sa-1");
        assert_eq!(json["nome"], "Caipirinha");
        assert_eq!(json["categoria"], "drinks-padrao");
        assert_eq!(json["caracteristicas"][0]["nivel"], 4);
        assert_eq!(json["destacar_home"], false);
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(
            "drinks-sem-alcool".parse::<DrinkCategory>().unwrap(),
            DrinkCategory::DrinksSemAlcool
        );
        assert!("vinhos".parse::<DrinkCategory>().is_err());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(DrinkId::generate(), DrinkId::generate());
    }
}
