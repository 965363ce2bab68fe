//! Read-only drink catalog queries.

use open_bar_core::{Characteristic, Drink, DrinkCategory, DrinkId};
use sqlx::PgPool;
use sqlx::types::Json;

use super::RepositoryError;

#[derive(Debug, sqlx::FromRow)]
struct DrinkRow {
    id: String,
    nome: String,
    descricao: Option<String>,
    categoria: DrinkCategory,
    imagem_url: Option<String>,
    video_url: Option<String>,
    caracteristicas: Json<Vec<Characteristic>>,
    ingredientes: Vec<String>,
    destacar_home: bool,
}

impl From<DrinkRow> for Drink {
    fn from(row: DrinkRow) -> Self {
        Self {
            id: DrinkId::new(row.id),
            name: row.nome,
            description: row.descricao,
            category: row.categoria,
            image_url: row.imagem_url,
            video_url: row.video_url,
            characteristics: row.caracteristicas.0,
            ingredients: row.ingredientes,
            featured: row.destacar_home,
        }
    }
}

const DRINK_COLUMNS: &str = "id, nome, descricao, categoria, imagem_url, video_url, \
     caracteristicas, ingredientes, destacar_home";

/// Filters accepted by the catalog listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrinkFilter {
    pub category: Option<DrinkCategory>,
    pub featured_only: bool,
}

/// Repository for catalog reads.
pub struct DrinkRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DrinkRepository<'a> {
    /// Create a new drink repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List drinks ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: DrinkFilter) -> Result<Vec<Drink>, RepositoryError> {
        let sql = format!(
            "SELECT {DRINK_COLUMNS} FROM catalog.drink \
             WHERE ($1::catalog.drink_category IS NULL OR categoria = $1) \
               AND (NOT $2 OR destacar_home) \
             ORDER BY nome"
        );
        let rows = sqlx::query_as::<_, DrinkRow>(&sql)
            .bind(filter.category)
            .bind(filter.featured_only)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Drink::from).collect())
    }

    /// Get a drink by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: &DrinkId) -> Result<Option<Drink>, RepositoryError> {
        let sql = format!("SELECT {DRINK_COLUMNS} FROM catalog.drink WHERE id = $1");
        let row = sqlx::query_as::<_, DrinkRow>(&sql)
            .bind(id.as_str())
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Drink::from))
    }
}
