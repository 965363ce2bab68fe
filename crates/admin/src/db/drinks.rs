//! Drink catalog repository.

use open_bar_core::{Characteristic, Drink, DrinkCategory, DrinkDraft, DrinkId};
use sqlx::PgPool;
use sqlx::types::Json;

use super::{DrinkCatalog, RepositoryError, conflict_or_database};

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

/// Repository for catalog writes.
pub struct DrinkRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DrinkRepository<'a> {
    /// Create a new drink repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

impl DrinkCatalog for DrinkRepository<'_> {
    async fn list(&self) -> Result<Vec<Drink>, RepositoryError> {
        let sql = format!("SELECT {DRINK_COLUMNS} FROM catalog.drink ORDER BY nome");
        let rows = sqlx::query_as::<_, DrinkRow>(&sql)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Drink::from).collect())
    }

    #[tracing::instrument(skip_all, fields(drink_id = %drink.id))]
    async fn create(&self, drink: &Drink) -> Result<Drink, RepositoryError> {
        let sql = format!(
            "INSERT INTO catalog.drink ({DRINK_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {DRINK_COLUMNS}"
        );
        let row = sqlx::query_as::<_, DrinkRow>(&sql)
            .bind(drink.id.as_str())
            .bind(&drink.name)
            .bind(drink.description.as_deref())
            .bind(drink.category)
            .bind(drink.image_url.as_deref())
            .bind(drink.video_url.as_deref())
            .bind(Json(&drink.characteristics))
            .bind(&drink.ingredients)
            .bind(drink.featured)
            .fetch_one(self.pool)
            .await
            .map_err(|e| {
                conflict_or_database(e, |_| format!("Já existe um drink com id {}", drink.id))
            })?;

        Ok(row.into())
    }

    #[tracing::instrument(skip(self, draft))]
    async fn update(
        &self,
        id: &DrinkId,
        draft: &DrinkDraft,
    ) -> Result<Option<Drink>, RepositoryError> {
        let sql = format!(
            "UPDATE catalog.drink SET \
                 nome = $2, descricao = $3, categoria = $4, imagem_url = $5, \
                 video_url = $6, caracteristicas = $7, ingredientes = $8, \
                 destacar_home = $9, updated_at = now() \
             WHERE id = $1 \
             RETURNING {DRINK_COLUMNS}"
        );
        let row = sqlx::query_as::<_, DrinkRow>(&sql)
            .bind(id.as_str())
            .bind(&draft.name)
            .bind(draft.description.as_deref())
            .bind(draft.category)
            .bind(draft.image_url.as_deref())
            .bind(draft.video_url.as_deref())
            .bind(Json(&draft.characteristics))
            .bind(&draft.ingredients)
            .bind(draft.featured)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Drink::from))
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: &DrinkId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM catalog.drink WHERE id = $1")
            .bind(id.as_str())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
