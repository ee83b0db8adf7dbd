//! Drinks Repository
//!
//! SQLite에 음료를 저장합니다. 레시피는 JSON 텍스트 컬럼에 보관합니다.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use tracing::info;

use coffee_core::{
    seed_drinks, DatabaseConfig, Drink, DrinkPatch, DrinkStore, NewDrink, Recipe, StoreError,
    StoreResult,
};

// ================================================================================================
// Schema
// ================================================================================================

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS drinks (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    title   TEXT NOT NULL UNIQUE,
    recipe  TEXT NOT NULL
)
"#;

/// 설정에 따라 SQLite 연결 풀을 엽니다.
///
/// 메모리 DB는 연결마다 별개의 DB가 되므로 연결 하나만 유지합니다.
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);

    let pool_options = if config.url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(config.max_connections)
    };

    pool_options.connect_with(options).await
}

// ================================================================================================
// Types
// ================================================================================================

/// drinks 테이블 레코드
#[derive(Debug, Clone, FromRow)]
struct DrinkRecord {
    id: i64,
    title: String,
    recipe: String,
}

impl TryFrom<DrinkRecord> for Drink {
    type Error = StoreError;

    fn try_from(record: DrinkRecord) -> Result<Self, Self::Error> {
        let recipe = Recipe::from_json(&record.recipe)
            .map_err(|e| StoreError::Corrupt(format!("drink {}: {}", record.id, e)))?;

        Ok(Drink {
            id: record.id,
            title: record.title,
            recipe,
        })
    }
}

fn map_db_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(db.message().to_string())
        }
        _ => StoreError::Database(err.to_string()),
    }
}

// ================================================================================================
// Repository
// ================================================================================================

/// SQLite 음료 저장소
#[derive(Debug, Clone)]
pub struct SqliteDrinkStore {
    pool: SqlitePool,
}

impl SqliteDrinkStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 메모리 DB에 스키마를 만든 저장소 (테스트용).
    pub async fn in_memory() -> StoreResult<Self> {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            ..Default::default()
        };
        let pool = connect(&config).await.map_err(map_db_error)?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// 연결 풀 참조.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// 테이블이 없으면 생성합니다.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(())
    }

    /// 테이블을 지우고 다시 만든 뒤 기본 음료를 넣습니다.
    pub async fn reset(&self) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query("DROP TABLE IF EXISTS drinks")
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        sqlx::query(CREATE_TABLE)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        let seeds = seed_drinks();
        for drink in &seeds {
            sqlx::query("INSERT INTO drinks (title, recipe) VALUES (?, ?)")
                .bind(&drink.title)
                .bind(drink.recipe.to_json()?)
                .execute(&mut *tx)
                .await
                .map_err(map_db_error)?;
        }

        tx.commit().await.map_err(map_db_error)?;
        info!(seeded = seeds.len(), "drinks 테이블 초기화 완료");
        Ok(())
    }
}

#[async_trait]
impl DrinkStore for SqliteDrinkStore {
    async fn list(&self) -> StoreResult<Vec<Drink>> {
        let records = sqlx::query_as::<_, DrinkRecord>(
            "SELECT id, title, recipe FROM drinks ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        records.into_iter().map(Drink::try_from).collect()
    }

    async fn get(&self, id: i64) -> StoreResult<Drink> {
        sqlx::query_as::<_, DrinkRecord>("SELECT id, title, recipe FROM drinks WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?
            .ok_or(StoreError::NotFound(id))?
            .try_into()
    }

    async fn create(&self, drink: NewDrink) -> StoreResult<Drink> {
        let record = sqlx::query_as::<_, DrinkRecord>(
            r#"
            INSERT INTO drinks (title, recipe)
            VALUES (?, ?)
            RETURNING id, title, recipe
            "#,
        )
        .bind(&drink.title)
        .bind(drink.recipe.to_json()?)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        record.try_into()
    }

    async fn update(&self, id: i64, patch: DrinkPatch) -> StoreResult<Drink> {
        if patch.is_empty() {
            return self.get(id).await;
        }

        let recipe = patch.recipe.as_ref().map(Recipe::to_json).transpose()?;

        sqlx::query_as::<_, DrinkRecord>(
            r#"
            UPDATE drinks
            SET title = COALESCE(?, title),
                recipe = COALESCE(?, recipe)
            WHERE id = ?
            RETURNING id, title, recipe
            "#,
        )
        .bind(patch.title)
        .bind(recipe)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?
        .ok_or(StoreError::NotFound(id))?
        .try_into()
    }

    async fn delete(&self, id: i64) -> StoreResult<i64> {
        let result = sqlx::query("DELETE FROM drinks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(id)
    }

    async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}
