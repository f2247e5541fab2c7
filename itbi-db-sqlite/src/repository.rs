use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use itbi_core::{
    NewProperty, Property, PropertyRepository, PropertyType, RepositoryError, StateCode,
};
use sqlx::{
    Executor, Row, Sqlite,
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
};
use tracing::{debug, info};

use crate::decimal::{decimal_to_text, get_decimal};

const SELECT_PROPERTY: &str = "SELECT id, property_type, address, neighborhood, city, state,
        area, owner, cpf, created_at, updated_at
 FROM property";

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Connects to a sqlx SQLite URL such as `sqlite:properties.db?mode=rwc`
    /// or `sqlite::memory:`.
    pub async fn new(database_url: &str) -> Result<Self, RepositoryError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| RepositoryError::Connection(format!("{database_url}: {e}")))?;

        // An in-memory database lives in a single connection.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| RepositoryError::Connection(format!("{database_url}: {e}")))?;
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<(), RepositoryError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(format!("migration failed: {e}")))?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn db_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

async fn insert_property<'e, E>(
    executor: E,
    property: &NewProperty,
    now: DateTime<Utc>,
) -> Result<i64, RepositoryError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        "INSERT INTO property (
            property_type, address, neighborhood, city, state,
            area, owner, cpf, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(property.property_type.as_str())
    .bind(&property.address)
    .bind(&property.neighborhood)
    .bind(&property.city)
    .bind(property.state.as_str())
    .bind(decimal_to_text(property.area))
    .bind(&property.owner)
    .bind(&property.cpf)
    .bind(now)
    .bind(now)
    .execute(executor)
    .await
    .map_err(db_err)?;

    Ok(result.last_insert_rowid())
}

fn row_to_property(row: &sqlx::sqlite::SqliteRow) -> Result<Property, RepositoryError> {
    let type_str: String = row.try_get("property_type").map_err(db_err)?;
    let property_type = PropertyType::parse(&type_str).ok_or_else(|| {
        RepositoryError::Database(format!("Invalid property type: {}", type_str))
    })?;

    let state_str: String = row.try_get("state").map_err(db_err)?;
    let state = StateCode::parse(&state_str)
        .ok_or_else(|| RepositoryError::Database(format!("Invalid state code: {}", state_str)))?;

    Ok(Property {
        id: row.try_get("id").map_err(db_err)?,
        property_type,
        address: row.try_get("address").map_err(db_err)?,
        neighborhood: row.try_get("neighborhood").map_err(db_err)?,
        city: row.try_get("city").map_err(db_err)?,
        state,
        area: get_decimal(row, "area")?,
        owner: row.try_get("owner").map_err(db_err)?,
        cpf: row.try_get("cpf").map_err(db_err)?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get created_at: {}", e)))?,
        updated_at: row
            .try_get::<DateTime<Utc>, _>("updated_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get updated_at: {}", e)))?,
    })
}

#[async_trait]
impl PropertyRepository for SqliteRepository {
    async fn create_property(
        &self,
        property: NewProperty,
    ) -> Result<Property, RepositoryError> {
        let id = insert_property(&self.pool, &property, Utc::now()).await?;
        info!(id, state = %property.state, "property registered");
        self.get_property(id).await
    }

    /// Inserts inside one transaction; any failure rolls every insert back.
    async fn create_properties(
        &self,
        properties: Vec<NewProperty>,
    ) -> Result<Vec<Property>, RepositoryError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let mut ids = Vec::with_capacity(properties.len());
        for property in &properties {
            match insert_property(&mut *tx, property, now).await {
                Ok(id) => ids.push(id),
                Err(e) => {
                    tx.rollback().await.map_err(db_err)?;
                    return Err(e);
                }
            }
        }
        tx.commit().await.map_err(db_err)?;
        debug!(count = ids.len(), "properties committed");

        let mut created = Vec::with_capacity(ids.len());
        for id in ids {
            created.push(self.get_property(id).await?);
        }
        Ok(created)
    }

    async fn get_property(
        &self,
        id: i64,
    ) -> Result<Property, RepositoryError> {
        let row = sqlx::query(&format!("{SELECT_PROPERTY} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or(RepositoryError::NotFound)?;

        row_to_property(&row)
    }

    async fn update_property(
        &self,
        property: &Property,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE property SET
                property_type = ?, address = ?, neighborhood = ?, city = ?, state = ?,
                area = ?, owner = ?, cpf = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(property.property_type.as_str())
        .bind(&property.address)
        .bind(&property.neighborhood)
        .bind(&property.city)
        .bind(property.state.as_str())
        .bind(decimal_to_text(property.area))
        .bind(&property.owner)
        .bind(&property.cpf)
        .bind(Utc::now())
        .bind(property.id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        info!(id = property.id, "property updated");
        Ok(())
    }

    async fn delete_property(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM property WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        info!(id, "property deleted");
        Ok(())
    }

    async fn list_properties(
        &self,
        state: Option<StateCode>,
    ) -> Result<Vec<Property>, RepositoryError> {
        let rows = match state {
            Some(state) => {
                sqlx::query(&format!("{SELECT_PROPERTY} WHERE state = ? ORDER BY id"))
                    .bind(state.as_str())
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                sqlx::query(&format!("{SELECT_PROPERTY} ORDER BY id"))
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(db_err)?;

        rows.iter().map(row_to_property).collect()
    }
}
