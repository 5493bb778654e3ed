use anyhow::Context;
use sqlx::{
    postgres::{PgPoolOptions, PgRow},
    PgPool, Row,
};
use std::time::Duration;

use crate::config::DatabaseConfig;
use crate::model::{NewSchool, School, SchoolId};
use crate::store::traits::SchoolStore;
use crate::store::{StoreError, StoreResult};

const SELECT_SCHOOL: &str = r#"
    SELECT id, created_at, name, level, contact, phone, email, website, address, mode, version
    FROM schools
    WHERE id = $1
"#;

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str, config: &DatabaseConfig) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections.unwrap_or(25))
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs.unwrap_or(5)))
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Create the schools table if it does not exist yet
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn school_from_row(row: &PgRow) -> Result<School, sqlx::Error> {
    Ok(School {
        id: row.try_get("id")?,
        created_at: row.try_get("created_at")?,
        name: row.try_get("name")?,
        level: row.try_get("level")?,
        contact: row.try_get("contact")?,
        phone: row.try_get("phone")?,
        email: row.try_get("email")?,
        website: row.try_get("website")?,
        address: row.try_get("address")?,
        mode: row.try_get("mode")?,
        version: row.try_get("version")?,
    })
}

#[async_trait::async_trait]
impl SchoolStore for PostgresStore {
    async fn insert_school(&self, school: NewSchool) -> StoreResult<School> {
        let row = sqlx::query(
            r#"
            INSERT INTO schools (name, level, contact, phone, email, website, address, mode)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, created_at, version
            "#,
        )
        .bind(&school.name)
        .bind(&school.level)
        .bind(&school.contact)
        .bind(&school.phone)
        .bind(&school.email)
        .bind(&school.website)
        .bind(&school.address)
        .bind(school.mode.as_deref().unwrap_or_default())
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert school")?;

        Ok(School {
            id: row.try_get("id").context("Failed to read generated id")?,
            created_at: row
                .try_get("created_at")
                .context("Failed to read generated created_at")?,
            version: row
                .try_get("version")
                .context("Failed to read initial version")?,
            name: school.name,
            level: school.level,
            contact: school.contact,
            phone: school.phone,
            email: school.email,
            website: school.website,
            address: school.address,
            mode: school.mode.unwrap_or_default(),
        })
    }

    async fn get_school(&self, id: SchoolId) -> StoreResult<School> {
        if id < 1 {
            return Err(StoreError::NotFound);
        }

        let row = sqlx::query(SELECT_SCHOOL)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch school")?;

        let Some(row) = row else {
            return Err(StoreError::NotFound);
        };

        Ok(school_from_row(&row).context("Failed to decode school row")?)
    }

    async fn update_school(&self, school: &School) -> StoreResult<School> {
        // The version match and increment happen in one statement, so of two
        // writers holding the same version only one can see a row here.
        let row = sqlx::query(
            r#"
            UPDATE schools
            SET name = $1, level = $2, contact = $3,
                phone = $4, email = $5, website = $6,
                address = $7, mode = $8, version = version + 1
            WHERE id = $9 AND version = $10
            RETURNING id, created_at, name, level, contact, phone, email, website, address, mode, version
            "#,
        )
        .bind(&school.name)
        .bind(&school.level)
        .bind(&school.contact)
        .bind(&school.phone)
        .bind(&school.email)
        .bind(&school.website)
        .bind(&school.address)
        .bind(school.mode.as_slice())
        .bind(school.id)
        .bind(school.version)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to update school")?;

        let Some(row) = row else {
            return Err(StoreError::EditConflict);
        };

        // Built from the stored row, so id and created_at are never echoed back
        Ok(school_from_row(&row).context("Failed to decode updated school row")?)
    }

    async fn delete_school(&self, id: SchoolId) -> StoreResult<()> {
        if id < 1 {
            return Err(StoreError::NotFound);
        }

        let result = sqlx::query("DELETE FROM schools WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete school")?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }
}
