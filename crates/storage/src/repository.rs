//! Tabloid repository using PostgreSQL.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool, Postgres, Transaction};
use tracing::debug;

use tabloid_common::{ImageReference, Region, TabloidDraft, TabloidError, TabloidRecord, TabloidResult};

/// Database connection pool and tabloid table operations.
pub struct TabloidRepository {
    pool: PgPool,
}

impl TabloidRepository {
    /// Create a new repository connection from database URL.
    pub async fn connect(database_url: &str) -> TabloidResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| TabloidError::StorageUnavailable(format!("Connection failed: {}", e)))?;

        Ok(Self { pool })
    }

    /// Build a repository over an existing pool.
    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> TabloidResult<()> {
        // Split SQL statements and execute them individually
        for statement in SCHEMA_SQL.split(';') {
            let trimmed = statement.trim();
            if !trimmed.is_empty() {
                sqlx::query(trimmed)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| {
                        TabloidError::StorageUnavailable(format!("Migration failed: {}", e))
                    })?;
            }
        }

        Ok(())
    }

    /// Look up one region by id. Pure read, no side effects.
    pub async fn find_region(&self, region_id: i64) -> TabloidResult<Option<Region>> {
        let row = sqlx::query_as::<_, RegionRow>(
            "SELECT id, name, created_at, updated_at FROM region WHERE id = $1 LIMIT 1",
        )
        .bind(region_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| TabloidError::StorageUnavailable(format!("Query failed: {}", e)))?;

        Ok(row.map(|r| r.into()))
    }

    /// Begin a transaction scoping one ingestion's relational writes.
    pub async fn begin(&self) -> TabloidResult<TabloidTx> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| TabloidError::StorageUnavailable(format!("Begin failed: {}", e)))?;

        Ok(TabloidTx { tx })
    }

    /// Read back a committed tabloid record by id.
    pub async fn get_tabloid(&self, tabloid_id: i64) -> TabloidResult<Option<TabloidRecord>> {
        let row = sqlx::query_as::<_, TabloidRow>(
            "SELECT id, name, region_id, start_validity, end_validity, active, created_at \
             FROM tabloid WHERE id = $1 LIMIT 1",
        )
        .bind(tabloid_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| TabloidError::StorageUnavailable(format!("Query failed: {}", e)))?;

        Ok(row.map(|r| r.into()))
    }

    /// Read back the image references of a committed tabloid, page order first.
    pub async fn list_image_refs(&self, tabloid_id: i64) -> TabloidResult<Vec<ImageReference>> {
        let rows = sqlx::query_as::<_, ImageRefRow>(
            "SELECT object_key, tabloid_id, page_order, created_at \
             FROM image_reference WHERE tabloid_id = $1 ORDER BY page_order ASC",
        )
        .bind(tabloid_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| TabloidError::StorageUnavailable(format!("Query failed: {}", e)))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }
}

/// One open relational transaction.
///
/// Everything written through this handle becomes visible together on
/// commit or not at all. The handle is exclusively owned by the ingestion
/// that created it; commit and rollback consume it.
pub struct TabloidTx {
    tx: Transaction<'static, Postgres>,
}

impl TabloidTx {
    /// Insert the tabloid metadata row and return the generated id.
    pub async fn insert_tabloid(&mut self, draft: &TabloidDraft) -> TabloidResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO tabloid (name, region_id, start_validity, end_validity, active, created_at) \
             VALUES ($1, $2, $3, $4, TRUE, NOW()) RETURNING id",
        )
        .bind(&draft.name)
        .bind(draft.region_id)
        .bind(draft.start_validity)
        .bind(draft.end_validity)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_write_err)?;

        debug!(tabloid_id = id, "Inserted tabloid row");
        Ok(id)
    }

    /// Insert the image reference row for an already-stored object key.
    pub async fn insert_image_ref(
        &mut self,
        object_key: &str,
        tabloid_id: i64,
        position: i32,
    ) -> TabloidResult<()> {
        sqlx::query(
            "INSERT INTO image_reference (object_key, tabloid_id, page_order, created_at) \
             VALUES ($1, $2, $3, NOW())",
        )
        .bind(object_key)
        .bind(tabloid_id)
        .bind(position)
        .execute(&mut *self.tx)
        .await
        .map_err(map_write_err)?;

        debug!(tabloid_id = tabloid_id, position = position, "Inserted image reference row");
        Ok(())
    }

    /// Make every write issued through this handle visible.
    pub async fn commit(self) -> TabloidResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| TabloidError::StorageUnavailable(format!("Commit failed: {}", e)))
    }

    /// Discard every write issued through this handle.
    pub async fn rollback(self) -> TabloidResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| TabloidError::StorageUnavailable(format!("Rollback failed: {}", e)))
    }
}

/// Map a write error: SQLSTATE class 23 is an integrity violation (bad
/// foreign key, duplicate, null), everything else is the store being
/// unavailable.
fn map_write_err(e: sqlx::Error) -> TabloidError {
    if let sqlx::Error::Database(ref db) = e {
        if db.code().map(|c| c.starts_with("23")).unwrap_or(false) {
            return TabloidError::ConstraintViolation(db.message().to_string());
        }
    }
    TabloidError::StorageUnavailable(format!("Insert failed: {}", e))
}

/// Internal row types for database queries.
#[derive(FromRow)]
struct RegionRow {
    id: i64,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<RegionRow> for Region {
    fn from(row: RegionRow) -> Self {
        Region {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct TabloidRow {
    id: i64,
    name: String,
    region_id: i64,
    start_validity: NaiveDate,
    end_validity: NaiveDate,
    active: bool,
    created_at: DateTime<Utc>,
}

impl From<TabloidRow> for TabloidRecord {
    fn from(row: TabloidRow) -> Self {
        TabloidRecord {
            id: row.id,
            name: row.name,
            region_id: row.region_id,
            start_validity: row.start_validity,
            end_validity: row.end_validity,
            active: row.active,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct ImageRefRow {
    object_key: String,
    tabloid_id: i64,
    page_order: i32,
    created_at: DateTime<Utc>,
}

impl From<ImageRefRow> for ImageReference {
    fn from(row: ImageRefRow) -> Self {
        ImageReference {
            object_key: row.object_key,
            tabloid_id: row.tabloid_id,
            position: row.page_order,
            created_at: row.created_at,
        }
    }
}

/// Database schema SQL.
///
/// The region table is owned by an external system in production; it is
/// created here so dev and test environments satisfy the foreign key.
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS region (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(100) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS tabloid (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(200) NOT NULL,
    region_id BIGINT NOT NULL REFERENCES region(id),
    start_validity DATE NOT NULL,
    end_validity DATE NOT NULL,
    active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_tabloid_region ON tabloid(region_id);

CREATE TABLE IF NOT EXISTS image_reference (
    id BIGSERIAL PRIMARY KEY,
    object_key TEXT NOT NULL,
    tabloid_id BIGINT NOT NULL REFERENCES tabloid(id),
    page_order INTEGER NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_image_reference_tabloid ON image_reference(tabloid_id);
"#;
