use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use sqlx::{
    Row, Sqlite,
    query::Query as SqlxQuery,
    sqlite::{SqliteArguments, SqlitePool, SqlitePoolOptions, SqliteRow},
};

use crate::{
    adapters::{Adapter, ResourceRecord},
    error::Error,
    query::{Comparison, IndexMeta, IndexValue, Query, QueryFilter},
};

/// SQLite adapter using a unified JSON storage model
///
/// Schema:
/// ```sql
/// CREATE TABLE resources (
///     type TEXT NOT NULL,
///     id TEXT NOT NULL,
///     version INTEGER NOT NULL,
///     created_at TEXT NOT NULL,
///     updated_at TEXT NOT NULL,
///     data TEXT NOT NULL,
///     index_meta TEXT NOT NULL,
///     PRIMARY KEY (type, id)
/// );
/// ```
pub struct SqliteAdapter {
    pub(crate) pool: SqlitePool,
}

impl SqliteAdapter {
    /// Create a new SQLite adapter with a file-based database
    pub async fn new_file(path: &str) -> Result<Self, Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&format!("sqlite:{}?mode=rwc", path))
            .await
            .map_err(|e| Error::Storage(e.to_string()))?;

        Ok(Self { pool })
    }

    /// Create a new SQLite adapter with an in-memory database
    pub async fn new_memory() -> Result<Self, Error> {
        // every connection would get its own in-memory database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| Error::Storage(e.to_string()))?;

        Ok(Self { pool })
    }

    /// Create from an existing pool
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the database schema
    pub async fn init_schema(&self) -> Result<(), Error> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| Error::Storage(err.to_string()))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS resources (
                type TEXT NOT NULL,
                id TEXT NOT NULL,
                version INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                data TEXT NOT NULL,
                index_meta TEXT NOT NULL,
                PRIMARY KEY (type, id)
            )
            "#,
        )
        .execute(&mut *tx)
        .await
        .map_err(|e| Error::Storage(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_resources_type_updated ON resources(type, updated_at DESC)
            "#,
        )
        .execute(&mut *tx)
        .await
        .map_err(|e| Error::Storage(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| Error::Storage(e.to_string()))?;

        Ok(())
    }
}

impl SqliteAdapter {
    fn map_row_to_record(row: SqliteRow) -> Result<ResourceRecord, Error> {
        let data_str: String = row
            .try_get("data")
            .map_err(|e| Error::Deserialize(e.to_string()))?;
        let data: serde_json::Value =
            serde_json::from_str(&data_str).map_err(|e| Error::Deserialize(e.to_string()))?;

        let index_str: String = row
            .try_get("index_meta")
            .map_err(|e| Error::Deserialize(e.to_string()))?;
        let index_meta: IndexMeta =
            serde_json::from_str(&index_str).map_err(|e| Error::Deserialize(e.to_string()))?;

        let type_name = row
            .try_get::<String, _>("type")
            .map_err(|e| Error::Deserialize(e.to_string()))?;

        let id = row
            .try_get::<String, _>("id")
            .map_err(|e| Error::Deserialize(e.to_string()))?;

        let version = row
            .try_get::<i64, _>("version")
            .map_err(|e| Error::Deserialize(e.to_string()))?;

        let created_at_str: String = row
            .try_get("created_at")
            .map_err(|e| Error::Deserialize(e.to_string()))?;

        let updated_at_str: String = row
            .try_get("updated_at")
            .map_err(|e| Error::Deserialize(e.to_string()))?;

        let created_at = chrono::DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|e| Error::Deserialize(e.to_string()))?
            .with_timezone(&Utc);

        let updated_at = chrono::DateTime::parse_from_rfc3339(&updated_at_str)
            .map_err(|e| Error::Deserialize(e.to_string()))?
            .with_timezone(&Utc);

        Ok(ResourceRecord {
            id,
            type_name,
            version: version as u64,
            data,
            index_meta,
            created_at,
            updated_at,
        })
    }

    fn build_filter_condition(filter: &QueryFilter) -> String {
        format!(
            "json_extract(index_meta, '$.{}') {} ?",
            filter.field.name,
            filter.comparison.sql_operator()
        )
    }

    fn build_where_clause(query: &Query) -> String {
        let mut conditions = vec!["type = ?".to_string()];
        conditions.extend(query.filters.iter().map(Self::build_filter_condition));
        format!("WHERE {}", conditions.join(" AND "))
    }

    fn query_bind_filters<'a>(
        mut query: SqlxQuery<'a, Sqlite, SqliteArguments<'a>>,
        filters: &'a [QueryFilter],
    ) -> SqlxQuery<'a, Sqlite, SqliteArguments<'a>> {
        for filter in filters {
            query = match &filter.value {
                IndexValue::String(s) => match filter.comparison {
                    Comparison::BeginsWith => query.bind(format!("{}%", s)),
                    Comparison::Contains => query.bind(format!("%{}%", s)),
                    _ => query.bind(s.as_str()),
                },
                IndexValue::Int(i) => query.bind(*i),
                IndexValue::Float(f) => query.bind(*f),
                IndexValue::Bool(b) => query.bind(*b),
                IndexValue::Timestamp(t) => {
                    query.bind(t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
                }
            };
        }
        query
    }

    fn to_text(value: &impl serde::Serialize) -> Result<String, Error> {
        serde_json::to_string(value).map_err(|e| Error::Serialize(e.to_string()))
    }
}

#[async_trait]
impl Adapter for SqliteAdapter {
    async fn insert_records(&self, records: Vec<ResourceRecord>) -> Result<(), Error> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| Error::Storage(err.to_string()))?;

        for record in records {
            sqlx::query(
                r#"
                INSERT INTO resources (type, id, version, created_at, updated_at, data, index_meta)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&record.type_name)
            .bind(&record.id)
            .bind(record.version as i64)
            .bind(record.created_at.to_rfc3339())
            .bind(record.updated_at.to_rfc3339())
            .bind(Self::to_text(&record.data)?)
            .bind(Self::to_text(&record.index_meta)?)
            .execute(&mut *tx)
            .await
            .map_err(|err| match &err {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    Error::DuplicateKey(record.key())
                }
                _ => Error::Storage(err.to_string()),
            })?;
        }

        // an early return drops `tx`, which rolls the whole batch back
        tx.commit()
            .await
            .map_err(|e| Error::Storage(e.to_string()))?;

        Ok(())
    }

    async fn fetch_record(
        &self,
        type_name: &str,
        id: &str,
    ) -> Result<Option<ResourceRecord>, Error> {
        let row = sqlx::query(
            r#"
            SELECT type, id, version, created_at, updated_at, data, index_meta
            FROM resources
            WHERE type = ? AND id = ?
            "#,
        )
        .bind(type_name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| Error::Storage(err.to_string()))?;

        row.map(Self::map_row_to_record).transpose()
    }

    async fn update_record(&self, record: ResourceRecord) -> Result<Option<ResourceRecord>, Error> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| Error::Storage(err.to_string()))?;

        let result = sqlx::query(
            r#"
            UPDATE resources
            SET version = version + 1, updated_at = ?, data = ?, index_meta = ?
            WHERE type = ? AND id = ? AND version = ?
            "#,
        )
        .bind(Utc::now().to_rfc3339())
        .bind(Self::to_text(&record.data)?)
        .bind(Self::to_text(&record.index_meta)?)
        .bind(&record.type_name)
        .bind(&record.id)
        .bind(record.version as i64)
        .execute(&mut *tx)
        .await
        .map_err(|err| Error::Storage(err.to_string()))?;

        let row = sqlx::query(
            r#"
            SELECT type, id, version, created_at, updated_at, data, index_meta
            FROM resources
            WHERE type = ? AND id = ?
            "#,
        )
        .bind(&record.type_name)
        .bind(&record.id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|err| Error::Storage(err.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| Error::Storage(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let stored = Self::map_row_to_record(row)?;

        if result.rows_affected() == 0 {
            return Err(Error::Conflict(format!(
                "{} is at version {}, update was based on version {}",
                record.key(),
                stored.version,
                record.version
            )));
        }

        Ok(Some(stored))
    }

    async fn delete_record(
        &self,
        type_name: &str,
        id: &str,
    ) -> Result<Option<ResourceRecord>, Error> {
        // a single write statement takes the write lock up front, so
        // concurrent deletes queue on the busy timeout instead of failing
        let row = sqlx::query(
            r#"
            DELETE FROM resources
            WHERE type = ? AND id = ?
            RETURNING type, id, version, created_at, updated_at, data, index_meta
            "#,
        )
        .bind(type_name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| Error::Storage(err.to_string()))?;

        row.map(Self::map_row_to_record).transpose()
    }

    async fn query_records(
        &self,
        type_name: &str,
        query: &Query,
    ) -> Result<Vec<ResourceRecord>, Error> {
        let mut sql = format!(
            r#"
            SELECT type, id, version, created_at, updated_at, data, index_meta
            FROM resources
            {}
            ORDER BY id ASC
            "#,
            Self::build_where_clause(query)
        );

        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        let mut sqlx_query = sqlx::query(&sql).bind(type_name);
        sqlx_query = Self::query_bind_filters(sqlx_query, &query.filters);

        let rows = sqlx_query
            .fetch_all(&self.pool)
            .await
            .map_err(|err| Error::QueryFailure(err.to_string()))?;

        rows.into_iter().map(Self::map_row_to_record).collect()
    }

    async fn count_records(&self, type_name: &str, query: Option<&Query>) -> Result<u64, Error> {
        let empty = Query::default();
        let query = query.unwrap_or(&empty);

        let sql = format!(
            "SELECT COUNT(*) AS count FROM resources {}",
            Self::build_where_clause(query)
        );

        let mut sqlx_query = sqlx::query(&sql).bind(type_name);
        sqlx_query = Self::query_bind_filters(sqlx_query, &query.filters);

        let row = sqlx_query
            .fetch_one(&self.pool)
            .await
            .map_err(|err| Error::QueryFailure(err.to_string()))?;

        let count: i64 = row
            .try_get("count")
            .map_err(|e| Error::Deserialize(e.to_string()))?;
        Ok(count as u64)
    }
}
