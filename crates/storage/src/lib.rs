use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use shared::protocol::DatasetGrant;

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ApiKeyId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DatasetId(pub i64);

#[derive(Debug, Clone, Serialize)]
pub struct ApiKeyRecord {
    pub id: ApiKeyId,
    pub api_key: String,
    pub label: Option<String>,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    /// Registers `api_key`, or refreshes its label and un-revokes it when it
    /// already exists.
    pub async fn create_api_key(&self, api_key: &str, label: Option<&str>) -> Result<ApiKeyId> {
        let rec = sqlx::query(
            "INSERT INTO api_keys (api_key, label) VALUES (?, ?)
             ON CONFLICT(api_key) DO UPDATE SET label = COALESCE(excluded.label, label), revoked = 0
             RETURNING id",
        )
        .bind(api_key)
        .bind(label)
        .fetch_one(&self.pool)
        .await?;
        Ok(ApiKeyId(rec.get::<i64, _>(0)))
    }

    /// Returns `false` when the key was never registered.
    pub async fn revoke_api_key(&self, api_key: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE api_keys SET revoked = 1 WHERE api_key = ?")
            .bind(api_key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn api_key_status(&self, api_key: &str) -> Result<Option<ApiKeyRecord>> {
        let row = sqlx::query(
            "SELECT id, api_key, label, revoked, created_at FROM api_keys WHERE api_key = ?",
        )
        .bind(api_key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| ApiKeyRecord {
            id: ApiKeyId(r.get::<i64, _>(0)),
            api_key: r.get::<String, _>(1),
            label: r.get::<Option<String>, _>(2),
            revoked: r.get::<bool, _>(3),
            created_at: r.get::<DateTime<Utc>, _>(4),
        }))
    }

    pub async fn create_dataset(&self, name: &str) -> Result<DatasetId> {
        let rec = sqlx::query(
            "INSERT INTO datasets (name) VALUES (?)
             ON CONFLICT(name) DO UPDATE SET name=excluded.name
             RETURNING id",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(DatasetId(rec.get::<i64, _>(0)))
    }

    /// Grants `dataset` to `api_key`, creating the dataset on first use.
    /// Granting twice is a no-op.
    pub async fn grant_dataset(&self, api_key: &str, dataset: &str) -> Result<()> {
        let record = self
            .api_key_status(api_key)
            .await?
            .ok_or_else(|| anyhow!("api key '{api_key}' is not registered"))?;
        let dataset_id = self.create_dataset(dataset).await?;
        sqlx::query(
            "INSERT INTO dataset_grants (api_key_id, dataset_id) VALUES (?, ?)
             ON CONFLICT(api_key_id, dataset_id) DO NOTHING",
        )
        .bind(record.id.0)
        .bind(dataset_id.0)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to grant dataset '{dataset}'"))?;
        Ok(())
    }

    pub async fn revoke_dataset(&self, api_key: &str, dataset: &str) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM dataset_grants
             WHERE api_key_id = (SELECT id FROM api_keys WHERE api_key = ?)
               AND dataset_id = (SELECT id FROM datasets WHERE name = ?)",
        )
        .bind(api_key)
        .bind(dataset)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Dataset names granted to `api_key`, ordered by name. Revocation is not
    /// considered here.
    pub async fn datasets_for_key(&self, api_key: &str) -> Result<Vec<String>> {
        let rows = sqlx::query(
            "SELECT d.name
             FROM datasets d
             INNER JOIN dataset_grants g ON g.dataset_id = d.id
             INNER JOIN api_keys k ON k.id = g.api_key_id
             WHERE k.api_key = ?
             ORDER BY d.name",
        )
        .bind(api_key)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|r| r.get::<String, _>(0)).collect())
    }

    pub async fn list_grants(&self) -> Result<Vec<DatasetGrant>> {
        let rows = sqlx::query(
            "SELECT k.api_key, d.name
             FROM dataset_grants g
             INNER JOIN api_keys k ON k.id = g.api_key_id
             INNER JOIN datasets d ON d.id = g.dataset_id
             ORDER BY k.api_key, d.name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| DatasetGrant {
                api_key: r.get::<String, _>(0),
                dataset: r.get::<String, _>(1),
            })
            .collect())
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
