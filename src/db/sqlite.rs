use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Row, SqlitePool,
};

use super::{BlueprintStore, Result, StoreError};
use crate::models::{Blueprint, Point};

/// SQLite-backed store. One header row per blueprint, one row per point;
/// the autoincrement point id recovers insertion order on read.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) a file-backed database.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let url = format!("sqlite://{}", path.as_ref().to_string_lossy());
        let opts = SqliteConnectOptions::from_str(&url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await?;
        let store = Self { pool };
        store.bootstrap().await?;
        Ok(store)
    }

    /// Open an in-memory store (handy for tests). Single connection: every
    /// `:memory:` connection is its own database.
    #[allow(dead_code)]
    pub async fn open_memory() -> Result<Self> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await?;
        let store = Self { pool };
        store.bootstrap().await?;
        Ok(store)
    }

    async fn bootstrap(&self) -> Result<()> {
        // WAL keeps concurrent readers unblocked on file-backed DBs.
        let _ = sqlx::query("PRAGMA journal_mode=WAL;")
            .execute(&self.pool)
            .await;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS blueprints (
              author TEXT NOT NULL,
              name TEXT NOT NULL,
              PRIMARY KEY (author, name)
            );
            CREATE TABLE IF NOT EXISTS points (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              author TEXT NOT NULL,
              bpname TEXT NOT NULL,
              x INTEGER NOT NULL,
              y INTEGER NOT NULL,
              FOREIGN KEY (author, bpname) REFERENCES blueprints(author, name)
            );
            CREATE INDEX IF NOT EXISTS idx_points_blueprint ON points(author, bpname);
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn exists_blueprint(&self, author: &str, name: &str) -> Result<bool> {
        let row = sqlx::query("SELECT count(*) AS cnt FROM blueprints WHERE author = ?1 AND name = ?2")
            .bind(author)
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get::<i64, _>("cnt")? > 0)
    }

    async fn points_for(&self, author: &str, name: &str) -> Result<Vec<Point>> {
        let rows = sqlx::query(
            "SELECT x, y FROM points WHERE author = ?1 AND bpname = ?2 ORDER BY id",
        )
        .bind(author)
        .bind(name)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(row_to_point).collect()
    }
}

#[async_trait]
impl BlueprintStore for SqliteStore {
    async fn save(&self, blueprint: &Blueprint) -> Result<()> {
        if self.exists_blueprint(&blueprint.author, &blueprint.name).await? {
            return Err(StoreError::AlreadyExists {
                author: blueprint.author.clone(),
                name: blueprint.name.clone(),
            });
        }

        // Header and points land in one transaction: all rows or none.
        let mut tx = self.pool.begin().await?;
        sqlx::query("INSERT INTO blueprints(author, name) VALUES (?1, ?2)")
            .bind(&blueprint.author)
            .bind(&blueprint.name)
            .execute(&mut *tx)
            .await
            .map_err(|err| {
                // The primary key is the backstop for the race between the
                // count check above and this insert.
                if is_unique_violation(&err) {
                    StoreError::AlreadyExists {
                        author: blueprint.author.clone(),
                        name: blueprint.name.clone(),
                    }
                } else {
                    err.into()
                }
            })?;
        for point in &blueprint.points {
            sqlx::query("INSERT INTO points(author, bpname, x, y) VALUES (?1, ?2, ?3, ?4)")
                .bind(&blueprint.author)
                .bind(&blueprint.name)
                .bind(point.x)
                .bind(point.y)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn get(&self, author: &str, name: &str) -> Result<Blueprint> {
        let row = sqlx::query("SELECT author, name FROM blueprints WHERE author = ?1 AND name = ?2")
            .bind(author)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        if row.is_none() {
            return Err(StoreError::NotFound {
                author: author.to_owned(),
                name: name.to_owned(),
            });
        }
        let points = self.points_for(author, name).await?;
        Ok(Blueprint::new(author, name, points))
    }

    async fn get_by_author(&self, author: &str) -> Result<HashSet<Blueprint>> {
        let names: Vec<String> = sqlx::query("SELECT name FROM blueprints WHERE author = ?1")
            .bind(author)
            .fetch(&self.pool)
            .and_then(|row| async move { row.try_get::<String, _>("name") })
            .try_collect()
            .await?;
        if names.is_empty() {
            return Err(StoreError::AuthorNotFound {
                author: author.to_owned(),
            });
        }

        let mut out = HashSet::with_capacity(names.len());
        for name in names {
            let points = self.points_for(author, &name).await?;
            out.insert(Blueprint::new(author, name, points));
        }
        Ok(out)
    }

    async fn get_all(&self) -> Result<HashSet<Blueprint>> {
        let keys: Vec<(String, String)> = sqlx::query("SELECT author, name FROM blueprints")
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(|row| {
                Ok((
                    row.try_get::<String, _>("author")?,
                    row.try_get::<String, _>("name")?,
                ))
            })
            .collect::<Result<_>>()?;

        let mut out = HashSet::with_capacity(keys.len());
        for (author, name) in keys {
            let points = self.points_for(&author, &name).await?;
            out.insert(Blueprint::new(author, name, points));
        }
        Ok(out)
    }

    async fn add_point(&self, author: &str, name: &str, x: i64, y: i64) -> Result<()> {
        if !self.exists_blueprint(author, name).await? {
            return Err(StoreError::NotFound {
                author: author.to_owned(),
                name: name.to_owned(),
            });
        }
        sqlx::query("INSERT INTO points(author, bpname, x, y) VALUES (?1, ?2, ?3, ?4)")
            .bind(author)
            .bind(name)
            .bind(x)
            .bind(y)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

// -- helpers

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn row_to_point(row: SqliteRow) -> Result<Point> {
    Ok(Point::new(row.try_get("x")?, row.try_get("y")?))
}
