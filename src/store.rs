//! Data-Store Gateway: per-call PostgreSQL access for extracted values.

use async_trait::async_trait;
use sqlx::postgres::PgConnectOptions;
use sqlx::{Connection, PgConnection, Postgres, QueryBuilder};

use crate::config::StoreSettings;
use crate::error::{Error, Result};

/// Which extraction table a call targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Email,
    Phone,
}

impl RecordKind {
    fn table(self) -> &'static str {
        match self {
            RecordKind::Email => "email_table",
            RecordKind::Phone => "phone_table",
        }
    }

    fn column(self) -> &'static str {
        match self {
            RecordKind::Email => "email",
            RecordKind::Phone => "phone",
        }
    }
}

/// A stored extraction row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub id: i32,
    pub value: String,
}

/// Narrow contract the dispatcher and dialogues need from the store.
#[async_trait]
pub trait Store: Send + Sync {
    /// List all stored records of `kind`, ordered by id.
    async fn list(&self, kind: RecordKind) -> Result<Vec<StoredRecord>>;

    /// Persist `values` as new records of `kind` in one statement.
    async fn save(&self, kind: RecordKind, values: &[String]) -> Result<()>;
}

/// PostgreSQL-backed store. A connection is opened per call and dropped on
/// every exit path; values are bound as statement parameters, never spliced
/// into the statement text.
pub struct PgStore {
    options: PgConnectOptions,
}

impl PgStore {
    pub fn new(settings: &StoreSettings) -> Self {
        let options = PgConnectOptions::new()
            .host(&settings.host)
            .port(settings.port)
            .username(&settings.user)
            .password(&settings.password)
            .database(&settings.database);
        Self { options }
    }

    async fn connect(&self) -> Result<PgConnection> {
        let conn = PgConnection::connect_with(&self.options)
            .await
            .map_err(|e| Error::Store(format!("connect: {}", e)))?;
        tracing::debug!("Connected to PostgreSQL");
        Ok(conn)
    }

    /// Connectivity probe used by `opsrelay doctor`.
    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.connect().await?;
        sqlx::query("SELECT 1")
            .execute(&mut conn)
            .await
            .map_err(|e| Error::Store(format!("ping: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn list(&self, kind: RecordKind) -> Result<Vec<StoredRecord>> {
        let mut conn = self.connect().await?;
        let sql = format!(
            "SELECT id, {} FROM {} ORDER BY id",
            kind.column(),
            kind.table()
        );
        let rows: Vec<(i32, String)> = sqlx::query_as(&sql)
            .fetch_all(&mut conn)
            .await
            .map_err(|e| Error::Store(format!("select from {}: {}", kind.table(), e)))?;

        tracing::info!("Retrieved {} rows from {}", rows.len(), kind.table());
        Ok(rows
            .into_iter()
            .map(|(id, value)| StoredRecord { id, value })
            .collect())
    }

    async fn save(&self, kind: RecordKind, values: &[String]) -> Result<()> {
        if values.is_empty() {
            return Ok(());
        }

        let mut conn = self.connect().await?;
        let mut tx = conn
            .begin()
            .await
            .map_err(|e| Error::Store(format!("begin: {}", e)))?;

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("INSERT INTO {} ({}) ", kind.table(), kind.column()));
        builder.push_values(values, |mut row, value| {
            row.push_bind(value);
        });

        if let Err(e) = builder.build().execute(&mut *tx).await {
            let _ = tx.rollback().await;
            return Err(Error::Store(format!("insert into {}: {}", kind.table(), e)));
        }

        tx.commit()
            .await
            .map_err(|e| Error::Store(format!("commit: {}", e)))?;
        tracing::info!("Saved {} values into {}", values.len(), kind.table());
        Ok(())
    }
}
