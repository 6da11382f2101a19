use async_trait::async_trait;
use common::SagaId;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::entry::{LogEntry, Subject};
use crate::error::{Result, SagaLogError};
use crate::log::SagaLog;

/// PostgreSQL-backed saga log.
#[derive(Clone)]
pub struct PostgresSagaLog {
    pool: PgPool,
}

impl PostgresSagaLog {
    /// Creates a new PostgreSQL saga log.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_entry(row: PgRow) -> Result<LogEntry> {
        let subject = match row.try_get::<String, _>("subject")?.as_str() {
            "saga" => Subject::Saga,
            _ => {
                let name: Option<String> = row.try_get("step_name")?;
                Subject::Step(name.unwrap_or_default())
            }
        };

        Ok(LogEntry {
            saga_id: SagaId::from_uuid(row.try_get::<Uuid, _>("saga_id")?),
            subject,
            state: row.try_get("state")?,
            timestamp: row.try_get("timestamp")?,
        })
    }
}

#[async_trait]
impl SagaLog for PostgresSagaLog {
    async fn append(&self, entry: LogEntry) -> Result<()> {
        let (subject, step_name) = match &entry.subject {
            Subject::Saga => ("saga", None),
            Subject::Step(name) => ("step", Some(name.as_str())),
        };

        sqlx::query(
            r#"
            INSERT INTO saga_log (saga_id, subject, step_name, state, timestamp)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(entry.saga_id.as_uuid())
        .bind(subject)
        .bind(step_name)
        .bind(&entry.state)
        .bind(entry.timestamp)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_saga_id(&self, saga_id: SagaId) -> Result<Vec<LogEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT saga_id, subject, step_name, state, timestamp
            FROM saga_log
            WHERE saga_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(saga_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_entry).collect()
    }

    async fn update_latest_state(&self, saga_id: SagaId, new_state: &str) -> Result<()> {
        // The summary entry is the first saga-level row appended for this saga.
        let result = sqlx::query(
            r#"
            UPDATE saga_log
            SET state = $2
            WHERE id = (
                SELECT MIN(id) FROM saga_log
                WHERE saga_id = $1 AND subject = 'saga'
            )
            "#,
        )
        .bind(saga_id.as_uuid())
        .bind(new_state)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(SagaLogError::NoSagaEntry(saga_id));
        }
        Ok(())
    }
}
