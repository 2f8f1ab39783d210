//! Message repository: SQLite implementation of [`MessageStore`].
//!
//! Uses SqlitePoolManager and [`MessageRecord`]. One table keyed by message id, with indexes on
//! `channel_id` (window scan) and `referenced_id` (chain walk).

use crate::error::StorageError;
use crate::models::{MessageRecord, MessageRow};
use crate::repository::MessageStore;
use crate::sqlite_pool::SqlitePoolManager;
use async_trait::async_trait;
use tracing::{debug, info};

const SELECT_COLUMNS: &str = "SELECT id, channel_id, author_id, content, is_bot_message, attachments, referenced_id, created_at FROM messages";

#[derive(Clone)]
pub struct MessageRepository {
    pool_manager: SqlitePoolManager,
}

impl MessageRepository {
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let pool_manager = SqlitePoolManager::new(database_url).await?;
        let repo = Self { pool_manager };
        repo.init().await?;
        Ok(repo)
    }

    async fn init(&self) -> Result<(), StorageError> {
        info!("Creating database tables if not exist");

        let pool = self.pool_manager.pool();

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                id TEXT PRIMARY KEY,
                channel_id TEXT NOT NULL,
                author_id TEXT NOT NULL,
                content TEXT NOT NULL,
                is_bot_message BOOLEAN NOT NULL,
                attachments TEXT NOT NULL DEFAULT '[]',
                referenced_id TEXT,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_messages_channel_id ON messages(channel_id);
            CREATE INDEX IF NOT EXISTS idx_messages_referenced_id ON messages(referenced_id);
            CREATE INDEX IF NOT EXISTS idx_messages_created_at ON messages(created_at);
            "#,
        )
        .execute(pool)
        .await?;

        info!("Database tables created successfully");
        Ok(())
    }

    /// Number of stored messages.
    pub async fn count(&self) -> Result<i64, StorageError> {
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages")
            .fetch_one(self.pool_manager.pool())
            .await?;
        Ok(total.0)
    }

    /// Closes the underlying pool. Used on shutdown.
    pub async fn close(&self) {
        self.pool_manager.close().await;
    }
}

#[async_trait]
impl MessageStore for MessageRepository {
    async fn upsert(&self, record: &MessageRecord) -> Result<(), StorageError> {
        let pool = self.pool_manager.pool();
        let attachments = serde_json::to_string(&record.attachments)?;

        sqlx::query(
            r#"
            INSERT INTO messages (id, channel_id, author_id, content, is_bot_message, attachments, referenced_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                channel_id = excluded.channel_id,
                author_id = excluded.author_id,
                content = excluded.content,
                is_bot_message = excluded.is_bot_message,
                attachments = excluded.attachments,
                referenced_id = excluded.referenced_id,
                created_at = excluded.created_at
            "#,
        )
        .bind(&record.id)
        .bind(&record.channel_id)
        .bind(&record.author_id)
        .bind(&record.content)
        .bind(record.is_bot_message)
        .bind(&attachments)
        .bind(&record.referenced_id)
        .bind(record.created_at)
        .execute(pool)
        .await?;

        debug!(
            message_id = %record.id,
            channel_id = %record.channel_id,
            referenced_id = ?record.referenced_id,
            "Upserted message"
        );
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<MessageRecord>, StorageError> {
        let pool = self.pool_manager.pool();

        let row = sqlx::query_as::<_, MessageRow>(&format!("{} WHERE id = ?", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(MessageRecord::from))
    }

    async fn get_recent_window(
        &self,
        channel_id: &str,
        limit: i64,
    ) -> Result<Vec<MessageRecord>, StorageError> {
        let pool = self.pool_manager.pool();

        let rows: Vec<MessageRow> = sqlx::query_as::<_, MessageRow>(&format!(
            "{} WHERE channel_id = ? ORDER BY created_at DESC LIMIT ?",
            SELECT_COLUMNS
        ))
        .bind(channel_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        debug!(
            channel_id = %channel_id,
            count = rows.len(),
            "Retrieved recent channel window"
        );

        Ok(rows.into_iter().map(MessageRecord::from).collect())
    }
}
