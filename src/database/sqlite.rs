// ABOUTME: SQLite conversation store built on a sqlx pool with inline schema migrations
// ABOUTME: Messages are positioned per conversation and metadata is stored as JSON text
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use lexdraft_core::models::{
    Conversation, ConversationStatus, ConversationSummary, Message, MessageMetadata, MessageRole,
    MetadataType, NewConversation,
};
use lexdraft_core::pagination::{ListQuery, Page, SortField, SortOrder};
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::{now, ConversationStore, DatabaseError, DatabaseResult};

/// Conversation store persisted in `SQLite`
#[derive(Clone)]
pub struct SqliteConversationStore {
    pool: SqlitePool,
}

impl SqliteConversationStore {
    /// Open (creating if needed) the database at `database_url` and migrate it
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created, the pool
    /// cannot connect, or a migration fails
    pub async fn connect(database_url: &str) -> DatabaseResult<Self> {
        if database_url.contains(":memory:") {
            return Self::in_memory().await;
        }

        let path = database_url.strip_prefix("sqlite:").unwrap_or(database_url);
        let path = path.strip_prefix("//").unwrap_or(path);
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| DatabaseError::QueryError {
                        context: format!(
                            "Failed to create database directory {}: {e}",
                            parent.display()
                        ),
                        source: None,
                    })?;
            }
        }

        let connection_string = format!("sqlite:{path}?mode=rwc");
        let pool = SqlitePoolOptions::new()
            .connect(&connection_string)
            .await
            .map_err(|e| DatabaseError::query(format!("Failed to open {path}"), e))?;

        info!(path = %path, "Opened SQLite conversation store");
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// In-memory database on a single pinned connection
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or migration fails
    pub async fn in_memory() -> DatabaseResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| DatabaseError::query("Failed to open in-memory database", e))?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Create tables and indexes if they do not exist
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails
    pub async fn migrate(&self) -> DatabaseResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS conversations (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT,
                status TEXT NOT NULL DEFAULT 'active'
                    CHECK (status IN ('active', 'archived', 'deleted')),
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::query("Failed to create conversations table", e))?;

        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_conversations_user_status
            ON conversations (user_id, status)
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::query("Failed to create conversations index", e))?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS conversation_messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                conversation_id TEXT NOT NULL REFERENCES conversations(id) ON DELETE CASCADE,
                position INTEGER NOT NULL,
                role TEXT NOT NULL CHECK (role IN ('system', 'user', 'assistant')),
                content TEXT NOT NULL,
                metadata TEXT NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE (conversation_id, position)
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::query("Failed to create conversation_messages table", e))?;

        debug!("Conversation schema ready");
        Ok(())
    }

    /// Move `from` -> `to` only if the stored status is still `from`
    ///
    /// Returns whether a row changed.
    async fn update_status_from(
        &self,
        conversation_id: &str,
        user_id: &str,
        from: ConversationStatus,
        to: ConversationStatus,
        updated_at: &DateTime<Utc>,
    ) -> DatabaseResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE conversations
            SET status = $1, updated_at = $2
            WHERE id = $3 AND user_id = $4 AND status = $5
            ",
        )
        .bind(to.as_str())
        .bind(format_timestamp(updated_at))
        .bind(conversation_id)
        .bind(user_id)
        .bind(from.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::query("Failed to update conversation status", e))?;

        Ok(result.rows_affected() > 0)
    }

    /// Underlying pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn load_messages(&self, conversation_id: &str) -> DatabaseResult<Vec<Message>> {
        let rows = sqlx::query(
            r"
            SELECT role, content, metadata, created_at
            FROM conversation_messages
            WHERE conversation_id = $1
            ORDER BY position ASC
            ",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::query("Failed to load messages", e))?;

        rows.iter().map(message_from_row).collect()
    }
}

fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str) -> DatabaseResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| DatabaseError::Corrupt(format!("invalid timestamp {value}: {e}")))
}

fn column<'r, T>(row: &'r SqliteRow, name: &str) -> DatabaseResult<T>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(name)
        .map_err(|e| DatabaseError::query(format!("Failed to read column {name}"), e))
}

fn message_from_row(row: &SqliteRow) -> DatabaseResult<Message> {
    let role: String = column(row, "role")?;
    let metadata: String = column(row, "metadata")?;
    let created_at: String = column(row, "created_at")?;

    Ok(Message {
        role: role
            .parse()
            .map_err(|_| DatabaseError::Corrupt(format!("unknown message role {role}")))?,
        content: column(row, "content")?,
        metadata: serde_json::from_str(&metadata).map_err(|e| DatabaseError::Serialization {
            context: "message metadata".into(),
            source: e,
        })?,
        timestamp: parse_timestamp(&created_at)?,
    })
}

fn status_from_row(row: &SqliteRow) -> DatabaseResult<ConversationStatus> {
    let status: String = column(row, "status")?;
    status
        .parse()
        .map_err(|_| DatabaseError::Corrupt(format!("unknown conversation status {status}")))
}

fn order_clause(query: &ListQuery) -> String {
    let column = match query.sort_by {
        SortField::CreatedAt => "c.created_at",
        SortField::UpdatedAt => "c.updated_at",
        SortField::Title => "c.title COLLATE NOCASE",
    };
    let direction = match query.sort_order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };
    format!("{column} {direction}, c.id {direction}")
}

#[async_trait]
impl ConversationStore for SqliteConversationStore {
    #[instrument(skip_all, fields(user_id = %new.user_id))]
    async fn create(&self, new: NewConversation) -> DatabaseResult<Conversation> {
        let id = Uuid::new_v4().to_string();
        let created_at = now();
        let stamp = format_timestamp(&created_at);
        let seed = Message {
            role: MessageRole::System,
            content: new.seed_system_message,
            metadata: MessageMetadata::of(MetadataType::System),
            timestamp: created_at,
        };
        let metadata =
            serde_json::to_string(&seed.metadata).map_err(|e| DatabaseError::Serialization {
                context: "message metadata".into(),
                source: e,
            })?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DatabaseError::query("Failed to begin transaction", e))?;

        sqlx::query(
            r"
            INSERT INTO conversations (id, user_id, title, description, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, 'active', $5, $5)
            ",
        )
        .bind(&id)
        .bind(&new.user_id)
        .bind(&new.title)
        .bind(new.description.as_deref())
        .bind(&stamp)
        .execute(&mut *tx)
        .await
        .map_err(|e| DatabaseError::query("Failed to create conversation", e))?;

        sqlx::query(
            r"
            INSERT INTO conversation_messages (conversation_id, position, role, content, metadata, created_at)
            VALUES ($1, 1, 'system', $2, $3, $4)
            ",
        )
        .bind(&id)
        .bind(&seed.content)
        .bind(&metadata)
        .bind(&stamp)
        .execute(&mut *tx)
        .await
        .map_err(|e| DatabaseError::query("Failed to store seed message", e))?;

        tx.commit()
            .await
            .map_err(|e| DatabaseError::query("Failed to commit conversation", e))?;

        debug!(conversation_id = %id, "Created conversation");
        Ok(Conversation {
            id,
            user_id: new.user_id,
            title: new.title,
            description: new.description,
            status: ConversationStatus::Active,
            messages: vec![seed],
            created_at,
            updated_at: created_at,
        })
    }

    async fn get_by_id(
        &self,
        conversation_id: &str,
        user_id: &str,
    ) -> DatabaseResult<Conversation> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, title, description, status, created_at, updated_at
            FROM conversations
            WHERE id = $1 AND user_id = $2 AND status != 'deleted'
            ",
        )
        .bind(conversation_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::query("Failed to get conversation", e))?
        .ok_or_else(|| DatabaseError::not_found(conversation_id))?;

        let created_at: String = column(&row, "created_at")?;
        let updated_at: String = column(&row, "updated_at")?;

        Ok(Conversation {
            id: column(&row, "id")?,
            user_id: column(&row, "user_id")?,
            title: column(&row, "title")?,
            description: column(&row, "description")?,
            status: status_from_row(&row)?,
            messages: self.load_messages(conversation_id).await?,
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        })
    }

    #[instrument(skip(self, content, metadata), fields(role = %role))]
    async fn append_message(
        &self,
        conversation_id: &str,
        user_id: &str,
        role: MessageRole,
        content: &str,
        metadata: MessageMetadata,
    ) -> DatabaseResult<Conversation> {
        let stamp = format_timestamp(&now());
        let metadata =
            serde_json::to_string(&metadata).map_err(|e| DatabaseError::Serialization {
                context: "message metadata".into(),
                source: e,
            })?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DatabaseError::query("Failed to begin transaction", e))?;

        let inserted = sqlx::query(
            r"
            INSERT INTO conversation_messages (conversation_id, position, role, content, metadata, created_at)
            SELECT $1,
                   (SELECT COALESCE(MAX(position), 0) + 1 FROM conversation_messages WHERE conversation_id = $1),
                   $2, $3, $4, $5
            WHERE EXISTS (
                SELECT 1 FROM conversations
                WHERE id = $1 AND user_id = $6 AND status != 'deleted'
            )
            ",
        )
        .bind(conversation_id)
        .bind(role.as_str())
        .bind(content)
        .bind(&metadata)
        .bind(&stamp)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| DatabaseError::query("Failed to append message", e))?;

        if inserted.rows_affected() == 0 {
            return Err(DatabaseError::not_found(conversation_id));
        }

        sqlx::query("UPDATE conversations SET updated_at = $1 WHERE id = $2")
            .bind(&stamp)
            .bind(conversation_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| DatabaseError::query("Failed to touch conversation", e))?;

        tx.commit()
            .await
            .map_err(|e| DatabaseError::query("Failed to commit message", e))?;

        self.get_by_id(conversation_id, user_id).await
    }

    #[instrument(skip(self), fields(status = %status))]
    async fn set_status(
        &self,
        conversation_id: &str,
        user_id: &str,
        status: ConversationStatus,
    ) -> DatabaseResult<Conversation> {
        let mut conversation = self.get_by_id(conversation_id, user_id).await?;
        if !conversation.status.can_transition_to(status) {
            return Err(DatabaseError::InvalidTransition {
                from: conversation.status,
                to: status,
            });
        }

        let updated_at = now();
        let applied = self
            .update_status_from(conversation_id, user_id, conversation.status, status, &updated_at)
            .await?;
        if !applied {
            // Status moved underneath us; report against what is stored now
            let current = self.get_by_id(conversation_id, user_id).await?;
            return Err(DatabaseError::InvalidTransition {
                from: current.status,
                to: status,
            });
        }

        conversation.status = status;
        conversation.updated_at = updated_at;
        Ok(conversation)
    }

    async fn list(
        &self,
        user_id: &str,
        query: &ListQuery,
    ) -> DatabaseResult<Page<ConversationSummary>> {
        let status = query.status.map(|s| s.as_str());

        let total: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM conversations c
            WHERE c.user_id = $1 AND c.status != 'deleted' AND ($2 IS NULL OR c.status = $2)
            ",
        )
        .bind(user_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::query("Failed to count conversations", e))?;

        let sql = format!(
            r"
            SELECT c.id, c.title, c.description, c.status, c.created_at, c.updated_at,
                   COUNT(m.id) AS message_count
            FROM conversations c
            LEFT JOIN conversation_messages m ON m.conversation_id = c.id
            WHERE c.user_id = $1 AND c.status != 'deleted' AND ($2 IS NULL OR c.status = $2)
            GROUP BY c.id
            ORDER BY {}
            LIMIT $3 OFFSET $4
            ",
            order_clause(query)
        );

        let rows = sqlx::query(&sql)
            .bind(user_id)
            .bind(status)
            .bind(i64::from(query.limit))
            .bind(i64::try_from(query.offset()).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DatabaseError::query("Failed to list conversations", e))?;

        let items = rows
            .iter()
            .map(|row| {
                let created_at: String = column(row, "created_at")?;
                let updated_at: String = column(row, "updated_at")?;
                let message_count: i64 = column(row, "message_count")?;
                Ok(ConversationSummary {
                    id: column(row, "id")?,
                    title: column(row, "title")?,
                    description: column(row, "description")?,
                    status: status_from_row(row)?,
                    message_count: u64::try_from(message_count).unwrap_or_default(),
                    created_at: parse_timestamp(&created_at)?,
                    updated_at: parse_timestamp(&updated_at)?,
                })
            })
            .collect::<DatabaseResult<Vec<_>>>()?;

        Ok(Page::new(
            items,
            u64::try_from(total).unwrap_or_default(),
            query,
        ))
    }
}
