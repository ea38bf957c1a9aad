use crate::domain::{NewNotification, Notification, NotificationStats, NotificationVerb};
use crate::error::{AppError, Result};
use crate::repository::traits::NotificationRepository;
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};
use uuid::Uuid;

const NOTIFICATION_COLUMNS: &str =
    "id, recipient_id, actor_id, verb, target_id, target_type, read, created_at";

#[derive(Clone)]
pub struct PgNotificationRepository {
    pool: PgPool,
}

impl PgNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_row(row: &PgRow) -> Result<Notification> {
    let verb: String = row.get("verb");
    let verb = verb
        .parse::<NotificationVerb>()
        .map_err(AppError::Database)?;

    Ok(Notification {
        id: row.get("id"),
        recipient_id: row.get("recipient_id"),
        actor_id: row.get("actor_id"),
        verb,
        target_id: row.get("target_id"),
        target_type: row.get("target_type"),
        read: row.get("read"),
        created_at: row.get("created_at"),
    })
}

/// Insert on an existing connection so likes and comments can write their
/// notification inside their own transaction
pub(crate) async fn insert_notification(
    conn: &mut PgConnection,
    new: NewNotification,
) -> Result<Notification> {
    let row = sqlx::query(&format!(
        r#"
        INSERT INTO notifications (id, recipient_id, actor_id, verb, target_id, target_type)
        VALUES ($1, $2, $3, $4, $5, 'post')
        RETURNING {NOTIFICATION_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(new.recipient_id)
    .bind(new.actor_id)
    .bind(new.verb.as_str())
    .bind(new.target_id)
    .fetch_one(&mut *conn)
    .await?;

    map_row(&row)
}

#[async_trait::async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn create_notification(&self, new: NewNotification) -> Result<Notification> {
        let mut conn = self.pool.acquire().await?;
        insert_notification(&mut conn, new).await
    }

    async fn get_notification(&self, notification_id: Uuid) -> Result<Option<Notification>> {
        let row = sqlx::query(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = $1"
        ))
        .bind(notification_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row).transpose()
    }

    async fn list_for_recipient(
        &self,
        recipient_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Notification>, i64)> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE recipient_id = $1")
                .bind(recipient_id)
                .fetch_one(&self.pool)
                .await?;

        let rows = sqlx::query(&format!(
            r#"
            SELECT {NOTIFICATION_COLUMNS}
            FROM notifications
            WHERE recipient_id = $1
            ORDER BY created_at DESC, seq DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(recipient_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let notifications = rows.iter().map(map_row).collect::<Result<Vec<_>>>()?;
        Ok((notifications, total))
    }

    async fn set_read(&self, notification_id: Uuid, read: bool) -> Result<Option<Notification>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE notifications SET read = $2
            WHERE id = $1
            RETURNING {NOTIFICATION_COLUMNS}
            "#
        ))
        .bind(notification_id)
        .bind(read)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row).transpose()
    }

    async fn mark_all_read(&self, recipient_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE notifications SET read = TRUE
            WHERE recipient_id = $1 AND read = FALSE
            "#,
        )
        .bind(recipient_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn stats(&self, recipient_id: Uuid) -> Result<NotificationStats> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE read = FALSE) AS unread
            FROM notifications
            WHERE recipient_id = $1
            "#,
        )
        .bind(recipient_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(NotificationStats {
            total_notifications: row.get("total"),
            unread_notifications: row.get("unread"),
        })
    }
}
