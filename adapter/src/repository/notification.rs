use async_trait::async_trait;
use derive_new::new;
use kernel::model::{id::NotificationId, notification::Notification};
use kernel::repository::notification::NotificationRepository;
use shared::error::{AppError, AppResult};

use crate::database::{model::notification::NotificationRow, ConnectionPool};

#[derive(new)]
pub struct NotificationRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl NotificationRepository for NotificationRepositoryImpl {
    async fn find_recent(&self, limit: i64) -> AppResult<Vec<Notification>> {
        sqlx::query_as::<_, NotificationRow>(
            r#"
                SELECT notification_id, target_id, kind, message, is_read, created_at
                FROM notifications
                ORDER BY is_read ASC, created_at DESC
                LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?
        .into_iter()
        .map(Notification::try_from)
        .collect()
    }

    async fn mark_read(&self, notification_id: NotificationId) -> AppResult<()> {
        let res = sqlx::query("UPDATE notifications SET is_read = TRUE WHERE notification_id = $1")
            .bind(notification_id)
            .execute(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;
        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "notification ({notification_id}) not found"
            )));
        }

        Ok(())
    }
}
