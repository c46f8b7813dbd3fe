use chrono::{DateTime, Utc};
use kernel::model::{
    id::NotificationId,
    notification::Notification,
};
use shared::error::AppError;
use uuid::Uuid;

#[derive(sqlx::FromRow)]
pub struct NotificationRow {
    pub notification_id: NotificationId,
    pub target_id: Uuid,
    pub kind: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = AppError;

    fn try_from(value: NotificationRow) -> Result<Self, Self::Error> {
        let NotificationRow {
            notification_id,
            target_id,
            kind,
            message,
            is_read,
            created_at,
        } = value;
        Ok(Notification {
            id: notification_id,
            target_id,
            kind: kind.parse().map_err(|_| {
                AppError::ConversionEntityError(format!("unknown notification kind: {kind}"))
            })?,
            message,
            is_read,
            created_at,
        })
    }
}
