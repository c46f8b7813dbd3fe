use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::{id::NotificationId, notification::Notification};

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    // 未読を先に、新しい順で返す
    async fn find_recent(&self, limit: i64) -> AppResult<Vec<Notification>>;
    async fn mark_read(&self, notification_id: NotificationId) -> AppResult<()>;
}
