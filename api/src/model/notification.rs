use chrono::{DateTime, Utc};
use garde::Validate;
use kernel::model::{
    id::NotificationId,
    notification::{Notification, NotificationKind},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const DEFAULT_LIMIT: i64 = 50;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NotificationListQuery {
    #[garde(range(min = 1, max = 200))]
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: NotificationId,
    pub target_id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationResponse {
    fn from(value: Notification) -> Self {
        let Notification {
            id,
            target_id,
            kind,
            message,
            is_read,
            created_at,
        } = value;
        Self {
            id,
            target_id,
            kind,
            message,
            is_read,
            created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationsResponse {
    pub items: Vec<NotificationResponse>,
}

impl From<Vec<Notification>> for NotificationsResponse {
    fn from(value: Vec<Notification>) -> Self {
        Self {
            items: value.into_iter().map(NotificationResponse::from).collect(),
        }
    }
}
