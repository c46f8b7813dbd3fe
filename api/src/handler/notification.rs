use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::id::NotificationId;
use registry::AppRegistry;
use shared::error::AppResult;

use crate::{
    extractor::AuthorizedStaff,
    model::notification::{NotificationListQuery, NotificationsResponse},
};

pub async fn show_notifications(
    _staff: AuthorizedStaff,
    Query(query): Query<NotificationListQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<NotificationsResponse>> {
    query.validate()?;

    registry
        .notification_repository()
        .find_recent(query.limit)
        .await
        .map(NotificationsResponse::from)
        .map(Json)
}

pub async fn mark_notification_read(
    _staff: AuthorizedStaff,
    Path(notification_id): Path<NotificationId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    registry
        .notification_repository()
        .mark_read(notification_id)
        .await
        .map(|_| StatusCode::OK)
}
