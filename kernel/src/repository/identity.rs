use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::error::AppResult;

use crate::model::{
    id::{IdentityRecordId, ReservationId},
    identity::IdentityRecord,
};

#[async_trait]
pub trait IdentityRecordRepository: Send + Sync {
    async fn find_by_reservation_id(
        &self,
        reservation_id: ReservationId,
    ) -> AppResult<Option<IdentityRecord>>;
    // expiry_date が now 以前のものをすべて返す
    async fn find_expired(&self, now: DateTime<Utc>) -> AppResult<Vec<IdentityRecord>>;
    async fn delete(&self, id: IdentityRecordId) -> AppResult<()>;
}
