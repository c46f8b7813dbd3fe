use chrono::{DateTime, Utc};
use kernel::model::{
    id::{IdentityRecordId, ReservationId},
    identity::IdentityRecord,
};
use shared::error::AppError;

#[derive(sqlx::FromRow)]
pub struct IdentityRecordRow {
    pub identity_record_id: IdentityRecordId,
    pub reservation_id: ReservationId,
    pub identity_type: String,
    pub identity_number: Option<String>,
    pub identity_file_url: String,
    pub expiry_date: DateTime<Utc>,
}

impl TryFrom<IdentityRecordRow> for IdentityRecord {
    type Error = AppError;

    fn try_from(value: IdentityRecordRow) -> Result<Self, Self::Error> {
        let IdentityRecordRow {
            identity_record_id,
            reservation_id,
            identity_type,
            identity_number,
            identity_file_url,
            expiry_date,
        } = value;
        Ok(IdentityRecord {
            id: identity_record_id,
            reservation_id,
            identity_type: identity_type.parse().map_err(|_| {
                AppError::ConversionEntityError(format!("unknown identity type: {identity_type}"))
            })?,
            identity_number,
            identity_file_url,
            expiry_date,
        })
    }
}
