use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use super::id::{IdentityRecordId, ReservationId};

pub mod event;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "camelCase")]
pub enum IdentityType {
    NationalId,
    DriverLicense,
    StudentCard,
    Passport,
}

/// 予約に 1 対 1 で紐づく身分証。`expiry_date` を過ぎるとファイルごと削除される
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRecord {
    pub id: IdentityRecordId,
    pub reservation_id: ReservationId,
    pub identity_type: IdentityType,
    pub identity_number: Option<String>,
    pub identity_file_url: String,
    pub expiry_date: DateTime<Utc>,
}

impl IdentityRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date <= now
    }
}
