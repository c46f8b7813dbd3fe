use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use super::id::UnitId;

pub mod event;

/// 機材の物理的な状態。予約のステータス遷移に連動して書き換わる
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "camelCase")]
pub enum UnitStatus {
    Available,
    InUse,
    Maintenance,
    InTransit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RentalUnit {
    pub id: UnitId,
    pub name: String,
    pub hardware: Hardware,
    pub description: String,
    pub image_url: Option<String>,
    pub status: UnitStatus,
    pub location: Option<String>,
    pub featured: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hardware {
    pub screen_size: Option<String>,
    pub console_model: String,
    pub controller_count: i32,
}
