use derive_new::new;

use super::{Hardware, UnitStatus};
use crate::model::id::UnitId;

pub struct CreateRentalUnit {
    pub name: String,
    pub hardware: Hardware,
    pub description: String,
    pub image_url: Option<String>,
    pub location: Option<String>,
    pub featured: bool,
}

#[derive(Debug, new)]
pub struct UpdateRentalUnit {
    pub unit_id: UnitId,
    pub name: Option<String>,
    pub screen_size: Option<String>,
    pub console_model: Option<String>,
    pub controller_count: Option<i32>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub location: Option<String>,
    pub featured: Option<bool>,
}

#[derive(Debug, new)]
pub struct UpdateUnitStatus {
    pub unit_id: UnitId,
    pub status: UnitStatus,
}

#[derive(Debug)]
pub struct DeleteRentalUnit {
    pub unit_id: UnitId,
}
