use kernel::model::{
    id::UnitId,
    unit::{Hardware, RentalUnit, UnitStatus},
};
use shared::error::AppError;

#[derive(sqlx::FromRow)]
pub struct RentalUnitRow {
    pub unit_id: UnitId,
    pub name: String,
    pub screen_size: Option<String>,
    pub console_model: String,
    pub controller_count: i32,
    pub description: String,
    pub image_url: Option<String>,
    pub status: String,
    pub location: Option<String>,
    pub featured: bool,
}

impl TryFrom<RentalUnitRow> for RentalUnit {
    type Error = AppError;

    fn try_from(value: RentalUnitRow) -> Result<Self, Self::Error> {
        let RentalUnitRow {
            unit_id,
            name,
            screen_size,
            console_model,
            controller_count,
            description,
            image_url,
            status,
            location,
            featured,
        } = value;
        Ok(RentalUnit {
            id: unit_id,
            name,
            hardware: Hardware {
                screen_size,
                console_model,
                controller_count,
            },
            description,
            image_url,
            status: parse_unit_status(&status)?,
            location,
            featured,
        })
    }
}

pub(crate) fn parse_unit_status(value: &str) -> Result<UnitStatus, AppError> {
    value
        .parse()
        .map_err(|_| AppError::ConversionEntityError(format!("unknown unit status: {value}")))
}
