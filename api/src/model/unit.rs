use derive_new::new;
use garde::Validate;
use kernel::model::{
    id::UnitId,
    unit::{
        event::{CreateRentalUnit, UpdateRentalUnit},
        Hardware, RentalUnit, UnitStatus,
    },
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUnitRequest {
    #[garde(length(min = 1))]
    pub name: String,
    #[garde(skip)]
    pub screen_size: Option<String>,
    #[garde(length(min = 1))]
    pub console_model: String,
    #[garde(range(min = 0))]
    pub controller_count: i32,
    #[garde(skip)]
    #[serde(default)]
    pub description: String,
    #[garde(skip)]
    pub image_url: Option<String>,
    #[garde(skip)]
    pub location: Option<String>,
    #[garde(skip)]
    #[serde(default)]
    pub featured: bool,
}

impl From<CreateUnitRequest> for CreateRentalUnit {
    fn from(value: CreateUnitRequest) -> Self {
        let CreateUnitRequest {
            name,
            screen_size,
            console_model,
            controller_count,
            description,
            image_url,
            location,
            featured,
        } = value;
        CreateRentalUnit {
            name,
            hardware: Hardware {
                screen_size,
                console_model,
                controller_count,
            },
            description,
            image_url,
            location,
            featured,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUnitRequest {
    #[garde(length(min = 1))]
    pub name: Option<String>,
    #[garde(skip)]
    pub screen_size: Option<String>,
    #[garde(length(min = 1))]
    pub console_model: Option<String>,
    #[garde(range(min = 0))]
    pub controller_count: Option<i32>,
    #[garde(skip)]
    pub description: Option<String>,
    #[garde(skip)]
    pub image_url: Option<String>,
    #[garde(skip)]
    pub location: Option<String>,
    #[garde(skip)]
    pub featured: Option<bool>,
}

#[derive(new)]
pub struct UpdateUnitRequestWithIds(UnitId, UpdateUnitRequest);

impl From<UpdateUnitRequestWithIds> for UpdateRentalUnit {
    fn from(value: UpdateUnitRequestWithIds) -> Self {
        let UpdateUnitRequestWithIds(
            unit_id,
            UpdateUnitRequest {
                name,
                screen_size,
                console_model,
                controller_count,
                description,
                image_url,
                location,
                featured,
            },
        ) = value;
        UpdateRentalUnit::new(
            unit_id,
            name,
            screen_size,
            console_model,
            controller_count,
            description,
            image_url,
            location,
            featured,
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUnitStatusRequest {
    pub status: UnitStatus,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitListQuery {
    pub featured: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitResponse {
    pub id: UnitId,
    pub name: String,
    pub screen_size: Option<String>,
    pub console_model: String,
    pub controller_count: i32,
    pub description: String,
    pub image_url: Option<String>,
    pub status: UnitStatus,
    pub location: Option<String>,
    pub featured: bool,
}

impl From<RentalUnit> for UnitResponse {
    fn from(value: RentalUnit) -> Self {
        let RentalUnit {
            id,
            name,
            hardware:
                Hardware {
                    screen_size,
                    console_model,
                    controller_count,
                },
            description,
            image_url,
            status,
            location,
            featured,
        } = value;
        Self {
            id,
            name,
            screen_size,
            console_model,
            controller_count,
            description,
            image_url,
            status,
            location,
            featured,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitsResponse {
    pub items: Vec<UnitResponse>,
}

impl From<Vec<RentalUnit>> for UnitsResponse {
    fn from(value: Vec<RentalUnit>) -> Self {
        Self {
            items: value.into_iter().map(UnitResponse::from).collect(),
        }
    }
}
