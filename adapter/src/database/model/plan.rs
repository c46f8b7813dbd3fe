use chrono::NaiveTime;
use kernel::model::{
    id::PlanId,
    plan::{FixedSchedule, PlanKind, PricingPlan, StandardRate},
};
use shared::error::AppError;

#[derive(sqlx::FromRow)]
pub struct PricingPlanRow {
    pub plan_id: PlanId,
    pub name: String,
    pub base_price: i64,
    pub hourly_rate: i64,
    pub min_hours: i64,
    pub delivery_fee: i64,
    pub weekend_surcharge: i64,
    pub deposit_amount: i64,
    pub package_12h_price: Option<i64>,
    pub package_24h_price: Option<i64>,
    pub is_active: bool,
    pub is_fixed_package: bool,
    pub fixed_start_time: Option<NaiveTime>,
    pub fixed_end_time: Option<NaiveTime>,
}

impl TryFrom<PricingPlanRow> for PricingPlan {
    type Error = AppError;

    fn try_from(value: PricingPlanRow) -> Result<Self, Self::Error> {
        let PricingPlanRow {
            plan_id,
            name,
            base_price,
            hourly_rate,
            min_hours,
            delivery_fee,
            weekend_surcharge,
            deposit_amount,
            package_12h_price,
            package_24h_price,
            is_active,
            is_fixed_package,
            fixed_start_time,
            fixed_end_time,
        } = value;
        let kind = if is_fixed_package {
            match (fixed_start_time, fixed_end_time) {
                (Some(start_time), Some(end_time)) => PlanKind::FixedSchedule(FixedSchedule {
                    base_price,
                    start_time,
                    end_time,
                }),
                _ => {
                    return Err(AppError::ConversionEntityError(format!(
                        "fixed package plan {plan_id} has no schedule"
                    )))
                }
            }
        } else {
            PlanKind::Standard(StandardRate {
                base_price,
                hourly_rate,
                min_hours,
                package_12h_price,
                package_24h_price,
            })
        };
        Ok(PricingPlan {
            id: plan_id,
            name,
            delivery_fee,
            weekend_surcharge,
            deposit_amount,
            is_active,
            kind,
        })
    }
}

/// テーブルの列に合わせて PlanKind を平らにしたもの
pub struct PlanColumns {
    pub base_price: i64,
    pub hourly_rate: i64,
    pub min_hours: i64,
    pub package_12h_price: Option<i64>,
    pub package_24h_price: Option<i64>,
    pub is_fixed_package: bool,
    pub fixed_start_time: Option<NaiveTime>,
    pub fixed_end_time: Option<NaiveTime>,
}

impl From<&PlanKind> for PlanColumns {
    fn from(value: &PlanKind) -> Self {
        match value {
            PlanKind::Standard(rate) => Self {
                base_price: rate.base_price,
                hourly_rate: rate.hourly_rate,
                min_hours: rate.min_hours,
                package_12h_price: rate.package_12h_price,
                package_24h_price: rate.package_24h_price,
                is_fixed_package: false,
                fixed_start_time: None,
                fixed_end_time: None,
            },
            PlanKind::FixedSchedule(fixed) => Self {
                base_price: fixed.base_price,
                hourly_rate: 0,
                min_hours: 0,
                package_12h_price: None,
                package_24h_price: None,
                is_fixed_package: true,
                fixed_start_time: Some(fixed.start_time),
                fixed_end_time: Some(fixed.end_time),
            },
        }
    }
}
