use chrono::{DateTime, NaiveTime, Utc};
use derive_new::new;
use garde::Validate;
use kernel::model::{
    id::PlanId,
    plan::{
        event::{CreatePricingPlan, UpdatePricingPlan},
        FixedSchedule, PlanKind, PricingPlan, StandardRate,
    },
    reservation::MAX_DURATION_HOURS,
};
use serde::{Deserialize, Serialize};
use shared::error::AppError;

fn default_true() -> bool {
    true
}

/// 作成と更新で共通の料金プラン入力
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    #[garde(length(min = 1))]
    pub name: String,
    #[garde(range(min = 0))]
    pub base_price: i64,
    #[garde(range(min = 0))]
    #[serde(default)]
    pub hourly_rate: i64,
    #[garde(range(min = 0))]
    #[serde(default)]
    pub min_hours: i64,
    #[garde(range(min = 0))]
    #[serde(default)]
    pub delivery_fee: i64,
    #[garde(range(min = 0, max = 100))]
    #[serde(default)]
    pub weekend_surcharge: i64,
    #[garde(range(min = 0))]
    #[serde(default)]
    pub deposit_amount: i64,
    #[garde(range(min = 0))]
    pub package_12h_price: Option<i64>,
    #[garde(range(min = 0))]
    pub package_24h_price: Option<i64>,
    #[garde(skip)]
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[garde(skip)]
    #[serde(default)]
    pub is_fixed_package: bool,
    #[garde(skip)]
    pub fixed_start_time: Option<NaiveTime>,
    #[garde(skip)]
    pub fixed_end_time: Option<NaiveTime>,
}

impl PlanRequest {
    fn kind(&self) -> Result<PlanKind, AppError> {
        if !self.is_fixed_package {
            return Ok(PlanKind::Standard(StandardRate {
                base_price: self.base_price,
                hourly_rate: self.hourly_rate,
                min_hours: self.min_hours,
                package_12h_price: self.package_12h_price,
                package_24h_price: self.package_24h_price,
            }));
        }
        match (self.fixed_start_time, self.fixed_end_time) {
            (Some(start_time), Some(end_time)) => Ok(PlanKind::FixedSchedule(FixedSchedule {
                base_price: self.base_price,
                start_time,
                end_time,
            })),
            _ => Err(AppError::InvalidRequest(
                "fixed packages need both fixedStartTime and fixedEndTime".into(),
            )),
        }
    }
}

impl TryFrom<PlanRequest> for CreatePricingPlan {
    type Error = AppError;

    fn try_from(value: PlanRequest) -> Result<Self, Self::Error> {
        let kind = value.kind()?;
        Ok(CreatePricingPlan {
            name: value.name,
            delivery_fee: value.delivery_fee,
            weekend_surcharge: value.weekend_surcharge,
            deposit_amount: value.deposit_amount,
            is_active: value.is_active,
            kind,
        })
    }
}

#[derive(new)]
pub struct PlanRequestWithIds(PlanId, PlanRequest);

impl TryFrom<PlanRequestWithIds> for UpdatePricingPlan {
    type Error = AppError;

    fn try_from(value: PlanRequestWithIds) -> Result<Self, Self::Error> {
        let PlanRequestWithIds(plan_id, req) = value;
        let kind = req.kind()?;
        Ok(UpdatePricingPlan::new(
            plan_id,
            req.name,
            req.delivery_fee,
            req.weekend_surcharge,
            req.deposit_amount,
            req.is_active,
            kind,
        ))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanListQuery {
    #[serde(default)]
    pub active_only: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    pub id: PlanId,
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
    /// 固定パッケージの所要時間（時間単位）
    pub fixed_duration_hours: Option<i64>,
}

impl From<PricingPlan> for PlanResponse {
    fn from(value: PricingPlan) -> Self {
        let fixed_duration_hours = value.fixed_duration().map(|d| d.num_hours());
        let PricingPlan {
            id,
            name,
            delivery_fee,
            weekend_surcharge,
            deposit_amount,
            is_active,
            kind,
        } = value;
        let mut res = Self {
            id,
            name,
            base_price: 0,
            hourly_rate: 0,
            min_hours: 0,
            delivery_fee,
            weekend_surcharge,
            deposit_amount,
            package_12h_price: None,
            package_24h_price: None,
            is_active,
            is_fixed_package: false,
            fixed_start_time: None,
            fixed_end_time: None,
            fixed_duration_hours,
        };
        match kind {
            PlanKind::Standard(rate) => {
                res.base_price = rate.base_price;
                res.hourly_rate = rate.hourly_rate;
                res.min_hours = rate.min_hours;
                res.package_12h_price = rate.package_12h_price;
                res.package_24h_price = rate.package_24h_price;
            }
            PlanKind::FixedSchedule(fixed) => {
                res.base_price = fixed.base_price;
                res.is_fixed_package = true;
                res.fixed_start_time = Some(fixed.start_time);
                res.fixed_end_time = Some(fixed.end_time);
            }
        }
        res
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlansResponse {
    pub items: Vec<PlanResponse>,
}

impl From<Vec<PricingPlan>> for PlansResponse {
    fn from(value: Vec<PricingPlan>) -> Self {
        Self {
            items: value.into_iter().map(PlanResponse::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuoteQuery {
    #[garde(range(min = 1, max = MAX_DURATION_HOURS))]
    pub duration_hours: i64,
    /// 週末判定に使う開始時刻。省略時は平日扱い
    #[garde(skip)]
    pub start: Option<DateTime<Utc>>,
    #[garde(skip)]
    #[serde(default)]
    pub pickup: bool,
    #[garde(skip)]
    pub plan_id: Option<PlanId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub plan_id: PlanId,
    pub plan_name: String,
    pub duration_hours: i64,
    pub is_weekend: bool,
    pub total_amount: i64,
    pub deposit_amount: i64,
}
