use derive_new::new;

use super::PlanKind;
use crate::model::id::PlanId;

pub struct CreatePricingPlan {
    pub name: String,
    pub delivery_fee: i64,
    pub weekend_surcharge: i64,
    pub deposit_amount: i64,
    pub is_active: bool,
    pub kind: PlanKind,
}

/// 料金プランは全項目を置き換える形で更新する
#[derive(new)]
pub struct UpdatePricingPlan {
    pub plan_id: PlanId,
    pub name: String,
    pub delivery_fee: i64,
    pub weekend_surcharge: i64,
    pub deposit_amount: i64,
    pub is_active: bool,
    pub kind: PlanKind,
}

#[derive(Debug)]
pub struct DeletePricingPlan {
    pub plan_id: PlanId,
}
