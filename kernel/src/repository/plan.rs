use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::{
    id::PlanId,
    plan::{
        event::{CreatePricingPlan, DeletePricingPlan, UpdatePricingPlan},
        PricingPlan,
    },
};

#[async_trait]
pub trait PricingPlanRepository: Send + Sync {
    async fn create(&self, event: CreatePricingPlan) -> AppResult<PlanId>;
    // 作成順で返す。おすすめプランの同率判定はこの順序に依存する
    async fn find_all(&self, active_only: bool) -> AppResult<Vec<PricingPlan>>;
    async fn find_by_id(&self, plan_id: PlanId) -> AppResult<Option<PricingPlan>>;
    async fn update(&self, event: UpdatePricingPlan) -> AppResult<()>;
    // 予約から参照されているプランは無効化のみ行う
    async fn delete(&self, event: DeletePricingPlan) -> AppResult<()>;
}
