use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::{
    id::UnitId,
    unit::{
        event::{CreateRentalUnit, DeleteRentalUnit, UpdateRentalUnit, UpdateUnitStatus},
        RentalUnit,
    },
};

#[async_trait]
pub trait RentalUnitRepository: Send + Sync {
    async fn create(&self, event: CreateRentalUnit) -> AppResult<UnitId>;
    // featured が Some の場合はその値で絞り込む
    async fn find_all(&self, featured: Option<bool>) -> AppResult<Vec<RentalUnit>>;
    async fn find_by_id(&self, unit_id: UnitId) -> AppResult<Option<RentalUnit>>;
    async fn update(&self, event: UpdateRentalUnit) -> AppResult<()>;
    // スタッフによる状態の直接変更
    async fn update_status(&self, event: UpdateUnitStatus) -> AppResult<()>;
    // 進行中の予約がある機材は削除できない
    async fn delete(&self, event: DeleteRentalUnit) -> AppResult<()>;
}
