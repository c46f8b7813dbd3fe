use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::{
    booking_code::BookingCode,
    id::{ReservationId, UnitId},
    reservation::{
        event::{CreateReservation, ReservationListOptions, TransitionReservation, UpdatePayment},
        Reservation, TimeWindow,
    },
};

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    // 重複チェック・料金計算・予約コード発行・通知作成を一つのトランザクションで行う
    async fn create(&self, event: CreateReservation) -> AppResult<Reservation>;
    // ステータス遷移と機材状態の更新を一つのトランザクションで行う
    async fn transition(&self, event: TransitionReservation) -> AppResult<Reservation>;
    async fn update_payment(&self, event: UpdatePayment) -> AppResult<Reservation>;
    async fn find_by_id(&self, reservation_id: ReservationId) -> AppResult<Option<Reservation>>;
    async fn find_by_booking_code(&self, code: &BookingCode) -> AppResult<Option<Reservation>>;
    async fn find_all(&self, options: ReservationListOptions) -> AppResult<Vec<Reservation>>;
    // 指定の枠と重なる、終了・キャンセル済みでない予約の時間枠を返す
    async fn find_active_windows(
        &self,
        unit_id: UnitId,
        window: TimeWindow,
    ) -> AppResult<Vec<TimeWindow>>;
}
