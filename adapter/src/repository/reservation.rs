use async_trait::async_trait;
use chrono::{FixedOffset, Utc};
use derive_new::new;
use kernel::model::{
    booking_code::BookingCode,
    id::{PlanId, ReservationId, UnitId},
    notification::NotificationKind,
    plan::PricingPlan,
    reservation::{
        append_note,
        event::{CreateReservation, ReservationListOptions, TransitionReservation, UpdatePayment},
        plan_booking, BookingPlan, PaymentStatus, PlanSelection, Reservation, ReservationStatus,
        TimeWindow,
    },
};
use kernel::repository::reservation::ReservationRepository;
use shared::error::{AppError, AppResult};

use crate::database::{
    db_error_code,
    model::{
        plan::PricingPlanRow,
        reservation::{ReservationRow, ReservationWindowRow, RESERVATION_COLUMNS},
    },
    ConnectionPool, EXCLUSION_VIOLATION, SERIALIZATION_FAILURE,
};
use crate::repository::plan::PLAN_COLUMNS;

// 予約コードの衝突時に作り直す回数の上限
const MAX_BOOKING_CODE_ATTEMPTS: usize = 10;

type PgTransaction<'a> = sqlx::Transaction<'a, sqlx::Postgres>;

#[derive(new)]
pub struct ReservationRepositoryImpl {
    db: ConnectionPool,
    // 週末料金と固定パッケージの開始時刻はこのタイムゾーンで判定する
    shop_timezone: FixedOffset,
}

#[async_trait]
impl ReservationRepository for ReservationRepositoryImpl {
    async fn create(&self, event: CreateReservation) -> AppResult<Reservation> {
        let mut tx = self.db.begin().await?;

        // トランザクション分離レベルを SERIALIZABLE に設定する
        self.set_transaction_serializable(&mut tx).await?;

        // 事前のチェックとして、以下を調べる。
        // - 指定の機材が存在するか（同じ機材への同時予約はここで直列化される）
        // - 希望の時間枠が進行中の予約と重なっていないか
        let unit_name: String = {
            let row: Option<String> = sqlx::query_scalar(
                "SELECT name FROM rental_units WHERE unit_id = $1 FOR UPDATE",
            )
            .bind(event.unit_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_write_error)?;

            row.ok_or_else(|| {
                AppError::EntityNotFound(format!("rental unit ({}) not found", event.unit_id))
            })?
        };

        let selection = self.select_plan(&mut tx, event.plan_id).await?;
        let BookingPlan {
            plan,
            window,
            total_amount,
            ..
        } = plan_booking(selection, &event, &self.shop_timezone)?;

        {
            // 重複条件：existing.start < new.end AND existing.end > new.start
            let overlap: Option<ReservationWindowRow> = sqlx::query_as(
                r#"
                    SELECT start_time, end_time
                    FROM reservations
                    WHERE unit_id = $1
                      AND status NOT IN ('completed', 'cancelled')
                      AND start_time < $3
                      AND end_time > $2
                    ORDER BY start_time
                    LIMIT 1
                "#,
            )
            .bind(event.unit_id)
            .bind(window.start)
            .bind(window.end)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_write_error)?;

            if let Some(existing) = overlap {
                return Err(AppError::SlotConflict(format!(
                    "rental unit ({}) is already booked from {} to {}",
                    event.unit_id, existing.start_time, existing.end_time
                )));
            }
        }

        let notes = event.notes.as_deref().map(str::trim).unwrap_or_default();

        // 予約コードは一意制約に任せ、衝突したら作り直す
        let reservation_id = ReservationId::new();
        let mut booking_code = None;
        for attempt in 1..=MAX_BOOKING_CODE_ATTEMPTS {
            let candidate = BookingCode::generate(&mut rand::thread_rng());
            let res = sqlx::query(
                r#"
                    INSERT INTO reservations
                    (reservation_id, unit_id, plan_id, booking_code,
                    customer_name, customer_phone, customer_email, delivery_address,
                    start_time, end_time, status, total_amount, deposit_amount,
                    payment_method, payment_status, notes)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
                    ON CONFLICT (booking_code) DO NOTHING
                "#,
            )
            .bind(reservation_id)
            .bind(event.unit_id)
            .bind(plan.id)
            .bind(candidate.as_str())
            .bind(&event.customer.name)
            .bind(&event.customer.phone)
            .bind(&event.customer.email)
            .bind(event.delivery.address())
            .bind(window.start)
            .bind(window.end)
            .bind(ReservationStatus::Pending.as_ref())
            .bind(total_amount)
            .bind(plan.deposit_amount)
            .bind(event.payment_method.as_ref())
            .bind(PaymentStatus::Pending.as_ref())
            .bind(notes)
            .execute(&mut *tx)
            .await
            .map_err(map_write_error)?;

            if res.rows_affected() == 1 {
                booking_code = Some(candidate);
                break;
            }
            tracing::debug!(attempt, code = %candidate, "booking code collision, regenerating");
        }
        let Some(booking_code) = booking_code else {
            return Err(AppError::NoRowsAffectedError(
                "could not allocate a unique booking code".into(),
            ));
        };

        if let Some(identity) = &event.identity {
            sqlx::query(
                r#"
                    INSERT INTO identity_records
                    (reservation_id, identity_type, identity_number, identity_file_url, expiry_date)
                    VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(reservation_id)
            .bind(identity.identity_type.as_ref())
            .bind(&identity.identity_number)
            .bind(&identity.identity_file_url)
            .bind(window.end + identity.retention)
            .execute(&mut *tx)
            .await
            .map_err(map_write_error)?;
        }

        let res = sqlx::query(
            r#"
                INSERT INTO notifications (target_id, kind, message)
                VALUES ($1, $2, $3)
            "#,
        )
        .bind(reservation_id.raw())
        .bind(NotificationKind::NewReservation.as_ref())
        .bind(format!(
            "New reservation {booking_code} for {unit_name} by {} ({} to {})",
            event.customer.name, window.start, window.end
        ))
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No notification record has been created".into(),
            ));
        }

        let reservation = Self::fetch_for_update(&mut tx, reservation_id)
            .await?
            .ok_or_else(|| {
                AppError::NoRowsAffectedError("No reservation record has been created".into())
            })?;

        tx.commit().await.map_err(map_commit_error)?;

        tracing::info!(
            reservation_id = %reservation.id,
            booking_code = %reservation.booking_code,
            unit_id = %reservation.unit_id,
            "reservation created"
        );

        Ok(reservation)
    }

    async fn transition(&self, event: TransitionReservation) -> AppResult<Reservation> {
        let mut tx = self.db.begin().await?;

        let current = Self::fetch_for_update(&mut tx, event.reservation_id)
            .await?
            .ok_or_else(|| {
                AppError::EntityNotFound(format!(
                    "reservation ({}) not found",
                    event.reservation_id
                ))
            })?;

        current.status.ensure_transition_to(event.status)?;

        let notes = match &event.note {
            Some(note) => append_note(&current.notes, note),
            None => current.notes.clone(),
        };
        let actual_end_time = match event.status {
            ReservationStatus::Completed => Some(Utc::now()),
            _ => current.actual_end_time,
        };
        // キャンセル時は未入金の支払いもキャンセル扱いにする
        let payment_status = match (event.status, current.payment_status) {
            (ReservationStatus::Cancelled, status) if status != PaymentStatus::Paid => {
                PaymentStatus::Cancelled
            }
            (_, status) => status,
        };

        let sql = format!(
            r#"
                UPDATE reservations
                SET status = $2, notes = $3, actual_end_time = $4, payment_status = $5, staff_id = $6
                WHERE reservation_id = $1
                RETURNING {RESERVATION_COLUMNS}
            "#
        );
        let updated: ReservationRow = sqlx::query_as(&sql)
            .bind(event.reservation_id)
            .bind(event.status.as_ref())
            .bind(notes)
            .bind(actual_end_time)
            .bind(payment_status.as_ref())
            .bind(event.requested_by.staff_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_write_error)?;

        // 予約ステータスに連動して機材の物理状態も更新する
        if let Some(unit_status) = event.status.unit_status_effect() {
            let res = sqlx::query("UPDATE rental_units SET status = $2 WHERE unit_id = $1")
                .bind(current.unit_id)
                .bind(unit_status.as_ref())
                .execute(&mut *tx)
                .await
                .map_err(map_write_error)?;
            if res.rows_affected() < 1 {
                return Err(AppError::NoRowsAffectedError(format!(
                    "rental unit ({}) status was not updated",
                    current.unit_id
                )));
            }
        }

        tx.commit().await.map_err(map_commit_error)?;

        tracing::info!(
            reservation_id = %event.reservation_id,
            from = current.status.as_ref(),
            to = event.status.as_ref(),
            staff_id = %event.requested_by.staff_id,
            "reservation status changed"
        );

        Reservation::try_from(updated)
    }

    async fn update_payment(&self, event: UpdatePayment) -> AppResult<Reservation> {
        let sql = format!(
            r#"
                UPDATE reservations
                SET
                    payment_status = $2,
                    payment_proof_url = COALESCE($3, payment_proof_url),
                    staff_id = $4
                WHERE reservation_id = $1
                RETURNING {RESERVATION_COLUMNS}
            "#
        );
        let row: Option<ReservationRow> = sqlx::query_as(&sql)
            .bind(event.reservation_id)
            .bind(event.payment_status.as_ref())
            .bind(&event.payment_proof_url)
            .bind(event.requested_by.staff_id)
            .fetch_optional(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        match row {
            Some(row) => Reservation::try_from(row),
            None => Err(AppError::EntityNotFound(format!(
                "reservation ({}) not found",
                event.reservation_id
            ))),
        }
    }

    async fn find_by_id(&self, reservation_id: ReservationId) -> AppResult<Option<Reservation>> {
        let sql = format!("SELECT {RESERVATION_COLUMNS} FROM reservations WHERE reservation_id = $1");
        sqlx::query_as::<_, ReservationRow>(&sql)
            .bind(reservation_id)
            .fetch_optional(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?
            .map(Reservation::try_from)
            .transpose()
    }

    async fn find_by_booking_code(&self, code: &BookingCode) -> AppResult<Option<Reservation>> {
        let sql = format!("SELECT {RESERVATION_COLUMNS} FROM reservations WHERE booking_code = $1");
        sqlx::query_as::<_, ReservationRow>(&sql)
            .bind(code.as_str())
            .fetch_optional(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?
            .map(Reservation::try_from)
            .transpose()
    }

    async fn find_all(&self, options: ReservationListOptions) -> AppResult<Vec<Reservation>> {
        // 新しい予約から順に並べる
        let sql = format!(
            r#"
                SELECT {RESERVATION_COLUMNS}
                FROM reservations
                WHERE ($1::VARCHAR IS NULL OR status = $1)
                  AND ($2::UUID IS NULL OR unit_id = $2)
                ORDER BY created_at DESC, start_time DESC
            "#
        );
        sqlx::query_as::<_, ReservationRow>(&sql)
            .bind(options.status.map(|s| s.as_ref().to_string()))
            .bind(options.unit_id)
            .fetch_all(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?
            .into_iter()
            .map(Reservation::try_from)
            .collect()
    }

    async fn find_active_windows(
        &self,
        unit_id: UnitId,
        window: TimeWindow,
    ) -> AppResult<Vec<TimeWindow>> {
        let rows: Vec<ReservationWindowRow> = sqlx::query_as(
            r#"
                SELECT start_time, end_time
                FROM reservations
                WHERE unit_id = $1
                  AND status NOT IN ('completed', 'cancelled')
                  AND start_time < $3
                  AND end_time > $2
                ORDER BY start_time
            "#,
        )
        .bind(unit_id)
        .bind(window.start)
        .bind(window.end)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(rows.into_iter().map(TimeWindow::from).collect())
    }
}

impl ReservationRepositoryImpl {
    // create メソッドでのトランザクションを利用するにあたり
    // トランザクション分離レベルを SERIALIZABLE にするために
    // 内部的に使うメソッド
    async fn set_transaction_serializable(&self, tx: &mut PgTransaction<'_>) -> AppResult<()> {
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut **tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
        Ok(())
    }

    // プラン指定があればそのプランを、無ければ有効なプラン一覧を候補として読む
    async fn select_plan(
        &self,
        tx: &mut PgTransaction<'_>,
        plan_id: Option<PlanId>,
    ) -> AppResult<PlanSelection> {
        match plan_id {
            Some(plan_id) => {
                let plan = Self::fetch_plan(tx, plan_id).await?.ok_or_else(|| {
                    AppError::EntityNotFound(format!("pricing plan ({plan_id}) not found"))
                })?;
                Ok(PlanSelection::Requested(plan))
            }
            None => {
                let sql = format!(
                    "SELECT {PLAN_COLUMNS} FROM pricing_plans WHERE is_active = TRUE ORDER BY plan_seq ASC"
                );
                let plans = sqlx::query_as::<_, PricingPlanRow>(&sql)
                    .fetch_all(&mut **tx)
                    .await
                    .map_err(map_write_error)?
                    .into_iter()
                    .map(PricingPlan::try_from)
                    .collect::<AppResult<Vec<_>>>()?;
                Ok(PlanSelection::Recommend(plans))
            }
        }
    }

    async fn fetch_plan(
        tx: &mut PgTransaction<'_>,
        plan_id: PlanId,
    ) -> AppResult<Option<PricingPlan>> {
        let sql = format!("SELECT {PLAN_COLUMNS} FROM pricing_plans WHERE plan_id = $1");
        sqlx::query_as::<_, PricingPlanRow>(&sql)
            .bind(plan_id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(map_write_error)?
            .map(PricingPlan::try_from)
            .transpose()
    }

    async fn fetch_for_update(
        tx: &mut PgTransaction<'_>,
        reservation_id: ReservationId,
    ) -> AppResult<Option<Reservation>> {
        let sql = format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE reservation_id = $1 FOR UPDATE"
        );
        sqlx::query_as::<_, ReservationRow>(&sql)
            .bind(reservation_id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(map_write_error)?
            .map(Reservation::try_from)
            .transpose()
    }
}

// 排他制約の違反は同時予約に負けたことを意味する
fn map_write_error(e: sqlx::Error) -> AppError {
    match db_error_code(&e).as_deref() {
        Some(EXCLUSION_VIOLATION) => {
            AppError::SlotConflict("the requested time slot was just taken".into())
        }
        Some(SERIALIZATION_FAILURE) => AppError::TransactionError(e),
        _ => AppError::SpecificOperationError(e),
    }
}

fn map_commit_error(e: sqlx::Error) -> AppError {
    match db_error_code(&e).as_deref() {
        Some(EXCLUSION_VIOLATION) => {
            AppError::SlotConflict("the requested time slot was just taken".into())
        }
        _ => AppError::TransactionError(e),
    }
}
