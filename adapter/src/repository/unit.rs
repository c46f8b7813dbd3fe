use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    id::UnitId,
    unit::{
        event::{CreateRentalUnit, DeleteRentalUnit, UpdateRentalUnit, UpdateUnitStatus},
        RentalUnit, UnitStatus,
    },
};
use kernel::repository::unit::RentalUnitRepository;
use shared::error::{AppError, AppResult};

use crate::database::{model::unit::RentalUnitRow, ConnectionPool};

const UNIT_COLUMNS: &str = r#"
    unit_id, name, screen_size, console_model, controller_count,
    description, image_url, status, location, featured
"#;

#[derive(new)]
pub struct RentalUnitRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl RentalUnitRepository for RentalUnitRepositoryImpl {
    async fn create(&self, event: CreateRentalUnit) -> AppResult<UnitId> {
        let unit_id = UnitId::new();
        sqlx::query(
            r#"
                INSERT INTO rental_units
                (unit_id, name, screen_size, console_model, controller_count,
                description, image_url, status, location, featured)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(unit_id)
        .bind(&event.name)
        .bind(&event.hardware.screen_size)
        .bind(&event.hardware.console_model)
        .bind(event.hardware.controller_count)
        .bind(&event.description)
        .bind(&event.image_url)
        .bind(UnitStatus::Available.as_ref())
        .bind(&event.location)
        .bind(event.featured)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(unit_id)
    }

    async fn find_all(&self, featured: Option<bool>) -> AppResult<Vec<RentalUnit>> {
        // おすすめ機材を先に、同じ扱いなら名前順
        let sql = format!(
            r#"
                SELECT {UNIT_COLUMNS}
                FROM rental_units
                WHERE ($1::BOOLEAN IS NULL OR featured = $1)
                ORDER BY featured DESC, name ASC
            "#
        );
        sqlx::query_as::<_, RentalUnitRow>(&sql)
            .bind(featured)
            .fetch_all(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?
            .into_iter()
            .map(RentalUnit::try_from)
            .collect()
    }

    async fn find_by_id(&self, unit_id: UnitId) -> AppResult<Option<RentalUnit>> {
        let sql = format!("SELECT {UNIT_COLUMNS} FROM rental_units WHERE unit_id = $1");
        sqlx::query_as::<_, RentalUnitRow>(&sql)
            .bind(unit_id)
            .fetch_optional(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?
            .map(RentalUnit::try_from)
            .transpose()
    }

    async fn update(&self, event: UpdateRentalUnit) -> AppResult<()> {
        // None の項目は現在の値のまま
        let res = sqlx::query(
            r#"
                UPDATE rental_units
                SET
                    name = COALESCE($2, name),
                    screen_size = COALESCE($3, screen_size),
                    console_model = COALESCE($4, console_model),
                    controller_count = COALESCE($5, controller_count),
                    description = COALESCE($6, description),
                    image_url = COALESCE($7, image_url),
                    location = COALESCE($8, location),
                    featured = COALESCE($9, featured)
                WHERE unit_id = $1
            "#,
        )
        .bind(event.unit_id)
        .bind(event.name)
        .bind(event.screen_size)
        .bind(event.console_model)
        .bind(event.controller_count)
        .bind(event.description)
        .bind(event.image_url)
        .bind(event.location)
        .bind(event.featured)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;
        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "rental unit ({}) not found",
                event.unit_id
            )));
        }

        Ok(())
    }

    async fn update_status(&self, event: UpdateUnitStatus) -> AppResult<()> {
        let res = sqlx::query("UPDATE rental_units SET status = $2 WHERE unit_id = $1")
            .bind(event.unit_id)
            .bind(event.status.as_ref())
            .execute(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;
        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "rental unit ({}) not found",
                event.unit_id
            )));
        }

        Ok(())
    }

    async fn delete(&self, event: DeleteRentalUnit) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        {
            let in_progress: i64 = sqlx::query_scalar(
                r#"
                    SELECT COUNT(*)
                    FROM reservations
                    WHERE unit_id = $1
                      AND status NOT IN ('completed', 'cancelled')
                "#,
            )
            .bind(event.unit_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

            if in_progress > 0 {
                return Err(AppError::InvalidRequest(format!(
                    "rental unit ({}) still has {in_progress} reservation(s) in progress",
                    event.unit_id
                )));
            }
        }

        // 過去の予約が残っている機材は外部キーで削除できないため、履歴ごと残す運用とする
        let res = sqlx::query(
            r#"
                DELETE FROM rental_units
                WHERE unit_id = $1
                  AND NOT EXISTS (SELECT 1 FROM reservations WHERE unit_id = $1)
            "#,
        )
        .bind(event.unit_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            let exists: Option<i32> =
                sqlx::query_scalar("SELECT 1 FROM rental_units WHERE unit_id = $1")
                    .bind(event.unit_id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(AppError::SpecificOperationError)?;
            return Err(match exists {
                None => AppError::EntityNotFound(format!(
                    "rental unit ({}) not found",
                    event.unit_id
                )),
                Some(_) => AppError::InvalidRequest(format!(
                    "rental unit ({}) has reservation history and cannot be deleted",
                    event.unit_id
                )),
            });
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(())
    }
}
