use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    id::PlanId,
    plan::{
        event::{CreatePricingPlan, DeletePricingPlan, UpdatePricingPlan},
        PricingPlan,
    },
};
use kernel::repository::plan::PricingPlanRepository;
use shared::error::{AppError, AppResult};

use crate::database::{
    model::plan::{PlanColumns, PricingPlanRow},
    ConnectionPool,
};

pub(crate) const PLAN_COLUMNS: &str = r#"
    plan_id, name, base_price, hourly_rate, min_hours, delivery_fee,
    weekend_surcharge, deposit_amount, package_12h_price, package_24h_price,
    is_active, is_fixed_package, fixed_start_time, fixed_end_time
"#;

#[derive(new)]
pub struct PricingPlanRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl PricingPlanRepository for PricingPlanRepositoryImpl {
    async fn create(&self, event: CreatePricingPlan) -> AppResult<PlanId> {
        let plan_id = PlanId::new();
        let columns = PlanColumns::from(&event.kind);
        sqlx::query(
            r#"
                INSERT INTO pricing_plans
                (plan_id, name, base_price, hourly_rate, min_hours, delivery_fee,
                weekend_surcharge, deposit_amount, package_12h_price, package_24h_price,
                is_active, is_fixed_package, fixed_start_time, fixed_end_time)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(plan_id)
        .bind(&event.name)
        .bind(columns.base_price)
        .bind(columns.hourly_rate)
        .bind(columns.min_hours)
        .bind(event.delivery_fee)
        .bind(event.weekend_surcharge)
        .bind(event.deposit_amount)
        .bind(columns.package_12h_price)
        .bind(columns.package_24h_price)
        .bind(event.is_active)
        .bind(columns.is_fixed_package)
        .bind(columns.fixed_start_time)
        .bind(columns.fixed_end_time)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(plan_id)
    }

    async fn find_all(&self, active_only: bool) -> AppResult<Vec<PricingPlan>> {
        let sql = format!(
            r#"
                SELECT {PLAN_COLUMNS}
                FROM pricing_plans
                WHERE ($1 = FALSE OR is_active = TRUE)
                ORDER BY plan_seq ASC
            "#
        );
        sqlx::query_as::<_, PricingPlanRow>(&sql)
            .bind(active_only)
            .fetch_all(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?
            .into_iter()
            .map(PricingPlan::try_from)
            .collect()
    }

    async fn find_by_id(&self, plan_id: PlanId) -> AppResult<Option<PricingPlan>> {
        let sql = format!("SELECT {PLAN_COLUMNS} FROM pricing_plans WHERE plan_id = $1");
        sqlx::query_as::<_, PricingPlanRow>(&sql)
            .bind(plan_id)
            .fetch_optional(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?
            .map(PricingPlan::try_from)
            .transpose()
    }

    async fn update(&self, event: UpdatePricingPlan) -> AppResult<()> {
        let columns = PlanColumns::from(&event.kind);
        let res = sqlx::query(
            r#"
                UPDATE pricing_plans
                SET
                    name = $2,
                    base_price = $3,
                    hourly_rate = $4,
                    min_hours = $5,
                    delivery_fee = $6,
                    weekend_surcharge = $7,
                    deposit_amount = $8,
                    package_12h_price = $9,
                    package_24h_price = $10,
                    is_active = $11,
                    is_fixed_package = $12,
                    fixed_start_time = $13,
                    fixed_end_time = $14
                WHERE plan_id = $1
            "#,
        )
        .bind(event.plan_id)
        .bind(&event.name)
        .bind(columns.base_price)
        .bind(columns.hourly_rate)
        .bind(columns.min_hours)
        .bind(event.delivery_fee)
        .bind(event.weekend_surcharge)
        .bind(event.deposit_amount)
        .bind(columns.package_12h_price)
        .bind(columns.package_24h_price)
        .bind(event.is_active)
        .bind(columns.is_fixed_package)
        .bind(columns.fixed_start_time)
        .bind(columns.fixed_end_time)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;
        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "pricing plan ({}) not found",
                event.plan_id
            )));
        }

        Ok(())
    }

    async fn delete(&self, event: DeletePricingPlan) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let referenced: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM reservations WHERE plan_id = $1)",
        )
        .bind(event.plan_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        // 予約から参照されているプランは料金の根拠として残し、無効化だけ行う
        let sql = if referenced {
            "UPDATE pricing_plans SET is_active = FALSE WHERE plan_id = $1"
        } else {
            "DELETE FROM pricing_plans WHERE plan_id = $1"
        };
        let res = sqlx::query(sql)
            .bind(event.plan_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "pricing plan ({}) not found",
                event.plan_id
            )));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(())
    }
}
