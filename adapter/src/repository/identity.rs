use async_trait::async_trait;
use chrono::{DateTime, Utc};
use derive_new::new;
use kernel::model::{
    id::{IdentityRecordId, ReservationId},
    identity::IdentityRecord,
};
use kernel::repository::identity::IdentityRecordRepository;
use shared::error::{AppError, AppResult};

use crate::database::{model::identity::IdentityRecordRow, ConnectionPool};

const IDENTITY_COLUMNS: &str = r#"
    identity_record_id, reservation_id, identity_type,
    identity_number, identity_file_url, expiry_date
"#;

#[derive(new)]
pub struct IdentityRecordRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl IdentityRecordRepository for IdentityRecordRepositoryImpl {
    async fn find_by_reservation_id(
        &self,
        reservation_id: ReservationId,
    ) -> AppResult<Option<IdentityRecord>> {
        let sql = format!("SELECT {IDENTITY_COLUMNS} FROM identity_records WHERE reservation_id = $1");
        sqlx::query_as::<_, IdentityRecordRow>(&sql)
            .bind(reservation_id)
            .fetch_optional(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?
            .map(IdentityRecord::try_from)
            .transpose()
    }

    async fn find_expired(&self, now: DateTime<Utc>) -> AppResult<Vec<IdentityRecord>> {
        let sql = format!(
            r#"
                SELECT {IDENTITY_COLUMNS}
                FROM identity_records
                WHERE expiry_date <= $1
                ORDER BY expiry_date ASC
            "#
        );
        sqlx::query_as::<_, IdentityRecordRow>(&sql)
            .bind(now)
            .fetch_all(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?
            .into_iter()
            .map(IdentityRecord::try_from)
            .collect()
    }

    async fn delete(&self, id: IdentityRecordId) -> AppResult<()> {
        let res = sqlx::query("DELETE FROM identity_records WHERE identity_record_id = $1")
            .bind(id)
            .execute(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;
        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "identity record ({id}) not found"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};
    use kernel::model::{
        identity::{event::AttachIdentity, IdentityType},
        reservation::{event::CreateReservation, Customer, Delivery, PaymentMethod},
        unit::{event::CreateRentalUnit, Hardware},
        plan::{event::CreatePricingPlan, PlanKind, StandardRate},
    };
    use kernel::repository::{
        plan::PricingPlanRepository, reservation::ReservationRepository,
        unit::RentalUnitRepository,
    };

    use crate::repository::{
        plan::PricingPlanRepositoryImpl, reservation::ReservationRepositoryImpl,
        unit::RentalUnitRepositoryImpl,
    };

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_expired_records_are_listed_and_deleted(
        pool: sqlx::PgPool,
    ) -> anyhow::Result<()> {
        let db = ConnectionPool::new(pool);
        let unit_id = RentalUnitRepositoryImpl::new(db.clone())
            .create(CreateRentalUnit {
                name: "Playbox 02".into(),
                hardware: Hardware {
                    screen_size: None,
                    console_model: "Switch".into(),
                    controller_count: 2,
                },
                description: String::new(),
                image_url: None,
                location: None,
                featured: false,
            })
            .await?;
        PricingPlanRepositoryImpl::new(db.clone())
            .create(CreatePricingPlan {
                name: "regular".into(),
                delivery_fee: 0,
                weekend_surcharge: 0,
                deposit_amount: 0,
                is_active: true,
                kind: PlanKind::Standard(StandardRate {
                    base_price: 30_000,
                    hourly_rate: 10_000,
                    min_hours: 1,
                    package_12h_price: None,
                    package_24h_price: None,
                }),
            })
            .await?;

        let start: DateTime<Utc> = "2024-06-01T10:00:00Z".parse()?;
        let jakarta = FixedOffset::east_opt(7 * 3600).unwrap();
        let reservation = ReservationRepositoryImpl::new(db.clone(), jakarta)
            .create(CreateReservation::new(
                unit_id,
                Customer {
                    name: "Sari".into(),
                    phone: "0811111111".into(),
                    email: None,
                },
                Delivery::StudioPickup,
                start,
                2,
                PaymentMethod::Qris,
                None,
                None,
                Some(AttachIdentity {
                    identity_type: IdentityType::NationalId,
                    identity_number: Some("3171000000000001".into()),
                    identity_file_url: "/uploads/identity/ktp-sari.jpg".into(),
                    retention: Duration::days(7),
                }),
            ))
            .await?;

        let repo = IdentityRecordRepositoryImpl::new(db);
        let record = repo
            .find_by_reservation_id(reservation.id)
            .await?
            .expect("identity must be attached");
        assert_eq!(record.identity_type, IdentityType::NationalId);

        // 終了 12:00 の 7 日後が期限
        assert_eq!(record.expiry_date, reservation.end_time + Duration::days(7));
        assert!(repo.find_expired(start).await?.is_empty());
        let expired = repo.find_expired(start + Duration::days(8)).await?;
        assert_eq!(expired.len(), 1);

        repo.delete(record.id).await?;
        assert!(repo.find_by_reservation_id(reservation.id).await?.is_none());
        assert!(matches!(
            repo.delete(record.id).await,
            Err(AppError::EntityNotFound(_))
        ));
        Ok(())
    }
}
