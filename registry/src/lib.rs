use std::sync::Arc;

use adapter::{
    database::ConnectionPool,
    repository::{
        health::HealthCheckRepositoryImpl, identity::IdentityRecordRepositoryImpl,
        notification::NotificationRepositoryImpl, plan::PricingPlanRepositoryImpl,
        reservation::ReservationRepositoryImpl, unit::RentalUnitRepositoryImpl,
    },
};
use kernel::repository::{
    health::HealthCheckRepository, identity::IdentityRecordRepository,
    notification::NotificationRepository, plan::PricingPlanRepository,
    reservation::ReservationRepository, unit::RentalUnitRepository,
};
use chrono::FixedOffset;
use shared::config::AppConfig;

#[derive(Clone)]
pub struct AppRegistry {
    health_check_repository: Arc<dyn HealthCheckRepository>,
    unit_repository: Arc<dyn RentalUnitRepository>,
    plan_repository: Arc<dyn PricingPlanRepository>,
    reservation_repository: Arc<dyn ReservationRepository>,
    identity_repository: Arc<dyn IdentityRecordRepository>,
    notification_repository: Arc<dyn NotificationRepository>,
    identity_retention_days: i64,
    shop_timezone: FixedOffset,
}

impl AppRegistry {
    pub fn new(pool: ConnectionPool, app_config: &AppConfig) -> Self {
        Self {
            health_check_repository: Arc::new(HealthCheckRepositoryImpl::new(pool.clone())),
            unit_repository: Arc::new(RentalUnitRepositoryImpl::new(pool.clone())),
            plan_repository: Arc::new(PricingPlanRepositoryImpl::new(pool.clone())),
            reservation_repository: Arc::new(ReservationRepositoryImpl::new(
                pool.clone(),
                app_config.shop.timezone,
            )),
            identity_repository: Arc::new(IdentityRecordRepositoryImpl::new(pool.clone())),
            notification_repository: Arc::new(NotificationRepositoryImpl::new(pool)),
            identity_retention_days: app_config.cleanup.identity_retention_days,
            shop_timezone: app_config.shop.timezone,
        }
    }

    /// 任意の実装を差し込んで組み立てる。DB を使わないテスト向け
    pub fn from_repositories(
        health_check_repository: Arc<dyn HealthCheckRepository>,
        unit_repository: Arc<dyn RentalUnitRepository>,
        plan_repository: Arc<dyn PricingPlanRepository>,
        reservation_repository: Arc<dyn ReservationRepository>,
        identity_repository: Arc<dyn IdentityRecordRepository>,
        notification_repository: Arc<dyn NotificationRepository>,
        identity_retention_days: i64,
        shop_timezone: FixedOffset,
    ) -> Self {
        Self {
            health_check_repository,
            unit_repository,
            plan_repository,
            reservation_repository,
            identity_repository,
            notification_repository,
            identity_retention_days,
            shop_timezone,
        }
    }

    pub fn health_check_repository(&self) -> Arc<dyn HealthCheckRepository> {
        self.health_check_repository.clone()
    }

    pub fn unit_repository(&self) -> Arc<dyn RentalUnitRepository> {
        self.unit_repository.clone()
    }

    pub fn plan_repository(&self) -> Arc<dyn PricingPlanRepository> {
        self.plan_repository.clone()
    }

    pub fn reservation_repository(&self) -> Arc<dyn ReservationRepository> {
        self.reservation_repository.clone()
    }

    pub fn identity_repository(&self) -> Arc<dyn IdentityRecordRepository> {
        self.identity_repository.clone()
    }

    pub fn notification_repository(&self) -> Arc<dyn NotificationRepository> {
        self.notification_repository.clone()
    }

    /// 予約終了後に身分証を保持する日数
    pub fn identity_retention_days(&self) -> i64 {
        self.identity_retention_days
    }

    /// 店舗のタイムゾーン
    pub fn shop_timezone(&self) -> FixedOffset {
        self.shop_timezone
    }
}
