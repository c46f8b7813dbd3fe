use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::FixedOffset;

pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub cleanup: CleanupConfig,
    pub shop: ShopConfig,
}

impl AppConfig {
    pub fn new() -> Result<Self> {
        // .env があれば読み込む。無くてもエラーにはしない
        dotenvy::dotenv().ok();

        let database = DatabaseConfig {
            host: std::env::var("DATABASE_HOST")?,
            port: std::env::var("DATABASE_PORT")?
                .parse()
                .context("DATABASE_PORT must be a port number")?,
            username: std::env::var("DATABASE_USERNAME")?,
            password: std::env::var("DATABASE_PASSWORD")?,
            database: std::env::var("DATABASE_NAME")?,
        };
        let server = ServerConfig {
            port: env_or("PORT", 8080)?,
        };
        let cleanup = CleanupConfig {
            identity_storage_dir: std::env::var("IDENTITY_STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads/identity")),
            payment_proof_dir: std::env::var("PAYMENT_PROOF_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads/payment-proofs")),
            payment_proof_retention_days: env_or("PAYMENT_PROOF_RETENTION_DAYS", 30)?,
            identity_retention_days: env_or("IDENTITY_RETENTION_DAYS", 7)?,
            run_at_hour: env_or("CLEANUP_HOUR", 3)?,
        };
        if cleanup.run_at_hour > 23 {
            anyhow::bail!("CLEANUP_HOUR must be between 0 and 23");
        }
        let shop = ShopConfig::from_offset_hours(env_or("SHOP_UTC_OFFSET_HOURS", 7)?)?;

        Ok(Self {
            database,
            server,
            cleanup,
            shop,
        })
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(v) => v.parse().with_context(|| format!("invalid value for {key}")),
        Err(_) => Ok(default),
    }
}

pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
}

pub struct ServerConfig {
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct CleanupConfig {
    /// 身分証ファイルの保存先。identity_file_url のファイル名をこのディレクトリで解決する
    pub identity_storage_dir: PathBuf,
    pub payment_proof_dir: PathBuf,
    pub payment_proof_retention_days: i64,
    /// 予約終了から身分証を保持する日数
    pub identity_retention_days: i64,
    pub run_at_hour: u32,
}

/// 店舗の所在地に関する設定
#[derive(Clone, Copy, Debug)]
pub struct ShopConfig {
    /// 週末判定・固定パッケージの開始時刻・空き枠・掃除の時刻に使うタイムゾーン
    pub timezone: FixedOffset,
}

impl ShopConfig {
    pub fn from_offset_hours(hours: i32) -> Result<Self> {
        let timezone = hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .context("SHOP_UTC_OFFSET_HOURS must be between -23 and 23")?;
        Ok(Self { timezone })
    }
}
