use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
    time::SystemTime,
};

use chrono::{DateTime, Duration, TimeZone, Utc};
use kernel::repository::identity::IdentityRecordRepository;
use shared::config::CleanupConfig;

/// 1 回の掃除で何を消したか
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanupReport {
    pub identity_records_removed: usize,
    pub identity_files_removed: usize,
    pub payment_proofs_removed: usize,
    pub failures: usize,
}

/// 期限切れの身分証と古い支払い証明ファイルを削除する。
///
/// 1 件の失敗で残りを止めることはせず、失敗はログに残して件数だけ数える。
pub struct CleanupSweeper {
    identities: Arc<dyn IdentityRecordRepository>,
    config: CleanupConfig,
}

impl CleanupSweeper {
    pub fn new(identities: Arc<dyn IdentityRecordRepository>, config: CleanupConfig) -> Self {
        Self { identities, config }
    }

    pub async fn run_once(&self, now: DateTime<Utc>) -> CleanupReport {
        let mut report = CleanupReport::default();

        self.sweep_identities(now, &mut report).await;
        self.sweep_payment_proofs(now, &mut report).await;

        tracing::info!(
            identity_records_removed = report.identity_records_removed,
            identity_files_removed = report.identity_files_removed,
            payment_proofs_removed = report.payment_proofs_removed,
            failures = report.failures,
            "cleanup sweep finished"
        );
        report
    }

    async fn sweep_identities(&self, now: DateTime<Utc>, report: &mut CleanupReport) {
        let expired = match self.identities.find_expired(now).await {
            Ok(expired) => expired,
            Err(e) => {
                tracing::warn!(error = %e, "failed to list expired identity records");
                report.failures += 1;
                return;
            }
        };

        for record in expired {
            // ファイルを先に消し、その後でレコードを消す。ファイルが既に無い場合は続行する
            let file_removed = match self.identity_file_path(&record.identity_file_url) {
                Some(path) => match remove_file_if_exists(&path).await {
                    Ok(removed) => removed,
                    Err(e) => {
                        tracing::warn!(
                            identity_record_id = %record.id,
                            path = %path.display(),
                            error = %e,
                            "failed to remove identity file"
                        );
                        report.failures += 1;
                        continue;
                    }
                },
                None => false,
            };

            if let Err(e) = self.identities.delete(record.id).await {
                tracing::warn!(
                    identity_record_id = %record.id,
                    reservation_id = %record.reservation_id,
                    error = %e,
                    "failed to remove expired identity record"
                );
                report.failures += 1;
                continue;
            }
            report.identity_records_removed += 1;
            if file_removed {
                report.identity_files_removed += 1;
            }
        }
    }

    // URL 形式でもパス形式でも、ファイル名だけを保存先ディレクトリで解決する
    fn identity_file_path(&self, identity_file_url: &str) -> Option<PathBuf> {
        let file_name = Path::new(identity_file_url.trim()).file_name()?;
        Some(self.config.identity_storage_dir.join(file_name))
    }

    async fn sweep_payment_proofs(&self, now: DateTime<Utc>, report: &mut CleanupReport) {
        let dir = &self.config.payment_proof_dir;
        let cutoff =
            SystemTime::from(now - Duration::days(self.config.payment_proof_retention_days));

        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(dir = %dir.display(), "payment proof directory does not exist");
                return;
            }
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "failed to read payment proof directory");
                report.failures += 1;
                return;
            }
        };

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(dir = %dir.display(), error = %e, "failed to read payment proof directory");
                    report.failures += 1;
                    break;
                }
            };
            let path = entry.path();
            match remove_if_older_than(&path, cutoff).await {
                Ok(true) => report.payment_proofs_removed += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to remove payment proof");
                    report.failures += 1;
                }
            }
        }
    }
}

async fn remove_file_if_exists(path: &Path) -> io::Result<bool> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "identity file already gone");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

async fn remove_if_older_than(path: &Path, cutoff: SystemTime) -> io::Result<bool> {
    let metadata = tokio::fs::metadata(path).await?;
    if !metadata.is_file() || metadata.modified()? >= cutoff {
        return Ok(false);
    }
    remove_file_if_exists(path).await
}

/// 次の掃除までの待ち時間。指定時刻を過ぎていれば即時（0）を返す
pub fn next_run_delay<Tz: TimeZone>(now: &DateTime<Tz>, hour: u32) -> std::time::Duration {
    let target = now
        .date_naive()
        .and_hms_opt(hour, 0, 0)
        .and_then(|local| now.timezone().from_local_datetime(&local).earliest());
    match target {
        Some(target) if target > *now => (target - now.clone()).to_std().unwrap_or_default(),
        _ => std::time::Duration::ZERO,
    }
}
