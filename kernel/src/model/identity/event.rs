use chrono::Duration;

use super::IdentityType;

/// 予約作成時に添付する身分証。期限は予約の終了時刻に `retention` を足したもの
#[derive(Debug, Clone)]
pub struct AttachIdentity {
    pub identity_type: IdentityType,
    pub identity_number: Option<String>,
    pub identity_file_url: String,
    pub retention: Duration,
}
