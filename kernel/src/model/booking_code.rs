use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const BOOKING_CODE_PREFIX: &str = "PB-";
/// 0/O/1/I は見間違えやすいので使わない
pub const BOOKING_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const BOOKING_CODE_LENGTH: usize = 5;

/// 顧客が予約状況を確認するための予約コード（例: `PB-7KQ2M`）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingCode(String);

impl BookingCode {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let body: String = (0..BOOKING_CODE_LENGTH)
            .map(|_| {
                let idx = rng.gen_range(0..BOOKING_CODE_ALPHABET.len());
                BOOKING_CODE_ALPHABET[idx] as char
            })
            .collect();
        Self(format!("{BOOKING_CODE_PREFIX}{body}"))
    }

    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_uppercase();
        let body = normalized.strip_prefix(BOOKING_CODE_PREFIX)?;
        let well_formed = body.len() == BOOKING_CODE_LENGTH
            && body.bytes().all(|b| BOOKING_CODE_ALPHABET.contains(&b));
        well_formed.then_some(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
