use strum::{AsRefStr, EnumString};

use super::id::StaffId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    Admin,
    Staff,
}

/// 上流の認証ゲートウェイが検証済みのスタッフ情報
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaffIdentity {
    pub staff_id: StaffId,
    pub role: Role,
}

impl StaffIdentity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
