use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use kernel::model::{
    id::StaffId,
    staff::{Role, StaffIdentity},
};
use registry::AppRegistry;
use shared::error::AppError;

// 上流の認証ゲートウェイが付与するヘッダ
pub const STAFF_ID_HEADER: &str = "X-Staff-Id";
pub const STAFF_ROLE_HEADER: &str = "X-Staff-Role";

/// 認証済みのスタッフ。ヘッダが無い、または不正な場合は 401 を返す
pub struct AuthorizedStaff {
    pub identity: StaffIdentity,
}

impl AuthorizedStaff {
    pub fn id(&self) -> StaffId {
        self.identity.staff_id
    }

    pub fn is_admin(&self) -> bool {
        self.identity.is_admin()
    }

    /// 管理者でなければ 403 を返す
    pub fn ensure_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::ForbiddenOperation(
                "this operation requires an admin".into(),
            ))
        }
    }
}

#[async_trait]
impl FromRequestParts<AppRegistry> for AuthorizedStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _registry: &AppRegistry,
    ) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let staff_id = header(STAFF_ID_HEADER)
            .and_then(|v| v.parse::<StaffId>().ok())
            .ok_or(AppError::UnauthenticatedError)?;
        // ロールの指定が無ければ一般スタッフとして扱う
        let role = match header(STAFF_ROLE_HEADER) {
            Some(v) => v.parse::<Role>().map_err(|_| AppError::UnauthenticatedError)?,
            None => Role::Staff,
        };

        Ok(Self {
            identity: StaffIdentity { staff_id, role },
        })
    }
}
