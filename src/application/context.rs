use crate::application::ApplicationError;
use crate::domain::model::{UserId, UserRole};

/// リクエストを送った利用者の情報
/// ドライバー層で認証済みトークンから組み立て、各ユースケースに明示的に渡す
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    pub user_id: UserId,
    pub role: UserRole,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl RequestContext {
    pub fn new(user_id: UserId, role: UserRole, name: String, email: String) -> Self {
        Self {
            user_id,
            role,
            name,
            email,
            phone: None,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// 指定したロールを持っているか確認する
    ///
    /// # Returns
    /// * `Err(ApplicationError::Forbidden)` - ロールが一致しない
    pub fn require_role(&self, role: UserRole) -> Result<(), ApplicationError> {
        if self.role != role {
            return Err(ApplicationError::Forbidden(format!(
                "この操作には{}ロールが必要です",
                role
            )));
        }
        Ok(())
    }
}
