use crate::domain::error::DomainError;
use crate::domain::port::{PaymentGatewayError, RepositoryError};

/// アプリケーション層のエラー型
/// ドメインエラー、リポジトリエラー、決済ゲートウェイのエラーをラップする
#[derive(Debug)]
pub enum ApplicationError {
    /// ドメインエラー（ビジネスルール違反）
    DomainError(DomainError),
    /// リポジトリエラー（永続化の失敗）
    RepositoryError(RepositoryError),
    /// エンティティが見つからない
    NotFound(String),
    /// 操作する権限がない
    Forbidden(String),
    /// 決済ゲートウェイに到達できない、またはタイムアウトした（決済結果は不明）
    GatewayUnavailable(String),
    /// 決済ゲートウェイがリクエストを拒否した
    PaymentRejected(String),
}

impl std::fmt::Display for ApplicationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplicationError::DomainError(err) => write!(f, "Domain error: {}", err),
            ApplicationError::RepositoryError(err) => write!(f, "Repository error: {}", err),
            ApplicationError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApplicationError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApplicationError::GatewayUnavailable(msg) => {
                write!(f, "Payment gateway unavailable: {}", msg)
            }
            ApplicationError::PaymentRejected(msg) => write!(f, "Payment rejected: {}", msg),
        }
    }
}

impl std::error::Error for ApplicationError {}

// From実装でエラー変換を簡潔に
impl From<DomainError> for ApplicationError {
    fn from(err: DomainError) -> Self {
        ApplicationError::DomainError(err)
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(err: RepositoryError) -> Self {
        ApplicationError::RepositoryError(err)
    }
}

impl From<PaymentGatewayError> for ApplicationError {
    fn from(err: PaymentGatewayError) -> Self {
        match err {
            PaymentGatewayError::Unavailable(msg) => ApplicationError::GatewayUnavailable(msg),
            PaymentGatewayError::Rejected(msg) => ApplicationError::PaymentRejected(msg),
            PaymentGatewayError::InvalidResponse(msg) => ApplicationError::PaymentRejected(msg),
        }
    }
}
