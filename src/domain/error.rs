use crate::domain::model::{HostelId, RoomId};

/// ドメイン層のエラー型
/// ビジネスルール違反を表現する
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// 無効な予約状態（例: キャンセル済みの予約を確定しようとした）
    InvalidBookingState(String),
    /// 入力値の検証失敗（フィールド名付き）
    Validation { field: &'static str, message: String },
    /// 無効な値（例: 未知のステータス文字列）
    InvalidValue(String),
    /// 決済ゲートウェイの最小取引額を下回っている
    BelowMinimumCharge { amount_paisa: i64, minimum_paisa: i64 },
    /// 部屋が利用不可フラグになっている
    RoomUnavailable(RoomId),
    /// 既存の予約と期間が重複している
    OverlappingBooking(RoomId),
    /// 部屋が存在しない
    RoomNotFound(RoomId),
    /// ホステルが存在しない、または未承認
    HostelNotAvailable(HostelId),
    /// リポジトリ操作の失敗
    RepositoryError(String),
}

impl DomainError {
    /// フィールド付きの検証エラーを作成
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        DomainError::Validation {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::InvalidBookingState(msg) => write!(f, "Invalid booking state: {}", msg),
            DomainError::Validation { field, message } => {
                write!(f, "Validation failed on {}: {}", field, message)
            }
            DomainError::InvalidValue(msg) => write!(f, "Invalid value: {}", msg),
            DomainError::BelowMinimumCharge {
                amount_paisa,
                minimum_paisa,
            } => write!(
                f,
                "Amount {} paisa is below the gateway minimum of {} paisa",
                amount_paisa, minimum_paisa
            ),
            DomainError::RoomUnavailable(room_id) => write!(f, "Room {} is not available", room_id),
            DomainError::OverlappingBooking(room_id) => {
                write!(f, "Room {} is already booked for the requested dates", room_id)
            }
            DomainError::RoomNotFound(room_id) => write!(f, "Room {} not found", room_id),
            DomainError::HostelNotAvailable(hostel_id) => {
                write!(f, "Hostel {} not found or not approved", hostel_id)
            }
            DomainError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}
