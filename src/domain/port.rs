// 出力ポート
// ドメイン層が外部に依存する機能をトレイトとして定義
// アダプター層でこれらのトレイトを実装する

use crate::domain::event::DomainEvent;
use crate::domain::model::{
    Booking, BookingId, Hostel, HostelId, PaymentReference, Room, RoomId, StayPeriod, UserId,
};
use async_trait::async_trait;

/// リポジトリエラー型
/// リポジトリ操作で発生するエラーを表現する
#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::enum_variant_names)]
pub enum RepositoryError {
    /// データベース接続に失敗
    ConnectionFailed(String),
    /// 操作に失敗
    OperationFailed(String),
    /// データの取得に失敗
    FetchFailed(String),
}

impl std::fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepositoryError::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
            RepositoryError::OperationFailed(msg) => write!(f, "Operation failed: {}", msg),
            RepositoryError::FetchFailed(msg) => write!(f, "Fetch failed: {}", msg),
        }
    }
}

impl std::error::Error for RepositoryError {}

/// 予約リポジトリトレイト
/// 予約集約の永続化を抽象化する（物理削除は提供しない）
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// 予約を保存する（新規作成・更新の両方）
    async fn save(&self, booking: &Booking) -> Result<(), RepositoryError>;

    /// 予約IDで予約を検索する
    async fn find_by_id(&self, booking_id: BookingId) -> Result<Option<Booking>, RepositoryError>;

    /// 決済参照で予約を検索する
    async fn find_by_payment_reference(
        &self,
        reference: &PaymentReference,
    ) -> Result<Option<Booking>, RepositoryError>;

    /// 入居希望者の予約を作成日時の降順で取得する
    async fn find_by_tenant(&self, tenant_id: UserId) -> Result<Vec<Booking>, RepositoryError>;

    /// 指定オーナーのホステルに対する予約を作成日時の降順で取得する
    async fn find_by_hostel_owner(&self, owner_id: UserId) -> Result<Vec<Booking>, RepositoryError>;

    /// 指定した部屋で、期間が重複する有効な予約（pending / confirmed）を取得する
    ///
    /// # Arguments
    /// * `room_id` - 部屋ID
    /// * `stay` - 判定対象の滞在期間（閉区間）
    async fn find_active_overlapping(
        &self,
        room_id: RoomId,
        stay: &StayPeriod,
    ) -> Result<Vec<Booking>, RepositoryError>;

    /// 新しい一意の予約IDを生成する
    fn next_identity(&self) -> BookingId;
}

/// 部屋リポジトリトレイト
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// 部屋を保存する
    async fn save(&self, room: &Room) -> Result<(), RepositoryError>;

    /// 部屋IDで部屋を検索する
    async fn find_by_id(&self, room_id: RoomId) -> Result<Option<Room>, RepositoryError>;

    /// ホステルの部屋を部屋番号順に取得する
    async fn find_by_hostel(&self, hostel_id: HostelId) -> Result<Vec<Room>, RepositoryError>;

    /// 空室フラグを原子的に true → false へ切り替える（compare-and-swap）
    ///
    /// # Returns
    /// * `Ok(true)` - この呼び出しで部屋を確保した
    /// * `Ok(false)` - 既に確保されていた、または部屋が存在しない
    async fn try_reserve(&self, room_id: RoomId) -> Result<bool, RepositoryError>;

    /// 空室フラグを true に戻す
    async fn release(&self, room_id: RoomId) -> Result<(), RepositoryError>;
}

/// ホステルリポジトリトレイト
#[async_trait]
pub trait HostelRepository: Send + Sync {
    /// ホステルを保存する
    async fn save(&self, hostel: &Hostel) -> Result<(), RepositoryError>;

    /// ホステルIDでホステルを検索する
    async fn find_by_id(&self, hostel_id: HostelId) -> Result<Option<Hostel>, RepositoryError>;

    /// 承認済みのホステルを取得する（市区町村で絞り込み可能）
    async fn find_approved(&self, city: Option<&str>) -> Result<Vec<Hostel>, RepositoryError>;

    /// 審査待ちのホステルを取得する
    async fn find_pending(&self) -> Result<Vec<Hostel>, RepositoryError>;

    /// オーナーのホステルを取得する
    async fn find_by_owner(&self, owner_id: UserId) -> Result<Vec<Hostel>, RepositoryError>;
}

/// 決済ゲートウェイのエラー
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PaymentGatewayError {
    /// 通信失敗・タイムアウト・5xx（決済結果は不明）
    #[error("Payment gateway unavailable: {0}")]
    Unavailable(String),
    /// ゲートウェイがエラーペイロードを返した
    #[error("Payment gateway rejected the request: {0}")]
    Rejected(String),
    /// 応答を解釈できない
    #[error("Invalid payment gateway response: {0}")]
    InvalidResponse(String),
}

/// 決済画面に渡す顧客情報
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// 決済開始リクエスト
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentInitiation {
    /// 金額（最小通貨単位）
    pub amount_minor: i64,
    /// 注文ID（予約ID）
    pub order_id: String,
    /// 注文名
    pub order_name: String,
    /// 決済後のリダイレクト先
    pub return_url: String,
    pub customer: CustomerInfo,
}

/// 決済開始の結果
#[derive(Debug, Clone, PartialEq)]
pub struct InitiatedPayment {
    pub reference: PaymentReference,
    pub redirect_url: String,
}

/// ゲートウェイが報告する決済ステータス
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayPaymentStatus {
    Completed,
    Pending,
    Initiated,
    Refunded,
    Expired,
    UserCanceled,
    Other(String),
}

impl GatewayPaymentStatus {
    /// Khaltiのステータス文字列から変換
    pub fn parse(s: &str) -> Self {
        match s {
            "Completed" => GatewayPaymentStatus::Completed,
            "Pending" => GatewayPaymentStatus::Pending,
            "Initiated" => GatewayPaymentStatus::Initiated,
            "Refunded" => GatewayPaymentStatus::Refunded,
            "Expired" => GatewayPaymentStatus::Expired,
            "User canceled" => GatewayPaymentStatus::UserCanceled,
            other => GatewayPaymentStatus::Other(other.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, GatewayPaymentStatus::Completed)
    }
}

/// 決済照合の結果
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentVerification {
    pub status: GatewayPaymentStatus,
    pub transaction_id: Option<String>,
    /// 照合金額（最小通貨単位）
    pub total_amount: i64,
}

/// 決済ゲートウェイトレイト
/// 外部決済APIの境界。ビジネスロジックは持たない
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// 決済を開始し、決済参照とリダイレクトURLを受け取る
    async fn initiate(
        &self,
        request: PaymentInitiation,
    ) -> Result<InitiatedPayment, PaymentGatewayError>;

    /// 決済参照で決済結果を照合する
    async fn verify(
        &self,
        reference: &PaymentReference,
    ) -> Result<PaymentVerification, PaymentGatewayError>;
}

/// イベント発行エラー
#[derive(Debug, thiserror::Error)]
pub enum PublisherError {
    #[error("Event publishing failed: {0}")]
    PublishingFailed(String),
}

/// イベント発行者トレイト
pub trait EventPublisher: Send + Sync {
    /// ドメインイベントを発行する
    fn publish(&self, event: &DomainEvent) -> Result<(), PublisherError>;
}
