use crate::domain::error::DomainError;
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;

/// 予約の一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingId(Uuid);

impl BookingId {
    /// 新しい一意のBookingIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから BookingId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からBookingIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for BookingId {
    fn default() -> Self {
        Self::new()
    }
}

/// ホステルの一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostelId(Uuid);

impl HostelId {
    /// 新しい一意のHostelIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから HostelId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からHostelIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for HostelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for HostelId {
    fn default() -> Self {
        Self::new()
    }
}

/// 部屋の一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomId(Uuid);

impl RoomId {
    /// 新しい一意のRoomIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから RoomId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からRoomIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for RoomId {
    fn default() -> Self {
        Self::new()
    }
}

/// 利用者（入居希望者・オーナー・管理者）の一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// 新しい一意のUserIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから UserId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からUserIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

/// 決済ゲートウェイが発行する決済参照（Khaltiのpidx）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaymentReference(String);

impl PaymentReference {
    /// 空でない文字列から決済参照を作成
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::validation("pidx", "決済参照が空です"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaymentReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 金額を表す値オブジェクト
/// ネパールルピーを最小通貨単位（パイサ、1ルピー = 100パイサ）で保持する
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money {
    paisa: i64,
}

impl Money {
    /// ルピー単位の金額から作成
    pub fn npr(rupees: i64) -> Self {
        Self {
            paisa: rupees * 100,
        }
    }

    /// パイサ単位の金額から作成
    pub fn from_paisa(paisa: i64) -> Self {
        Self { paisa }
    }

    /// 正の金額のみ許可して作成（部屋の月額料金など）
    pub fn positive_npr(rupees: i64, field: &'static str) -> Result<Self, DomainError> {
        if rupees <= 0 {
            return Err(DomainError::validation(field, "金額は正の値である必要があります"));
        }
        rupees
            .checked_mul(100)
            .map(Self::from_paisa)
            .ok_or_else(|| DomainError::validation(field, "金額が大きすぎます"))
    }

    /// ルピー単位の金額を取得（端数切り捨て）
    pub fn rupees(&self) -> i64 {
        self.paisa / 100
    }

    /// パイサ単位の金額を取得
    pub fn paisa(&self) -> i64 {
        self.paisa
    }

    /// 通貨コードを取得
    pub fn currency(&self) -> &'static str {
        "NPR"
    }

    /// 金額を加算
    pub fn add(&self, other: &Money) -> Money {
        Money {
            paisa: self.paisa + other.paisa,
        }
    }

    /// 金額を乗算（桁あふれはNone）
    pub fn checked_multiply(&self, factor: u32) -> Option<Money> {
        self.paisa
            .checked_mul(i64::from(factor))
            .map(|paisa| Money { paisa })
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rs. {}.{:02}", self.paisa / 100, (self.paisa % 100).abs())
    }
}

/// 滞在期間を表す値オブジェクト
/// UTCの暦日による閉区間 [check_in, check_out]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayPeriod {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl StayPeriod {
    /// チェックイン日と月数から滞在期間を作成
    /// チェックアウト日は暦月の加算で求める（月末は丸められる）
    pub fn monthly(check_in: NaiveDate, months: u32) -> Result<Self, DomainError> {
        if months == 0 {
            return Err(DomainError::validation(
                "months",
                "滞在月数は1以上である必要があります",
            ));
        }
        let check_out = check_in
            .checked_add_months(Months::new(months))
            .ok_or_else(|| DomainError::validation("months", "滞在月数が大きすぎます"))?;
        Ok(Self {
            check_in,
            check_out,
        })
    }

    /// 明示的なチェックイン日・チェックアウト日から滞在期間を作成
    pub fn between(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, DomainError> {
        if check_out <= check_in {
            return Err(DomainError::validation(
                "check_out_date",
                "チェックアウト日はチェックイン日より後である必要があります",
            ));
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    /// 保存済みデータから再構築
    pub fn reconstruct(check_in: NaiveDate, check_out: NaiveDate) -> Self {
        Self {
            check_in,
            check_out,
        }
    }

    /// チェックイン日を取得
    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    /// チェックアウト日を取得
    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    /// 別の期間と重複するか判定する
    /// 閉区間として扱うため、チェックアウト日と同日のチェックインも重複とみなす
    pub fn overlaps(&self, other: &StayPeriod) -> bool {
        let starts_inside = self.check_in >= other.check_in && self.check_in <= other.check_out;
        let ends_inside = self.check_out >= other.check_in && self.check_out <= other.check_out;
        let contains = self.check_in <= other.check_in && self.check_out >= other.check_out;
        starts_inside || ends_inside || contains
    }
}

/// 予約のステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookingStatus {
    /// 保留中（決済待ち、部屋を確保している）
    Pending,
    /// 確定済み
    Confirmed,
    /// キャンセル済み
    Cancelled,
}

impl BookingStatus {
    /// 部屋を占有している状態かどうか
    pub fn is_active(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// 文字列からBookingStatusを作成
    pub fn from_string(s: &str) -> Result<Self, DomainError> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            _ => Err(DomainError::InvalidValue(format!(
                "無効な予約ステータス: {}",
                s
            ))),
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 決済ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    /// 決済前に利用者が取り消した
    Cancelled,
    /// 決済完了後に取り消され返金対象になった
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Cancelled => "cancelled",
            PaymentStatus::Refunded => "refunded",
        }
    }

    /// 文字列からPaymentStatusを作成
    pub fn from_string(s: &str) -> Result<Self, DomainError> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "completed" => Ok(PaymentStatus::Completed),
            "failed" => Ok(PaymentStatus::Failed),
            "cancelled" => Ok(PaymentStatus::Cancelled),
            "refunded" => Ok(PaymentStatus::Refunded),
            _ => Err(DomainError::InvalidValue(format!(
                "無効な決済ステータス: {}",
                s
            ))),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 予約がキャンセルされた理由
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CancellationReason {
    /// ゲートウェイが成功以外を返した、または照合に失敗した
    PaymentFailed,
    /// 照合した金額が予約金額と一致しない
    AmountMismatch,
    /// 利用者が決済画面から離脱した
    PaymentAbandoned,
    /// 決済開始がゲートウェイに拒否された、または到達できなかった
    GatewayRejected,
    /// 利用者による予約取り消し
    TenantCancelled,
}

impl CancellationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            CancellationReason::PaymentFailed => "payment_failed",
            CancellationReason::AmountMismatch => "amount_mismatch",
            CancellationReason::PaymentAbandoned => "payment_abandoned",
            CancellationReason::GatewayRejected => "gateway_rejected",
            CancellationReason::TenantCancelled => "tenant_cancelled",
        }
    }

    /// 文字列からCancellationReasonを作成
    pub fn from_string(s: &str) -> Result<Self, DomainError> {
        match s {
            "payment_failed" => Ok(CancellationReason::PaymentFailed),
            "amount_mismatch" => Ok(CancellationReason::AmountMismatch),
            "payment_abandoned" => Ok(CancellationReason::PaymentAbandoned),
            "gateway_rejected" => Ok(CancellationReason::GatewayRejected),
            "tenant_cancelled" => Ok(CancellationReason::TenantCancelled),
            _ => Err(DomainError::InvalidValue(format!(
                "無効なキャンセル理由: {}",
                s
            ))),
        }
    }
}

impl fmt::Display for CancellationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 部屋タイプ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoomType {
    Single,
    Double,
    Triple,
    Dorm,
}

impl RoomType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::Single => "Single",
            RoomType::Double => "Double",
            RoomType::Triple => "Triple",
            RoomType::Dorm => "Dorm",
        }
    }

    /// 文字列からRoomTypeを作成
    pub fn from_string(s: &str) -> Result<Self, DomainError> {
        match s {
            "Single" => Ok(RoomType::Single),
            "Double" => Ok(RoomType::Double),
            "Triple" => Ok(RoomType::Triple),
            "Dorm" => Ok(RoomType::Dorm),
            _ => Err(DomainError::validation(
                "room_type",
                format!("無効な部屋タイプ: {}", s),
            )),
        }
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ホステル種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostelType {
    Boys,
    Girls,
    CoEd,
}

impl HostelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostelType::Boys => "Boys Hostel",
            HostelType::Girls => "Girls Hostel",
            HostelType::CoEd => "Co-ed",
        }
    }

    /// 文字列からHostelTypeを作成
    pub fn from_string(s: &str) -> Result<Self, DomainError> {
        match s {
            "Boys Hostel" => Ok(HostelType::Boys),
            "Girls Hostel" => Ok(HostelType::Girls),
            "Co-ed" => Ok(HostelType::CoEd),
            _ => Err(DomainError::validation(
                "hostel_type",
                format!("無効なホステル種別: {}", s),
            )),
        }
    }
}

impl fmt::Display for HostelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ホステルの審査ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostelStatus {
    /// 審査待ち
    Pending,
    /// 承認済み（公開中）
    Active,
    /// 却下
    Rejected,
}

impl HostelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostelStatus::Pending => "pending",
            HostelStatus::Active => "active",
            HostelStatus::Rejected => "rejected",
        }
    }

    /// 文字列からHostelStatusを作成
    pub fn from_string(s: &str) -> Result<Self, DomainError> {
        match s {
            "pending" => Ok(HostelStatus::Pending),
            "active" => Ok(HostelStatus::Active),
            "rejected" => Ok(HostelStatus::Rejected),
            _ => Err(DomainError::InvalidValue(format!(
                "無効なホステルステータス: {}",
                s
            ))),
        }
    }
}

impl fmt::Display for HostelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 利用者のロール
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserRole {
    /// 入居希望者
    User,
    /// ホステルオーナー
    Owner,
    /// 管理者
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Owner => "owner",
            UserRole::Admin => "admin",
        }
    }

    /// 文字列からUserRoleを作成
    pub fn from_string(s: &str) -> Result<Self, DomainError> {
        match s {
            "user" => Ok(UserRole::User),
            "owner" => Ok(UserRole::Owner),
            "admin" => Ok(UserRole::Admin),
            _ => Err(DomainError::InvalidValue(format!("無効なロール: {}", s))),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
