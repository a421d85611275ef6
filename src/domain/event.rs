use chrono::{DateTime, Utc};
use crate::domain::model::{BookingId, CancellationReason, HostelId, Money, RoomId, StayPeriod, UserId};

/// ドメインイベント列挙型
/// ビジネス上の重要なイベントを表現する
#[derive(Debug, Clone, PartialEq)]
pub enum DomainEvent {
    /// 予約が申し込まれた（部屋を確保し決済待ち）
    BookingRequested(BookingRequested),
    /// 決済が確認され予約が確定した
    BookingConfirmed(BookingConfirmed),
    /// 予約がキャンセルされた
    BookingCancelled(BookingCancelled),
}

impl DomainEvent {
    /// イベント種別名を取得
    pub fn event_type(&self) -> &'static str {
        match self {
            DomainEvent::BookingRequested(_) => "BookingRequested",
            DomainEvent::BookingConfirmed(_) => "BookingConfirmed",
            DomainEvent::BookingCancelled(_) => "BookingCancelled",
        }
    }

    /// 対象の予約IDを取得
    pub fn booking_id(&self) -> BookingId {
        match self {
            DomainEvent::BookingRequested(e) => e.booking_id,
            DomainEvent::BookingConfirmed(e) => e.booking_id,
            DomainEvent::BookingCancelled(e) => e.booking_id,
        }
    }
}

/// 予約申込イベント
#[derive(Debug, Clone, PartialEq)]
pub struct BookingRequested {
    /// 予約ID
    pub booking_id: BookingId,
    /// 入居希望者ID
    pub tenant_id: UserId,
    /// ホステルID
    pub hostel_id: HostelId,
    /// 部屋ID
    pub room_id: RoomId,
    /// 滞在期間
    pub stay: StayPeriod,
    /// 合計金額
    pub total_price: Money,
    /// イベント発生日時
    pub occurred_at: DateTime<Utc>,
}

impl BookingRequested {
    /// 新しい予約申込イベントを作成
    pub fn new(
        booking_id: BookingId,
        tenant_id: UserId,
        hostel_id: HostelId,
        room_id: RoomId,
        stay: StayPeriod,
        total_price: Money,
    ) -> Self {
        Self {
            booking_id,
            tenant_id,
            hostel_id,
            room_id,
            stay,
            total_price,
            occurred_at: Utc::now(),
        }
    }
}

/// 予約確定イベント
#[derive(Debug, Clone, PartialEq)]
pub struct BookingConfirmed {
    /// 予約ID
    pub booking_id: BookingId,
    /// ゲートウェイの取引ID
    pub transaction_id: String,
    /// 決済金額
    pub amount: Money,
    /// イベント発生日時
    pub occurred_at: DateTime<Utc>,
}

impl BookingConfirmed {
    /// 新しい予約確定イベントを作成
    pub fn new(booking_id: BookingId, transaction_id: String, amount: Money) -> Self {
        Self {
            booking_id,
            transaction_id,
            amount,
            occurred_at: Utc::now(),
        }
    }
}

/// 予約キャンセルイベント
#[derive(Debug, Clone, PartialEq)]
pub struct BookingCancelled {
    /// 予約ID
    pub booking_id: BookingId,
    /// 解放される部屋ID
    pub room_id: RoomId,
    /// キャンセル理由
    pub reason: CancellationReason,
    /// イベント発生日時
    pub occurred_at: DateTime<Utc>,
}

impl BookingCancelled {
    /// 新しい予約キャンセルイベントを作成
    pub fn new(booking_id: BookingId, room_id: RoomId, reason: CancellationReason) -> Self {
        Self {
            booking_id,
            room_id,
            reason,
            occurred_at: Utc::now(),
        }
    }
}
