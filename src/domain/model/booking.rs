use chrono::{DateTime, Utc};

use crate::domain::error::DomainError;
use crate::domain::event::{BookingCancelled, BookingConfirmed, BookingRequested, DomainEvent};
use crate::domain::model::{
    BookingId, BookingStatus, CancellationReason, HostelId, Money, PaymentReference,
    PaymentStatus, RoomId, StayPeriod, UserId,
};

/// 永続化層から予約を再構築するためのデータ
#[derive(Debug, Clone)]
pub struct BookingRecord {
    pub id: BookingId,
    pub tenant_id: UserId,
    pub hostel_id: HostelId,
    pub room_id: RoomId,
    pub stay: StayPeriod,
    pub months: u32,
    pub total_price: Money,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub payment_reference: Option<PaymentReference>,
    pub transaction_id: Option<String>,
    pub cancellation_reason: Option<CancellationReason>,
    pub created_at: DateTime<Utc>,
}

/// Booking集約
/// 予約のライフサイクル（申込 → 決済 → 確定／キャンセル）を管理する
/// ステータスの変更は必ず遷移メソッドを経由する
#[derive(Debug, Clone)]
pub struct Booking {
    id: BookingId,
    tenant_id: UserId,
    hostel_id: HostelId,
    room_id: RoomId,
    stay: StayPeriod,
    months: u32,
    total_price: Money,
    status: BookingStatus,
    payment_status: PaymentStatus,
    payment_reference: Option<PaymentReference>,
    transaction_id: Option<String>,
    cancellation_reason: Option<CancellationReason>,
    created_at: DateTime<Utc>,
    domain_events: Vec<DomainEvent>,
}

impl Booking {
    /// 新しい予約を申し込む
    /// 初期ステータスはPending、決済ステータスもPending
    pub fn request(
        id: BookingId,
        tenant_id: UserId,
        hostel_id: HostelId,
        room_id: RoomId,
        stay: StayPeriod,
        months: u32,
        total_price: Money,
    ) -> Self {
        let event = BookingRequested::new(id, tenant_id, hostel_id, room_id, stay, total_price);
        Self {
            id,
            tenant_id,
            hostel_id,
            room_id,
            stay,
            months,
            total_price,
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_reference: None,
            transaction_id: None,
            cancellation_reason: None,
            created_at: Utc::now(),
            domain_events: vec![DomainEvent::BookingRequested(event)],
        }
    }

    /// データベースから取得したデータで予約を再構築
    pub fn reconstruct(record: BookingRecord) -> Self {
        Self {
            id: record.id,
            tenant_id: record.tenant_id,
            hostel_id: record.hostel_id,
            room_id: record.room_id,
            stay: record.stay,
            months: record.months,
            total_price: record.total_price,
            status: record.status,
            payment_status: record.payment_status,
            payment_reference: record.payment_reference,
            transaction_id: record.transaction_id,
            cancellation_reason: record.cancellation_reason,
            created_at: record.created_at,
            domain_events: Vec::new(),
        }
    }

    pub fn id(&self) -> BookingId {
        self.id
    }

    pub fn tenant_id(&self) -> UserId {
        self.tenant_id
    }

    pub fn hostel_id(&self) -> HostelId {
        self.hostel_id
    }

    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    pub fn stay(&self) -> StayPeriod {
        self.stay
    }

    pub fn months(&self) -> u32 {
        self.months
    }

    pub fn total_price(&self) -> Money {
        self.total_price
    }

    pub fn status(&self) -> BookingStatus {
        self.status
    }

    pub fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    pub fn payment_reference(&self) -> Option<&PaymentReference> {
        self.payment_reference.as_ref()
    }

    pub fn transaction_id(&self) -> Option<&str> {
        self.transaction_id.as_deref()
    }

    pub fn cancellation_reason(&self) -> Option<CancellationReason> {
        self.cancellation_reason
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// 指定した利用者が予約の作成者か
    pub fn is_created_by(&self, user_id: UserId) -> bool {
        self.tenant_id == user_id
    }

    /// ドメインイベントを取得してクリア
    pub fn take_domain_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.domain_events)
    }

    /// ゲートウェイが発行した決済参照を記録する
    /// 事前条件:
    /// - ステータスがPending
    /// - 決済参照が未設定
    pub fn attach_payment_reference(
        &mut self,
        reference: PaymentReference,
    ) -> Result<(), DomainError> {
        if self.status != BookingStatus::Pending {
            return Err(DomainError::InvalidBookingState(
                "決済参照を設定できるのはPending状態のみです".to_string(),
            ));
        }
        if self.payment_reference.is_some() {
            return Err(DomainError::InvalidBookingState(
                "決済参照は既に設定されています".to_string(),
            ));
        }
        self.payment_reference = Some(reference);
        Ok(())
    }

    /// 決済完了により予約を確定する
    /// 事前条件:
    /// - ステータスがPending
    pub fn confirm_payment(&mut self, transaction_id: String) -> Result<(), DomainError> {
        if self.status != BookingStatus::Pending {
            return Err(DomainError::InvalidBookingState(format!(
                "確定できるのはPending状態のみです（現在: {}）",
                self.status
            )));
        }

        self.status = BookingStatus::Confirmed;
        self.payment_status = PaymentStatus::Completed;
        self.transaction_id = Some(transaction_id.clone());

        let event = BookingConfirmed::new(self.id, transaction_id, self.total_price);
        self.domain_events.push(DomainEvent::BookingConfirmed(event));

        Ok(())
    }

    /// 決済失敗により予約をキャンセルする
    /// 事前条件:
    /// - ステータスがPending
    pub fn fail_payment(&mut self, reason: CancellationReason) -> Result<(), DomainError> {
        if self.status != BookingStatus::Pending {
            return Err(DomainError::InvalidBookingState(format!(
                "決済失敗として扱えるのはPending状態のみです（現在: {}）",
                self.status
            )));
        }
        self.cancel_with(PaymentStatus::Failed, reason);
        Ok(())
    }

    /// 利用者が決済を中断した
    /// 事前条件:
    /// - ステータスがPending
    pub fn abandon_payment(&mut self) -> Result<(), DomainError> {
        if self.status != BookingStatus::Pending {
            return Err(DomainError::InvalidBookingState(
                "決済を中断できるのはPending状態のみです".to_string(),
            ));
        }
        self.cancel_with(PaymentStatus::Cancelled, CancellationReason::PaymentAbandoned);
        Ok(())
    }

    /// 利用者による予約取り消し
    /// 事前条件:
    /// - ステータスがCancelledでない
    /// 決済完了済みの場合は返金対象（Refunded）になる
    pub fn cancel_by_tenant(&mut self) -> Result<(), DomainError> {
        let payment_status = match self.status {
            BookingStatus::Cancelled => {
                return Err(DomainError::InvalidBookingState(
                    "既にキャンセル済みの予約です".to_string(),
                ));
            }
            BookingStatus::Confirmed => PaymentStatus::Refunded,
            BookingStatus::Pending => PaymentStatus::Cancelled,
        };
        self.cancel_with(payment_status, CancellationReason::TenantCancelled);
        Ok(())
    }

    fn cancel_with(&mut self, payment_status: PaymentStatus, reason: CancellationReason) {
        self.status = BookingStatus::Cancelled;
        self.payment_status = payment_status;
        self.cancellation_reason = Some(reason);

        let event = BookingCancelled::new(self.id, self.room_id, reason);
        self.domain_events.push(DomainEvent::BookingCancelled(event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn pending_booking() -> Booking {
        let check_in = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let stay = StayPeriod::monthly(check_in, 3).unwrap();
        Booking::request(
            BookingId::new(),
            UserId::new(),
            HostelId::new(),
            RoomId::new(),
            stay,
            3,
            Money::npr(15_000),
        )
    }

    #[test]
    fn test_new_booking_is_pending_and_emits_request_event() {
        let mut booking = pending_booking();

        assert_eq!(booking.status(), BookingStatus::Pending);
        assert_eq!(booking.payment_status(), PaymentStatus::Pending);
        assert!(booking.payment_reference().is_none());

        let events = booking.take_domain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), "BookingRequested");
        assert!(booking.take_domain_events().is_empty());
    }

    #[test]
    fn test_attach_payment_reference_only_once() {
        let mut booking = pending_booking();
        let reference = PaymentReference::new("pidx-123").unwrap();

        assert!(booking.attach_payment_reference(reference.clone()).is_ok());
        assert_eq!(booking.payment_reference(), Some(&reference));
        assert!(booking.attach_payment_reference(reference).is_err());
    }

    #[test]
    fn test_confirm_payment() {
        let mut booking = pending_booking();
        booking.take_domain_events();

        booking.confirm_payment("txn-1".to_string()).unwrap();

        assert_eq!(booking.status(), BookingStatus::Confirmed);
        assert_eq!(booking.payment_status(), PaymentStatus::Completed);
        assert_eq!(booking.transaction_id(), Some("txn-1"));
        let events = booking.take_domain_events();
        assert_eq!(events[0].event_type(), "BookingConfirmed");
    }

    #[test]
    fn test_confirmed_booking_cannot_be_confirmed_or_failed_again() {
        let mut booking = pending_booking();
        booking.confirm_payment("txn-1".to_string()).unwrap();

        assert!(booking.confirm_payment("txn-2".to_string()).is_err());
        assert!(booking.fail_payment(CancellationReason::PaymentFailed).is_err());
        assert_eq!(booking.transaction_id(), Some("txn-1"));
    }

    #[test]
    fn test_fail_payment_cancels_booking() {
        let mut booking = pending_booking();
        booking.fail_payment(CancellationReason::AmountMismatch).unwrap();

        assert_eq!(booking.status(), BookingStatus::Cancelled);
        assert_eq!(booking.payment_status(), PaymentStatus::Failed);
        assert_eq!(
            booking.cancellation_reason(),
            Some(CancellationReason::AmountMismatch)
        );
    }

    #[test]
    fn test_cancelled_booking_is_terminal() {
        let mut booking = pending_booking();
        booking.fail_payment(CancellationReason::PaymentFailed).unwrap();

        assert!(booking.confirm_payment("txn".to_string()).is_err());
        assert!(booking.abandon_payment().is_err());
        assert!(booking.cancel_by_tenant().is_err());
    }

    #[test]
    fn test_abandon_payment() {
        let mut booking = pending_booking();
        booking.abandon_payment().unwrap();

        assert_eq!(booking.status(), BookingStatus::Cancelled);
        assert_eq!(booking.payment_status(), PaymentStatus::Cancelled);
        assert_eq!(
            booking.cancellation_reason(),
            Some(CancellationReason::PaymentAbandoned)
        );
    }

    #[test]
    fn test_tenant_cancel_of_pending_booking() {
        let mut booking = pending_booking();
        booking.cancel_by_tenant().unwrap();

        assert_eq!(booking.status(), BookingStatus::Cancelled);
        assert_eq!(booking.payment_status(), PaymentStatus::Cancelled);
    }

    #[test]
    fn test_tenant_cancel_of_confirmed_booking_marks_refund() {
        let mut booking = pending_booking();
        booking.confirm_payment("txn-1".to_string()).unwrap();
        booking.cancel_by_tenant().unwrap();

        assert_eq!(booking.status(), BookingStatus::Cancelled);
        assert_eq!(booking.payment_status(), PaymentStatus::Refunded);
        assert_eq!(
            booking.cancellation_reason(),
            Some(CancellationReason::TenantCancelled)
        );
    }

    #[test]
    fn test_is_created_by() {
        let booking = pending_booking();
        assert!(booking.is_created_by(booking.tenant_id()));
        assert!(!booking.is_created_by(UserId::new()));
    }
}
