use crate::domain::event::DomainEvent;
use crate::domain::port::{EventPublisher, PublisherError};

/// tracingイベント発行者
/// ドメインイベントを構造化ログとして出力する
pub struct TracingEventPublisher;

impl TracingEventPublisher {
    /// 新しいtracingイベント発行者を作成
    pub fn new() -> Self {
        Self
    }
}

impl Default for TracingEventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventPublisher for TracingEventPublisher {
    fn publish(&self, event: &DomainEvent) -> Result<(), PublisherError> {
        match event {
            DomainEvent::BookingRequested(e) => {
                tracing::info!(
                    event = "BookingRequested",
                    booking_id = %e.booking_id,
                    tenant_id = %e.tenant_id,
                    hostel_id = %e.hostel_id,
                    room_id = %e.room_id,
                    check_in = %e.stay.check_in(),
                    check_out = %e.stay.check_out(),
                    total_price = %e.total_price,
                    occurred_at = %e.occurred_at.format("%Y-%m-%d %H:%M:%S"),
                    "Booking requested"
                );
            }
            DomainEvent::BookingConfirmed(e) => {
                tracing::info!(
                    event = "BookingConfirmed",
                    booking_id = %e.booking_id,
                    transaction_id = %e.transaction_id,
                    amount = %e.amount,
                    occurred_at = %e.occurred_at.format("%Y-%m-%d %H:%M:%S"),
                    "Booking confirmed"
                );
            }
            DomainEvent::BookingCancelled(e) => {
                tracing::info!(
                    event = "BookingCancelled",
                    booking_id = %e.booking_id,
                    room_id = %e.room_id,
                    reason = %e.reason,
                    occurred_at = %e.occurred_at.format("%Y-%m-%d %H:%M:%S"),
                    "Booking cancelled"
                );
            }
        }
        Ok(())
    }
}
