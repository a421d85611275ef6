mod booking_query_service;
mod hostel_service;

pub use booking_query_service::BookingQueryService;
pub use hostel_service::HostelApplicationService;

use crate::application::{ApplicationError, RequestContext};
use crate::domain::error::DomainError;
use crate::domain::model::{
    Booking, BookingId, BookingStatus, CancellationReason, HostelId, Money, PaymentReference,
    RoomId, StayPeriod,
};
use crate::domain::port::{
    BookingRepository, CustomerInfo, EventPublisher, HostelRepository, PaymentGateway,
    PaymentGatewayError, PaymentInitiation, PaymentVerification, RoomRepository,
};
use crate::domain::pricing::PricingPolicy;
use crate::domain::service::{Availability, RoomAvailabilityService};
use chrono::NaiveDate;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// 補償処理（部屋の解放・失敗した予約の保存）を試みる回数
const COMPENSATION_ATTEMPTS: usize = 2;

/// 決済開始に関する設定
#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    /// 決済完了後にゲートウェイがリダイレクトするURL
    pub return_url: String,
    /// ゲートウェイ呼び出しのタイムアウト
    pub gateway_timeout: Duration,
}

/// 予約作成コマンド
#[derive(Debug, Clone)]
pub struct CreateBookingCommand {
    pub hostel_id: HostelId,
    pub room_id: RoomId,
    pub check_in: NaiveDate,
    pub months: u32,
}

/// 予約作成の結果
#[derive(Debug, Clone)]
pub struct BookingCheckout {
    pub booking: Booking,
    pub payment_redirect_url: String,
}

/// ゲートウェイからのリダイレクトで受け取る決済結果
#[derive(Debug, Clone)]
pub struct PaymentCallback {
    pub reference: PaymentReference,
    pub transaction_id: Option<String>,
    pub purchase_order_id: Option<String>,
}

/// 空室確認の滞在期間の指定方法
#[derive(Debug, Clone, Copy)]
pub enum StayRequest {
    Months(u32),
    Until(NaiveDate),
}

/// 空室確認クエリ
#[derive(Debug, Clone)]
pub struct AvailabilityQuery {
    pub room_id: RoomId,
    pub check_in: NaiveDate,
    pub stay: StayRequest,
}

/// 空室確認の結果
#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilityReport {
    pub is_available: bool,
    /// 月数で指定した場合のみ
    pub total_price: Option<Money>,
}

/// 予約アプリケーションサービス
/// 予約の作成 → 決済開始 → 決済照合 → 確定／キャンセルを調整する
pub struct BookingApplicationService {
    booking_repository: Arc<dyn BookingRepository>,
    room_repository: Arc<dyn RoomRepository>,
    hostel_repository: Arc<dyn HostelRepository>,
    payment_gateway: Arc<dyn PaymentGateway>,
    event_publisher: Arc<dyn EventPublisher>,
    availability: RoomAvailabilityService,
    pricing: PricingPolicy,
    settings: CheckoutSettings,
}

impl BookingApplicationService {
    /// 新しい予約アプリケーションサービスを作成
    ///
    /// # Arguments
    /// * `booking_repository` - 予約リポジトリ
    /// * `room_repository` - 部屋リポジトリ
    /// * `hostel_repository` - ホステルリポジトリ
    /// * `payment_gateway` - 決済ゲートウェイ
    /// * `event_publisher` - イベント発行者
    /// * `pricing` - 料金ポリシー
    /// * `settings` - 決済開始の設定
    pub fn new(
        booking_repository: Arc<dyn BookingRepository>,
        room_repository: Arc<dyn RoomRepository>,
        hostel_repository: Arc<dyn HostelRepository>,
        payment_gateway: Arc<dyn PaymentGateway>,
        event_publisher: Arc<dyn EventPublisher>,
        pricing: PricingPolicy,
        settings: CheckoutSettings,
    ) -> Self {
        let availability =
            RoomAvailabilityService::new(room_repository.clone(), booking_repository.clone());
        Self {
            booking_repository,
            room_repository,
            hostel_repository,
            payment_gateway,
            event_publisher,
            availability,
            pricing,
            settings,
        }
    }

    /// 予約を作成し、決済を開始する
    ///
    /// # Arguments
    /// * `ctx` - リクエストした利用者
    /// * `command` - 予約内容
    ///
    /// # Returns
    /// * `Ok(BookingCheckout)` - Pending状態の予約と決済画面のURL
    /// * `Err(ApplicationError)` - 検証失敗、空室なし、ゲートウェイ失敗など
    pub async fn create_booking(
        &self,
        ctx: &RequestContext,
        command: CreateBookingCommand,
    ) -> Result<BookingCheckout, ApplicationError> {
        let hostel = self
            .hostel_repository
            .find_by_id(command.hostel_id)
            .await?
            .filter(|hostel| hostel.is_approved())
            .ok_or(DomainError::HostelNotAvailable(command.hostel_id))?;

        let room = self
            .room_repository
            .find_by_id(command.room_id)
            .await?
            .filter(|room| room.belongs_to(hostel.id()))
            .ok_or(DomainError::RoomNotFound(command.room_id))?;

        let stay = StayPeriod::monthly(command.check_in, command.months)?;
        let room = self
            .availability
            .check(room.id(), &stay)
            .await?
            .into_room(room.id())?;
        let quote = self.pricing.quote(room.monthly_rate(), command.months)?;

        // チェックと確保の間に別の予約が割り込んだ場合はここで負ける
        if !self.room_repository.try_reserve(room.id()).await? {
            tracing::info!(room_id = %room.id(), "Room was reserved by a concurrent booking");
            return Err(DomainError::RoomUnavailable(room.id()).into());
        }

        let booking_id = self.booking_repository.next_identity();
        let mut booking = Booking::request(
            booking_id,
            ctx.user_id,
            hostel.id(),
            room.id(),
            stay,
            command.months,
            quote.total,
        );

        if let Err(err) = self.booking_repository.save(&booking).await {
            tracing::error!(booking_id = %booking_id, error = %err, "Failed to persist booking");
            self.compensate_room(room.id()).await;
            return Err(err.into());
        }

        let initiation = PaymentInitiation {
            amount_minor: quote.amount_minor,
            order_id: booking_id.to_string(),
            order_name: format!("{} - Room {}", hostel.profile().name, room.room_number()),
            return_url: self.settings.return_url.clone(),
            customer: CustomerInfo {
                name: ctx.name.clone(),
                email: ctx.email.clone(),
                phone: ctx.phone.clone(),
            },
        };

        let initiated = match self
            .call_gateway(self.payment_gateway.initiate(initiation))
            .await
        {
            Ok(initiated) => initiated,
            Err(err) => {
                tracing::warn!(
                    booking_id = %booking_id,
                    error = %err,
                    "Payment initiation failed, releasing room"
                );
                self.abort_checkout(&mut booking, CancellationReason::GatewayRejected)
                    .await;
                return Err(err.into());
            }
        };

        booking.attach_payment_reference(initiated.reference)?;
        if let Err(err) = self.booking_repository.save(&booking).await {
            tracing::error!(booking_id = %booking_id, error = %err, "Failed to store payment reference");
            self.abort_checkout(&mut booking, CancellationReason::PaymentFailed)
                .await;
            return Err(err.into());
        }
        self.publish_events(&mut booking);

        tracing::info!(
            booking_id = %booking_id,
            room_id = %room.id(),
            amount_paisa = quote.amount_minor,
            "Booking created, awaiting payment"
        );

        Ok(BookingCheckout {
            booking,
            payment_redirect_url: initiated.redirect_url,
        })
    }

    /// ゲートウェイからのリダイレクトを受けて決済を照合する
    /// 確定済み・キャンセル済みの予約はゲートウェイを呼ばずにそのまま返す
    ///
    /// # Returns
    /// * `Ok(Booking)` - Confirmed または Cancelled になった予約
    /// * `Err(ApplicationError::GatewayUnavailable)` - 照合できなかった（予約はPendingのまま）
    pub async fn verify_payment(
        &self,
        callback: PaymentCallback,
    ) -> Result<Booking, ApplicationError> {
        let mut booking = self
            .booking_repository
            .find_by_payment_reference(&callback.reference)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!(
                    "決済参照に対応する予約が見つかりません: {}",
                    callback.reference
                ))
            })?;

        if booking.status() != BookingStatus::Pending {
            tracing::info!(
                booking_id = %booking.id(),
                status = %booking.status(),
                "Booking already finalized, skipping verification"
            );
            return Ok(booking);
        }

        let verification = self
            .call_gateway(self.payment_gateway.verify(&callback.reference))
            .await
            .map_err(|err| {
                tracing::warn!(
                    booking_id = %booking.id(),
                    error = %err,
                    "Payment verification did not complete, booking stays pending"
                );
                ApplicationError::from(err)
            })?;

        match evaluate_verification(&booking, &callback, verification) {
            Ok(transaction_id) => booking.confirm_payment(transaction_id)?,
            Err(reason) => {
                tracing::warn!(booking_id = %booking.id(), reason = %reason, "Payment verification failed");
                booking.fail_payment(reason)?;
            }
        }

        self.booking_repository.save(&booking).await?;
        if booking.status() == BookingStatus::Cancelled {
            self.compensate_room(booking.room_id()).await;
        }
        self.publish_events(&mut booking);

        tracing::info!(
            booking_id = %booking.id(),
            status = %booking.status(),
            payment_status = %booking.payment_status(),
            "Payment verified"
        );
        Ok(booking)
    }

    /// 決済画面から離脱した予約を取り消す（作成者のみ、Pendingのみ）
    pub async fn abandon_payment(
        &self,
        ctx: &RequestContext,
        booking_id: BookingId,
    ) -> Result<Booking, ApplicationError> {
        let mut booking = self.find_owned_booking(ctx, booking_id).await?;
        booking.abandon_payment()?;
        self.finish_cancellation(&mut booking).await?;
        Ok(booking)
    }

    /// 予約を取り消す（作成者のみ）
    /// 確定済みの予約は返金対象になる
    pub async fn cancel_booking(
        &self,
        ctx: &RequestContext,
        booking_id: BookingId,
    ) -> Result<Booking, ApplicationError> {
        let mut booking = self.find_owned_booking(ctx, booking_id).await?;
        booking.cancel_by_tenant()?;
        self.finish_cancellation(&mut booking).await?;
        Ok(booking)
    }

    /// 部屋が指定期間に空いているか確認する
    pub async fn check_availability(
        &self,
        query: AvailabilityQuery,
    ) -> Result<AvailabilityReport, ApplicationError> {
        let stay = match query.stay {
            StayRequest::Months(months) => StayPeriod::monthly(query.check_in, months)?,
            StayRequest::Until(check_out) => StayPeriod::between(query.check_in, check_out)?,
        };

        let report = match self.availability.check(query.room_id, &stay).await? {
            Availability::Available(room) => AvailabilityReport {
                is_available: true,
                // 予約作成と同じ見積もりを使い、作成時に拒否される金額は返さない
                total_price: match query.stay {
                    StayRequest::Months(months) => {
                        Some(self.pricing.quote(room.monthly_rate(), months)?.total)
                    }
                    StayRequest::Until(_) => None,
                },
            },
            Availability::RoomFlaggedUnavailable | Availability::Overlapping(_) => {
                AvailabilityReport {
                    is_available: false,
                    total_price: None,
                }
            }
        };
        Ok(report)
    }

    async fn find_owned_booking(
        &self,
        ctx: &RequestContext,
        booking_id: BookingId,
    ) -> Result<Booking, ApplicationError> {
        let booking = self
            .booking_repository
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("予約が見つかりません: {}", booking_id))
            })?;
        if !booking.is_created_by(ctx.user_id) {
            return Err(ApplicationError::Forbidden(
                "予約を取り消せるのは作成者のみです".to_string(),
            ));
        }
        Ok(booking)
    }

    async fn finish_cancellation(&self, booking: &mut Booking) -> Result<(), ApplicationError> {
        self.booking_repository.save(booking).await?;
        self.release_room(booking.room_id()).await?;
        self.publish_events(booking);
        tracing::info!(
            booking_id = %booking.id(),
            payment_status = %booking.payment_status(),
            "Booking cancelled"
        );
        Ok(())
    }

    /// ゲートウェイ呼び出しにタイムアウトを適用する
    /// タイムアウトは決済失敗ではなく到達不能として扱う
    async fn call_gateway<T>(
        &self,
        call: impl Future<Output = Result<T, PaymentGatewayError>>,
    ) -> Result<T, PaymentGatewayError> {
        match tokio::time::timeout(self.settings.gateway_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(PaymentGatewayError::Unavailable(format!(
                "no response within {:?}",
                self.settings.gateway_timeout
            ))),
        }
    }

    async fn release_room(&self, room_id: RoomId) -> Result<(), ApplicationError> {
        let mut last_error = None;
        for attempt in 1..=COMPENSATION_ATTEMPTS {
            match self.room_repository.release(room_id).await {
                Ok(()) => return Ok(()),
                Err(err) => {
                    tracing::warn!(room_id = %room_id, attempt, error = %err, "Failed to release room");
                    last_error = Some(err);
                }
            }
        }
        match last_error {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    /// 決済に進めなかった予約をキャンセル済みで保存し、部屋を解放する
    /// 決済参照のないPendingの予約が期間を塞ぎ続けないようにする
    async fn abort_checkout(&self, booking: &mut Booking, reason: CancellationReason) {
        if let Err(err) = booking.fail_payment(reason) {
            tracing::error!(booking_id = %booking.id(), error = %err, "Checkout could not be cancelled");
        } else if self.save_with_retry(booking).await {
            self.publish_events(booking);
        } else {
            tracing::error!(
                booking_id = %booking.id(),
                "Booking left pending without payment reference"
            );
        }
        self.compensate_room(booking.room_id()).await;
    }

    async fn save_with_retry(&self, booking: &Booking) -> bool {
        for attempt in 1..=COMPENSATION_ATTEMPTS {
            match self.booking_repository.save(booking).await {
                Ok(()) => return true,
                Err(err) => tracing::warn!(
                    booking_id = %booking.id(),
                    attempt,
                    error = %err,
                    "Failed to persist cancelled checkout"
                ),
            }
        }
        false
    }

    /// 補償処理として部屋を解放する（失敗しても元のエラーを優先する）
    async fn compensate_room(&self, room_id: RoomId) {
        if let Err(err) = self.release_room(room_id).await {
            tracing::error!(room_id = %room_id, error = %err, "Room left reserved after compensation failure");
        }
    }

    fn publish_events(&self, booking: &mut Booking) {
        for event in booking.take_domain_events() {
            if let Err(err) = self.event_publisher.publish(&event) {
                tracing::warn!(
                    booking_id = %event.booking_id(),
                    event_type = event.event_type(),
                    error = %err,
                    "Failed to publish domain event"
                );
            }
        }
    }
}

/// 照合結果を予約と突き合わせる
/// 一致すれば取引IDを、不一致ならキャンセル理由を返す
fn evaluate_verification(
    booking: &Booking,
    callback: &PaymentCallback,
    verification: PaymentVerification,
) -> Result<String, CancellationReason> {
    if !verification.status.is_success() {
        return Err(CancellationReason::PaymentFailed);
    }
    if verification.total_amount != booking.total_price().paisa() {
        return Err(CancellationReason::AmountMismatch);
    }
    let transaction_id = verification
        .transaction_id
        .filter(|id| !id.is_empty())
        .ok_or(CancellationReason::PaymentFailed)?;
    if let Some(expected) = &callback.transaction_id {
        if expected != &transaction_id {
            return Err(CancellationReason::PaymentFailed);
        }
    }
    if let Some(order_id) = &callback.purchase_order_id {
        if order_id != &booking.id().to_string() {
            return Err(CancellationReason::PaymentFailed);
        }
    }
    Ok(transaction_id)
}
