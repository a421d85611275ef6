// 統合テスト共通のモックとフィクスチャ
#![allow(dead_code)]

use hostel_khojau::application::service::{
    BookingApplicationService, BookingQueryService, CheckoutSettings, HostelApplicationService,
};
use hostel_khojau::application::RequestContext;
use hostel_khojau::domain::event::DomainEvent;
use hostel_khojau::domain::model::{
    Booking, BookingId, Contact, Hostel, HostelId, HostelProfile, HostelStatus, HostelType, Money,
    PaymentReference, Room, RoomId, RoomType, StayPeriod, UserId, UserRole,
};
use hostel_khojau::domain::port::{
    BookingRepository, EventPublisher, GatewayPaymentStatus, HostelRepository, InitiatedPayment,
    PaymentGateway, PaymentGatewayError, PaymentInitiation, PaymentVerification, PublisherError,
    RepositoryError, RoomRepository,
};
use hostel_khojau::domain::pricing::PricingPolicy;

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

// テスト用のモックリポジトリ
pub struct InMemoryHostelRepository {
    hostels: Mutex<HashMap<HostelId, Hostel>>,
}

impl InMemoryHostelRepository {
    pub fn new() -> Self {
        Self {
            hostels: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl HostelRepository for InMemoryHostelRepository {
    async fn save(&self, hostel: &Hostel) -> Result<(), RepositoryError> {
        self.hostels.lock().await.insert(hostel.id(), hostel.clone());
        Ok(())
    }

    async fn find_by_id(&self, hostel_id: HostelId) -> Result<Option<Hostel>, RepositoryError> {
        Ok(self.hostels.lock().await.get(&hostel_id).cloned())
    }

    async fn find_approved(&self, city: Option<&str>) -> Result<Vec<Hostel>, RepositoryError> {
        let hostels = self.hostels.lock().await;
        Ok(hostels
            .values()
            .filter(|h| h.is_approved())
            .filter(|h| city.map_or(true, |c| h.profile().city.eq_ignore_ascii_case(c.trim())))
            .cloned()
            .collect())
    }

    async fn find_pending(&self) -> Result<Vec<Hostel>, RepositoryError> {
        let hostels = self.hostels.lock().await;
        Ok(hostels
            .values()
            .filter(|h| h.status() == HostelStatus::Pending)
            .cloned()
            .collect())
    }

    async fn find_by_owner(&self, owner_id: UserId) -> Result<Vec<Hostel>, RepositoryError> {
        let hostels = self.hostels.lock().await;
        Ok(hostels
            .values()
            .filter(|h| h.is_owned_by(owner_id))
            .cloned()
            .collect())
    }
}

pub struct InMemoryRoomRepository {
    rooms: Mutex<HashMap<RoomId, Room>>,
}

impl InMemoryRoomRepository {
    pub fn new() -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
        }
    }

    pub async fn is_available(&self, room_id: RoomId) -> bool {
        self.rooms
            .lock()
            .await
            .get(&room_id)
            .map(|room| room.is_available())
            .unwrap_or(false)
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn save(&self, room: &Room) -> Result<(), RepositoryError> {
        self.rooms.lock().await.insert(room.id(), room.clone());
        Ok(())
    }

    async fn find_by_id(&self, room_id: RoomId) -> Result<Option<Room>, RepositoryError> {
        Ok(self.rooms.lock().await.get(&room_id).cloned())
    }

    async fn find_by_hostel(&self, hostel_id: HostelId) -> Result<Vec<Room>, RepositoryError> {
        let rooms = self.rooms.lock().await;
        let mut found: Vec<Room> = rooms
            .values()
            .filter(|room| room.belongs_to(hostel_id))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.room_number().cmp(b.room_number()));
        Ok(found)
    }

    async fn try_reserve(&self, room_id: RoomId) -> Result<bool, RepositoryError> {
        // ロックを保持したまま判定と更新を行う
        let mut rooms = self.rooms.lock().await;
        match rooms.get_mut(&room_id) {
            Some(room) if room.is_available() => {
                room.reserve()
                    .map_err(|e| RepositoryError::OperationFailed(e.to_string()))?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn release(&self, room_id: RoomId) -> Result<(), RepositoryError> {
        if let Some(room) = self.rooms.lock().await.get_mut(&room_id) {
            room.release();
        }
        Ok(())
    }
}

pub struct InMemoryBookingRepository {
    bookings: Mutex<HashMap<BookingId, Booking>>,
    hostels: Arc<InMemoryHostelRepository>,
    save_calls: AtomicUsize,
    // 0 は失敗させない
    failing_save: AtomicUsize,
}

impl InMemoryBookingRepository {
    pub fn new(hostels: Arc<InMemoryHostelRepository>) -> Self {
        Self {
            bookings: Mutex::new(HashMap::new()),
            hostels,
            save_calls: AtomicUsize::new(0),
            failing_save: AtomicUsize::new(0),
        }
    }

    /// これから数えてn回目のsaveだけを失敗させる
    pub fn fail_nth_save(&self, n: usize) {
        let done = self.save_calls.load(Ordering::SeqCst);
        self.failing_save.store(done + n, Ordering::SeqCst);
    }

    pub async fn all(&self) -> Vec<Booking> {
        self.bookings.lock().await.values().cloned().collect()
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn save(&self, booking: &Booking) -> Result<(), RepositoryError> {
        let call = self.save_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.failing_save.load(Ordering::SeqCst) {
            return Err(RepositoryError::OperationFailed("write rejected".to_string()));
        }
        self.bookings.lock().await.insert(booking.id(), booking.clone());
        Ok(())
    }

    async fn find_by_id(&self, booking_id: BookingId) -> Result<Option<Booking>, RepositoryError> {
        Ok(self.bookings.lock().await.get(&booking_id).cloned())
    }

    async fn find_by_payment_reference(
        &self,
        reference: &PaymentReference,
    ) -> Result<Option<Booking>, RepositoryError> {
        let bookings = self.bookings.lock().await;
        Ok(bookings
            .values()
            .find(|b| b.payment_reference() == Some(reference))
            .cloned())
    }

    async fn find_by_tenant(&self, tenant_id: UserId) -> Result<Vec<Booking>, RepositoryError> {
        let bookings = self.bookings.lock().await;
        Ok(bookings
            .values()
            .filter(|b| b.is_created_by(tenant_id))
            .cloned()
            .collect())
    }

    async fn find_by_hostel_owner(&self, owner_id: UserId) -> Result<Vec<Booking>, RepositoryError> {
        let owned: Vec<HostelId> = self
            .hostels
            .find_by_owner(owner_id)
            .await?
            .iter()
            .map(|h| h.id())
            .collect();
        let bookings = self.bookings.lock().await;
        Ok(bookings
            .values()
            .filter(|b| owned.contains(&b.hostel_id()))
            .cloned()
            .collect())
    }

    async fn find_active_overlapping(
        &self,
        room_id: RoomId,
        stay: &StayPeriod,
    ) -> Result<Vec<Booking>, RepositoryError> {
        let bookings = self.bookings.lock().await;
        Ok(bookings
            .values()
            .filter(|b| b.room_id() == room_id && b.status().is_active())
            .filter(|b| stay.overlaps(&b.stay()))
            .cloned()
            .collect())
    }

    fn next_identity(&self) -> BookingId {
        BookingId::new()
    }
}

/// 振る舞いを切り替えられる偽の決済ゲートウェイ
/// 照合結果を設定しない場合は、開始時の金額でCompletedを返す
pub struct FakePaymentGateway {
    initiations: Mutex<Vec<PaymentInitiation>>,
    initiate_failure: Mutex<Option<PaymentGatewayError>>,
    verification: Mutex<Option<Result<PaymentVerification, PaymentGatewayError>>>,
    delay: Mutex<Duration>,
    verify_calls: AtomicUsize,
}

impl FakePaymentGateway {
    pub fn new() -> Self {
        Self {
            initiations: Mutex::new(Vec::new()),
            initiate_failure: Mutex::new(None),
            verification: Mutex::new(None),
            delay: Mutex::new(Duration::ZERO),
            verify_calls: AtomicUsize::new(0),
        }
    }

    pub async fn fail_initiation(&self, err: PaymentGatewayError) {
        *self.initiate_failure.lock().await = Some(err);
    }

    pub async fn restore_initiation(&self) {
        *self.initiate_failure.lock().await = None;
    }

    pub async fn set_verification(&self, result: Result<PaymentVerification, PaymentGatewayError>) {
        *self.verification.lock().await = Some(result);
    }

    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.lock().await = delay;
    }

    pub async fn initiations(&self) -> Vec<PaymentInitiation> {
        self.initiations.lock().await.clone()
    }

    pub fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }

    async fn wait(&self) {
        let delay = *self.delay.lock().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

pub fn reference_for(order_id: &str) -> String {
    format!("pidx-{}", order_id)
}

#[async_trait]
impl PaymentGateway for FakePaymentGateway {
    async fn initiate(
        &self,
        request: PaymentInitiation,
    ) -> Result<InitiatedPayment, PaymentGatewayError> {
        self.wait().await;
        if let Some(err) = self.initiate_failure.lock().await.clone() {
            return Err(err);
        }
        let pidx = reference_for(&request.order_id);
        self.initiations.lock().await.push(request);
        Ok(InitiatedPayment {
            reference: PaymentReference::new(pidx.clone())
                .map_err(|e| PaymentGatewayError::InvalidResponse(e.to_string()))?,
            redirect_url: format!("https://test-pay.khalti.com/?pidx={}", pidx),
        })
    }

    async fn verify(
        &self,
        reference: &PaymentReference,
    ) -> Result<PaymentVerification, PaymentGatewayError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        self.wait().await;
        if let Some(result) = self.verification.lock().await.clone() {
            return result;
        }
        let initiations = self.initiations.lock().await;
        let amount = initiations
            .iter()
            .find(|i| reference_for(&i.order_id) == reference.as_str())
            .map(|i| i.amount_minor)
            .ok_or_else(|| PaymentGatewayError::Rejected("unknown pidx".to_string()))?;
        Ok(PaymentVerification {
            status: GatewayPaymentStatus::Completed,
            transaction_id: Some("txn-001".to_string()),
            total_amount: amount,
        })
    }
}

/// 発行されたイベントを記録するだけの発行者
pub struct RecordingEventPublisher {
    events: std::sync::Mutex<Vec<DomainEvent>>,
}

impl RecordingEventPublisher {
    pub fn new() -> Self {
        Self {
            events: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn event_types(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.event_type())
            .collect()
    }
}

impl EventPublisher for RecordingEventPublisher {
    fn publish(&self, event: &DomainEvent) -> Result<(), PublisherError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

pub fn context(role: UserRole, name: &str) -> RequestContext {
    RequestContext::new(
        UserId::new(),
        role,
        name.to_string(),
        format!("{}@example.com", name.to_lowercase()),
    )
}

pub fn profile(name: &str, city: &str) -> HostelProfile {
    HostelProfile {
        name: name.to_string(),
        location: "New Baneshwor".to_string(),
        city: city.to_string(),
        description: "Close to Tribhuvan University".to_string(),
        hostel_type: HostelType::CoEd,
        price_min: Money::npr(4_000),
        price_max: Money::npr(9_000),
        contact: Contact::default(),
    }
}

/// サービス一式とモックをまとめたテスト環境
pub struct TestEnv {
    pub hostels: Arc<InMemoryHostelRepository>,
    pub rooms: Arc<InMemoryRoomRepository>,
    pub bookings: Arc<InMemoryBookingRepository>,
    pub gateway: Arc<FakePaymentGateway>,
    pub publisher: Arc<RecordingEventPublisher>,
    pub booking_service: Arc<BookingApplicationService>,
    pub booking_query_service: Arc<BookingQueryService>,
    pub hostel_service: Arc<HostelApplicationService>,
    pub owner: RequestContext,
    pub tenant: RequestContext,
    pub admin: RequestContext,
}

impl TestEnv {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(5))
    }

    pub fn with_timeout(gateway_timeout: Duration) -> Self {
        let hostels = Arc::new(InMemoryHostelRepository::new());
        let rooms = Arc::new(InMemoryRoomRepository::new());
        let bookings = Arc::new(InMemoryBookingRepository::new(hostels.clone()));
        let gateway = Arc::new(FakePaymentGateway::new());
        let publisher = Arc::new(RecordingEventPublisher::new());

        let booking_service = BookingApplicationService::new(
            bookings.clone(),
            rooms.clone(),
            hostels.clone(),
            gateway.clone(),
            publisher.clone(),
            PricingPolicy::default(),
            CheckoutSettings {
                return_url: "http://localhost:3000/bookings/complete-payment".to_string(),
                gateway_timeout,
            },
        );
        let booking_query_service = BookingQueryService::new(bookings.clone(), hostels.clone());
        let hostel_service = HostelApplicationService::new(hostels.clone(), rooms.clone());

        Self {
            hostels,
            rooms,
            bookings,
            gateway,
            publisher,
            booking_service: Arc::new(booking_service),
            booking_query_service: Arc::new(booking_query_service),
            hostel_service: Arc::new(hostel_service),
            owner: context(UserRole::Owner, "Ramesh"),
            tenant: context(UserRole::User, "Sita"),
            admin: context(UserRole::Admin, "Admin"),
        }
    }

    /// 承認済みのホステルを登録する
    pub async fn approved_hostel(&self) -> Hostel {
        let mut hostel =
            Hostel::register(HostelId::new(), self.owner.user_id, profile("Himalayan Hostel", "Kathmandu"))
                .unwrap();
        hostel.approve(self.admin.user_id, Utc::now()).unwrap();
        self.hostels.save(&hostel).await.unwrap();
        hostel
    }

    /// 月額料金（ルピー）を指定して空室を追加する
    pub async fn room(&self, hostel: &Hostel, number: &str, monthly_rupees: i64) -> Room {
        let room = Room::new(
            RoomId::new(),
            hostel.id(),
            number.to_string(),
            RoomType::Single,
            Money::npr(monthly_rupees),
        )
        .unwrap();
        self.rooms.save(&room).await.unwrap();
        room
    }
}
