use crate::application::{ApplicationError, RequestContext};
use crate::domain::model::{Booking, BookingId, UserRole};
use crate::domain::port::{BookingRepository, HostelRepository};
use std::sync::Arc;

/// 予約クエリサービス
/// 読み取り専用の予約操作を提供する
pub struct BookingQueryService {
    booking_repository: Arc<dyn BookingRepository>,
    hostel_repository: Arc<dyn HostelRepository>,
}

impl BookingQueryService {
    /// 新しい予約クエリサービスを作成
    ///
    /// # Arguments
    /// * `booking_repository` - 予約リポジトリ
    /// * `hostel_repository` - ホステルリポジトリ（オーナー判定に使用）
    pub fn new(
        booking_repository: Arc<dyn BookingRepository>,
        hostel_repository: Arc<dyn HostelRepository>,
    ) -> Self {
        Self {
            booking_repository,
            hostel_repository,
        }
    }

    /// 予約IDで予約を取得
    /// 閲覧できるのは予約の作成者と、予約先ホステルのオーナーのみ
    ///
    /// # Returns
    /// * `Ok(Booking)` - 予約
    /// * `Err(ApplicationError::NotFound)` - 予約が存在しない
    /// * `Err(ApplicationError::Forbidden)` - 閲覧権限がない
    pub async fn get_booking(
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

        if booking.is_created_by(ctx.user_id) {
            return Ok(booking);
        }

        let is_hostel_owner = self
            .hostel_repository
            .find_by_id(booking.hostel_id())
            .await?
            .map(|hostel| hostel.is_owned_by(ctx.user_id))
            .unwrap_or(false);

        if is_hostel_owner {
            Ok(booking)
        } else {
            Err(ApplicationError::Forbidden(
                "この予約を閲覧する権限がありません".to_string(),
            ))
        }
    }

    /// 自分の予約一覧を作成日時の降順で取得
    pub async fn my_bookings(&self, ctx: &RequestContext) -> Result<Vec<Booking>, ApplicationError> {
        self.booking_repository
            .find_by_tenant(ctx.user_id)
            .await
            .map_err(ApplicationError::from)
    }

    /// オーナーが所有するホステルへの予約一覧を取得
    pub async fn owner_bookings(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<Booking>, ApplicationError> {
        ctx.require_role(UserRole::Owner)?;
        self.booking_repository
            .find_by_hostel_owner(ctx.user_id)
            .await
            .map_err(ApplicationError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{
        Contact, Hostel, HostelId, HostelProfile, HostelType, Money, PaymentReference, RoomId,
        StayPeriod, UserId,
    };
    use crate::domain::port::RepositoryError;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct MockBookingRepository {
        bookings: Mutex<HashMap<BookingId, Booking>>,
    }

    #[async_trait]
    impl BookingRepository for MockBookingRepository {
        async fn save(&self, booking: &Booking) -> Result<(), RepositoryError> {
            self.bookings
                .lock()
                .unwrap()
                .insert(booking.id(), booking.clone());
            Ok(())
        }

        async fn find_by_id(&self, booking_id: BookingId) -> Result<Option<Booking>, RepositoryError> {
            Ok(self.bookings.lock().unwrap().get(&booking_id).cloned())
        }

        async fn find_by_payment_reference(
            &self,
            _reference: &PaymentReference,
        ) -> Result<Option<Booking>, RepositoryError> {
            Ok(None)
        }

        async fn find_by_tenant(&self, tenant_id: UserId) -> Result<Vec<Booking>, RepositoryError> {
            Ok(self
                .bookings
                .lock()
                .unwrap()
                .values()
                .filter(|b| b.tenant_id() == tenant_id)
                .cloned()
                .collect())
        }

        async fn find_by_hostel_owner(&self, _owner_id: UserId) -> Result<Vec<Booking>, RepositoryError> {
            Ok(self.bookings.lock().unwrap().values().cloned().collect())
        }

        async fn find_active_overlapping(
            &self,
            _room_id: RoomId,
            _stay: &StayPeriod,
        ) -> Result<Vec<Booking>, RepositoryError> {
            Ok(Vec::new())
        }

        fn next_identity(&self) -> BookingId {
            BookingId::new()
        }
    }

    struct MockHostelRepository {
        hostels: Mutex<HashMap<HostelId, Hostel>>,
    }

    #[async_trait]
    impl HostelRepository for MockHostelRepository {
        async fn save(&self, hostel: &Hostel) -> Result<(), RepositoryError> {
            self.hostels.lock().unwrap().insert(hostel.id(), hostel.clone());
            Ok(())
        }

        async fn find_by_id(&self, hostel_id: HostelId) -> Result<Option<Hostel>, RepositoryError> {
            Ok(self.hostels.lock().unwrap().get(&hostel_id).cloned())
        }

        async fn find_approved(&self, _city: Option<&str>) -> Result<Vec<Hostel>, RepositoryError> {
            Ok(Vec::new())
        }

        async fn find_pending(&self) -> Result<Vec<Hostel>, RepositoryError> {
            Ok(Vec::new())
        }

        async fn find_by_owner(&self, _owner_id: UserId) -> Result<Vec<Hostel>, RepositoryError> {
            Ok(Vec::new())
        }
    }

    fn context(user_id: UserId, role: UserRole) -> RequestContext {
        RequestContext::new(user_id, role, "Sita".to_string(), "sita@example.com".to_string())
    }

    struct Fixture {
        service: BookingQueryService,
        booking: Booking,
        owner_id: UserId,
    }

    async fn setup() -> Fixture {
        let owner_id = UserId::new();
        let hostel = Hostel::register(
            HostelId::new(),
            owner_id,
            HostelProfile {
                name: "Annapurna Girls Hostel".to_string(),
                location: "Lakeside".to_string(),
                city: "Pokhara".to_string(),
                description: "Quiet rooms".to_string(),
                hostel_type: HostelType::Girls,
                price_min: Money::npr(3_000),
                price_max: Money::npr(6_000),
                contact: Contact::default(),
            },
        )
        .unwrap();
        let booking = Booking::request(
            BookingId::new(),
            UserId::new(),
            hostel.id(),
            RoomId::new(),
            StayPeriod::monthly(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), 1).unwrap(),
            1,
            Money::npr(4_000),
        );

        let bookings = MockBookingRepository {
            bookings: Mutex::new(HashMap::new()),
        };
        bookings.save(&booking).await.unwrap();
        let hostels = MockHostelRepository {
            hostels: Mutex::new(HashMap::new()),
        };
        hostels.save(&hostel).await.unwrap();

        Fixture {
            service: BookingQueryService::new(Arc::new(bookings), Arc::new(hostels)),
            booking,
            owner_id,
        }
    }

    #[tokio::test]
    async fn test_creator_can_read_booking() {
        let f = setup().await;
        let ctx = context(f.booking.tenant_id(), UserRole::User);
        let found = f.service.get_booking(&ctx, f.booking.id()).await.unwrap();
        assert_eq!(found.id(), f.booking.id());
    }

    #[tokio::test]
    async fn test_hostel_owner_can_read_booking() {
        let f = setup().await;
        let ctx = context(f.owner_id, UserRole::Owner);
        assert!(f.service.get_booking(&ctx, f.booking.id()).await.is_ok());
    }

    #[tokio::test]
    async fn test_other_user_is_forbidden() {
        let f = setup().await;
        let ctx = context(UserId::new(), UserRole::User);
        let result = f.service.get_booking(&ctx, f.booking.id()).await;
        assert!(matches!(result, Err(ApplicationError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_missing_booking_is_not_found() {
        let f = setup().await;
        let ctx = context(f.booking.tenant_id(), UserRole::User);
        let result = f.service.get_booking(&ctx, BookingId::new()).await;
        assert!(matches!(result, Err(ApplicationError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_owner_bookings_requires_owner_role() {
        let f = setup().await;
        let ctx = context(f.owner_id, UserRole::User);
        let result = f.service.owner_bookings(&ctx).await;
        assert!(matches!(result, Err(ApplicationError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_my_bookings() {
        let f = setup().await;
        let ctx = context(f.booking.tenant_id(), UserRole::User);
        let bookings = f.service.my_bookings(&ctx).await.unwrap();
        assert_eq!(bookings.len(), 1);
    }
}
