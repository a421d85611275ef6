// ドメインサービス
// 複数の集約にまたがるビジネスロジックを実装

use std::sync::Arc;

use crate::domain::error::DomainError;
use crate::domain::model::{BookingId, Room, RoomId, StayPeriod};
use crate::domain::port::{BookingRepository, RoomRepository};

/// 空室判定の結果
#[derive(Debug, Clone, PartialEq)]
pub enum Availability {
    /// 予約可能
    Available(Room),
    /// 空室フラグがfalse
    RoomFlaggedUnavailable,
    /// 期間が重複する有効な予約がある
    Overlapping(Vec<BookingId>),
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available(_))
    }

    /// 予約可能な場合は部屋を返し、それ以外は競合エラーにする
    pub fn into_room(self, room_id: RoomId) -> Result<Room, DomainError> {
        match self {
            Availability::Available(room) => Ok(room),
            Availability::RoomFlaggedUnavailable => Err(DomainError::RoomUnavailable(room_id)),
            Availability::Overlapping(_) => Err(DomainError::OverlappingBooking(room_id)),
        }
    }
}

/// 空室判定サービス
/// 空室フラグと、pending / confirmed 予約との期間重複を確認する
pub struct RoomAvailabilityService {
    room_repository: Arc<dyn RoomRepository>,
    booking_repository: Arc<dyn BookingRepository>,
}

impl RoomAvailabilityService {
    /// 新しい空室判定サービスを作成
    ///
    /// # Arguments
    /// * `room_repository` - 部屋リポジトリ
    /// * `booking_repository` - 予約リポジトリ
    pub fn new(
        room_repository: Arc<dyn RoomRepository>,
        booking_repository: Arc<dyn BookingRepository>,
    ) -> Self {
        Self {
            room_repository,
            booking_repository,
        }
    }

    /// 部屋が指定期間に予約可能か判定する
    ///
    /// # Returns
    /// * `Ok(Availability)` - 判定結果（利用不可は結果であってエラーではない）
    /// * `Err(DomainError::RoomNotFound)` - 部屋が存在しない
    pub async fn check(
        &self,
        room_id: RoomId,
        stay: &StayPeriod,
    ) -> Result<Availability, DomainError> {
        let room = self
            .room_repository
            .find_by_id(room_id)
            .await
            .map_err(|e| DomainError::RepositoryError(format!("部屋の取得に失敗: {}", e)))?
            .ok_or(DomainError::RoomNotFound(room_id))?;

        // フラグがfalseなら重複検索をせずに即座に不可
        if !room.is_available() {
            return Ok(Availability::RoomFlaggedUnavailable);
        }

        let overlapping = self
            .booking_repository
            .find_active_overlapping(room_id, stay)
            .await
            .map_err(|e| DomainError::RepositoryError(format!("予約の取得に失敗: {}", e)))?;

        if overlapping.is_empty() {
            Ok(Availability::Available(room))
        } else {
            Ok(Availability::Overlapping(
                overlapping.iter().map(|booking| booking.id()).collect(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Booking, HostelId, Money, PaymentReference, RoomType, UserId};
    use crate::domain::port::RepositoryError;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct MockRoomRepository {
        rooms: Mutex<HashMap<RoomId, Room>>,
    }

    #[async_trait]
    impl RoomRepository for MockRoomRepository {
        async fn save(&self, room: &Room) -> Result<(), RepositoryError> {
            self.rooms.lock().unwrap().insert(room.id(), room.clone());
            Ok(())
        }

        async fn find_by_id(&self, room_id: RoomId) -> Result<Option<Room>, RepositoryError> {
            Ok(self.rooms.lock().unwrap().get(&room_id).cloned())
        }

        async fn find_by_hostel(&self, hostel_id: HostelId) -> Result<Vec<Room>, RepositoryError> {
            Ok(self
                .rooms
                .lock()
                .unwrap()
                .values()
                .filter(|room| room.belongs_to(hostel_id))
                .cloned()
                .collect())
        }

        async fn try_reserve(&self, room_id: RoomId) -> Result<bool, RepositoryError> {
            let mut rooms = self.rooms.lock().unwrap();
            Ok(rooms
                .get_mut(&room_id)
                .map(|room| room.reserve().is_ok())
                .unwrap_or(false))
        }

        async fn release(&self, room_id: RoomId) -> Result<(), RepositoryError> {
            if let Some(room) = self.rooms.lock().unwrap().get_mut(&room_id) {
                room.release();
            }
            Ok(())
        }
    }

    struct MockBookingRepository {
        bookings: Mutex<Vec<Booking>>,
    }

    #[async_trait]
    impl BookingRepository for MockBookingRepository {
        async fn save(&self, booking: &Booking) -> Result<(), RepositoryError> {
            let mut bookings = self.bookings.lock().unwrap();
            bookings.retain(|b| b.id() != booking.id());
            bookings.push(booking.clone());
            Ok(())
        }

        async fn find_by_id(&self, booking_id: BookingId) -> Result<Option<Booking>, RepositoryError> {
            Ok(self
                .bookings
                .lock()
                .unwrap()
                .iter()
                .find(|b| b.id() == booking_id)
                .cloned())
        }

        async fn find_by_payment_reference(
            &self,
            reference: &PaymentReference,
        ) -> Result<Option<Booking>, RepositoryError> {
            Ok(self
                .bookings
                .lock()
                .unwrap()
                .iter()
                .find(|b| b.payment_reference() == Some(reference))
                .cloned())
        }

        async fn find_by_tenant(&self, tenant_id: UserId) -> Result<Vec<Booking>, RepositoryError> {
            Ok(self
                .bookings
                .lock()
                .unwrap()
                .iter()
                .filter(|b| b.tenant_id() == tenant_id)
                .cloned()
                .collect())
        }

        async fn find_by_hostel_owner(&self, _owner_id: UserId) -> Result<Vec<Booking>, RepositoryError> {
            Ok(Vec::new())
        }

        async fn find_active_overlapping(
            &self,
            room_id: RoomId,
            stay: &StayPeriod,
        ) -> Result<Vec<Booking>, RepositoryError> {
            Ok(self
                .bookings
                .lock()
                .unwrap()
                .iter()
                .filter(|b| b.room_id() == room_id && b.status().is_active() && stay.overlaps(&b.stay()))
                .cloned()
                .collect())
        }

        fn next_identity(&self) -> BookingId {
            BookingId::new()
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup(room: Room, bookings: Vec<Booking>) -> RoomAvailabilityService {
        let rooms = Arc::new(MockRoomRepository {
            rooms: Mutex::new(HashMap::from([(room.id(), room)])),
        });
        let bookings = Arc::new(MockBookingRepository {
            bookings: Mutex::new(bookings),
        });
        RoomAvailabilityService::new(rooms, bookings)
    }

    fn room() -> Room {
        Room::new(
            RoomId::new(),
            HostelId::new(),
            "A-1".to_string(),
            RoomType::Single,
            Money::npr(5_000),
        )
        .unwrap()
    }

    fn booking_for(room: &Room, check_in: NaiveDate, months: u32) -> Booking {
        Booking::request(
            BookingId::new(),
            UserId::new(),
            room.hostel_id(),
            room.id(),
            StayPeriod::monthly(check_in, months).unwrap(),
            months,
            room.monthly_rate().checked_multiply(months).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_free_room_is_available() {
        let room = room();
        let service = setup(room.clone(), Vec::new());
        let stay = StayPeriod::monthly(date(2024, 1, 1), 3).unwrap();

        let result = service.check(room.id(), &stay).await.unwrap();
        assert_eq!(result, Availability::Available(room));
    }

    #[tokio::test]
    async fn test_unknown_room_is_not_found() {
        let service = setup(room(), Vec::new());
        let missing = RoomId::new();
        let stay = StayPeriod::monthly(date(2024, 1, 1), 1).unwrap();

        let result = service.check(missing, &stay).await;
        assert_eq!(result, Err(DomainError::RoomNotFound(missing)));
    }

    #[tokio::test]
    async fn test_flagged_room_is_unavailable_not_error() {
        let mut room = room();
        room.reserve().unwrap();
        let service = setup(room.clone(), Vec::new());
        let stay = StayPeriod::monthly(date(2024, 1, 1), 1).unwrap();

        let result = service.check(room.id(), &stay).await.unwrap();
        assert_eq!(result, Availability::RoomFlaggedUnavailable);
        assert_eq!(
            result.into_room(room.id()),
            Err(DomainError::RoomUnavailable(room.id()))
        );
    }

    #[tokio::test]
    async fn test_overlapping_booking_is_reported() {
        let room = room();
        let existing = booking_for(&room, date(2024, 1, 1), 2); // 1/1〜3/1
        let existing_id = existing.id();
        let service = setup(room.clone(), vec![existing]);

        // チェックアウト日と同日のチェックインも重複
        let stay = StayPeriod::monthly(date(2024, 3, 1), 1).unwrap();
        let result = service.check(room.id(), &stay).await.unwrap();
        assert_eq!(result, Availability::Overlapping(vec![existing_id]));
    }

    #[tokio::test]
    async fn test_cancelled_booking_does_not_block() {
        let room = room();
        let mut existing = booking_for(&room, date(2024, 1, 1), 2);
        existing.cancel_by_tenant().unwrap();
        let service = setup(room.clone(), vec![existing]);

        let stay = StayPeriod::monthly(date(2024, 1, 15), 1).unwrap();
        let result = service.check(room.id(), &stay).await.unwrap();
        assert!(result.is_available());
    }
}
