use crate::domain::error::DomainError;
use crate::domain::model::{HostelId, Money, RoomId, RoomType};

/// 部屋集約
/// 月額料金と空室フラグを管理する
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    id: RoomId,
    hostel_id: HostelId,
    room_number: String,
    room_type: RoomType,
    monthly_rate: Money,
    is_available: bool,
}

impl Room {
    /// 新しい部屋を作成（初期状態は空室）
    ///
    /// # Arguments
    /// * `id` - 部屋ID
    /// * `hostel_id` - 所属するホステルのID
    /// * `room_number` - 部屋番号
    /// * `room_type` - 部屋タイプ
    /// * `monthly_rate` - 月額料金
    pub fn new(
        id: RoomId,
        hostel_id: HostelId,
        room_number: String,
        room_type: RoomType,
        monthly_rate: Money,
    ) -> Result<Self, DomainError> {
        if room_number.trim().is_empty() {
            return Err(DomainError::validation("room_number", "部屋番号は空にできません"));
        }
        if monthly_rate.paisa() <= 0 {
            return Err(DomainError::validation(
                "monthly_price",
                "月額料金は正の値である必要があります",
            ));
        }
        Ok(Self {
            id,
            hostel_id,
            room_number,
            room_type,
            monthly_rate,
            is_available: true,
        })
    }

    /// データベースから取得したデータで部屋を再構築
    pub fn reconstruct(
        id: RoomId,
        hostel_id: HostelId,
        room_number: String,
        room_type: RoomType,
        monthly_rate: Money,
        is_available: bool,
    ) -> Self {
        Self {
            id,
            hostel_id,
            room_number,
            room_type,
            monthly_rate,
            is_available,
        }
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn hostel_id(&self) -> HostelId {
        self.hostel_id
    }

    pub fn room_number(&self) -> &str {
        &self.room_number
    }

    pub fn room_type(&self) -> RoomType {
        self.room_type
    }

    pub fn monthly_rate(&self) -> Money {
        self.monthly_rate
    }

    /// 空室フラグを取得
    pub fn is_available(&self) -> bool {
        self.is_available
    }

    /// 指定したホステルに属しているか
    pub fn belongs_to(&self, hostel_id: HostelId) -> bool {
        self.hostel_id == hostel_id
    }

    /// 部屋を確保する
    ///
    /// # Returns
    /// * `Ok(())` - 確保成功
    /// * `Err(DomainError::RoomUnavailable)` - 既に確保されている
    pub fn reserve(&mut self) -> Result<(), DomainError> {
        if !self.is_available {
            return Err(DomainError::RoomUnavailable(self.id));
        }
        self.is_available = false;
        Ok(())
    }

    /// 部屋を解放する（キャンセル・決済失敗時など）
    pub fn release(&mut self) {
        self.is_available = true;
    }
}
