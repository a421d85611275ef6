use crate::application::{ApplicationError, RequestContext};
use crate::domain::model::{Hostel, HostelId, HostelProfile, Money, Room, RoomId, RoomType, UserRole};
use crate::domain::port::{HostelRepository, RoomRepository};
use chrono::Utc;
use std::sync::Arc;

/// ホステルアプリケーションサービス
/// ホステルの登録・審査と部屋の追加、公開中ホステルの一覧を扱う
pub struct HostelApplicationService {
    hostel_repository: Arc<dyn HostelRepository>,
    room_repository: Arc<dyn RoomRepository>,
}

impl HostelApplicationService {
    pub fn new(
        hostel_repository: Arc<dyn HostelRepository>,
        room_repository: Arc<dyn RoomRepository>,
    ) -> Self {
        Self {
            hostel_repository,
            room_repository,
        }
    }

    /// オーナーがホステルを登録する（審査待ちで作成）
    pub async fn register_hostel(
        &self,
        ctx: &RequestContext,
        profile: HostelProfile,
    ) -> Result<Hostel, ApplicationError> {
        ctx.require_role(UserRole::Owner)?;
        let hostel = Hostel::register(HostelId::new(), ctx.user_id, profile)?;
        self.hostel_repository.save(&hostel).await?;
        tracing::info!(hostel_id = %hostel.id(), owner_id = %ctx.user_id, "Hostel registered");
        Ok(hostel)
    }

    /// オーナーが自分のホステルに部屋を追加する
    ///
    /// # Arguments
    /// * `ctx` - リクエストしたオーナー
    /// * `hostel_id` - 部屋を追加するホステル
    /// * `room_number` - 部屋番号
    /// * `room_type` - 部屋タイプ
    /// * `monthly_rate` - 月額料金
    pub async fn add_room(
        &self,
        ctx: &RequestContext,
        hostel_id: HostelId,
        room_number: String,
        room_type: RoomType,
        monthly_rate: Money,
    ) -> Result<Room, ApplicationError> {
        ctx.require_role(UserRole::Owner)?;
        let hostel = self.find_hostel(hostel_id).await?;
        if !hostel.is_owned_by(ctx.user_id) {
            return Err(ApplicationError::Forbidden(
                "自分のホステルにのみ部屋を追加できます".to_string(),
            ));
        }

        let room = Room::new(RoomId::new(), hostel_id, room_number, room_type, monthly_rate)?;
        self.room_repository.save(&room).await?;
        tracing::info!(hostel_id = %hostel_id, room_id = %room.id(), "Room added");
        Ok(room)
    }

    /// 公開中のホステルを取得（市区町村で絞り込み可能）
    pub async fn list_approved(&self, city: Option<&str>) -> Result<Vec<Hostel>, ApplicationError> {
        self.hostel_repository
            .find_approved(city)
            .await
            .map_err(ApplicationError::from)
    }

    /// 公開中ホステルの部屋一覧
    pub async fn list_rooms(&self, hostel_id: HostelId) -> Result<Vec<Room>, ApplicationError> {
        let hostel = self.find_hostel(hostel_id).await?;
        if !hostel.is_approved() {
            return Err(ApplicationError::NotFound(format!(
                "ホステルが見つかりません: {}",
                hostel_id
            )));
        }
        self.room_repository
            .find_by_hostel(hostel_id)
            .await
            .map_err(ApplicationError::from)
    }

    pub async fn list_owned(&self, ctx: &RequestContext) -> Result<Vec<Hostel>, ApplicationError> {
        ctx.require_role(UserRole::Owner)?;
        self.hostel_repository
            .find_by_owner(ctx.user_id)
            .await
            .map_err(ApplicationError::from)
    }

    pub async fn list_pending(&self, ctx: &RequestContext) -> Result<Vec<Hostel>, ApplicationError> {
        ctx.require_role(UserRole::Admin)?;
        self.hostel_repository
            .find_pending()
            .await
            .map_err(ApplicationError::from)
    }

    /// 管理者がホステルを承認する
    pub async fn approve(
        &self,
        ctx: &RequestContext,
        hostel_id: HostelId,
    ) -> Result<Hostel, ApplicationError> {
        ctx.require_role(UserRole::Admin)?;
        let mut hostel = self.find_hostel(hostel_id).await?;
        hostel.approve(ctx.user_id, Utc::now())?;
        self.hostel_repository.save(&hostel).await?;
        tracing::info!(hostel_id = %hostel_id, admin_id = %ctx.user_id, "Hostel approved");
        Ok(hostel)
    }

    /// 管理者がホステルを却下する（削除はしない）
    pub async fn reject(
        &self,
        ctx: &RequestContext,
        hostel_id: HostelId,
    ) -> Result<Hostel, ApplicationError> {
        ctx.require_role(UserRole::Admin)?;
        let mut hostel = self.find_hostel(hostel_id).await?;
        hostel.reject()?;
        self.hostel_repository.save(&hostel).await?;
        tracing::info!(hostel_id = %hostel_id, admin_id = %ctx.user_id, "Hostel rejected");
        Ok(hostel)
    }

    async fn find_hostel(&self, hostel_id: HostelId) -> Result<Hostel, ApplicationError> {
        self.hostel_repository
            .find_by_id(hostel_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("ホステルが見つかりません: {}", hostel_id))
            })
    }
}
