use crate::adapter::database_error::DatabaseError;
use crate::domain::model::{HostelId, Money, Room, RoomId, RoomType};
use crate::domain::port::{RepositoryError, RoomRepository};
use async_trait::async_trait;
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, Pool, Row};

/// MySQL部屋リポジトリ
/// 空室フラグの確保は条件付きUPDATEで原子的に行う
#[derive(Clone)]
pub struct MySqlRoomRepository {
    pool: Pool<MySql>,
}

impl MySqlRoomRepository {
    /// 新しいMySQL部屋リポジトリを作成
    ///
    /// # Arguments
    /// * `pool` - MySQLコネクションプール
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

fn room_from_row(row: &MySqlRow) -> Result<Room, RepositoryError> {
    let decode = |e: sqlx::Error| RepositoryError::from(DatabaseError::from(e));

    let id = RoomId::from_string(&row.try_get::<String, _>("id").map_err(decode)?)
        .map_err(|e| RepositoryError::FetchFailed(format!("部屋IDの解析に失敗しました: {}", e)))?;
    let hostel_id = HostelId::from_string(&row.try_get::<String, _>("hostel_id").map_err(decode)?)
        .map_err(|e| RepositoryError::FetchFailed(format!("ホステルIDの解析に失敗しました: {}", e)))?;
    let room_type = RoomType::from_string(&row.try_get::<String, _>("room_type").map_err(decode)?)
        .map_err(|e| RepositoryError::FetchFailed(e.to_string()))?;

    Ok(Room::reconstruct(
        id,
        hostel_id,
        row.try_get("room_number").map_err(decode)?,
        room_type,
        Money::from_paisa(row.try_get("monthly_rate_paisa").map_err(decode)?),
        row.try_get("is_available").map_err(decode)?,
    ))
}

#[async_trait]
impl RoomRepository for MySqlRoomRepository {
    async fn save(&self, room: &Room) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO rooms (id, hostel_id, room_number, room_type, monthly_rate_paisa, is_available)
            VALUES (?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                room_number = VALUES(room_number),
                room_type = VALUES(room_type),
                monthly_rate_paisa = VALUES(monthly_rate_paisa),
                is_available = VALUES(is_available)
            "#,
        )
        .bind(room.id().to_string())
        .bind(room.hostel_id().to_string())
        .bind(room.room_number())
        .bind(room.room_type().as_str())
        .bind(room.monthly_rate().paisa())
        .bind(room.is_available())
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("部屋の保存に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        Ok(())
    }

    async fn find_by_id(&self, room_id: RoomId) -> Result<Option<Room>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, hostel_id, room_number, room_type, monthly_rate_paisa, is_available FROM rooms WHERE id = ?",
        )
        .bind(room_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("部屋の取得に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        row.as_ref().map(room_from_row).transpose()
    }

    async fn find_by_hostel(&self, hostel_id: HostelId) -> Result<Vec<Room>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, hostel_id, room_number, room_type, monthly_rate_paisa, is_available
            FROM rooms
            WHERE hostel_id = ?
            ORDER BY room_number ASC
            "#,
        )
        .bind(hostel_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("部屋一覧の取得に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        rows.iter().map(room_from_row).collect()
    }

    async fn try_reserve(&self, room_id: RoomId) -> Result<bool, RepositoryError> {
        // 空室の場合のみフラグを下ろす（同時予約ではどちらか一方だけが1行更新できる）
        let result = sqlx::query(
            "UPDATE rooms SET is_available = FALSE WHERE id = ? AND is_available = TRUE",
        )
        .bind(room_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("部屋の確保に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        Ok(result.rows_affected() == 1)
    }

    async fn release(&self, room_id: RoomId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE rooms SET is_available = TRUE WHERE id = ?")
            .bind(room_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryError(format!("部屋の解放に失敗しました: {}", e)))
            .map_err(RepositoryError::from)?;

        Ok(())
    }
}
