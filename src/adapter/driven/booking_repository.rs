use crate::adapter::database_error::DatabaseError;
use crate::domain::model::{
    Booking, BookingId, BookingRecord, BookingStatus, CancellationReason, HostelId, Money,
    PaymentReference, PaymentStatus, RoomId, StayPeriod, UserId,
};
use crate::domain::port::{BookingRepository, RepositoryError};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, Pool, Row};

const BOOKING_COLUMNS: &str = r#"
    b.id, b.tenant_id, b.hostel_id, b.room_id, b.check_in_date, b.check_out_date,
    b.months, b.total_price_paisa, b.status, b.payment_status, b.payment_reference,
    b.transaction_id, b.cancellation_reason, b.created_at
"#;

/// MySQL予約リポジトリ
/// MySQLデータベースを使用して予約を永続化する
#[derive(Clone)]
pub struct MySqlBookingRepository {
    pool: Pool<MySql>,
}

impl MySqlBookingRepository {
    /// 新しいMySQL予約リポジトリを作成
    ///
    /// # Arguments
    /// * `pool` - MySQLコネクションプール
    ///
    /// # Returns
    /// * MySqlBookingRepositoryのインスタンス
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

fn fetch_failed(what: &str, e: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::FetchFailed(format!("{}の解析に失敗しました: {}", what, e))
}

/// データベースの行から予約集約を再構築する
fn booking_from_row(row: &MySqlRow) -> Result<Booking, RepositoryError> {
    let decode = |e: sqlx::Error| RepositoryError::from(DatabaseError::from(e));

    let id = BookingId::from_string(&row.try_get::<String, _>("id").map_err(decode)?)
        .map_err(|e| fetch_failed("予約ID", e))?;
    let tenant_id = UserId::from_string(&row.try_get::<String, _>("tenant_id").map_err(decode)?)
        .map_err(|e| fetch_failed("入居希望者ID", e))?;
    let hostel_id = HostelId::from_string(&row.try_get::<String, _>("hostel_id").map_err(decode)?)
        .map_err(|e| fetch_failed("ホステルID", e))?;
    let room_id = RoomId::from_string(&row.try_get::<String, _>("room_id").map_err(decode)?)
        .map_err(|e| fetch_failed("部屋ID", e))?;

    let stay = StayPeriod::reconstruct(
        row.try_get::<NaiveDate, _>("check_in_date").map_err(decode)?,
        row.try_get::<NaiveDate, _>("check_out_date").map_err(decode)?,
    );

    let status = BookingStatus::from_string(&row.try_get::<String, _>("status").map_err(decode)?)
        .map_err(|e| fetch_failed("予約ステータス", e))?;
    let payment_status =
        PaymentStatus::from_string(&row.try_get::<String, _>("payment_status").map_err(decode)?)
            .map_err(|e| fetch_failed("決済ステータス", e))?;
    let payment_reference = row
        .try_get::<Option<String>, _>("payment_reference")
        .map_err(decode)?
        .map(PaymentReference::new)
        .transpose()
        .map_err(|e| fetch_failed("決済参照", e))?;
    let cancellation_reason = row
        .try_get::<Option<String>, _>("cancellation_reason")
        .map_err(decode)?
        .map(|s| CancellationReason::from_string(&s))
        .transpose()
        .map_err(|e| fetch_failed("キャンセル理由", e))?;

    Ok(Booking::reconstruct(BookingRecord {
        id,
        tenant_id,
        hostel_id,
        room_id,
        stay,
        months: row.try_get::<u32, _>("months").map_err(decode)?,
        total_price: Money::from_paisa(row.try_get("total_price_paisa").map_err(decode)?),
        status,
        payment_status,
        payment_reference,
        transaction_id: row.try_get("transaction_id").map_err(decode)?,
        cancellation_reason,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at").map_err(decode)?,
    }))
}

fn bookings_from_rows(rows: Vec<MySqlRow>) -> Result<Vec<Booking>, RepositoryError> {
    rows.iter().map(booking_from_row).collect()
}

#[async_trait]
impl BookingRepository for MySqlBookingRepository {
    async fn save(&self, booking: &Booking) -> Result<(), RepositoryError> {
        // 予約データをbookingsテーブルにUPSERT（物理削除はしない）
        sqlx::query(
            r#"
            INSERT INTO bookings (
                id, tenant_id, hostel_id, room_id, check_in_date, check_out_date,
                months, total_price_paisa, status, payment_status, payment_reference,
                transaction_id, cancellation_reason, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                status = VALUES(status),
                payment_status = VALUES(payment_status),
                payment_reference = VALUES(payment_reference),
                transaction_id = VALUES(transaction_id),
                cancellation_reason = VALUES(cancellation_reason)
            "#,
        )
        .bind(booking.id().to_string())
        .bind(booking.tenant_id().to_string())
        .bind(booking.hostel_id().to_string())
        .bind(booking.room_id().to_string())
        .bind(booking.stay().check_in())
        .bind(booking.stay().check_out())
        .bind(booking.months())
        .bind(booking.total_price().paisa())
        .bind(booking.status().as_str())
        .bind(booking.payment_status().as_str())
        .bind(booking.payment_reference().map(|r| r.as_str().to_string()))
        .bind(booking.transaction_id().map(str::to_string))
        .bind(booking.cancellation_reason().map(|r| r.as_str()))
        .bind(booking.created_at())
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("予約の保存に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        Ok(())
    }

    async fn find_by_id(&self, booking_id: BookingId) -> Result<Option<Booking>, RepositoryError> {
        let sql = format!("SELECT {} FROM bookings b WHERE b.id = ?", BOOKING_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(booking_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryError(format!("予約の取得に失敗しました: {}", e)))
            .map_err(RepositoryError::from)?;

        row.as_ref().map(booking_from_row).transpose()
    }

    async fn find_by_payment_reference(
        &self,
        reference: &PaymentReference,
    ) -> Result<Option<Booking>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM bookings b WHERE b.payment_reference = ?",
            BOOKING_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(reference.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryError(format!("予約の取得に失敗しました: {}", e)))
            .map_err(RepositoryError::from)?;

        row.as_ref().map(booking_from_row).transpose()
    }

    async fn find_by_tenant(&self, tenant_id: UserId) -> Result<Vec<Booking>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM bookings b WHERE b.tenant_id = ? ORDER BY b.created_at DESC",
            BOOKING_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(tenant_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryError(format!("予約一覧の取得に失敗しました: {}", e)))
            .map_err(RepositoryError::from)?;

        bookings_from_rows(rows)
    }

    async fn find_by_hostel_owner(&self, owner_id: UserId) -> Result<Vec<Booking>, RepositoryError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM bookings b
            INNER JOIN hostels h ON h.id = b.hostel_id
            WHERE h.owner_id = ?
            ORDER BY b.created_at DESC
            "#,
            BOOKING_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(owner_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!("オーナー別予約一覧の取得に失敗しました: {}", e))
            })
            .map_err(RepositoryError::from)?;

        bookings_from_rows(rows)
    }

    async fn find_active_overlapping(
        &self,
        room_id: RoomId,
        stay: &StayPeriod,
    ) -> Result<Vec<Booking>, RepositoryError> {
        // 閉区間の重複判定: 開始日が既存期間内、終了日が既存期間内、または既存期間を包含
        let sql = format!(
            r#"
            SELECT {}
            FROM bookings b
            WHERE b.room_id = ?
              AND b.status IN ('pending', 'confirmed')
              AND (
                    (? BETWEEN b.check_in_date AND b.check_out_date)
                 OR (? BETWEEN b.check_in_date AND b.check_out_date)
                 OR (? <= b.check_in_date AND ? >= b.check_out_date)
              )
            "#,
            BOOKING_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(room_id.to_string())
            .bind(stay.check_in())
            .bind(stay.check_out())
            .bind(stay.check_in())
            .bind(stay.check_out())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryError(format!("重複予約の検索に失敗しました: {}", e)))
            .map_err(RepositoryError::from)?;

        bookings_from_rows(rows)
    }

    fn next_identity(&self) -> BookingId {
        BookingId::new()
    }
}
