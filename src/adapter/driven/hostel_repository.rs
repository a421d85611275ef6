use crate::adapter::database_error::DatabaseError;
use crate::domain::model::{
    Contact, Hostel, HostelId, HostelProfile, HostelStatus, HostelType, Money, UserId,
};
use crate::domain::port::{HostelRepository, RepositoryError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::{MySqlArguments, MySqlRow};
use sqlx::query::Query;
use sqlx::{MySql, Pool, Row};

const SELECT_HOSTELS: &str = r#"
    SELECT
        id, owner_id, name, location, city, description, hostel_type,
        price_min_paisa, price_max_paisa, contact_phone, contact_email,
        status, approved_by, approved_at
    FROM hostels
"#;

/// MySQLホステルリポジトリ
#[derive(Clone)]
pub struct MySqlHostelRepository {
    pool: Pool<MySql>,
}

impl MySqlHostelRepository {
    /// 新しいMySQLホステルリポジトリを作成
    ///
    /// # Arguments
    /// * `pool` - MySQLコネクションプール
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    async fn fetch(
        &self,
        query: Query<'_, MySql, MySqlArguments>,
    ) -> Result<Vec<Hostel>, RepositoryError> {
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryError(format!("ホステル一覧の取得に失敗しました: {}", e)))
            .map_err(RepositoryError::from)?;
        rows.iter().map(hostel_from_row).collect()
    }
}

fn hostel_from_row(row: &MySqlRow) -> Result<Hostel, RepositoryError> {
    let decode = |e: sqlx::Error| RepositoryError::from(DatabaseError::from(e));

    let id = HostelId::from_string(&row.try_get::<String, _>("id").map_err(decode)?)
        .map_err(|e| RepositoryError::FetchFailed(format!("ホステルIDの解析に失敗しました: {}", e)))?;
    let owner_id = UserId::from_string(&row.try_get::<String, _>("owner_id").map_err(decode)?)
        .map_err(|e| RepositoryError::FetchFailed(format!("オーナーIDの解析に失敗しました: {}", e)))?;
    let hostel_type = HostelType::from_string(&row.try_get::<String, _>("hostel_type").map_err(decode)?)
        .map_err(|e| RepositoryError::FetchFailed(e.to_string()))?;
    let status = HostelStatus::from_string(&row.try_get::<String, _>("status").map_err(decode)?)
        .map_err(|e| RepositoryError::FetchFailed(e.to_string()))?;
    let approved_by = row
        .try_get::<Option<String>, _>("approved_by")
        .map_err(decode)?
        .map(|s| UserId::from_string(&s))
        .transpose()
        .map_err(|e| RepositoryError::FetchFailed(format!("承認者IDの解析に失敗しました: {}", e)))?;

    let profile = HostelProfile {
        name: row.try_get("name").map_err(decode)?,
        location: row.try_get("location").map_err(decode)?,
        city: row.try_get("city").map_err(decode)?,
        description: row.try_get("description").map_err(decode)?,
        hostel_type,
        price_min: Money::from_paisa(row.try_get("price_min_paisa").map_err(decode)?),
        price_max: Money::from_paisa(row.try_get("price_max_paisa").map_err(decode)?),
        contact: Contact {
            phone: row.try_get("contact_phone").map_err(decode)?,
            email: row.try_get("contact_email").map_err(decode)?,
        },
    };

    Ok(Hostel::reconstruct(
        id,
        owner_id,
        profile,
        status,
        approved_by,
        row.try_get::<Option<DateTime<Utc>>, _>("approved_at").map_err(decode)?,
    ))
}

#[async_trait]
impl HostelRepository for MySqlHostelRepository {
    async fn save(&self, hostel: &Hostel) -> Result<(), RepositoryError> {
        let profile = hostel.profile();
        sqlx::query(
            r#"
            INSERT INTO hostels (
                id, owner_id, name, location, city, description, hostel_type,
                price_min_paisa, price_max_paisa, contact_phone, contact_email,
                status, approved_by, approved_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                name = VALUES(name),
                location = VALUES(location),
                city = VALUES(city),
                description = VALUES(description),
                hostel_type = VALUES(hostel_type),
                price_min_paisa = VALUES(price_min_paisa),
                price_max_paisa = VALUES(price_max_paisa),
                contact_phone = VALUES(contact_phone),
                contact_email = VALUES(contact_email),
                status = VALUES(status),
                approved_by = VALUES(approved_by),
                approved_at = VALUES(approved_at)
            "#,
        )
        .bind(hostel.id().to_string())
        .bind(hostel.owner_id().to_string())
        .bind(profile.name.as_str())
        .bind(profile.location.as_str())
        .bind(profile.city.as_str())
        .bind(profile.description.as_str())
        .bind(profile.hostel_type.as_str())
        .bind(profile.price_min.paisa())
        .bind(profile.price_max.paisa())
        .bind(profile.contact.phone.as_deref())
        .bind(profile.contact.email.as_deref())
        .bind(hostel.status().as_str())
        .bind(hostel.approved_by().map(|id| id.to_string()))
        .bind(hostel.approved_at())
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("ホステルの保存に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        Ok(())
    }

    async fn find_by_id(&self, hostel_id: HostelId) -> Result<Option<Hostel>, RepositoryError> {
        let sql = format!("{} WHERE id = ?", SELECT_HOSTELS);
        let row = sqlx::query(&sql)
            .bind(hostel_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryError(format!("ホステルの取得に失敗しました: {}", e)))
            .map_err(RepositoryError::from)?;

        row.as_ref().map(hostel_from_row).transpose()
    }

    async fn find_approved(&self, city: Option<&str>) -> Result<Vec<Hostel>, RepositoryError> {
        match city {
            Some(city) => {
                let sql = format!(
                    "{} WHERE status = 'active' AND LOWER(city) = LOWER(?) ORDER BY created_at DESC",
                    SELECT_HOSTELS
                );
                self.fetch(sqlx::query(&sql).bind(city.trim())).await
            }
            None => {
                let sql = format!("{} WHERE status = 'active' ORDER BY created_at DESC", SELECT_HOSTELS);
                self.fetch(sqlx::query(&sql)).await
            }
        }
    }

    async fn find_pending(&self) -> Result<Vec<Hostel>, RepositoryError> {
        let sql = format!("{} WHERE status = 'pending' ORDER BY created_at ASC", SELECT_HOSTELS);
        self.fetch(sqlx::query(&sql)).await
    }

    async fn find_by_owner(&self, owner_id: UserId) -> Result<Vec<Hostel>, RepositoryError> {
        let sql = format!("{} WHERE owner_id = ? ORDER BY created_at DESC", SELECT_HOSTELS);
        self.fetch(sqlx::query(&sql).bind(owner_id.to_string())).await
    }
}
