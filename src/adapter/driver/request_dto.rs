use crate::application::service::{AvailabilityQuery, CreateBookingCommand, StayRequest};
use crate::domain::error::DomainError;
use crate::domain::model::{
    Contact, HostelId, HostelProfile, HostelType, Money, RoomId, RoomType,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `YYYY-MM-DD` またはRFC3339の日時をUTCの暦日として解釈する
pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, DomainError> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .map_err(|_| DomainError::validation(field, format!("日付として解釈できません: {}", value)))
}

fn rupees_to_money(field: &'static str, rupees: i64) -> Result<Money, DomainError> {
    rupees
        .checked_mul(100)
        .map(Money::from_paisa)
        .ok_or_else(|| DomainError::validation(field, "金額が大きすぎます"))
}

/// 予約作成用のリクエストDTO
#[derive(Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub room_id: Uuid,
    pub check_in_date: String,
    pub months: u32,
}

impl CreateBookingRequest {
    /// パスのホステルIDと合わせて予約作成コマンドに変換
    pub fn into_command(self, hostel_id: Uuid) -> Result<CreateBookingCommand, DomainError> {
        Ok(CreateBookingCommand {
            hostel_id: HostelId::from_uuid(hostel_id),
            room_id: RoomId::from_uuid(self.room_id),
            check_in: parse_date("check_in_date", &self.check_in_date)?,
            months: self.months,
        })
    }
}

/// 空室確認用のリクエストDTO
/// `months` と `check_out_date` の両方がある場合は `months` を使う
#[derive(Serialize, Deserialize)]
pub struct CheckAvailabilityRequest {
    pub room_id: Uuid,
    pub check_in_date: String,
    pub months: Option<u32>,
    pub check_out_date: Option<String>,
}

impl CheckAvailabilityRequest {
    pub fn into_query(self) -> Result<AvailabilityQuery, DomainError> {
        let check_in = parse_date("check_in_date", &self.check_in_date)?;
        let stay = match (self.months, self.check_out_date) {
            (Some(months), _) => StayRequest::Months(months),
            (None, Some(check_out)) => {
                StayRequest::Until(parse_date("check_out_date", &check_out)?)
            }
            (None, None) => {
                return Err(DomainError::validation(
                    "months",
                    "monthsまたはcheck_out_dateを指定してください",
                ))
            }
        };
        Ok(AvailabilityQuery {
            room_id: RoomId::from_uuid(self.room_id),
            check_in,
            stay,
        })
    }
}

/// 決済ゲートウェイからのリダイレクトで付与されるクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct CompletePaymentParams {
    pub pidx: Option<String>,
    pub transaction_id: Option<String>,
    pub purchase_order_id: Option<String>,
    pub amount: Option<i64>,
    pub status: Option<String>,
}

/// ホステル一覧取得用のクエリパラメータ
#[derive(Deserialize)]
pub struct HostelsQueryParams {
    pub city: Option<String>,
}

/// ホステル登録用のリクエストDTO（価格はルピー単位）
#[derive(Serialize, Deserialize)]
pub struct RegisterHostelRequest {
    pub name: String,
    pub location: String,
    pub city: String,
    pub description: String,
    pub hostel_type: String,
    pub price_min: i64,
    pub price_max: i64,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
}

impl RegisterHostelRequest {
    pub fn into_profile(self) -> Result<HostelProfile, DomainError> {
        Ok(HostelProfile {
            name: self.name,
            location: self.location,
            city: self.city,
            description: self.description,
            hostel_type: HostelType::from_string(&self.hostel_type)?,
            price_min: rupees_to_money("price_min", self.price_min)?,
            price_max: rupees_to_money("price_max", self.price_max)?,
            contact: Contact {
                phone: self.contact_phone.filter(|s| !s.trim().is_empty()),
                email: self.contact_email.filter(|s| !s.trim().is_empty()),
            },
        })
    }
}

/// 部屋追加用のリクエストDTO
#[derive(Serialize, Deserialize)]
pub struct AddRoomRequest {
    pub room_number: String,
    pub room_type: String,
    pub monthly_price: i64, // NPR
}

impl AddRoomRequest {
    pub fn room_type(&self) -> Result<RoomType, DomainError> {
        RoomType::from_string(&self.room_type)
    }

    pub fn monthly_rate(&self) -> Result<Money, DomainError> {
        Money::positive_npr(self.monthly_price, "monthly_price")
    }
}
