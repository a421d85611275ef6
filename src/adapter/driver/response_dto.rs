use crate::application::service::{AvailabilityReport, BookingCheckout};
use crate::domain::model::{Booking, Hostel, Room};
use serde::Serialize;

/// 予約用のレスポンスDTO
#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub booking_id: String,
    pub tenant_id: String,
    pub hostel_id: String,
    pub room_id: String,
    pub check_in_date: String,
    pub check_out_date: String,
    pub months: u32,
    pub total_price_paisa: i64,
    pub currency: String,
    pub status: String,
    pub payment_status: String,
    pub payment_reference: Option<String>,
    pub transaction_id: Option<String>,
    pub cancellation_reason: Option<String>,
    pub created_at: String,
}

/// 予約作成用のレスポンスDTO
#[derive(Debug, Serialize)]
pub struct CreateBookingResponse {
    pub booking: BookingResponse,
    pub payment_redirect_url: String,
}

/// 空室確認用のレスポンスDTO
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub is_available: bool,
    pub total_price_paisa: Option<i64>,
}

/// ホステル用のレスポンスDTO
#[derive(Debug, Serialize)]
pub struct HostelResponse {
    pub hostel_id: String,
    pub owner_id: String,
    pub name: String,
    pub location: String,
    pub city: String,
    pub description: String,
    pub hostel_type: String,
    pub price_min_paisa: i64,
    pub price_max_paisa: i64,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub status: String,
    pub approved_by: Option<String>,
    pub approved_at: Option<String>,
}

/// 部屋用のレスポンスDTO
#[derive(Debug, Serialize)]
pub struct RoomResponse {
    pub room_id: String,
    pub hostel_id: String,
    pub room_number: String,
    pub room_type: String,
    pub monthly_price_paisa: i64,
    pub is_available: bool,
}

impl BookingResponse {
    /// ドメインオブジェクトからBookingResponseを作成
    pub fn from_booking(booking: &Booking) -> Self {
        Self {
            booking_id: booking.id().to_string(),
            tenant_id: booking.tenant_id().to_string(),
            hostel_id: booking.hostel_id().to_string(),
            room_id: booking.room_id().to_string(),
            check_in_date: booking.stay().check_in().format("%Y-%m-%d").to_string(),
            check_out_date: booking.stay().check_out().format("%Y-%m-%d").to_string(),
            months: booking.months(),
            total_price_paisa: booking.total_price().paisa(),
            currency: booking.total_price().currency().to_string(),
            status: booking.status().to_string(),
            payment_status: booking.payment_status().to_string(),
            payment_reference: booking.payment_reference().map(|r| r.to_string()),
            transaction_id: booking.transaction_id().map(str::to_string),
            cancellation_reason: booking.cancellation_reason().map(|r| r.to_string()),
            created_at: booking.created_at().to_rfc3339(),
        }
    }
}

impl CreateBookingResponse {
    pub fn from_checkout(checkout: &BookingCheckout) -> Self {
        Self {
            booking: BookingResponse::from_booking(&checkout.booking),
            payment_redirect_url: checkout.payment_redirect_url.clone(),
        }
    }
}

impl AvailabilityResponse {
    pub fn from_report(report: &AvailabilityReport) -> Self {
        Self {
            is_available: report.is_available,
            total_price_paisa: report.total_price.map(|price| price.paisa()),
        }
    }
}

impl HostelResponse {
    /// ドメインオブジェクトからHostelResponseを作成
    pub fn from_hostel(hostel: &Hostel) -> Self {
        let profile = hostel.profile();
        Self {
            hostel_id: hostel.id().to_string(),
            owner_id: hostel.owner_id().to_string(),
            name: profile.name.clone(),
            location: profile.location.clone(),
            city: profile.city.clone(),
            description: profile.description.clone(),
            hostel_type: profile.hostel_type.to_string(),
            price_min_paisa: profile.price_min.paisa(),
            price_max_paisa: profile.price_max.paisa(),
            contact_phone: profile.contact.phone.clone(),
            contact_email: profile.contact.email.clone(),
            status: hostel.status().to_string(),
            approved_by: hostel.approved_by().map(|id| id.to_string()),
            approved_at: hostel.approved_at().map(|at| at.to_rfc3339()),
        }
    }
}

impl RoomResponse {
    /// ドメインオブジェクトからRoomResponseを作成
    pub fn from_room(room: &Room) -> Self {
        Self {
            room_id: room.id().to_string(),
            hostel_id: room.hostel_id().to_string(),
            room_number: room.room_number().to_string(),
            room_type: room.room_type().to_string(),
            monthly_price_paisa: room.monthly_rate().paisa(),
            is_available: room.is_available(),
        }
    }
}
