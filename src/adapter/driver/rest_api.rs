use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{Json, Redirect},
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::adapter::driver::auth::{AuthUser, JwtCodec};
use crate::adapter::driver::request_dto::{
    AddRoomRequest, CheckAvailabilityRequest, CompletePaymentParams, CreateBookingRequest,
    HostelsQueryParams, RegisterHostelRequest,
};
use crate::adapter::driver::response_dto::{
    AvailabilityResponse, BookingResponse, CreateBookingResponse, HostelResponse, RoomResponse,
};
use crate::application::service::{
    BookingApplicationService, BookingQueryService, HostelApplicationService, PaymentCallback,
};
use crate::application::ApplicationError;
use crate::domain::error::DomainError;
use crate::domain::model::{BookingId, BookingStatus, HostelId, PaymentReference};

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ApiError {
    pub fn new(error: impl Into<String>, code: &str) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
            field: None,
        }
    }
}

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

// アプリケーションサービスを含む状態
#[derive(Clone)]
pub struct AppState {
    pub booking_service: Arc<BookingApplicationService>,
    pub booking_query_service: Arc<BookingQueryService>,
    pub hostel_service: Arc<HostelApplicationService>,
    pub jwt: JwtCodec,
    /// 決済完了後に利用者を戻すフロントエンドのURL
    pub frontend_url: String,
}

// REST APIルーターを作成
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/hostels", get(list_hostels))
        .route("/hostels/:id/rooms", get(list_rooms))
        .route("/bookings/check-availability", post(check_availability))
        .route("/bookings/complete-payment", get(complete_payment))
        .route("/bookings/my-bookings", get(my_bookings))
        .route("/bookings/:id", get(get_booking).delete(cancel_booking))
        .route("/bookings/:id/book", post(create_booking))
        .route("/bookings/:id/cancel-payment", post(cancel_payment))
        .route("/owner/hostels", post(register_hostel).get(owned_hostels))
        .route("/owner/hostels/:id/rooms", post(add_room))
        .route("/owner/bookings", get(owner_bookings))
        .route("/admin/hostels/pending", get(pending_hostels))
        .route("/admin/hostels/:id/approve", put(approve_hostel))
        .route("/admin/hostels/:id/reject", put(reject_hostel))
}

// ヘルスチェックエンドポイント
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "hostel-khojau",
        "version": "0.1.0"
    }))
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    body.map(|Json(value)| value).map_err(|rejection| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new(rejection.body_text(), "INVALID_REQUEST_BODY")),
        )
    })
}

// 公開中のホステル一覧
async fn list_hostels(
    State(state): State<AppState>,
    query: Result<Query<HostelsQueryParams>, QueryRejection>,
) -> ApiResult<Json<Vec<HostelResponse>>> {
    let Query(params) = query.map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new("無効なクエリパラメータです", "INVALID_PARAMETER")),
        )
    })?;
    let city = params.city.as_deref().filter(|c| !c.trim().is_empty());

    let hostels = state
        .hostel_service
        .list_approved(city)
        .await
        .map_err(map_application_error)?;
    Ok(Json(hostels.iter().map(HostelResponse::from_hostel).collect()))
}

// 公開中ホステルの部屋一覧
async fn list_rooms(
    State(state): State<AppState>,
    Path(hostel_id): Path<Uuid>,
) -> ApiResult<Json<Vec<RoomResponse>>> {
    let rooms = state
        .hostel_service
        .list_rooms(HostelId::from_uuid(hostel_id))
        .await
        .map_err(map_application_error)?;
    Ok(Json(rooms.iter().map(RoomResponse::from_room).collect()))
}

// 空室確認エンドポイント
async fn check_availability(
    State(state): State<AppState>,
    body: Result<Json<CheckAvailabilityRequest>, JsonRejection>,
) -> ApiResult<Json<AvailabilityResponse>> {
    let query = json_body(body)?
        .into_query()
        .map_err(map_domain_error)?;

    let report = state
        .booking_service
        .check_availability(query)
        .await
        .map_err(map_application_error)?;
    Ok(Json(AvailabilityResponse::from_report(&report)))
}

// 予約作成エンドポイント（パスはホステルID）
async fn create_booking(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(hostel_id): Path<Uuid>,
    body: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreateBookingResponse>)> {
    let command = json_body(body)?
        .into_command(hostel_id)
        .map_err(map_domain_error)?;

    let checkout = state
        .booking_service
        .create_booking(&ctx, command)
        .await
        .map_err(map_application_error)?;
    Ok((
        StatusCode::CREATED,
        Json(CreateBookingResponse::from_checkout(&checkout)),
    ))
}

// 決済ゲートウェイからのリダイレクトを受け、結果に応じてフロントエンドへ戻す
async fn complete_payment(
    State(state): State<AppState>,
    query: Result<Query<CompletePaymentParams>, QueryRejection>,
) -> Redirect {
    let frontend = state.frontend_url.trim_end_matches('/');
    let params = match query {
        Ok(Query(params)) => params,
        Err(_) => return Redirect::to(&format!("{}/payment/failure?error=INVALID_PARAMETER", frontend)),
    };

    let reference = match params.pidx.map(PaymentReference::new) {
        Some(Ok(reference)) => reference,
        _ => return Redirect::to(&format!("{}/payment/failure?error=MISSING_PIDX", frontend)),
    };
    tracing::info!(
        pidx = %reference,
        callback_status = params.status.as_deref().unwrap_or("-"),
        callback_amount = params.amount,
        "Payment callback received"
    );

    let callback = PaymentCallback {
        reference,
        transaction_id: params.transaction_id.filter(|id| !id.is_empty()),
        purchase_order_id: params.purchase_order_id.filter(|id| !id.is_empty()),
    };

    match state.booking_service.verify_payment(callback).await {
        Ok(booking) if booking.status() == BookingStatus::Confirmed => Redirect::to(&format!(
            "{}/payment/success?booking_id={}",
            frontend,
            booking.id()
        )),
        Ok(booking) => {
            let reason = booking
                .cancellation_reason()
                .map(|r| r.as_str())
                .unwrap_or("payment_failed");
            Redirect::to(&format!(
                "{}/payment/failure?booking_id={}&reason={}",
                frontend,
                booking.id(),
                reason
            ))
        }
        Err(ApplicationError::GatewayUnavailable(_)) => {
            Redirect::to(&format!("{}/payment/pending", frontend))
        }
        Err(err) => {
            let (_, Json(api_error)) = map_application_error(err);
            Redirect::to(&format!(
                "{}/payment/failure?error={}",
                frontend, api_error.code
            ))
        }
    }
}

// 自分の予約一覧
async fn my_bookings(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
) -> ApiResult<Json<Vec<BookingResponse>>> {
    let bookings = state
        .booking_query_service
        .my_bookings(&ctx)
        .await
        .map_err(map_application_error)?;
    Ok(Json(bookings.iter().map(BookingResponse::from_booking).collect()))
}

// 予約詳細（作成者またはホステルのオーナー）
async fn get_booking(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(booking_id): Path<Uuid>,
) -> ApiResult<Json<BookingResponse>> {
    let booking = state
        .booking_query_service
        .get_booking(&ctx, BookingId::from_uuid(booking_id))
        .await
        .map_err(map_application_error)?;
    Ok(Json(BookingResponse::from_booking(&booking)))
}

// 決済画面から離脱した予約の取り消し
async fn cancel_payment(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(booking_id): Path<Uuid>,
) -> ApiResult<Json<BookingResponse>> {
    let booking = state
        .booking_service
        .abandon_payment(&ctx, BookingId::from_uuid(booking_id))
        .await
        .map_err(map_application_error)?;
    Ok(Json(BookingResponse::from_booking(&booking)))
}

// 予約の取り消し
async fn cancel_booking(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(booking_id): Path<Uuid>,
) -> ApiResult<Json<BookingResponse>> {
    let booking = state
        .booking_service
        .cancel_booking(&ctx, BookingId::from_uuid(booking_id))
        .await
        .map_err(map_application_error)?;
    Ok(Json(BookingResponse::from_booking(&booking)))
}

// ホステル登録（オーナー）
async fn register_hostel(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    body: Result<Json<RegisterHostelRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<HostelResponse>)> {
    let profile = json_body(body)?
        .into_profile()
        .map_err(map_domain_error)?;

    let hostel = state
        .hostel_service
        .register_hostel(&ctx, profile)
        .await
        .map_err(map_application_error)?;
    Ok((StatusCode::CREATED, Json(HostelResponse::from_hostel(&hostel))))
}

// 自分のホステル一覧（オーナー）
async fn owned_hostels(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
) -> ApiResult<Json<Vec<HostelResponse>>> {
    let hostels = state
        .hostel_service
        .list_owned(&ctx)
        .await
        .map_err(map_application_error)?;
    Ok(Json(hostels.iter().map(HostelResponse::from_hostel).collect()))
}

// 部屋の追加（ホステルのオーナー）
async fn add_room(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(hostel_id): Path<Uuid>,
    body: Result<Json<AddRoomRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RoomResponse>)> {
    let request = json_body(body)?;
    let room_type = request.room_type().map_err(map_domain_error)?;
    let monthly_rate = request.monthly_rate().map_err(map_domain_error)?;

    let room = state
        .hostel_service
        .add_room(
            &ctx,
            HostelId::from_uuid(hostel_id),
            request.room_number,
            room_type,
            monthly_rate,
        )
        .await
        .map_err(map_application_error)?;
    Ok((StatusCode::CREATED, Json(RoomResponse::from_room(&room))))
}

// 自分のホステルへの予約一覧（オーナー）
async fn owner_bookings(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
) -> ApiResult<Json<Vec<BookingResponse>>> {
    let bookings = state
        .booking_query_service
        .owner_bookings(&ctx)
        .await
        .map_err(map_application_error)?;
    Ok(Json(bookings.iter().map(BookingResponse::from_booking).collect()))
}

// 審査待ちホステル一覧（管理者）
async fn pending_hostels(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
) -> ApiResult<Json<Vec<HostelResponse>>> {
    let hostels = state
        .hostel_service
        .list_pending(&ctx)
        .await
        .map_err(map_application_error)?;
    Ok(Json(hostels.iter().map(HostelResponse::from_hostel).collect()))
}

// ホステルの承認（管理者）
async fn approve_hostel(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(hostel_id): Path<Uuid>,
) -> ApiResult<Json<HostelResponse>> {
    let hostel = state
        .hostel_service
        .approve(&ctx, HostelId::from_uuid(hostel_id))
        .await
        .map_err(map_application_error)?;
    Ok(Json(HostelResponse::from_hostel(&hostel)))
}

// ホステルの却下（管理者）
async fn reject_hostel(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(hostel_id): Path<Uuid>,
) -> ApiResult<Json<HostelResponse>> {
    let hostel = state
        .hostel_service
        .reject(&ctx, HostelId::from_uuid(hostel_id))
        .await
        .map_err(map_application_error)?;
    Ok(Json(HostelResponse::from_hostel(&hostel)))
}

// アプリケーションエラーをHTTPエラーにマッピング
fn map_application_error(err: ApplicationError) -> (StatusCode, Json<ApiError>) {
    match err {
        ApplicationError::DomainError(domain_err) => map_domain_error(domain_err),
        ApplicationError::RepositoryError(repo_err) => {
            tracing::error!(error = %repo_err, "Storage failure while handling request");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::new(repo_err.to_string(), "REPOSITORY_ERROR")),
            )
        }
        ApplicationError::NotFound(msg) => (
            StatusCode::NOT_FOUND,
            Json(ApiError::new(msg, "NOT_FOUND")),
        ),
        ApplicationError::Forbidden(msg) => (
            StatusCode::FORBIDDEN,
            Json(ApiError::new(msg, "FORBIDDEN")),
        ),
        ApplicationError::GatewayUnavailable(msg) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiError::new(
                format!("決済ゲートウェイに接続できません: {}", msg),
                "PAYMENT_GATEWAY_UNAVAILABLE",
            )),
        ),
        ApplicationError::PaymentRejected(msg) => (
            StatusCode::BAD_GATEWAY,
            Json(ApiError::new(
                format!("決済ゲートウェイがリクエストを拒否しました: {}", msg),
                "PAYMENT_REJECTED",
            )),
        ),
    }
}

// ドメインエラーを適切なHTTPステータスコードとエラーコードにマッピング
fn map_domain_error(domain_err: DomainError) -> (StatusCode, Json<ApiError>) {
    let message = domain_err.to_string();
    match domain_err {
        DomainError::Validation { field, message } => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: message,
                code: "VALIDATION_ERROR".to_string(),
                field: Some(field.to_string()),
            }),
        ),
        DomainError::InvalidValue(msg) => (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new(msg, "INVALID_VALUE")),
        ),
        DomainError::BelowMinimumCharge { .. } => (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new(message, "BELOW_MINIMUM_CHARGE")),
        ),
        DomainError::InvalidBookingState(msg) => (
            StatusCode::CONFLICT,
            Json(ApiError::new(msg, "INVALID_BOOKING_STATE")),
        ),
        DomainError::RoomUnavailable(_) => (
            StatusCode::CONFLICT,
            Json(ApiError::new(message, "ROOM_UNAVAILABLE")),
        ),
        DomainError::OverlappingBooking(_) => (
            StatusCode::CONFLICT,
            Json(ApiError::new(message, "ROOM_ALREADY_BOOKED")),
        ),
        DomainError::RoomNotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(ApiError::new(message, "ROOM_NOT_FOUND")),
        ),
        DomainError::HostelNotAvailable(_) => (
            StatusCode::NOT_FOUND,
            Json(ApiError::new(message, "HOSTEL_NOT_FOUND")),
        ),
        DomainError::RepositoryError(msg) => {
            tracing::error!(error = %msg, "Storage failure while handling request");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::new(msg, "REPOSITORY_ERROR")),
            )
        }
    }
}
