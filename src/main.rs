use hostel_khojau::adapter::driven::{
    KhaltiPaymentGateway, MySqlBookingRepository, MySqlHostelRepository, MySqlRoomRepository,
    TracingEventPublisher,
};
use hostel_khojau::adapter::driver::auth::JwtCodec;
use hostel_khojau::adapter::driver::rest_api::{create_router, AppState};
use hostel_khojau::adapter::{AppConfig, DatabaseMigration};
use hostel_khojau::application::service::{
    BookingApplicationService, BookingQueryService, CheckoutSettings, HostelApplicationService,
};
use hostel_khojau::domain::model::Money;
use hostel_khojau::domain::pricing::PricingPolicy;

use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .envファイルから環境変数を読み込む
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("hostel_khojau=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(database = %config.database.target(), "Configuration loaded");

    // 接続プールを作成してマイグレーションを実行
    let pool = config.database.connect().await?;
    DatabaseMigration::new(pool.clone()).run().await?;

    // MySQLリポジトリを作成
    let booking_repository = Arc::new(MySqlBookingRepository::new(pool.clone()));
    let room_repository = Arc::new(MySqlRoomRepository::new(pool.clone()));
    let hostel_repository = Arc::new(MySqlHostelRepository::new(pool.clone()));

    let payment_gateway = Arc::new(KhaltiPaymentGateway::new(&config.payment)?);
    let event_publisher = Arc::new(TracingEventPublisher::new());

    let booking_service = BookingApplicationService::new(
        booking_repository.clone(),
        room_repository.clone(),
        hostel_repository.clone(),
        payment_gateway,
        event_publisher,
        PricingPolicy::new(Money::from_paisa(config.payment.minimum_amount_paisa)),
        CheckoutSettings {
            return_url: config.payment.return_url.clone(),
            gateway_timeout: config.payment.timeout,
        },
    );
    let booking_query_service =
        BookingQueryService::new(booking_repository, hostel_repository.clone());
    let hostel_service = HostelApplicationService::new(hostel_repository, room_repository);

    // アプリケーション状態を作成
    let app_state = AppState {
        booking_service: Arc::new(booking_service),
        booking_query_service: Arc::new(booking_query_service),
        hostel_service: Arc::new(hostel_service),
        jwt: JwtCodec::new(&config.server.jwt_secret),
        frontend_url: config.server.frontend_url.clone(),
    };

    // REST APIルーターを作成
    let app = create_router()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(app_state);

    // サーバーを起動
    let listener = tokio::net::TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %config.server.bind_address, "REST API server started");

    axum::serve(listener, app).await?;

    Ok(())
}
