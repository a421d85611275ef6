// 駆動されるアダプター（出力ポートの実装）

mod booking_repository;
mod event_publisher;
mod hostel_repository;
mod khalti_gateway;
mod room_repository;

pub use booking_repository::MySqlBookingRepository;
pub use event_publisher::TracingEventPublisher;
pub use hostel_repository::MySqlHostelRepository;
pub use khalti_gateway::KhaltiPaymentGateway;
pub use room_repository::MySqlRoomRepository;
