// ドメインモデル（エンティティと値オブジェクト）

mod value_objects;
mod booking;
mod room;
mod hostel;

pub use value_objects::{
    BookingId, HostelId, RoomId, UserId,
    Money,
    PaymentReference,
    StayPeriod,
    BookingStatus, PaymentStatus, CancellationReason,
    RoomType, HostelType, HostelStatus,
    UserRole,
};

pub use booking::{Booking, BookingRecord};
pub use room::Room;
pub use hostel::{Contact, Hostel, HostelProfile};
