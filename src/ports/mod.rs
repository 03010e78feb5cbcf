//! Ports: async trait seams between the application core and the outside
//! world (persistence, live delivery, push, user directory).

mod booking_repository;
mod message_store;
mod notification_gateway;
mod room_router;
mod user_directory;

pub use booking_repository::BookingRepository;
pub use message_store::MessageStore;
pub use notification_gateway::{DeliveryResult, NotificationEvent, NotificationGateway};
pub use room_router::{LiveEvent, RoomRouter};
pub use user_directory::{UserDirectory, UserRecord, UserRole};
