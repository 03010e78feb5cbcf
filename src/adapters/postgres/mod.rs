//! PostgreSQL adapters for the persistence ports.

mod booking_repository;
mod message_store;
mod user_directory;

pub use booking_repository::PostgresBookingRepository;
pub use message_store::PostgresMessageStore;
pub use user_directory::PostgresUserDirectory;
