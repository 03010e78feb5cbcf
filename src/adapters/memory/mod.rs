//! In-memory adapters: deterministic backing for tests and for running
//! without a database.

mod booking_repository;
mod message_store;
mod user_directory;

pub use booking_repository::InMemoryBookingRepository;
pub use message_store::InMemoryMessageStore;
pub use user_directory::InMemoryUserDirectory;
