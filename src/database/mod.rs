pub mod manager;
pub mod models;
pub mod payload;
pub mod query_builder;
pub mod repository;

pub use manager::{DatabaseError, DatabaseManager, RequestDb};
pub use payload::Payload;
pub use repository::RepositoryError;
