//! Domain layer for the courses module
//!
//! Contains the in-memory store, its seed data and the in-process client.

pub mod error;
pub mod local_client;
pub mod seed;
pub mod store;

pub use error::DomainError;
pub use local_client::LocalCoursesClient;
pub use seed::seeded_store;
pub use store::{CourseStore, StoreSnapshot};
