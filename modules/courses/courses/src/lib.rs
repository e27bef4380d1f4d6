//! Courses Module
//!
//! Serves mock courses, enrollments and the course-related view of users
//! over gRPC, for use as a router plugin.
//!
//! ## Architecture
//!
//! - `domain/store.rs` - In-memory store and its join logic
//! - `domain/seed.rs` - Mock data set
//! - `api/grpc/server.rs` - gRPC service implementation
//! - `server.rs` - Listener, health service and shutdown
//! - `config.rs` / `logging.rs` - Ambient process setup
//!
//! External consumers should use the `courses-sdk` crate, which provides the
//! API trait, models and gRPC client.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod config;
pub mod logging;
pub mod server;
pub mod signals;

#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;

pub use config::CoursesConfig;
pub use domain::{CourseStore, LocalCoursesClient, seeded_store};
pub use server::{BoundEndpoint, GrpcServer, Handshake, ListenConfig};
