//! Courses SDK
//!
//! This crate provides everything needed to consume the courses service:
//! - API trait (`CoursesClientV1`)
//! - Models (`Course`, `Enrollment`, `User`, `NewCourse`)
//! - Error types (`CoursesError`)
//! - gRPC client (`CoursesGrpcClient`)
//! - Proto stubs for server implementation
//!
//! ## Usage
//!
//! ```ignore
//! use courses_sdk::{CoursesClientV1, CoursesGrpcClient};
//!
//! let client = CoursesGrpcClient::connect("unix:///tmp/courses.sock").await?;
//! let courses = client.list_courses().await?;
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

// === API TRAIT AND TYPES ===
mod api;
mod models;
pub use api::{CoursesClientV1, CoursesError};
pub use models::{Course, Enrollment, NewCourse, User};

// === GRPC CLIENT ===
mod client;
pub mod convert;
pub mod transport;
pub use client::CoursesGrpcClient;

// === GRPC PROTO STUBS (for server implementation) ===
/// Generated protobuf types for `CoursesService`
#[allow(clippy::pedantic, clippy::default_trait_access, clippy::doc_markdown)]
pub mod proto {
    tonic::include_proto!("courses.v1");
}

// Re-export proto types needed by server
pub use proto::courses_service_server::{CoursesService, CoursesServiceServer};

/// Fully qualified gRPC service name (used for health reporting and logs)
pub const SERVICE_NAME: &str = "courses.v1.CoursesService";
