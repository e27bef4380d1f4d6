//! Courses API trait and types
//!
//! Contract trait and error type for the courses service.

use async_trait::async_trait;

use crate::models::{Course, Enrollment, NewCourse, User};

/// Courses API trait
///
/// Implemented in-process by the service itself and remotely by
/// [`crate::CoursesGrpcClient`].
#[async_trait]
pub trait CoursesClientV1: Send + Sync {
    /// All courses in insertion order.
    async fn list_courses(&self) -> Result<Vec<Course>, CoursesError>;

    /// A single course, `None` when the id is unknown.
    async fn get_course(&self, id: &str) -> Result<Option<Course>, CoursesError>;

    /// Create a course and index it under its instructor.
    async fn create_course(&self, input: NewCourse) -> Result<Course, CoursesError>;

    /// Enroll a user in an existing course.
    ///
    /// Fails with [`CoursesError::CourseNotFound`] when the course does not exist.
    async fn enroll_user(&self, user_id: &str, course_id: &str)
    -> Result<Enrollment, CoursesError>;

    /// Resolve users with their taught courses and enrollments, one entry per id.
    async fn lookup_users_by_id(&self, ids: &[String]) -> Result<Vec<User>, CoursesError>;
}

/// Error type for Courses operations
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CoursesError {
    #[error("Course {0} not found")]
    CourseNotFound(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("gRPC transport error: {0}")]
    Transport(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl CoursesError {
    /// Map a gRPC status returned by the courses service.
    #[must_use]
    pub fn from_status(status: &tonic::Status) -> Self {
        match status.code() {
            tonic::Code::NotFound => Self::CourseNotFound(
                status
                    .message()
                    .strip_prefix("Course ")
                    .and_then(|rest| rest.strip_suffix(" not found"))
                    .unwrap_or(status.message())
                    .to_owned(),
            ),
            tonic::Code::InvalidArgument => Self::InvalidArgument(status.message().to_owned()),
            _ => Self::Transport(status.message().to_owned()),
        }
    }
}
