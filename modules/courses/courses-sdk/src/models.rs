//! Transport-agnostic models shared by the service and its clients.

use chrono::{DateTime, Utc};

/// A learnable unit taught by one instructor.
///
/// The enrollment list of a course is not part of the model; it is derived
/// from the roster index on read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Id of the teaching user. Users are owned by another service.
    pub instructor_id: String,
    pub duration_hours: i32,
    pub published: bool,
}

/// A user's participation in a course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrollment {
    pub id: String,
    pub user_id: String,
    pub course_id: String,
    /// Completion percentage, 0-100.
    pub progress: i32,
    pub enrolled_at: DateTime<Utc>,
}

/// Course-related view of a user, resolved per lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    pub id: String,
    /// Courses where this user is the instructor.
    pub instructor_courses: Vec<Course>,
    /// Enrollments where this user is the student.
    pub enrollments: Vec<Enrollment>,
}

/// Input for course creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub instructor_id: String,
    pub duration_hours: i32,
    pub published: bool,
}
