//! Mock data set loaded into a fresh store.
//!
//! Instructors `1` and `2` and students `3`..`5` are user ids of the sibling
//! users service.

use chrono::{DateTime, TimeZone, Utc};
use tracing::info;

use courses_sdk::{Course, Enrollment};

use super::store::CourseStore;

struct SeedCourse {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    instructor_id: &'static str,
    duration_hours: i32,
    published: bool,
}

struct SeedEnrollment {
    id: &'static str,
    user_id: &'static str,
    course_id: &'static str,
    progress: i32,
    /// (year, month, day, hour, minute)
    enrolled_at: (i32, u32, u32, u32, u32),
}

const COURSES: [SeedCourse; 4] = [
    SeedCourse {
        id: "course-1",
        title: "Introduction to GraphQL Federation",
        description: "Learn the fundamentals of GraphQL Federation and how to build distributed GraphQL architectures",
        instructor_id: "1",
        duration_hours: 20,
        published: true,
    },
    SeedCourse {
        id: "course-2",
        title: "Advanced TypeScript Patterns",
        description: "Master advanced TypeScript patterns including generics, decorators, and type manipulation",
        instructor_id: "1",
        duration_hours: 15,
        published: true,
    },
    SeedCourse {
        id: "course-3",
        title: "Building Scalable APIs with gRPC",
        description: "Learn how to design and implement high-performance APIs using gRPC and Protocol Buffers",
        instructor_id: "2",
        duration_hours: 25,
        published: true,
    },
    SeedCourse {
        id: "course-4",
        title: "React Performance Optimization",
        description: "Deep dive into React performance optimization techniques and best practices",
        instructor_id: "2",
        duration_hours: 12,
        published: false,
    },
];

const ENROLLMENTS: [SeedEnrollment; 5] = [
    SeedEnrollment {
        id: "enrollment-1",
        user_id: "3",
        course_id: "course-1",
        progress: 50,
        enrolled_at: (2024, 1, 15, 10, 30),
    },
    SeedEnrollment {
        id: "enrollment-2",
        user_id: "3",
        course_id: "course-3",
        progress: 25,
        enrolled_at: (2024, 2, 1, 14, 20),
    },
    SeedEnrollment {
        id: "enrollment-3",
        user_id: "4",
        course_id: "course-1",
        progress: 75,
        enrolled_at: (2024, 1, 20, 9, 15),
    },
    SeedEnrollment {
        id: "enrollment-4",
        user_id: "4",
        course_id: "course-2",
        progress: 100,
        enrolled_at: (2024, 1, 10, 11, 0),
    },
    SeedEnrollment {
        id: "enrollment-5",
        user_id: "5",
        course_id: "course-3",
        progress: 10,
        enrolled_at: (2024, 3, 5, 16, 45),
    },
];

fn timestamp((year, month, day, hour, minute): (i32, u32, u32, u32, u32)) -> DateTime<Utc> {
    // UTC has no gaps or folds, so `single()` always succeeds for valid dates.
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

impl From<&SeedCourse> for Course {
    fn from(seed: &SeedCourse) -> Self {
        Self {
            id: seed.id.to_owned(),
            title: seed.title.to_owned(),
            description: seed.description.to_owned(),
            instructor_id: seed.instructor_id.to_owned(),
            duration_hours: seed.duration_hours,
            published: seed.published,
        }
    }
}

impl From<&SeedEnrollment> for Enrollment {
    fn from(seed: &SeedEnrollment) -> Self {
        Self {
            id: seed.id.to_owned(),
            user_id: seed.user_id.to_owned(),
            course_id: seed.course_id.to_owned(),
            progress: seed.progress,
            enrolled_at: timestamp(seed.enrolled_at),
        }
    }
}

/// A store holding the mock data set; new ids continue at `course-5` and
/// `enrollment-6`.
#[must_use]
pub fn seeded_store() -> CourseStore {
    info!("Seeding mock course data");

    let store = CourseStore::with_data(
        COURSES.iter().map(Course::from).collect(),
        ENROLLMENTS.iter().map(Enrollment::from).collect(),
        COURSES.len() as u64,
        ENROLLMENTS.len() as u64,
    );

    info!(
        courses = store.course_count(),
        enrollments = store.enrollment_count(),
        "Mock data seeded"
    );
    store
}
