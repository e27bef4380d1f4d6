//! Conversions between the models and the protobuf messages.
//!
//! On the wire a course carries its instructor as a nested `User { id }` and
//! an enrollment carries its user and a snapshot of its course. Timestamps are
//! ISO-8601 UTC strings with millisecond precision.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::api::CoursesError;
use crate::models::{Course, Enrollment, NewCourse, User};
use crate::proto;

/// Format a timestamp the way it travels on the wire (`2024-01-15T10:30:00.000Z`).
#[must_use]
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a wire timestamp.
///
/// # Errors
/// Returns [`CoursesError::Internal`] if the value is not RFC 3339.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, CoursesError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| CoursesError::Internal(format!("invalid timestamp '{raw}': {e}")))
}

fn user_ref(id: String) -> proto::User {
    proto::User {
        id,
        ..Default::default()
    }
}

/// Build a course message with the given (already converted) roster.
#[must_use]
pub fn course_to_proto(course: Course, enrollments: Vec<proto::Enrollment>) -> proto::Course {
    proto::Course {
        id: course.id,
        title: course.title,
        description: course.description,
        instructor: Some(user_ref(course.instructor_id)),
        duration_hours: course.duration_hours,
        published: course.published,
        enrollments,
    }
}

/// Build an enrollment message, optionally embedding its course.
#[must_use]
pub fn enrollment_to_proto(
    enrollment: Enrollment,
    course: Option<proto::Course>,
) -> proto::Enrollment {
    // Without a course snapshot the course id still has to reach the client.
    let course = course.unwrap_or_else(|| proto::Course {
        id: enrollment.course_id,
        ..Default::default()
    });
    proto::Enrollment {
        id: enrollment.id,
        user: Some(user_ref(enrollment.user_id)),
        course: Some(course),
        progress: enrollment.progress,
        enrolled_at: format_timestamp(&enrollment.enrolled_at),
    }
}

impl From<proto::Course> for Course {
    fn from(msg: proto::Course) -> Self {
        Self {
            id: msg.id,
            title: msg.title,
            description: msg.description,
            instructor_id: msg.instructor.map(|u| u.id).unwrap_or_default(),
            duration_hours: msg.duration_hours,
            published: msg.published,
        }
    }
}

impl TryFrom<proto::Enrollment> for Enrollment {
    type Error = CoursesError;

    fn try_from(msg: proto::Enrollment) -> Result<Self, Self::Error> {
        Ok(Self {
            enrolled_at: parse_timestamp(&msg.enrolled_at)?,
            id: msg.id,
            user_id: msg.user.map(|u| u.id).unwrap_or_default(),
            course_id: msg.course.map(|c| c.id).unwrap_or_default(),
            progress: msg.progress,
        })
    }
}

impl TryFrom<proto::User> for User {
    type Error = CoursesError;

    fn try_from(msg: proto::User) -> Result<Self, Self::Error> {
        Ok(Self {
            id: msg.id,
            instructor_courses: msg.instructor_courses.into_iter().map(Course::from).collect(),
            enrollments: msg
                .enrollments
                .into_iter()
                .map(Enrollment::try_from)
                .collect::<Result<_, _>>()?,
        })
    }
}

impl From<NewCourse> for proto::CourseInput {
    fn from(input: NewCourse) -> Self {
        Self {
            title: input.title,
            description: input.description,
            instructor_id: input.instructor_id,
            duration_hours: input.duration_hours,
            published: input.published,
        }
    }
}

impl From<proto::CourseInput> for NewCourse {
    fn from(input: proto::CourseInput) -> Self {
        Self {
            title: input.title,
            description: input.description,
            instructor_id: input.instructor_id,
            duration_hours: input.duration_hours,
            published: input.published,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_course() -> Course {
        Course {
            id: "course-1".to_owned(),
            title: "Introduction to GraphQL Federation".to_owned(),
            description: "Fundamentals".to_owned(),
            instructor_id: "1".to_owned(),
            duration_hours: 20,
            published: true,
        }
    }

    #[test]
    fn timestamp_uses_millisecond_zulu_format() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(format_timestamp(&ts), "2024-01-15T10:30:00.000Z");
        assert_eq!(parse_timestamp("2024-01-15T10:30:00Z").unwrap(), ts);
    }

    #[test]
    fn invalid_timestamp_is_internal_error() {
        let err = parse_timestamp("yesterday").unwrap_err();
        assert!(matches!(err, CoursesError::Internal(_)));
    }

    #[test]
    fn course_message_nests_instructor() {
        let msg = course_to_proto(sample_course(), Vec::new());
        assert_eq!(msg.instructor.as_ref().map(|u| u.id.as_str()), Some("1"));
        assert!(msg.enrollments.is_empty());
        assert_eq!(Course::from(msg), sample_course());
    }

    #[test]
    fn enrollment_without_course_snapshot_keeps_course_id() {
        let enrollment = Enrollment {
            id: "enrollment-1".to_owned(),
            user_id: "3".to_owned(),
            course_id: "course-1".to_owned(),
            progress: 50,
            enrolled_at: Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap(),
        };

        let msg = enrollment_to_proto(enrollment.clone(), None);
        assert_eq!(msg.course.as_ref().map(|c| c.id.as_str()), Some("course-1"));
        assert_eq!(msg.user.as_ref().map(|u| u.id.as_str()), Some("3"));
        assert_eq!(Enrollment::try_from(msg).unwrap(), enrollment);
    }
}
