//! In-memory relational store for courses and enrollments.
//!
//! Courses and enrollments are kept in flat maps keyed by id. Three index maps
//! relate them to users and to each other:
//! - instructor index: user id -> ids of the courses they teach
//! - student index: user id -> ids of their enrollments
//! - roster index: course id -> ids of its enrollments
//!
//! A user's lists and a course's roster are joined on read and never stored
//! on the entities themselves. Entities are never deleted.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::{RwLock, RwLockReadGuard};
use tracing::{debug, warn};

use courses_sdk::{Course, Enrollment, NewCourse, User};

use super::error::DomainError;

const COURSE_ID_PREFIX: &str = "course-";
const ENROLLMENT_ID_PREFIX: &str = "enrollment-";

#[derive(Default)]
struct StoreState {
    courses: HashMap<String, Course>,
    /// Course ids in insertion order; `courses` has no stable iteration order.
    course_order: Vec<String>,
    enrollments: HashMap<String, Enrollment>,
    instructor_index: HashMap<String, Vec<String>>,
    student_index: HashMap<String, Vec<String>>,
    roster_index: HashMap<String, Vec<String>>,
    course_counter: u64,
    enrollment_counter: u64,
}

impl StoreState {
    fn insert_course(&mut self, course: Course) {
        self.instructor_index
            .entry(course.instructor_id.clone())
            .or_default()
            .push(course.id.clone());
        self.course_order.push(course.id.clone());
        self.courses.insert(course.id.clone(), course);
    }

    fn insert_enrollment(&mut self, enrollment: Enrollment) {
        self.student_index
            .entry(enrollment.user_id.clone())
            .or_default()
            .push(enrollment.id.clone());
        self.roster_index
            .entry(enrollment.course_id.clone())
            .or_default()
            .push(enrollment.id.clone());
        self.enrollments.insert(enrollment.id.clone(), enrollment);
    }

    fn next_course_id(&mut self) -> String {
        self.course_counter += 1;
        format!("{COURSE_ID_PREFIX}{}", self.course_counter)
    }

    fn next_enrollment_id(&mut self) -> String {
        self.enrollment_counter += 1;
        format!("{ENROLLMENT_ID_PREFIX}{}", self.enrollment_counter)
    }

    fn resolve_courses(&self, ids: &[String]) -> Vec<Course> {
        ids.iter()
            .filter_map(|id| {
                let course = self.courses.get(id);
                if course.is_none() {
                    warn!(course_id = %id, "index references a missing course, skipping");
                }
                course.cloned()
            })
            .collect()
    }

    fn resolve_enrollments(&self, ids: &[String]) -> Vec<Enrollment> {
        ids.iter()
            .filter_map(|id| {
                let enrollment = self.enrollments.get(id);
                if enrollment.is_none() {
                    warn!(enrollment_id = %id, "index references a missing enrollment, skipping");
                }
                enrollment.cloned()
            })
            .collect()
    }

    fn indexed<'a>(index: &'a HashMap<String, Vec<String>>, key: &str) -> &'a [String] {
        index.get(key).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Thread-safe store owning every course, enrollment and index.
///
/// All state sits behind one lock: writers hold it for the whole operation,
/// so id allocation and index maintenance are atomic with respect to other
/// callers, and a read observes every write that completed before it.
#[derive(Default)]
pub struct CourseStore {
    state: RwLock<StoreState>,
}

impl CourseStore {
    /// An empty store; the first created course is `course-1`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from fixed data, continuing id allocation after it.
    ///
    /// Courses are indexed in the given order, then enrollments.
    pub(crate) fn with_data(
        courses: Vec<Course>,
        enrollments: Vec<Enrollment>,
        course_counter: u64,
        enrollment_counter: u64,
    ) -> Self {
        let mut state = StoreState::default();
        for course in courses {
            state.insert_course(course);
        }
        for enrollment in enrollments {
            state.insert_enrollment(enrollment);
        }
        state.course_counter = course_counter;
        state.enrollment_counter = enrollment_counter;

        Self {
            state: RwLock::new(state),
        }
    }

    /// Number of stored courses.
    #[must_use]
    pub fn course_count(&self) -> usize {
        self.state.read().courses.len()
    }

    /// Number of stored enrollments.
    #[must_use]
    pub fn enrollment_count(&self) -> usize {
        self.state.read().enrollments.len()
    }

    /// A consistent read view; writers wait until it is dropped.
    ///
    /// Do not call other store methods while holding it.
    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot<'_> {
        StoreSnapshot {
            state: self.state.read(),
        }
    }

    /// All courses in insertion order.
    #[must_use]
    pub fn list_courses(&self) -> Vec<Course> {
        self.snapshot().list_courses()
    }

    /// The course with `id`, or `None`. Absence is not an error.
    #[must_use]
    pub fn get_course(&self, id: &str) -> Option<Course> {
        self.snapshot().get_course(id)
    }

    /// Store a new course under the next `course-<n>` id.
    pub fn create_course(&self, input: NewCourse) -> Course {
        let mut state = self.state.write();
        let course = Course {
            id: state.next_course_id(),
            title: input.title,
            description: input.description,
            instructor_id: input.instructor_id,
            duration_hours: input.duration_hours,
            published: input.published,
        };
        state.insert_course(course.clone());

        debug!(course_id = %course.id, instructor_id = %course.instructor_id, "course created");
        course
    }

    /// Enroll `user_id` in `course_id`, stamped with the current time.
    ///
    /// # Errors
    /// Returns [`DomainError::CourseNotFound`] if the course does not exist.
    /// No id is consumed in that case.
    pub fn enroll_user(&self, user_id: &str, course_id: &str) -> Result<Enrollment, DomainError> {
        self.enroll_user_at(user_id, course_id, Utc::now())
    }

    fn enroll_user_at(
        &self,
        user_id: &str,
        course_id: &str,
        enrolled_at: DateTime<Utc>,
    ) -> Result<Enrollment, DomainError> {
        let mut state = self.state.write();
        if !state.courses.contains_key(course_id) {
            return Err(DomainError::CourseNotFound(course_id.to_owned()));
        }

        let enrollment = Enrollment {
            id: state.next_enrollment_id(),
            user_id: user_id.to_owned(),
            course_id: course_id.to_owned(),
            progress: 0,
            enrolled_at,
        };
        state.insert_enrollment(enrollment.clone());

        debug!(enrollment_id = %enrollment.id, user_id, course_id, "user enrolled");
        Ok(enrollment)
    }

    /// One user per requested id, in request order, duplicates included.
    #[must_use]
    pub fn lookup_users_by_id(&self, ids: &[String]) -> Vec<User> {
        self.snapshot().lookup_users_by_id(ids)
    }

    /// Enrollments of a course in enrollment order; empty for unknown courses.
    #[must_use]
    pub fn course_roster(&self, course_id: &str) -> Vec<Enrollment> {
        self.snapshot().course_roster(course_id)
    }
}

/// Read guard over the whole store, see [`CourseStore::snapshot`].
pub struct StoreSnapshot<'a> {
    state: RwLockReadGuard<'a, StoreState>,
}

impl StoreSnapshot<'_> {
    #[must_use]
    pub fn list_courses(&self) -> Vec<Course> {
        self.state.resolve_courses(&self.state.course_order)
    }

    #[must_use]
    pub fn get_course(&self, id: &str) -> Option<Course> {
        self.state.courses.get(id).cloned()
    }

    /// Each user carries the courses they teach and their enrollments; ids
    /// with no index entries yield empty lists.
    #[must_use]
    pub fn lookup_users_by_id(&self, ids: &[String]) -> Vec<User> {
        let state = &self.state;
        ids.iter()
            .map(|id| User {
                id: id.clone(),
                instructor_courses: state
                    .resolve_courses(StoreState::indexed(&state.instructor_index, id)),
                enrollments: state
                    .resolve_enrollments(StoreState::indexed(&state.student_index, id)),
            })
            .collect()
    }

    #[must_use]
    pub fn course_roster(&self, course_id: &str) -> Vec<Enrollment> {
        self.state
            .resolve_enrollments(StoreState::indexed(&self.state.roster_index, course_id))
    }
}
