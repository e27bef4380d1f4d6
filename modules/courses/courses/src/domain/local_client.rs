//! In-process `CoursesClientV1` backed directly by the store.

use std::sync::Arc;

use async_trait::async_trait;

use courses_sdk::{Course, CoursesClientV1, CoursesError, Enrollment, NewCourse, User};

use super::store::CourseStore;

/// Client for callers living in the same process as the store.
#[derive(Clone)]
pub struct LocalCoursesClient {
    store: Arc<CourseStore>,
}

impl LocalCoursesClient {
    #[must_use]
    pub fn new(store: Arc<CourseStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CoursesClientV1 for LocalCoursesClient {
    async fn list_courses(&self) -> Result<Vec<Course>, CoursesError> {
        Ok(self.store.list_courses())
    }

    async fn get_course(&self, id: &str) -> Result<Option<Course>, CoursesError> {
        Ok(self.store.get_course(id))
    }

    async fn create_course(&self, input: NewCourse) -> Result<Course, CoursesError> {
        Ok(self.store.create_course(input))
    }

    async fn enroll_user(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<Enrollment, CoursesError> {
        self.store
            .enroll_user(user_id, course_id)
            .map_err(CoursesError::from)
    }

    async fn lookup_users_by_id(&self, ids: &[String]) -> Result<Vec<User>, CoursesError> {
        Ok(self.store.lookup_users_by_id(ids))
    }
}
