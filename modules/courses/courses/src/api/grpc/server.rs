//! gRPC Server implementation for courses
//!
//! The server implementation handles gRPC requests and delegates
//! to the domain `CourseStore`. Derived lists are joined here when the
//! response messages are built.

use std::sync::Arc;

use tonic::{Request, Response, Status};
use tracing::{debug, instrument};

use courses_sdk::convert::{course_to_proto, enrollment_to_proto};
use courses_sdk::proto::{
    self, LookupUserByIdRequest, LookupUserByIdResponse, MutationCreateCourseRequest,
    MutationCreateCourseResponse, MutationEnrollUserRequest, MutationEnrollUserResponse,
    QueryCourseRequest, QueryCourseResponse, QueryCoursesRequest, QueryCoursesResponse,
};
use courses_sdk::{Course, CoursesService, Enrollment, NewCourse, User};

use crate::domain::{CourseStore, StoreSnapshot};

/// gRPC service implementation that wraps the course store.
#[derive(Clone)]
pub struct CoursesServiceImpl {
    store: Arc<CourseStore>,
}

impl CoursesServiceImpl {
    /// Create a new `CoursesService` implementation over the given store.
    #[must_use]
    pub fn new(store: Arc<CourseStore>) -> Self {
        Self { store }
    }
}

/// Course message with its roster. Roster entries carry a course stub holding only the id.
fn course_message(view: &StoreSnapshot<'_>, course: Course) -> proto::Course {
    let roster = view
        .course_roster(&course.id)
        .into_iter()
        .map(|e| enrollment_to_proto(e, None))
        .collect();
    course_to_proto(course, roster)
}

/// Enrollment message embedding its course.
fn enrollment_message(view: &StoreSnapshot<'_>, enrollment: Enrollment) -> proto::Enrollment {
    let course = view
        .get_course(&enrollment.course_id)
        .map(|c| course_message(view, c));
    enrollment_to_proto(enrollment, course)
}

fn user_message(view: &StoreSnapshot<'_>, user: User) -> proto::User {
    proto::User {
        id: user.id,
        instructor_courses: user
            .instructor_courses
            .into_iter()
            .map(|c| course_message(view, c))
            .collect(),
        enrollments: user
            .enrollments
            .into_iter()
            .map(|e| enrollment_message(view, e))
            .collect(),
    }
}

#[tonic::async_trait]
impl CoursesService for CoursesServiceImpl {
    #[instrument(skip_all, fields(keys = request.get_ref().keys.len()))]
    async fn lookup_user_by_id(
        &self,
        request: Request<LookupUserByIdRequest>,
    ) -> Result<Response<LookupUserByIdResponse>, Status> {
        let ids: Vec<String> = request.into_inner().keys.into_iter().map(|k| k.id).collect();

        let view = self.store.snapshot();
        let result = view
            .lookup_users_by_id(&ids)
            .into_iter()
            .map(|u| user_message(&view, u))
            .collect();

        Ok(Response::new(LookupUserByIdResponse { result }))
    }

    #[instrument(skip_all)]
    async fn query_courses(
        &self,
        _request: Request<QueryCoursesRequest>,
    ) -> Result<Response<QueryCoursesResponse>, Status> {
        let view = self.store.snapshot();
        let courses = view
            .list_courses()
            .into_iter()
            .map(|c| course_message(&view, c))
            .collect();

        Ok(Response::new(QueryCoursesResponse { courses }))
    }

    #[instrument(skip_all, fields(course_id = %request.get_ref().id))]
    async fn query_course(
        &self,
        request: Request<QueryCourseRequest>,
    ) -> Result<Response<QueryCourseResponse>, Status> {
        let id = request.into_inner().id;

        let view = self.store.snapshot();
        let course = view.get_course(&id).map(|c| course_message(&view, c));
        if course.is_none() {
            debug!(course_id = %id, "course not found, returning empty response");
        }

        Ok(Response::new(QueryCourseResponse { course }))
    }

    #[instrument(skip_all)]
    async fn mutation_create_course(
        &self,
        request: Request<MutationCreateCourseRequest>,
    ) -> Result<Response<MutationCreateCourseResponse>, Status> {
        let input = request
            .into_inner()
            .input
            .ok_or_else(|| Status::invalid_argument("Input is required"))?;

        let course = self.store.create_course(NewCourse::from(input));

        Ok(Response::new(MutationCreateCourseResponse {
            create_course: Some(course_message(&self.store.snapshot(), course)),
        }))
    }

    #[instrument(skip_all, fields(user_id = %request.get_ref().user_id, course_id = %request.get_ref().course_id))]
    async fn mutation_enroll_user(
        &self,
        request: Request<MutationEnrollUserRequest>,
    ) -> Result<Response<MutationEnrollUserResponse>, Status> {
        let req = request.into_inner();

        let enrollment = self.store.enroll_user(&req.user_id, &req.course_id)?;

        Ok(Response::new(MutationEnrollUserResponse {
            enroll_user: Some(enrollment_message(&self.store.snapshot(), enrollment)),
        }))
    }
}
