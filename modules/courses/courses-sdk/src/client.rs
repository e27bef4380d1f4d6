//! gRPC client implementation of `CoursesClientV1`

use async_trait::async_trait;
use tonic::transport::Channel;

use crate::api::{CoursesClientV1, CoursesError};
use crate::models::{Course, Enrollment, NewCourse, User};
use crate::proto::courses_service_client::CoursesServiceClient;
use crate::proto::{
    LookupUserByIdRequest, LookupUserByIdRequestKey, MutationCreateCourseRequest,
    MutationEnrollUserRequest, QueryCourseRequest, QueryCoursesRequest,
};
use crate::transport::{GrpcClientConfig, connect_channel};

/// gRPC client for the courses service.
#[derive(Clone)]
pub struct CoursesGrpcClient {
    inner: CoursesServiceClient<Channel>,
}

impl CoursesGrpcClient {
    /// Connect using the default transport configuration.
    ///
    /// Accepts `http://host:port` and `unix:///path` endpoints.
    ///
    /// # Errors
    /// Returns an error if the connection cannot be established.
    pub async fn connect(uri: &str) -> anyhow::Result<Self> {
        Self::connect_with_config(uri, &GrpcClientConfig::new("courses")).await
    }

    /// Connect with an explicit transport configuration.
    ///
    /// # Errors
    /// Returns an error if the connection cannot be established.
    pub async fn connect_with_config(uri: &str, cfg: &GrpcClientConfig) -> anyhow::Result<Self> {
        let channel = connect_channel(uri, cfg).await?;
        Ok(Self::from_channel(channel))
    }

    /// Wrap an already established channel.
    #[must_use]
    pub fn from_channel(channel: Channel) -> Self {
        Self {
            inner: CoursesServiceClient::new(channel),
        }
    }
}

fn missing_field(field: &str) -> CoursesError {
    CoursesError::Internal(format!("response is missing '{field}'"))
}

#[async_trait]
impl CoursesClientV1 for CoursesGrpcClient {
    async fn list_courses(&self) -> Result<Vec<Course>, CoursesError> {
        let mut client = self.inner.clone();
        let response = client
            .query_courses(QueryCoursesRequest {})
            .await
            .map_err(|s| CoursesError::from_status(&s))?;

        Ok(response
            .into_inner()
            .courses
            .into_iter()
            .map(Course::from)
            .collect())
    }

    async fn get_course(&self, id: &str) -> Result<Option<Course>, CoursesError> {
        let mut client = self.inner.clone();
        let response = client
            .query_course(QueryCourseRequest { id: id.to_owned() })
            .await
            .map_err(|s| CoursesError::from_status(&s))?;

        Ok(response.into_inner().course.map(Course::from))
    }

    async fn create_course(&self, input: NewCourse) -> Result<Course, CoursesError> {
        let mut client = self.inner.clone();
        let response = client
            .mutation_create_course(MutationCreateCourseRequest {
                input: Some(input.into()),
            })
            .await
            .map_err(|s| CoursesError::from_status(&s))?;

        response
            .into_inner()
            .create_course
            .map(Course::from)
            .ok_or_else(|| missing_field("create_course"))
    }

    async fn enroll_user(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<Enrollment, CoursesError> {
        let mut client = self.inner.clone();
        let response = client
            .mutation_enroll_user(MutationEnrollUserRequest {
                user_id: user_id.to_owned(),
                course_id: course_id.to_owned(),
            })
            .await
            .map_err(|s| CoursesError::from_status(&s))?;

        let enrollment = response
            .into_inner()
            .enroll_user
            .ok_or_else(|| missing_field("enroll_user"))?;
        Enrollment::try_from(enrollment)
    }

    async fn lookup_users_by_id(&self, ids: &[String]) -> Result<Vec<User>, CoursesError> {
        let mut client = self.inner.clone();
        let keys = ids
            .iter()
            .map(|id| LookupUserByIdRequestKey { id: id.clone() })
            .collect();
        let response = client
            .lookup_user_by_id(LookupUserByIdRequest { keys })
            .await
            .map_err(|s| CoursesError::from_status(&s))?;

        response
            .into_inner()
            .result
            .into_iter()
            .map(User::try_from)
            .collect()
    }
}
