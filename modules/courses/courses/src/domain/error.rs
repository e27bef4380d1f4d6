use courses_sdk::CoursesError;

/// Domain-level errors for the course store
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("Course {0} not found")]
    CourseNotFound(String),
}

impl From<DomainError> for CoursesError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::CourseNotFound(id) => Self::CourseNotFound(id),
        }
    }
}

impl From<DomainError> for tonic::Status {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::CourseNotFound(_) => Self::not_found(e.to_string()),
        }
    }
}
