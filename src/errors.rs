use crate::database::relationships::EdgeError;
use crate::database::users::UserCreationError;
use rocket::http::Status;
use rocket::request::Request;
use rocket::response::status;
use rocket::response::{self, Responder};
use rocket::serde::json::{json, Json};
use thiserror::Error;
use validator::{Validate, ValidationError, ValidationErrors};

/// Failures a social action or listing can surface to the client.
///
/// Expected no-ops (self-follow, duplicate follow, unfavoriting twice) are
/// never errors; they come back as `false` from the graph operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("not allowed")]
    Forbidden,
    #[error(transparent)]
    Edge(EdgeError),
    #[error(transparent)]
    Database(#[from] diesel::result::Error),
    #[error("token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("invalid request")]
    Invalid(Errors),
    #[error("{0}")]
    Internal(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    fn status(&self) -> Status {
        match self {
            Error::NotFound(_) => Status::NotFound,
            Error::Forbidden => Status::Forbidden,
            Error::Invalid(_) => Status::UnprocessableEntity,
            Error::Edge(_) | Error::Database(_) | Error::Token(_) | Error::Internal(_) => {
                Status::InternalServerError
            }
        }
    }
}

impl<'r> Responder<'r, 'static> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let err = match self {
            Error::Invalid(errors) => return errors.respond_to(req),
            err => err,
        };

        let status = err.status();
        let message = if status == Status::InternalServerError {
            tracing::error!("request to {} failed: {}", req.uri(), err);
            "internal error".to_string()
        } else {
            err.to_string()
        };

        status::Custom(status, Json(json!({ "errors": { "request": [message] } })))
            .respond_to(req)
    }
}

impl From<EdgeError> for Error {
    fn from(err: EdgeError) -> Error {
        match err {
            EdgeError::Database(err) => Error::Database(err),
            err => Error::Edge(err),
        }
    }
}

impl From<Errors> for Error {
    fn from(errors: Errors) -> Error {
        Error::Invalid(errors)
    }
}

impl From<UserCreationError> for Error {
    fn from(err: UserCreationError) -> Error {
        match err {
            UserCreationError::DuplicatedEmail => {
                Errors::new(&[("email", "has already been taken")]).into()
            }
            UserCreationError::Hashing(message) => Error::Internal(message),
            UserCreationError::Database(err) => Error::Database(err),
        }
    }
}

#[derive(Debug)]
pub struct Errors {
    errors: ValidationErrors,
}

pub type FieldName = &'static str;
pub type FieldErrorCode = &'static str;

impl Errors {
    pub fn new(errs: &[(FieldName, FieldErrorCode)]) -> Self {
        let mut errors = ValidationErrors::new();
        for &(field, code) in errs {
            errors.add(field, ValidationError::new(code));
        }
        Self { errors }
    }
}

impl<'r> Responder<'r, 'static> for Errors {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        use validator::ValidationErrorsKind::Field;

        let mut errors = json!({});
        for (field, field_errors) in self.errors.into_errors() {
            if let Field(field_errors) = field_errors {
                errors[field] = field_errors
                    .into_iter()
                    .map(|field_error| field_error.code)
                    .collect();
            }
        }

        status::Custom(
            Status::UnprocessableEntity,
            Json(json!({ "errors": errors })),
        )
        .respond_to(req)
    }
}

pub struct FieldValidator {
    errors: ValidationErrors,
}

impl Default for FieldValidator {
    fn default() -> Self {
        Self {
            errors: ValidationErrors::new(),
        }
    }
}

impl FieldValidator {
    pub fn validate<T: Validate>(model: &T) -> Self {
        Self {
            errors: model.validate().err().unwrap_or_else(ValidationErrors::new),
        }
    }

    /// Convenience method to trigger early returns with ? operator.
    pub fn check(self) -> Result<(), Errors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(Errors {
                errors: self.errors,
            })
        }
    }

    pub fn extract<T>(&mut self, field_name: &'static str, field: Option<T>) -> T
    where
        T: Default,
    {
        field.unwrap_or_else(|| {
            self.errors
                .add(field_name, ValidationError::new("can't be blank"));
            T::default()
        })
    }
}
