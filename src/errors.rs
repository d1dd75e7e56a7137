use actix_web::{
    error::ResponseError,
    http::{header, StatusCode},
    HttpResponse,
};
use derive_more::Display;

use crate::{
    constants::{
        MSG_INVALID_DATA, MSG_MALFORMED_FORM, MSG_METHOD_NOT_ALLOWED, MSG_PAYLOAD_TOO_LARGE,
        MSG_RATE_LIMITED, MSG_SERVER_ERROR,
    },
    entities::contact::ContactResponse,
};

/// Every way a contact request can end without a success reply.
#[derive(Debug, Display, PartialEq)]
pub enum ContactError {
    #[display("Method not allowed")]
    MethodNotAllowed,

    #[display("Invalid data: {}", _0.join(" "))]
    ValidationFailed(Vec<String>),

    #[display("Form body exceeds the size limit")]
    PayloadTooLarge,

    #[display("Malformed form body: {_0}")]
    MalformedPayload(String),

    #[display("Rate limited, retry in {retry_after}s")]
    RateLimited { retry_after: u64 },

    #[display("Failed to send email")]
    MailSendFailed,

    #[display("{_0}")]
    Unexpected(String),
}

impl ContactError {
    /// Server-side failures are written to the contact log; client mistakes are not.
    pub fn is_server_error(&self) -> bool {
        matches!(self, ContactError::MailSendFailed | ContactError::Unexpected(_))
    }
}

impl ResponseError for ContactError {
    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ContactError::MethodNotAllowed => ContactResponse::failure(MSG_METHOD_NOT_ALLOWED),
            ContactError::ValidationFailed(errors) => {
                ContactResponse::invalid(MSG_INVALID_DATA, errors.clone())
            }
            ContactError::PayloadTooLarge => ContactResponse::failure(MSG_PAYLOAD_TOO_LARGE),
            ContactError::MalformedPayload(_) => {
                ContactResponse::invalid(MSG_INVALID_DATA, vec![MSG_MALFORMED_FORM.to_string()])
            }
            ContactError::RateLimited { .. } => ContactResponse::failure(MSG_RATE_LIMITED),
            ContactError::MailSendFailed | ContactError::Unexpected(_) => {
                ContactResponse::failure(MSG_SERVER_ERROR)
            }
        };

        let mut builder = HttpResponse::build(self.status_code());
        if let ContactError::RateLimited { retry_after } = self {
            builder.insert_header((header::RETRY_AFTER, retry_after.to_string()));
        }
        builder.json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ContactError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ContactError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            ContactError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ContactError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            ContactError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ContactError::MailSendFailed => StatusCode::INTERNAL_SERVER_ERROR,
            ContactError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SessionError> for ContactError {
    fn from(err: SessionError) -> Self {
        ContactError::Unexpected(err.to_string())
    }
}

#[derive(Debug, Display)]
pub enum SessionError {
    #[display("Session store connection failed: {_0}")]
    Connection(String),

    #[display("Session store operation failed: {_0}")]
    Operation(String),
}

impl std::error::Error for SessionError {}

impl From<redis::RedisError> for SessionError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_connection_refusal() || err.is_connection_dropped() || err.is_timeout() {
            SessionError::Connection(err.to_string())
        } else {
            SessionError::Operation(err.to_string())
        }
    }
}

#[derive(Debug, Display)]
pub enum RepositoryError {
    #[display("Constraint violation: {_0}")]
    ConstraintViolation(String),

    #[display("Connection error: {_0}")]
    ConnectionError(String),

    #[display("Query error: {_0}")]
    QueryError(String),
}

impl std::error::Error for RepositoryError {}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(ref e) if e.is_unique_violation() || e.is_check_violation() => {
                RepositoryError::ConstraintViolation(err.to_string())
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                RepositoryError::ConnectionError(err.to_string())
            }
            _ => RepositoryError::QueryError(err.to_string()),
        }
    }
}
