use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Per-field validation messages, keyed by field name.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Unauthorized(String),
    Forbidden(String),
    InternalServerError(String),
    /// Rejected form: every failing field plus the input as submitted,
    /// so the client can show the form again unchanged.
    ValidationError {
        errors: FieldErrors,
        input: serde_json::Value,
    },
    DatabaseError(sqlx::Error),
    AuthError(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize)]
struct ErrorResponse<'a> {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a FieldErrors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    input: Option<&'a serde_json::Value>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            ApiError::ValidationError { errors, .. } => {
                let summary = errors
                    .iter()
                    .map(|(field, msgs)| format!("{}: {}", field, msgs.join(", ")))
                    .collect::<Vec<_>>()
                    .join("; ");
                write!(f, "Validation Error: {}", summary)
            }
            // Driver details stay in the server log, not in the response body
            ApiError::DatabaseError(_) => write!(f, "Database Error"),
            ApiError::AuthError(msg) => write!(f, "Auth Error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) | ApiError::AuthError(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::ValidationError { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::DatabaseError(_) | ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::DatabaseError(err) = self {
            log::error!("Database error: {}", err);
        }

        let (errors, input) = match self {
            ApiError::ValidationError { errors, input } => (Some(errors), Some(input)),
            _ => (None, None),
        };

        let error_response = ErrorResponse {
            success: false,
            message: self.to_string(),
            errors,
            input,
        };

        HttpResponse::build(self.status_code()).json(error_response)
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::DatabaseError(err)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::ValidationError {
            errors: crate::validator::collect_field_errors(&err),
            input: serde_json::Value::Null,
        }
    }
}

impl ApiError {
    pub fn not_found(entity: &str) -> Self {
        ApiError::NotFound(format!("{} not found", entity))
    }

    pub fn bad_request(msg: &str) -> Self {
        ApiError::BadRequest(msg.to_string())
    }

    pub fn supplier_not_found(id: &str) -> Self {
        ApiError::NotFound(format!("Supplier with ID '{}' not found", id))
    }

    pub fn equipment_not_found(id: &str) -> Self {
        ApiError::NotFound(format!("Equipment with ID '{}' not found", id))
    }

    pub fn vehicle_record_not_found(id: &str) -> Self {
        ApiError::NotFound(format!("Vehicle record with ID '{}' not found", id))
    }

    pub fn invalid_credentials() -> Self {
        ApiError::AuthError("Invalid username or password".to_string())
    }

    /// Single-field validation failure.
    pub fn field(field: &str, message: &str) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.to_string()]);
        ApiError::ValidationError {
            errors,
            input: serde_json::Value::Null,
        }
    }

    /// Attach the submitted payload to a validation error; other variants pass through.
    pub fn with_input<T: Serialize>(self, input: &T) -> Self {
        match self {
            ApiError::ValidationError { errors, .. } => ApiError::ValidationError {
                errors,
                input: serde_json::to_value(input).unwrap_or(serde_json::Value::Null),
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::not_found("Supplier").error_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::field("name", "required").error_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(ApiError::invalid_credentials().error_response().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::DatabaseError(sqlx::Error::RowNotFound).error_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_with_input_keeps_errors() {
        let err = ApiError::field("password_confirm", "Passwords do not match")
            .with_input(&serde_json::json!({ "username": "op1" }));

        match err {
            ApiError::ValidationError { errors, input } => {
                assert_eq!(errors["password_confirm"], vec!["Passwords do not match".to_string()]);
                assert_eq!(input["username"], "op1");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_database_error_message_is_generic() {
        let err = ApiError::DatabaseError(sqlx::Error::RowNotFound);
        assert_eq!(err.to_string(), "Database Error");
    }
}
