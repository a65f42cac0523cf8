use std::{collections::HashMap, fmt};

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use rocket::{
    http::Status,
    request::Request,
    response::{self, status, Responder},
    serde::json::Json,
};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeltType {
    DatabaseConnection,
    DatabaseError,
    RecordNotFound,
    UniqueViolation,
    ForeignKeyViolation,
    CheckViolation,
    NotNullViolation,

    ExpiredToken,
    InvalidToken,
    MissingToken,
    InsufficientPermissions,
    Unauthorized,
    Forbidden,

    ValidationFailed,
    InvalidInput,
    MissingField,
    NotFound,

    SerializationFailed,
    DeserializationFailed,
    ConfigurationError,
    EnvironmentError,
    Timeout,

    Unknown,
}

impl MeltType {
    pub fn as_str(self) -> &'static str {
        match self {
            MeltType::DatabaseConnection => "DatabaseConnection",
            MeltType::DatabaseError => "DatabaseError",
            MeltType::RecordNotFound => "RecordNotFound",
            MeltType::UniqueViolation => "UniqueViolation",
            MeltType::ForeignKeyViolation => "ForeignKeyViolation",
            MeltType::CheckViolation => "CheckViolation",
            MeltType::NotNullViolation => "NotNullViolation",
            MeltType::ExpiredToken => "ExpiredToken",
            MeltType::InvalidToken => "InvalidToken",
            MeltType::MissingToken => "MissingToken",
            MeltType::InsufficientPermissions => "InsufficientPermissions",
            MeltType::Unauthorized => "Unauthorized",
            MeltType::Forbidden => "Forbidden",
            MeltType::ValidationFailed => "ValidationFailed",
            MeltType::InvalidInput => "InvalidInput",
            MeltType::MissingField => "MissingField",
            MeltType::NotFound => "NotFound",
            MeltType::SerializationFailed => "SerializationFailed",
            MeltType::DeserializationFailed => "DeserializationFailed",
            MeltType::ConfigurationError => "ConfigurationError",
            MeltType::EnvironmentError => "EnvironmentError",
            MeltType::Timeout => "Timeout",
            MeltType::Unknown => "Unknown",
        }
    }

    pub fn status(self) -> Status {
        use MeltType::*;

        match self {
            ExpiredToken | InvalidToken | MissingToken | Unauthorized => Status::Unauthorized,
            InsufficientPermissions | Forbidden => Status::Forbidden,
            RecordNotFound | NotFound => Status::NotFound,
            UniqueViolation | ForeignKeyViolation => Status::Conflict,
            ValidationFailed | InvalidInput | MissingField | CheckViolation | NotNullViolation => Status::BadRequest,
            Timeout => Status::ServiceUnavailable,
            DatabaseConnection | DatabaseError | SerializationFailed | DeserializationFailed | ConfigurationError | EnvironmentError | Unknown => Status::InternalServerError,
        }
    }
}

impl fmt::Display for MeltType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error carried through models, guards and handlers. `details` is for the log;
/// clients see `user_message()`.
#[derive(Debug)]
pub struct MeltDown {
    pub melt_type: MeltType,
    pub details: String,
    pub user_message: Option<String>,
    pub context: Option<HashMap<String, String>>,
}

impl MeltDown {
    pub fn new(melt_type: MeltType, details: impl Into<String>) -> Self {
        Self {
            melt_type,
            details: details.into(),
            user_message: None,
            context: None,
        }
    }

    pub fn with_user_message(mut self, message: impl Into<String>) -> Self {
        self.user_message = Some(message.into());
        self
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.get_or_insert_with(HashMap::new).insert(key.into(), value.into());
        self
    }

    pub fn user_message(&self) -> String {
        if let Some(message) = &self.user_message {
            return message.clone();
        }

        let details = &self.details;
        match self.melt_type {
            MeltType::RecordNotFound | MeltType::NotFound => format!("{details} not found."),
            MeltType::UniqueViolation => format!("{details} already exists."),
            MeltType::MissingField | MeltType::NotNullViolation => format!("{details} is required."),
            MeltType::ValidationFailed if details.is_empty() => "Validation failed".to_string(),
            MeltType::ValidationFailed => format!("Validation failed: {details}"),
            MeltType::InvalidInput => format!("Invalid input: {details}"),
            MeltType::Unauthorized => format!("Unauthorized: {details}"),
            MeltType::Forbidden => format!("Forbidden: {details}"),
            MeltType::ForeignKeyViolation => "Referenced data does not exist.".to_string(),
            MeltType::CheckViolation => "Data validation constraints were not met.".to_string(),
            MeltType::ExpiredToken => "Your session has expired. Please login again.".to_string(),
            MeltType::InvalidToken => "Invalid authentication token.".to_string(),
            MeltType::MissingToken => "Authentication required.".to_string(),
            MeltType::InsufficientPermissions => "You don't have permission to perform this action.".to_string(),
            MeltType::DatabaseConnection => "Unable to connect to database. Please try again later.".to_string(),
            MeltType::Timeout => "The request took too long. Please try again later.".to_string(),
            MeltType::DatabaseError | MeltType::SerializationFailed | MeltType::DeserializationFailed => "Data processing error.".to_string(),
            MeltType::ConfigurationError | MeltType::EnvironmentError => "Server configuration error.".to_string(),
            MeltType::Unknown => "An unexpected error occurred.".to_string(),
        }
    }

    pub fn log_message(&self) -> String {
        let mut message = format!("[{}] {}", self.melt_type, self.details);

        if let Some(context) = &self.context {
            for (key, value) in context {
                message.push_str(&format!(" | {}={}", key, value));
            }
        }

        message
    }

    pub fn status_code(&self) -> Status {
        self.melt_type.status()
    }

    pub fn log(&self) {
        use crate::quill_log;

        match self.status_code().code {
            400..=499 => quill_log!(Warning, self.log_message()),
            _ => quill_log!(Error, self.log_message()),
        }
    }

    fn with_constraint(self, info: &dyn diesel::result::DatabaseErrorInformation) -> Self {
        match info.constraint_name() {
            Some(constraint) => self.with_context("constraint", constraint),
            None => self,
        }
    }
}

impl fmt::Display for MeltDown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for MeltDown {}

impl From<bcrypt::BcryptError> for MeltDown {
    fn from(err: bcrypt::BcryptError) -> Self {
        MeltDown::new(MeltType::ConfigurationError, format!("Password hashing error: {}", err))
    }
}

impl From<jsonwebtoken::errors::Error> for MeltDown {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        let melt_type = match err.kind() {
            JwtErrorKind::ExpiredSignature => MeltType::ExpiredToken,
            JwtErrorKind::InvalidKeyFormat => MeltType::ConfigurationError,
            _ => MeltType::InvalidToken,
        };
        MeltDown::new(melt_type, format!("JWT rejected: {}", err))
    }
}

impl From<serde_json::Error> for MeltDown {
    fn from(err: serde_json::Error) -> Self {
        MeltDown::new(MeltType::DeserializationFailed, format!("JSON error: {}", err))
    }
}

impl From<DieselError> for MeltDown {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::DatabaseError(kind, ref info) => match kind {
                DatabaseErrorKind::UniqueViolation => {
                    let field = match info.constraint_name() {
                        Some(constraint) if constraint.contains("username") => "Username",
                        Some(constraint) if constraint.contains("email") => "Email",
                        Some(constraint) if constraint.contains("tags_title") => "Tag",
                        _ => "This value",
                    };
                    MeltDown::new(MeltType::UniqueViolation, field).with_constraint(&**info)
                }
                DatabaseErrorKind::ForeignKeyViolation => MeltDown::new(MeltType::ForeignKeyViolation, "Related record not found").with_constraint(&**info),
                DatabaseErrorKind::CheckViolation => MeltDown::new(MeltType::CheckViolation, "Check constraint failed").with_constraint(&**info),
                DatabaseErrorKind::NotNullViolation => {
                    let column = info.column_name().unwrap_or("Unknown field").to_string();
                    let error = MeltDown::new(MeltType::NotNullViolation, column);
                    match info.table_name() {
                        Some(table) => error.with_context("table", table),
                        None => error,
                    }
                }
                _ => MeltDown::new(MeltType::DatabaseError, format!("Database error: {:?}", err)),
            },
            DieselError::NotFound => MeltDown::new(MeltType::RecordNotFound, "Record"),
            DieselError::DeserializationError(e) => MeltDown::new(MeltType::DeserializationFailed, format!("Failed to deserialize result: {}", e)),
            DieselError::SerializationError(e) => MeltDown::new(MeltType::SerializationFailed, format!("Failed to serialize data: {}", e)),
            _ => MeltDown::new(MeltType::DatabaseError, format!("Database error: {:?}", err)),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Serialize, Debug, Clone)]
pub struct ApiErrorDetail {
    pub code: u16,
    #[serde(rename = "type")]
    pub melt_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<HashMap<String, String>>,
}

impl From<&MeltDown> for ApiErrorDetail {
    fn from(error: &MeltDown) -> Self {
        ApiErrorDetail {
            code: error.status_code().code,
            melt_type: error.melt_type.to_string(),
            message: error.user_message(),
            context: error.context.clone(),
        }
    }
}

impl From<MeltDown> for ApiError {
    fn from(error: MeltDown) -> Self {
        error.log();

        ApiError { error: ApiErrorDetail::from(&error) }
    }
}

impl<'r> Responder<'r, 'static> for MeltDown {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status_code();
        status::Custom(status, Json(ApiError::from(self))).respond_to(req)
    }
}

impl MeltDown {
    pub fn db_connection(details: impl Into<String>) -> Self {
        Self::new(MeltType::DatabaseConnection, details)
    }

    pub fn record_not_found(entity: impl Into<String>) -> Self {
        Self::new(MeltType::RecordNotFound, entity)
    }

    pub fn invalid_token(details: impl Into<String>) -> Self {
        Self::new(MeltType::InvalidToken, details)
    }

    pub fn missing_token() -> Self {
        Self::new(MeltType::MissingToken, "Authentication token is missing")
    }

    pub fn insufficient_permissions() -> Self {
        Self::new(MeltType::InsufficientPermissions, "Insufficient permissions for this action")
    }

    pub fn validation_failed(details: impl Into<String>) -> Self {
        Self::new(MeltType::ValidationFailed, details)
    }

    pub fn invalid_input(details: impl Into<String>) -> Self {
        Self::new(MeltType::InvalidInput, details)
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::new(MeltType::MissingField, field)
    }

    pub fn timeout(details: impl Into<String>) -> Self {
        Self::new(MeltType::Timeout, details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404_not_400() {
        let error = MeltDown::from(DieselError::NotFound);
        assert_eq!(error.melt_type, MeltType::RecordNotFound);
        assert_eq!(error.status_code(), Status::NotFound);
    }

    #[test]
    fn permission_failures_map_to_403() {
        assert_eq!(MeltDown::insufficient_permissions().status_code(), Status::Forbidden);
        assert_eq!(MeltDown::new(MeltType::Forbidden, "admin only").status_code(), Status::Forbidden);
    }

    #[test]
    fn token_failures_map_to_401() {
        assert_eq!(MeltDown::missing_token().status_code(), Status::Unauthorized);
        assert_eq!(MeltDown::new(MeltType::ExpiredToken, "expired").status_code(), Status::Unauthorized);
        assert_eq!(MeltDown::invalid_token("bad").status_code(), Status::Unauthorized);
    }

    #[test]
    fn timeout_is_service_unavailable() {
        assert_eq!(MeltDown::timeout("slow").status_code(), Status::ServiceUnavailable);
    }

    #[test]
    fn user_message_override_wins() {
        let error = MeltDown::record_not_found("Post").with_user_message("post don't exist");
        assert_eq!(error.user_message(), "post don't exist");
        assert_eq!(MeltDown::record_not_found("Post").user_message(), "Post not found.");
    }

    #[test]
    fn log_message_carries_context() {
        let error = MeltDown::record_not_found("Comment").with_context("id", "42");
        assert_eq!(error.log_message(), "[RecordNotFound] Comment | id=42");
    }

    #[test]
    fn error_detail_serializes_type_field() {
        let error = MeltDown::insufficient_permissions();
        let value = serde_json::to_value(ApiErrorDetail::from(&error)).unwrap();
        assert_eq!(value["code"], 403);
        assert_eq!(value["type"], "InsufficientPermissions");
        assert!(value.get("context").is_none());
    }
}
