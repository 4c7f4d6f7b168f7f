use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use drinks_engine::RecipeApiError;
use log::error;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server.")]
    BackendError(String),
    #[error("Bad request. {0}")]
    CouldNotDeserializePayload(String),
    #[error("Bad request. {0}")]
    InvalidRequestPath(String),
    #[error("Bad request. {0}")]
    InvalidRecipe(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("{0}")]
    AuthenticationError(#[from] AuthError),
    #[error("Resource not found. {0}")]
    NoRecordFound(String),
    #[error("A conflict was found. {0}")]
    Conflict(String),
}

impl ServerError {
    /// The machine-readable error kind reported to clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::CouldNotDeserializePayload(_) | Self::InvalidRequestPath(_) | Self::InvalidRecipe(_) => "bad_request",
            Self::AuthenticationError(e) => e.code(),
            Self::NoRecordFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::InitializeError(_) | Self::BackendError(_) | Self::IOError(_) | Self::ConfigurationError(_) => {
                "internal_error"
            },
        }
    }
}

/// The JSON body of every error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: u16,
    pub code: &'static str,
    pub message: String,
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::CouldNotDeserializePayload(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRecipe(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => e.status_code(),
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let Self::BackendError(detail) = self {
            error!("💻️ Backend error: {detail}");
        }
        let status = self.status_code();
        let body = ErrorResponse { success: false, error: status.as_u16(), code: self.code(), message: self.to_string() };
        HttpResponse::build(status).content_type(ContentType::json()).json(body)
    }
}

impl From<RecipeApiError> for ServerError {
    fn from(e: RecipeApiError) -> Self {
        match e {
            RecipeApiError::ValidationError(_) => Self::InvalidRecipe(e.to_string()),
            RecipeApiError::RecipeNotFound(_) => Self::NoRecordFound(e.to_string()),
            RecipeApiError::DuplicateTitle(_) => Self::Conflict(e.to_string()),
            RecipeApiError::DatabaseError(s) => Self::BackendError(s),
        }
    }
}

/// Authorization failures. The `Display` text of each variant is safe to send to clients; any attached detail is
/// for logs only.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Authorization header is missing.")]
    HeaderMissing,
    #[error("Authorization header must start with 'Bearer'.")]
    MissingBearerScheme,
    #[error("Token not found.")]
    MissingToken,
    #[error("Authorization header must have the format 'Bearer <token>'.")]
    MalformedHeader,
    #[error("Authorization malformed.")]
    MissingKeyId,
    #[error("Unable to find the appropriate key.")]
    KeyNotFound(String),
    #[error("Unable to fetch the signing keys.")]
    KeySetUnavailable(String),
    #[error("Unable to parse token.")]
    InvalidToken(String),
    #[error("Token expired.")]
    TokenExpired,
    #[error("Invalid claims. Please check the audience and issuer.")]
    InvalidClaims(String),
    #[error("Permissions not included in JWT.")]
    MissingPermissions,
    #[error("Permissions claim must be a list of strings.")]
    MalformedPermissions,
    #[error("Permission not found.")]
    Unauthorized(String),
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::HeaderMissing => "authorization_header_missing",
            Self::MissingBearerScheme
            | Self::MissingToken
            | Self::MalformedHeader
            | Self::MissingKeyId
            | Self::KeyNotFound(_)
            | Self::KeySetUnavailable(_) => "invalid_header",
            Self::InvalidToken(_) => "invalid_token",
            Self::TokenExpired => "token_expired",
            Self::InvalidClaims(_) | Self::MissingPermissions | Self::MalformedPermissions => "invalid_claims",
            Self::Unauthorized(_) => "unauthorized",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HeaderMissing => StatusCode::UNAUTHORIZED,
            Self::MissingBearerScheme => StatusCode::UNAUTHORIZED,
            Self::MissingToken => StatusCode::UNAUTHORIZED,
            Self::MalformedHeader => StatusCode::UNAUTHORIZED,
            Self::MissingKeyId => StatusCode::UNAUTHORIZED,
            Self::KeyNotFound(_) => StatusCode::BAD_REQUEST,
            Self::KeySetUnavailable(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidToken(_) => StatusCode::BAD_REQUEST,
            Self::TokenExpired => StatusCode::UNAUTHORIZED,
            Self::InvalidClaims(_) => StatusCode::UNAUTHORIZED,
            Self::MissingPermissions => StatusCode::BAD_REQUEST,
            Self::MalformedPermissions => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::FORBIDDEN,
        }
    }
}
