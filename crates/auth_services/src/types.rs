use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role carried by every account. Operators (admin, employee) manage
/// bookings; customers create and view their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full operator access.
    Admin,
    /// Operator access for day-to-day booking management.
    Employee,
    /// Regular customer account.
    Customer,
}

impl Role {
    /// Wire and storage representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Employee => "employee",
            Role::Customer => "customer",
        }
    }

    /// Parses a stored role string.
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "admin" => Some(Role::Admin),
            "employee" => Some(Role::Employee),
            "customer" => Some(Role::Customer),
            _ => None,
        }
    }

    /// Name of the live-event channel for this role.
    pub fn channel(&self) -> &'static str {
        self.as_str()
    }

    /// Whether the role may manage bookings and view the dashboard.
    pub fn is_operator(&self) -> bool {
        matches!(self, Role::Admin | Role::Employee)
    }
}

/// JWT claims structure shared with the account service that mints tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject of the token, the account ID.
    pub sub: String,
    /// Email address of the account.
    pub email: String,
    /// Role of the account.
    pub role: String,
    /// First name, used to pre-fill booking contact fields.
    pub first_name: String,
    /// Last name, used to pre-fill booking contact fields.
    pub last_name: String,
    /// Expiration timestamp of the token.
    pub exp: usize,
    /// Issued-at timestamp of the token.
    pub iat: usize,
}

/// Verified identity attached to a request by the auth middleware.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Unique identifier of the account.
    pub user_id: Uuid,
    /// Email address of the account.
    pub email: String,
    /// Role of the account.
    pub role: Role,
    /// First name of the account holder.
    pub first_name: String,
    /// Last name of the account holder.
    pub last_name: String,
}

/// Custom error type for authentication failures.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No bearer token was supplied on a protected route.
    #[error("Authorization token is required")]
    MissingToken,

    /// The token failed verification or has expired.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// The caller's role does not permit the operation.
    #[error("Insufficient permissions")]
    Forbidden,

    /// An error occurred while encoding or decoding a token.
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl actix_web::ResponseError for AuthError {
    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::HttpResponse;

        match self {
            AuthError::MissingToken => HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "missing_token",
                "message": "Authorization token is required"
            })),
            AuthError::InvalidToken | AuthError::Jwt(_) => {
                HttpResponse::Unauthorized().json(serde_json::json!({
                    "error": "invalid_token",
                    "message": "Invalid or expired token"
                }))
            }
            AuthError::Forbidden => HttpResponse::Forbidden().json(serde_json::json!({
                "error": "forbidden",
                "message": "You are not allowed to perform this action"
            })),
        }
    }
}
