pub mod extractors;
pub mod login;
pub mod middleware;
pub mod password;
pub mod permissions;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

pub use extractors::CurrentUser;
pub use login::authenticate;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, hash_password_with_cost, verify_password};
pub use permissions::{require_admin, require_admin_or_manager};
pub use token::{Claims, TokenIssuer, TokenPair, TokenType};

/// Body of `POST /api/token/`.
///
/// The field is named `username` but may hold the account's email instead.
/// Missing fields read as blank, which fails like any other bad credential.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Body of `POST /api/token/refresh/`.
#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1))]
    pub refresh: String,
}

/// Successful login: the token pair plus the account's public fields.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub refresh: String,
    pub access: String,
    pub user_id: i32,
    pub username: String,
    pub email: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// Successful refresh: a new access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_login_request_missing_fields_read_as_blank() {
        let request: LoginRequest = serde_json::from_value(json!({ "password": "x" })).unwrap();
        assert_eq!(request.username, "");
        assert_eq!(request.password, "x");

        let request: LoginRequest = serde_json::from_value(json!({})).unwrap();
        assert!(request.username.is_empty() && request.password.is_empty());
    }

    #[test]
    fn test_refresh_request_validation() {
        let blank = RefreshRequest {
            refresh: String::new(),
        };
        assert!(blank.validate().is_err());
    }
}
