pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

// Re-export necessary items
pub use extractors::CurrentUser;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{generate_jwt, generate_token, verify_jwt, Claims};

lazy_static! {
    // Confirmation and reset tokens are numeric codes
    static ref NUMERIC_REGEX: regex::Regex = regex::Regex::new(r"^[0-9]+$").unwrap();
}

/// Payload for `POST /api/auth/create-account`.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateAccountRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid e-mail"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password is too short, minimum 8 characters"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub password_confirmation: String,
}

/// Payload carrying a confirmation or reset token.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TokenRequest {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
}

/// Payload for `POST /api/auth/login`.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid e-mail"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Payload for the endpoints that only need an address (request-code, forgot-password,
/// team lookup).
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct EmailRequest {
    #[validate(email(message = "Invalid e-mail"))]
    pub email: String,
}

/// Path segment of `POST /api/auth/update-password/{token}`.
#[derive(Debug, Deserialize, Validate)]
pub struct TokenPath {
    #[validate(regex(path = "NUMERIC_REGEX", message = "Invalid token"))]
    pub token: String,
}

/// New password with confirmation, used by the token-based reset.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct NewPasswordRequest {
    #[validate(length(min = 8, message = "Password is too short, minimum 8 characters"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub password_confirmation: String,
}

/// Payload for `PUT /api/auth/profile`.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid e-mail"))]
    pub email: String,
}

/// Payload for `POST /api/auth/change-password`.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 8, message = "Password is too short, minimum 8 characters"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub password_confirmation: String,
}

/// Payload for `POST /api/auth/check-password`.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CheckPasswordRequest {
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, FieldError};

    fn account(password: &str, confirmation: &str) -> CreateAccountRequest {
        CreateAccountRequest {
            name: "A".to_string(),
            email: "a@x.com".to_string(),
            password: password.to_string(),
            password_confirmation: confirmation.to_string(),
        }
    }

    #[test]
    fn test_create_account_validation() {
        assert!(account("12345678", "12345678").validate().is_ok());
        assert!(account("1234567", "1234567").validate().is_err());

        let error: AppError = account("12345678", "87654321").validate().unwrap_err().into();
        match error {
            AppError::ValidationError(fields) => assert_eq!(
                fields,
                vec![FieldError::new("password_confirmation", "Passwords do not match")]
            ),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_login_request_validation() {
        let valid_login = LoginRequest {
            email: "test@example.com".to_string(),
            password: "x".to_string(),
        };
        assert!(valid_login.validate().is_ok());

        let invalid_email_login = LoginRequest {
            email: "testexample.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(invalid_email_login.validate().is_err());

        let empty_password_login = LoginRequest {
            email: "test@example.com".to_string(),
            password: "".to_string(),
        };
        assert!(empty_password_login.validate().is_err());
    }

    #[test]
    fn test_token_path_must_be_numeric() {
        assert!(TokenPath {
            token: "123456".into()
        }
        .validate()
        .is_ok());
        assert!(TokenPath {
            token: "12ab56".into()
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_change_password_validation() {
        let request = ChangePasswordRequest {
            current_password: "".into(),
            password: "new-password".into(),
            password_confirmation: "new-password".into(),
        };
        assert!(request.validate().is_err());
    }
}
