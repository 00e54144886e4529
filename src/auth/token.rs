use crate::error::AppError;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents the claims encoded within a session JWT.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// The user's id.
    pub sub: Uuid,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

/// Signs a session token for `user_id`, valid for `expiration_hours`.
pub fn generate_jwt(user_id: Uuid, secret: &str, expiration_hours: i64) -> Result<String, AppError> {
    let expiration = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::hours(expiration_hours))
        .ok_or_else(|| AppError::InternalServerError("JWT expiration overflow".into()))?
        .timestamp() as usize;

    let claims = Claims {
        sub: user_id,
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
}

/// Verifies signature and expiry. Malformed, expired and forged tokens all yield
/// `AppError::Unauthorized`.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// Six-digit code for account confirmation and password reset.
pub fn generate_token() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret_for_gen_verify";

    #[test]
    fn test_jwt_generation_and_verification() {
        let user_id = Uuid::new_v4();
        let token = generate_jwt(user_id, SECRET, 24).unwrap();
        let claims = verify_jwt(&token, SECRET).unwrap();
        assert_eq!(claims.sub, user_id);
    }

    #[test]
    fn test_jwt_expiration() {
        let token = generate_jwt(Uuid::new_v4(), SECRET, -2).unwrap();
        match verify_jwt(&token, SECRET) {
            Err(AppError::Unauthorized(_)) => {}
            other => panic!("expired token accepted: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_token_signature() {
        let token = generate_jwt(Uuid::new_v4(), "a_completely_different_secret", 24).unwrap();
        assert!(matches!(
            verify_jwt(&token, SECRET),
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            verify_jwt("not.a.jwt", SECRET),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_generate_token_is_six_digits() {
        for _ in 0..100 {
            let token = generate_token();
            assert_eq!(token.len(), 6);
            assert!(token.chars().all(|c| c.is_ascii_digit()));
            assert!(!token.starts_with('0'));
        }
    }
}
