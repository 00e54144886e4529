use chrono::{DateTime, Duration, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Single-use code sent by email to confirm an account or reset a password.
#[derive(Debug, Clone, FromRow)]
pub struct Token {
    pub id: Uuid,
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Token {
    pub fn new(token: String, user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            token,
            user_id,
            created_at: Utc::now(),
        }
    }

    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now - self.created_at > ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_window() {
        let token = Token::new("123456".into(), Uuid::new_v4());
        let ttl = Duration::minutes(10);
        assert!(!token.is_expired(ttl, token.created_at + Duration::minutes(9)));
        assert!(!token.is_expired(ttl, token.created_at + ttl));
        assert!(token.is_expired(ttl, token.created_at + Duration::minutes(11)));
    }
}
