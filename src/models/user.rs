use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An account. `email` is stored lower-cased and is unique.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirmed: bool,
}

impl User {
    /// A new, unconfirmed account. `password` must already be hashed.
    pub fn new(name: String, email: &str, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email: normalize_email(email),
            password: password_hash,
            confirmed: false,
        }
    }

    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// The user fields that may leave the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_is_unconfirmed_with_normalized_email() {
        let user = User::new("Ada".into(), "  Ada@Example.COM ", "hash".into());
        assert!(!user.confirmed);
        assert_eq!(user.email, "ada@example.com");
    }

    #[test]
    fn test_public_view_omits_password() {
        let user = User::new("Ada".into(), "ada@example.com", "hash".into());
        let json = serde_json::to_value(user.public()).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["name"], "Ada");
    }
}
