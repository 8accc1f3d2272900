use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::users::repo::User;

/// Request body for registration and update. The password is optional at
/// the boundary: registration rejects its absence during validation, update
/// treats absence as "leave the stored hash unchanged".
#[derive(Debug, Deserialize)]
pub struct UserPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: Option<String>,
}

/// Public part of the user returned to the client. Never carries the
/// password hash.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    #[test]
    fn payload_without_password_deserializes_to_none() {
        let payload: UserPayload =
            serde_json::from_str(r#"{"name":"Test","email":"test@test.com"}"#).unwrap();
        assert_eq!(payload.name, "Test");
        assert_eq!(payload.email, "test@test.com");
        assert!(payload.password.is_none());
    }

    #[test]
    fn payload_missing_fields_default_to_empty() {
        let payload: UserPayload = serde_json::from_str(r#"{}"#).unwrap();
        assert!(payload.name.is_empty());
        assert!(payload.email.is_empty());
        assert!(payload.password.is_none());
    }

    #[test]
    fn public_user_never_contains_password_material() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Test".to_string(),
            email: "test@test.com".to_string(),
            password_hash: "$argon2id$v=19$secret-hash".to_string(),
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        };

        let json = serde_json::to_string(&PublicUser::from(user)).unwrap();
        assert!(json.contains("test@test.com"));
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2"));
    }
}
