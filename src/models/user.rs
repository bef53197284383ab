use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

lazy_static! {
    // Letters, digits and @ . + - _
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[A-Za-z0-9@.+_-]+$").unwrap();
}

/// Group membership used by the authorization gate.
/// Corresponds to the `user_role` SQL enum.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "user_role")]
pub enum Role {
    Admin,
    Manager,
}

/// An account, including its password hash and group memberships.
///
/// The hash is never serialized.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
    pub roles: Vec<Role>,
}

impl User {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

/// Public view of a user, nested in comments and logs and returned by `/api/users/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserSummary {
    pub id: i32,
    pub username: String,
    pub email: String,
}

/// Body accepted by `POST /api/users/`.
#[derive(Debug, Deserialize, Validate)]
pub struct UserInput {
    #[validate(
        length(min = 1, max = 150),
        regex(
            path = "USERNAME_REGEX",
            message = "Username may contain only letters, digits and @/./+/-/_"
        )
    )]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub roles: Vec<Role>,
}

/// Fields written when an account is inserted. `password_hash` is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub roles: Vec<Role>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(username: &str, email: &str, password: &str) -> UserInput {
        UserInput {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            is_staff: false,
            roles: vec![],
        }
    }

    #[test]
    fn test_user_input_validation() {
        assert!(input("alice", "alice@example.com", "password123")
            .validate()
            .is_ok());
        assert!(input("alice.b+ops", "alice@example.com", "password123")
            .validate()
            .is_ok());
        assert!(input("alice", "invalid-email", "password123")
            .validate()
            .is_err());
        assert!(input("alice", "alice@example.com", "short").validate().is_err());
        assert!(input("alice smith", "alice@example.com", "password123")
            .validate()
            .is_err());
        assert!(input("", "alice@example.com", "password123")
            .validate()
            .is_err());
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let user = User {
            id: 1,
            username: "alice".into(),
            email: "alice@example.com".into(),
            password_hash: "$2b$12$secret".into(),
            is_staff: false,
            is_superuser: false,
            is_active: true,
            date_joined: Utc::now(),
            roles: vec![Role::Manager],
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["roles"][0], "Manager");
        assert!(user.has_role(Role::Manager));
        assert!(!user.has_role(Role::Admin));
    }
}
