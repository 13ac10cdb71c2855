use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use strum_macros::{Display, EnumIter, EnumString};

/// Account role, stored as its lowercase name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
}

/// Database model for the users table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserModel {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl UserModel {
    /// Unknown role strings count as a plain user
    pub fn role(&self) -> UserRole {
        self.role.parse().unwrap_or(UserRole::User)
    }

    pub fn is_admin(&self) -> bool {
        self.role() == UserRole::Admin
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn roles_round_trip_through_their_names() {
        for role in UserRole::iter() {
            assert_eq!(role.to_string().parse::<UserRole>().unwrap(), role);
        }
        assert_eq!(UserRole::Admin.to_string(), "admin");
    }

    #[test]
    fn unknown_role_is_not_admin() {
        let user = UserModel {
            id: 1,
            email: "a@b.c".to_string(),
            password_hash: String::new(),
            role: "moderator".to_string(),
            created_at: Utc::now(),
        };
        assert_eq!(user.role(), UserRole::User);
        assert!(!user.is_admin());
    }
}
