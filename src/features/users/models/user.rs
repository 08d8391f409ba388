use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::features::auth::model::{AuthenticatedUser, Role};

/// Database model for user accounts
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub role: String,
    pub protected: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Public claims for the session and token cookies.
    ///
    /// An unknown stored role degrades to viewer rather than failing.
    pub fn claims(&self) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: self.user_id.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            role: Role::parse(&self.role).unwrap_or(Role::Viewer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_role(role: &str) -> User {
        User {
            id: Uuid::new_v4(),
            user_id: "jdoe".into(),
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: "jdoe@example.com".into(),
            password_hash: "$argon2id$...".into(),
            phone: None,
            role: role.into(),
            protected: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_claims_never_carry_the_hash() {
        let claims = user_with_role("contributor").claims();
        assert_eq!(claims.user_id, "jdoe");
        assert_eq!(claims.role, Role::Contributor);
        let json = serde_json::to_string(&claims).unwrap();
        assert!(!json.contains("argon2"));
    }

    #[test]
    fn test_unknown_role_degrades_to_viewer() {
        assert_eq!(user_with_role("root").claims().role, Role::Viewer);
    }
}
