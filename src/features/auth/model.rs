use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Access tiers, highest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Contributor,
    Viewer,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Contributor, Role::Viewer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Contributor => "contributor",
            Role::Viewer => "viewer",
        }
    }

    pub fn parse(value: &str) -> Option<Role> {
        match value.trim().to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "contributor" => Some(Role::Contributor),
            "viewer" => Some(Role::Viewer),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Public claims of an authenticated user, held in the session store and in
/// the signed token cookie. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Uploads are limited to contributors and admins
    pub fn can_upload(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Contributor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse(" Contributor "), Some(Role::Contributor));
        assert_eq!(Role::parse("VIEWER"), Some(Role::Viewer));
        assert_eq!(Role::parse("superuser"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn test_upload_permission() {
        let mut user = AuthenticatedUser {
            user_id: "u".into(),
            first_name: "A".into(),
            last_name: "B".into(),
            email: "u@example.com".into(),
            role: Role::Viewer,
        };
        assert!(!user.can_upload());
        user.role = Role::Contributor;
        assert!(user.can_upload());
        user.role = Role::Admin;
        assert!(user.can_upload());
        assert!(user.is_admin());
    }
}
