use sqlx::PgPool;
use tracing::{info, warn};

use crate::core::config::BootstrapConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::Role;
use crate::features::auth::password;
use crate::features::users::models::User;
use crate::shared::constants::{SYSTEM_ADMIN, SYSTEM_CONTRIBUTOR, SYSTEM_VIEWER};

/// Fields of a user record to insert
#[derive(Debug)]
pub struct NewUser {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub role: Role,
    pub protected: bool,
}

/// Repository for user accounts
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_user_id(&self, user_id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn list_all(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    /// Insert a new account. Uniqueness races surface as a conflict carrying
    /// the violated constraint name, so callers can tell id from email.
    pub async fn create(&self, new_user: NewUser) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (user_id, first_name, last_name, email, password_hash, phone, role, protected)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&new_user.user_id)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.phone)
        .bind(new_user.role.as_str())
        .bind(new_user.protected)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db) = e {
                if db.is_unique_violation() {
                    return AppError::Conflict(
                        db.constraint().unwrap_or("users_user_id_key").to_string(),
                    );
                }
            }
            AppError::Database(e)
        })?;

        info!("User created: user_id={}, role={}", user.user_id, user.role);
        Ok(user)
    }

    /// Change a user's role. Protected accounts are immutable.
    pub async fn set_role(&self, user_id: &str, role: Role) -> Result<User> {
        let target = self
            .find_by_user_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User '{}' not found", user_id)))?;

        if target.protected {
            return Err(AppError::Forbidden(
                "Protected system accounts cannot be modified".to_string(),
            ));
        }

        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET role = $2, updated_at = NOW() WHERE user_id = $1 RETURNING *",
        )
        .bind(user_id)
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await?;

        info!("Role updated: user_id={}, role={}", user.user_id, user.role);
        Ok(user)
    }

    /// Remove a user record. File cleanup is the caller's responsibility.
    pub async fn delete(&self, user_id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User '{}' not found", user_id)));
        }

        info!("User deleted: user_id={}", user_id);
        Ok(())
    }

    /// Idempotently seed the three protected system accounts. Existing rows
    /// are left untouched.
    pub async fn seed_system_accounts(&self, bootstrap: &BootstrapConfig) -> Result<()> {
        let accounts: [(&str, Role, &str); 3] = [
            (SYSTEM_ADMIN, Role::Admin, &bootstrap.admin_password),
            (
                SYSTEM_CONTRIBUTOR,
                Role::Contributor,
                &bootstrap.contributor_password,
            ),
            (SYSTEM_VIEWER, Role::Viewer, &bootstrap.viewer_password),
        ];

        for (user_id, role, plaintext) in accounts {
            let password_hash = password::hash_password(plaintext)?;
            let result = sqlx::query(
                r#"
                INSERT INTO users (user_id, first_name, last_name, email, password_hash, role, protected)
                VALUES ($1, $2, $3, $4, $5, $6, TRUE)
                ON CONFLICT (user_id) DO NOTHING
                "#,
            )
            .bind(user_id)
            .bind("System")
            .bind(user_id)
            .bind(format!("{}@edms.local", user_id))
            .bind(&password_hash)
            .bind(role.as_str())
            .execute(&self.pool)
            .await?;

            if result.rows_affected() > 0 {
                info!("Seeded system account '{}' with role {}", user_id, role);
            }
        }

        if bootstrap.admin_password == "changeme" {
            warn!("System admin account is using the default password");
        }

        Ok(())
    }
}
