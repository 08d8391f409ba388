use std::sync::Arc;
use tracing::info;

use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::RegisterForm;
use crate::features::auth::model::{AuthenticatedUser, Role};
use crate::features::auth::password;
use crate::features::users::services::{NewUser, UserService};
use crate::modules::mailer::Mailer;
use crate::shared::validation::PHONE_REGEX;

/// Every registration outcome is a normal result the page renders; only
/// infrastructure failures become errors.
#[derive(Debug)]
pub enum RegisterOutcome {
    UserIdTaken,
    EmailTaken,
    PasswordMismatch,
    InvalidPhone,
    Created(AuthenticatedUser),
}

#[derive(Debug)]
pub enum LoginOutcome {
    UserNotFound,
    WrongPassword,
    Success(AuthenticatedUser),
}

pub struct AuthService {
    users: Arc<UserService>,
    mailer: Arc<Mailer>,
}

impl AuthService {
    pub fn new(users: Arc<UserService>, mailer: Arc<Mailer>) -> Self {
        Self { users, mailer }
    }

    /// Register a new account.
    ///
    /// Checks run in a fixed order: id/email conflicts first, then the
    /// password confirmation, then the phone format. Two registrations racing
    /// past the lookups are settled by the unique constraints, surfaced as
    /// the same conflict outcomes.
    pub async fn register(&self, form: &RegisterForm) -> Result<RegisterOutcome> {
        if self.users.find_by_user_id(&form.userid).await?.is_some() {
            return Ok(RegisterOutcome::UserIdTaken);
        }
        if self.users.find_by_email(&form.email).await?.is_some() {
            return Ok(RegisterOutcome::EmailTaken);
        }
        if form.password != form.confirm_pass {
            return Ok(RegisterOutcome::PasswordMismatch);
        }
        if let Some(phone) = form.phone_value() {
            if !PHONE_REGEX.is_match(phone) {
                return Ok(RegisterOutcome::InvalidPhone);
            }
        }

        let password_hash = password::hash_password(&form.password)?;
        let role = form
            .role
            .as_deref()
            .and_then(Role::parse)
            .unwrap_or(Role::Contributor);

        let new_user = NewUser {
            user_id: form.userid.clone(),
            first_name: form.first_name.clone(),
            last_name: form.last_name.clone(),
            email: form.email.clone(),
            password_hash,
            phone: form.phone_value().map(str::to_string),
            role,
            protected: false,
        };

        let user = match self.users.create(new_user).await {
            Ok(user) => user,
            // Lost a race with a concurrent registration
            Err(AppError::Conflict(constraint)) => {
                return Ok(if constraint.contains("email") {
                    RegisterOutcome::EmailTaken
                } else {
                    RegisterOutcome::UserIdTaken
                });
            }
            Err(e) => return Err(e),
        };

        info!("Registration completed for user {}", user.user_id);

        self.mailer.send_best_effort(
            &user.email,
            "Welcome to EDMS",
            format!(
                "Hello {}, your EDMS account \"{}\" is ready.",
                user.first_name, user.user_id
            ),
        );

        Ok(RegisterOutcome::Created(user.claims()))
    }

    /// Check credentials against the stored hash
    pub async fn login(&self, userid: &str, plaintext: &str) -> Result<LoginOutcome> {
        let Some(user) = self.users.find_by_user_id(userid).await? else {
            return Ok(LoginOutcome::UserNotFound);
        };

        if !password::verify_password(&user.password_hash, plaintext) {
            return Ok(LoginOutcome::WrongPassword);
        }

        info!("Login succeeded for user {}", user.user_id);
        Ok(LoginOutcome::Success(user.claims()))
    }
}
