//! Account service: signup, signin and profile.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use aerodict_common::{AppError, AppResult, IdGenerator};
use aerodict_db::{entities::user, repositories::UserRepository};
use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use tracing::info;
use validator::{Validate, ValidateEmail};

/// Input for creating an account.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupInput {
    #[validate(length(min = 1, max = 150))]
    pub username: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(length(max = 150))]
    #[serde(default)]
    pub first_name: String,

    #[validate(length(max = 150))]
    #[serde(default)]
    pub last_name: String,

    #[validate(email)]
    pub email: Option<String>,
}

/// Input for updating the profile. The username cannot be changed.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
    #[validate(length(max = 150))]
    pub first_name: Option<String>,

    #[validate(length(max = 150))]
    pub last_name: Option<String>,

    /// An empty string clears the address.
    pub email: Option<String>,
}

/// Account service for business logic.
#[derive(Clone)]
pub struct AccountService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl AccountService {
    /// Create a new account service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create an account. The very first account becomes an administrator.
    pub async fn signup(&self, input: SignupInput) -> AppResult<user::Model> {
        input.validate()?;

        let username = input.username.trim().to_string();
        if username.is_empty() || username.chars().any(char::is_whitespace) {
            return Err(AppError::Validation(
                "Username must not contain spaces".to_string(),
            ));
        }

        if self.user_repo.find_by_username(&username).await?.is_some() {
            return Err(AppError::Conflict("Username already taken".to_string()));
        }

        let is_admin = self.user_repo.count().await? == 0;
        let password_hash = hash_password(&input.password)?;

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username_lower: Set(username.to_lowercase()),
            username: Set(username),
            password_hash: Set(password_hash),
            token: Set(self.id_gen.generate_token()),
            first_name: Set(input.first_name.trim().to_string()),
            last_name: Set(input.last_name.trim().to_string()),
            email: Set(clean_email(input.email)),
            is_admin: Set(is_admin),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let user = self.user_repo.create(model).await?;
        info!(user_id = %user.id, is_admin, "Account created");
        Ok(user)
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Authenticate a user by token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Authenticate a user by username and password.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        Ok(user)
    }

    /// Replace a user's token, invalidating the old one.
    pub async fn regenerate_token(&self, user_id: &str) -> AppResult<String> {
        let user = self.user_repo.get_by_id(user_id).await?;
        let new_token = self.id_gen.generate_token();

        let mut active: user::ActiveModel = user.into();
        active.token = Set(new_token.clone());
        active.updated_at = Set(Some(Utc::now().into()));

        self.user_repo.update(active).await?;

        Ok(new_token)
    }

    /// Update profile fields.
    pub async fn update_profile(
        &self,
        user_id: &str,
        input: UpdateProfileInput,
    ) -> AppResult<user::Model> {
        input.validate()?;

        let user = self.user_repo.get_by_id(user_id).await?;
        let mut active: user::ActiveModel = user.into();

        if let Some(first_name) = input.first_name {
            active.first_name = Set(first_name.trim().to_string());
        }
        if let Some(last_name) = input.last_name {
            active.last_name = Set(last_name.trim().to_string());
        }
        if let Some(email) = input.email {
            let email = clean_email(Some(email));
            if let Some(address) = &email
                && !address.validate_email()
            {
                return Err(AppError::Validation("Invalid email address".to_string()));
            }
            active.email = Set(email);
        }

        active.updated_at = Set(Some(Utc::now().into()));

        self.user_repo.update(active).await
    }
}

fn clean_email(email: Option<String>) -> Option<String> {
    email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn stored_user(password: &str) -> user::Model {
        user::Model {
            id: "u1".to_string(),
            username: "Pilot".to_string(),
            username_lower: "pilot".to_string(),
            password_hash: hash_password(password).unwrap(),
            token: "tok".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            email: None,
            is_admin: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }

    #[tokio::test]
    async fn test_authenticate_rejects_wrong_password() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[stored_user("secret-pass")]])
                .into_connection(),
        );

        let service = AccountService::new(UserRepository::new(db));
        let result = service.authenticate("pilot", "not-the-pass").await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_authenticate_accepts_right_password() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[stored_user("secret-pass")]])
                .into_connection(),
        );

        let service = AccountService::new(UserRepository::new(db));
        let user = service.authenticate("PILOT", "secret-pass").await.unwrap();
        assert_eq!(user.id, "u1");
    }

    #[tokio::test]
    async fn test_signup_rejects_short_password() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = AccountService::new(UserRepository::new(db));

        let result = service
            .signup(SignupInput {
                username: "pilot".to_string(),
                password: "short".to_string(),
                first_name: String::new(),
                last_name: String::new(),
                email: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_clean_email() {
        assert_eq!(clean_email(Some("  ".to_string())), None);
        assert_eq!(
            clean_email(Some(" a@b.co ".to_string())).as_deref(),
            Some("a@b.co")
        );
    }
}
