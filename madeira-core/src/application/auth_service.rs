use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::data::reset_code_repository::ResetCodeRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::plan::{PlanInfo, PlanKind, PlanRecord};
use crate::domain::reset_code::ResetCode;
use crate::domain::user::User;
use crate::infrastructure::clock::Clock;
use crate::infrastructure::security::{generate_reset_code, hash_password, verify_password};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Plan catalog entry joined with the user's current window.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDetails {
    #[serde(flatten)]
    pub info: PlanInfo,
    #[serde(flatten)]
    pub record: PlanRecord,
    pub active: bool,
    pub days_left: i64,
}

#[derive(Clone)]
pub struct AuthService<U, C>
where
    U: UserRepository + 'static,
    C: ResetCodeRepository + 'static,
{
    users: Arc<U>,
    codes: Arc<C>,
    clock: Arc<dyn Clock>,
}

impl<U, C> AuthService<U, C>
where
    U: UserRepository + 'static,
    C: ResetCodeRepository + 'static,
{
    pub fn new(users: Arc<U>, codes: Arc<C>, clock: Arc<dyn Clock>) -> Self {
        Self { users, codes, clock }
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User, DomainError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or(DomainError::UserNotFound(id))
    }

    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        email: String,
        password: String,
        name: String,
    ) -> Result<User, DomainError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::Validation("name is required".into()));
        }
        let email = normalize_email(&email)?;
        validate_password(&password)?;

        let hash =
            hash_password(&password).map_err(|err| DomainError::Internal(err.to_string()))?;
        let mut user = User::new(email, hash, name, self.clock.now());
        user.is_logged_in = true;
        let user = self.users.create(user).await?;
        self.users.set_current_user_id(Some(user.id)).await?;
        Ok(user)
    }

    /// A lapsed free trial is downgraded to `expired` and the login refused.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<User, DomainError> {
        let email = email.trim().to_lowercase();
        let mut user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(DomainError::InvalidCredentials)?;

        let valid = verify_password(password, &user.password_hash)
            .map_err(|_| DomainError::InvalidCredentials)?;
        if !valid {
            warn!(email = %email, "wrong password");
            return Err(DomainError::InvalidCredentials);
        }

        let now = self.clock.now();
        if user.plan.is_lapsed_trial(now) {
            user.plan = PlanRecord::expired();
            self.users.update(&user).await?;
            warn!(user_id = %user.id, "free trial expired");
            return Err(DomainError::PlanExpired);
        }

        user.last_login_at = Some(now);
        user.is_logged_in = true;
        self.users.update(&user).await?;
        self.users.set_current_user_id(Some(user.id)).await?;
        info!(user_id = %user.id, "logged in");
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), DomainError> {
        for mut user in self.users.list().await? {
            if user.is_logged_in {
                user.is_logged_in = false;
                self.users.update(&user).await?;
            }
        }
        self.users.set_current_user_id(None).await
    }

    pub async fn current_user(&self) -> Result<Option<User>, DomainError> {
        let Some(id) = self.users.current_user_id().await? else {
            return Ok(None);
        };
        self.users.find_by_id(id).await
    }

    /// Current user or `Unauthorized`.
    pub async fn require_user(&self) -> Result<User, DomainError> {
        self.current_user().await?.ok_or(DomainError::Unauthorized)
    }

    #[instrument(skip(self))]
    pub async fn update_plan(&self, user_id: Uuid, plan_key: &str) -> Result<User, DomainError> {
        let kind: PlanKind = plan_key.parse()?;
        let mut user = self.get_user(user_id).await?;
        user.plan = PlanRecord::starting(kind, self.clock.now());
        self.users.update(&user).await?;
        info!(user_id = %user_id, plan = %kind, "plan updated");
        Ok(user)
    }

    pub fn is_plan_active(&self, user: &User) -> bool {
        user.plan.is_active(self.clock.now())
    }

    pub fn plan_details(&self, user: &User) -> PlanDetails {
        let now = self.clock.now();
        PlanDetails {
            info: user.plan.kind.info().clone(),
            record: user.plan.clone(),
            active: user.plan.is_active(now),
            days_left: user.plan.days_left(now),
        }
    }

    /// Stores a fresh code for the account and hands it back to the caller.
    #[instrument(skip(self))]
    pub async fn request_password_reset(&self, email: &str) -> Result<String, DomainError> {
        let email = email.trim().to_lowercase();
        if self.users.find_by_email(&email).await?.is_none() {
            return Err(DomainError::EmailNotFound(email));
        }
        let code = generate_reset_code();
        self.codes
            .put(&email, ResetCode::new(code.clone(), self.clock.now()))
            .await?;
        info!(email = %email, "password reset requested");
        Ok(code)
    }

    #[instrument(skip(self, code, new_password))]
    pub async fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), DomainError> {
        let email = email.trim().to_lowercase();
        let mut pending = self
            .codes
            .find(&email)
            .await?
            .ok_or_else(|| DomainError::NoPendingReset(email.clone()))?;

        if pending.is_expired(self.clock.now()) {
            self.codes.remove(&email).await?;
            return Err(DomainError::ResetCodeExpired);
        }
        if pending.is_exhausted() {
            self.codes.remove(&email).await?;
            return Err(DomainError::TooManyAttempts);
        }
        if pending.code != code.trim() {
            pending.attempts += 1;
            let remaining = pending.remaining_attempts();
            self.codes.put(&email, pending).await?;
            warn!(email = %email, remaining, "wrong reset code");
            return Err(DomainError::InvalidResetCode { remaining });
        }

        validate_password(new_password)?;
        let mut user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| DomainError::EmailNotFound(email.clone()))?;
        user.password_hash =
            hash_password(new_password).map_err(|err| DomainError::Internal(err.to_string()))?;
        self.users.update(&user).await?;
        self.codes.remove(&email).await?;
        info!(user_id = %user.id, "password reset");
        Ok(())
    }

    #[instrument(skip(self, current, new_password))]
    pub async fn change_password(
        &self,
        user_id: Uuid,
        current: &str,
        new_password: &str,
    ) -> Result<(), DomainError> {
        let mut user = self.get_user(user_id).await?;
        let valid = verify_password(current, &user.password_hash)
            .map_err(|_| DomainError::InvalidCredentials)?;
        if !valid {
            return Err(DomainError::InvalidCredentials);
        }
        validate_password(new_password)?;
        user.password_hash =
            hash_password(new_password).map_err(|err| DomainError::Internal(err.to_string()))?;
        self.users.update(&user).await?;
        info!(user_id = %user_id, "password changed");
        Ok(())
    }
}

fn normalize_email(email: &str) -> Result<String, DomainError> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(email)
    } else {
        Err(DomainError::Validation(format!("invalid email: {email}")))
    }
}

fn validate_password(password: &str) -> Result<(), DomainError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::Validation(format!(
            "password must have at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}
