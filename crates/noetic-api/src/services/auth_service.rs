//! Authentication orchestration.
//!
//! Composes the identity stores, the session cache and the token primitives
//! into signup, login, logout, refresh rotation, email verification (with
//! resend) and password reset.
//!
//! Cache layout (the adapter adds its own global prefix):
//!
//! | Key                        | Value                      | TTL              |
//! |----------------------------|----------------------------|------------------|
//! | `email_verify:<token>`     | user id                    | one-time TTL     |
//! | `reset_pw:<token>`         | user id                    | one-time TTL     |
//! | `refresh_token:<user_id>`  | SHA-256 of refresh token   | refresh lifetime |
//! | `login_fail:<user_id>`     | failure count              | lockout window   |

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::FutureExt;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use noetic_core::defaults::{
    EMAIL_VERIFY_PREFIX, LOGIN_FAILED_LIMIT, LOGIN_FAIL_PREFIX, LOGIN_LOCKED_MINUTES,
    MIN_PASSWORD_LENGTH, ONE_TIME_TOKEN_MINUTES, REFRESH_TOKEN_EXPIRE_DAYS, REFRESH_TOKEN_PREFIX,
    RESET_PASSWORD_PREFIX,
};
use noetic_core::{
    AccessClaims, AuthProviderRepository, ClientInfo, CredentialRepository, Error, LoginResponse,
    NewUser, Notifier, Result, SessionCache, TokenPair, User, UserRepository, UserResponse,
    UserRole, EMAIL_PROVIDER,
};
use noetic_crypto::{
    generate_one_time_token, generate_refresh_token, hash_token, token_matches,
    AccessTokenIssuer, Argon2Hasher,
};

use super::notifier::{dispatch, password_reset_email, verification_email};
use super::saga::Saga;

/// Tunables for the auth flows.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub refresh_token_ttl: Duration,
    pub login_failed_limit: i64,
    /// Lockout window, armed on the first failure.
    pub login_locked: Duration,
    pub one_time_token_ttl: Duration,
    /// Base URL for links in outgoing emails.
    pub frontend_url: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            refresh_token_ttl: Duration::from_secs(REFRESH_TOKEN_EXPIRE_DAYS as u64 * 24 * 3600),
            login_failed_limit: LOGIN_FAILED_LIMIT,
            login_locked: Duration::from_secs(LOGIN_LOCKED_MINUTES as u64 * 60),
            one_time_token_ttl: Duration::from_secs(ONE_TIME_TOKEN_MINUTES as u64 * 60),
            frontend_url: noetic_core::defaults::FRONTEND_URL.to_string(),
        }
    }
}

/// Identity-side stores used by [`AuthService`].
#[derive(Clone)]
pub struct IdentityStores {
    pub users: Arc<dyn UserRepository>,
    pub credentials: Arc<dyn CredentialRepository>,
    pub providers: Arc<dyn AuthProviderRepository>,
}

/// Auth orchestrator.
#[derive(Clone)]
pub struct AuthService {
    stores: IdentityStores,
    cache: Arc<dyn SessionCache>,
    notifier: Arc<dyn Notifier>,
    tokens: AccessTokenIssuer,
    hasher: Argon2Hasher,
    settings: AuthSettings,
}

fn verify_key(token: &str) -> String {
    format!("{}{}", EMAIL_VERIFY_PREFIX, token)
}

fn reset_key(token: &str) -> String {
    format!("{}{}", RESET_PASSWORD_PREFIX, token)
}

fn refresh_key(user_id: Uuid) -> String {
    format!("{}{}", REFRESH_TOKEN_PREFIX, user_id)
}

fn login_fail_key(user_id: Uuid) -> String {
    format!("{}{}", LOGIN_FAIL_PREFIX, user_id)
}

fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(Error::InvalidInput(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

impl AuthService {
    pub fn new(
        stores: IdentityStores,
        cache: Arc<dyn SessionCache>,
        notifier: Arc<dyn Notifier>,
        tokens: AccessTokenIssuer,
        hasher: Argon2Hasher,
        settings: AuthSettings,
    ) -> Self {
        Self {
            stores,
            cache,
            notifier,
            tokens,
            hasher,
            settings,
        }
    }

    pub fn settings(&self) -> &AuthSettings {
        &self.settings
    }

    // =========================================================================
    // HASHING (blocking pool)
    // =========================================================================

    async fn hash_password(&self, password: &str) -> Result<String> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| Error::Internal(format!("Hashing task failed: {}", e)))?
            .map_err(Error::from)
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| Error::Internal(format!("Hashing task failed: {}", e)))?
            .map_err(Error::from)
    }

    // =========================================================================
    // SIGNUP
    // =========================================================================

    /// Register a new, unverified user and send the verification email.
    #[instrument(skip(self, password), fields(subsystem = "auth", op = "signup"))]
    pub async fn signup(&self, email: &str, password: &str, name: &str) -> Result<UserResponse> {
        let email = email.trim();
        let name = name.trim();
        if !email.contains('@') {
            return Err(Error::InvalidInput("Invalid email address".to_string()));
        }
        if name.is_empty() {
            return Err(Error::InvalidInput("Name must not be empty".to_string()));
        }
        validate_password(password)?;

        let password_hash = self.hash_password(password).await?;

        let user = self
            .stores
            .users
            .insert(NewUser {
                email: email.to_string(),
                name: name.to_string(),
                role: UserRole::User,
            })
            .await?;

        let mut saga = Saga::new("signup");
        let users = self.stores.users.clone();
        let user_id = user.id;
        saga.on_failure("delete_user", move || {
            async move { users.delete(user_id).await.map(|_| ()) }.boxed()
        });

        if let Err(e) = self.stores.credentials.insert(user.id, &password_hash).await {
            return Err(saga.abort(e).await);
        }
        if let Err(e) = self
            .stores
            .providers
            .insert(user.id, EMAIL_PROVIDER, &user.email)
            .await
        {
            return Err(saga.abort(e).await);
        }
        saga.commit();

        info!(user_id = %user.id, "User registered");

        if let Err(e) = self.send_verification(&user).await {
            warn!(user_id = %user.id, error = %e, "Failed to store verification token");
        }
        Ok(UserResponse::from(user))
    }

    /// Store a fresh verification token and dispatch the email.
    async fn send_verification(&self, user: &User) -> Result<()> {
        let token = generate_one_time_token();
        self.cache
            .set_ex(
                &verify_key(&token),
                &user.id.to_string(),
                self.settings.one_time_token_ttl,
            )
            .await?;
        dispatch(
            self.notifier.clone(),
            verification_email(
                &user.email,
                &self.settings.frontend_url,
                &token,
                self.settings.one_time_token_ttl,
            ),
        );
        Ok(())
    }

    // =========================================================================
    // LOGIN / LOGOUT / REFRESH
    // =========================================================================

    /// Authenticate with email and password, returning a fresh token pair.
    #[instrument(skip(self, password, client), fields(subsystem = "auth", op = "login"))]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        client: &ClientInfo,
    ) -> Result<LoginResponse> {
        let user = match self.stores.users.get_by_email(email.trim()).await? {
            Some(user) if user.is_active => user,
            _ => return Err(Error::InvalidCredentials),
        };

        let fail_key = login_fail_key(user.id);
        let failures = self
            .cache
            .get(&fail_key)
            .await?
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(0);
        if failures >= self.settings.login_failed_limit {
            debug!(user_id = %user.id, failed_attempts = failures, "Login rejected, account locked");
            return Err(Error::AccountLocked);
        }

        let credential = match self.stores.credentials.get_by_user_id(user.id).await? {
            Some(cred) if cred.is_active => cred,
            _ => return Err(Error::InvalidCredentials),
        };

        if !self
            .verify_password(password, &credential.password_hash)
            .await?
        {
            let count = self
                .cache
                .incr_with_expiry(&fail_key, self.settings.login_locked)
                .await?;
            info!(user_id = %user.id, failed_attempts = count, "Login failed");
            return Err(Error::InvalidCredentials);
        }

        self.cache.delete(&fail_key).await?;
        self.stores
            .providers
            .record_login(user.id, EMAIL_PROVIDER, Utc::now(), client)
            .await?;

        let pair = self.issue_pair(&user).await?;
        info!(user_id = %user.id, "Login succeeded");

        Ok(LoginResponse {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: pair.token_type,
            user: UserResponse::from(user),
        })
    }

    /// Mint an access token and a refresh token, binding the latter as the
    /// user's only valid one.
    async fn issue_pair(&self, user: &User) -> Result<TokenPair> {
        let access_token = self.tokens.issue(user)?;
        let refresh_token = generate_refresh_token();
        self.cache
            .set_ex(
                &refresh_key(user.id),
                &hash_token(&refresh_token),
                self.settings.refresh_token_ttl,
            )
            .await?;
        Ok(TokenPair::new(access_token, refresh_token))
    }

    /// Drop the user's refresh binding. Idempotent.
    #[instrument(skip(self), fields(subsystem = "auth", op = "logout"))]
    pub async fn logout(&self, user_id: Uuid) -> Result<()> {
        self.cache.delete(&refresh_key(user_id)).await?;
        debug!(user_id = %user_id, "Refresh binding removed");
        Ok(())
    }

    /// Exchange the current refresh token for a new pair. Single use.
    #[instrument(skip(self, refresh_token), fields(subsystem = "auth", op = "refresh"))]
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
        user_id: Uuid,
    ) -> Result<TokenPair> {
        let key = refresh_key(user_id);
        let bound = self
            .cache
            .get(&key)
            .await?
            .ok_or(Error::InvalidOrExpiredToken)?;
        if !token_matches(refresh_token, &bound) {
            return Err(Error::InvalidOrExpiredToken);
        }

        let user = match self.stores.users.get(user_id).await? {
            Some(user) => user,
            None => {
                self.cache.delete(&key).await?;
                return Err(Error::NotFound(format!("User {} not found", user_id)));
            }
        };

        self.issue_pair(&user).await
    }

    // =========================================================================
    // EMAIL VERIFICATION / PASSWORD RESET
    // =========================================================================

    /// Consume a verification token and mark its user verified.
    #[instrument(skip(self, token), fields(subsystem = "auth", op = "verify_email"))]
    pub async fn verify_email(&self, token: &str) -> Result<UserResponse> {
        let key = verify_key(token);
        let user_id = self.one_time_user_id(&key).await?;

        let user = self
            .stores
            .users
            .mark_verified(user_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("User {} not found", user_id)))?;
        self.cache.delete(&key).await?;

        info!(user_id = %user.id, "Email verified");
        Ok(UserResponse::from(user))
    }

    /// Issue a new verification link for an unverified account. Unknown
    /// and already-verified emails succeed without sending anything.
    #[instrument(skip(self, email), fields(subsystem = "auth", op = "resend_verification"))]
    pub async fn resend_verification(&self, email: &str) -> Result<()> {
        let Some(user) = self.stores.users.get_by_email(email.trim()).await? else {
            debug!("Verification resend requested for unknown email");
            return Ok(());
        };
        if user.is_verified {
            debug!(user_id = %user.id, "Verification resend skipped, already verified");
            return Ok(());
        }

        self.send_verification(&user).await?;
        info!(user_id = %user.id, "Verification token reissued");
        Ok(())
    }

    /// Send a reset link if the email belongs to a user. Always succeeds for
    /// unknown emails.
    #[instrument(skip(self, email), fields(subsystem = "auth", op = "request_password_reset"))]
    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        let Some(user) = self.stores.users.get_by_email(email.trim()).await? else {
            debug!("Password reset requested for unknown email");
            return Ok(());
        };

        let token = generate_one_time_token();
        self.cache
            .set_ex(
                &reset_key(&token),
                &user.id.to_string(),
                self.settings.one_time_token_ttl,
            )
            .await?;
        dispatch(
            self.notifier.clone(),
            password_reset_email(
                &user.email,
                &self.settings.frontend_url,
                &token,
                self.settings.one_time_token_ttl,
            ),
        );
        info!(user_id = %user.id, "Password reset token issued");
        Ok(())
    }

    /// Consume a reset token and replace the user's password.
    #[instrument(skip(self, token, new_password), fields(subsystem = "auth", op = "reset_password"))]
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<()> {
        validate_password(new_password)?;
        let key = reset_key(token);
        let user_id = self.one_time_user_id(&key).await?;

        let password_hash = self.hash_password(new_password).await?;
        let updated = self
            .stores
            .credentials
            .update_password(user_id, &password_hash, Utc::now())
            .await?;
        if !updated {
            return Err(Error::NotFound(format!("Credential for {} not found", user_id)));
        }
        self.cache.delete(&key).await?;

        // Sessions opened with the old password end here
        if let Err(e) = self.cache.delete(&refresh_key(user_id)).await {
            warn!(user_id = %user_id, error = %e, "Failed to revoke refresh binding after reset");
        }

        info!(user_id = %user_id, "Password reset");
        Ok(())
    }

    async fn one_time_user_id(&self, key: &str) -> Result<Uuid> {
        let value = self
            .cache
            .get(key)
            .await?
            .ok_or(Error::InvalidOrExpiredToken)?;
        Uuid::parse_str(&value).map_err(|_| Error::InvalidOrExpiredToken)
    }

    // =========================================================================
    // SESSION INSPECTION
    // =========================================================================

    /// Public view of a user.
    pub async fn current_user(&self, user_id: Uuid) -> Result<UserResponse> {
        self.stores
            .users
            .get(user_id)
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| Error::NotFound(format!("User {} not found", user_id)))
    }

    /// Validate an access token and return its claims.
    pub fn authenticate(&self, access_token: &str) -> Result<AccessClaims> {
        self.tokens.decode(access_token).map_err(Error::from)
    }
}
