//! Sign-in, registration and profile maintenance.

use std::{fmt, sync::Arc};

use thiserror::Error;
use tracing::{info, warn};

use storefront::{checkout::ProfilePatch, payments::is_valid_email, users::User};

use crate::{
    api::{ApiError, CommerceApi, Credentials, NewAccount, PasswordChange},
    cart::CartStore,
    session::{AccessToken, SessionStore},
};

/// Shortest password the backend accepts.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Account and profile failures.
#[derive(Debug, Error)]
pub enum AccountError {
    /// No one is signed in
    #[error("Sign in to continue")]
    LoginRequired,

    /// The email does not look like `local@domain.tld`
    #[error("Enter a valid email address")]
    InvalidEmail,

    /// The current password was left blank
    #[error("Enter your current password")]
    MissingCurrentPassword,

    /// The new password is shorter than [`MIN_PASSWORD_LEN`]
    #[error("The new password must be at least {MIN_PASSWORD_LEN} characters")]
    PasswordTooShort,

    /// The new password and its confirmation differ
    #[error("The new passwords do not match")]
    PasswordMismatch,

    /// The backend call failed
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Sign-in, registration and profile changes for the current session.
#[derive(Clone)]
pub struct AccountService {
    api: Arc<dyn CommerceApi>,
    session: SessionStore,
    cart: CartStore,
}

impl fmt::Debug for AccountService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountService")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl AccountService {
    /// Service over the shared session and cart.
    #[must_use]
    pub fn new(api: Arc<dyn CommerceApi>, session: SessionStore, cart: CartStore) -> Self {
        Self { api, session, cart }
    }

    /// Sign in and adopt the server cart.
    ///
    /// # Errors
    ///
    /// Returns the backend error when the credentials are rejected.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AccountError> {
        let response = self
            .api
            .login(Credentials {
                email: email.trim().to_string(),
                password: password.to_string(),
            })
            .await?;

        self.establish(response.user.clone(), AccessToken::new(&*response.access_token))
            .await;

        Ok(response.user)
    }

    /// Create an account and sign it in.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::InvalidEmail`] for a malformed email, otherwise the backend
    /// error when registration fails.
    pub async fn register(&self, account: NewAccount) -> Result<User, AccountError> {
        if !is_valid_email(&account.email) {
            return Err(AccountError::InvalidEmail);
        }

        let response = self.api.register(account).await?;

        self.establish(response.user.clone(), AccessToken::new(&*response.access_token))
            .await;

        Ok(response.user)
    }

    /// Re-fetch the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::LoginRequired`] when signed out, otherwise the backend error.
    pub async fn refresh_profile(&self) -> Result<User, AccountError> {
        self.require_session()?;

        let user = self.api.current_user().await?;

        self.session.update_user(user.clone());

        Ok(user)
    }

    /// Apply a profile update.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::InvalidEmail`] when the patch carries a malformed email,
    /// otherwise the backend error.
    pub async fn update_profile(&self, patch: ProfilePatch) -> Result<User, AccountError> {
        self.require_session()?;

        if patch
            .email
            .as_deref()
            .is_some_and(|email| !is_valid_email(email))
        {
            return Err(AccountError::InvalidEmail);
        }

        let user = self.api.update_current_user(patch).await?;

        self.session.update_user(user.clone());

        Ok(user)
    }

    /// Change the password after checking the form locally.
    ///
    /// # Errors
    ///
    /// Returns the first failing form check, otherwise the backend error.
    pub async fn change_password(
        &self,
        current: &str,
        new: &str,
        confirmation: &str,
    ) -> Result<(), AccountError> {
        self.require_session()?;

        if current.is_empty() {
            return Err(AccountError::MissingCurrentPassword);
        }

        if new.chars().count() < MIN_PASSWORD_LEN {
            return Err(AccountError::PasswordTooShort);
        }

        if new != confirmation {
            return Err(AccountError::PasswordMismatch);
        }

        self.api
            .change_password(PasswordChange {
                current_password: current.to_string(),
                new_password: new.to_string(),
            })
            .await?;

        Ok(())
    }

    /// Forget the session. The local cart is kept.
    pub fn logout(&self) {
        self.session.logout();

        info!("signed out");
    }

    fn require_session(&self) -> Result<(), AccountError> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            Err(AccountError::LoginRequired)
        }
    }

    async fn establish(&self, user: User, token: AccessToken) {
        info!(user = user.id, "signed in");

        self.session.set_auth(user, token);

        if let Err(error) = self.cart.sync_from_backend().await {
            warn!(%error, "failed to adopt server cart after sign-in");
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::{
        api::{AuthResponse, MockCommerceApi, ServerCart},
        storage::MemoryStorage,
        test::helpers::user,
    };

    fn service(api: MockCommerceApi) -> AccountService {
        let storage = Arc::new(MemoryStorage::new());
        let session = SessionStore::load(storage.clone());
        let api: Arc<dyn CommerceApi> = Arc::new(api);
        let cart = CartStore::load(storage, session.clone(), api.clone());

        AccountService::new(api, session, cart)
    }

    #[tokio::test]
    async fn login_sets_auth_and_adopts_server_cart() -> TestResult {
        let mut api = MockCommerceApi::new();

        api.expect_login()
            .once()
            .withf(|credentials| credentials.email == "ada@example.com")
            .returning(|_| {
                Ok(AuthResponse {
                    access_token: "token-1".to_string(),
                    user: user(),
                })
            });

        api.expect_cart().once().returning(|| Ok(ServerCart::default()));

        let service = service(api);

        let signed_in = service.login(" ada@example.com ", "secret1").await?;

        assert_eq!(signed_in, user());
        assert_eq!(service.session.token(), Some(AccessToken::new("token-1")));

        Ok(())
    }

    #[tokio::test]
    async fn rejected_login_stays_signed_out() {
        let mut api = MockCommerceApi::new();

        api.expect_login()
            .once()
            .returning(|_| Err(ApiError::backend(401, "Unauthorized")));

        let service = service(api);

        assert!(matches!(
            service.login("ada@example.com", "wrong").await,
            Err(AccountError::Api(_))
        ));
        assert!(!service.session.is_authenticated());
    }

    #[tokio::test]
    async fn password_form_is_checked_before_calling_the_backend() {
        let mut api = MockCommerceApi::new();

        api.expect_change_password().never();

        let service = service(api);
        service.session.set_auth(user(), AccessToken::new("token-1"));

        assert!(matches!(
            service.change_password("", "secret1", "secret1").await,
            Err(AccountError::MissingCurrentPassword)
        ));
        assert!(matches!(
            service.change_password("old", "short", "short").await,
            Err(AccountError::PasswordTooShort)
        ));
        assert!(matches!(
            service.change_password("old", "secret1", "secret2").await,
            Err(AccountError::PasswordMismatch)
        ));
    }

    #[tokio::test]
    async fn valid_password_change_reaches_the_backend() -> TestResult {
        let mut api = MockCommerceApi::new();

        api.expect_change_password()
            .once()
            .withf(|change| change.current_password == "old" && change.new_password == "secret1")
            .returning(|_| Ok(()));

        let service = service(api);
        service.session.set_auth(user(), AccessToken::new("token-1"));

        service.change_password("old", "secret1", "secret1").await?;

        Ok(())
    }

    #[tokio::test]
    async fn profile_update_rejects_malformed_email() {
        let mut api = MockCommerceApi::new();

        api.expect_update_current_user().never();

        let service = service(api);
        service.session.set_auth(user(), AccessToken::new("token-1"));

        let patch = ProfilePatch {
            email: Some("not-an-email".to_string()),
            ..ProfilePatch::default()
        };

        assert!(matches!(
            service.update_profile(patch).await,
            Err(AccountError::InvalidEmail)
        ));
    }

    #[tokio::test]
    async fn refresh_updates_the_session_user() -> TestResult {
        let mut refreshed = user();
        refreshed.phone = Some("+39 333 7654321".to_string());

        let expected = refreshed.clone();
        let mut api = MockCommerceApi::new();

        api.expect_current_user()
            .once()
            .return_once(move || Ok(refreshed));

        api.expect_update_current_user().never();

        let service = service(api);
        service.session.set_auth(user(), AccessToken::new("token-1"));

        service.refresh_profile().await?;

        assert_eq!(service.session.user(), Some(expected));
        assert_eq!(service.session.token(), Some(AccessToken::new("token-1")));

        Ok(())
    }

    #[tokio::test]
    async fn signed_out_profile_calls_require_login() {
        let service = service(MockCommerceApi::new());

        assert!(matches!(
            service.refresh_profile().await,
            Err(AccountError::LoginRequired)
        ));
    }
}
