//! Auth service.

use jiff::Timestamp;
#[cfg(test)]
use mockall::automock;
use rustc_hash::FxHashMap;
use tracing::{info, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::auth::{Actor, AuthError, Credentials, Session};

/// Minimum password length accepted on signup.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Identity provider capability used by the till.
#[cfg_attr(test, automock)]
pub trait AuthProvider {
    /// Sign in and make the resulting session current.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown email or wrong password.
    fn login(&mut self, credentials: &Credentials) -> Result<Session, AuthError>;

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is invalid or taken, or the password is too short.
    fn signup(&mut self, credentials: &Credentials) -> Result<Actor, AuthError>;

    /// End the current session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NoActiveSession`] if nobody is signed in.
    fn logout(&mut self) -> Result<(), AuthError>;

    /// The current session, if any.
    fn current_session(&self) -> Option<Session>;
}

#[derive(Debug)]
struct Account {
    actor: Actor,
    password: Zeroizing<String>,
}

/// Process-local identity provider.
///
/// Accounts and the current session live only as long as the provider value.
#[derive(Debug, Default)]
pub struct InMemoryAuthProvider {
    accounts: FxHashMap<String, Account>,
    current: Option<Session>,
}

impl InMemoryAuthProvider {
    /// Create a provider with no accounts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered accounts.
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }
}

impl AuthProvider for InMemoryAuthProvider {
    fn login(&mut self, credentials: &Credentials) -> Result<Session, AuthError> {
        let email = normalize_email(credentials.email());

        let account = self
            .accounts
            .get(&email)
            .filter(|account| account.password.as_bytes() == credentials.password().as_bytes())
            .ok_or_else(|| {
                warn!("login rejected");

                AuthError::InvalidCredentials
            })?;

        let session = Session {
            token: Uuid::now_v7(),
            actor: account.actor.clone(),
            started_at: Timestamp::now(),
        };

        info!(user = %session.actor.user_id, "signed in");

        self.current = Some(session.clone());

        Ok(session)
    }

    fn signup(&mut self, credentials: &Credentials) -> Result<Actor, AuthError> {
        let email = normalize_email(credentials.email());

        if !is_plausible_email(&email) {
            return Err(AuthError::InvalidEmail);
        }

        if credentials.password().chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword {
                min: MIN_PASSWORD_LEN,
            });
        }

        if self.accounts.contains_key(&email) {
            return Err(AuthError::EmailTaken);
        }

        let actor = Actor {
            user_id: Uuid::now_v7(),
            email: email.clone(),
        };

        info!(user = %actor.user_id, "account created");

        self.accounts.insert(
            email,
            Account {
                actor: actor.clone(),
                password: Zeroizing::new(credentials.password().to_string()),
            },
        );

        Ok(actor)
    }

    fn logout(&mut self) -> Result<(), AuthError> {
        let session = self.current.take().ok_or(AuthError::NoActiveSession)?;

        info!(user = %session.actor.user_id, "signed out");

        Ok(())
    }

    fn current_session(&self) -> Option<Session> {
        self.current.clone()
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn is_plausible_email(email: &str) -> bool {
    email
        .split_once('@')
        .is_some_and(|(local, domain)| {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
                && !domain.contains('@')
        })
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn credentials() -> Credentials {
        Credentials::new("Owner@Shop.example", "hunter22")
    }

    #[test]
    fn signup_then_login_creates_session() -> TestResult {
        let mut auth = InMemoryAuthProvider::new();

        let actor = auth.signup(&credentials())?;
        let session = auth.login(&Credentials::new(" owner@shop.example ", "hunter22"))?;

        assert_eq!(actor.email, "owner@shop.example");
        assert_eq!(session.actor, actor);
        assert_eq!(auth.current_session(), Some(session));

        Ok(())
    }

    #[test]
    fn wrong_password_is_rejected() -> TestResult {
        let mut auth = InMemoryAuthProvider::new();
        auth.signup(&credentials())?;

        let result = auth.login(&Credentials::new("owner@shop.example", "hunter23"));

        assert_eq!(result, Err(AuthError::InvalidCredentials));
        assert_eq!(auth.current_session(), None);

        Ok(())
    }

    #[test]
    fn unknown_email_is_rejected() {
        let mut auth = InMemoryAuthProvider::new();

        assert_eq!(
            auth.login(&credentials()),
            Err(AuthError::InvalidCredentials)
        );
    }

    #[test]
    fn signup_validates_input() -> TestResult {
        let mut auth = InMemoryAuthProvider::new();

        assert_eq!(
            auth.signup(&Credentials::new("not-an-email", "hunter22")),
            Err(AuthError::InvalidEmail)
        );
        assert_eq!(
            auth.signup(&Credentials::new("a@b.example", "12345")),
            Err(AuthError::WeakPassword { min: 6 })
        );

        auth.signup(&credentials())?;

        assert_eq!(auth.signup(&credentials()), Err(AuthError::EmailTaken));
        assert_eq!(auth.account_count(), 1);

        Ok(())
    }

    #[test]
    fn logout_clears_session() -> TestResult {
        let mut auth = InMemoryAuthProvider::new();
        auth.signup(&credentials())?;
        auth.login(&credentials())?;

        auth.logout()?;

        assert_eq!(auth.current_session(), None);
        assert_eq!(auth.logout(), Err(AuthError::NoActiveSession));

        Ok(())
    }

    #[test]
    fn credentials_debug_redacts_password() {
        let rendered = format!("{:?}", credentials());

        assert!(!rendered.contains("hunter22"), "password leaked: {rendered}");
    }
}
