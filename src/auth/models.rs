//! Auth data models.

use std::fmt;

use jiff::Timestamp;
use uuid::Uuid;
use zeroize::Zeroizing;

/// Email and password pair submitted to log in or sign up.
#[derive(Clone)]
pub struct Credentials {
    email: String,
    password: Zeroizing<String>,
}

impl Credentials {
    /// Create credentials.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: Zeroizing::new(password.into()),
        }
    }

    /// Email as entered.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Password as entered.
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The authenticated person operating the till.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// Provider-assigned user id
    pub user_id: Uuid,

    /// Email address
    pub email: String,
}

/// A signed-in session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Opaque session token
    pub token: Uuid,

    /// Who is signed in
    pub actor: Actor,

    /// When the session started
    pub started_at: Timestamp,
}
