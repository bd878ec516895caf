//! Auth errors.

use thiserror::Error;

/// Errors returned by an [`AuthProvider`](super::AuthProvider).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// The email address is not plausibly an address.
    #[error("invalid email address")]
    InvalidEmail,

    /// The password is shorter than the provider minimum.
    #[error("password must be at least {min} characters")]
    WeakPassword {
        /// Minimum length in characters
        min: usize,
    },

    /// An account with this email already exists.
    #[error("an account with this email already exists")]
    EmailTaken,

    /// Unknown email or wrong password.
    #[error("invalid login credentials")]
    InvalidCredentials,

    /// There is no signed-in session.
    #[error("no active session")]
    NoActiveSession,
}
