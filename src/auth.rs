//! Auth state: who is logged in, and the login-or-register check.
//!
//! Passwords are compared and stored in plaintext. There is no account
//! security here, only per-user separation of task lists.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::persist;
use crate::storage::KvStore;

pub const USERNAME_REQUIRED: &str = "Username is required";
pub const PASSWORD_REQUIRED: &str = "Password is required";

/// Stored credential record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    username: String,
    password: String,
}

/// Which login fields were left blank
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MissingFields {
    pub username: bool,
    pub password: bool,
}

impl MissingFields {
    pub fn check(username: &str, password: &str) -> Self {
        Self {
            username: username.trim().is_empty(),
            password: password.trim().is_empty(),
        }
    }

    /// Message for the notification; the password message wins when both are blank
    pub fn message(self) -> Option<&'static str> {
        if self.password {
            Some(PASSWORD_REQUIRED)
        } else if self.username {
            Some(USERNAME_REQUIRED)
        } else {
            None
        }
    }
}

impl Credentials {
    /// Validate raw form input; the username is trimmed, the password kept as typed
    pub fn parse(username: &str, password: &str) -> Result<Self> {
        let missing = MissingFields::check(username, password);
        if let Some(message) = missing.message() {
            return Err(Error::Validation(message.to_string()));
        }
        Ok(Self {
            username: username.trim().to_string(),
            password: password.to_string(),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    fn password_matches(&self, other: &Credentials) -> bool {
        self.password == other.password
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginOutcome {
    /// First login with this username; a credential record was written
    Registered,
    LoggedIn,
}

/// Check `credentials` against the store, registering unseen usernames.
///
/// A password mismatch returns [`Error::InvalidCredentials`] and writes
/// nothing.
pub fn authenticate<S: KvStore>(store: &mut S, credentials: &Credentials) -> Result<LoginOutcome> {
    match persist::load_credential(store, credentials.username())? {
        Some(stored) if stored.password_matches(credentials) => Ok(LoginOutcome::LoggedIn),
        Some(_) => {
            tracing::debug!(user = credentials.username(), "password mismatch");
            Err(Error::InvalidCredentials)
        }
        None => {
            persist::save_credential(store, credentials)?;
            tracing::debug!(user = credentials.username(), "registered new user");
            Ok(LoginOutcome::Registered)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthIntent {
    Login(String),
    Logout,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    user: Option<String>,
}

impl AuthState {
    pub fn new(user: Option<String>) -> Self {
        Self { user }
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn apply(&self, intent: AuthIntent) -> AuthState {
        match intent {
            AuthIntent::Login(user) => AuthState { user: Some(user) },
            AuthIntent::Logout => AuthState { user: None },
        }
    }
}
