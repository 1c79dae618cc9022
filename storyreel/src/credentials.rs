//! Credential and session state.
//!
//! The core never sees a vendor token client; it observes an
//! "authenticated" flag and requests a currently-valid access token on
//! demand through the [`TokenProvider`] capability.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::errors::{Result, StoryreelError};

/// Minimal capability interface over a third-party sign-in session.
pub trait TokenProvider: Send + Sync {
    /// Returns true if a user is currently signed in.
    fn is_authenticated(&self) -> bool;

    /// Returns a currently-valid access token, or a precondition error if
    /// the user is not signed in.
    fn access_token(&self) -> Result<String>;
}

/// A token provider backed by an explicitly set token.
///
/// Suitable for tests and for embedders that manage sign-in themselves.
#[derive(Debug, Default)]
pub struct StaticTokenProvider {
    token: RwLock<Option<String>>,
}

impl StaticTokenProvider {
    /// Creates a provider with no token set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider holding the given token.
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }

    /// Sets the token after a sign-in.
    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write() = Some(token.into());
    }

    /// Clears the token after a sign-out.
    pub fn clear(&self) {
        *self.token.write() = None;
    }
}

impl TokenProvider for StaticTokenProvider {
    fn is_authenticated(&self) -> bool {
        self.token.read().is_some()
    }

    fn access_token(&self) -> Result<String> {
        self.token.read().clone().ok_or_else(|| {
            StoryreelError::precondition("access token not found, please sign in again")
        })
    }
}

/// Session-scoped flags shared between the presentation layer and the
/// pipeline.
///
/// A credential-invalid failure during a run clears the selected flag,
/// forcing re-selection before the next run.
#[derive(Debug, Default)]
pub struct Session {
    credential_selected: AtomicBool,
}

impl Session {
    /// Creates a session with no credential selected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a credential as selected.
    pub fn select_credential(&self) {
        self.credential_selected.store(true, Ordering::SeqCst);
    }

    /// Clears the selected credential.
    pub fn clear_credential(&self) {
        self.credential_selected.store(false, Ordering::SeqCst);
    }

    /// Returns true if a credential is currently selected.
    #[must_use]
    pub fn credential_selected(&self) -> bool {
        self.credential_selected.load(Ordering::SeqCst)
    }
}
