//! Authentication
//!
//! The core only needs a stable user id to stamp on expenses as the
//! spender. [`AuthProvider`] is the seam; [`LocalAuthProvider`] is the
//! file-backed implementation used by the CLI.

mod local;

pub use local::LocalAuthProvider;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{HearthError, HearthResult};
use crate::models::UserId;

/// A signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
}

impl fmt::Display for UserIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.display_name, self.email)
    }
}

/// Identity provider
pub trait AuthProvider: Send + Sync {
    /// The signed-in user, if any
    fn current_user(&self) -> Option<UserIdentity>;

    /// Register a new account and sign in as it
    fn sign_up(&self, email: &str, password: &str, display_name: &str) -> HearthResult<UserIdentity>;

    fn sign_in(&self, email: &str, password: &str) -> HearthResult<UserIdentity>;

    fn sign_out(&self) -> HearthResult<()>;

    /// The signed-in user, or an `Auth` error
    fn require_user(&self) -> HearthResult<UserIdentity> {
        self.current_user()
            .ok_or_else(|| HearthError::Auth("Not signed in. Run 'hearth auth login' first.".into()))
    }
}
