//! File-backed auth provider
//!
//! Accounts live in a JSON credentials file holding argon2id password
//! hashes in PHC string form. The session is held in memory and, when a
//! session file is configured, mirrored to disk so it survives between
//! CLI invocations.

use std::path::PathBuf;
use std::sync::RwLock;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{AuthProvider, UserIdentity};
use crate::error::{HearthError, HearthResult};
use crate::models::UserId;
use crate::storage::file_io::{read_json, write_json_atomic};

const MIN_PASSWORD_LEN: usize = 8;
const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredAccount {
    id: UserId,
    email: String,
    display_name: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl StoredAccount {
    fn identity(&self) -> UserIdentity {
        UserIdentity {
            id: self.id,
            email: self.email.clone(),
            display_name: self.display_name.clone(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CredentialsFile {
    #[serde(default)]
    accounts: Vec<StoredAccount>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(default)]
    user: Option<UserIdentity>,
}

/// Auth provider backed by local files
pub struct LocalAuthProvider {
    credentials_path: PathBuf,
    session_path: Option<PathBuf>,
    session: RwLock<Option<UserIdentity>>,
}

impl LocalAuthProvider {
    /// Provider with an in-memory session only
    pub fn new(credentials_path: impl Into<PathBuf>) -> Self {
        Self {
            credentials_path: credentials_path.into(),
            session_path: None,
            session: RwLock::new(None),
        }
    }

    /// Persist the session to `path`, restoring any session already there
    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> HearthResult<Self> {
        let path = path.into();
        let stored: SessionFile = read_json(&path)?;
        self.session = RwLock::new(stored.user);
        self.session_path = Some(path);
        Ok(self)
    }

    fn load(&self) -> HearthResult<CredentialsFile> {
        read_json(&self.credentials_path)
    }

    fn set_session(&self, user: Option<UserIdentity>) -> HearthResult<()> {
        if let Some(path) = &self.session_path {
            write_json_atomic(path, &SessionFile { user: user.clone() })?;
        }
        let mut session = self
            .session
            .write()
            .map_err(|e| HearthError::Auth(format!("Session lock poisoned: {}", e)))?;
        *session = user;
        Ok(())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn hash_password(password: &str) -> HearthResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| HearthError::Auth(format!("Failed to hash password: {}", e)))
}

fn verify_password(password: &str, phc: &str) -> HearthResult<bool> {
    let parsed = PasswordHash::new(phc)
        .map_err(|e| HearthError::Auth(format!("Stored password hash is invalid: {}", e)))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(PasswordHashError::Password) => Ok(false),
        Err(e) => Err(HearthError::Auth(format!("Failed to verify password: {}", e))),
    }
}

impl AuthProvider for LocalAuthProvider {
    fn current_user(&self) -> Option<UserIdentity> {
        self.session.read().ok().and_then(|s| s.clone())
    }

    fn sign_up(&self, email: &str, password: &str, display_name: &str) -> HearthResult<UserIdentity> {
        let email = normalize_email(email);
        if email.is_empty() || !email.contains('@') {
            return Err(HearthError::Validation(format!("Invalid email address '{}'", email)));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(HearthError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let mut credentials = self.load()?;
        if credentials.accounts.iter().any(|a| a.email == email) {
            return Err(HearthError::Duplicate {
                entity_type: "User",
                identifier: email,
            });
        }

        let display_name = match display_name.trim() {
            "" => email.split('@').next().unwrap_or_default().to_string(),
            name => name.to_string(),
        };

        let account = StoredAccount {
            id: UserId::new(),
            email,
            display_name,
            password_hash: hash_password(password)?,
            created_at: Utc::now(),
        };
        let identity = account.identity();
        credentials.accounts.push(account);
        write_json_atomic(&self.credentials_path, &credentials)?;

        info!(user = %identity.id, "registered local account");
        self.set_session(Some(identity.clone()))?;
        Ok(identity)
    }

    fn sign_in(&self, email: &str, password: &str) -> HearthResult<UserIdentity> {
        let email = normalize_email(email);
        let credentials = self.load()?;

        let account = credentials
            .accounts
            .iter()
            .find(|a| a.email == email)
            .ok_or_else(|| HearthError::Auth(INVALID_CREDENTIALS.into()))?;

        if !verify_password(password, &account.password_hash)? {
            debug!(user = %account.id, "rejected sign-in");
            return Err(HearthError::Auth(INVALID_CREDENTIALS.into()));
        }

        let identity = account.identity();
        self.set_session(Some(identity.clone()))?;
        info!(user = %identity.id, "signed in");
        Ok(identity)
    }

    fn sign_out(&self) -> HearthResult<()> {
        self.set_session(None)
    }
}
