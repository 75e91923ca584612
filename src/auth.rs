//! Username/password gate backed by a JSON file of SHA-256 hashes.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("username must not be empty")]
    EmptyUsername,
    #[error("password must not be empty")]
    EmptyPassword,
    #[error("username already exists: {0}")]
    UsernameTaken(String),
    #[error("user not found: {0}")]
    UserNotFound(String),
    #[error("wrong password")]
    WrongPassword,
    #[error("user store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("user store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserRecord {
    password: String,
}

/// Hex-encoded SHA-256 of `password`.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

pub struct UserStore {
    path: PathBuf,
}

impl UserStore {
    /// The file is created on first registration.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn register(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AuthError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(AuthError::EmptyPassword);
        }

        let mut users = self.load()?;
        if users.contains_key(username) {
            return Err(AuthError::UsernameTaken(username.to_string()));
        }
        users.insert(
            username.to_string(),
            UserRecord {
                password: hash_password(password),
            },
        );
        self.save(&users)?;
        info!("[Auth] Registered user {}", username);
        Ok(())
    }

    pub fn authenticate(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let username = username.trim();
        let users = self.load()?;
        let record = users
            .get(username)
            .ok_or_else(|| AuthError::UserNotFound(username.to_string()))?;
        if record.password != hash_password(password) {
            return Err(AuthError::WrongPassword);
        }
        Ok(())
    }

    pub fn contains(&self, username: &str) -> Result<bool, AuthError> {
        Ok(self.load()?.contains_key(username.trim()))
    }

    fn load(&self) -> Result<BTreeMap<String, UserRecord>, AuthError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, users: &BTreeMap<String, UserRecord>) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(users)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(tmp: &TempDir) -> UserStore {
        UserStore::open(tmp.path().join("data").join("users.json"))
    }

    #[test]
    fn hash_is_hex_sha256() {
        assert_eq!(
            hash_password("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn register_then_authenticate() {
        let tmp = TempDir::new().unwrap();
        let users = store(&tmp);
        users.register("alice", "s3cret").unwrap();

        assert!(users.authenticate("alice", "s3cret").is_ok());
        assert!(matches!(
            users.authenticate("alice", "guess"),
            Err(AuthError::WrongPassword)
        ));
        assert!(matches!(
            users.authenticate("bob", "s3cret"),
            Err(AuthError::UserNotFound(_))
        ));
    }

    #[test]
    fn duplicate_and_empty_usernames_are_rejected() {
        let tmp = TempDir::new().unwrap();
        let users = store(&tmp);
        users.register("alice", "one").unwrap();

        assert!(matches!(
            users.register("alice", "two"),
            Err(AuthError::UsernameTaken(_))
        ));
        assert!(matches!(users.register("  ", "x"), Err(AuthError::EmptyUsername)));
        assert!(matches!(users.register("bob", ""), Err(AuthError::EmptyPassword)));
    }

    #[test]
    fn store_persists_hashes_not_passwords() {
        let tmp = TempDir::new().unwrap();
        store(&tmp).register("alice", "s3cret").unwrap();

        let content = std::fs::read_to_string(store(&tmp).path()).unwrap();
        assert!(!content.contains("s3cret"));
        assert!(content.contains(&hash_password("s3cret")));
        assert!(store(&tmp).contains("alice").unwrap());
    }

    #[test]
    fn corrupt_store_is_not_overwritten() {
        let tmp = TempDir::new().unwrap();
        let users = store(&tmp);
        std::fs::create_dir_all(users.path().parent().unwrap()).unwrap();
        std::fs::write(users.path(), "{not json").unwrap();

        assert!(matches!(users.register("alice", "pw"), Err(AuthError::Corrupt(_))));
        assert_eq!(std::fs::read_to_string(users.path()).unwrap(), "{not json");
    }
}
