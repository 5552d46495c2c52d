//! Token persistence for the session

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use jsonwebtoken::{decode, DecodingKey, Validation};

use super::types::Identity;
use crate::error::Error;

/// Key-value storage the bearer token is persisted in
pub trait TokenStore: Send + Sync {
    /// Read the value stored under `key`
    fn load(&self, key: &str) -> Result<Option<String>, Error>;

    /// Store `value` under `key`
    fn save(&self, key: &str, value: &str) -> Result<(), Error>;

    /// Remove whatever is stored under `key`
    fn remove(&self, key: &str) -> Result<(), Error>;
}

/// Process-local token store
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self, key: &str) -> Result<Option<String>, Error> {
        let values = self.values.read().map_err(|_| Error::general("token store poisoned"))?;
        Ok(values.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), Error> {
        let mut values = self.values.write().map_err(|_| Error::general("token store poisoned"))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        let mut values = self.values.write().map_err(|_| Error::general("token store poisoned"))?;
        values.remove(key);
        Ok(())
    }
}

/// Token store backed by a JSON object on disk
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Map<String, Value>, Error> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let text = fs::read_to_string(&self.path)?;
        if text.trim().is_empty() {
            return Ok(Map::new());
        }
        Ok(serde_json::from_str(&text)?)
    }

    fn write_all(&self, values: &Map<String, Value>) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_vec_pretty(values)?)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self, key: &str) -> Result<Option<String>, Error> {
        let values = self.read_all()?;
        Ok(values.get(key).and_then(Value::as_str).map(str::to_string))
    }

    fn save(&self, key: &str, value: &str) -> Result<(), Error> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), Value::String(value.to_string()));
        self.write_all(&values)
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        let mut values = self.read_all()?;
        if values.remove(key).is_some() {
            self.write_all(&values)?;
        }
        Ok(())
    }
}

/// Decode the claims of a bearer token without verifying its signature.
///
/// The server is the authority on signatures; the client only reads the
/// claims to know who is logged in and until when.
pub fn decode_token(token: &str) -> Result<Identity, Error> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    let data = decode::<Identity>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(data.claims)
}

/// Shared handle on the stored bearer token.
///
/// Cloning is cheap; every clone sees the same token. The API gateway reads it
/// for each request and clears it on a 401, the auth provider writes it on
/// login and clears it on logout.
#[derive(Clone)]
pub struct Credentials {
    store: Arc<dyn TokenStore>,
    key: String,
    current: Arc<RwLock<Option<String>>>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("has_token", &self.token().is_some())
            .finish()
    }
}

impl Credentials {
    /// Wrap `store`, reading the persisted token under `key`
    pub fn load(store: Arc<dyn TokenStore>, key: &str) -> Result<Self, Error> {
        let current = store.load(key)?;
        Ok(Self {
            store,
            key: key.to_string(),
            current: Arc::new(RwLock::new(current)),
        })
    }

    /// Credentials kept only in memory
    pub fn in_memory(key: &str) -> Self {
        Self {
            store: Arc::new(MemoryTokenStore::new()),
            key: key.to_string(),
            current: Arc::new(RwLock::new(None)),
        }
    }

    /// The current bearer token, if any
    pub fn token(&self) -> Option<String> {
        self.current.read().ok().and_then(|token| token.clone())
    }

    /// Replace the token, persisting it
    pub fn set_token(&self, token: &str) -> Result<(), Error> {
        self.store.save(&self.key, token)?;
        if let Ok(mut current) = self.current.write() {
            *current = Some(token.to_string());
        }
        Ok(())
    }

    /// Forget the token, both in memory and in the store
    pub fn clear(&self) -> Result<(), Error> {
        if let Ok(mut current) = self.current.write() {
            *current = None;
        }
        self.store.remove(&self.key)
    }

    /// Claims of the current token, when present and decodable
    pub fn identity(&self) -> Option<Identity> {
        self.token().and_then(|token| decode_token(&token).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token_for(exp: i64) -> String {
        let claims = Identity {
            id: "u1".to_string(),
            email: "admin@example.com".to_string(),
            is_admin: true,
            iat: Some(exp - 3600),
            exp,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(b"server-secret")).unwrap()
    }

    #[test]
    fn decodes_claims_without_the_secret() {
        let identity = decode_token(&token_for(4_102_444_800)).unwrap();
        assert_eq!(identity.id, "u1");
        assert!(identity.is_admin);
        assert!(!identity.is_expired());
    }

    #[test]
    fn expired_tokens_still_decode_but_report_expiry() {
        let identity = decode_token(&token_for(1_000)).unwrap();
        assert!(identity.is_expired());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(decode_token("not-a-token").is_err());
    }

    #[test]
    fn file_store_round_trips_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = Arc::new(FileTokenStore::new(&path));

        let credentials = Credentials::load(store.clone(), "token").unwrap();
        assert!(credentials.token().is_none());

        credentials.set_token("abc").unwrap();
        assert_eq!(store.load("token").unwrap().as_deref(), Some("abc"));

        let reloaded = Credentials::load(store.clone(), "token").unwrap();
        assert_eq!(reloaded.token().as_deref(), Some("abc"));

        credentials.clear().unwrap();
        assert!(credentials.token().is_none());
        assert!(store.load("token").unwrap().is_none());
    }

    #[test]
    fn clones_share_the_token() {
        let credentials = Credentials::in_memory("token");
        let other = credentials.clone();
        credentials.set_token("abc").unwrap();
        assert_eq!(other.token().as_deref(), Some("abc"));
        other.clear().unwrap();
        assert!(credentials.token().is_none());
    }
}
