use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::error::ChatError;

/// Key under which the provider API key is stored.
pub const API_KEY_NAME: &str = "GOOGLE_API_KEY";

/// Opaque API token. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

pub trait SecretStore {
    /// Look up `key`. `Ok(None)` means the store simply has no value for it.
    fn get(&self, key: &str) -> Result<Option<Credential>, ChatError>;
}

fn non_blank(value: String) -> Option<Credential> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(Credential::new(trimmed))
    }
}

/// Flat `KEY = "value"` TOML file, laid out like `.streamlit/secrets.toml`.
pub struct TomlSecrets {
    path: PathBuf,
}

impl TomlSecrets {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SecretStore for TomlSecrets {
    fn get(&self, key: &str) -> Result<Option<Credential>, ChatError> {
        if !self.path.exists() {
            debug!("Secrets file {} not found", self.path.display());
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            ChatError::secrets(format!("{}: {}", self.path.display(), e))
        })?;
        let table: HashMap<String, toml::Value> = toml::from_str(&content).map_err(|e| {
            ChatError::secrets(format!("{}: {}", self.path.display(), e))
        })?;

        match table.get(key) {
            Some(toml::Value::String(value)) => {
                info!("Loaded {} from {}", key, self.path.display());
                Ok(non_blank(value.clone()))
            }
            Some(_) => Err(ChatError::secrets(format!(
                "{}: `{}` must be a string",
                self.path.display(),
                key
            ))),
            None => Ok(None),
        }
    }
}

/// Process environment.
pub struct EnvSecrets;

impl SecretStore for EnvSecrets {
    fn get(&self, key: &str) -> Result<Option<Credential>, ChatError> {
        match std::env::var(key) {
            Ok(value) => {
                info!("Loaded {} from the environment", key);
                Ok(non_blank(value))
            }
            Err(_) => Ok(None),
        }
    }
}

/// Stores consulted in order; the first one holding the key wins.
pub struct ChainedSecrets {
    stores: Vec<Box<dyn SecretStore>>,
}

impl ChainedSecrets {
    pub fn new(stores: Vec<Box<dyn SecretStore>>) -> Self {
        Self { stores }
    }
}

impl SecretStore for ChainedSecrets {
    fn get(&self, key: &str) -> Result<Option<Credential>, ChatError> {
        for store in &self.stores {
            if let Some(credential) = store.get(key)? {
                return Ok(Some(credential));
            }
        }
        Ok(None)
    }
}

/// In-memory store, used by tests.
#[cfg(test)]
pub struct StaticSecrets(pub HashMap<String, String>);

#[cfg(test)]
impl StaticSecrets {
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    pub fn with(key: &str, value: &str) -> Self {
        let mut map = HashMap::new();
        map.insert(key.to_string(), value.to_string());
        Self(map)
    }
}

#[cfg(test)]
impl SecretStore for StaticSecrets {
    fn get(&self, key: &str) -> Result<Option<Credential>, ChatError> {
        Ok(self.0.get(key).cloned().and_then(non_blank))
    }
}
