use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing::{debug, warn};

/// Token file name in the data directory
const TOKEN_FILE: &str = "tokens.json";

/// Keys under which tokens are persisted. Absence of a key means logged out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKey {
    Access,
    Refresh,
}

impl TokenKey {
    pub const ALL: [TokenKey; 2] = [TokenKey::Access, TokenKey::Refresh];

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKey::Access => "access_token",
            TokenKey::Refresh => "refresh_token",
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Token file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Token file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Credential store error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("Token store lock poisoned")]
    Poisoned,
}

/// Durable key/value storage for the access and refresh tokens.
///
/// This is the single source of truth for "is there a session" across
/// restarts. The request pipeline reads the access token from here before
/// every request.
pub trait TokenStore: Send + Sync {
    fn get(&self, key: TokenKey) -> Result<Option<String>, StoreError>;

    fn set(&self, key: TokenKey, value: &str) -> Result<(), StoreError>;

    /// Removing a key that is not present is not an error.
    fn remove(&self, key: TokenKey) -> Result<(), StoreError>;

    fn access_token(&self) -> Result<Option<String>, StoreError> {
        self.get(TokenKey::Access)
    }

    fn refresh_token(&self) -> Result<Option<String>, StoreError> {
        self.get(TokenKey::Refresh)
    }

    /// Remove both tokens. Both removals are attempted even if the first fails.
    fn clear(&self) -> Result<(), StoreError> {
        let access = self.remove(TokenKey::Access);
        let refresh = self.remove(TokenKey::Refresh);
        access.and(refresh)
    }
}

/// Tokens kept in a JSON file, e.g. `~/.local/share/cropwatch/tokens.json`.
pub struct FileTokenStore {
    dir: PathBuf,
}

impl FileTokenStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path(&self) -> PathBuf {
        self.dir.join(TOKEN_FILE)
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let path = self.path();
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Current tokens for a read-modify-write. A corrupt file is replaced
    /// rather than blocking every later login; the flag says it must be
    /// rewritten even if nothing else changes.
    fn read_for_update(&self) -> Result<(BTreeMap<String, String>, bool), StoreError> {
        match self.read_all() {
            Ok(tokens) => Ok((tokens, false)),
            Err(StoreError::Corrupt(e)) => {
                warn!(error = %e, path = %self.path().display(), "Discarding corrupt token file");
                Ok((BTreeMap::new(), true))
            }
            Err(e) => Err(e),
        }
    }

    fn remove_file(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(self.path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, tokens: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if tokens.is_empty() {
            return self.remove_file();
        }

        std::fs::create_dir_all(&self.dir)?;
        let contents = serde_json::to_string_pretty(tokens)?;

        // Write a private temp file, then rename over the old one
        let path = self.path();
        let temp_path = path.with_extension("json.tmp");
        write_private(&temp_path, contents.as_bytes())?;
        std::fs::rename(&temp_path, &path)?;
        Ok(())
    }
}

#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on create; a leftover temp file keeps its own
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.write_all(contents)?;
    file.sync_all()
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, contents)
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: TokenKey) -> Result<Option<String>, StoreError> {
        Ok(self.read_all()?.remove(key.as_str()))
    }

    fn set(&self, key: TokenKey, value: &str) -> Result<(), StoreError> {
        let (mut tokens, _) = self.read_for_update()?;
        tokens.insert(key.as_str().to_string(), value.to_string());
        debug!(key = key.as_str(), "Persisting token");
        self.write_all(&tokens)
    }

    fn remove(&self, key: TokenKey) -> Result<(), StoreError> {
        let (mut tokens, discarded) = self.read_for_update()?;
        if tokens.remove(key.as_str()).is_some() || discarded {
            debug!(key = key.as_str(), "Removing token");
            self.write_all(&tokens)?;
        }
        Ok(())
    }

    /// Both tokens live in one file, so deleting it clears them whatever
    /// state it is in.
    fn clear(&self) -> Result<(), StoreError> {
        debug!("Removing token file");
        self.remove_file()
    }
}

/// Process-local storage. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<HashMap<TokenKey, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with the given tokens.
    pub fn with_tokens(access: Option<&str>, refresh: Option<&str>) -> Self {
        let mut tokens = HashMap::new();
        if let Some(access) = access {
            tokens.insert(TokenKey::Access, access.to_string());
        }
        if let Some(refresh) = refresh {
            tokens.insert(TokenKey::Refresh, refresh.to_string());
        }
        Self {
            tokens: Mutex::new(tokens),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: TokenKey) -> Result<Option<String>, StoreError> {
        let tokens = self.tokens.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(tokens.get(&key).cloned())
    }

    fn set(&self, key: TokenKey, value: &str) -> Result<(), StoreError> {
        let mut tokens = self.tokens.lock().map_err(|_| StoreError::Poisoned)?;
        tokens.insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: TokenKey) -> Result<(), StoreError> {
        let mut tokens = self.tokens.lock().map_err(|_| StoreError::Poisoned)?;
        tokens.remove(&key);
        Ok(())
    }
}
