//! Session and pending-state storage
//!
//! Both records are singletons: at most one session and one pending state
//! token exist at a time. The file store keeps them as JSON under
//! `~/.monzo-widget/`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use crate::Result;
use super::session::Session;

/// Storage for the OAuth2 session and the pending authorization state
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Current session, or `None` when logged out
    async fn session(&self) -> Result<Option<Session>>;

    /// Replace the stored session
    async fn save_session(&self, session: &Session) -> Result<()>;

    /// Remove the stored session
    async fn clear_session(&self) -> Result<()>;

    /// Pending state token of an authorization in progress
    async fn state_token(&self) -> Result<Option<String>>;

    /// Replace (`Some`) or clear (`None`) the pending state token
    async fn set_state_token(&self, token: Option<&str>) -> Result<()>;
}

/// In-process store; nothing survives a restart
#[derive(Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<Session>>,
    state_token: Mutex<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing session
    pub fn with_session(session: Session) -> Self {
        Self {
            session: Mutex::new(Some(session)),
            state_token: Mutex::new(None),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn session(&self) -> Result<Option<Session>> {
        Ok(self.session.lock().await.clone())
    }

    async fn save_session(&self, session: &Session) -> Result<()> {
        *self.session.lock().await = Some(session.clone());
        Ok(())
    }

    async fn clear_session(&self) -> Result<()> {
        *self.session.lock().await = None;
        Ok(())
    }

    async fn state_token(&self) -> Result<Option<String>> {
        Ok(self.state_token.lock().await.clone())
    }

    async fn set_state_token(&self, token: Option<&str>) -> Result<()> {
        *self.state_token.lock().await = token.map(str::to_string);
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PendingAuthState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    state_token: Option<String>,
}

/// JSON-file store with owner-only permissions
pub struct FileSessionStore {
    dir: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock: Mutex::new(()),
        }
    }

    /// Store rooted at the default config directory
    pub fn in_config_dir() -> Self {
        Self::new(crate::config::config_dir())
    }

    fn session_path(&self) -> PathBuf {
        self.dir.join("session.json")
    }

    fn state_path(&self) -> PathBuf {
        self.dir.join("auth_state.json")
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn session(&self) -> Result<Option<Session>> {
        let _guard = self.lock.lock().await;
        read_json(&self.session_path()).await
    }

    async fn save_session(&self, session: &Session) -> Result<()> {
        let _guard = self.lock.lock().await;
        write_private_json(&self.session_path(), session).await
    }

    async fn clear_session(&self) -> Result<()> {
        let _guard = self.lock.lock().await;
        remove_if_exists(&self.session_path()).await
    }

    async fn state_token(&self) -> Result<Option<String>> {
        let _guard = self.lock.lock().await;
        let state: Option<PendingAuthState> = read_json(&self.state_path()).await?;
        Ok(state.and_then(|s| s.state_token))
    }

    async fn set_state_token(&self, token: Option<&str>) -> Result<()> {
        let _guard = self.lock.lock().await;
        match token {
            Some(token) => {
                let state = PendingAuthState {
                    state_token: Some(token.to_string()),
                };
                write_private_json(&self.state_path(), &state).await
            }
            None => remove_if_exists(&self.state_path()).await,
        }
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Write through a temp file and rename, so readers never see a partial record
pub(crate) async fn write_private_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let tmp = path.with_extension("json.tmp");
    let content = serde_json::to_string_pretty(value)?;
    tokio::fs::write(&tmp, content).await?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        tokio::fs::set_permissions(&tmp, perms).await?;
    }

    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

async fn remove_if_exists(path: &Path) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
