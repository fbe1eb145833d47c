//! Cookie-backed storage for session credentials.
//!
//! Stands in for the browser cookie jar: one named value per cookie, each
//! with its own expiry, scoped to the whole site. Purely mechanical storage —
//! no validation happens here, and an absent or expired entry reads back as
//! `None`, never an error.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const ACCESS_TOKEN_COOKIE: &str = "token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";
pub const CSRF_TOKEN_COOKIE: &str = "csrf_token";

/// Access tokens live for four hours, matching the backend's JWT expiry.
pub const ACCESS_TOKEN_TTL: Duration = Duration::from_secs(4 * 60 * 60);
/// Refresh tokens live for thirty days and are only stored opt-in.
pub const REFRESH_TOKEN_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredCookie {
    value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
}

impl StoredCookie {
    fn expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|at| at <= now).unwrap_or(false)
    }
}

/// File-backed cookie jar guarded by a lock so interleaved writes from
/// concurrent auth operations cannot corrupt it. The three writes of a
/// sign-in are still independent; there is no transaction across them.
#[derive(Debug)]
pub struct TokenStore {
    path: Option<PathBuf>,
    jar: RwLock<HashMap<String, StoredCookie>>,
}

impl TokenStore {
    /// Jar with no disk persistence. Used by tests and one-shot tools.
    pub fn in_memory() -> Self {
        Self { path: None, jar: RwLock::new(HashMap::new()) }
    }

    /// Open (or create) the cookie file at `path`. Expired entries are pruned
    /// on load; an unreadable or corrupt file starts an empty jar.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let mut jar: HashMap<String, StoredCookie> = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("cookie file {} is corrupt, starting empty: {e}", path.display());
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };
        let now = Utc::now();
        jar.retain(|_, c| !c.expired(now));
        Self { path: Some(path), jar: RwLock::new(jar) }
    }

    /// Store `value` under `name`. `max_age=None` means session-scoped: the
    /// entry never expires on its own and lives until cleared.
    pub fn set(&self, name: &str, value: &str, max_age: Option<Duration>) {
        let expires_at = max_age.map(|d| Utc::now() + chrono::Duration::seconds(d.as_secs() as i64));
        {
            let mut jar = self.jar.write();
            jar.insert(name.to_string(), StoredCookie { value: value.to_string(), expires_at });
        }
        self.persist();
    }

    /// Read a cookie. Expired entries are dropped on the way out.
    pub fn get(&self, name: &str) -> Option<String> {
        let now = Utc::now();
        let mut drop_key = false;
        let out = {
            let jar = self.jar.read();
            match jar.get(name) {
                Some(c) if !c.expired(now) => Some(c.value.clone()),
                Some(_) => {
                    drop_key = true;
                    None
                }
                None => None,
            }
        };
        if drop_key {
            self.jar.write().remove(name);
            self.persist();
        }
        out
    }

    /// When the cookie expires, if ever. `None` for absent or session-scoped
    /// entries.
    pub fn expiry(&self, name: &str) -> Option<DateTime<Utc>> {
        self.jar.read().get(name).and_then(|c| c.expires_at)
    }

    pub fn clear(&self, name: &str) {
        self.jar.write().remove(name);
        self.persist();
    }

    /// Drop all three session cookies at once. Safe to call repeatedly.
    pub fn clear_session(&self) {
        {
            let mut jar = self.jar.write();
            jar.remove(ACCESS_TOKEN_COOKIE);
            jar.remove(REFRESH_TOKEN_COOKIE);
            jar.remove(CSRF_TOKEN_COOKIE);
        }
        self.persist();
    }

    pub fn access_token(&self) -> Option<String> {
        self.get(ACCESS_TOKEN_COOKIE)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.get(REFRESH_TOKEN_COOKIE)
    }

    pub fn csrf_token(&self) -> Option<String> {
        self.get(CSRF_TOKEN_COOKIE)
    }

    // Best-effort write-through. A failed disk write keeps the in-memory jar
    // authoritative for the rest of the process.
    fn persist(&self) {
        let Some(path) = &self.path else { return };
        let jar = self.jar.read();
        let raw = match serde_json::to_string_pretty(&*jar) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("failed to serialize cookie jar: {e}");
                return;
            }
        };
        if let Some(dir) = path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        if let Err(e) = std::fs::write(path, raw) {
            warn!("failed to write cookie file {}: {e}", path.display());
        }
    }
}
