//! Single-writer owner of the session state.
//!
//! The manager is handed to the UI tree by reference; nothing else mutates
//! the state. Sign-in, sign-out, refresh and recovery are serialized through
//! one async mutex so concurrent auth calls cannot interleave their cookie
//! writes.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::auth::{AuthBackend, Credentials};
use crate::error::AppResult;
use crate::jwt;
use crate::token_store::{
    TokenStore, ACCESS_TOKEN_COOKIE, ACCESS_TOKEN_TTL, CSRF_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE,
    REFRESH_TOKEN_TTL,
};

use super::state::{Session, SessionState};
use super::user::User;

pub struct SessionManager {
    state: RwLock<SessionState>,
    store: Arc<TokenStore>,
    backend: Arc<dyn AuthBackend>,
    auth_op: Mutex<()>,
}

impl SessionManager {
    pub fn new(store: Arc<TokenStore>, backend: Arc<dyn AuthBackend>) -> Self {
        Self {
            state: RwLock::new(SessionState::Initializing),
            store,
            backend,
            auth_op: Mutex::new(()),
        }
    }

    /// Current view of the session. Cheap; take it per render.
    pub fn snapshot(&self) -> Session {
        self.state.read().snapshot()
    }

    pub fn store(&self) -> &Arc<TokenStore> {
        &self.store
    }

    /// Resolve the session from whatever the token store holds.
    ///
    /// Runs the recovery algorithm exactly once: a second call returns the
    /// already-resolved snapshot untouched. Any decode or validation failure
    /// purges all session cookies and resolves Anonymous.
    pub async fn recover_user_information(&self) -> Session {
        let _op = self.auth_op.lock().await;
        if !self.state.read().loading() {
            return self.snapshot();
        }

        let Some(token) = self.store.access_token() else {
            *self.state.write() = SessionState::Anonymous;
            return self.snapshot();
        };

        let claims = match jwt::decode_access_token(&token) {
            Ok(claims) => claims,
            Err(e) => {
                warn!("session recovery: stored token is unreadable: {e}");
                self.store.clear_session();
                *self.state.write() = SessionState::Anonymous;
                return self.snapshot();
            }
        };

        match self.backend.validate_token(&token).await {
            Ok(()) => {
                let user = claims.into_user(&token);
                info!("session recovered for user {}", user.id);
                *self.state.write() = SessionState::Authenticated(user);
            }
            Err(e) => {
                warn!("session recovery: backend rejected token: {e}");
                self.store.clear_session();
                *self.state.write() = SessionState::Anonymous;
            }
        }
        self.snapshot()
    }

    /// Submit credentials and, on success, persist tokens and switch the
    /// session to Authenticated. A rejection leaves the state as it was and
    /// carries the backend's message for the caller to display.
    pub async fn sign_in(&self, credentials: Credentials) -> AppResult<User> {
        let _op = self.auth_op.lock().await;
        let keep_signed_in = credentials.keep_signed_in;
        let resp = self.backend.login(&credentials).await?;

        self.store
            .set(ACCESS_TOKEN_COOKIE, &resp.token, Some(ACCESS_TOKEN_TTL));
        if let Some(csrf) = resp.csrf_token() {
            // Session-scoped: no expiry of its own
            self.store.set(CSRF_TOKEN_COOKIE, csrf, None);
        }
        if keep_signed_in {
            if let Some(refresh) = resp.refresh_token() {
                self.store
                    .set(REFRESH_TOKEN_COOKIE, refresh, Some(REFRESH_TOKEN_TTL));
            }
        }

        let user = User {
            id: resp.usuario.id_usuario,
            email: resp.usuario.email,
            display_name: resp.usuario.nome_de_usuario,
            profile_image_url: resp.usuario.perfil_imagem,
            access_level: resp.usuario.nivel_de_acesso,
            token: resp.token,
        };
        info!("signed in as {} ({})", user.display_name, user.id);
        *self.state.write() = SessionState::Authenticated(user.clone());
        Ok(user)
    }

    /// Notify the backend, then clear everything locally regardless of the
    /// outcome. Idempotent.
    pub async fn sign_out(&self) {
        let _op = self.auth_op.lock().await;
        if let Err(e) = self.backend.logout().await {
            warn!("logout request failed, clearing local session anyway: {e}");
        }
        self.store.clear_session();
        *self.state.write() = SessionState::Anonymous;
    }

    /// Exchange the refresh cookie for a fresh access token. Never called
    /// automatically — an expired-token 401 stays the caller's decision.
    pub async fn refresh_session(&self) -> AppResult<User> {
        let _op = self.auth_op.lock().await;
        let resp = self.backend.refresh().await?;
        let claims = jwt::decode_access_token(&resp.token)?;
        self.store
            .set(ACCESS_TOKEN_COOKIE, &resp.token, Some(ACCESS_TOKEN_TTL));
        let user = claims.into_user(&resp.token);
        *self.state.write() = SessionState::Authenticated(user.clone());
        Ok(user)
    }
}
