//! Authentication flows against the portal backend.
//!
//! Wire types mirror the backend's JSON verbatim. The `AuthBackend` trait is
//! the seam between the session manager and the network; the HTTP
//! implementation lives here, a mock lives in the tests.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::client::PortalClient;
use crate::error::{AppError, AppResult};
use crate::token_store::CSRF_TOKEN_COOKIE;

// Same minimum the backend enforces at registration
static PASSWORD_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r".{8,}").unwrap());

/// Sign-in input. Exists only for the duration of the call; never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    #[serde(rename = "senha")]
    pub password: String,
    #[serde(rename = "nomeDeUsuario")]
    pub username: String,
    #[serde(rename = "manterConectado")]
    pub keep_signed_in: bool,
}

/// The `usuario` object of a login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginUser {
    #[serde(rename = "idUsuario")]
    pub id_usuario: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "nomeDeUsuario", default)]
    pub nome_de_usuario: String,
    #[serde(rename = "perfilImagem", default)]
    pub perfil_imagem: Option<String>,
    #[serde(rename = "nivelDeAcesso", default)]
    pub nivel_de_acesso: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    /// The backend sends an empty string when no refresh token was issued.
    #[serde(rename = "refreshToken", default)]
    pub refresh_token: Option<String>,
    #[serde(rename = "csrfToken", default)]
    pub csrf_token: Option<String>,
    pub usuario: LoginUser,
}

impl LoginResponse {
    /// Refresh token with the backend's empty-string placeholder filtered out.
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref().filter(|s| !s.is_empty())
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref().filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    pub token: String,
}

/// Registration payload; the backend's user table uses snake_case names.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub nome_de_usuario: String,
    pub senha: String,
    pub email: String,
    pub termos_de_uso: bool,
}

#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn login(&self, req: &Credentials) -> AppResult<LoginResponse>;
    async fn logout(&self) -> AppResult<()>;
    async fn validate_token(&self, token: &str) -> AppResult<()>;
    async fn refresh(&self) -> AppResult<RefreshResponse>;
    async fn register(&self, req: &RegisterRequest) -> AppResult<()>;
}

/// The real backend, reached through the authenticated client.
pub struct HttpAuthBackend {
    client: PortalClient,
}

impl HttpAuthBackend {
    pub fn new(client: PortalClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthBackend for HttpAuthBackend {
    async fn login(&self, req: &Credentials) -> AppResult<LoginResponse> {
        let rb = self.client.request(Method::POST, "/api/auth/login")?.json(req);
        let resp = self.client.execute(rb).await?;
        // The CSRF token may arrive only as a Set-Cookie; capture it before
        // consuming the body so the caller sees it either way.
        let cookie_csrf = extract_set_cookie(resp.headers(), CSRF_TOKEN_COOKIE);
        let mut login: LoginResponse = resp.json().await?;
        if login.csrf_token().is_none() {
            login.csrf_token = cookie_csrf;
        }
        Ok(login)
    }

    async fn logout(&self) -> AppResult<()> {
        let rb = self.client.request(Method::POST, "/api/auth/logout")?;
        self.client.execute(rb).await?;
        Ok(())
    }

    async fn validate_token(&self, token: &str) -> AppResult<()> {
        let rb = self
            .client
            .request(Method::GET, "/api/auth/validate-token")?
            .bearer_auth(token);
        self.client.execute(rb).await?;
        Ok(())
    }

    async fn refresh(&self) -> AppResult<RefreshResponse> {
        let rb = self.client.request(Method::POST, "/api/auth/refresh")?;
        let resp = self.client.execute(rb).await?;
        Ok(resp.json().await?)
    }

    async fn register(&self, req: &RegisterRequest) -> AppResult<()> {
        if !PASSWORD_PATTERN.is_match(&req.senha) {
            return Err(AppError::user(
                "weak_password".to_string(),
                "a senha deve ter no mínimo 8 caracteres".to_string(),
            ));
        }
        if !req.termos_de_uso {
            return Err(AppError::user(
                "terms_not_accepted".to_string(),
                "os termos de uso devem ser aceitos".to_string(),
            ));
        }
        let rb = self.client.request(Method::POST, "/api/auth/register")?.json(req);
        self.client.execute(rb).await?;
        Ok(())
    }
}

fn extract_set_cookie(headers: &reqwest::header::HeaderMap, name: &str) -> Option<String> {
    for val in headers.get_all(reqwest::header::SET_COOKIE).iter() {
        if let Ok(s) = val.to_str() {
            // take name=value before the first ';'
            let nv = s.split_once(';').map(|(nv, _)| nv).unwrap_or(s).trim();
            if let Some((n, v)) = nv.split_once('=') {
                if n == name && !v.is_empty() {
                    return Some(v.to_string());
                }
            }
        }
    }
    None
}
