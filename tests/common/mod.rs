#![allow(dead_code)]

//! In-process mock of the portal backend for integration tests.
//! Speaks the same wire shapes as the real API: login mints a JWT-shaped
//! access token plus CSRF cookie, logout enforces the CSRF header, and
//! validate-token only accepts tokens this instance issued.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use parking_lot::RwLock;
use serde_json::{json, Value};
use tokio::task::JoinHandle;

pub const TEST_EMAIL: &str = "a@b.com";
pub const TEST_PASSWORD: &str = "x";
pub const TEST_USER_ID: &str = "u1";

// Aborts the server task when a test ends, pass or fail.
pub struct Guard(pub JoinHandle<()>);
impl Drop for Guard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

#[derive(Clone)]
pub struct PortalOptions {
    pub nivel_de_acesso: String,
    /// Return a refresh token even when the client did not ask to stay
    /// signed in, to prove the client ignores it.
    pub always_issue_refresh: bool,
}

impl Default for PortalOptions {
    fn default() -> Self {
        Self { nivel_de_acesso: "administrador".to_string(), always_issue_refresh: false }
    }
}

struct MockState {
    opts: PortalOptions,
    issued: RwLock<HashSet<String>>,
    csrf: RwLock<Option<String>>,
    refresh: RwLock<Option<String>>,
}

/// JWT-shaped token: real header and payload, throwaway signature. The
/// client never verifies signatures, the mock recognizes tokens by value.
pub fn mint_access_token(id: &str, nivel: &str, nome: &str, email: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = json!({
        "idUsuario": id,
        "nivelDeAcesso": nivel,
        "nomeDeUsuario": nome,
        "email": email,
        "exp": Utc::now().timestamp() + 4 * 3600,
    });
    let payload = URL_SAFE_NO_PAD.encode(payload.to_string().as_bytes());
    format!("{header}.{payload}.{}", uuid::Uuid::new_v4().simple())
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get("authorization")?.to_str().ok()?;
    raw.strip_prefix("Bearer ").map(str::to_string)
}

fn unauthorized(msg: &str) -> (StatusCode, HeaderMap, Json<Value>) {
    (StatusCode::UNAUTHORIZED, HeaderMap::new(), Json(json!({ "message": msg })))
}

fn require_bearer(
    state: &MockState,
    headers: &HeaderMap,
) -> Result<(), (StatusCode, HeaderMap, Json<Value>)> {
    match bearer_token(headers) {
        Some(token) if state.issued.read().contains(&token) => Ok(()),
        _ => Err(unauthorized("Token inválido ou expirado")),
    }
}

fn require_csrf(
    state: &MockState,
    headers: &HeaderMap,
) -> Result<(), (StatusCode, HeaderMap, Json<Value>)> {
    let provided = headers.get("x-csrf-token").and_then(|v| v.to_str().ok());
    let expected = state.csrf.read().clone();
    match (provided, expected) {
        (Some(p), Some(e)) if p == e => Ok(()),
        _ => Err((
            StatusCode::FORBIDDEN,
            HeaderMap::new(),
            Json(json!({ "message": "CSRF token inválido" })),
        )),
    }
}

async fn login(
    State(state): State<Arc<MockState>>,
    Json(body): Json<Value>,
) -> (StatusCode, HeaderMap, Json<Value>) {
    let email = body.get("email").and_then(Value::as_str).unwrap_or_default();
    let senha = body.get("senha").and_then(Value::as_str).unwrap_or_default();
    let manter = body.get("manterConectado").and_then(Value::as_bool).unwrap_or(false);
    if email != TEST_EMAIL || senha != TEST_PASSWORD {
        return unauthorized("Nome de usuário ou senha inválidos");
    }

    let token = mint_access_token(TEST_USER_ID, &state.opts.nivel_de_acesso, "a", TEST_EMAIL);
    state.issued.write().insert(token.clone());

    let csrf = uuid::Uuid::new_v4().to_string();
    *state.csrf.write() = Some(csrf.clone());

    let refresh = if manter || state.opts.always_issue_refresh {
        let r = uuid::Uuid::new_v4().simple().to_string();
        *state.refresh.write() = Some(r.clone());
        r
    } else {
        String::new()
    };

    let mut headers = HeaderMap::new();
    headers.append(SET_COOKIE, format!("token={token}; Path=/; SameSite=Lax").parse().unwrap());
    headers.append(SET_COOKIE, format!("csrf_token={csrf}; Path=/; SameSite=Lax").parse().unwrap());
    if !refresh.is_empty() {
        headers.append(
            SET_COOKIE,
            format!("refresh_token={refresh}; Path=/; HttpOnly; SameSite=Lax").parse().unwrap(),
        );
    }

    let body = json!({
        "message": "Login bem-sucedido",
        "token": token,
        "refreshToken": refresh,
        "csrfToken": csrf,
        "usuario": {
            "idUsuario": TEST_USER_ID,
            "email": TEST_EMAIL,
            "nomeDeUsuario": "a",
            "perfilImagem": null,
            "nivelDeAcesso": state.opts.nivel_de_acesso,
        },
    });
    (StatusCode::OK, headers, Json(body))
}

async fn logout(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
) -> (StatusCode, HeaderMap, Json<Value>) {
    if let Err(resp) = require_csrf(&state, &headers) {
        return resp;
    }
    (StatusCode::OK, HeaderMap::new(), Json(json!({ "message": "Logout bem-sucedido" })))
}

async fn validate_token(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
) -> (StatusCode, HeaderMap, Json<Value>) {
    if let Err(resp) = require_bearer(&state, &headers) {
        return resp;
    }
    (StatusCode::OK, HeaderMap::new(), Json(json!({ "message": "Token válido" })))
}

async fn refresh(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
) -> (StatusCode, HeaderMap, Json<Value>) {
    let cookie = headers.get("cookie").and_then(|v| v.to_str().ok()).unwrap_or_default();
    let sent = cookie.split(';').find_map(|kv| {
        let (name, value) = kv.trim().split_once('=')?;
        (name == "refresh_token").then(|| value.to_string())
    });
    let expected = state.refresh.read().clone();
    match (sent, expected) {
        (Some(s), Some(e)) if s == e => {
            let token =
                mint_access_token(TEST_USER_ID, &state.opts.nivel_de_acesso, "a", TEST_EMAIL);
            state.issued.write().insert(token.clone());
            (StatusCode::OK, HeaderMap::new(), Json(json!({ "token": token })))
        }
        _ => unauthorized("Refresh token não encontrado"),
    }
}

async fn profile(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
) -> (StatusCode, HeaderMap, Json<Value>) {
    if let Err(resp) = require_bearer(&state, &headers) {
        return resp;
    }
    let body = json!({
        "id_usuario": TEST_USER_ID,
        "nome_de_usuario": "a",
        "email": TEST_EMAIL,
        "nome_completo": "Ana Braga",
        "instituicao": "Instituto EO",
        "pais": "Brasil",
    });
    (StatusCode::OK, HeaderMap::new(), Json(body))
}

async fn noticias() -> Json<Value> {
    Json(json!([
        {
            "id_noticia": "n1",
            "titulo": "Nova campanha de medição offshore",
            "data_publicacao": "2026-03-01T12:00:00Z",
            "nome_autor": "Equipe EO",
            "categoria": "campanhas",
            "slug": "nova-campanha-offshore",
            "identifier": "abc123"
        },
        {
            "id_noticia": "n2",
            "titulo": "Resultados da estação solarimétrica",
            "data_publicacao": "2026-02-10T09:30:00Z",
            "categoria": "resultados",
            "slug": "resultados-solarimetrica",
            "identifier": "def456"
        }
    ]))
}

async fn publicacoes() -> Json<Value> {
    Json(json!([
        {
            "id_publicacao": "p1",
            "titulo": "Perfis de vento offshore no litoral equatorial",
            "palavras_chave": ["vento", "offshore"],
            "autores": ["A. Braga", "M. Souza"],
            "data_criacao": "2025-11-20T08:30:00Z",
            "visualizacoes": 42,
            "slug": "perfis-de-vento",
            "identifier": "pub-9",
            "visibilidade": true,
            "id_usuario": TEST_USER_ID
        }
    ]))
}

async fn favoritos_list(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
) -> (StatusCode, HeaderMap, Json<Value>) {
    if let Err(resp) = require_bearer(&state, &headers) {
        return resp;
    }
    let body = json!([
        {
            "id_favoritos": "f1",
            "id_usuario": TEST_USER_ID,
            "id_publicacao": "p1",
            "data_favorito": "2026-01-05T10:00:00Z",
            "titulo": "Perfis de vento offshore no litoral equatorial",
            "slug": "perfis-de-vento",
            "identifier": "pub-9"
        }
    ]);
    (StatusCode::OK, HeaderMap::new(), Json(body))
}

async fn favoritos_create(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, HeaderMap, Json<Value>) {
    if let Err(resp) = require_bearer(&state, &headers) {
        return resp;
    }
    if let Err(resp) = require_csrf(&state, &headers) {
        return resp;
    }
    let id_publicacao = body.get("id_publicacao").and_then(Value::as_str).unwrap_or_default();
    if id_publicacao.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            HeaderMap::new(),
            Json(json!({ "message": "id_publicacao é obrigatório" })),
        );
    }
    (
        StatusCode::OK,
        HeaderMap::new(),
        Json(json!({ "message": "Favorito criado", "id_favoritos": "f2" })),
    )
}

async fn favoritos_delete(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
) -> (StatusCode, HeaderMap, Json<Value>) {
    if let Err(resp) = require_bearer(&state, &headers) {
        return resp;
    }
    if let Err(resp) = require_csrf(&state, &headers) {
        return resp;
    }
    (StatusCode::OK, HeaderMap::new(), Json(json!({ "message": "Favorito removido" })))
}

async fn notificacoes(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
) -> (StatusCode, HeaderMap, Json<Value>) {
    if let Err(resp) = require_bearer(&state, &headers) {
        return resp;
    }
    let body = json!([
        {
            "id_notificacao": "not1",
            "titulo": "Manutenção programada",
            "mensagem": "O portal ficará indisponível no sábado.",
            "data_envio": "2026-01-10T09:00:00Z",
            "tipo": "aviso",
            "enviado_para_todos": true
        }
    ]);
    (StatusCode::OK, HeaderMap::new(), Json(body))
}

/// Start the mock portal on an ephemeral localhost port. Returns the server
/// task and the base URL; wrap the handle in `Guard` for cleanup.
pub async fn start_portal(opts: PortalOptions) -> (JoinHandle<()>, String) {
    let state = Arc::new(MockState {
        opts,
        issued: RwLock::new(HashSet::new()),
        csrf: RwLock::new(None),
        refresh: RwLock::new(None),
    });

    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/validate-token", get(validate_token))
        .route("/api/auth/refresh", post(refresh))
        .route("/api/auth/profile", get(profile))
        .route("/api/noticias", get(noticias))
        .route("/api/publicacoes", get(publicacoes))
        .route("/api/favoritos", get(favoritos_list).post(favoritos_create))
        .route("/api/favoritos/{id}", delete(favoritos_delete))
        .route("/api/notificacoes", get(notificacoes))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind 127.0.0.1:0");
    let base = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("mock portal task error: {e:?}");
        }
    });

    (handle, base)
}

/// Poll a public endpoint until the server answers or the deadline passes.
pub async fn wait_until_ready(base: &str, timeout_ms: u64) -> Result<(), String> {
    let deadline = std::time::Instant::now() + Duration::from_millis(timeout_ms);
    let probe = reqwest::Client::new();
    loop {
        match probe.get(format!("{base}/api/noticias")).send().await {
            Ok(resp) if resp.status().is_success() => return Ok(()),
            _ if std::time::Instant::now() >= deadline => {
                return Err(format!("timeout waiting for mock portal at {base}"));
            }
            _ => tokio::time::sleep(Duration::from_millis(25)).await,
        }
    }
}
