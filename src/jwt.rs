//! Local decoding of the portal's access token payload.
//!
//! No signature verification happens here: the decoded claims are a
//! best-effort `User` shape and stay provisional until the backend's
//! validate-token round-trip confirms the session.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::session::User;

/// Claims the portal backend places in the access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    #[serde(rename = "idUsuario")]
    pub id_usuario: String,
    #[serde(rename = "nivelDeAcesso", default)]
    pub nivel_de_acesso: String,
    #[serde(rename = "nomeDeUsuario", default)]
    pub nome_de_usuario: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "perfilImagem", default)]
    pub perfil_imagem: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
}

impl AccessClaims {
    /// Adopt the decoded claims as the session's user, keeping the raw token
    /// alongside for request authentication.
    pub fn into_user(self, token: &str) -> User {
        User {
            id: self.id_usuario,
            email: self.email,
            display_name: self.nome_de_usuario,
            profile_image_url: self.perfil_imagem,
            access_level: self.nivel_de_acesso,
            token: token.to_string(),
        }
    }
}

/// Decode the payload segment of a JWT without checking its signature.
/// Any structural problem is a `Token` error, fatal to the current session.
pub fn decode_access_token(token: &str) -> AppResult<AccessClaims> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(AppError::token(
            "malformed_jwt".to_string(),
            format!("expected 3 token segments, got {}", parts.len()),
        ));
    }
    let payload = URL_SAFE_NO_PAD
        .decode(parts[1])
        .map_err(|e| AppError::token("jwt_base64".to_string(), e.to_string()))?;
    serde_json::from_slice(&payload)
        .map_err(|e| AppError::token("jwt_payload".to_string(), e.to_string()))
}
