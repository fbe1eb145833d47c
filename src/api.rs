//! Typed surface over the portal's domain endpoints.
//!
//! News and publication listings are public; everything else rides the
//! authenticated client and inherits its bearer/CSRF handling. Wire models
//! mirror the backend's JSON field names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::PortalClient;
use crate::error::AppResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Noticia {
    #[serde(default)]
    pub id_noticia: Option<String>,
    pub titulo: String,
    #[serde(default)]
    pub subtitulo: Option<String>,
    pub data_publicacao: DateTime<Utc>,
    #[serde(default)]
    pub nome_autor: Option<String>,
    #[serde(default)]
    pub imagem_noticia: Option<String>,
    #[serde(default)]
    pub lead: Option<String>,
    #[serde(default)]
    pub categoria: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub identifier: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Publicacao {
    pub id_publicacao: String,
    pub titulo: String,
    #[serde(default)]
    pub subtitulo: Option<String>,
    #[serde(default)]
    pub palavras_chave: Vec<String>,
    #[serde(default)]
    pub banner: Option<String>,
    #[serde(default)]
    pub resumo: Option<String>,
    #[serde(default)]
    pub nome_de_usuario: Option<String>,
    #[serde(default)]
    pub categoria: Option<String>,
    #[serde(default)]
    pub autores: Vec<String>,
    pub data_criacao: DateTime<Utc>,
    #[serde(default)]
    pub data_modificacao: Option<DateTime<Utc>>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub visualizacoes: i64,
    pub slug: String,
    pub identifier: String,
    #[serde(default)]
    pub visibilidade: bool,
    #[serde(default)]
    pub id_usuario: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Favorito {
    pub id_favoritos: String,
    pub id_usuario: String,
    pub id_publicacao: String,
    pub data_favorito: DateTime<Utc>,
    #[serde(default)]
    pub titulo: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub identifier: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notificacao {
    pub id_notificacao: String,
    pub titulo: String,
    pub mensagem: String,
    pub data_envio: DateTime<Utc>,
    #[serde(default)]
    pub id_noticia: Option<String>,
    pub tipo: String,
    #[serde(default)]
    pub id_usuario: Option<String>,
    #[serde(default)]
    pub enviado_para_todos: bool,
}

/// The profile subset of the backend's user record that the portal edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Perfil {
    pub id_usuario: String,
    pub nome_de_usuario: String,
    pub email: String,
    #[serde(default)]
    pub nome_completo: Option<String>,
    #[serde(default)]
    pub perfil_imagem: Option<String>,
    #[serde(default)]
    pub curriculo_lattes: Option<String>,
    #[serde(default)]
    pub telefone: Option<String>,
    #[serde(default)]
    pub ocupacao: Option<String>,
    #[serde(default)]
    pub descricao: Option<String>,
    #[serde(default)]
    pub instituicao: Option<String>,
    #[serde(default)]
    pub pais: Option<String>,
}

/// Listing filter shared by the news and publication endpoints.
#[derive(Debug, Clone, Default)]
pub struct PageFilter {
    pub pagina: Option<u32>,
    pub limite: Option<u32>,
    pub categoria: Option<String>,
    pub busca: Option<String>,
}

impl PageFilter {
    /// Render as a query suffix, empty when nothing is set.
    pub fn query_string(&self) -> String {
        let mut pairs: Vec<String> = Vec::new();
        if let Some(p) = self.pagina {
            pairs.push(format!("pagina={p}"));
        }
        if let Some(l) = self.limite {
            pairs.push(format!("limite={l}"));
        }
        if let Some(c) = &self.categoria {
            pairs.push(format!("categoria={}", urlencoding::encode(c)));
        }
        if let Some(b) = &self.busca {
            pairs.push(format!("busca={}", urlencoding::encode(b)));
        }
        if pairs.is_empty() {
            String::new()
        } else {
            format!("?{}", pairs.join("&"))
        }
    }
}

impl PortalClient {
    pub async fn noticias(&self, filter: &PageFilter) -> AppResult<Vec<Noticia>> {
        self.get(&format!("/api/noticias{}", filter.query_string())).await
    }

    pub async fn noticia(&self, id: &str) -> AppResult<Noticia> {
        self.get(&format!("/api/noticias/{id}")).await
    }

    pub async fn publicacoes(&self, filter: &PageFilter) -> AppResult<Vec<Publicacao>> {
        self.get(&format!("/api/publicacoes{}", filter.query_string())).await
    }

    pub async fn publicacao(&self, identifier: &str, slug: &str) -> AppResult<Publicacao> {
        self.get(&format!("/api/publicacoes/{identifier}/{slug}")).await
    }

    /// Publications owned by the signed-in user.
    pub async fn minhas_publicacoes(&self) -> AppResult<Vec<Publicacao>> {
        self.get("/api/publicacoes/usuario").await
    }

    pub async fn create_publicacao(
        &self,
        body: &serde_json::Value,
    ) -> AppResult<serde_json::Value> {
        self.post("/api/publicacoes", body).await
    }

    pub async fn favoritos(&self) -> AppResult<Vec<Favorito>> {
        self.get("/api/favoritos").await
    }

    pub async fn favoritar(&self, id_publicacao: &str) -> AppResult<serde_json::Value> {
        self.post("/api/favoritos", &serde_json::json!({ "id_publicacao": id_publicacao }))
            .await
    }

    pub async fn desfavoritar(&self, id_favoritos: &str) -> AppResult<()> {
        self.delete(&format!("/api/favoritos/{id_favoritos}")).await
    }

    pub async fn notificacoes(&self) -> AppResult<Vec<Notificacao>> {
        self.get("/api/notificacoes").await
    }

    pub async fn delete_notificacao(&self, id: &str) -> AppResult<()> {
        self.delete(&format!("/api/notificacoes/{id}")).await
    }

    pub async fn perfil(&self) -> AppResult<Perfil> {
        self.get("/api/auth/profile").await
    }

    pub async fn update_perfil(&self, perfil: &Perfil) -> AppResult<serde_json::Value> {
        self.put("/api/auth/profile", perfil).await
    }
}
