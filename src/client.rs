//! Authenticated HTTP plumbing for the portal API.
//!
//! Every request carries `Authorization: Bearer` and `X-CSRF-Token` headers
//! when the token store has them, and cookies always travel with the
//! request. Expired-token responses are not retried or refreshed here; a 401
//! surfaces to the caller as an ordinary `Auth` error.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::token_store::TokenStore;

pub const CSRF_HEADER: &str = "x-csrf-token";

#[derive(Clone, Debug)]
pub struct PortalClient {
    base: Url,
    http: reqwest::Client,
    store: Arc<TokenStore>,
}

impl PortalClient {
    pub fn new(base: &str, store: Arc<TokenStore>) -> AppResult<Self> {
        let base = Url::parse(base)
            .map_err(|e| AppError::user("invalid_base_url".to_string(), e.to_string()))?;
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self { base, http, store })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn store(&self) -> &Arc<TokenStore> {
        &self.store
    }

    fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(token) = self.store.access_token() {
            if let Ok(v) = HeaderValue::from_str(&format!("Bearer {token}")) {
                headers.insert(AUTHORIZATION, v);
            }
        }
        if let Some(csrf) = self.store.csrf_token() {
            if let Ok(v) = HeaderValue::from_str(&csrf) {
                headers.insert(CSRF_HEADER, v);
            }
        }
        headers
    }

    /// Build a request against the portal with credentials attached.
    pub fn request(&self, method: Method, path: &str) -> AppResult<RequestBuilder> {
        let url = self
            .base
            .join(path)
            .map_err(|e| AppError::user("invalid_path".to_string(), e.to_string()))?;
        Ok(self.http.request(method, url).headers(self.auth_headers()))
    }

    /// Send and classify. Non-2xx becomes an `AppError` with the backend's
    /// message pulled out of the body when there is one.
    pub async fn execute(&self, rb: RequestBuilder) -> AppResult<Response> {
        let resp = rb.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let text = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&text)
            .ok()
            .and_then(|v| {
                v.get("message")
                    .or_else(|| v.get("error"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| text.trim().to_string());
        Err(AppError::from_status(status.as_u16(), message))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let resp = self.execute(self.request(Method::GET, path)?).await?;
        Ok(resp.json().await?)
    }

    /// Raw GET for callers that want the payload untyped (the CLI does).
    pub async fn get_value(&self, path: &str) -> AppResult<serde_json::Value> {
        self.get(path).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> AppResult<T> {
        let rb = self.request(Method::POST, path)?.json(body);
        let resp = self.execute(rb).await?;
        Ok(resp.json().await?)
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> AppResult<T> {
        let rb = self.request(Method::PUT, path)?.json(body);
        let resp = self.execute(rb).await?;
        Ok(resp.json().await?)
    }

    pub async fn delete(&self, path: &str) -> AppResult<()> {
        self.execute(self.request(Method::DELETE, path)?).await?;
        Ok(())
    }
}
