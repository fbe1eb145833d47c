//! Unified application error model and mapping helpers.
//! This module provides a common error enum used across the session layer,
//! the authenticated HTTP client and the CLI, along with mappers between
//! portal HTTP statuses and error variants.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppError {
    UserInput { code: String, message: String },
    NotFound { code: String, message: String },
    Conflict { code: String, message: String },
    Auth { code: String, message: String },
    Csrf { code: String, message: String },
    Token { code: String, message: String },
    Network { code: String, message: String },
    Internal { code: String, message: String },
}

impl AppError {
    pub fn code_str(&self) -> &str {
        match self {
            AppError::UserInput { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::Conflict { code, .. }
            | AppError::Auth { code, .. }
            | AppError::Csrf { code, .. }
            | AppError::Token { code, .. }
            | AppError::Network { code, .. }
            | AppError::Internal { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::UserInput { message, .. }
            | AppError::NotFound { message, .. }
            | AppError::Conflict { message, .. }
            | AppError::Auth { message, .. }
            | AppError::Csrf { message, .. }
            | AppError::Token { message, .. }
            | AppError::Network { message, .. }
            | AppError::Internal { message, .. } => message.as_str(),
        }
    }

    pub fn user<S: Into<String>>(code: S, msg: S) -> Self { AppError::UserInput { code: code.into(), message: msg.into() } }
    pub fn not_found<S: Into<String>>(code: S, msg: S) -> Self { AppError::NotFound { code: code.into(), message: msg.into() } }
    pub fn conflict<S: Into<String>>(code: S, msg: S) -> Self { AppError::Conflict { code: code.into(), message: msg.into() } }
    pub fn auth<S: Into<String>>(code: S, msg: S) -> Self { AppError::Auth { code: code.into(), message: msg.into() } }
    pub fn csrf<S: Into<String>>(code: S, msg: S) -> Self { AppError::Csrf { code: code.into(), message: msg.into() } }
    pub fn token<S: Into<String>>(code: S, msg: S) -> Self { AppError::Token { code: code.into(), message: msg.into() } }
    pub fn network<S: Into<String>>(code: S, msg: S) -> Self { AppError::Network { code: code.into(), message: msg.into() } }
    pub fn internal<S: Into<String>>(code: S, msg: S) -> Self { AppError::Internal { code: code.into(), message: msg.into() } }

    /// Map to the HTTP status a portal endpoint would answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            AppError::UserInput { .. } => 400,
            AppError::NotFound { .. } => 404,
            AppError::Conflict { .. } => 409,
            AppError::Auth { .. } | AppError::Token { .. } => 401,
            AppError::Csrf { .. } => 403,
            AppError::Network { .. } => 503,
            AppError::Internal { .. } => 500,
        }
    }

    /// Inverse mapping: classify a non-2xx portal response by status code.
    /// The body message is carried verbatim so sign-in callers can surface it.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => AppError::Auth { code: "unauthorized".into(), message },
            403 => AppError::Csrf { code: "forbidden".into(), message },
            404 => AppError::NotFound { code: "not_found".into(), message },
            409 => AppError::Conflict { code: "conflict".into(), message },
            400..=499 => AppError::UserInput { code: format!("http_{status}"), message },
            _ => AppError::Internal { code: format!("http_{status}"), message },
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        // Transport-level failure: no response reached us. Anything with a
        // status is mapped through from_status by the client instead.
        AppError::Network { code: "http_transport".into(), message: err.to_string() }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal { code: "internal".into(), message: err.to_string() }
    }
}
