//! Request identity: resolves a bearer token to the signed-in user.
//!
//! Sign-in itself happens in the browser against the auth backend; this module
//! only asks the backend who a token belongs to.

use std::time::Duration;

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[allow(dead_code)]
    pub email: Option<String>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn resolve(&self, access_token: &str) -> Result<AuthUser, AppError>;
}

/// Asks the Supabase auth API (`GET /auth/v1/user`) who owns a token.
pub struct SupabaseAuth {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseAuth {
    pub fn new(base_url: String, anon_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to build HTTP client"),
            base_url,
            anon_key,
        }
    }
}

#[async_trait]
impl IdentityProvider for SupabaseAuth {
    async fn resolve(&self, access_token: &str) -> Result<AuthUser, AppError> {
        let response = self
            .client
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("auth backend unreachable: {e}"))?;

        match response.status() {
            status if status.is_success() => response
                .json::<AuthUser>()
                .await
                .map_err(|e| AppError::Internal(anyhow::anyhow!("bad auth response: {e}"))),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AppError::Unauthorized),
            status => {
                warn!("Auth backend returned {status}");
                Err(AppError::Unauthorized)
            }
        }
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Unauthorized)?;
        state.identity.resolve(token).await
    }
}
