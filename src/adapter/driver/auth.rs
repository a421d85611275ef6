use crate::adapter::driver::rest_api::{ApiError, AppState};
use crate::application::RequestContext;
use crate::domain::model::{UserId, UserRole};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    Json,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 認証エラー
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("Failed to issue token: {0}")]
    IssueFailed(String),
}

/// JWTのクレーム
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// 利用者ID
    pub sub: String,
    pub role: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
}

/// HS256でJWTを発行・検証する
/// 発行はログインを担う外部サービスとテストのために用意している
#[derive(Clone)]
pub struct JwtCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtCodec {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// 利用者情報からトークンを発行する
    ///
    /// # Arguments
    /// * `ctx` - トークンに載せる利用者
    /// * `ttl` - 有効期間
    pub fn issue(&self, ctx: &RequestContext, ttl: Duration) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let ttl = i64::try_from(ttl.as_secs())
            .map_err(|e| AuthError::IssueFailed(e.to_string()))?;
        let claims = Claims {
            sub: ctx.user_id.to_string(),
            role: ctx.role.as_str().to_string(),
            name: ctx.name.clone(),
            email: ctx.email.clone(),
            phone: ctx.phone.clone(),
            exp: now.saturating_add(ttl),
            iat: now,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::IssueFailed(e.to_string()))
    }

    /// トークンを検証してリクエストコンテキストに変換する
    pub fn verify(&self, token: &str) -> Result<RequestContext, AuthError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?
            .claims;

        let user_id = UserId::from_string(&claims.sub)
            .map_err(|e| AuthError::InvalidToken(format!("sub: {}", e)))?;
        let role = UserRole::from_string(&claims.role)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok(RequestContext {
            user_id,
            role,
            name: claims.name,
            email: claims.email,
            phone: claims.phone,
        })
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, AuthError> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)
}

fn unauthorized(err: AuthError) -> (StatusCode, Json<ApiError>) {
    tracing::debug!(error = %err, "Rejected unauthenticated request");
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiError::new(err.to_string(), "UNAUTHORIZED")),
    )
}

/// 認証済みの利用者
/// ハンドラーの引数に置くとBearerトークンが必須になる
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = (StatusCode, Json<ApiError>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).map_err(unauthorized)?;
        let ctx = state.jwt.verify(token).map_err(unauthorized)?;
        Ok(AuthUser(ctx))
    }
}
