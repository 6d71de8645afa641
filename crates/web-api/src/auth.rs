//! Bearer 令牌提取
//!
//! 提取器本身从不拒绝请求：处理函数先完成输入校验，再调用
//! [`BearerToken::authenticate`]，这样 400 总是先于 401/403。

use std::convert::Infallible;

use application::{AuthService, Identity};
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use crate::error::ApiError;

#[derive(Debug, Clone, Default)]
pub struct BearerToken(Option<String>);

impl BearerToken {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|header| header.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_owned);
        Self(token)
    }

    /// 缺少令牌返回 401，令牌无效或过期返回 403
    pub fn authenticate(&self, auth: &AuthService) -> Result<Identity, ApiError> {
        let token = self
            .0
            .as_deref()
            .ok_or_else(|| ApiError::unauthorized("missing bearer token"))?;
        Ok(auth.authenticate(token)?)
    }
}

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}
