use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::{AppState, error::AppError, utils::verify_token};

/// 校验用户 JWT, 通过后把 `Claims` 放进请求扩展
pub async fn auth_middleware(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = auth.ok_or(AppError::Unauthorized)?;

    let claims = verify_token(bearer.token(), &state.config).map_err(|e| {
        tracing::debug!("Rejected token: {}", e);
        AppError::Unauthorized
    })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// 管理接口: Bearer 必须等于配置的管理密钥
pub async fn admin_middleware(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    match auth {
        Some(TypedHeader(Authorization(bearer)))
            if !state.config.admin_key.is_empty() && bearer.token() == state.config.admin_key =>
        {
            Ok(next.run(req).await)
        }
        _ => {
            tracing::warn!("Rejected admin request to {}", req.uri().path());
            Err(AppError::Unauthorized)
        }
    }
}
