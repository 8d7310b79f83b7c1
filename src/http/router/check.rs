use crate::app::AppEnv;
use crate::model::error::AppError;
use crate::model::RequestPayload;
use crate::services::i_api_checker::IApiCheckService;
use axum::body::Bytes;
use axum::extract::State;
use http::{header, HeaderMap, Method};
use std::sync::Arc;

fn ensure_json(headers: &HeaderMap) -> Result<(), AppError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|h| h.to_str().ok());
    match content_type {
        Some(c) if c.starts_with("application/json") => Ok(()),
        other => Err(AppError::InvalidContentType(other.map(str::to_string))),
    }
}

#[tracing::instrument(level = "debug", skip_all, fields(method = %method))]
pub async fn check_handler<CheckService>(
    State(app): State<Arc<AppEnv<CheckService>>>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Result<String, AppError>
where
    CheckService: IApiCheckService + Clone,
{
    if method != Method::POST {
        return Err(AppError::MethodNotAllowed(method));
    }
    ensure_json(&headers).inspect_err(|e| tracing::debug!("rejected request: {e}"))?;
    let request: RequestPayload = serde_json::from_slice(&body)
        .map_err(AppError::InvalidPayload)
        .inspect_err(|e| tracing::debug!("rejected request: {e}"))?;

    let outcome = app.check_svc.check(request).await?;
    Ok(format!("{outcome}\n"))
}
