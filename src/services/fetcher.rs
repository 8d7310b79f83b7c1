use std::time::Duration;

use anyhow::Context;
use data_encoding::BASE64;
use http::header::CONTENT_TYPE;
use reqwest::Method;

use crate::model::error::AppError;
use crate::model::{FetchData, RequestPayload};

const JSON_MIME: &str = "application/json";

/// Client for outbound checks. Every request it sends is cut off after
/// `timeout`.
pub fn client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    reqwest::ClientBuilder::new()
        .timeout(timeout)
        .build()
        .context("failed to build fetch client")
}

/// Maps the payload's method field onto one of the supported verbs. Missing or
/// empty means GET.
pub fn resolve_method(method: Option<&str>) -> Result<Method, AppError> {
    match method.unwrap_or("") {
        "" | "GET" => Ok(Method::GET),
        "HEAD" => Ok(Method::HEAD),
        "POST" => Ok(Method::POST),
        "PUT" => Ok(Method::PUT),
        "DELETE" => Ok(Method::DELETE),
        other => Err(AppError::InvalidMethod(other.to_string())),
    }
}

fn decode_body(body: Option<&str>) -> Result<Option<Vec<u8>>, AppError> {
    match body {
        None | Some("") => Ok(None),
        Some(encoded) => BASE64
            .decode(encoded.as_bytes())
            .map(Some)
            .map_err(AppError::InvalidBody),
    }
}

/// Issues the request described by `request`. Method and body are validated
/// before anything touches the network; the timeout comes from `client`.
#[tracing::instrument(level = "debug", skip_all, fields(url = %request.url))]
pub async fn fetch(client: &reqwest::Client, request: &RequestPayload) -> Result<FetchData, AppError> {
    let method = resolve_method(request.method.as_deref())?;
    let body = decode_body(request.body.as_deref())?;

    let mut builder = client.request(method.clone(), &request.url);
    if let Some(body) = body {
        if let Some(content_type) = request.content_type.as_deref().filter(|c| !c.is_empty()) {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        builder = builder.body(body);
    }

    tracing::info!("fetch {method} {}", request.url);
    let resp = builder
        .send()
        .await
        .context("failed to send request")
        .map_err(AppError::Fetch)?;
    tracing::info!("fetch result: {}", resp.status());

    let is_json = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|c| c.starts_with(JSON_MIME));

    if is_json {
        let data = resp
            .json::<serde_json::Value>()
            .await
            .context("failed to decode json response")
            .map_err(AppError::Fetch)?;
        Ok(FetchData::Structured(data))
    } else {
        let data = resp
            .bytes()
            .await
            .context("failed to read response body")
            .map_err(AppError::Fetch)?;
        tracing::info!("response: {}", String::from_utf8_lossy(&data));
        Ok(FetchData::Raw(data.to_vec()))
    }
}
