use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, FixedOffset, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::config::NotifierConfig;

use super::i_notifier::{Delivery, INotificationService};

const JST_OFFSET_SECS: i32 = 9 * 60 * 60;
const FILE_NAME: &str = "response.json";
const FILE_TYPE: &str = "application/json";

#[derive(Debug, Deserialize)]
struct SlackResponse<T> {
    ok: bool,
    error: Option<String>,
    #[serde(flatten)]
    data: T,
}

#[derive(Debug, Deserialize)]
struct UploadUrl {
    upload_url: Option<String>,
    file_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Empty {}

#[derive(Debug, Clone)]
pub struct SlackNotificationServiceImpl {
    cnf: NotifierConfig,
    client: reqwest::Client,
}

impl SlackNotificationServiceImpl {
    pub fn new(cnf: NotifierConfig) -> Result<Self> {
        let client = reqwest::ClientBuilder::new()
            .timeout(cnf.timeout)
            .build()
            .context("failed to build slack http client")?;
        Ok(Self { cnf, client })
    }

    fn endpoint(&self, api_method: &str) -> String {
        format!("{}/{api_method}", self.cnf.api_url.trim_end_matches('/'))
    }

    async fn read<T: DeserializeOwned>(api_method: &str, resp: reqwest::Response) -> Result<T> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("slack {api_method} responded {status}: {body}");
        }
        let parsed: SlackResponse<T> = resp
            .json()
            .await
            .with_context(|| format!("invalid slack {api_method} response"))?;
        if !parsed.ok {
            bail!(
                "slack {api_method} failed: {}",
                parsed.error.as_deref().unwrap_or("unknown error")
            );
        }
        Ok(parsed.data)
    }

    async fn upload_file(&self, channel: &str, token: &str, message: &str, payload: Vec<u8>) -> Result<()> {
        let api_method = "files.getUploadURLExternal";
        let length = payload.len().to_string();
        let resp = self
            .client
            .post(self.endpoint(api_method))
            .bearer_auth(token)
            .form(&[("filename", FILE_NAME), ("length", length.as_str())])
            .send()
            .await
            .with_context(|| format!("failed to call slack {api_method}"))?;
        let target: UploadUrl = Self::read(api_method, resp).await?;
        let upload_url = target
            .upload_url
            .ok_or_else(|| anyhow!("slack {api_method} returned no upload_url"))?;
        let file_id = target
            .file_id
            .ok_or_else(|| anyhow!("slack {api_method} returned no file_id"))?;

        let resp = self
            .client
            .post(&upload_url)
            .header(http::header::CONTENT_TYPE, FILE_TYPE)
            .body(payload)
            .send()
            .await
            .context("failed to upload file content to slack")?
            .error_for_status()
            .context("slack rejected file content")?;
        tracing::debug!("uploaded file {file_id}: {}", resp.status());

        let api_method = "files.completeUploadExternal";
        let resp = self
            .client
            .post(self.endpoint(api_method))
            .bearer_auth(token)
            .json(&json!({
                "files": [{ "id": file_id, "title": upload_title(Utc::now())? }],
                "channel_id": channel,
                "initial_comment": message,
            }))
            .send()
            .await
            .with_context(|| format!("failed to call slack {api_method}"))?;
        Self::read::<Empty>(api_method, resp).await?;
        Ok(())
    }

    async fn post_message(&self, channel: &str, token: &str, message: &str) -> Result<()> {
        let api_method = "chat.postMessage";
        let resp = self
            .client
            .post(self.endpoint(api_method))
            .bearer_auth(token)
            .json(&json!({
                "channel": channel,
                "text": escape_text(message),
            }))
            .send()
            .await
            .with_context(|| format!("failed to call slack {api_method}"))?;
        Self::read::<Empty>(api_method, resp).await?;
        Ok(())
    }
}

impl INotificationService for SlackNotificationServiceImpl {
    #[tracing::instrument(level = "debug", skip_all)]
    async fn notify(&self, message: &str, payload: Option<Vec<u8>>) -> Result<Delivery> {
        let Some((channel, token)) = self.cnf.credentials() else {
            tracing::debug!("slack channel or token not configured, skipping notification");
            return Ok(Delivery::Skipped);
        };
        match payload {
            Some(payload) => self.upload_file(channel, token, message, payload).await?,
            None => self.post_message(channel, token, message).await?,
        }
        tracing::info!("notified slack channel {channel}");
        Ok(Delivery::Sent)
    }
}

/// File title, stamped with the time in UTC+9.
pub fn upload_title(now: DateTime<Utc>) -> Result<String> {
    let jst = FixedOffset::east_opt(JST_OFFSET_SECS).context("invalid utc offset")?;
    Ok(format!(
        "Result {}",
        now.with_timezone(&jst).format("(%Y-%m-%d %H:%M)")
    ))
}

/// Slack control characters in message text.
pub fn escape_text(message: &str) -> String {
    message
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
