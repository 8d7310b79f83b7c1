use crate::model::error::AppError;
use crate::model::{QueryOutcome, RequestPayload};
use crate::query::Query;

use super::fetcher;
use super::i_api_checker::IApiCheckService;
use super::i_notifier::INotificationService;
use super::slack_notifier::SlackNotificationServiceImpl;

#[derive(Debug, Clone)]
pub struct ApiCheckServiceImpl<Notifier: INotificationService + Clone = SlackNotificationServiceImpl> {
    client: reqwest::Client,
    notifier: Notifier,
}

impl<Notifier> ApiCheckServiceImpl<Notifier>
where
    Notifier: INotificationService + Clone,
{
    /// `client` carries the fetch timeout, see [`fetcher::client`].
    pub fn new(client: reqwest::Client, notifier: Notifier) -> Self {
        Self { client, notifier }
    }
}

impl<Notifier> IApiCheckService for ApiCheckServiceImpl<Notifier>
where
    Notifier: INotificationService + Clone,
{
    #[tracing::instrument(level = "debug", skip_all, fields(url = %request.url))]
    async fn check(&self, request: RequestPayload) -> Result<QueryOutcome, AppError> {
        let query = Query::parse(&request.query)
            .map_err(AppError::from)
            .inspect_err(|e| tracing::error!(step = "compile", "{e}"))?;

        let data = fetcher::fetch(&self.client, &request)
            .await
            .inspect_err(|e| tracing::error!(step = "fetch", "{e}"))?;

        // evaluation is unbounded CPU work, keep it off the runtime workers
        let input = data.query_input();
        let outcome = tokio::task::spawn_blocking(move || query.run(input))
            .await
            .map_err(AppError::QueryTask)
            .and_then(|res| res.map_err(AppError::from))
            .inspect_err(|e| tracing::error!(step = "evaluate", "{e}"))?;
        tracing::info!("verdict: {}", outcome.verdict);

        if outcome.verdict {
            let payload = data
                .to_pretty_json()
                .map_err(AppError::Serialize)
                .inspect_err(|e| tracing::error!(step = "serialize", "{e}"))?;
            self.notifier
                .notify(&request.notification_message, Some(payload))
                .await
                .map_err(AppError::Notify)
                .inspect_err(|e| tracing::error!(step = "notify", "{e}"))?;
        }

        Ok(outcome)
    }
}
