use anyhow::{Context, Result};
use api_checker::app::AppEnv;
use api_checker::services::api_checker::ApiCheckServiceImpl;
use api_checker::services::fetcher;
use api_checker::services::slack_notifier::SlackNotificationServiceImpl;
use api_checker::{http::router, *};
use std::time::Duration;
use tokio::signal;
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install C-c handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    let sigterm = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install sigterm handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => {
        tracing::info!("ctrl-c hit, graceful shutdown...")
        },
        _ = sigterm => {
        tracing::info!("SIGTERM received, graceful shutdown...")
        },
    };
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    let cnf = config::init()?;
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cnf.rust_log));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_span_events(FmtSpan::CLOSE))
        .init();
    tracing::debug!("loaded config: {cnf:?}");

    let fetch_client = fetcher::client(cnf.fetch_timeout())?;
    let notifier = SlackNotificationServiceImpl::new(cnf.notifier())?;
    if cnf.notifier().credentials().is_none() {
        tracing::info!("SLACK_CHANNEL or SLACK_TOKEN unset, notifications disabled");
    }

    let check_svc = ApiCheckServiceImpl::new(fetch_client, notifier);
    let app = AppEnv::new(check_svc);
    let router = router::new(app).await;

    let socket_addr = format!("{}:{}", cnf.app_host, cnf.port);
    let listener = tokio::net::TcpListener::bind(&socket_addr)
        .await
        .with_context(|| format!("failed to bind {socket_addr}"))?;
    tracing::info!("starting server on {socket_addr}");

    api_checker::http::serve(listener, router, shutdown_signal(), SHUTDOWN_GRACE).await?;
    tracing::info!("process terminated");
    Ok(())
}
