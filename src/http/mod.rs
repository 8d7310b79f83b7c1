pub mod router;

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Serves `router` until `shutdown` resolves, then stops accepting and gives
/// in-flight requests at most `grace` to finish.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F, grace: Duration) -> Result<()>
where
    F: Future<Output = ()>,
{
    let token = CancellationToken::new();
    let drain = token.clone();
    let server = axum::serve(listener, router)
        .with_graceful_shutdown(async move { drain.cancelled().await })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        res = &mut server => return res.context("axum server failed"),
        _ = shutdown => {},
    };
    tracing::info!("draining in-flight requests...");
    token.cancel();
    tokio::select! {
        res = &mut server => res.context("axum server failed")?,
        _ = tokio::time::sleep(grace) => {
            tracing::info!("in-flight requests couldn't finish after the graceful duration, forced shutting down..");
        },
    };
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_shutdown_bounded_by_grace() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = Router::new().fallback(|| async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            "late"
        });
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let server = tokio::spawn(serve(
            listener,
            router,
            async {
                let _ = rx.await;
            },
            Duration::from_millis(200),
        ));

        let stuck = tokio::spawn(reqwest::get(format!("http://{addr}/")));
        // let the request reach the handler before signalling
        tokio::time::sleep(Duration::from_millis(100)).await;
        tx.send(()).unwrap();

        let started = Instant::now();
        tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .expect("server outlived its grace period")
            .unwrap()
            .unwrap();
        assert!(started.elapsed() < Duration::from_secs(5));
        stuck.abort();
    }

    #[tokio::test]
    async fn test_idle_server_stops_on_signal() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let router = Router::new().fallback(|| async { "ok" });
        let res = tokio::time::timeout(
            Duration::from_secs(5),
            serve(listener, router, async {}, Duration::from_secs(10)),
        )
        .await
        .expect("idle server should stop immediately");
        assert!(res.is_ok());
    }
}
