use crate::app::AppEnv;
use crate::services::i_api_checker::IApiCheckService;
use std::sync::Arc;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

mod check;

/// Every method and path lands on the check handler.
pub async fn new<CheckService>(app: AppEnv<CheckService>) -> Router
where
    CheckService: IApiCheckService + Clone,
{
    let app_state = Arc::new(app);
    Router::new()
        .fallback(check::check_handler::<CheckService>)
        .with_state(app_state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}
