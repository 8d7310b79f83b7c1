use crate::model::error::AppError;
use crate::model::{QueryOutcome, RequestPayload};

pub trait IApiCheckService: Send + Sync + 'static {
    fn check(
        &self,
        request: RequestPayload,
    ) -> impl Future<Output = Result<QueryOutcome, AppError>> + Send;
}
