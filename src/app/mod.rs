use crate::services::api_checker::ApiCheckServiceImpl;
use crate::services::i_api_checker::IApiCheckService;

#[derive(Debug, Clone)]
pub struct AppEnv<CheckService: IApiCheckService + Clone = ApiCheckServiceImpl> {
    pub check_svc: CheckService,
}

impl<CheckService> AppEnv<CheckService>
where
    CheckService: IApiCheckService + Clone,
{
    pub fn new(check_svc: CheckService) -> Self {
        Self { check_svc }
    }
}
