use std::boxed::Box;
use std::result::Result;
use std::sync::Arc;

use crate::adapter::thirdparty::{AbstractOrderBackend, LoginError, StaffProfile};
use crate::constant::message as const_msg;
use crate::logging::{app_log_event, AppLogContext, AppLogLevel};

pub struct StaffLoginUseCase {
    pub backend: Arc<Box<dyn AbstractOrderBackend>>,
    pub logctx: Arc<AppLogContext>,
}

impl StaffLoginUseCase {
    pub async fn execute(self, username: &str, password: &str) -> Result<StaffProfile, LoginError> {
        let logctx = self.logctx;
        if username.trim().is_empty() || password.is_empty() {
            let msg = const_msg::LOGIN_MISSING_INPUT.to_string();
            return Err(LoginError::Rejected(msg));
        }
        let result = self.backend.login(username, password).await;
        match &result {
            Ok(p) => app_log_event!(logctx, AppLogLevel::INFO, "staff-id:{}", p.id),
            Err(e) => app_log_event!(logctx, AppLogLevel::WARNING, "username:{}, {:?}", username, e),
        }
        result
    }
}
