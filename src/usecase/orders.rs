use std::boxed::Box;
use std::result::Result;
use std::sync::Arc;

use crate::adapter::thirdparty::{AbstractOrderBackend, FetchError};
use crate::logging::{app_log_event, AppLogContext, AppLogLevel};
use crate::model::{OrderDirectory, OrderStatus};

pub struct RefreshOrdersUseCase {
    pub backend: Arc<Box<dyn AbstractOrderBackend>>,
    pub logctx: Arc<AppLogContext>,
}

impl RefreshOrdersUseCase {
    pub async fn execute(self) -> Result<OrderDirectory, FetchError> {
        let logctx = self.logctx;
        let dir = self.backend.fetch_orders().await.map_err(|e| {
            app_log_event!(logctx, AppLogLevel::WARNING, "{:?}", e);
            e
        })?;
        app_log_event!(
            logctx,
            AppLogLevel::DEBUG,
            "num-orders:{}, pending:{}",
            dir.orders().len(),
            dir.count_by_status(OrderStatus::ToBeDelivered)
        );
        Ok(dir)
    }
}
