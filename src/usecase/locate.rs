use std::boxed::Box;
use std::result::Result;
use std::sync::Arc;
use std::time::Duration;

use crate::adapter::device::{AbstractDeviceLocator, LocationError, LocationPermission};
use crate::logging::{app_log_event, AppLogContext, AppLogLevel};
use crate::model::GeoCoordinate;

/// Snapshot of staff position, taken once per workflow session
pub struct LocateDeviceUseCase {
    pub locator: Arc<Box<dyn AbstractDeviceLocator>>,
    pub timeout: Duration,
    pub logctx: Arc<AppLogContext>,
}

impl LocateDeviceUseCase {
    pub async fn execute(self) -> Result<GeoCoordinate, LocationError> {
        let logctx = self.logctx;
        // permission prompt waits for staff, it is not bounded by timeout
        let permission = self.locator.request_permission().await?;
        if permission == LocationPermission::Denied {
            app_log_event!(logctx, AppLogLevel::INFO, "location permission denied");
            return Err(LocationError::PermissionDenied);
        }
        let result = tokio::time::timeout(self.timeout, self.locator.read_position())
            .await
            .unwrap_or_else(|_elapsed| Err(LocationError::Unavailable("timeout".to_string())));
        if let Err(e) = result.as_ref() {
            app_log_event!(logctx, AppLogLevel::WARNING, "{:?}", e);
        }
        result
    }
}
