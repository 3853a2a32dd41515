use std::boxed::Box;
use std::result::Result;
use std::sync::Arc;

use crate::adapter::thirdparty::{AbstractGeocoder, GeocodeError};
use crate::logging::{app_log_event, AppLogContext, AppLogLevel};
use crate::model::GeoCoordinate;

pub struct ResolveDestinationUseCase {
    pub geocoder: Arc<Box<dyn AbstractGeocoder>>,
    pub logctx: Arc<AppLogContext>,
}

impl ResolveDestinationUseCase {
    pub async fn execute(self, address: String) -> Result<GeoCoordinate, GeocodeError> {
        let logctx = self.logctx;
        self.geocoder
            .resolve_address(address.as_str())
            .await
            .map_err(|e| {
                app_log_event!(logctx, AppLogLevel::WARNING, "address:{}, {:?}", &address, e);
                e
            })
    }
}
