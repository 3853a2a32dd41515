mod backend;
mod base_client;
mod geocoder;
mod multipart;

use std::boxed::Box;
use std::result::Result;
use std::sync::Arc;
use std::time::Duration;

use crate::confidentiality::AbstractConfidentiality;
use crate::config::{AppBackendCfg, AppGeocoderCfg};
use crate::error::AppError;
use crate::logging::AppLogContext;

pub use backend::{
    parse_login_response, parse_order_list, parse_payment_response, AbstractOrderBackend,
    FetchError, LoginError, StaffProfile, SubmissionError,
};
pub use geocoder::{parse_geocode_response, AbstractGeocoder, GeocodeError};

use backend::AppOrderBackend;
use geocoder::AppGeocoder;

pub fn app_backend_context(
    cfg: &AppBackendCfg,
    timeout: Duration,
    logctx: Arc<AppLogContext>,
) -> Result<Box<dyn AbstractOrderBackend>, AppError> {
    let obj = AppOrderBackend::try_build(cfg, timeout, logctx)?;
    Ok(Box::new(obj))
}

pub fn app_geocoder_context(
    cfg: &AppGeocoderCfg,
    cfdntl: Arc<Box<dyn AbstractConfidentiality>>,
    timeout: Duration,
    logctx: Arc<AppLogContext>,
) -> Result<Box<dyn AbstractGeocoder>, AppError> {
    let obj = AppGeocoder::try_build(cfg, cfdntl, timeout, logctx)?;
    Ok(Box::new(obj))
}
