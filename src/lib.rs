use std::boxed::Box;
use std::result::Result;
use std::sync::Arc;

pub mod adapter;
pub mod api;
pub mod confidentiality;
pub mod constant;
pub mod error;
pub mod logging;
pub mod model;
pub mod usecase;
pub mod workflow;

mod config;
pub use config::{
    AppBackendCfg, AppBasepathCfg, AppCfgHardLimit, AppCfgInitArgs, AppConfidentialCfg,
    AppConfig, AppDeviceCfg, AppGeocoderCfg, AppLogHandlerCfg, AppLoggerCfg, AppLoggingCfg,
    AppNetworkCfg, AppReceiptCfg, StaffAppCfg,
};

use adapter::device::{
    AbstractDeviceLocator, AbstractImageCompressor, AbstractImagePicker, AppConfigDeviceLocator,
    JpegReceiptCompressor,
};
use adapter::thirdparty::{
    app_backend_context, app_geocoder_context, AbstractGeocoder, AbstractOrderBackend,
};
use confidentiality::AbstractConfidentiality;
use error::AppError;
use logging::AppLogContext;
use workflow::WorkflowServices;

type AppLogAlias = Arc<String>;

pub mod hard_limit {
    pub const MAX_TIMEOUT_SECS: u16 = 120;
    pub const MAX_RECEIPT_WIDTH: u32 = 4096;
}

// state shared by the workflow sessions of the application
pub struct AppSharedState {
    _cfg: Arc<AppConfig>,
    _log: Arc<AppLogContext>,
    _backend: Arc<Box<dyn AbstractOrderBackend>>,
    _geocoder: Arc<Box<dyn AbstractGeocoder>>,
    _locator: Arc<Box<dyn AbstractDeviceLocator>>,
    _compressor: Arc<Box<dyn AbstractImageCompressor>>,
}

impl AppSharedState {
    pub fn new(cfg: AppConfig, log: AppLogContext) -> Result<Self, AppError> {
        let cfdntl = confidentiality::build_context(&cfg)?;
        Self::with_confidentiality(cfg, log, cfdntl)
    }

    pub fn with_confidentiality(
        cfg: AppConfig,
        log: AppLogContext,
        confidential: Box<dyn AbstractConfidentiality>,
    ) -> Result<Self, AppError> {
        let confidential = Arc::new(confidential);
        let log = Arc::new(log);
        let app_cfg = &cfg.staff_app;
        let timeout = app_cfg.network.timeout();
        let backend = app_backend_context(&app_cfg.backend, timeout, log.clone())?;
        let geocoder = app_geocoder_context(&app_cfg.geocoder, confidential, timeout, log.clone())?;
        let locator = AppConfigDeviceLocator::new(app_cfg.device.clone());
        let compressor = JpegReceiptCompressor::from(&app_cfg.receipt);
        Ok(Self {
            _cfg: Arc::new(cfg),
            _log: log,
            _backend: Arc::new(backend),
            _geocoder: Arc::new(geocoder),
            _locator: Arc::new(Box::new(locator)),
            _compressor: Arc::new(Box::new(compressor)),
        })
    } // end of fn with_confidentiality

    pub fn config(&self) -> &Arc<AppConfig> {
        &self._cfg
    }
    pub fn log_context(&self) -> &Arc<AppLogContext> {
        &self._log
    }
    pub fn backend(&self) -> Arc<Box<dyn AbstractOrderBackend>> {
        self._backend.clone()
    }
    pub fn geocoder(&self) -> Arc<Box<dyn AbstractGeocoder>> {
        self._geocoder.clone()
    }

    /// the image picker depends on how receipts are chosen in each session,
    /// so the caller provides it
    pub fn workflow_services(&self, picker: Box<dyn AbstractImagePicker>) -> WorkflowServices {
        WorkflowServices {
            backend: self._backend.clone(),
            geocoder: self._geocoder.clone(),
            locator: self._locator.clone(),
            picker: Arc::new(picker),
            compressor: self._compressor.clone(),
            timeout: self._cfg.staff_app.network.timeout(),
            logctx: self._log.clone(),
        }
    }
} // end of impl AppSharedState

impl Clone for AppSharedState {
    fn clone(&self) -> Self {
        Self {
            _cfg: self._cfg.clone(),
            _log: self._log.clone(),
            _backend: self._backend.clone(),
            _geocoder: self._geocoder.clone(),
            _locator: self._locator.clone(),
            _compressor: self._compressor.clone(),
        }
    }
}
