mod config;
mod model;
mod usecase;

use std::boxed::Box;
use std::result::Result as DefaultResult;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use delivery_staff::adapter::device::{
    AbstractDeviceLocator, AbstractImageCompressor, AbstractImagePicker, LocationError,
    LocationPermission,
};
use delivery_staff::adapter::thirdparty::{
    AbstractGeocoder, AbstractOrderBackend, FetchError, GeocodeError, LoginError, StaffProfile,
    SubmissionError,
};
use delivery_staff::confidentiality::AbstractConfidentiality;
use delivery_staff::error::{AppError, AppErrorCode};
use delivery_staff::logging::AppLogContext;
use delivery_staff::model::{GeoCoordinate, OrderDirectory, PaymentSubmission, ReceiptImage};
use delivery_staff::workflow::WorkflowServices;
use delivery_staff::{
    hard_limit, AppBasepathCfg, AppCfgHardLimit, AppConfig, AppSharedState,
};

pub(crate) const EXAMPLE_REL_PATH: &str = "tests/unit/examples/";

pub(crate) fn ut_basepath() -> String {
    env!("CARGO_MANIFEST_DIR").to_string() + "/"
}

pub(crate) fn ut_hard_limit() -> AppCfgHardLimit {
    AppCfgHardLimit {
        max_timeout_secs: hard_limit::MAX_TIMEOUT_SECS,
        max_receipt_width: hard_limit::MAX_RECEIPT_WIDTH,
    }
}

pub(crate) fn ut_setup_config(cfg_fname: &str) -> AppConfig {
    let basepath = ut_basepath();
    let fullpath = basepath.clone() + EXAMPLE_REL_PATH + cfg_fname;
    AppConfig {
        staff_app: AppConfig::parse_from_file(fullpath, ut_hard_limit()).unwrap(),
        basepath: AppBasepathCfg {
            system: basepath.clone(),
            service: basepath,
        },
    }
}

pub(crate) fn ut_logctx() -> Arc<AppLogContext> {
    let cfg = ut_setup_config("config_ok.json");
    let logctx = AppLogContext::new(&cfg.basepath, &cfg.staff_app.logging);
    Arc::new(logctx)
}

pub(crate) fn ut_setup_share_state(
    cfg_fname: &str,
    cfdntl: Box<dyn AbstractConfidentiality>,
) -> AppSharedState {
    let cfg = ut_setup_config(cfg_fname);
    let logctx = AppLogContext::new(&cfg.basepath, &cfg.staff_app.logging);
    AppSharedState::with_confidentiality(cfg, logctx, cfdntl).unwrap()
}

pub(crate) fn ut_read_example(fname: &str) -> Vec<u8> {
    let fullpath = ut_basepath() + EXAMPLE_REL_PATH + fname;
    std::fs::read(fullpath).unwrap()
}

pub(crate) fn ut_order_directory() -> OrderDirectory {
    let raw = ut_read_example("orders_ok.json");
    delivery_staff::adapter::thirdparty::parse_order_list(&raw).unwrap()
}

pub(crate) struct MockConfidential {}
impl AbstractConfidentiality for MockConfidential {
    fn try_get_payload(&self, _id: &str) -> DefaultResult<String, AppError> {
        Ok("\"unit-test\"".to_string())
    }
}

fn no_canned_reply() -> String {
    "no canned reply".to_string()
}

#[derive(Default)]
pub(crate) struct MockOrderBackend {
    pub fetch_result: Arc<Mutex<Option<DefaultResult<OrderDirectory, FetchError>>>>,
    pub submit_result: Arc<Mutex<Option<DefaultResult<(), SubmissionError>>>>,
    pub login_result: Arc<Mutex<Option<DefaultResult<StaffProfile, LoginError>>>>,
    pub submitted: Arc<Mutex<Vec<PaymentSubmission>>>,
}

#[async_trait]
impl AbstractOrderBackend for MockOrderBackend {
    async fn fetch_orders(&self) -> DefaultResult<OrderDirectory, FetchError> {
        let mut guard = self.fetch_result.lock().unwrap();
        guard
            .take()
            .unwrap_or(Err(FetchError::Transport(no_canned_reply())))
    }
    async fn submit_payment(&self, submission: PaymentSubmission) -> DefaultResult<(), SubmissionError> {
        self.submitted.lock().unwrap().push(submission);
        let mut guard = self.submit_result.lock().unwrap();
        guard
            .take()
            .unwrap_or(Err(SubmissionError::Transport(no_canned_reply())))
    }
    async fn login(&self, _username: &str, _password: &str) -> DefaultResult<StaffProfile, LoginError> {
        let mut guard = self.login_result.lock().unwrap();
        guard
            .take()
            .unwrap_or(Err(LoginError::Transport(no_canned_reply())))
    }
}

#[derive(Default)]
pub(crate) struct MockGeocoder {
    pub result: Arc<Mutex<Option<DefaultResult<GeoCoordinate, GeocodeError>>>>,
    pub num_calls: Arc<AtomicU32>,
}

#[async_trait]
impl AbstractGeocoder for MockGeocoder {
    async fn resolve_address(&self, _address: &str) -> DefaultResult<GeoCoordinate, GeocodeError> {
        self.num_calls.fetch_add(1, Ordering::Relaxed);
        let mut guard = self.result.lock().unwrap();
        guard
            .take()
            .unwrap_or(Err(GeocodeError::Unavailable(no_canned_reply())))
    }
}

pub(crate) struct MockDeviceLocator {
    pub permission: LocationPermission,
    pub position: Mutex<Option<DefaultResult<GeoCoordinate, LocationError>>>,
    pub read_delay: Option<Duration>,
    pub num_reads: Arc<AtomicU32>,
}

impl MockDeviceLocator {
    pub(crate) fn granted(lat: f64, lng: f64) -> Self {
        let pos = GeoCoordinate::try_new(lat, lng).unwrap();
        Self {
            permission: LocationPermission::Granted,
            position: Mutex::new(Some(Ok(pos))),
            read_delay: None,
            num_reads: Arc::new(AtomicU32::new(0)),
        }
    }
    pub(crate) fn denied() -> Self {
        Self {
            permission: LocationPermission::Denied,
            position: Mutex::new(None),
            read_delay: None,
            num_reads: Arc::new(AtomicU32::new(0)),
        }
    }
}

#[async_trait]
impl AbstractDeviceLocator for MockDeviceLocator {
    async fn request_permission(&self) -> DefaultResult<LocationPermission, LocationError> {
        Ok(self.permission)
    }
    async fn read_position(&self) -> DefaultResult<GeoCoordinate, LocationError> {
        self.num_reads.fetch_add(1, Ordering::Relaxed);
        if let Some(d) = self.read_delay {
            tokio::time::sleep(d).await;
        }
        let mut guard = self.position.lock().unwrap();
        guard
            .take()
            .unwrap_or(Err(LocationError::Unavailable(no_canned_reply())))
    }
}

#[derive(Default)]
pub(crate) struct MockImagePicker {
    pub result: Mutex<Option<DefaultResult<Option<ReceiptImage>, AppError>>>,
}

#[async_trait]
impl AbstractImagePicker for MockImagePicker {
    async fn pick(&self) -> DefaultResult<Option<ReceiptImage>, AppError> {
        let mut guard = self.result.lock().unwrap();
        guard.take().unwrap_or(Ok(None))
    }
}

#[derive(Default)]
pub(crate) struct MockImageCompressor {
    pub result: Mutex<Option<DefaultResult<ReceiptImage, AppError>>>,
}

#[async_trait]
impl AbstractImageCompressor for MockImageCompressor {
    async fn compress(&self, _original: &ReceiptImage) -> DefaultResult<ReceiptImage, AppError> {
        let mut guard = self.result.lock().unwrap();
        guard.take().unwrap_or(Err(AppError {
            code: AppErrorCode::DataCorruption,
            detail: Some("unsupported image format".to_string()),
        }))
    }
}

pub(crate) fn ut_services(
    backend: MockOrderBackend,
    geocoder: MockGeocoder,
    locator: MockDeviceLocator,
    picker: MockImagePicker,
    compressor: MockImageCompressor,
) -> WorkflowServices {
    WorkflowServices {
        backend: Arc::new(Box::new(backend)),
        geocoder: Arc::new(Box::new(geocoder)),
        locator: Arc::new(Box::new(locator)),
        picker: Arc::new(Box::new(picker)),
        compressor: Arc::new(Box::new(compressor)),
        timeout: Duration::from_secs(2),
        logctx: ut_logctx(),
    }
}
