mod state;

use std::boxed::Box;
use std::result::Result;
use std::sync::Arc;
use std::time::Duration;
use std::vec::Vec;

use crate::adapter::device::{AbstractDeviceLocator, AbstractImageCompressor, AbstractImagePicker};
use crate::adapter::thirdparty::{AbstractGeocoder, AbstractOrderBackend, GeocodeError};
use crate::error::AppError;
use crate::logging::{app_log_event, AppLogContext, AppLogLevel};
use crate::model::{
    GeoCoordinate, OrderFilter, OrderModel, PaymentCaptureError, PaymentCaptureOutcome,
    PaymentSubmission, ReceiptImage, RouteSegment,
};
use crate::usecase::{
    LocateDeviceUseCase, PrepareReceiptUseCase, RefreshOrdersUseCase, ResolveDestinationUseCase,
    SubmitPaymentUseCase,
};

pub use state::{
    GeocodeTicket, Notification, NotifyLevel, PaymentTicket, RouteDispatch, Surface,
    WorkflowError, WorkflowState,
};

/// Leaf services the controller talks to, none of them calls another one
#[derive(Clone)]
pub struct WorkflowServices {
    pub backend: Arc<Box<dyn AbstractOrderBackend>>,
    pub geocoder: Arc<Box<dyn AbstractGeocoder>>,
    pub locator: Arc<Box<dyn AbstractDeviceLocator>>,
    pub picker: Arc<Box<dyn AbstractImagePicker>>,
    pub compressor: Arc<Box<dyn AbstractImageCompressor>>,
    pub timeout: Duration,
    pub logctx: Arc<AppLogContext>,
}

/// Screen-level orchestrator of a staff session.
///
/// Every mutation goes through the `WorkflowState` transitions. The async
/// convenience methods run a use case and apply its result immediately, the
/// `begin_*` / `complete_*` pairs let callers interleave other actions while
/// a request is in flight, late results are then checked against the ticket
/// captured at dispatch time.
pub struct WorkflowController {
    state: WorkflowState,
    services: WorkflowServices,
}

impl WorkflowController {
    pub fn new(services: WorkflowServices) -> Self {
        Self {
            state: WorkflowState::default(),
            services,
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// Fetches the order set and takes the device position snapshot, the
    /// two requests are independent and run concurrently.
    pub async fn start_session(&mut self) {
        let svc = &self.services;
        let uc_orders = RefreshOrdersUseCase {
            backend: svc.backend.clone(),
            logctx: svc.logctx.clone(),
        };
        let uc_locate = LocateDeviceUseCase {
            locator: svc.locator.clone(),
            timeout: svc.timeout,
            logctx: svc.logctx.clone(),
        };
        let (orders, position) = tokio::join!(uc_orders.execute(), uc_locate.execute());
        self.state.apply_orders(orders);
        self.state.apply_device_location(position);
    }

    pub async fn refresh_orders(&mut self) {
        let uc = RefreshOrdersUseCase {
            backend: self.services.backend.clone(),
            logctx: self.services.logctx.clone(),
        };
        let result = uc.execute().await;
        self.state.apply_orders(result);
    }

    pub fn apply_filter(&mut self, filter: OrderFilter) {
        self.state.apply_filter(filter);
    }

    pub fn visible_orders(&self) -> Vec<OrderModel> {
        self.state.visible_orders()
    }

    pub fn pending_delivery_count(&self) -> usize {
        self.state.pending_delivery_count()
    }

    pub fn select_order(&mut self, ordernum: &str) -> Result<(), WorkflowError> {
        self.state.select_order(ordernum).map_err(|e| self._log_rejected(e))
    }

    pub fn begin_route_request(&mut self) -> Result<RouteDispatch, WorkflowError> {
        self.state
            .begin_route_request()
            .map_err(|e| self._log_rejected(e))
    }

    pub fn complete_route_request(
        &mut self,
        ticket: &GeocodeTicket,
        result: Result<GeoCoordinate, GeocodeError>,
    ) -> bool {
        let applied = self.state.complete_route_request(ticket, result);
        if !applied {
            let logctx = &self.services.logctx;
            app_log_event!(
                logctx,
                AppLogLevel::DEBUG,
                "stale geocode result discarded, ordernum:{}, epoch:{}",
                &ticket.ordernum,
                ticket.epoch
            );
        }
        applied
    }

    /// Resolves the destination of the selected order unless it is cached,
    /// then shows the route.
    pub async fn request_route(&mut self) -> Result<(), WorkflowError> {
        let (ticket, address) = match self.begin_route_request()? {
            RouteDispatch::Resolve { ticket, address } => (ticket, address),
            _ready_or_inflight => return Ok(()),
        };
        let uc = ResolveDestinationUseCase {
            geocoder: self.services.geocoder.clone(),
            logctx: self.services.logctx.clone(),
        };
        let result = uc.execute(address).await;
        self.complete_route_request(&ticket, result);
        Ok(())
    }

    pub fn route(&self) -> Option<RouteSegment> {
        self.state.route()
    }

    pub fn open_payment(&mut self) -> Result<(), WorkflowError> {
        self.state.open_payment().map_err(|e| self._log_rejected(e))
    }

    pub fn close_details(&mut self) {
        self.state.close_details();
    }

    pub fn close_payment(&mut self) {
        self.state.close_payment();
    }

    pub fn begin_receipt_pick(&mut self) -> Result<PaymentTicket, WorkflowError> {
        self.state
            .begin_receipt_pick()
            .map_err(|e| self._log_rejected(e))
    }

    pub fn complete_receipt_pick(
        &mut self,
        ticket: &PaymentTicket,
        result: Result<Option<ReceiptImage>, AppError>,
    ) -> bool {
        let applied = self.state.complete_receipt_pick(ticket, result);
        if !applied {
            self._log_stale("receipt", ticket);
        }
        applied
    }

    pub async fn pick_receipt(&mut self) -> Result<(), WorkflowError> {
        let ticket = self.begin_receipt_pick()?;
        let uc = PrepareReceiptUseCase {
            picker: self.services.picker.clone(),
            compressor: self.services.compressor.clone(),
            logctx: self.services.logctx.clone(),
        };
        let result = uc.execute().await;
        self.complete_receipt_pick(&ticket, result);
        Ok(())
    }

    pub fn begin_confirm_payment(
        &mut self,
    ) -> Result<(PaymentTicket, PaymentSubmission), WorkflowError> {
        self.state.begin_confirm_payment().map_err(|e| {
            if e == WorkflowError::Payment(PaymentCaptureError::Busy) {
                let logctx = &self.services.logctx;
                app_log_event!(logctx, AppLogLevel::DEBUG, "submission in flight, ignored");
                e
            } else {
                self._log_rejected(e)
            }
        })
    }

    pub fn complete_confirm_payment(
        &mut self,
        ticket: &PaymentTicket,
        outcome: PaymentCaptureOutcome,
    ) -> bool {
        let applied = self.state.complete_confirm_payment(ticket, outcome);
        if !applied {
            self._log_stale("payment", ticket);
        }
        applied
    }

    /// Submits the payment of the selected order once. Re-entrant calls
    /// while a submission is in flight return `Busy`.
    pub async fn confirm_payment(&mut self) -> Result<(), WorkflowError> {
        let (ticket, submission) = self.begin_confirm_payment()?;
        let uc = SubmitPaymentUseCase {
            backend: self.services.backend.clone(),
            logctx: self.services.logctx.clone(),
        };
        let outcome = uc.execute(submission).await;
        self.complete_confirm_payment(&ticket, outcome);
        Ok(())
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.state.take_notifications()
    }

    fn _log_rejected(&self, e: WorkflowError) -> WorkflowError {
        let logctx = &self.services.logctx;
        app_log_event!(logctx, AppLogLevel::WARNING, "transition rejected, {:?}", e);
        e
    }

    fn _log_stale(&self, label: &str, ticket: &PaymentTicket) {
        let logctx = &self.services.logctx;
        app_log_event!(
            logctx,
            AppLogLevel::DEBUG,
            "stale {} result, ordernum:{}, epoch:{}",
            label,
            &ticket.ordernum,
            ticket.epoch
        );
    }
} // end of impl WorkflowController
