use std::collections::VecDeque;
use std::result::Result;
use std::vec::Vec;

use crate::adapter::device::LocationError;
use crate::adapter::thirdparty::{FetchError, GeocodeError};
use crate::constant::message as const_msg;
use crate::error::AppError;
use crate::model::{
    compute_route, GeoCoordinate, OrderDirectory, OrderFilter, OrderModel, OrderStatus,
    PaymentCaptureError, PaymentCaptureModel, PaymentCaptureOutcome, PaymentSubmission,
    ReceiptImage, RouteSegment,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub level: NotifyLevel,
    pub title: String,
    pub message: String,
}

/// which modal surface is on top of the order list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    None,
    Details,
    Payment,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowError {
    NoOrderSelected,
    OrderNotFound(String),
    SurfaceMismatch { expect: Surface, actual: Surface },
    Payment(PaymentCaptureError),
}

/// Captured when a geocoding request is dispatched, the result is applied
/// only if the same order is still on the details surface and the route
/// state has not been reset meanwhile.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeTicket {
    pub ordernum: String,
    pub epoch: u32,
}

/// Captured when receipt picking or payment submission is dispatched,
/// compared against the payment pipeline epoch on completion.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentTicket {
    pub ordernum: String,
    pub epoch: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RouteDispatch {
    // destination already cached for the selected order
    Ready,
    InFlight,
    Resolve {
        ticket: GeocodeTicket,
        address: String,
    },
}

pub struct WorkflowState {
    directory: OrderDirectory,
    filter: OrderFilter,
    selected: Option<String>,
    surface: Surface,
    // session-scoped, kept across order selections
    device_coord: Option<GeoCoordinate>,
    // order-scoped, reset whenever a surface is closed
    destination: Option<GeoCoordinate>,
    route_visible: bool,
    route_epoch: u32,
    geocode_in_flight: bool,
    payment: PaymentCaptureModel,
    // submissions not yet answered by the backend, outlives pipeline resets
    payment_in_flight: Vec<PaymentTicket>,
    notifications: VecDeque<Notification>,
}

impl Notification {
    pub fn info(title: &str, message: &str) -> Self {
        Self {
            level: NotifyLevel::Info,
            title: title.to_string(),
            message: message.to_string(),
        }
    }
    pub fn error(title: &str, message: &str) -> Self {
        Self {
            level: NotifyLevel::Error,
            title: title.to_string(),
            message: message.to_string(),
        }
    }
}

impl From<&FetchError> for Notification {
    fn from(value: &FetchError) -> Self {
        let msg = match value {
            FetchError::Transport(_) => const_msg::FETCH_ORDERS_TRANSPORT,
            FetchError::MalformedPayload(_) => const_msg::FETCH_ORDERS_MALFORMED,
            FetchError::Rejected(m) => m.as_str(),
        };
        Self::error(const_msg::TITLE_ERROR, msg)
    }
}

impl From<&LocationError> for Notification {
    fn from(value: &LocationError) -> Self {
        match value {
            LocationError::PermissionDenied => {
                Self::error(const_msg::TITLE_PERMISSION_DENIED, const_msg::LOCATION_DENIED)
            }
            LocationError::Unavailable(_) => {
                Self::error(const_msg::TITLE_ERROR, const_msg::LOCATION_UNAVAILABLE)
            }
        }
    }
}

impl From<&GeocodeError> for Notification {
    fn from(value: &GeocodeError) -> Self {
        let msg = match value {
            GeocodeError::NotFound => const_msg::GEOCODE_NOT_FOUND,
            GeocodeError::Unavailable(_) => const_msg::GEOCODE_UNAVAILABLE,
        };
        Self::error(const_msg::TITLE_ERROR, msg)
    }
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self {
            directory: OrderDirectory::default(),
            filter: OrderFilter::All,
            selected: None,
            surface: Surface::None,
            device_coord: None,
            destination: None,
            route_visible: false,
            route_epoch: 0,
            geocode_in_flight: false,
            payment: PaymentCaptureModel::default(),
            payment_in_flight: Vec::new(),
            notifications: VecDeque::new(),
        }
    }
}

impl WorkflowState {
    pub fn directory(&self) -> &OrderDirectory {
        &self.directory
    }
    pub fn filter(&self) -> OrderFilter {
        self.filter
    }
    pub fn surface(&self) -> Surface {
        self.surface
    }
    pub fn selected_order(&self) -> Option<&OrderModel> {
        self.selected
            .as_ref()
            .and_then(|n| self.directory.find(n.as_str()))
    }
    pub fn device_coordinate(&self) -> Option<&GeoCoordinate> {
        self.device_coord.as_ref()
    }
    pub fn destination(&self) -> Option<&GeoCoordinate> {
        self.destination.as_ref()
    }
    pub fn route_visible(&self) -> bool {
        self.route_visible
    }
    pub fn payment(&self) -> &PaymentCaptureModel {
        &self.payment
    }
    pub fn notify(&mut self, item: Notification) {
        self.notifications.push_back(item);
    }
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain(..).collect()
    }

    pub fn visible_orders(&self) -> Vec<OrderModel> {
        self.directory.filter_by_status(self.filter)
    }
    pub fn pending_delivery_count(&self) -> usize {
        self.directory.count_by_status(OrderStatus::ToBeDelivered)
    }
    pub fn apply_filter(&mut self, filter: OrderFilter) {
        self.filter = filter;
    }

    /// failure keeps the previous order set untouched
    pub fn apply_orders(&mut self, result: Result<OrderDirectory, FetchError>) {
        match result {
            Ok(dir) => {
                self.directory = dir;
                let gone = self
                    .selected
                    .as_ref()
                    .map(|n| self.directory.find(n.as_str()).is_none())
                    .unwrap_or(false);
                if gone {
                    self.close_details();
                }
            }
            Err(e) => self.notify(Notification::from(&e)),
        }
    }

    pub fn apply_device_location(&mut self, result: Result<GeoCoordinate, LocationError>) {
        match result {
            Ok(c) => {
                self.device_coord = Some(c);
            }
            Err(e) => self.notify(Notification::from(&e)),
        }
    }

    fn _reset_route(&mut self) {
        self.destination = None;
        self.route_visible = false;
        self.geocode_in_flight = false;
        self.route_epoch += 1;
    }

    fn _expect_surface(&self, expect: Surface) -> Result<(), WorkflowError> {
        if self.surface == expect {
            Ok(())
        } else {
            Err(WorkflowError::SurfaceMismatch {
                expect,
                actual: self.surface,
            })
        }
    }

    fn _selected_num(&self) -> Result<String, WorkflowError> {
        self.selected.clone().ok_or(WorkflowError::NoOrderSelected)
    }

    /// Opens details of the order, geocoding is not triggered here.
    pub fn select_order(&mut self, ordernum: &str) -> Result<(), WorkflowError> {
        if self.directory.find(ordernum).is_none() {
            return Err(WorkflowError::OrderNotFound(ordernum.to_string()));
        }
        let same = self.selected.as_deref() == Some(ordernum);
        if !same {
            self._reset_route();
            self.payment.reset();
            self.selected = Some(ordernum.to_string());
        }
        self.surface = Surface::Details;
        Ok(())
    }

    pub fn begin_route_request(&mut self) -> Result<RouteDispatch, WorkflowError> {
        self._expect_surface(Surface::Details)?;
        let ordernum = self._selected_num()?;
        if self.destination.is_some() {
            self.route_visible = true;
            return Ok(RouteDispatch::Ready);
        }
        if self.geocode_in_flight {
            return Ok(RouteDispatch::InFlight);
        }
        let address = self
            .directory
            .find(ordernum.as_str())
            .map(|o| o.address.clone())
            .ok_or(WorkflowError::OrderNotFound(ordernum.clone()))?;
        self.geocode_in_flight = true;
        let ticket = GeocodeTicket {
            ordernum,
            epoch: self.route_epoch,
        };
        Ok(RouteDispatch::Resolve { ticket, address })
    }

    /// Returns false if the result is stale and discarded.
    pub fn complete_route_request(
        &mut self,
        ticket: &GeocodeTicket,
        result: Result<GeoCoordinate, GeocodeError>,
    ) -> bool {
        // details stay underneath the payment surface
        let fresh = self.surface != Surface::None
            && self.selected.as_deref() == Some(ticket.ordernum.as_str())
            && self.route_epoch == ticket.epoch;
        if !fresh {
            return false;
        }
        self.geocode_in_flight = false;
        match result {
            Ok(c) => {
                self.destination = Some(c);
                self.route_visible = true;
            }
            Err(e) => self.notify(Notification::from(&e)),
        }
        true
    }

    /// Straight line for display, present only when the route view is on and
    /// both endpoints are known.
    pub fn route(&self) -> Option<RouteSegment> {
        if self.route_visible {
            compute_route(self.device_coord.as_ref(), self.destination.as_ref())
        } else {
            None
        }
    }

    pub fn open_payment(&mut self) -> Result<(), WorkflowError> {
        let ordernum = self._selected_num()?;
        if self.directory.find(ordernum.as_str()).is_none() {
            return Err(WorkflowError::OrderNotFound(ordernum));
        }
        if self.surface != Surface::Payment {
            self.payment.reset();
        }
        self.surface = Surface::Payment;
        Ok(())
    }

    pub fn close_details(&mut self) {
        self.surface = Surface::None;
        self.selected = None;
        self._reset_route();
        self.payment.reset();
    }

    // in-flight submission is not cancelled, its result turns stale
    pub fn close_payment(&mut self) {
        if self.surface == Surface::Payment {
            self.surface = Surface::Details;
        }
        self._reset_route();
        self.payment.reset();
    }

    fn _payment_ticket(&self) -> Result<PaymentTicket, WorkflowError> {
        self._expect_surface(Surface::Payment)?;
        let ordernum = self._selected_num()?;
        Ok(PaymentTicket {
            ordernum,
            epoch: self.payment.epoch(),
        })
    }

    fn _payment_fresh(&self, ticket: &PaymentTicket) -> bool {
        self.surface == Surface::Payment
            && self.selected.as_deref() == Some(ticket.ordernum.as_str())
            && self.payment.epoch() == ticket.epoch
    }

    fn _submission_pending(&self, ordernum: &str) -> bool {
        self.payment_in_flight
            .iter()
            .any(|t| t.ordernum.as_str() == ordernum)
    }

    pub fn begin_receipt_pick(&mut self) -> Result<PaymentTicket, WorkflowError> {
        let ticket = self._payment_ticket()?;
        if self.payment.is_submitting() || self._submission_pending(ticket.ordernum.as_str()) {
            Err(WorkflowError::Payment(PaymentCaptureError::Busy))
        } else {
            Ok(ticket)
        }
    }

    pub fn complete_receipt_pick(
        &mut self,
        ticket: &PaymentTicket,
        result: Result<Option<ReceiptImage>, AppError>,
    ) -> bool {
        if !self._payment_fresh(ticket) || self.payment.is_submitting() {
            return false;
        }
        match result {
            Ok(Some(img)) => {
                // rejected once the pipeline is confirmed
                if self.payment.select_receipt(img).is_err() {
                    return false;
                }
            }
            Ok(None) => {}
            Err(_e) => self.notify(Notification::error(
                const_msg::TITLE_ERROR,
                const_msg::RECEIPT_PICK_FAILURE,
            )),
        }
        true
    }

    /// Validates the order and moves the pipeline to `Submitting`. A second
    /// confirmation while a submission of the same order is outstanding
    /// yields `Busy` without notification, even if the payment surface was
    /// closed and reopened meanwhile.
    pub fn begin_confirm_payment(
        &mut self,
    ) -> Result<(PaymentTicket, PaymentSubmission), WorkflowError> {
        self._expect_surface(Surface::Payment)?;
        let ordernum = self._selected_num()?;
        if self._submission_pending(ordernum.as_str()) {
            return Err(WorkflowError::Payment(PaymentCaptureError::Busy));
        }
        let order = self
            .directory
            .find(ordernum.as_str())
            .ok_or(WorkflowError::OrderNotFound(ordernum.clone()))?;
        let submission = match self.payment.start_submit(order) {
            Ok(s) => s,
            Err(PaymentCaptureError::Busy) => {
                return Err(WorkflowError::Payment(PaymentCaptureError::Busy))
            }
            Err(e) => {
                self.notify(Notification::error(
                    const_msg::TITLE_ERROR,
                    const_msg::PAYMENT_INVALID_ORDER,
                ));
                return Err(WorkflowError::Payment(e));
            }
        };
        let ticket = PaymentTicket {
            ordernum,
            epoch: self.payment.epoch(),
        };
        self.payment_in_flight.push(ticket.clone());
        Ok((ticket, submission))
    }

    /// A confirmed payment always marks the order delivered, since the
    /// backend has changed it already, but a stale one leaves surfaces and
    /// pipeline alone. A stale rejection is dropped entirely.
    pub fn complete_confirm_payment(
        &mut self,
        ticket: &PaymentTicket,
        outcome: PaymentCaptureOutcome,
    ) -> bool {
        self.payment_in_flight.retain(|t| t != ticket);
        let fresh = self._payment_fresh(ticket) && self.payment.is_submitting();
        match outcome {
            PaymentCaptureOutcome::Confirmed => {
                // the order may have vanished after a refresh, nothing to mark
                let _ = self.directory.mark_delivered(ticket.ordernum.as_str());
                self.notify(Notification::info(
                    const_msg::TITLE_SUCCESS,
                    const_msg::PAYMENT_SAVED,
                ));
                if fresh {
                    let _ = self.payment.finish(PaymentCaptureOutcome::Confirmed);
                    self.surface = Surface::Details;
                    self._reset_route();
                }
            }
            PaymentCaptureOutcome::Rejected(reason) => {
                if fresh {
                    self.notify(Notification::error(const_msg::TITLE_ERROR, reason.as_str()));
                    let _ = self.payment.finish(PaymentCaptureOutcome::Rejected(reason));
                }
            }
        }
        fresh
    } // end of fn complete_confirm_payment
} // end of impl WorkflowState
