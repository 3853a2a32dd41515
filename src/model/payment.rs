use std::fmt::Debug;
use std::mem;
use std::result::Result;

use rust_decimal::Decimal;

use super::{OrderItemModel, OrderModel, OrderStatus};
use crate::constant::receipt as const_receipt;

#[derive(Debug, Clone, PartialEq)]
pub enum PaymentCaptureError {
    Busy,
    AlreadyConfirmed,
    AlreadyDelivered(String),
    MissingOrderNumber,
    NegativeTotal(String, Decimal),
    TotalMismatch {
        ordernum: String,
        expect: Decimal,
        actual: Decimal,
    },
    NotSubmitting,
}

#[derive(Clone, PartialEq)]
pub struct ReceiptImage {
    pub payload: Vec<u8>,
    pub media_type: String,
    pub file_name: String,
}

/// Transient payload of one confirmation attempt, dropped as soon as the
/// backend responds.
#[derive(Debug, Clone)]
pub struct PaymentSubmission {
    pub ordernum: String,
    pub customer_name: String,
    pub address: String,
    pub mobile: String,
    pub items: Vec<OrderItemModel>,
    pub total_amount: Decimal,
    pub receipt: Option<ReceiptImage>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaymentCaptureState {
    Idle,
    ImageSelected(ReceiptImage),
    Submitting {
        ordernum: String,
        receipt: Option<ReceiptImage>,
    },
    Succeeded {
        ordernum: String,
    },
    Failed {
        reason: String,
        receipt: Option<ReceiptImage>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaymentCaptureOutcome {
    Confirmed,
    Rejected(String),
}

#[derive(Debug)]
pub struct PaymentCaptureModel {
    state: PaymentCaptureState,
    // bumped whenever an attempt starts or the pipeline is reset, results
    // carrying older epoch are stale
    epoch: u32,
}

impl Debug for ReceiptImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReceiptImage")
            .field("nbytes", &self.payload.len())
            .field("media_type", &self.media_type)
            .field("file_name", &self.file_name)
            .finish()
    }
}

impl ReceiptImage {
    /// media type is derived from extension of the source name,
    /// e.g. `receipt.png` turns to `image/png`
    pub fn from_source(payload: Vec<u8>, source_name: &str) -> Self {
        let ext = source_name
            .rsplit_once('.')
            .map(|(_, e)| e.to_lowercase())
            .filter(|e| !e.is_empty() && !e.contains('/'))
            .unwrap_or_else(|| "jpeg".to_string());
        let media_type = match ext.as_str() {
            "jpg" => const_receipt::JPEG_MEDIA_TYPE.to_string(),
            _others => format!("image/{ext}"),
        };
        let file_name = format!("{}.{}", const_receipt::DEFAULT_FILE_STEM, ext);
        Self {
            payload,
            media_type,
            file_name,
        }
    }

    pub fn jpeg(payload: Vec<u8>) -> Self {
        Self {
            payload,
            media_type: const_receipt::JPEG_MEDIA_TYPE.to_string(),
            file_name: format!("{}.jpg", const_receipt::DEFAULT_FILE_STEM),
        }
    }
}

impl TryFrom<(&OrderModel, Option<ReceiptImage>)> for PaymentSubmission {
    type Error = PaymentCaptureError;
    fn try_from(value: (&OrderModel, Option<ReceiptImage>)) -> Result<Self, Self::Error> {
        let (order, receipt) = value;
        if order.ordernum.trim().is_empty() {
            return Err(PaymentCaptureError::MissingOrderNumber);
        }
        if order.status() == OrderStatus::Delivered {
            return Err(PaymentCaptureError::AlreadyDelivered(order.ordernum.clone()));
        }
        let actual = order.total_amount;
        if actual.is_sign_negative() && !actual.is_zero() {
            return Err(PaymentCaptureError::NegativeTotal(
                order.ordernum.clone(),
                actual,
            ));
        }
        let expect = order.items_total();
        if expect != actual {
            return Err(PaymentCaptureError::TotalMismatch {
                ordernum: order.ordernum.clone(),
                expect,
                actual,
            });
        }
        Ok(Self {
            ordernum: order.ordernum.clone(),
            customer_name: order.customer_name.clone(),
            address: order.address.clone(),
            mobile: order.mobile.clone(),
            items: order.items.clone(),
            total_amount: actual,
            receipt,
        })
    } // end of fn try-from
} // end of impl PaymentSubmission

impl Default for PaymentCaptureModel {
    fn default() -> Self {
        Self {
            state: PaymentCaptureState::Idle,
            epoch: 0,
        }
    }
}

impl PaymentCaptureModel {
    pub fn state(&self) -> &PaymentCaptureState {
        &self.state
    }
    pub fn epoch(&self) -> u32 {
        self.epoch
    }
    pub fn is_submitting(&self) -> bool {
        matches!(self.state, PaymentCaptureState::Submitting { .. })
    }
    pub fn pending_receipt(&self) -> Option<&ReceiptImage> {
        match &self.state {
            PaymentCaptureState::ImageSelected(r) => Some(r),
            PaymentCaptureState::Submitting { receipt, .. }
            | PaymentCaptureState::Failed { receipt, .. } => receipt.as_ref(),
            _others => None,
        }
    }

    pub fn select_receipt(&mut self, receipt: ReceiptImage) -> Result<(), PaymentCaptureError> {
        match &self.state {
            PaymentCaptureState::Submitting { .. } => Err(PaymentCaptureError::Busy),
            PaymentCaptureState::Succeeded { .. } => Err(PaymentCaptureError::AlreadyConfirmed),
            _others => {
                self.state = PaymentCaptureState::ImageSelected(receipt);
                Ok(())
            }
        }
    }

    /// Moves to `Submitting` and returns the only payload to send for this
    /// attempt. The receipt is optional, an attempt from `Idle` carries no
    /// image. Validation failure leaves the state untouched.
    pub fn start_submit(
        &mut self,
        order: &OrderModel,
    ) -> Result<PaymentSubmission, PaymentCaptureError> {
        match &self.state {
            PaymentCaptureState::Submitting { .. } => return Err(PaymentCaptureError::Busy),
            PaymentCaptureState::Succeeded { .. } => {
                return Err(PaymentCaptureError::AlreadyConfirmed)
            }
            _others => {}
        }
        let receipt = self.pending_receipt().cloned();
        let submission = PaymentSubmission::try_from((order, receipt))?;
        let prev = mem::replace(&mut self.state, PaymentCaptureState::Idle);
        let receipt = match prev {
            PaymentCaptureState::ImageSelected(r) => Some(r),
            PaymentCaptureState::Failed { receipt, .. } => receipt,
            _others => None,
        };
        self.state = PaymentCaptureState::Submitting {
            ordernum: submission.ordernum.clone(),
            receipt,
        };
        self.epoch += 1;
        Ok(submission)
    } // end of fn start_submit

    pub fn finish(&mut self, outcome: PaymentCaptureOutcome) -> Result<(), PaymentCaptureError> {
        if !self.is_submitting() {
            return Err(PaymentCaptureError::NotSubmitting);
        }
        let prev = mem::replace(&mut self.state, PaymentCaptureState::Idle);
        if let PaymentCaptureState::Submitting { ordernum, receipt } = prev {
            self.state = match outcome {
                PaymentCaptureOutcome::Confirmed => PaymentCaptureState::Succeeded { ordernum },
                PaymentCaptureOutcome::Rejected(reason) => {
                    PaymentCaptureState::Failed { reason, receipt }
                }
            };
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        self.state = PaymentCaptureState::Idle;
        self.epoch += 1;
    }
} // end of impl PaymentCaptureModel
