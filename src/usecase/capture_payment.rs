use std::boxed::Box;
use std::result::Result;
use std::sync::Arc;

use crate::adapter::device::{AbstractImageCompressor, AbstractImagePicker};
use crate::adapter::thirdparty::{AbstractOrderBackend, SubmissionError};
use crate::constant::message as const_msg;
use crate::error::AppError;
use crate::logging::{app_log_event, AppLogContext, AppLogLevel};
use crate::model::{PaymentCaptureOutcome, PaymentSubmission, ReceiptImage};

pub struct PrepareReceiptUseCase {
    pub picker: Arc<Box<dyn AbstractImagePicker>>,
    pub compressor: Arc<Box<dyn AbstractImageCompressor>>,
    pub logctx: Arc<AppLogContext>,
}

pub struct SubmitPaymentUseCase {
    pub backend: Arc<Box<dyn AbstractOrderBackend>>,
    pub logctx: Arc<AppLogContext>,
}

impl PrepareReceiptUseCase {
    /// Returns `None` if staff cancelled the picker. Compression failure
    /// does not abort, the original image is kept instead.
    pub async fn execute(self) -> Result<Option<ReceiptImage>, AppError> {
        let logctx = self.logctx;
        let original = match self.picker.pick().await {
            Ok(Some(v)) => v,
            Ok(None) => return Ok(None),
            Err(e) => {
                app_log_event!(logctx, AppLogLevel::ERROR, "receipt-pick, {}", e);
                return Err(e);
            }
        };
        let chosen = match self.compressor.compress(&original).await {
            Ok(compressed) => {
                app_log_event!(
                    logctx,
                    AppLogLevel::DEBUG,
                    "receipt compressed, nbytes:{} -> {}",
                    original.payload.len(),
                    compressed.payload.len()
                );
                compressed
            }
            Err(e) => {
                app_log_event!(
                    logctx,
                    AppLogLevel::WARNING,
                    "receipt-compress, fallback to original, {}",
                    e
                );
                original
            }
        };
        Ok(Some(chosen))
    } // end of fn execute
} // end of impl PrepareReceiptUseCase

impl SubmitPaymentUseCase {
    /// Sends the submission once, then converts the result to the message
    /// shown to staff. The submission is consumed, a retry needs a new one.
    pub async fn execute(self, submission: PaymentSubmission) -> PaymentCaptureOutcome {
        let logctx = self.logctx;
        let ordernum = submission.ordernum.clone();
        let result = self.backend.submit_payment(submission).await;
        let outcome = Self::to_outcome(result);
        if let PaymentCaptureOutcome::Rejected(reason) = &outcome {
            app_log_event!(
                logctx,
                AppLogLevel::WARNING,
                "ordernum:{}, reason:{}",
                &ordernum,
                reason
            );
        } else {
            app_log_event!(logctx, AppLogLevel::INFO, "ordernum:{}, confirmed", &ordernum);
        }
        outcome
    }

    pub fn to_outcome(result: Result<(), SubmissionError>) -> PaymentCaptureOutcome {
        match result {
            Ok(()) => PaymentCaptureOutcome::Confirmed,
            Err(SubmissionError::BackendRejected(msg)) => PaymentCaptureOutcome::Rejected(msg),
            Err(SubmissionError::MalformedResponse) => {
                PaymentCaptureOutcome::Rejected(const_msg::PAYMENT_REJECTED.to_string())
            }
            Err(SubmissionError::Transport(_detail)) => {
                PaymentCaptureOutcome::Rejected(const_msg::PAYMENT_TRANSPORT.to_string())
            }
        }
    }
} // end of impl SubmitPaymentUseCase
