use std::sync::Arc;

use delivery_staff::adapter::thirdparty::SubmissionError;
use delivery_staff::constant::message as const_msg;
use delivery_staff::error::{AppError, AppErrorCode};
use delivery_staff::model::{PaymentCaptureOutcome, PaymentSubmission, ReceiptImage};
use delivery_staff::usecase::{PrepareReceiptUseCase, SubmitPaymentUseCase};

use super::ut_shared_backend;
use crate::{ut_logctx, ut_order_directory, MockImageCompressor, MockImagePicker, MockOrderBackend};

fn ut_original() -> ReceiptImage {
    ReceiptImage::from_source(vec![0x42u8; 64], "scan.heic")
}

fn ut_prepare(picker: MockImagePicker, compressor: MockImageCompressor) -> PrepareReceiptUseCase {
    PrepareReceiptUseCase {
        picker: Arc::new(Box::new(picker)),
        compressor: Arc::new(Box::new(compressor)),
        logctx: ut_logctx(),
    }
}

#[tokio::test]
async fn prepare_receipt_compressed() {
    let picker = MockImagePicker::default();
    *picker.result.lock().unwrap() = Some(Ok(Some(ut_original())));
    let compressor = MockImageCompressor::default();
    let compressed = ReceiptImage::jpeg(vec![0xffu8, 0xd8, 0xff]);
    *compressor.result.lock().unwrap() = Some(Ok(compressed.clone()));
    let result = ut_prepare(picker, compressor).execute().await.unwrap();
    assert_eq!(result, Some(compressed));
}

#[tokio::test]
async fn prepare_receipt_compress_fallback() {
    let picker = MockImagePicker::default();
    *picker.result.lock().unwrap() = Some(Ok(Some(ut_original())));
    // the mock compressor fails when nothing is canned
    let compressor = MockImageCompressor::default();
    let result = ut_prepare(picker, compressor).execute().await.unwrap();
    let chosen = result.unwrap();
    assert_eq!(chosen.media_type.as_str(), "image/heic");
    assert_eq!(chosen.payload.len(), 64);
}

#[tokio::test]
async fn prepare_receipt_cancelled_or_failed() {
    let result = ut_prepare(MockImagePicker::default(), MockImageCompressor::default())
        .execute()
        .await;
    assert!(matches!(result, Ok(None)));
    let picker = MockImagePicker::default();
    *picker.result.lock().unwrap() = Some(Err(AppError {
        code: AppErrorCode::DeviceFailure,
        detail: Some("gallery-unavailable".to_string()),
    }));
    let result = ut_prepare(picker, MockImageCompressor::default())
        .execute()
        .await;
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.code, AppErrorCode::DeviceFailure);
    }
}

#[test]
fn submission_result_to_outcome() {
    assert_eq!(
        SubmitPaymentUseCase::to_outcome(Ok(())),
        PaymentCaptureOutcome::Confirmed
    );
    assert_eq!(
        SubmitPaymentUseCase::to_outcome(Err(SubmissionError::BackendRejected(
            "Insufficient data".to_string()
        ))),
        PaymentCaptureOutcome::Rejected("Insufficient data".to_string())
    );
    assert_eq!(
        SubmitPaymentUseCase::to_outcome(Err(SubmissionError::MalformedResponse)),
        PaymentCaptureOutcome::Rejected(const_msg::PAYMENT_REJECTED.to_string())
    );
    assert_eq!(
        SubmitPaymentUseCase::to_outcome(Err(SubmissionError::Transport(
            "connection reset".to_string()
        ))),
        PaymentCaptureOutcome::Rejected(const_msg::PAYMENT_TRANSPORT.to_string())
    );
}

#[tokio::test]
async fn submit_payment_forwards_receipt() {
    let backend = MockOrderBackend::default();
    *backend.submit_result.lock().unwrap() = Some(Ok(()));
    let submitted = backend.submitted.clone();
    let order = ut_order_directory().find("7").cloned().unwrap();
    let receipt = ReceiptImage::jpeg(vec![1u8, 2, 3, 4]);
    let submission = PaymentSubmission::try_from((&order, Some(receipt.clone()))).unwrap();
    let uc = SubmitPaymentUseCase {
        backend: ut_shared_backend(backend),
        logctx: ut_logctx(),
    };
    let outcome = uc.execute(submission).await;
    assert_eq!(outcome, PaymentCaptureOutcome::Confirmed);
    let guard = submitted.lock().unwrap();
    assert_eq!(guard.len(), 1);
    assert_eq!(guard[0].ordernum.as_str(), "7");
    assert_eq!(guard[0].receipt.as_ref(), Some(&receipt));
}

#[tokio::test]
async fn submit_payment_transport_failure() {
    let backend = MockOrderBackend::default();
    let order = ut_order_directory().find("1").cloned().unwrap();
    let submission = PaymentSubmission::try_from((&order, None)).unwrap();
    let uc = SubmitPaymentUseCase {
        backend: ut_shared_backend(backend),
        logctx: ut_logctx(),
    };
    let outcome = uc.execute(submission).await;
    assert_eq!(
        outcome,
        PaymentCaptureOutcome::Rejected(const_msg::PAYMENT_TRANSPORT.to_string())
    );
}
