use std::sync::Arc;

use delivery_staff::adapter::thirdparty::{
    FetchError, GeocodeError, LoginError, StaffProfile,
};
use delivery_staff::constant::message as const_msg;
use delivery_staff::model::{GeoCoordinate, OrderStatus};
use delivery_staff::usecase::{RefreshOrdersUseCase, ResolveDestinationUseCase, StaffLoginUseCase};

use super::ut_shared_backend;
use crate::{ut_logctx, ut_order_directory, MockGeocoder, MockOrderBackend};

#[tokio::test]
async fn refresh_orders_ok() {
    let backend = MockOrderBackend::default();
    *backend.fetch_result.lock().unwrap() = Some(Ok(ut_order_directory()));
    let uc = RefreshOrdersUseCase {
        backend: ut_shared_backend(backend),
        logctx: ut_logctx(),
    };
    let dir = uc.execute().await.unwrap();
    assert_eq!(dir.orders().len(), 3);
    assert_eq!(dir.count_by_status(OrderStatus::Delivered), 1);
}

#[tokio::test]
async fn refresh_orders_error_passthrough() {
    let backend = MockOrderBackend::default();
    let expect = FetchError::Rejected("Database busy".to_string());
    *backend.fetch_result.lock().unwrap() = Some(Err(expect.clone()));
    let uc = RefreshOrdersUseCase {
        backend: ut_shared_backend(backend),
        logctx: ut_logctx(),
    };
    let result = uc.execute().await;
    assert_eq!(result.err(), Some(expect));
}

#[tokio::test]
async fn resolve_destination() {
    let geocoder = MockGeocoder::default();
    let coord = GeoCoordinate::try_new(45.0703, 7.6869).unwrap();
    *geocoder.result.lock().unwrap() = Some(Ok(coord));
    let uc = ResolveDestinationUseCase {
        geocoder: Arc::new(Box::new(geocoder)),
        logctx: ut_logctx(),
    };
    let result = uc.execute("Via Roma 10, Torino".to_string()).await;
    assert_eq!(result.ok(), Some(coord));

    let geocoder = MockGeocoder::default();
    *geocoder.result.lock().unwrap() = Some(Err(GeocodeError::NotFound));
    let uc = ResolveDestinationUseCase {
        geocoder: Arc::new(Box::new(geocoder)),
        logctx: ut_logctx(),
    };
    let result = uc.execute("nowhere".to_string()).await;
    assert_eq!(result.err(), Some(GeocodeError::NotFound));
}

#[tokio::test]
async fn staff_login() {
    let backend = MockOrderBackend::default();
    let profile = StaffProfile {
        id: "31".to_string(),
        username: "kim".to_string(),
        name: "Kim Lee".to_string(),
    };
    *backend.login_result.lock().unwrap() = Some(Ok(profile.clone()));
    let uc = StaffLoginUseCase {
        backend: ut_shared_backend(backend),
        logctx: ut_logctx(),
    };
    let result = uc.execute("kim", "s3cret").await;
    assert_eq!(result.ok(), Some(profile));
}

#[tokio::test]
async fn staff_login_empty_input() {
    let backend = MockOrderBackend::default();
    let login_result = backend.login_result.clone();
    *login_result.lock().unwrap() = Some(Err(LoginError::MalformedResponse));
    let uc = StaffLoginUseCase {
        backend: ut_shared_backend(backend),
        logctx: ut_logctx(),
    };
    let result = uc.execute("  ", "s3cret").await;
    assert_eq!(
        result.err(),
        Some(LoginError::Rejected(
            const_msg::LOGIN_MISSING_INPUT.to_string()
        ))
    );
    // backend is never reached, canned reply stays untouched
    assert!(login_result.lock().unwrap().is_some());
}
