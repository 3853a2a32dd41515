mod geo;
mod order;
mod payment;

pub use geo::{compute_route, GeoCoordinate, GeoCoordinateError, RouteSegment};
pub use order::{
    count_by_status, filter_by_status, OrderDirectory, OrderFilter, OrderItemModel, OrderModel,
    OrderModelError, OrderStatus,
};
pub use payment::{
    PaymentCaptureError, PaymentCaptureModel, PaymentCaptureOutcome, PaymentCaptureState,
    PaymentSubmission, ReceiptImage,
};
