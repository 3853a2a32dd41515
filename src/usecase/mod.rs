mod capture_payment;
mod locate;
mod login;
mod orders;
mod route;

pub use capture_payment::{PrepareReceiptUseCase, SubmitPaymentUseCase};
pub use locate::LocateDeviceUseCase;
pub use login::StaffLoginUseCase;
pub use orders::RefreshOrdersUseCase;
pub use route::ResolveDestinationUseCase;
