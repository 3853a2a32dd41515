mod capture_payment;
mod orders;

use std::boxed::Box;
use std::sync::Arc;

use delivery_staff::adapter::thirdparty::AbstractOrderBackend;

use crate::MockOrderBackend;

pub(crate) fn ut_shared_backend(backend: MockOrderBackend) -> Arc<Box<dyn AbstractOrderBackend>> {
    Arc::new(Box::new(backend))
}
