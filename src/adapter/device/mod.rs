mod locator;
mod receipt;

pub use locator::{AbstractDeviceLocator, AppConfigDeviceLocator, LocationError, LocationPermission};
pub use receipt::{
    AbstractImageCompressor, AbstractImagePicker, JpegReceiptCompressor, LocalFsImagePicker,
};
