pub mod device;
pub mod thirdparty;
