use std::marker::{Send, Sync};
use std::result::Result;

use async_trait::async_trait;

use crate::config::AppDeviceCfg;
use crate::model::GeoCoordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationPermission {
    Granted,
    Denied,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LocationError {
    PermissionDenied,
    Unavailable(String),
}

/// Platform location service. The permission has to be acquired before
/// any position read, see `usecase::LocateDeviceUseCase`
#[async_trait]
pub trait AbstractDeviceLocator: Send + Sync {
    async fn request_permission(&self) -> Result<LocationPermission, LocationError>;

    // single-shot read, the position is not tracked continuously
    async fn read_position(&self) -> Result<GeoCoordinate, LocationError>;
}

/// Headless locator reporting the position snapshot from configuration
pub struct AppConfigDeviceLocator {
    snapshot: Option<AppDeviceCfg>,
}

impl AppConfigDeviceLocator {
    pub fn new(snapshot: Option<AppDeviceCfg>) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl AbstractDeviceLocator for AppConfigDeviceLocator {
    async fn request_permission(&self) -> Result<LocationPermission, LocationError> {
        let granted = self
            .snapshot
            .as_ref()
            .map(|c| c.permission_granted)
            .unwrap_or(true);
        Ok(if granted {
            LocationPermission::Granted
        } else {
            LocationPermission::Denied
        })
    }

    async fn read_position(&self) -> Result<GeoCoordinate, LocationError> {
        let cfg = self
            .snapshot
            .as_ref()
            .ok_or(LocationError::Unavailable("no-position-source".to_string()))?;
        GeoCoordinate::try_new(cfg.latitude, cfg.longitude)
            .map_err(|e| LocationError::Unavailable(format!("{:?}", e)))
    }
}
