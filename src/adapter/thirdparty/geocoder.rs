use std::marker::{Send, Sync};
use std::result::Result;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hyper::header::{HeaderValue, ACCEPT};
use hyper::Method;
use tokio_native_tls::TlsConnector;

use super::base_client::{secure_connector, BaseClient};
use crate::api::dto::{GeocodeQueryDto, GeocodeRespDto};
use crate::confidentiality::AbstractConfidentiality;
use crate::config::AppGeocoderCfg;
use crate::constant::geocode as const_geocode;
use crate::error::{AppError, AppErrorCode};
use crate::logging::{app_log_event, AppLogContext, AppLogLevel};
use crate::model::GeoCoordinate;

#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeError {
    NotFound,
    Unavailable(String),
}

#[async_trait]
pub trait AbstractGeocoder: Send + Sync {
    // no caching here, identical addresses are resolved again on each call
    async fn resolve_address(&self, address: &str) -> Result<GeoCoordinate, GeocodeError>;
}

pub(super) struct AppGeocoder {
    _host: String,
    _port: u16,
    _api_key: String,
    _timeout: Duration,
    _logctx: Arc<AppLogContext>,
    _secure_connector: Option<TlsConnector>,
}

impl From<AppError> for GeocodeError {
    fn from(value: AppError) -> Self {
        Self::Unavailable(value.to_string())
    }
}

/// The first result wins, the rest of the result set is ignored. An empty
/// result set, or a first result without usable coordinate, means the
/// address cannot be resolved.
pub fn parse_geocode_response(raw: &[u8]) -> Result<GeoCoordinate, GeocodeError> {
    let resp = serde_json::from_slice::<GeocodeRespDto>(raw)
        .map_err(|e| GeocodeError::Unavailable(e.to_string()))?;
    let loc = resp
        .results
        .into_iter()
        .next()
        .and_then(|r| r.geometry)
        .and_then(|g| g.location)
        .ok_or(GeocodeError::NotFound)?;
    match (loc.lat, loc.lng) {
        (Some(lat), Some(lng)) => {
            GeoCoordinate::try_new(lat, lng).map_err(|_e| GeocodeError::NotFound)
        }
        _others => Err(GeocodeError::NotFound),
    }
}

#[async_trait]
impl AbstractGeocoder for AppGeocoder {
    async fn resolve_address(&self, address: &str) -> Result<GeoCoordinate, GeocodeError> {
        let logctx_p = &self._logctx;
        if address.trim().is_empty() {
            return Err(GeocodeError::NotFound);
        }
        let query = GeocodeQueryDto {
            address,
            key: self._api_key.as_str(),
        };
        // percent-encoding of address is done by the serializer
        let query = serde_qs::to_string(&query).map_err(|e| AppError {
            code: AppErrorCode::InvalidInput,
            detail: Some(e.to_string()),
        })?;
        let resource_path = format!("{}?{}", const_geocode::RESOURCE_PATH, query);
        let mut _client = BaseClient::try_build(
            self._host.clone(),
            self._port,
            self._secure_connector.as_ref(),
            self._timeout,
            self._logctx.clone(),
        )
        .await
        .map_err(|e| {
            app_log_event!(logctx_p, AppLogLevel::ERROR, "geocoder, {}", e);
            e
        })?;
        let headers = vec![(ACCEPT, HeaderValue::from_static("application/json"))];
        let (rawbody, status) = _client
            .execute(resource_path.as_str(), Method::GET, headers, None)
            .await?;
        if !status.is_success() {
            app_log_event!(
                logctx_p,
                AppLogLevel::WARNING,
                "geocoder, status:{}",
                status.as_u16()
            );
            return Err(GeocodeError::Unavailable(format!(
                "HTTP status {}",
                status.as_u16()
            )));
        }
        parse_geocode_response(&rawbody).map_err(|e| {
            app_log_event!(logctx_p, AppLogLevel::INFO, "geocoder, {:?}", e);
            e
        })
    } // end of fn resolve_address
} // end of impl AppGeocoder

impl AppGeocoder {
    pub(super) fn try_build(
        cfg: &AppGeocoderCfg,
        cfdntl: Arc<Box<dyn AbstractConfidentiality>>,
        timeout: Duration,
        _logctx: Arc<AppLogContext>,
    ) -> Result<Self, AppError> {
        let serial = cfdntl.try_get_payload(cfg.confidentiality_path.as_str())?;
        let _api_key = serde_json::from_str::<String>(serial.as_str()).map_err(|_e| AppError {
            code: AppErrorCode::DataCorruption,
            detail: Some("geocoder-credential-parse-failure".to_string()),
        })?;
        let _secure_connector = if cfg.tls {
            Some(secure_connector()?)
        } else {
            None
        };
        Ok(Self {
            _host: cfg.host.clone(),
            _port: cfg.port,
            _api_key,
            _timeout: timeout,
            _logctx,
            _secure_connector,
        })
    }
} // end of impl AppGeocoder
