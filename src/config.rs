use std::collections::hash_map::RandomState;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::result::Result as DefaultResult;
use std::time::Duration;

use serde::de::{Error as DeserializeError, Expected};
use serde::Deserialize;

use crate::constant::{env_vars, logging as const_log};
use crate::error::{AppCfgError, AppErrorCode};
use crate::AppLogAlias;

#[derive(Deserialize)]
pub struct AppLogHandlerCfg {
    pub min_level: const_log::Level,
    pub destination: const_log::Destination,
    pub alias: AppLogAlias,
    pub path: Option<String>,
}

#[derive(Deserialize)]
pub struct AppLoggerCfg {
    pub alias: AppLogAlias,
    pub handlers: Vec<String>,
    pub level: Option<const_log::Level>,
}

#[derive(Deserialize)]
pub struct AppLoggingCfg {
    pub handlers: Vec<AppLogHandlerCfg>,
    pub loggers: Vec<AppLoggerCfg>,
}

fn default_tls_enabled() -> bool {
    true
}

/// the backend serving order list, payment and login endpoints
#[derive(Deserialize, Clone, Debug)]
pub struct AppBackendCfg {
    #[serde(deserialize_with = "jsn_deny_empty_string")]
    pub host: String,
    pub port: u16,
    #[serde(default = "default_tls_enabled")]
    pub tls: bool,
    // path prefix prepended to every resource, e.g. `/backend`
    #[serde(default)]
    pub base_path: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AppGeocoderCfg {
    #[serde(deserialize_with = "jsn_deny_empty_string")]
    pub host: String,
    pub port: u16,
    #[serde(default = "default_tls_enabled")]
    pub tls: bool,
    // path to API key in confidential source, the key is never kept
    // in the config file
    #[serde(deserialize_with = "jsn_deny_empty_string")]
    pub confidentiality_path: String,
}

#[derive(Deserialize)]
#[serde(tag = "source")]
pub enum AppConfidentialCfg {
    UserSpace {
        #[serde(deserialize_with = "jsn_deny_empty_string")]
        sys_path: String,
    },
}

#[derive(Deserialize, Clone, Debug)]
pub struct AppNetworkCfg {
    pub timeout_secs: u16,
}

/// position snapshot reported by headless device locator
#[derive(Deserialize, Clone, Debug)]
pub struct AppDeviceCfg {
    pub permission_granted: bool,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AppReceiptCfg {
    pub max_width: u32,
    pub jpeg_quality: u8,
}

#[derive(Deserialize)]
pub struct StaffAppCfg {
    pub logging: AppLoggingCfg,
    pub backend: AppBackendCfg,
    pub geocoder: AppGeocoderCfg,
    pub confidentiality: AppConfidentialCfg,
    pub network: AppNetworkCfg,
    pub device: Option<AppDeviceCfg>,
    pub receipt: AppReceiptCfg,
}

pub struct AppBasepathCfg {
    pub system: String,
    pub service: String,
}

pub struct AppConfig {
    pub basepath: AppBasepathCfg,
    pub staff_app: StaffAppCfg,
}

pub struct AppCfgHardLimit {
    pub max_timeout_secs: u16,
    pub max_receipt_width: u32,
}

pub struct AppCfgInitArgs {
    pub env_var_map: HashMap<String, String, RandomState>,
    pub limit: AppCfgHardLimit,
}

impl AppNetworkCfg {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs as u64)
    }
}

impl AppConfig {
    pub fn new(args: AppCfgInitArgs) -> DefaultResult<Self, AppCfgError> {
        let AppCfgInitArgs {
            mut env_var_map,
            limit,
        } = args;
        let mut take = |label: &str, code: AppErrorCode| {
            env_var_map.remove(label).ok_or(AppCfgError {
                detail: Some(format!("env-var:{label}")),
                code,
            })
        };
        let system = take(env_vars::SYS_BASEPATH, AppErrorCode::MissingSysBasePath)? + "/";
        let service = take(env_vars::SERVICE_BASEPATH, AppErrorCode::MissingAppBasePath)? + "/";
        let cfg_path = take(env_vars::CFG_FILEPATH, AppErrorCode::MissingConfigPath)?;
        let staff_app = Self::parse_from_file(service.clone() + cfg_path.as_str(), limit)?;
        Ok(Self {
            staff_app,
            basepath: AppBasepathCfg { system, service },
        })
    }

    pub fn parse_from_file(
        filepath: String,
        limit: AppCfgHardLimit,
    ) -> DefaultResult<StaffAppCfg, AppCfgError> {
        let fileobj = File::open(filepath).map_err(|e| AppCfgError {
            detail: Some(e.to_string()),
            code: AppErrorCode::IOerror(e.kind()),
        })?;
        let reader = BufReader::new(fileobj);
        let jsnobj =
            serde_json::from_reader::<BufReader<File>, StaffAppCfg>(reader).map_err(|e| {
                AppCfgError {
                    detail: Some(e.to_string()),
                    code: AppErrorCode::InvalidJsonFormat,
                }
            })?;
        Self::_check_logging(&jsnobj.logging)?;
        Self::_check_network(&jsnobj.network, &limit)?;
        Self::_check_receipt(&jsnobj.receipt, &limit)?;
        Self::_check_device(&jsnobj.device)?;
        Ok(jsnobj)
    }

    fn _check_network(obj: &AppNetworkCfg, limit: &AppCfgHardLimit) -> DefaultResult<(), AppCfgError> {
        if obj.timeout_secs == 0 {
            Err(AppCfgError {
                detail: Some("network-timeout-zero".to_string()),
                code: AppErrorCode::InvalidInput,
            })
        } else if obj.timeout_secs > limit.max_timeout_secs {
            Err(AppCfgError {
                detail: Some(format!("limit-timeout-secs:{}", limit.max_timeout_secs)),
                code: AppErrorCode::ExceedingMaxLimit,
            })
        } else {
            Ok(())
        }
    }

    fn _check_receipt(obj: &AppReceiptCfg, limit: &AppCfgHardLimit) -> DefaultResult<(), AppCfgError> {
        if obj.max_width == 0 || !(1..=100).contains(&obj.jpeg_quality) {
            let msg = format!("width:{}, quality:{}", obj.max_width, obj.jpeg_quality);
            Err(AppCfgError {
                detail: Some(msg),
                code: AppErrorCode::InvalidInput,
            })
        } else if obj.max_width > limit.max_receipt_width {
            Err(AppCfgError {
                detail: Some(format!("limit-receipt-width:{}", limit.max_receipt_width)),
                code: AppErrorCode::ExceedingMaxLimit,
            })
        } else {
            Ok(())
        }
    }

    fn _check_device(obj: &Option<AppDeviceCfg>) -> DefaultResult<(), AppCfgError> {
        let invalid = obj
            .as_ref()
            .map(|d| {
                !d.latitude.is_finite()
                    || !d.longitude.is_finite()
                    || !(-90.0..=90.0).contains(&d.latitude)
                    || !(-180.0..=180.0).contains(&d.longitude)
            })
            .unwrap_or(false);
        if invalid {
            Err(AppCfgError {
                detail: Some("device-coordinate".to_string()),
                code: AppErrorCode::InvalidInput,
            })
        } else {
            Ok(())
        }
    }

    fn _check_logging(obj: &AppLoggingCfg) -> DefaultResult<(), AppCfgError> {
        let fail = |code: AppErrorCode, detail: Option<String>| Err(AppCfgError { code, detail });
        if obj.handlers.is_empty() {
            return fail(AppErrorCode::NoLogHandlerCfg, None);
        }
        if obj.loggers.is_empty() {
            return fail(AppErrorCode::NoLoggerCfg, None);
        }
        if let Some(lgr) = obj.loggers.iter().find(|l| l.handlers.is_empty()) {
            let msg = format!("logger-without-handler:{}", lgr.alias);
            return fail(AppErrorCode::NoHandlerInLoggerCfg, Some(msg));
        }
        if obj.handlers.iter().any(|h| h.alias.is_empty()) {
            return fail(AppErrorCode::MissingAliasLogHdlerCfg, None);
        }
        if obj.loggers.iter().any(|l| l.alias.is_empty()) {
            return fail(AppErrorCode::MissingAliasLoggerCfg, None);
        }
        let file_without_path = obj.handlers.iter().find(|h| {
            matches!(h.destination, const_log::Destination::LOCALFS) && h.path.is_none()
        });
        if let Some(hdlr) = file_without_path {
            let msg = format!("localfs-handler-without-path:{}", hdlr.alias);
            return fail(AppErrorCode::InvalidHandlerLoggerCfg, Some(msg));
        }
        let known: HashSet<&str> = obj.handlers.iter().map(|h| h.alias.as_str()).collect();
        let dangling = obj
            .loggers
            .iter()
            .find(|l| l.handlers.iter().any(|a| !known.contains(a.as_str())));
        if let Some(lgr) = dangling {
            let msg = format!("logger-unknown-handler:{}", lgr.alias);
            return fail(AppErrorCode::InvalidHandlerLoggerCfg, Some(msg));
        }
        Ok(())
    } // end of _check_logging
} // end of impl AppConfig

struct ExpectNonEmptyString;

impl Expected for ExpectNonEmptyString {
    fn fmt(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("non-empty string")
    }
}

fn jsn_deny_empty_string<'de, D>(raw: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(raw)?;
    if s.trim().is_empty() {
        Err(DeserializeError::invalid_length(0, &ExpectNonEmptyString))
    } else {
        Ok(s)
    }
}
