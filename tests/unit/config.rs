use std::collections::HashMap;

use delivery_staff::constant::env_vars::{CFG_FILEPATH, SERVICE_BASEPATH, SYS_BASEPATH};
use delivery_staff::error::AppErrorCode;
use delivery_staff::{AppCfgInitArgs, AppConfidentialCfg, AppConfig};

use crate::{ut_basepath, ut_hard_limit, EXAMPLE_REL_PATH};

fn ut_init_args(pairs: Vec<(&str, &str)>) -> AppCfgInitArgs {
    let iter = pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()));
    AppCfgInitArgs {
        env_var_map: HashMap::from_iter(iter),
        limit: ut_hard_limit(),
    }
}

fn ut_parse(fname: &str) -> Result<delivery_staff::StaffAppCfg, delivery_staff::error::AppCfgError> {
    let fullpath = ut_basepath() + EXAMPLE_REL_PATH + fname;
    AppConfig::parse_from_file(fullpath, ut_hard_limit())
}

#[test]
fn cfg_extract_arg_ok() {
    let args = ut_init_args(vec![
        (CFG_FILEPATH, "relative/to/mycfg.json"),
        (SYS_BASEPATH, "/path/sys"),
        (SERVICE_BASEPATH, "/path/service"),
    ]);
    let result = AppConfig::new(args);
    assert!(result.is_err());
    let err = result.err().unwrap();
    // file paths are fake, file-not-found is expected
    assert_eq!(err.code, AppErrorCode::IOerror(std::io::ErrorKind::NotFound));
}

#[test]
fn cfg_extract_arg_missing_sys_path() {
    let result = AppConfig::new(ut_init_args(vec![]));
    assert!(result.is_err());
    assert_eq!(result.err().unwrap().code, AppErrorCode::MissingSysBasePath);
}

#[test]
fn cfg_extract_arg_missing_service_path() {
    let result = AppConfig::new(ut_init_args(vec![(SYS_BASEPATH, "/path/sys")]));
    assert!(result.is_err());
    assert_eq!(result.err().unwrap().code, AppErrorCode::MissingAppBasePath);
}

#[test]
fn cfg_extract_arg_missing_cfg_path() {
    let result = AppConfig::new(ut_init_args(vec![
        (SYS_BASEPATH, "/path/sys"),
        (SERVICE_BASEPATH, "/path/service"),
    ]));
    assert!(result.is_err());
    assert_eq!(result.err().unwrap().code, AppErrorCode::MissingConfigPath);
}

#[test]
fn cfg_load_from_env_ok() {
    let basepath = ut_basepath();
    let base_noslash = basepath.trim_end_matches('/');
    let cfg_path = EXAMPLE_REL_PATH.to_string() + "config_ok.json";
    let result = AppConfig::new(ut_init_args(vec![
        (SYS_BASEPATH, base_noslash),
        (SERVICE_BASEPATH, base_noslash),
        (CFG_FILEPATH, cfg_path.as_str()),
    ]));
    assert!(result.is_ok());
    let cfg = result.unwrap();
    assert!(cfg.basepath.system.ends_with('/'));
    assert_eq!(cfg.staff_app.backend.base_path.as_str(), "/backend");
}

#[test]
fn parse_ext_cfg_file_ok() {
    let result = ut_parse("config_ok.json");
    assert!(result.is_ok());
    let actual = result.unwrap();
    assert_eq!(actual.backend.host.as_str(), "localhost");
    assert_eq!(actual.backend.port, 8010);
    assert!(!actual.backend.tls);
    assert!(actual.geocoder.tls);
    assert_eq!(
        actual.geocoder.confidentiality_path.as_str(),
        "backend_apps/secret_key/geocoder"
    );
    assert_eq!(actual.network.timeout().as_secs(), 5);
    let device = actual.device.as_ref().unwrap();
    assert!(device.permission_granted);
    assert!((device.latitude - 25.033).abs() < 1e-6);
    assert_eq!(actual.receipt.max_width, 800);
    assert_eq!(actual.receipt.jpeg_quality, 60);
    assert!(matches!(
        actual.confidentiality,
        AppConfidentialCfg::UserSpace { .. }
    ));
    assert_eq!(actual.logging.handlers.len(), 1);
    assert!(actual.logging.loggers.len() > 5);
}

#[test]
fn parse_ext_cfg_file_defaults() {
    let result = ut_parse("config_no_device.json");
    assert!(result.is_ok());
    let actual = result.unwrap();
    assert!(actual.device.is_none());
    assert!(actual.backend.tls);
    assert!(actual.backend.base_path.is_empty());
}

#[test]
fn parse_ext_cfg_timeout_exceed_limit() {
    let result = ut_parse("config_timeout_exceed.json");
    assert!(result.is_err());
    assert_eq!(result.err().unwrap().code, AppErrorCode::ExceedingMaxLimit);
}

#[test]
fn parse_ext_cfg_invalid_receipt() {
    let result = ut_parse("config_bad_receipt.json");
    assert!(result.is_err());
    assert_eq!(result.err().unwrap().code, AppErrorCode::InvalidInput);
}

#[test]
fn parse_ext_cfg_empty_host() {
    let result = ut_parse("config_empty_host.json");
    assert!(result.is_err());
    assert_eq!(result.err().unwrap().code, AppErrorCode::InvalidJsonFormat);
}

#[test]
fn parse_ext_cfg_logger_invalid_handler() {
    let result = ut_parse("config_bad_logger.json");
    assert!(result.is_err());
    assert_eq!(
        result.err().unwrap().code,
        AppErrorCode::InvalidHandlerLoggerCfg
    );
}

#[test]
fn parse_ext_cfg_file_not_exist() {
    let result = ut_parse("config_nonexist.json");
    assert!(result.is_err());
    assert_eq!(
        result.err().unwrap().code,
        AppErrorCode::IOerror(std::io::ErrorKind::NotFound)
    );
}
