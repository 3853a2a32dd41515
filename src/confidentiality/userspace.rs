use std::collections::HashMap;
use std::result::Result as DefaultResult;
use std::sync::RwLock;

use serde_json::Value as JsnVal;

use super::AbstractConfidentiality;
use crate::error::{AppError, AppErrorCode};

// secrets file is expected to hold a handful of API keys only
const SOURCE_MAX_NBYTES: u64 = 8196;

/// Secrets kept in a local JSON file outside the config file. Each secret is
/// addressed by a slash-separated path, e.g. `backend_apps/secret_key/geocoder`
pub struct UserSpaceConfidentiality {
    srcpath: String,
    cached: RwLock<HashMap<String, String>>,
}

fn lock_failure(e: impl ToString) -> AppError {
    AppError {
        code: AppErrorCode::AcquireLockFailure,
        detail: Some(format!("userspace-confidentiality, {}", e.to_string())),
    }
}

impl UserSpaceConfidentiality {
    pub fn build(fullpath: String) -> Self {
        Self {
            srcpath: fullpath,
            cached: RwLock::new(HashMap::new()),
        }
    }

    fn load_source(&self) -> DefaultResult<JsnVal, AppError> {
        let nbytes = std::fs::metadata(self.srcpath.as_str())?.len();
        if nbytes >= SOURCE_MAX_NBYTES {
            return Err(AppError {
                code: AppErrorCode::ExceedingMaxLimit,
                detail: Some(format!("secrets-file-size:{nbytes}")),
            });
        }
        let raw = std::fs::read(self.srcpath.as_str())?;
        serde_json::from_slice::<JsnVal>(&raw).map_err(|e| AppError {
            code: AppErrorCode::InvalidJsonFormat,
            detail: Some(e.to_string()),
        })
    }

    fn lookup(toplvl: &JsnVal, id_: &str) -> DefaultResult<String, AppError> {
        let pointer = format!("/{}", id_.trim_matches('/'));
        let found = toplvl.pointer(pointer.as_str()).ok_or(AppError {
            code: AppErrorCode::NoConfidentialityCfg,
            detail: Some(format!("path-not-found:{id_}")),
        })?;
        serde_json::to_string(found).map_err(|e| AppError {
            code: AppErrorCode::DataCorruption,
            detail: Some(e.to_string()),
        })
    }
}

impl AbstractConfidentiality for UserSpaceConfidentiality {
    /// returns the secret serialised as JSON, a string secret comes back
    /// with its quotes
    fn try_get_payload(&self, id_: &str) -> DefaultResult<String, AppError> {
        let hit = self
            .cached
            .read()
            .map_err(lock_failure)?
            .get(id_)
            .cloned();
        if let Some(v) = hit {
            return Ok(v);
        }
        let toplvl = self.load_source()?;
        let serial = Self::lookup(&toplvl, id_)?;
        self.cached
            .write()
            .map_err(lock_failure)?
            .insert(id_.to_string(), serial.clone());
        Ok(serial)
    }
}
