use std::marker::{Send, Sync};
use std::result::Result;
use std::sync::Arc;
use std::time::Duration;
use std::vec::Vec;

use async_trait::async_trait;
use hyper::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use hyper::{Method, StatusCode};
use tokio_native_tls::TlsConnector;

use super::base_client::{secure_connector, BaseClient};
use super::multipart::MultipartForm;
use crate::api::dto::{
    LoginReqDto, LoginRespDto, OrderItemPayDto, OrderListRespDto, PaymentRespDto, StaffRecordDto,
};
use crate::config::AppBackendCfg;
use crate::constant::{backend as const_backend, message as const_msg};
use crate::error::{AppError, AppErrorCode};
use crate::logging::{app_log_event, AppLogContext, AppLogLevel};
use crate::model::{OrderDirectory, PaymentSubmission};

#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    Transport(String),
    MalformedPayload(String),
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionError {
    Transport(String),
    BackendRejected(String),
    MalformedResponse,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoginError {
    Transport(String),
    Rejected(String),
    MalformedResponse,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StaffProfile {
    pub id: String,
    pub username: String,
    pub name: String,
}

#[async_trait]
pub trait AbstractOrderBackend: Send + Sync {
    async fn fetch_orders(&self) -> Result<OrderDirectory, FetchError>;

    // exactly one request per call, never retried internally
    async fn submit_payment(&self, submission: PaymentSubmission) -> Result<(), SubmissionError>;

    async fn login(&self, username: &str, password: &str) -> Result<StaffProfile, LoginError>;
}

pub(super) struct AppOrderBackend {
    _host: String,
    _port: u16,
    _base_path: String,
    _timeout: Duration,
    _logctx: Arc<AppLogContext>,
    _secure_connector: Option<TlsConnector>,
}

impl From<AppError> for FetchError {
    fn from(value: AppError) -> Self {
        Self::Transport(value.to_string())
    }
}
impl From<AppError> for SubmissionError {
    fn from(value: AppError) -> Self {
        Self::Transport(value.to_string())
    }
}
impl From<AppError> for LoginError {
    fn from(value: AppError) -> Self {
        Self::Transport(value.to_string())
    }
}

pub fn parse_order_list(raw: &[u8]) -> Result<OrderDirectory, FetchError> {
    let resp = serde_json::from_slice::<OrderListRespDto>(raw)
        .map_err(|e| FetchError::MalformedPayload(e.to_string()))?;
    if resp.success {
        OrderDirectory::try_from(resp.orders)
            .map_err(|e| FetchError::MalformedPayload(format!("{:?}", e)))
    } else {
        let msg = resp
            .error
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(const_msg::FETCH_ORDERS_REJECTED.to_string());
        Err(FetchError::Rejected(msg))
    }
}

// legacy plain-text body looks like `success:false,"error":"reason"`, the
// reason is the text after the first colon of the second comma-separated
// token
fn extract_legacy_reason(body: &str) -> Option<String> {
    let token = body.split(',').nth(1)?;
    let reason = token.split(':').nth(1)?;
    let reason = reason
        .trim()
        .trim_matches(|c| c == '"' || c == '}' || c == '{')
        .trim();
    if reason.is_empty() {
        None
    } else {
        Some(reason.to_string())
    }
}

/// Interprets body of the payment endpoint. The structured JSON body is
/// preferred, the legacy text body is still accepted.
pub fn parse_payment_response(raw: &[u8]) -> Result<(), SubmissionError> {
    if let Ok(resp) = serde_json::from_slice::<PaymentRespDto>(raw) {
        return if resp.success {
            Ok(())
        } else {
            let reason = resp.error.filter(|s| !s.trim().is_empty());
            Err(reason.map_or(SubmissionError::MalformedResponse, |s| {
                SubmissionError::BackendRejected(s)
            }))
        };
    }
    let body = std::str::from_utf8(raw).map_err(|_e| SubmissionError::MalformedResponse)?;
    if body.contains(const_backend::PAYMENT_SUCCESS_MARKER) {
        Ok(())
    } else {
        let reason = extract_legacy_reason(body).ok_or(SubmissionError::MalformedResponse)?;
        Err(SubmissionError::BackendRejected(reason))
    }
}

pub fn parse_login_response(raw: &[u8]) -> Result<StaffProfile, LoginError> {
    let resp = serde_json::from_slice::<LoginRespDto>(raw)
        .map_err(|_e| LoginError::MalformedResponse)?;
    match resp {
        LoginRespDto::Failure { error } => Err(LoginError::Rejected(error)),
        LoginRespDto::Record(r) => StaffProfile::try_from(r),
    }
}

impl TryFrom<StaffRecordDto> for StaffProfile {
    type Error = LoginError;
    fn try_from(value: StaffRecordDto) -> Result<Self, Self::Error> {
        let StaffRecordDto {
            id,
            username,
            name,
            role,
        } = value;
        let is_staff = role
            .and_then(|r| r.to_text().parse::<u8>().ok())
            .map(|r| r == const_backend::STAFF_ROLE_FLAG)
            .unwrap_or(false);
        if !is_staff {
            return Err(LoginError::Rejected(const_msg::LOGIN_STAFF_ONLY.to_string()));
        }
        let id = id
            .map(|v| v.to_text())
            .filter(|v| !v.is_empty())
            .ok_or(LoginError::MalformedResponse)?;
        Ok(Self {
            id,
            username: username.unwrap_or_default(),
            name: name.unwrap_or_default(),
        })
    }
} // end of impl StaffProfile

#[async_trait]
impl AbstractOrderBackend for AppOrderBackend {
    async fn fetch_orders(&self) -> Result<OrderDirectory, FetchError> {
        let logctx_p = &self._logctx;
        let headers = vec![(ACCEPT, HeaderValue::from_static("application/json"))];
        let (rawbody, status) = self
            ._request(const_backend::GET_ORDERS, Method::GET, headers, None)
            .await
            .map_err(|e| {
                app_log_event!(logctx_p, AppLogLevel::ERROR, "fetch-orders, {}", e);
                FetchError::from(e)
            })?;
        if !status.is_success() {
            app_log_event!(
                logctx_p,
                AppLogLevel::WARNING,
                "fetch-orders, status:{}",
                status.as_u16()
            );
            return Err(FetchError::Transport(format!("HTTP status {}", status.as_u16())));
        }
        parse_order_list(&rawbody).map_err(|e| {
            app_log_event!(logctx_p, AppLogLevel::ERROR, "fetch-orders, {:?}", e);
            e
        })
    } // end of fn fetch_orders

    async fn submit_payment(&self, submission: PaymentSubmission) -> Result<(), SubmissionError> {
        let logctx_p = &self._logctx;
        let ordernum = submission.ordernum.clone();
        let (ctype, body) = Self::_payment_form(submission)?;
        let ctype = HeaderValue::from_str(ctype.as_str()).map_err(|e| AppError {
            code: AppErrorCode::InvalidInput,
            detail: Some(e.to_string()),
        })?;
        let headers = vec![(CONTENT_TYPE, ctype)];
        let (rawbody, status) = self
            ._request(const_backend::SAVE_PAYMENT, Method::POST, headers, Some(body))
            .await
            .map_err(|e| {
                app_log_event!(
                    logctx_p,
                    AppLogLevel::ERROR,
                    "submit-payment, ordernum:{}, {}",
                    &ordernum,
                    e
                );
                SubmissionError::from(e)
            })?;
        let result = if status.is_success() {
            parse_payment_response(&rawbody)
        } else {
            let reason = std::str::from_utf8(&rawbody)
                .ok()
                .and_then(extract_legacy_reason)
                .unwrap_or(format!("HTTP status {}", status.as_u16()));
            Err(SubmissionError::BackendRejected(reason))
        };
        match &result {
            Ok(()) => app_log_event!(
                logctx_p,
                AppLogLevel::INFO,
                "submit-payment, ordernum:{}, confirmed",
                &ordernum
            ),
            Err(e) => app_log_event!(
                logctx_p,
                AppLogLevel::WARNING,
                "submit-payment, ordernum:{}, status:{}, {:?}",
                &ordernum,
                status.as_u16(),
                e
            ),
        }
        result
    } // end of fn submit_payment

    async fn login(&self, username: &str, password: &str) -> Result<StaffProfile, LoginError> {
        let logctx_p = &self._logctx;
        let reqbody = serde_json::to_vec(&LoginReqDto { username, password }).map_err(|e| {
            LoginError::Transport(e.to_string())
        })?;
        let headers = vec![
            (CONTENT_TYPE, HeaderValue::from_static("application/json")),
            (ACCEPT, HeaderValue::from_static("application/json")),
        ];
        let (rawbody, status) = self
            ._request(const_backend::LOGIN, Method::POST, headers, Some(reqbody))
            .await?;
        if status.is_server_error() {
            app_log_event!(
                logctx_p,
                AppLogLevel::WARNING,
                "login, status:{}",
                status.as_u16()
            );
            return Err(LoginError::Transport(format!("HTTP status {}", status.as_u16())));
        }
        parse_login_response(&rawbody).map_err(|e| {
            app_log_event!(logctx_p, AppLogLevel::INFO, "login rejected, {:?}", e);
            e
        })
    }
} // end of impl AppOrderBackend

impl AppOrderBackend {
    pub(super) fn try_build(
        cfg: &AppBackendCfg,
        timeout: Duration,
        _logctx: Arc<AppLogContext>,
    ) -> Result<Self, AppError> {
        let _secure_connector = if cfg.tls {
            Some(secure_connector()?)
        } else {
            None
        };
        Ok(Self {
            _host: cfg.host.clone(),
            _port: cfg.port,
            _base_path: cfg.base_path.trim_end_matches('/').to_string(),
            _timeout: timeout,
            _logctx,
            _secure_connector,
        })
    }

    async fn _request(
        &self,
        resource: &str,
        method: Method,
        headers: Vec<(hyper::header::HeaderName, HeaderValue)>,
        body: Option<Vec<u8>>,
    ) -> Result<(Vec<u8>, StatusCode), AppError> {
        let mut _client = BaseClient::try_build(
            self._host.clone(),
            self._port,
            self._secure_connector.as_ref(),
            self._timeout,
            self._logctx.clone(),
        )
        .await?;
        let resource_path = format!("{}{}", self._base_path, resource);
        _client
            .execute(resource_path.as_str(), method, headers, body)
            .await
    }

    fn _payment_form(sub: PaymentSubmission) -> Result<(String, Vec<u8>), SubmissionError> {
        use const_backend::multipart as field;
        let items = sub
            .items
            .iter()
            .map(OrderItemPayDto::from)
            .collect::<Vec<_>>();
        let items_serial =
            serde_json::to_string(&items).map_err(|e| SubmissionError::Transport(e.to_string()))?;
        let total = sub.total_amount.normalize().to_string();
        let mut form = MultipartForm::new()
            .text(field::ORDER_NUM, sub.ordernum.as_str())
            .text(field::NAME, sub.customer_name.as_str())
            .text(field::ADDRESS, sub.address.as_str())
            .text(field::MOBILE, sub.mobile.as_str())
            .text(field::ORDER_ITEMS, items_serial.as_str())
            .text(field::TOTAL_AMOUNT, total.as_str());
        if let Some(r) = sub.receipt.as_ref() {
            form = form.file(
                field::IMAGE,
                r.file_name.as_str(),
                r.media_type.as_str(),
                &r.payload,
            );
        }
        Ok(form.finish())
    }
} // end of impl AppOrderBackend
