use std::convert::Infallible;
use std::future::Future;
use std::result::Result;
use std::sync::Arc;
use std::time::Duration;

use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Empty, Full};
use hyper::body::Bytes as HyperBytes;
use hyper::client::conn::http1::{handshake, SendRequest};
use hyper::header::{HeaderName, HeaderValue, HOST};
use hyper::{Method, Request, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_native_tls::{native_tls, TlsConnector};

use crate::error::{AppError, AppErrorCode};
use crate::logging::{app_log_event, AppLogContext, AppLogLevel};

type ClientRequest = Request<BoxBody<HyperBytes, Infallible>>;

pub(super) struct BaseClient {
    req_sender: SendRequest<BoxBody<HyperBytes, Infallible>>,
    host: String,
    port: u16,
    secure: bool,
    timeout: Duration,
    logctx: Arc<AppLogContext>,
}

/// TLS 1.2 or newer, shared by all remote services this application talks to
pub(super) fn secure_connector() -> Result<TlsConnector, AppError> {
    let mut builder = native_tls::TlsConnector::builder();
    builder.min_protocol_version(Some(native_tls::Protocol::Tlsv12));
    let sc = builder.build().map_err(|e| AppError {
        code: AppErrorCode::CryptoFailure,
        detail: Some(e.to_string()),
    })?;
    Ok(sc.into())
}

async fn bounded<F, T>(timeout: Duration, label: &str, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_elapsed| AppError {
            code: AppErrorCode::RemoteServerTimeout,
            detail: Some(format!("{label}, limit:{}s", timeout.as_secs())),
        })?
}

/// value of `Host` header, the port is omitted only when it is the default
/// one of the scheme
fn host_authority(host: &str, port: u16, secure: bool) -> String {
    match (secure, port) {
        (true, 443) | (false, 80) => host.to_string(),
        _others => format!("{host}:{port}"),
    }
}

fn build_request(
    authority: &str,
    resource_path: &str,
    method: Method,
    headers: Vec<(HeaderName, HeaderValue)>,
    rawbody: Option<Vec<u8>>,
) -> Result<ClientRequest, AppError> {
    let body = match rawbody {
        Some(v) => Full::new(HyperBytes::from(v)).boxed(),
        None => Empty::<HyperBytes>::new().boxed(),
    };
    let builder = headers
        .into_iter()
        .fold(Request::builder(), |b, (k, v)| b.header(k, v));
    builder
        .header(HOST, authority)
        .uri(resource_path)
        .method(method)
        .body(body)
        .map_err(|e| AppError {
            code: AppErrorCode::InvalidInput,
            detail: Some(format!("request-build, {e}")),
        })
}

impl BaseClient {
    /// plain TCP is used when `secure_connector` is absent, which is only
    /// meant for local backends
    pub(super) async fn try_build(
        host: String,
        port: u16,
        secure_connector: Option<&TlsConnector>,
        timeout: Duration,
        logctx: Arc<AppLogContext>,
    ) -> Result<Self, AppError> {
        let tcp_stream = bounded(timeout, "tcp-connect", async {
            TcpStream::connect((host.as_str(), port))
                .await
                .map_err(AppError::from)
        })
        .await?;
        let req_sender = if let Some(sc) = secure_connector {
            let tls_stream = bounded(timeout, "tls-connect", async {
                sc.connect(host.as_str(), tcp_stream)
                    .await
                    .map_err(|e| AppError {
                        code: AppErrorCode::CryptoFailure,
                        detail: Some(e.to_string()),
                    })
            })
            .await?;
            Self::_handshake(tls_stream, &logctx).await?
        } else {
            Self::_handshake(tcp_stream, &logctx).await?
        };
        Ok(Self {
            req_sender,
            host,
            port,
            secure: secure_connector.is_some(),
            timeout,
            logctx,
        })
    }

    async fn _handshake<T>(
        io: T,
        logctx: &Arc<AppLogContext>,
    ) -> Result<SendRequest<BoxBody<HyperBytes, Infallible>>, AppError>
    where
        T: AsyncRead + AsyncWrite + Send + Unpin + 'static,
    {
        let (req_sender, connector) = handshake(TokioIo::new(io)).await.map_err(|e| AppError {
            code: AppErrorCode::HttpHandshakeFailure,
            detail: Some(e.to_string()),
        })?;
        let logctx_p = logctx.clone();
        // the connection task ends once the response is fully read and the
        // sender is dropped
        let _handle = tokio::task::spawn(async move {
            if let Err(e) = connector.await {
                app_log_event!(logctx_p, AppLogLevel::ERROR, "http-connection, {:?}", e);
            }
        });
        Ok(req_sender)
    }

    async fn _exchange(&mut self, req: ClientRequest) -> Result<(Vec<u8>, StatusCode), AppError> {
        let logctx = &self.logctx;
        let resp = match self.req_sender.send_request(req).await {
            Ok(r) => r,
            Err(e) => {
                app_log_event!(
                    logctx,
                    AppLogLevel::WARNING,
                    "remote:{}:{}, send-failure:{}",
                    &self.host,
                    self.port,
                    e
                );
                return Err(AppError {
                    code: AppErrorCode::HttpHandshakeFailure,
                    detail: Some(e.to_string()),
                });
            }
        };
        let status = resp.status();
        // trailers are dropped, only data frames are collected
        let collected = resp.into_body().collect().await.map_err(|e| AppError {
            code: AppErrorCode::DataCorruption,
            detail: Some(e.to_string()),
        })?;
        let rawbody = collected.to_bytes().to_vec();
        app_log_event!(
            logctx,
            AppLogLevel::DEBUG,
            "remote:{}:{}, status:{}, nbytes:{}",
            &self.host,
            self.port,
            status.as_u16(),
            rawbody.len()
        );
        Ok((rawbody, status))
    }

    /// Sends one request and collects the whole response body, the entire
    /// exchange is bounded by the timeout given at build time
    pub(super) async fn execute(
        &mut self,
        resource_path: &str,
        method: Method,
        headers: Vec<(HeaderName, HeaderValue)>,
        rawbody: Option<Vec<u8>>,
    ) -> Result<(Vec<u8>, StatusCode), AppError> {
        let authority = host_authority(self.host.as_str(), self.port, self.secure);
        let req = build_request(authority.as_str(), resource_path, method, headers, rawbody)?;
        let timeout = self.timeout;
        bounded(timeout, resource_path, self._exchange(req)).await
    }
} // end of impl BaseClient

