//! Generic HTTP client for the sensor backend.
//!
//! Every call resolves to a [`Response`]: failures of any kind (network,
//! status, decoding) come back as an [`HttpError`] value, never as a panic.

use reqwest::header::{AUTHORIZATION, COOKIE};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;

/// Outcome of a request: `Ok` on success, `Err` carrying a readable error otherwise.
pub type Response<T> = Result<T, HttpError>;

/// Errors from the HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// The request never produced a response (connection refused, DNS, timeout, ...).
    #[error("{0}")]
    Transport(String),

    /// The backend answered with a non-2xx status code.
    #[error("Server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not match the expected type.
    #[error("Could not decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// An authorized request was made without an access token in the context.
    #[error("No access token available for an authorized request")]
    MissingToken,
}

impl HttpError {
    /// The human-readable message shown to the user.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        HttpError::Transport(error_chain(&err))
    }
}

/// `err` followed by each of its sources, e.g. "error sending request: ...: Connection refused".
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_message = cause.to_string();
        // Some wrappers already include their cause in their own message.
        if !message.ends_with(&cause_message) {
            message.push_str(": ");
            message.push_str(&cause_message);
        }
        source = cause.source();
    }
    message
}

/// How a request is authorized.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthorizationType {
    /// No `Authorization` header.
    None,
    /// `Authorization: Bearer <token>` with the token from the [`RequestContext`].
    Bearer,
}

/// Per-user request data for a client acting on behalf of someone else,
/// e.g. a renderer forwarding the credentials of an incoming request.
///
/// Interactive clients pass `None` instead.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub access_token: Option<String>,
    pub cookie: Option<String>,
}

/// A type a response body can be read into.
pub trait ResponseBody: Sized {
    fn from_body(body: &[u8]) -> Result<Self, HttpError>;
}

/// The void response: whatever the backend sends is ignored.
impl ResponseBody for () {
    fn from_body(_body: &[u8]) -> Result<Self, HttpError> {
        Ok(())
    }
}

/// A JSON response body.
#[derive(Clone, Debug, PartialEq)]
pub struct Json<T>(pub T);

impl<T: DeserializeOwned> ResponseBody for Json<T> {
    fn from_body(body: &[u8]) -> Result<Self, HttpError> {
        Ok(Json(serde_json::from_slice(body)?))
    }
}

/// HTTP client bound to one backend.
#[derive(Clone)]
pub struct HttpService {
    client: reqwest::Client,
    base_url: String,
    context: Option<RequestContext>,
}

impl HttpService {
    /// Create a client for the backend in `config`.
    pub fn new(config: &ClientConfig, context: Option<RequestContext>) -> Response<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self::with_client(client, config, context))
    }

    /// Create a client reusing an existing [`reqwest::Client`] and its connection pool.
    pub fn with_client(
        client: reqwest::Client,
        config: &ClientConfig,
        context: Option<RequestContext>,
    ) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            context,
        }
    }

    /// POST `body` as JSON to `path` and read the response as `T`.
    pub async fn post<B, T>(
        &self,
        path: &str,
        body: &B,
        authorization: AuthorizationType,
    ) -> Response<T>
    where
        B: Serialize + ?Sized,
        T: ResponseBody,
    {
        let url = self.url(path);
        let mut request = self.client.post(&url).json(body);

        if let Some(cookie) = self.context.as_ref().and_then(|ctx| ctx.cookie.as_deref()) {
            request = request.header(COOKIE, cookie);
        }

        match authorization {
            AuthorizationType::None => {}
            AuthorizationType::Bearer => {
                let token = self
                    .context
                    .as_ref()
                    .and_then(|ctx| ctx.access_token.as_deref())
                    .ok_or(HttpError::MissingToken)?;
                request = request.header(AUTHORIZATION, format!("Bearer {token}"));
            }
        }

        log::debug!("-> POST {url}");
        let response = request.send().await?;

        let status = response.status();
        log::debug!("<- {status} {url}");

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(HttpError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        T::from_body(&bytes)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[test]
fn test_url_joins_single_slash() {
    let service = HttpService::with_client(
        reqwest::Client::new(),
        &ClientConfig::new("http://localhost:8080/"),
        None,
    );

    assert_eq!(service.url("/temperature"), "http://localhost:8080/temperature");
    assert_eq!(service.url("humidity"), "http://localhost:8080/humidity");
}

#[test]
fn test_void_body_ignores_content() {
    assert!(<()>::from_body(b"not json at all").is_ok());
}

#[test]
fn test_json_body_reports_decode_error() {
    let err = Json::<serde_json::Value>::from_body(b"{").unwrap_err();
    assert!(matches!(err, HttpError::Decode(_)));
    assert!(err.message().starts_with("Could not decode response"));
}

#[test]
fn test_transport_message_includes_sources() {
    #[derive(Debug)]
    struct Wrapped(std::io::Error);

    impl std::fmt::Display for Wrapped {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("error sending request")
        }
    }

    impl std::error::Error for Wrapped {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    let err = Wrapped(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "connection refused",
    ));

    assert_eq!(error_chain(&err), "error sending request: connection refused");
}

#[test]
fn test_status_error_message() {
    let err = HttpError::Status {
        status: 502,
        body: "bad gateway".into(),
    };
    assert_eq!(err.message(), "Server returned HTTP 502: bad gateway");
}
