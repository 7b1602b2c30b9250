//! The raw network-request primitive everything else is built on.

use crate::{CookieJar, DEFAULT_USER_AGENT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{
    fmt::{self, Debug, Formatter},
    sync::Arc,
};
use url::Url;

pub use reqwest::{Method, StatusCode};

/// A request against the API, relative to its base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    /// The path relative to the API's base URL (e.g. `users/me`).
    pub path: String,
    pub body: Option<Value>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Request {
            method,
            path: path.into(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Request::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Request::new(Method::POST, path)
    }

    /// Attach a JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// A fully buffered response.
#[derive(Clone, PartialEq)]
pub struct Response {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Response {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool { self.status.is_success() }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl Debug for Response {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("body", &self.text())
            .finish()
    }
}

/// Sends a [`Request`] and buffers the [`Response`].
///
/// Implementations are expected to attach ambient credentials themselves.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &Request) -> Result<Response, TransportError>;
}

/// The request never produced a response.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The HTTP client encountered an error.
    #[error("Unable to send the request")]
    HttpClient(#[from] reqwest::Error),
    #[error("\"{}\" isn't a valid path on the API", path)]
    BadPath {
        path: String,
        #[source]
        inner: url::ParseError,
    },
    /// Any other reason a [`Transport`] couldn't deliver the request.
    #[error("{0}")]
    Other(String),
}

/// A [`Transport`] which talks HTTP using `reqwest`.
///
/// The [`CookieJar`] is installed as the client's cookie store, so every
/// request carries the current credentials and every `Set-Cookie` the server
/// sends rotates them.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(
        base_url: Url,
        user_agent: &str,
        cookies: Arc<CookieJar>,
    ) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .cookie_provider(cookies)
            .gzip(true)
            .build()?;

        Ok(HttpTransport {
            client,
            base_url: normalise_base_url(base_url),
        })
    }

    /// Create a transport using the [`DEFAULT_USER_AGENT`].
    pub fn with_defaults(
        base_url: Url,
        cookies: Arc<CookieJar>,
    ) -> Result<Self, TransportError> {
        HttpTransport::new(base_url, DEFAULT_USER_AGENT, cookies)
    }

    pub fn base_url(&self) -> &Url { &self.base_url }

    fn url_for(&self, path: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|inner| TransportError::BadPath {
                path: path.to_string(),
                inner,
            })
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &Request) -> Result<Response, TransportError> {
        let url = self.url_for(&request.path)?;

        log::debug!("Sending a {} request to {}", request.method, url);
        log::trace!("Payload: {:#?}", request.body);

        let mut builder = self.client.request(request.method.clone(), url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        log::trace!("Headers: {:#?}", response.headers());

        let status = response.status();
        let body = response.bytes().await?;
        log::trace!("Response ({}): {}", status, String::from_utf8_lossy(&body));

        Ok(Response::new(status, body.to_vec()))
    }
}

impl Debug for HttpTransport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

/// Make sure relative paths are joined onto the base URL rather than
/// replacing its last segment.
pub(crate) fn normalise_base_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    url
}
