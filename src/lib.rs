//! Client-side session and authentication glue for the Picturas API.
//!
//! The two pieces doing real work are the [`SessionStore`], which remembers
//! who is logged in across restarts, and the [`AuthenticatedClient`], which
//! sends requests with ambient credentials and transparently recovers from an
//! expired access token exactly once.

#![forbid(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

mod auth;
mod client;
mod config;
mod credentials;
pub mod endpoints;
mod error;
mod router;
mod session;
mod storage;
mod store;
mod transport;

#[cfg(test)]
pub(crate) mod test_utils;

pub use auth::Auth;
pub use client::{AuthenticatedClient, REFRESH_PATH};
pub use config::{default_state_dir, Config, DEFAULT_BASE_URL};
pub use credentials::{
    CookieJar, CredentialProvider, ACCESS_TOKEN, CREDENTIALS_KEY,
    REFRESH_TOKEN,
};
pub use error::Error;
pub use router::{guard, Navigation, Navigator, NoopNavigator, Route};
pub use session::Session;
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use store::{SessionStore, SESSION_KEY};
pub use transport::{
    HttpTransport, Method, Request, Response, StatusCode, Transport,
    TransportError,
};

/// The default user agent to use when communicating with the Picturas API.
pub const DEFAULT_USER_AGENT: &str =
    concat!(env!("CARGO_PKG_NAME"), "-", env!("CARGO_PKG_VERSION"));
