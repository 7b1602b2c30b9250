//! Ambient credential transport.
//!
//! The users service hands out its tokens as cookies, so the credentials
//! live in a cookie jar that the HTTP client consults on every request
//! rather than being threaded through each call site.

use crate::{storage::lock, Storage};
use reqwest::{cookie::CookieStore, header::HeaderValue};
use std::{
    collections::BTreeMap,
    fmt::{self, Debug, Formatter},
    sync::{Arc, Mutex},
};
use url::Url;

/// The short-lived credential authorizing API calls.
pub const ACCESS_TOKEN: &str = "access_token";
/// The longer-lived credential used to obtain a new access token.
pub const REFRESH_TOKEN: &str = "refresh_token";
/// The key a persistent [`CookieJar`] is saved under.
pub const CREDENTIALS_KEY: &str = "picturas.credentials";

/// Somewhere to keep named credentials.
pub trait CredentialProvider: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;
    fn set(&self, name: &str, value: &str);
    fn remove(&self, name: &str);
    fn clear(&self);
}

/// A cookie jar dedicated to a single API host.
///
/// Cookies are not scoped by domain or path, everything in the jar is sent
/// with every request. When created with [`CookieJar::persistent()`] the
/// jar is written through to a [`Storage`] backend on every change, the same
/// way a browser keeps its cookies across reloads.
#[derive(Default)]
pub struct CookieJar {
    cookies: Mutex<BTreeMap<String, String>>,
    storage: Option<Arc<dyn Storage>>,
}

impl CookieJar {
    pub fn new() -> Self { CookieJar::default() }

    /// Create a jar backed by `storage`, restoring any saved cookies.
    pub fn persistent(storage: Arc<dyn Storage>) -> Self {
        let cookies = restore(&*storage);

        CookieJar {
            cookies: Mutex::new(cookies),
            storage: Some(storage),
        }
    }

    /// Apply a single `Set-Cookie` header.
    ///
    /// An empty value or a non-positive `Max-Age` deletes the cookie.
    pub fn apply_set_cookie(&self, header: &str) {
        let mut parts = header.split(';');
        let (name, value) = match parts.next().and_then(|p| p.split_once('='))
        {
            Some((name, value)) => (name.trim(), value.trim()),
            None => {
                log::debug!("Ignoring a malformed Set-Cookie header");
                return;
            },
        };

        let expired = parts.filter_map(|attr| attr.split_once('=')).any(
            |(key, value)| {
                key.trim().eq_ignore_ascii_case("max-age")
                    && value.trim().parse::<i64>().map_or(false, |age| age <= 0)
            },
        );

        if expired || value.is_empty() {
            log::trace!("The server expired the \"{}\" cookie", name);
            self.remove(name);
        } else {
            log::trace!("The server set the \"{}\" cookie", name);
            self.set(name, value);
        }
    }

    /// The value of a `Cookie` request header carrying every cookie.
    pub fn header(&self) -> Option<String> {
        let cookies = lock(&self.cookies);

        if cookies.is_empty() {
            return None;
        }

        let pairs: Vec<String> = cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();

        Some(pairs.join("; "))
    }

    fn update<F>(&self, mutate: F)
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let mut cookies = lock(&self.cookies);
        mutate(&mut cookies);

        if let Some(storage) = &self.storage {
            let result = if cookies.is_empty() {
                storage.remove(CREDENTIALS_KEY)
            } else {
                // a map of strings always serializes
                let record = serde_json::to_string(&*cookies)
                    .unwrap_or_else(|_| String::from("{}"));
                storage.set(CREDENTIALS_KEY, &record)
            };

            if let Err(e) = result {
                log::warn!("Unable to persist credentials: {}", e);
            }
        }
    }
}

impl CredentialProvider for CookieJar {
    fn get(&self, name: &str) -> Option<String> {
        lock(&self.cookies).get(name).cloned()
    }

    fn set(&self, name: &str, value: &str) {
        self.update(|cookies| {
            cookies.insert(name.to_string(), value.to_string());
        });
    }

    fn remove(&self, name: &str) {
        self.update(|cookies| {
            cookies.remove(name);
        });
    }

    fn clear(&self) { self.update(BTreeMap::clear); }
}

impl CookieStore for CookieJar {
    fn set_cookies(
        &self,
        cookie_headers: &mut dyn Iterator<Item = &HeaderValue>,
        _url: &Url,
    ) {
        for header in cookie_headers {
            match header.to_str() {
                Ok(header) => self.apply_set_cookie(header),
                Err(_) => log::debug!("Ignoring a non-ASCII Set-Cookie header"),
            }
        }
    }

    fn cookies(&self, _url: &Url) -> Option<HeaderValue> {
        self.header()
            .and_then(|header| HeaderValue::from_str(&header).ok())
    }
}

impl Debug for CookieJar {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        // only the names, the values are secrets
        let cookies = lock(&self.cookies);
        f.debug_struct("CookieJar")
            .field("cookies", &cookies.keys().collect::<Vec<_>>())
            .field("persistent", &self.storage.is_some())
            .finish()
    }
}

fn restore(storage: &dyn Storage) -> BTreeMap<String, String> {
    let raw = match storage.get(CREDENTIALS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return BTreeMap::new(),
        Err(e) => {
            log::warn!("Unable to read the saved credentials: {}", e);
            return BTreeMap::new();
        },
    };

    serde_json::from_str(&raw).unwrap_or_else(|e| {
        log::warn!("Discarding corrupt credentials: {}", e);
        if let Err(e) = storage.remove(CREDENTIALS_KEY) {
            log::warn!("Unable to remove the corrupt credentials: {}", e);
        }
        BTreeMap::new()
    })
}
