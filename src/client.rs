use crate::{
    CredentialProvider, Error, Navigator, Request, Response, Route,
    SessionStore, StatusCode, Transport,
};
use std::{
    fmt::{self, Debug, Formatter},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};
use tokio::sync::Mutex;

/// Where the access token gets refreshed.
pub const REFRESH_PATH: &str = "users/refresh";

/// Sends requests with ambient credentials, transparently recovering from an
/// expired access token.
///
/// When a request comes back `401 Unauthorized` the client makes a single
/// trip to [`REFRESH_PATH`] and retries the original request once. If the
/// refresh itself fails the user is logged out, sent to [`Route::Login`],
/// and the call fails with [`Error::Unauthorized`].
///
/// Concurrent calls share refreshes. Refreshing is serialized, and a call
/// which sees that someone else refreshed the credentials after it sent its
/// request skips straight to the retry.
pub struct AuthenticatedClient {
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialProvider>,
    store: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
    refresh_lock: Mutex<()>,
    /// Bumped every time the access token is successfully refreshed.
    generation: AtomicU64,
}

impl AuthenticatedClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialProvider>,
        store: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        AuthenticatedClient {
            transport,
            credentials,
            store,
            navigator,
            refresh_lock: Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    pub fn credentials(&self) -> &dyn CredentialProvider { &*self.credentials }

    pub fn store(&self) -> &Arc<SessionStore> { &self.store }

    pub fn navigator(&self) -> &dyn Navigator { &*self.navigator }

    /// Send a request without the refresh-and-retry dance.
    ///
    /// Used for endpoints like login, where a 401 means "wrong password"
    /// rather than "expired token".
    pub async fn send_anonymous(
        &self,
        request: &Request,
    ) -> Result<Response, Error> {
        self.transport.send(request).await.map_err(Error::from)
    }

    /// Send a request, refreshing the access token and retrying once if the
    /// server says it has expired.
    pub async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let seen = self.generation.load(Ordering::SeqCst);
        let response = self.transport.send(request).await?;

        if response.status != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        log::debug!(
            "{} {} was unauthorized, refreshing the access token",
            request.method,
            request.path
        );

        let refreshed = {
            let _guard = self.refresh_lock.lock().await;

            if self.generation.load(Ordering::SeqCst) == seen {
                let result = self.refresh().await;
                if result.is_ok() {
                    self.generation.fetch_add(1, Ordering::SeqCst);
                }
                result
            } else {
                log::debug!("The access token was refreshed in the meantime");
                Ok(())
            }
        };

        if let Err(e) = refreshed {
            log::warn!("Unable to refresh the access token: {}", e);
            self.force_logout();
            return Err(Error::Unauthorized);
        }

        log::debug!("Retrying {} {}", request.method, request.path);
        self.transport.send(request).await.map_err(Error::from)
    }

    async fn refresh(&self) -> Result<(), Error> {
        crate::endpoints::refresh(self).await.map(|_| ())
    }

    /// Forget everything we know about the user and send them to the login
    /// page.
    pub(crate) fn force_logout(&self) {
        self.store.logout();
        self.credentials.clear();
        self.navigator.navigate(Route::Login);
    }
}

impl Debug for AuthenticatedClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedClient")
            .field("store", &self.store)
            .field("generation", &self.generation)
            .finish()
    }
}
