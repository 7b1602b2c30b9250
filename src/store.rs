use crate::{storage::lock, Session, Storage};
use std::sync::{Arc, Mutex};

/// The key the current session is persisted under.
pub const SESSION_KEY: &str = "picturas.session";

/// The single source of truth for "who is the current user".
///
/// Every change is written through to the [`Storage`] backend, and the
/// session is rehydrated from it when the store is opened. Share it with an
/// [`Arc`]; the lock is never held across an `.await`.
pub struct SessionStore {
    session: Mutex<Session>,
    storage: Arc<dyn Storage>,
}

impl SessionStore {
    /// Open a store, restoring whatever session was persisted last.
    pub fn open(storage: Arc<dyn Storage>) -> Self {
        let session = rehydrate(&*storage);

        SessionStore {
            session: Mutex::new(session),
            storage,
        }
    }

    /// Overwrite the current session with server-confirmed values.
    pub fn login(
        &self,
        name: impl Into<String>,
        email: impl Into<String>,
        premium: bool,
        uuid: impl Into<String>,
    ) {
        let session = Session::new(name, email, premium, uuid);
        log::info!("Logged in as {}", session.email);

        self.persist(&session);
        *lock(&self.session) = session;
    }

    /// Forget the current user.
    pub fn logout(&self) {
        *lock(&self.session) = Session::default();

        match self.storage.remove(SESSION_KEY) {
            Ok(()) => {
                // pick up anything written behind our back
                let restored = rehydrate(&*self.storage);
                *lock(&self.session) = restored;
            },
            // the stale record is still there, so stay logged out in memory
            Err(e) => {
                log::warn!("Unable to remove the persisted session: {}", e)
            },
        }

        log::info!("Logged out");
    }

    pub fn logged_in(&self) -> bool { lock(&self.session).is_logged_in() }

    /// A snapshot of the current session.
    pub fn session(&self) -> Session { lock(&self.session).clone() }

    fn persist(&self, session: &Session) {
        let record = session.to_json().to_string();
        log::trace!("Persisting session: {}", record);

        if let Err(e) = self.storage.set(SESSION_KEY, &record) {
            log::warn!("Unable to persist the session: {}", e);
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("session", &*lock(&self.session))
            .finish()
    }
}

fn rehydrate(storage: &dyn Storage) -> Session {
    let raw = match storage.get(SESSION_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Session::default(),
        Err(e) => {
            log::warn!("Unable to read the persisted session: {}", e);
            return Session::default();
        },
    };

    let parsed = serde_json::from_str(&raw)
        .and_then(|record| Session::from_json(&record));

    match parsed {
        Ok(session) => {
            log::debug!("Restored the session for {:?}", session.email);
            session
        },
        Err(e) => {
            log::warn!("Discarding a corrupt session record: {}", e);

            if let Err(e) = storage.remove(SESSION_KEY) {
                log::warn!("Unable to remove the corrupt session: {}", e);
            }

            Session::default()
        },
    }
}
