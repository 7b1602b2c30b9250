//! Test doubles shared by the unit tests.

use crate::{
    credentials::{ACCESS_TOKEN, REFRESH_TOKEN},
    AuthenticatedClient, CookieJar, CredentialProvider, MemoryStorage,
    Request, Response, Route, SessionStore, StatusCode, Transport,
    TransportError,
};
use serde_json::Value;
use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
};

type Reply = Result<Response, TransportError>;
type Hook = Box<dyn Fn() + Send + Sync>;

/// A [`Transport`] which plays back canned replies and records everything
/// it was asked to send.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<Request>>,
    hooks: Mutex<HashMap<usize, Hook>>,
}

impl ScriptedTransport {
    pub fn new(replies: Vec<Reply>) -> Self {
        ScriptedTransport {
            replies: Mutex::new(replies.into()),
            ..Default::default()
        }
    }

    pub fn reply(status: StatusCode, body: Value) -> Reply {
        Ok(Response::new(status, body.to_string()))
    }

    pub fn unreachable() -> Reply {
        Err(TransportError::Other(String::from("Connection refused")))
    }

    /// Run `hook` while the `nth` request (zero-based) is being sent.
    pub fn on_send<F>(&self, nth: usize, hook: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.hooks.lock().unwrap().insert(nth, Box::new(hook));
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }

    pub fn calls(&self) -> usize { self.requests.lock().unwrap().len() }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &Request) -> Result<Response, TransportError> {
        let nth = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len() - 1
        };

        if let Some(hook) = self.hooks.lock().unwrap().get(&nth) {
            hook();
        }

        self.replies.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(TransportError::Other(format!(
                "No reply scripted for {} {}",
                request.method, request.path
            )))
        })
    }
}

/// Everything needed to drive an [`AuthenticatedClient`] in a test.
pub(crate) struct Harness {
    pub transport: Arc<ScriptedTransport>,
    pub credentials: Arc<CookieJar>,
    pub storage: Arc<MemoryStorage>,
    pub store: Arc<SessionStore>,
    pub client: Arc<AuthenticatedClient>,
    visited: Arc<Mutex<Vec<Route>>>,
}

impl Harness {
    pub fn logged_out(replies: Vec<Reply>) -> Self {
        let transport = Arc::new(ScriptedTransport::new(replies));
        let credentials = Arc::new(CookieJar::new());
        let storage = Arc::new(MemoryStorage::new());
        let store = Arc::new(SessionStore::open(storage.clone()));
        let visited = Arc::new(Mutex::new(Vec::new()));

        let navigator = {
            let visited = Arc::clone(&visited);
            move |route: Route| visited.lock().unwrap().push(route)
        };

        let client = Arc::new(AuthenticatedClient::new(
            transport.clone(),
            credentials.clone(),
            store.clone(),
            Arc::new(navigator),
        ));

        Harness {
            transport,
            credentials,
            storage,
            store,
            client,
            visited,
        }
    }

    pub fn logged_in(replies: Vec<Reply>) -> Self {
        let harness = Harness::logged_out(replies);

        harness.store.login("Ana", "ana@example.com", false, "u-1");
        harness.credentials.set(ACCESS_TOKEN, "stale");
        harness.credentials.set(REFRESH_TOKEN, "refresh");

        harness
    }

    pub fn navigations(&self) -> Vec<Route> {
        self.visited.lock().unwrap().clone()
    }
}
