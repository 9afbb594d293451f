//! Scripted network used by unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::Error;
use crate::http::{Request, Response};
use crate::network::Network;

/// Serves canned responses by URL and counts every call.
#[derive(Default)]
pub struct FakeNetwork {
    routes: Mutex<HashMap<String, Response>>,
    offline: AtomicBool,
    calls: AtomicUsize,
    per_url: Mutex<HashMap<String, usize>>,
}

impl FakeNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` with status 200 for `url`.
    pub fn route(&self, url: &str, body: &'static str) -> &Self {
        self.route_response(url, Response::new(200, body))
    }

    pub fn route_response(&self, url: &str, response: Response) -> &Self {
        self.routes.lock().unwrap().insert(url.to_string(), response);
        self
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn calls_for(&self, url: &str) -> usize {
        self.per_url.lock().unwrap().get(url).copied().unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl Network for FakeNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self
            .per_url
            .lock()
            .unwrap()
            .entry(request.url.to_string())
            .or_default() += 1;

        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::Network(format!("offline: {}", request.url)));
        }

        match self.routes.lock().unwrap().get(request.url.as_str()) {
            Some(response) => Ok(response.clone()),
            None => Ok(Response::new(404, "not found")),
        }
    }
}
