//! Shared fixtures for client integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use vitaltrack_api_client::navigation::Navigator;
use vitaltrack_api_client::transport::{HttpRequest, HttpResponse, Transport, TransportError};
use vitaltrack_api_client::{ApiClient, ClientConfig};
use vitaltrack_core::storage::{KeyValueStore, MemoryStore};

pub const BASE_URL: &str = "https://api.test/api";

type Handler = dyn Fn(usize, &HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync;

/// Transport answering from a closure and recording every request.
pub struct MockTransport {
    handler: Box<Handler>,
    requests: Mutex<Vec<HttpRequest>>,
    calls: AtomicUsize,
}

impl MockTransport {
    /// The closure gets the zero-based call number and the request.
    pub fn new(
        handler: impl Fn(usize, &HttpRequest) -> Result<HttpResponse, TransportError>
            + Send
            + Sync
            + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        })
    }

    /// Always answer with `status` and `body`.
    pub fn fixed(status: u16, body: Value) -> Arc<Self> {
        Self::new(move |_, _| Ok(HttpResponse::new(status, body.clone())))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests().last().cloned().expect("no request was sent")
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let response = (self.handler)(call, &request);
        self.requests.lock().unwrap().push(request);
        response
    }
}

/// Navigator that remembers every redirect.
#[derive(Default)]
pub struct RecordingNavigator {
    redirects: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn redirects(&self) -> Vec<String> {
        self.redirects.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, path: &str) {
        self.redirects.lock().unwrap().push(path.to_string());
    }
}

pub struct Harness {
    pub client: ApiClient,
    pub transport: Arc<MockTransport>,
    pub store: Arc<MemoryStore>,
    pub navigator: Arc<RecordingNavigator>,
}

impl Harness {
    pub fn new(transport: Arc<MockTransport>) -> Self {
        Self::with_token(transport, None)
    }

    pub fn with_token(transport: Arc<MockTransport>, token: Option<&str>) -> Self {
        let store = Arc::new(MemoryStore::new());
        if let Some(token) = token {
            store.set("token", token).unwrap();
        }
        let navigator = Arc::new(RecordingNavigator::default());

        let client = ApiClient::builder(ClientConfig::default().with_base_url(BASE_URL))
            .transport(transport.clone())
            .store(store.clone())
            .navigator(navigator.clone())
            .build()
            .unwrap();

        Self {
            client,
            transport,
            store,
            navigator,
        }
    }

    pub fn stored_token(&self) -> Option<String> {
        self.store.get("token").unwrap()
    }
}

pub fn token_expiring_in(seconds: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let exp = chrono::Utc::now().timestamp() + seconds;
    let payload = URL_SAFE_NO_PAD.encode(json!({"exp": exp, "sub": "u1"}).to_string());
    format!("{header}.{payload}.c2lnbmF0dXJl")
}

pub fn ok(data: Value) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse::new(200, json!({"success": true, "data": data})))
}

pub fn status(code: u16) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse::new(code, json!({"success": false, "message": "error"})))
}

pub fn meal_json(id: &str) -> Value {
    json!({
        "_id": id,
        "mealType": "breakfast",
        "date": "2024-01-01",
        "foods": [{"name": "Oats", "calories": 150, "protein": 5, "carbs": 27, "fat": 3}]
    })
}
