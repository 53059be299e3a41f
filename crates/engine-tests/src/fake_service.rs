//! An axum app standing in for the catalog, Solr and GSearch.
//!
//! Each route answers from a queue of canned responses and falls back to a
//! fixed response once the queue is drained. Every request is captured.

use axum::{
    Form, Router,
    extract::{State, rejection::FormRejection},
    http::{HeaderMap, StatusCode, Uri, header},
    routing::post,
};
use std::{
    collections::{HashMap, VecDeque},
    net::SocketAddr,
    sync::{Arc, Mutex},
};
use tokio::{net::TcpListener, task::JoinHandle};

#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub form: Vec<(String, String)>,
}

impl CapturedRequest {
    /// Decoded value of the first form field called `name`.
    pub fn form_value(&self, name: &str) -> Option<String> {
        self.form
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    }
}

#[derive(Debug, Clone)]
struct Route {
    queue: VecDeque<(u16, String)>,
    fallback: (u16, String),
}

#[derive(Clone, Default)]
struct ServiceState {
    routes: Arc<Mutex<HashMap<String, Route>>>,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

#[derive(Default)]
pub struct FakeServiceBuilder {
    routes: HashMap<String, Route>,
}

impl FakeServiceBuilder {
    /// Serves `responses` in order on `path`, then `fallback` forever.
    pub fn route(
        mut self,
        path: &str,
        responses: Vec<(u16, String)>,
        fallback: (u16, String),
    ) -> Self {
        self.routes.insert(
            path.to_string(),
            Route {
                queue: responses.into(),
                fallback,
            },
        );
        self
    }

    pub async fn start(self) -> FakeService {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let paths: Vec<String> = self.routes.keys().cloned().collect();
        let state = ServiceState {
            routes: Arc::new(Mutex::new(self.routes)),
            captured: Arc::default(),
        };
        let app = paths
            .iter()
            .fold(Router::new(), |router, path| router.route(path, post(respond)))
            .with_state(state.clone());

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        FakeService {
            addr,
            captured: state.captured,
            handle,
        }
    }
}

async fn respond(
    State(state): State<ServiceState>,
    uri: Uri,
    headers: HeaderMap,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> (StatusCode, String) {
    let path = uri.path().to_string();

    let (status, payload) = {
        let mut routes = state.routes.lock().unwrap();
        match routes.get_mut(&path) {
            Some(route) => route
                .queue
                .pop_front()
                .unwrap_or_else(|| route.fallback.clone()),
            None => (404, String::new()),
        }
    };

    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let form = form.map(|Form(fields)| fields).unwrap_or_default();

    state.captured.lock().unwrap().push(CapturedRequest {
        path,
        authorization,
        form,
    });

    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, payload)
}

pub struct FakeService {
    addr: SocketAddr,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
    handle: JoinHandle<()>,
}

impl FakeService {
    pub fn builder() -> FakeServiceBuilder {
        FakeServiceBuilder::default()
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Requests received on `path`, in arrival order.
    pub fn requests_to(&self, path: &str) -> Vec<CapturedRequest> {
        self.captured
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }
}

impl Drop for FakeService {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
