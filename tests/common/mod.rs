//! Shared helpers: a scripted in-memory transport and client builders

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use tokio::sync::Notify;

use lending_client::{
    api::{HttpRequest, HttpResponse, Transport},
    config::AppConfig,
    credentials::{CredentialStore, MemoryCredentialStore},
    error::TransportError,
    LendingClient,
};

#[derive(Clone)]
enum Reply {
    Status(u16, String),
    Fail(TransportError),
}

#[derive(Default)]
struct Route {
    replies: VecDeque<Reply>,
    last: Option<Reply>,
    gate: Option<Arc<Notify>>,
}

/// Answers requests from per-route scripts and records everything it sees.
///
/// Scripted replies are used in order; the last one is repeated once the
/// script runs out.
/// Unscripted routes answer 404.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<(Method, String), Route>>,
    log: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, method: Method, path: &str, reply: Reply) {
        self.routes
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .replies
            .push_back(reply);
    }

    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) {
        self.push(method, path, Reply::Status(status, body.to_string()));
    }

    pub fn respond_raw(&self, method: Method, path: &str, status: u16, body: &str) {
        self.push(method, path, Reply::Status(status, body.to_string()));
    }

    pub fn fail(&self, method: Method, path: &str, error: TransportError) {
        self.push(method, path, Reply::Fail(error));
    }

    /// Hold replies on a route until the returned handle is notified
    pub fn hold(&self, method: Method, path: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.routes
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .gate = Some(gate.clone());
        gate
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.log.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.url.path() == path)
            .count()
    }

    pub fn total(&self) -> usize {
        self.log.lock().unwrap().len()
    }

    pub fn last_to(&self, path: &str) -> Option<HttpRequest> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|r| r.url.path() == path)
            .cloned()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let key = (request.method.clone(), request.url.path().to_string());
        self.log.lock().unwrap().push(request);

        let (reply, gate) = {
            let mut routes = self.routes.lock().unwrap();
            match routes.get_mut(&key) {
                Some(route) => {
                    if let Some(next) = route.replies.pop_front() {
                        route.last = Some(next);
                    }
                    (route.last.clone(), route.gate.clone())
                }
                None => (None, None),
            }
        };

        if let Some(gate) = gate {
            gate.notified().await;
        }

        match reply {
            Some(Reply::Status(status, body)) => Ok(HttpResponse {
                status,
                body: body.into_bytes(),
            }),
            Some(Reply::Fail(error)) => Err(error),
            None => Ok(HttpResponse {
                status: 404,
                body: b"no route".to_vec(),
            }),
        }
    }
}

pub fn client_with(transport: Arc<ScriptedTransport>, store: Arc<MemoryCredentialStore>) -> LendingClient {
    let mut config = AppConfig::default();
    config.api.base_url = "http://library.test".to_string();
    let store: Arc<dyn CredentialStore> = store;
    LendingClient::with_parts(config, transport, store).unwrap()
}

pub fn client(transport: Arc<ScriptedTransport>) -> LendingClient {
    client_with(transport, Arc::new(MemoryCredentialStore::new()))
}

pub const READER_ID: i32 = 3;

pub fn profile_json() -> Value {
    json!({
        "id": READER_ID,
        "name": "Lin Mei",
        "cardId": "C-0003",
        "account": "reader01",
        "email": "lin@example.org",
        "phone": null,
        "address": "Taipei"
    })
}

pub fn script_login(transport: &ScriptedTransport) {
    transport.respond(
        Method::POST,
        "/api/auth/login",
        200,
        json!({"jwt": "jwt-token-1", "userId": READER_ID, "role": "reader"}),
    );
    transport.respond(Method::GET, "/api/users/3/profile", 200, profile_json());
}

/// Client with a logged-in reader; the login traffic is part of the log
pub async fn logged_in_client(transport: Arc<ScriptedTransport>) -> LendingClient {
    script_login(&transport);
    let client = client(transport);
    client.services.session.login("reader01", "secret1").await.unwrap();
    assert!(client.services.session.is_logged_in());
    client
}

pub fn book_json(id: i32, title: &str, available: i32) -> Value {
    json!({
        "id": id,
        "title": title,
        "author": "Author",
        "category": "Fiction",
        "publishYear": 2001,
        "publisher": "Publisher",
        "availableCopies": available,
        "totalCopies": 2,
        "imageUrl": null
    })
}

pub fn book_detail_json(id: i32, title: &str, available: i32) -> Value {
    let mut detail = book_json(id, title, available);
    detail["isbn"] = json!("9780000000000");
    detail["description"] = json!("A book");
    detail["bookCopies"] = json!([
        {"id": 1, "uniqueCode": "BK-001", "statusDescription": if available > 0 { "可借閱" } else { "已借出" }},
        {"id": 2, "uniqueCode": "BK-002", "statusDescription": "已借出"}
    ]);
    detail
}

pub fn loan_json(loan_id: i32, title: &str, loan_date: &str, return_date: Option<&str>) -> Value {
    json!({
        "loanId": loan_id,
        "title": title,
        "uniqueCode": format!("BK-{:03}", loan_id),
        "loanDate": loan_date,
        "returnDate": return_date
    })
}
