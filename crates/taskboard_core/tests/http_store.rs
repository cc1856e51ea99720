use serde_json::{json, Value};
use std::io::Read;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use taskboard_core::{
    BoardService, HttpRemoteStore, NamespaceKey, RemoteBoardRepository, RemoteStore,
    SessionContext, StoreError, TaskStatus, UserPaths,
};
use tiny_http::{Method, Response, Server};

#[derive(Debug, Clone, PartialEq)]
struct Seen {
    method: String,
    url: String,
    body: String,
}

type Log = Arc<Mutex<Vec<Seen>>>;

fn spawn_document_server() -> (String, Log, thread::JoinHandle<()>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let base = format!("http://{}", server.server_addr());
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let log_clone = Arc::clone(&log);
    let handle = thread::spawn(move || loop {
        let mut req = match server.recv_timeout(Duration::from_millis(500)) {
            Ok(Some(req)) => req,
            Ok(None) | Err(_) => break,
        };
        let mut body = String::new();
        let _ = req.as_reader().read_to_string(&mut body);
        let url = req.url().to_string();
        let method = req.method().clone();
        log_clone.lock().unwrap().push(Seen {
            method: method.to_string(),
            url: url.clone(),
            body: body.clone(),
        });

        let (status, payload): (u16, String) = match (&method, url.as_str()) {
            (Method::Get, "/users/adaexamplecom/u1/board.json") => (
                200,
                json!({
                    "todo": [{"id": "t1", "title": "Stored", "category": "User Story",
                              "status": "todo"}],
                    "done": {"-Nk": {"id": "t2", "title": "Finished",
                                     "category": "Technical Task", "status": "Done"}}
                })
                .to_string(),
            ),
            (Method::Get, "/locked.json") => (401, json!({"error": "denied"}).to_string()),
            (Method::Get, "/garbled.json") => (200, "{not json".to_string()),
            (Method::Get, _) => (200, "null".to_string()),
            (Method::Post, _) => (200, json!({"name": "-Ngenerated"}).to_string()),
            (Method::Put, _) => (200, body),
            (Method::Delete, _) => (200, "null".to_string()),
            _ => (405, String::new()),
        };
        let _ = req.respond(Response::from_string(payload).with_status_code(status));
    });
    (base, log, handle)
}

fn seen(log: &Log) -> Vec<(String, String)> {
    log.lock()
        .unwrap()
        .iter()
        .map(|entry| (entry.method.clone(), entry.url.clone()))
        .collect()
}

#[test]
fn maps_operations_onto_json_urls_with_matching_verbs() {
    let (base, log, handle) = spawn_document_server();
    let store = HttpRemoteStore::new(&base, Duration::from_secs(5)).unwrap();

    assert_eq!(store.get("users/nobody").unwrap(), None);

    let created = store
        .create("users/adaexamplecom", &json!({"name": "Ada"}))
        .unwrap();
    assert_eq!(created.key.as_deref(), Some("-Ngenerated"));

    let replaced = store
        .replace("users/adaexamplecom/u1/contacts", &json!([{"id": "c1"}]))
        .unwrap();
    assert_eq!(replaced.value, json!([{"id": "c1"}]));

    store.remove("users/adaexamplecom/u1/board/todo/0").unwrap();
    drop(store);
    handle.join().unwrap();

    assert_eq!(
        seen(&log),
        vec![
            ("GET".to_string(), "/users/nobody.json".to_string()),
            ("POST".to_string(), "/users/adaexamplecom.json".to_string()),
            (
                "PUT".to_string(),
                "/users/adaexamplecom/u1/contacts.json".to_string()
            ),
            (
                "DELETE".to_string(),
                "/users/adaexamplecom/u1/board/todo/0.json".to_string()
            ),
        ]
    );
    let bodies = log.lock().unwrap().clone();
    let posted: Value = serde_json::from_str(&bodies[1].body).unwrap();
    assert_eq!(posted, json!({"name": "Ada"}));
}

#[test]
fn non_success_status_and_bad_json_surface_as_errors() {
    let (base, _log, handle) = spawn_document_server();
    let store = HttpRemoteStore::new(&base, Duration::from_secs(5)).unwrap();

    match store.get("locked") {
        Err(StoreError::Status { method, status, .. }) => {
            assert_eq!(method, "GET");
            assert_eq!(status, 401);
        }
        other => panic!("expected status error, got {other:?}"),
    }
    assert!(matches!(
        store.get("garbled"),
        Err(StoreError::Decode { .. })
    ));
    assert!(matches!(
        store.get("bad.path"),
        Err(StoreError::InvalidPath(_))
    ));

    drop(store);
    handle.join().unwrap();
}

#[test]
fn board_engine_loads_through_http_backend() {
    let (base, _log, handle) = spawn_document_server();
    let store = HttpRemoteStore::new(&base, Duration::from_secs(5)).unwrap();
    let ctx = SessionContext::new("u1", NamespaceKey::from_email("ada@example.com"));

    let board = BoardService::load(RemoteBoardRepository::new(&store, UserPaths::new(&ctx)))
        .unwrap();
    assert_eq!(board.board().tasks(TaskStatus::Todo)[0].title, "Stored");
    assert_eq!(board.board().tasks(TaskStatus::Done)[0].id, "t2");
    assert!(board.board().tasks(TaskStatus::InProgress).is_empty());

    drop(board);
    drop(store);
    handle.join().unwrap();
}

#[test]
fn unreachable_server_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let store = HttpRemoteStore::new(&base, Duration::from_secs(2)).unwrap();
    assert!(matches!(
        store.get("users"),
        Err(StoreError::Transport { .. })
    ));
}

#[test]
fn rejects_non_http_base_urls() {
    assert!(HttpRemoteStore::new("ftp://example.com", Duration::from_secs(1)).is_err());
    assert!(HttpRemoteStore::new("not a url", Duration::from_secs(1)).is_err());
}
