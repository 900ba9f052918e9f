use dehashed_cli::api::{
    ApiClient, ApiError, ChannelType, ClientContext, ErrorKind, SearchRequest, TaskSpec,
};
use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// What the stub server saw for one request.
#[derive(Debug)]
struct Captured {
    request_line: String,
    headers: Vec<(String, String)>,
    body: Value,
}

impl Captured {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

fn read_request(stream: &mut TcpStream) -> Captured {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).unwrap();

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((k, v)) = line.split_once(':') {
            headers.push((k.trim().to_string(), v.trim().to_string()));
        }
    }

    let length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .map(|(_, v)| v.parse::<usize>().unwrap())
        .unwrap_or(0);
    let mut body = vec![0u8; length];
    reader.read_exact(&mut body).unwrap();

    Captured {
        request_line: request_line.trim_end().to_string(),
        headers,
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    }
}

/// Serve exactly one request with a canned response. Returns the base URL and
/// a receiver for what the server saw.
fn serve_once(status: u16, reason: &str, body: &str) -> (String, mpsc::Receiver<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::channel();
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\r\n{body}",
        body.len()
    );

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let captured = read_request(&mut stream);
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();
        let _ = tx.send(captured);
    });

    (format!("http://{addr}/v2"), rx)
}

fn client_for(base_url: &str) -> ApiClient {
    let context = ClientContext::new("test-key")
        .unwrap()
        .with_base_url(base_url)
        .with_timeout(Duration::from_secs(5));
    ApiClient::new(context).unwrap()
}

#[test]
fn test_search_sends_key_header_and_full_payload() {
    let (base, rx) = serve_once(200, "OK", r#"{"balance": 42, "entries": [], "total": 0}"#);
    let client = client_for(&base);

    let result = client
        .search(SearchRequest::new("email:user@example.com").size(5))
        .unwrap();
    assert_eq!(result.balance(), Some(42));
    assert_eq!(result.entries().map(<[Value]>::len), Some(0));

    let seen = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(seen.request_line, "POST /v2/search HTTP/1.1");
    assert_eq!(seen.header("Dehashed-Api-Key"), Some("test-key"));
    assert!(seen
        .header("Content-Type")
        .is_some_and(|v| v.starts_with("application/json")));
    assert_eq!(
        seen.body,
        json!({
            "query": "email:user@example.com",
            "page": 1,
            "size": 5,
            "wildcard": false,
            "regex": false,
            "de_dupe": false,
        })
    );
}

#[test]
fn test_create_task_omits_empty_channels() {
    let (base, rx) = serve_once(200, "OK", r#"{"success": true}"#);
    let client = client_for(&base);

    client
        .monitoring_create_task(TaskSpec::new("email", "a@b.com"))
        .unwrap();

    let seen = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(seen.request_line, "POST /v2/monitoring/create-task HTTP/1.1");
    assert_eq!(seen.body, json!({"type": "email", "value": "a@b.com"}));
}

#[test]
fn test_create_task_sends_channels_when_present() {
    let (base, rx) = serve_once(200, "OK", r#"{"success": true}"#);
    let client = client_for(&base);

    client
        .monitoring_create_task(
            TaskSpec::new("domain", "example.com").channels([ChannelType::Webhook]),
        )
        .unwrap();

    let seen = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(
        seen.body,
        json!({"type": "domain", "value": "example.com", "channels": ["webhook"]})
    );
}

#[test]
fn test_get_channels_sends_empty_object() {
    let (base, rx) = serve_once(200, "OK", r#"{"channels": []}"#);
    let client = client_for(&base);

    client.monitoring_get_channels().unwrap();

    let seen = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(seen.body, json!({}));
}

#[test]
fn test_rejection_uses_message_field() {
    let (base, _rx) = serve_once(400, "Bad Request", r#"{"message": "invalid query"}"#);
    let client = client_for(&base);

    let err = client.search(SearchRequest::new("bad")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::HttpStatus);
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.message(), "invalid query");
    assert_eq!(err.to_string(), "API Error: invalid query");
}

#[test]
fn test_rejection_falls_back_to_error_field() {
    let (base, _rx) = serve_once(401, "Unauthorized", r#"{"error": "bad key"}"#);
    let client = client_for(&base);

    let err = client.search_password("abc").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::HttpStatus);
    assert_eq!(err.message(), "bad key");
}

#[test]
fn test_rejection_without_json_uses_status_line() {
    let (base, _rx) = serve_once(404, "Not Found", "not json at all");
    let client = client_for(&base);

    let err = client.whois_lookup("example.com").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::HttpStatus);
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.message(), "404 Not Found");
}

#[test]
fn test_success_with_non_json_body_is_malformed() {
    let (base, _rx) = serve_once(200, "OK", "<html>oops</html>");
    let client = client_for(&base);

    let err = client.monitoring_get_tasks(1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Malformed);
    match err {
        ApiError::Malformed { snippet, .. } => assert_eq!(snippet, "<html>oops</html>"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_timeout_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let (done_tx, done_rx) = mpsc::channel::<()>();

    // Accept and hold the connection open without answering.
    thread::spawn(move || {
        let (_stream, _) = listener.accept().unwrap();
        let _ = done_rx.recv_timeout(Duration::from_secs(10));
    });

    let context = ClientContext::new("test-key")
        .unwrap()
        .with_base_url(format!("http://{addr}/v2"))
        .with_timeout(Duration::from_millis(200));
    let client = ApiClient::new(context).unwrap();

    let err = client.search(SearchRequest::new("q")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(err.to_string().starts_with("API request failed:"));

    let _ = done_tx.send(());
}

#[test]
fn test_connection_refused_is_transport_error() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    let client = client_for(&format!("http://{addr}/v2"));
    let err = client.search(SearchRequest::new("q")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[test]
fn test_client_is_reusable_and_closable() {
    let (base, _rx) = serve_once(200, "OK", r#"{"ok": true}"#);
    let client = client_for(&base);
    assert_eq!(client.whois_ns("ns1.example.com").unwrap().as_value(), &json!({"ok": true}));
    client.close();
}
