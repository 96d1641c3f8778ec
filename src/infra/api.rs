use crate::domain::{TodoDraft, TodoRecord};
use std::time::Duration;
use thiserror::Error;

const FRESHNESS_HEADER: &str = "etag";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {detail}")]
    Transport { url: String, detail: String },

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("malformed response from {url}: {detail}")]
    MalformedResponse { url: String, detail: String },
}

/// Result of a list fetch: the decoded records plus the opaque
/// freshness token the server attached, if any.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TodoListing {
    pub records: Vec<TodoRecord>,
    pub freshness: Option<String>,
}

/// Thin client over the todo API. One configured agent, one status
/// gate, decode-and-validate at the boundary.
#[derive(Clone, Debug)]
pub struct ApiClient {
    agent: ureq::Agent,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            agent: make_agent(timeout),
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn todos_url(&self) -> String {
        format!("{}/todos", self.base_url)
    }

    fn todo_url(&self, id: u64) -> String {
        format!("{}/todos/{id}", self.base_url)
    }

    /// `GET /api/todos`: the whole collection plus the freshness token.
    pub fn list_todos(&self) -> Result<TodoListing, ApiError> {
        let url = self.todos_url();
        let mut response = self
            .agent
            .get(&url)
            .header("Accept", "application/json")
            .call()
            .map_err(|error| transport_error(&url, &error))?;

        check_status(&url, response.status().as_u16())?;
        let freshness = freshness_token(response.headers());
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|error| transport_error(&url, &error))?;
        let records = decode_records(&url, &body)?;
        Ok(TodoListing { records, freshness })
    }

    /// `HEAD /api/todos`: reads the freshness token without a body
    /// transfer. `None` means the server sent no token.
    pub fn fetch_freshness(&self) -> Result<Option<String>, ApiError> {
        let url = self.todos_url();
        let response = self
            .agent
            .head(&url)
            .call()
            .map_err(|error| transport_error(&url, &error))?;

        check_status(&url, response.status().as_u16())?;
        Ok(freshness_token(response.headers()))
    }

    /// `POST /api/todos`: the server assigns the id and returns the
    /// stored record.
    pub fn create_todo(&self, draft: &TodoDraft) -> Result<TodoRecord, ApiError> {
        let url = self.todos_url();
        let response = self
            .agent
            .post(&url)
            .send_json(draft)
            .map_err(|error| transport_error(&url, &error))?;
        read_record(&url, response)
    }

    /// `PUT /api/todos/{id}`: full field replacement, returns the
    /// updated record.
    pub fn update_todo(&self, id: u64, draft: &TodoDraft) -> Result<TodoRecord, ApiError> {
        let url = self.todo_url(id);
        let response = self
            .agent
            .put(&url)
            .send_json(draft)
            .map_err(|error| transport_error(&url, &error))?;
        read_record(&url, response)
    }

    /// `DELETE /api/todos/{id}`: success is status-only, no body.
    pub fn delete_todo(&self, id: u64) -> Result<(), ApiError> {
        let url = self.todo_url(id);
        let response = self
            .agent
            .delete(&url)
            .call()
            .map_err(|error| transport_error(&url, &error))?;
        check_status(&url, response.status().as_u16())
    }
}

fn make_agent(timeout: Duration) -> ureq::Agent {
    // Non-2xx statuses come back as plain responses; the status gate
    // below decides what counts as success.
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build();
    config.into()
}

/// 200-399 is success, 400 and above is failure. Redirects ureq has
/// already followed land in the success range.
pub const fn is_success_status(status: u16) -> bool {
    status >= 200 && status < 400
}

fn check_status(url: &str, status: u16) -> Result<(), ApiError> {
    if is_success_status(status) {
        return Ok(());
    }
    Err(ApiError::Status {
        url: url.to_string(),
        status,
    })
}

fn transport_error(url: &str, error: &ureq::Error) -> ApiError {
    ApiError::Transport {
        url: url.to_string(),
        detail: error.to_string(),
    }
}

fn read_record(
    url: &str,
    mut response: ureq::http::Response<ureq::Body>,
) -> Result<TodoRecord, ApiError> {
    check_status(url, response.status().as_u16())?;
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|error| transport_error(url, &error))?;
    decode_record(url, &body)
}

fn decode_record(url: &str, body: &str) -> Result<TodoRecord, ApiError> {
    serde_json::from_str(body).map_err(|error| ApiError::MalformedResponse {
        url: url.to_string(),
        detail: error.to_string(),
    })
}

fn decode_records(url: &str, body: &str) -> Result<Vec<TodoRecord>, ApiError> {
    serde_json::from_str(body).map_err(|error| ApiError::MalformedResponse {
        url: url.to_string(),
        detail: error.to_string(),
    })
}

fn freshness_token(headers: &ureq::http::HeaderMap) -> Option<String> {
    headers
        .get(FRESHNESS_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Whether a refresh needs a full fetch. An unknown token on either
/// side always fetches; skipping is only allowed on an exact match, so
/// a changed token can never be missed.
pub fn freshness_changed(previous: Option<&str>, current: Option<&str>) -> bool {
    match (previous, current) {
        (Some(previous), Some(current)) => previous != current,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::JoinHandle;

    /// One-shot HTTP stub: accepts a single connection, returns the
    /// canned response, hands the raw request back for assertions.
    fn spawn_stub(status_line: &str, headers: &[(&str, &str)], body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub");
        let addr = listener.local_addr().expect("stub addr");

        let mut response = format!("HTTP/1.1 {status_line}\r\n");
        for (name, value) in headers {
            response.push_str(&format!("{name}: {value}\r\n"));
        }
        response.push_str(&format!(
            "Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        ));

        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut buffer = [0u8; 8192];
            let read = stream.read(&mut buffer).unwrap_or(0);
            let request = String::from_utf8_lossy(&buffer[..read]).to_string();
            stream.write_all(response.as_bytes()).expect("write response");
            request
        });

        (format!("http://{addr}/api"), handle)
    }

    #[test]
    fn status_gate_accepts_the_whole_success_range() {
        for status in [200, 204, 302, 399] {
            assert!(is_success_status(status), "{status}");
        }
        for status in [400, 404, 500] {
            assert!(!is_success_status(status), "{status}");
        }
    }

    #[test]
    fn freshness_changed_only_skips_on_exact_match() {
        assert!(!freshness_changed(Some("\"v1\""), Some("\"v1\"")));
        assert!(freshness_changed(Some("\"v1\""), Some("\"v2\"")));
        assert!(freshness_changed(None, Some("\"v1\"")));
        assert!(freshness_changed(Some("\"v1\""), None));
        assert!(freshness_changed(None, None));
    }

    #[test]
    fn list_todos_decodes_records_and_captures_the_token() {
        let body = r#"[{"id":1,"title":"file taxes","day":null,"month":"04","year":"2019","completed":false,"description":""}]"#;
        let (base_url, stub) = spawn_stub(
            "200 OK",
            &[("Content-Type", "application/json"), ("ETag", "\"v7\"")],
            body,
        );

        let client = ApiClient::new(base_url);
        let listing = client.list_todos().expect("listing");
        assert_eq!(listing.records.len(), 1);
        assert_eq!(listing.records[0].title, "file taxes");
        assert_eq!(listing.freshness.as_deref(), Some("\"v7\""));

        let request = stub.join().expect("stub thread");
        assert!(request.starts_with("GET /api/todos HTTP/1.1\r\n"), "{request}");
    }

    #[test]
    fn list_todos_rejects_a_malformed_body() {
        let (base_url, stub) = spawn_stub(
            "200 OK",
            &[("Content-Type", "application/json")],
            r#"[{"id":"not-a-number"}]"#,
        );

        let client = ApiClient::new(base_url);
        let error = client.list_todos().expect_err("malformed");
        assert!(matches!(error, ApiError::MalformedResponse { .. }), "{error}");
        let _ = stub.join();
    }

    #[test]
    fn delete_surfaces_a_non_success_status() {
        let (base_url, stub) = spawn_stub("500 Internal Server Error", &[], "");

        let client = ApiClient::new(base_url);
        let error = client.delete_todo(3).expect_err("status error");
        assert!(
            matches!(error, ApiError::Status { status: 500, .. }),
            "{error}"
        );

        let request = stub.join().expect("stub thread");
        assert!(request.starts_with("DELETE /api/todos/3 HTTP/1.1\r\n"), "{request}");
    }

    #[test]
    fn fetch_freshness_uses_head_and_reads_the_header() {
        let (base_url, stub) = spawn_stub("200 OK", &[("ETag", "\"v3\"")], "");

        let client = ApiClient::new(base_url);
        let token = client.fetch_freshness().expect("freshness");
        assert_eq!(token.as_deref(), Some("\"v3\""));

        let request = stub.join().expect("stub thread");
        assert!(request.starts_with("HEAD /api/todos HTTP/1.1\r\n"), "{request}");
    }

    #[test]
    fn fetch_freshness_without_a_token_is_none() {
        let (base_url, stub) = spawn_stub("200 OK", &[], "");

        let client = ApiClient::new(base_url);
        assert_eq!(client.fetch_freshness().expect("freshness"), None);
        let _ = stub.join();
    }
}
