//! HTTP transport types shared by the facades and the `HttpClient` implementations.
//!
//! # Design
//! Requests and responses are plain data. Facades never touch the network:
//! they ask an `HttpClient` to build an `HttpRequest`, hand it back for
//! execution, and interpret the returned `HttpResponse`. This keeps every
//! facade testable against a recording stub.
//!
//! Bodies are raw bytes because two endpoints are not JSON (the HA role is
//! plain text and backups are archives).

use std::io::Write;

use serde::Serialize;

use crate::error::ApiError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// Which connector instance a request is routed to.
///
/// Shadow-only endpoints are always built with `Target::Shadow`; an
/// `HttpClient` decides what that means (a different base URL for
/// `UreqClient`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Default,
    Shadow,
}

/// Request payload before it is attached to an `HttpRequest`.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(String),
    Text(String),
}

impl RequestBody {
    /// Serialize `value` as a JSON body.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, ApiError> {
        serde_json::to_string(value)
            .map(RequestBody::Json)
            .map_err(|e| ApiError::Serialization(e.to_string()))
    }

    /// A plain-text body sent verbatim.
    pub fn text(value: impl Into<String>) -> Self {
        RequestBody::Text(value.into())
    }

    pub(crate) fn content_type(&self) -> Option<&'static str> {
        match self {
            RequestBody::Empty => None,
            RequestBody::Json(_) => Some("application/json"),
            RequestBody::Text(_) => Some("text/plain"),
        }
    }

    pub(crate) fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            RequestBody::Empty => None,
            RequestBody::Json(s) | RequestBody::Text(s) => Some(s.into_bytes()),
        }
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub target: Target,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Assemble a request from an already-resolved URL and a body, setting the
    /// content type the body implies.
    pub fn new(method: HttpMethod, target: Target, url: String, body: RequestBody) -> Self {
        let mut headers = Vec::new();
        if let Some(content_type) = body.content_type() {
            headers.push(("content-type".to_string(), content_type.to_string()));
        }
        Self {
            method,
            target,
            url,
            headers,
            body: body.into_bytes(),
        }
    }

    /// First header value matching `name`, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Body as UTF-8 text, if any.
    pub fn body_text(&self) -> Option<&str> {
        self.body.as_deref().and_then(|b| std::str::from_utf8(b).ok())
    }
}

/// An HTTP response described as plain data.
///
/// When the body was streamed into a caller-supplied writer, `body` is empty.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Body decoded as UTF-8, with invalid sequences replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Where `HttpClient::execute` puts the response body.
pub enum Sink<'a> {
    /// Collect the body into `HttpResponse::body`.
    Buffer,
    /// Stream a successful body into the writer. Error bodies are buffered
    /// instead so they never end up in the caller's file.
    Writer(&'a mut dyn Write),
    /// Read and drop a successful body. Error bodies are still buffered.
    Discard,
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}
