//! Native `HttpClient` implementation over ureq.

use std::io::{self, Read, Write};
use std::time::Instant;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::debug;
use url::Url;

use crate::client::HttpClient;
use crate::config::{parse_base_url, ConnectorConfig};
use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Sink, Target};

/// Blocking transport that routes `Target::Shadow` to the configured shadow URL.
///
/// Status codes are never turned into errors here; the facades interpret them.
#[derive(Debug, Clone)]
pub struct UreqClient {
    agent: ureq::Agent,
    base_url: Url,
    shadow_url: Option<Url>,
    authorization: Option<String>,
}

impl UreqClient {
    pub fn new(config: ConnectorConfig) -> Result<Self> {
        let base_url = parse_base_url("base_url", &config.base_url)?;
        let shadow_url = config
            .shadow_url
            .as_deref()
            .map(|raw| parse_base_url("shadow_url", raw))
            .transpose()?;

        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_connect(Some(config.connect_timeout))
            .timeout_global(Some(config.request_timeout))
            .tls_config(
                ureq::tls::TlsConfig::builder()
                    .disable_verification(config.skip_cert_verification)
                    .build(),
            )
            .build()
            .new_agent();

        let authorization = config.username.as_ref().map(|user| {
            let password = config.password.as_deref().unwrap_or("");
            format!("Basic {}", STANDARD.encode(format!("{user}:{password}")))
        });

        Ok(Self {
            agent,
            base_url,
            shadow_url,
            authorization,
        })
    }

    fn send(&self, request: HttpRequest) -> std::result::Result<ureq::http::Response<ureq::Body>, ureq::Error> {
        let HttpRequest {
            method,
            url,
            mut headers,
            body,
            ..
        } = request;
        headers.push(("accept".to_string(), "application/json".to_string()));
        if let Some(auth) = &self.authorization {
            headers.push(("authorization".to_string(), auth.clone()));
        }

        match (method, body) {
            (HttpMethod::Get, _) => with_headers(self.agent.get(&url), &headers).call(),
            (HttpMethod::Delete, _) => with_headers(self.agent.delete(&url), &headers).call(),
            (HttpMethod::Post, Some(body)) => with_headers(self.agent.post(&url), &headers).send(&body[..]),
            (HttpMethod::Post, None) => with_headers(self.agent.post(&url), &headers).send_empty(),
            (HttpMethod::Put, Some(body)) => with_headers(self.agent.put(&url), &headers).send(&body[..]),
            (HttpMethod::Put, None) => with_headers(self.agent.put(&url), &headers).send_empty(),
        }
    }
}

impl HttpClient for UreqClient {
    fn resolve_url(&self, target: Target, path: &str) -> Result<String> {
        let base = match target {
            Target::Default => &self.base_url,
            Target::Shadow => self.shadow_url.as_ref().ok_or_else(|| {
                ApiError::Request("no shadow instance URL configured".to_string())
            })?,
        };
        base.join(path.trim_start_matches('/'))
            .map(String::from)
            .map_err(|e| ApiError::Request(format!("invalid path '{path}': {e}")))
    }

    fn execute(&self, request: HttpRequest, sink: Sink<'_>) -> Result<HttpResponse> {
        let method = request.method;
        let url = request.url.clone();
        let started = Instant::now();

        let mut response = self
            .send(request)
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();

        let success = (200..300).contains(&status);
        let mut reader = response.body_mut().as_reader();
        let body = match sink {
            Sink::Writer(writer) if success => {
                copy_body(&mut reader, writer)?;
                Vec::new()
            }
            Sink::Discard if success => {
                copy_body(&mut reader, &mut io::sink())?;
                Vec::new()
            }
            Sink::Buffer | Sink::Writer(_) | Sink::Discard => {
                let mut buf = Vec::new();
                reader.read_to_end(&mut buf).map_err(body_read_error)?;
                buf
            }
        };

        debug!(
            method = method.as_str(),
            url = %url,
            status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request completed"
        );

        Ok(HttpResponse { status, headers, body })
    }
}

/// Copy the response body into `writer`. Read failures come from the
/// connection and are transport errors; write failures stay `Io`.
fn copy_body(reader: &mut dyn Read, writer: &mut dyn Write) -> Result<u64> {
    let mut buf = [0u8; 8192];
    let mut total = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(body_read_error(e)),
        };
        writer.write_all(&buf[..n])?;
        total += n as u64;
    }
}

fn body_read_error(err: io::Error) -> ApiError {
    ApiError::Transport(format!("reading response body: {err}"))
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}
