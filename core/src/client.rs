//! The collaborator contract every facade depends on, plus shared status handling.
//!
//! # Design
//! `HttpClient` is the only seam to the network. Implementors resolve a path
//! against a target instance and execute requests; request construction for
//! JSON/text and upload bodies is provided on top of `resolve_url`, so a
//! test stub only has to implement two methods. Facades interpret statuses
//! themselves, which keeps every implementation's behavior identical.

use std::io::Read;

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::backup::BackupService;
use crate::common::CommonService;
use crate::config::ConnectorConfig;
use crate::error::{ApiError, Result};
use crate::ha::HaService;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, RequestBody, Sink, Target};
use crate::transport::UreqClient;

/// Builds and executes requests against a Cloud Connector.
pub trait HttpClient {
    /// Resolve `path` (relative, e.g. `api/v1/connector/version`) against the
    /// instance `target` designates.
    fn resolve_url(&self, target: Target, path: &str) -> Result<String>;

    /// Execute `request`, placing the response body according to `sink`.
    ///
    /// Any status is a successful execution; only transport failures are errors.
    fn execute(&self, request: HttpRequest, sink: Sink<'_>) -> Result<HttpResponse>;

    /// Build a request with a JSON, text or empty body.
    fn new_request(
        &self,
        target: Target,
        method: HttpMethod,
        path: &str,
        body: RequestBody,
    ) -> Result<HttpRequest> {
        let url = self.resolve_url(target, path)?;
        Ok(HttpRequest::new(method, target, url, body))
    }

    /// Build a raw upload request from exactly `size` bytes of `content`.
    fn new_upload_request(
        &self,
        method: HttpMethod,
        path: &str,
        content: &mut dyn Read,
        size: u64,
        content_type: &str,
    ) -> Result<HttpRequest> {
        let url = self.resolve_url(Target::Default, path)?;
        let mut body = Vec::with_capacity(usize::try_from(size).unwrap_or(0));
        content.take(size).read_to_end(&mut body)?;
        if body.len() as u64 != size {
            return Err(ApiError::Request(format!(
                "upload source ended after {} of {size} bytes",
                body.len()
            )));
        }
        Ok(HttpRequest {
            method,
            target: Target::Default,
            url,
            headers: vec![("content-type".to_string(), content_type.to_string())],
            body: Some(body),
        })
    }
}

/// Owns an `HttpClient` and hands out the facades that borrow it.
#[derive(Debug, Clone)]
pub struct Connector<C: HttpClient> {
    client: C,
}

impl Connector<UreqClient> {
    /// Connect with the native ureq transport.
    pub fn from_config(config: ConnectorConfig) -> Result<Self> {
        Ok(Self::new(UreqClient::new(config)?))
    }
}

impl<C: HttpClient> Connector<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn backup(&self) -> BackupService<'_, C> {
        BackupService::new(&self.client)
    }

    pub fn common(&self) -> CommonService<'_, C> {
        CommonService::new(&self.client)
    }

    pub fn ha(&self) -> HaService<'_, C> {
        HaService::new(&self.client)
    }
}

/// Map non-2xx responses to `ApiError::Http`.
pub(crate) fn check_success(response: HttpResponse) -> Result<HttpResponse> {
    if response.is_success() {
        return Ok(response);
    }
    Err(ApiError::Http {
        status: response.status,
        response: Box::new(response),
    })
}

/// Require exactly 204; anything else becomes `UnexpectedStatus`.
pub(crate) fn expect_no_content(
    operation: &'static str,
    response: HttpResponse,
) -> Result<HttpResponse> {
    if response.status == 204 {
        return Ok(response);
    }
    warn!(operation, status = response.status, "unexpected status");
    Err(ApiError::UnexpectedStatus {
        operation,
        status: response.status,
        response: Box::new(response),
    })
}

/// Check for 2xx and deserialize the JSON body.
pub(crate) fn decode<T: DeserializeOwned>(response: HttpResponse) -> Result<T> {
    let response = check_success(response)?;
    Ok(serde_json::from_slice(&response.body)?)
}
