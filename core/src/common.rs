//! Common connector properties and version.

use tracing::instrument;

use crate::client::{decode, HttpClient};
use crate::error::Result;
use crate::http::{HttpMethod, RequestBody, Sink, Target};
use crate::types::{CommonProperties, DescriptionRequest, Version};

const CONNECTOR_PATH: &str = "api/v1/configuration/connector";
const VERSION_PATH: &str = "api/v1/connector/version";

pub struct CommonService<'a, C: HttpClient + ?Sized> {
    client: &'a C,
}

impl<'a, C: HttpClient + ?Sized> CommonService<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    #[instrument(skip(self))]
    pub fn get_common_properties(&self) -> Result<CommonProperties> {
        let request = self
            .client
            .new_request(Target::Default, HttpMethod::Get, CONNECTOR_PATH, RequestBody::Empty)?;
        decode(self.client.execute(request, Sink::Buffer)?)
    }

    /// Set the connector description; returns the properties the server echoes.
    #[instrument(skip(self))]
    pub fn set_description(&self, description: &str) -> Result<CommonProperties> {
        let body = RequestBody::json(&DescriptionRequest { description })?;
        let request = self
            .client
            .new_request(Target::Default, HttpMethod::Put, CONNECTOR_PATH, body)?;
        decode(self.client.execute(request, Sink::Buffer)?)
    }

    #[instrument(skip(self))]
    pub fn get_version(&self) -> Result<Version> {
        let request = self
            .client
            .new_request(Target::Default, HttpMethod::Get, VERSION_PATH, RequestBody::Empty)?;
        decode(self.client.execute(request, Sink::Buffer)?)
    }
}
