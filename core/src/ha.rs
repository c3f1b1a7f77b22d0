//! High-availability role, master and shadow management.
//!
//! # Design
//! Master endpoints are built against `Target::Default`. Shadow endpoints are
//! only accepted by a shadow instance (a master answers 403), so they are
//! always built against `Target::Shadow`; a 403 surfaces as an ordinary
//! `ApiError::Http`.
//!
//! Operations the server answers with `204 No Content` (resets and shadow
//! state changes) require exactly 204.

use tracing::{info, instrument};

use crate::client::{check_success, decode, expect_no_content, HttpClient};
use crate::error::Result;
use crate::http::{HttpMethod, HttpResponse, RequestBody, Sink, Target};
use crate::types::{
    HaRole, MasterConfiguration, MasterOperation, MasterState, MasterStateRequest,
    ShadowConfiguration, ShadowOperation, ShadowState, ShadowStateRequest,
};

const HA_ROLE_PATH: &str = "api/v1/configuration/connector/haRole";
const MASTER_CONFIG_PATH: &str = "api/v1/configuration/connector/ha/master/config";
const MASTER_STATE_PATH: &str = "api/v1/configuration/connector/ha/master/state";
const SHADOW_CONFIG_PATH: &str = "api/v1/configuration/connector/ha/shadow/config";
const SHADOW_STATE_PATH: &str = "api/v1/configuration/connector/ha/shadow/state";

pub struct HaService<'a, C: HttpClient + ?Sized> {
    client: &'a C,
}

impl<'a, C: HttpClient + ?Sized> HaService<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Current HA role, returned exactly as the server sends it.
    #[instrument(skip(self))]
    pub fn get_ha_settings(&self) -> Result<String> {
        let request = self
            .client
            .new_request(Target::Default, HttpMethod::Get, HA_ROLE_PATH, RequestBody::Empty)?;
        let response = check_success(self.client.execute(request, Sink::Buffer)?)?;
        Ok(response.text())
    }

    /// Set the role of a fresh installation. Since connector 2.12.0 this also
    /// switches roles when a shadow is connected to the master.
    #[instrument(skip(self))]
    pub fn set_ha_settings(&self, role: HaRole) -> Result<HttpResponse> {
        let request = self.client.new_request(
            Target::Default,
            HttpMethod::Post,
            HA_ROLE_PATH,
            RequestBody::text(role.as_str()),
        )?;
        check_success(self.client.execute(request, Sink::Discard)?)
    }

    #[instrument(skip(self))]
    pub fn get_master_configuration(&self) -> Result<MasterConfiguration> {
        let request = self.client.new_request(
            Target::Default,
            HttpMethod::Get,
            MASTER_CONFIG_PATH,
            RequestBody::Empty,
        )?;
        decode(self.client.execute(request, Sink::Buffer)?)
    }

    /// `allowed_shadow_host` empty means any host may connect as shadow.
    #[instrument(skip(self))]
    pub fn set_master_configuration(
        &self,
        ha_enabled: bool,
        allowed_shadow_host: &str,
    ) -> Result<MasterConfiguration> {
        let body = RequestBody::json(&MasterConfiguration {
            ha_enabled,
            allowed_shadow_host: allowed_shadow_host.to_string(),
        })?;
        let request = self
            .client
            .new_request(Target::Default, HttpMethod::Put, MASTER_CONFIG_PATH, body)?;
        decode(self.client.execute(request, Sink::Buffer)?)
    }

    #[instrument(skip(self))]
    pub fn get_master_state(&self) -> Result<MasterState> {
        let request = self.client.new_request(
            Target::Default,
            HttpMethod::Get,
            MASTER_STATE_PATH,
            RequestBody::Empty,
        )?;
        decode(self.client.execute(request, Sink::Buffer)?)
    }

    /// Switch roles with the shadow; returns the master's updated state.
    #[instrument(skip(self))]
    pub fn set_master_state(&self, op: MasterOperation) -> Result<MasterState> {
        let body = RequestBody::json(&MasterStateRequest { op })?;
        let request = self
            .client
            .new_request(Target::Default, HttpMethod::Post, MASTER_STATE_PATH, body)?;
        let state: MasterState = decode(self.client.execute(request, Sink::Buffer)?)?;
        info!(state = %state.state, "master state changed");
        Ok(state)
    }

    /// Restore defaults for all master-side HA settings.
    /// Not to be called while a shadow is connected.
    #[instrument(skip(self))]
    pub fn reset_master(&self) -> Result<HttpResponse> {
        let request = self.client.new_request(
            Target::Default,
            HttpMethod::Delete,
            MASTER_STATE_PATH,
            RequestBody::Empty,
        )?;
        expect_no_content("master reset", self.client.execute(request, Sink::Discard)?)
    }

    #[instrument(skip(self))]
    pub fn get_shadow_configuration(&self) -> Result<ShadowConfiguration> {
        let request = self.client.new_request(
            Target::Shadow,
            HttpMethod::Get,
            SHADOW_CONFIG_PATH,
            RequestBody::Empty,
        )?;
        decode(self.client.execute(request, Sink::Buffer)?)
    }

    /// Update the shadow configuration. Links in `config` are not sent.
    #[instrument(skip(self, config), fields(master_host = %config.master_host))]
    pub fn set_shadow_configuration(&self, config: &ShadowConfiguration) -> Result<ShadowConfiguration> {
        let body = RequestBody::json(&ShadowConfiguration {
            links: None,
            ..config.clone()
        })?;
        let request = self
            .client
            .new_request(Target::Shadow, HttpMethod::Put, SHADOW_CONFIG_PATH, body)?;
        decode(self.client.execute(request, Sink::Buffer)?)
    }

    #[instrument(skip(self))]
    pub fn get_shadow_state(&self) -> Result<ShadowState> {
        let request = self.client.new_request(
            Target::Shadow,
            HttpMethod::Get,
            SHADOW_STATE_PATH,
            RequestBody::Empty,
        )?;
        decode(self.client.execute(request, Sink::Buffer)?)
    }

    /// Connect the shadow to, or disconnect it from, its master.
    /// `user` and `password` log on to the master instance.
    #[instrument(skip(self, password))]
    pub fn change_shadow_state(
        &self,
        op: ShadowOperation,
        user: &str,
        password: &str,
    ) -> Result<HttpResponse> {
        let body = RequestBody::json(&ShadowStateRequest { op, user, password })?;
        let request = self
            .client
            .new_request(Target::Shadow, HttpMethod::Post, SHADOW_STATE_PATH, body)?;
        let response =
            expect_no_content("shadow state change", self.client.execute(request, Sink::Discard)?)?;
        info!(?op, "shadow state changed");
        Ok(response)
    }

    /// Delete master host and port and restore defaults for the shadow's
    /// connection settings. Available since connector 2.13.0.
    #[instrument(skip(self))]
    pub fn reset_shadow(&self) -> Result<HttpResponse> {
        let request = self.client.new_request(
            Target::Shadow,
            HttpMethod::Delete,
            SHADOW_STATE_PATH,
            RequestBody::Empty,
        )?;
        expect_no_content("shadow reset", self.client.execute(request, Sink::Discard)?)
    }
}
