//! Request and response DTOs for the Cloud Connector configuration API.
//!
//! # Design
//! Field names follow the remote JSON (camelCase). Response types default
//! missing fields so connectors that omit a field still decode. Operation and
//! role enums are closed sets serialized as the strings the server expects;
//! server-reported states stay plain strings because the server owns that
//! enumeration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// High-availability role of a connector instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HaRole {
    Master,
    Shadow,
}

impl HaRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            HaRole::Master => "master",
            HaRole::Shadow => "shadow",
        }
    }
}

impl fmt::Display for HaRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HaRole {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "master" => Ok(HaRole::Master),
            "shadow" => Ok(HaRole::Shadow),
            other => Err(ApiError::Deserialization(format!("unknown HA role: {other}"))),
        }
    }
}

/// Role switch requested on the master.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MasterOperation {
    /// Switch roles with the connected shadow.
    Switch,
    /// Give up the master role even if the shadow does not respond.
    ForceSwitch,
}

/// Connection lifecycle operation on a shadow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShadowOperation {
    Connect,
    Disconnect,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HaProperties {
    pub role: String,
}

/// Connector-wide metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommonProperties {
    pub ha: HaProperties,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Version {
    pub version: String,
}

/// Master-side HA configuration.
///
/// An empty `allowed_shadow_host` lets any host connect as shadow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MasterConfiguration {
    pub ha_enabled: bool,
    pub allowed_shadow_host: String,
}

/// State of the master: one of `ALONE`, `BINDING`, `CONNECTED` or `BROKEN`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MasterState {
    pub state: String,
    pub shadow_host: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Link {
    pub href: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowLinks {
    #[serde(rename = "self")]
    pub self_link: Link,
    pub state: Link,
}

/// Shadow-side HA configuration. Only accepted by a shadow instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShadowConfiguration {
    pub master_host: String,
    pub master_port: String,
    pub check_interval_in_seconds: u32,
    pub takeover_delay_in_seconds: u32,
    pub own_host: String,
    pub connect_timeout_in_millis: u32,
    pub request_timeout_in_millis: u32,
    #[serde(rename = "_links", skip_serializing_if = "Option::is_none")]
    pub links: Option<ShadowLinks>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShadowState {
    pub state: String,
    pub own_hosts: String,
    pub state_message: String,
    pub master_versions: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct BackupRequest<'a> {
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct DescriptionRequest<'a> {
    pub description: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct MasterStateRequest {
    pub op: MasterOperation,
}

#[derive(Debug, Serialize)]
pub(crate) struct ShadowStateRequest<'a> {
    pub op: ShadowOperation,
    pub user: &'a str,
    pub password: &'a str,
}
