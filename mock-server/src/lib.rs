use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

pub const VERSION: &str = "2.17.1";
const ARCHIVE_FORMAT: &str = "scc-mock-backup/1";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Master,
    Shadow,
}

impl Role {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "master" => Some(Role::Master),
            "shadow" => Some(Role::Shadow),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Role::Master => "master",
            Role::Shadow => "shadow",
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HaSection {
    pub role: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommonProperties {
    pub ha: HaSection,
    pub description: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterConfig {
    pub ha_enabled: bool,
    pub allowed_shadow_host: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterState {
    pub state: String,
    pub shadow_host: String,
}

impl Default for MasterState {
    fn default() -> Self {
        Self {
            state: "ALONE".to_string(),
            shadow_host: String::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Href {
    pub href: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ShadowLinks {
    #[serde(rename = "self")]
    pub self_link: Href,
    pub state: Href,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadowConfig {
    #[serde(default)]
    pub master_host: String,
    #[serde(default)]
    pub master_port: String,
    #[serde(default)]
    pub check_interval_in_seconds: u32,
    #[serde(default)]
    pub takeover_delay_in_seconds: u32,
    #[serde(default)]
    pub own_host: String,
    #[serde(default)]
    pub connect_timeout_in_millis: u32,
    #[serde(default)]
    pub request_timeout_in_millis: u32,
    #[serde(rename = "_links", default, skip_serializing_if = "Option::is_none")]
    pub links: Option<ShadowLinks>,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            master_host: String::new(),
            master_port: String::new(),
            check_interval_in_seconds: 30,
            takeover_delay_in_seconds: 30,
            own_host: String::new(),
            connect_timeout_in_millis: 20_000,
            request_timeout_in_millis: 60_000,
            links: Some(shadow_links()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadowState {
    pub state: String,
    pub own_hosts: String,
    pub state_message: String,
    pub master_versions: String,
}

impl Default for ShadowState {
    fn default() -> Self {
        Self {
            state: "DETACHED".to_string(),
            own_hosts: "localhost".to_string(),
            state_message: String::new(),
            master_versions: String::new(),
        }
    }
}

#[derive(Deserialize)]
pub struct DescriptionInput {
    pub description: String,
}

#[derive(Deserialize)]
pub struct MasterOpInput {
    pub op: String,
}

#[derive(Deserialize)]
pub struct ShadowOpInput {
    pub op: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct BackupInput {
    #[serde(default)]
    pub password: String,
}

/// The configuration a backup archive carries.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub description: String,
    pub master_config: MasterConfig,
    pub shadow_config: ShadowConfig,
}

#[derive(Serialize, Deserialize)]
struct Archive {
    format: String,
    password_protected: bool,
    snapshot: Snapshot,
}

/// One emulated connector instance.
#[derive(Clone, Debug)]
pub struct Instance {
    pub role: Role,
    pub description: String,
    pub master_config: MasterConfig,
    pub master_state: MasterState,
    pub shadow_config: ShadowConfig,
    pub shadow_state: ShadowState,
}

impl Instance {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            description: String::new(),
            master_config: MasterConfig::default(),
            master_state: MasterState::default(),
            shadow_config: ShadowConfig::default(),
            shadow_state: ShadowState::default(),
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            description: self.description.clone(),
            master_config: self.master_config.clone(),
            shadow_config: self.shadow_config.clone(),
        }
    }

    fn properties(&self) -> CommonProperties {
        CommonProperties {
            ha: HaSection {
                role: self.role.as_str().to_string(),
            },
            description: self.description.clone(),
        }
    }
}

pub type Db = Arc<RwLock<Instance>>;

/// Error reply in the connector's `{type, message}` shape.
pub struct Rejection {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

impl Rejection {
    fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "ILLEGAL_ARGUMENT", message)
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "type": self.kind, "message": self.message });
        (self.status, Json(body)).into_response()
    }
}

fn require_role(instance: &Instance, role: Role) -> Result<(), Rejection> {
    if instance.role == role {
        return Ok(());
    }
    Err(Rejection::new(
        StatusCode::FORBIDDEN,
        "FORBIDDEN_REQUEST",
        format!("operation only permitted on a {} instance", role.as_str()),
    ))
}

fn shadow_links() -> ShadowLinks {
    ShadowLinks {
        self_link: Href {
            href: "/api/v1/configuration/connector/ha/shadow/config".to_string(),
        },
        state: Href {
            href: "/api/v1/configuration/connector/ha/shadow/state".to_string(),
        },
    }
}

pub fn app(role: Role) -> Router {
    app_with_state(Arc::new(RwLock::new(Instance::new(role))))
}

/// Build the router over existing state so tests can inspect it.
pub fn app_with_state(db: Db) -> Router {
    Router::new()
        .route(
            "/api/v1/configuration/backup",
            post(create_backup).put(restore_backup),
        )
        .route(
            "/api/v1/configuration/connector",
            get(get_properties).put(set_description),
        )
        .route("/api/v1/connector/version", get(get_version))
        .route(
            "/api/v1/configuration/connector/haRole",
            get(get_ha_role).post(set_ha_role),
        )
        .route(
            "/api/v1/configuration/connector/ha/master/config",
            get(get_master_config).put(set_master_config),
        )
        .route(
            "/api/v1/configuration/connector/ha/master/state",
            get(get_master_state)
                .post(change_master_state)
                .delete(reset_master),
        )
        .route(
            "/api/v1/configuration/connector/ha/shadow/config",
            get(get_shadow_config).put(set_shadow_config),
        )
        .route(
            "/api/v1/configuration/connector/ha/shadow/state",
            get(get_shadow_state)
                .post(change_shadow_state)
                .delete(reset_shadow),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener, role: Role) -> Result<(), std::io::Error> {
    axum::serve(listener, app(role)).await
}

async fn create_backup(
    State(db): State<Db>,
    Json(input): Json<BackupInput>,
) -> Result<Response, Rejection> {
    if input.password.is_empty() {
        return Err(Rejection::bad_request("a backup password is required"));
    }
    let archive = Archive {
        format: ARCHIVE_FORMAT.to_string(),
        password_protected: true,
        snapshot: db.read().await.snapshot(),
    };
    let bytes = serde_json::to_vec(&archive)
        .map_err(|e| Rejection::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", e.to_string()))?;
    info!(size = bytes.len(), "backup created");
    Ok(([(header::CONTENT_TYPE, "application/zip")], bytes).into_response())
}

async fn restore_backup(
    State(db): State<Db>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, Rejection> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if content_type != "application/zip" {
        return Err(Rejection::new(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "UNSUPPORTED_MEDIA_TYPE",
            format!("expected application/zip, got '{content_type}'"),
        ));
    }
    let archive: Archive = serde_json::from_slice(&body)
        .map_err(|_| Rejection::bad_request("not a backup archive"))?;
    if archive.format != ARCHIVE_FORMAT {
        return Err(Rejection::bad_request("unsupported backup format"));
    }

    let mut instance = db.write().await;
    instance.description = archive.snapshot.description;
    instance.master_config = archive.snapshot.master_config;
    instance.shadow_config = archive.snapshot.shadow_config;
    info!("backup restored");
    Ok(StatusCode::NO_CONTENT)
}

async fn get_properties(State(db): State<Db>) -> Json<CommonProperties> {
    Json(db.read().await.properties())
}

async fn set_description(
    State(db): State<Db>,
    Json(input): Json<DescriptionInput>,
) -> Json<CommonProperties> {
    let mut instance = db.write().await;
    instance.description = input.description;
    Json(instance.properties())
}

async fn get_version() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "version": VERSION }))
}

async fn get_ha_role(State(db): State<Db>) -> String {
    db.read().await.role.as_str().to_string()
}

async fn set_ha_role(State(db): State<Db>, body: String) -> Result<StatusCode, Rejection> {
    let role = Role::parse(&body)
        .ok_or_else(|| Rejection::bad_request(format!("invalid role '{body}'")))?;
    db.write().await.role = role;
    info!(role = role.as_str(), "HA role set");
    Ok(StatusCode::NO_CONTENT)
}

async fn get_master_config(State(db): State<Db>) -> Result<Json<MasterConfig>, Rejection> {
    let instance = db.read().await;
    require_role(&instance, Role::Master)?;
    Ok(Json(instance.master_config.clone()))
}

async fn set_master_config(
    State(db): State<Db>,
    Json(input): Json<MasterConfig>,
) -> Result<Json<MasterConfig>, Rejection> {
    let mut instance = db.write().await;
    require_role(&instance, Role::Master)?;
    instance.master_config = input;
    Ok(Json(instance.master_config.clone()))
}

async fn get_master_state(State(db): State<Db>) -> Result<Json<MasterState>, Rejection> {
    let instance = db.read().await;
    require_role(&instance, Role::Master)?;
    Ok(Json(instance.master_state.clone()))
}

async fn change_master_state(
    State(db): State<Db>,
    Json(input): Json<MasterOpInput>,
) -> Result<Json<MasterState>, Rejection> {
    let mut instance = db.write().await;
    require_role(&instance, Role::Master)?;
    match input.op.as_str() {
        "SWITCH" if instance.master_state.state != "CONNECTED" => {
            return Err(Rejection::new(
                StatusCode::CONFLICT,
                "ILLEGAL_STATE",
                "no shadow connected",
            ));
        }
        "SWITCH" | "FORCE_SWITCH" => {}
        other => return Err(Rejection::bad_request(format!("invalid op '{other}'"))),
    }
    instance.role = Role::Shadow;
    instance.master_state = MasterState::default();
    info!(op = %input.op, "master gave up its role");
    Ok(Json(instance.master_state.clone()))
}

async fn reset_master(State(db): State<Db>) -> Result<StatusCode, Rejection> {
    let mut instance = db.write().await;
    require_role(&instance, Role::Master)?;
    instance.master_config = MasterConfig::default();
    instance.master_state = MasterState::default();
    Ok(StatusCode::NO_CONTENT)
}

async fn get_shadow_config(State(db): State<Db>) -> Result<Json<ShadowConfig>, Rejection> {
    let instance = db.read().await;
    require_role(&instance, Role::Shadow)?;
    Ok(Json(instance.shadow_config.clone()))
}

async fn set_shadow_config(
    State(db): State<Db>,
    Json(input): Json<ShadowConfig>,
) -> Result<Json<ShadowConfig>, Rejection> {
    let mut instance = db.write().await;
    require_role(&instance, Role::Shadow)?;
    instance.shadow_config = ShadowConfig {
        links: Some(shadow_links()),
        ..input
    };
    Ok(Json(instance.shadow_config.clone()))
}

async fn get_shadow_state(State(db): State<Db>) -> Result<Json<ShadowState>, Rejection> {
    let instance = db.read().await;
    require_role(&instance, Role::Shadow)?;
    Ok(Json(instance.shadow_state.clone()))
}

async fn change_shadow_state(
    State(db): State<Db>,
    Json(input): Json<ShadowOpInput>,
) -> Result<StatusCode, Rejection> {
    let mut instance = db.write().await;
    require_role(&instance, Role::Shadow)?;
    match input.op.as_str() {
        "CONNECT" => {
            if input.user.is_empty() || input.password.is_empty() {
                return Err(Rejection::bad_request("user and password are required"));
            }
            if instance.shadow_config.master_host.is_empty() {
                return Err(Rejection::bad_request("no master host configured"));
            }
            let master = format!(
                "{}:{}",
                instance.shadow_config.master_host, instance.shadow_config.master_port
            );
            instance.shadow_state.state = "CONNECTED".to_string();
            instance.shadow_state.state_message = format!("connected to {master}");
            instance.shadow_state.master_versions = VERSION.to_string();
        }
        "DISCONNECT" => {
            instance.shadow_state.state = "DETACHED".to_string();
            instance.shadow_state.state_message = String::new();
            instance.shadow_state.master_versions = String::new();
        }
        other => return Err(Rejection::bad_request(format!("invalid op '{other}'"))),
    }
    info!(op = %input.op, "shadow state changed");
    Ok(StatusCode::NO_CONTENT)
}

async fn reset_shadow(State(db): State<Db>) -> Result<StatusCode, Rejection> {
    let mut instance = db.write().await;
    require_role(&instance, Role::Shadow)?;
    instance.shadow_config = ShadowConfig::default();
    instance.shadow_state = ShadowState::default();
    Ok(StatusCode::NO_CONTENT)
}
