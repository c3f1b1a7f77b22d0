use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, CommonProperties, MasterConfig, MasterState, Role, ShadowConfig, ShadowState};
use tower::ServiceExt;

const CONNECTOR: &str = "/api/v1/configuration/connector";
const HA_ROLE: &str = "/api/v1/configuration/connector/haRole";
const MASTER_CONFIG: &str = "/api/v1/configuration/connector/ha/master/config";
const MASTER_STATE: &str = "/api/v1/configuration/connector/ha/master/state";
const SHADOW_CONFIG: &str = "/api/v1/configuration/connector/ha/shadow/config";
const SHADOW_STATE: &str = "/api/v1/configuration/connector/ha/shadow/state";
const BACKUP: &str = "/api/v1/configuration/backup";

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

// --- common properties ---

#[tokio::test]
async fn properties_report_role_and_description() {
    let resp = app(Role::Master)
        .oneshot(empty_request("GET", CONNECTOR))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let props: CommonProperties = body_json(resp).await;
    assert_eq!(props.ha.role, "master");
    assert!(props.description.is_empty());
}

#[tokio::test]
async fn set_description_echoes_properties() {
    let resp = app(Role::Master)
        .oneshot(json_request("PUT", CONNECTOR, r#"{"description":"dc-1"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let props: CommonProperties = body_json(resp).await;
    assert_eq!(props.description, "dc-1");
}

#[tokio::test]
async fn version_is_reported() {
    let resp = app(Role::Master)
        .oneshot(empty_request("GET", "/api/v1/connector/version"))
        .await
        .unwrap();

    let json: serde_json::Value = body_json(resp).await;
    assert_eq!(json["version"], mock_server::VERSION);
}

// --- HA role ---

#[tokio::test]
async fn ha_role_is_plain_text() {
    let resp = app(Role::Shadow)
        .oneshot(empty_request("GET", HA_ROLE))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(&body_bytes(resp).await[..], b"shadow");
}

#[tokio::test]
async fn set_ha_role_accepts_bare_string() {
    let app = app(Role::Master);
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(HA_ROLE)
                .header(http::header::CONTENT_TYPE, "text/plain")
                .body("shadow".to_string())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = app.oneshot(empty_request("GET", HA_ROLE)).await.unwrap();
    assert_eq!(&body_bytes(resp).await[..], b"shadow");
}

#[tokio::test]
async fn set_ha_role_rejects_json_wrapped_role() {
    let resp = app(Role::Master)
        .oneshot(json_request("POST", HA_ROLE, r#""master""#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- master ---

#[tokio::test]
async fn master_config_round_trips() {
    let app = app(Role::Master);
    let resp = app
        .clone()
        .oneshot(json_request(
            "PUT",
            MASTER_CONFIG,
            r#"{"haEnabled":true,"allowedShadowHost":"shadow.local"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app.oneshot(empty_request("GET", MASTER_CONFIG)).await.unwrap();
    let config: MasterConfig = body_json(resp).await;
    assert!(config.ha_enabled);
    assert_eq!(config.allowed_shadow_host, "shadow.local");
}

#[tokio::test]
async fn switch_without_shadow_conflicts() {
    let resp = app(Role::Master)
        .oneshot(json_request("POST", MASTER_STATE, r#"{"op":"SWITCH"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn force_switch_demotes_master() {
    let app = app(Role::Master);
    let resp = app
        .clone()
        .oneshot(json_request("POST", MASTER_STATE, r#"{"op":"FORCE_SWITCH"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let state: MasterState = body_json(resp).await;
    assert_eq!(state.state, "ALONE");

    let resp = app.oneshot(empty_request("GET", HA_ROLE)).await.unwrap();
    assert_eq!(&body_bytes(resp).await[..], b"shadow");
}

#[tokio::test]
async fn unknown_master_op_is_rejected() {
    let resp = app(Role::Master)
        .oneshot(json_request("POST", MASTER_STATE, r#"{"op":"PROMOTE"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reset_master_returns_204() {
    let resp = app(Role::Master)
        .oneshot(empty_request("DELETE", MASTER_STATE))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn master_endpoints_forbidden_on_shadow() {
    let resp = app(Role::Shadow)
        .oneshot(empty_request("GET", MASTER_CONFIG))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

// --- shadow ---

#[tokio::test]
async fn shadow_endpoints_forbidden_on_master() {
    let resp = app(Role::Master)
        .oneshot(empty_request("GET", SHADOW_CONFIG))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let json: serde_json::Value = body_json(resp).await;
    assert_eq!(json["type"], "FORBIDDEN_REQUEST");
}

#[tokio::test]
async fn shadow_connect_lifecycle() {
    let app = app(Role::Shadow);

    let resp = app
        .clone()
        .oneshot(json_request(
            "PUT",
            SHADOW_CONFIG,
            r#"{"masterHost":"master.local","masterPort":"8443"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let config: ShadowConfig = body_json(resp).await;
    assert_eq!(config.master_host, "master.local");
    assert!(config.links.is_some());

    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            SHADOW_STATE,
            r#"{"op":"CONNECT","user":"Administrator","password":"manage"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = app
        .clone()
        .oneshot(empty_request("GET", SHADOW_STATE))
        .await
        .unwrap();
    let state: ShadowState = body_json(resp).await;
    assert_eq!(state.state, "CONNECTED");

    let resp = app
        .clone()
        .oneshot(json_request("POST", SHADOW_STATE, r#"{"op":"DISCONNECT"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = app.oneshot(empty_request("GET", SHADOW_STATE)).await.unwrap();
    let state: ShadowState = body_json(resp).await;
    assert_eq!(state.state, "DETACHED");
}

#[tokio::test]
async fn connect_without_master_host_is_rejected() {
    let resp = app(Role::Shadow)
        .oneshot(json_request(
            "POST",
            SHADOW_STATE,
            r#"{"op":"CONNECT","user":"u","password":"p"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn connect_without_password_is_rejected() {
    let app = app(Role::Shadow);
    let resp = app
        .clone()
        .oneshot(json_request(
            "PUT",
            SHADOW_CONFIG,
            r#"{"masterHost":"master.local","masterPort":"8443"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .oneshot(json_request(
            "POST",
            SHADOW_STATE,
            r#"{"op":"CONNECT","user":"Administrator","password":""}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reset_shadow_restores_defaults() {
    let app = app(Role::Shadow);
    app.clone()
        .oneshot(json_request("PUT", SHADOW_CONFIG, r#"{"masterHost":"m"}"#))
        .await
        .unwrap();

    let resp = app
        .clone()
        .oneshot(empty_request("DELETE", SHADOW_STATE))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = app.oneshot(empty_request("GET", SHADOW_CONFIG)).await.unwrap();
    let config: ShadowConfig = body_json(resp).await;
    assert!(config.master_host.is_empty());
}

// --- backup ---

#[tokio::test]
async fn backup_round_trip_restores_description() {
    let app = app(Role::Master);
    app.clone()
        .oneshot(json_request("PUT", CONNECTOR, r#"{"description":"before"}"#))
        .await
        .unwrap();

    let resp = app
        .clone()
        .oneshot(json_request("POST", BACKUP, r#"{"password":"secret"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(http::header::CONTENT_TYPE).unwrap(),
        "application/zip"
    );
    let archive = body_bytes(resp).await;

    app.clone()
        .oneshot(json_request("PUT", CONNECTOR, r#"{"description":"after"}"#))
        .await
        .unwrap();

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(BACKUP)
                .header(http::header::CONTENT_TYPE, "application/zip")
                .body(axum::body::Body::from(archive))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = app.oneshot(empty_request("GET", CONNECTOR)).await.unwrap();
    let props: CommonProperties = body_json(resp).await;
    assert_eq!(props.description, "before");
}

#[tokio::test]
async fn backup_requires_password() {
    let resp = app(Role::Master)
        .oneshot(json_request("POST", BACKUP, r#"{"password":""}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn restore_rejects_wrong_content_type() {
    let resp = app(Role::Master)
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(BACKUP)
                .header(http::header::CONTENT_TYPE, "application/octet-stream")
                .body("whatever".to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn restore_rejects_foreign_archive() {
    let resp = app(Role::Master)
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(BACKUP)
                .header(http::header::CONTENT_TYPE, "application/zip")
                .body("PK\u{3}\u{4}".to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn restore_replaces_instance_state() {
    let db: mock_server::Db = std::sync::Arc::new(tokio::sync::RwLock::new(
        mock_server::Instance::new(Role::Master),
    ));
    let app = mock_server::app_with_state(db.clone());

    app.clone()
        .oneshot(json_request(
            "PUT",
            MASTER_CONFIG,
            r#"{"haEnabled":true,"allowedShadowHost":"s"}"#,
        ))
        .await
        .unwrap();
    let resp = app
        .clone()
        .oneshot(json_request("POST", BACKUP, r#"{"password":"p"}"#))
        .await
        .unwrap();
    let archive = body_bytes(resp).await;

    db.write().await.master_config = MasterConfig::default();

    let resp = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(BACKUP)
                .header(http::header::CONTENT_TYPE, "application/zip")
                .body(axum::body::Body::from(archive))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let instance = db.read().await;
    assert!(instance.master_config.ha_enabled);
    assert_eq!(instance.master_config.allowed_shadow_host, "s");
}
