use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sha2::Sha256;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Config;
use crate::database::DatabaseManager;

const DEPLOY_TIMEOUT: Duration = Duration::from_secs(120);
const STDERR_TAIL_CHARS: usize = 400;

#[derive(Clone)]
struct AppState {
    db: Arc<DatabaseManager>,
    config: Arc<Config>,
    started_at: Instant,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
    database: String,
    uptime_seconds: u64,
}

#[derive(Debug, Deserialize)]
struct PushEvent {
    #[serde(rename = "ref")]
    git_ref: String,
}

#[derive(Debug, Deserialize)]
struct TriggerParams {
    #[serde(default)]
    secret: Option<String>,
}

/// Small HTTP sidecar next to the bot: a health endpoint for monitoring and
/// a GitHub push webhook that redeploys the service.
pub struct HttpService {
    router: Router,
}

impl HttpService {
    pub fn new(db: Arc<DatabaseManager>, config: Arc<Config>) -> Self {
        let state = AppState {
            db,
            config,
            started_at: Instant::now(),
        };

        let router = Router::new()
            .route("/health", get(health_check))
            .route("/deploy", post(deploy_webhook))
            .route("/deploy/trigger", get(deploy_trigger))
            .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
            .with_state(state);

        HttpService { router }
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, StatusCode> {
    let database = match sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(state.db.pool())
        .await
    {
        Ok(_) => "connected",
        Err(_) => "error",
    };

    if database != "connected" {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    }))
}

/// GitHub push webhook. Pushes to main run the configured deploy command;
/// everything else is acknowledged and dropped.
async fn deploy_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    if let Some(secret) = state.config.deploy_webhook_secret.as_deref() {
        let signature = headers
            .get("x-hub-signature-256")
            .and_then(|v| v.to_str().ok());
        if !verify_signature(secret, &body, signature) {
            warn!("Deploy webhook rejected: bad or missing signature");
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "invalid signature"})),
            );
        }
    }

    let event: PushEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(err) => {
            warn!("Deploy webhook rejected: unparseable payload: {}", err);
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "invalid payload"})),
            );
        }
    };

    if event.git_ref != "refs/heads/main" {
        info!("Ignoring push to {}", event.git_ref);
        return (
            StatusCode::OK,
            Json(json!({"status": "ignored", "ref": event.git_ref})),
        );
    }

    let Some(command) = state.config.deploy_command.as_deref() else {
        info!("Push to main received but no deploy command is configured");
        return (StatusCode::OK, Json(json!({"status": "skipped"})));
    };

    info!("Push to main received, running deploy command");
    match run_deploy(command).await {
        Ok(output) if output.status.success() => {
            info!("Deploy finished successfully");
            (StatusCode::OK, Json(json!({"status": "ok"})))
        }
        Ok(output) => {
            let detail = tail(&String::from_utf8_lossy(&output.stderr), STDERR_TAIL_CHARS);
            warn!("Deploy command exited with {}: {}", output.status, detail);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "deploy failed", "detail": detail})),
            )
        }
        Err(err) => {
            warn!("Deploy command did not run: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "deploy failed", "detail": err})),
            )
        }
    }
}

/// Manual redeploy, e.g. from a phone browser. Requires the shared secret
/// as a query parameter and runs the command in the background.
async fn deploy_trigger(
    State(state): State<AppState>,
    Query(params): Query<TriggerParams>,
) -> (StatusCode, Json<Value>) {
    let authorized = matches!(
        (
            state.config.deploy_webhook_secret.as_deref(),
            params.secret.as_deref(),
        ),
        (Some(expected), Some(given)) if expected == given
    );
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "invalid secret"})),
        );
    }

    let Some(command) = state.config.deploy_command.clone() else {
        return (StatusCode::OK, Json(json!({"status": "skipped"})));
    };

    info!("Manual deploy triggered");
    tokio::spawn(async move {
        match run_deploy(&command).await {
            Ok(output) if output.status.success() => info!("Deploy finished successfully"),
            Ok(output) => warn!(
                "Deploy command exited with {}: {}",
                output.status,
                tail(&String::from_utf8_lossy(&output.stderr), STDERR_TAIL_CHARS)
            ),
            Err(err) => warn!("Deploy command did not run: {}", err),
        }
    });

    (StatusCode::OK, Json(json!({"status": "started"})))
}

async fn run_deploy(command: &str) -> Result<std::process::Output, String> {
    let child = tokio::process::Command::new("sh")
        .arg("-c")
        .arg(command)
        .output();

    match tokio::time::timeout(DEPLOY_TIMEOUT, child).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(err)) => Err(format!("failed to spawn deploy command: {err}")),
        Err(_) => Err(format!(
            "deploy command timed out after {}s",
            DEPLOY_TIMEOUT.as_secs()
        )),
    }
}

/// Constant-time comparison of the `sha256=<hex>` GitHub signature header
/// against our own HMAC of the raw body.
fn verify_signature(secret: &str, payload: &[u8], header: Option<&str>) -> bool {
    let Some(header) = header else {
        return false;
    };
    let Some(hex_signature) = header.strip_prefix("sha256=") else {
        return false;
    };
    let Some(signature) = decode_hex(hex_signature) else {
        return false;
    };
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(payload);
    mac.verify_slice(&signature).is_ok()
}

fn decode_hex(input: &str) -> Option<Vec<u8>> {
    if input.len() % 2 != 0 || !input.is_ascii() {
        return None;
    }
    (0..input.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&input[i..i + 2], 16).ok())
        .collect()
}

fn tail(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    let count = text.chars().count();
    text.chars().skip(count.saturating_sub(max_chars)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderName, HeaderValue};
    use axum_test::TestServer;
    use tempfile::TempDir;

    fn test_config(secret: Option<&str>, command: Option<&str>) -> Config {
        Config {
            telegram_bot_token: "token".to_string(),
            database_url: "unused".to_string(),
            http_port: 3000,
            user_display_name: "amigo".to_string(),
            water_goal_ml: 4000,
            utc_offset_hours: -3,
            hub_refresh_secs: 2,
            deploy_webhook_secret: secret.map(|s| s.to_string()),
            deploy_command: command.map(|c| c.to_string()),
            classifier_api_key: None,
            classifier_model: "sonar-pro".to_string(),
            classifier_base_url: "https://api.perplexity.ai".to_string(),
        }
    }

    async fn test_server(secret: Option<&str>, command: Option<&str>) -> (TestServer, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = DatabaseManager::new(&format!("sqlite:{}", db_path.display()))
            .await
            .unwrap();
        db.run_migrations().await.unwrap();

        let service = HttpService::new(Arc::new(db), Arc::new(test_config(secret, command)));
        (TestServer::new(service.router()).unwrap(), dir)
    }

    fn sign(secret: &str, body: &[u8]) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        let hex: String = mac
            .finalize()
            .into_bytes()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect();
        format!("sha256={hex}")
    }

    fn signature_header() -> HeaderName {
        HeaderName::from_static("x-hub-signature-256")
    }

    #[tokio::test]
    async fn test_health_reports_connected_database() {
        let (server, _dir) = test_server(None, None).await;
        let response = server.get("/health").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["database"], "connected");
        assert!(body["version"].is_string());
    }

    #[tokio::test]
    async fn test_deploy_rejects_missing_signature() {
        let (server, _dir) = test_server(Some("s3cret"), Some("true")).await;
        let response = server
            .post("/deploy")
            .bytes(Bytes::from_static(b"{\"ref\": \"refs/heads/main\"}"))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_deploy_rejects_wrong_signature() {
        let (server, _dir) = test_server(Some("s3cret"), Some("true")).await;
        let payload = b"{\"ref\": \"refs/heads/main\"}";
        let response = server
            .post("/deploy")
            .add_header(
                signature_header(),
                HeaderValue::from_str(&sign("other-secret", payload)).unwrap(),
            )
            .bytes(Bytes::from_static(payload))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_deploy_ignores_other_branches() {
        let (server, _dir) = test_server(Some("s3cret"), Some("true")).await;
        let payload = b"{\"ref\": \"refs/heads/feature\"}";
        let response = server
            .post("/deploy")
            .add_header(
                signature_header(),
                HeaderValue::from_str(&sign("s3cret", payload)).unwrap(),
            )
            .bytes(Bytes::from_static(payload))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "ignored");
        assert_eq!(body["ref"], "refs/heads/feature");
    }

    #[tokio::test]
    async fn test_deploy_rejects_bad_payload() {
        let (server, _dir) = test_server(Some("s3cret"), Some("true")).await;
        let payload = b"not json";
        let response = server
            .post("/deploy")
            .add_header(
                signature_header(),
                HeaderValue::from_str(&sign("s3cret", payload)).unwrap(),
            )
            .bytes(Bytes::from_static(payload))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_deploy_runs_command_on_main_push() {
        let (server, _dir) = test_server(Some("s3cret"), Some("true")).await;
        let payload = b"{\"ref\": \"refs/heads/main\"}";
        let response = server
            .post("/deploy")
            .add_header(
                signature_header(),
                HeaderValue::from_str(&sign("s3cret", payload)).unwrap(),
            )
            .bytes(Bytes::from_static(payload))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_deploy_reports_command_failure() {
        let (server, _dir) = test_server(Some("s3cret"), Some("echo boom >&2; exit 1")).await;
        let payload = b"{\"ref\": \"refs/heads/main\"}";
        let response = server
            .post("/deploy")
            .add_header(
                signature_header(),
                HeaderValue::from_str(&sign("s3cret", payload)).unwrap(),
            )
            .bytes(Bytes::from_static(payload))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json();
        assert_eq!(body["error"], "deploy failed");
        assert!(body["detail"].as_str().unwrap().contains("boom"));
    }

    #[tokio::test]
    async fn test_deploy_skips_without_command() {
        let (server, _dir) = test_server(Some("s3cret"), None).await;
        let payload = b"{\"ref\": \"refs/heads/main\"}";
        let response = server
            .post("/deploy")
            .add_header(
                signature_header(),
                HeaderValue::from_str(&sign("s3cret", payload)).unwrap(),
            )
            .bytes(Bytes::from_static(payload))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "skipped");
    }

    #[tokio::test]
    async fn test_deploy_without_configured_secret_skips_verification() {
        let (server, _dir) = test_server(None, None).await;
        let response = server
            .post("/deploy")
            .bytes(Bytes::from_static(b"{\"ref\": \"refs/heads/feature\"}"))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "ignored");
    }

    #[tokio::test]
    async fn test_trigger_requires_matching_secret() {
        let (server, _dir) = test_server(Some("s3cret"), Some("true")).await;

        let response = server.get("/deploy/trigger").await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        let response = server.get("/deploy/trigger?secret=wrong").await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        let response = server.get("/deploy/trigger?secret=s3cret").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "started");
    }

    #[tokio::test]
    async fn test_trigger_rejected_when_no_secret_configured() {
        let (server, _dir) = test_server(None, Some("true")).await;
        let response = server.get("/deploy/trigger?secret=anything").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_verify_signature_round_trip() {
        let payload = b"payload bytes";
        let header = sign("topsecret", payload);
        assert!(verify_signature("topsecret", payload, Some(&header)));
        assert!(!verify_signature("topsecret", payload, Some("sha256=deadbeef")));
        assert!(!verify_signature("topsecret", payload, Some("not-prefixed")));
        assert!(!verify_signature("topsecret", payload, None));
        assert!(!verify_signature("other", payload, Some(&header)));
    }

    #[test]
    fn test_decode_hex_rejects_bad_input() {
        assert_eq!(decode_hex("0aff"), Some(vec![0x0a, 0xff]));
        assert_eq!(decode_hex("abc"), None);
        assert_eq!(decode_hex("zz"), None);
    }
}
