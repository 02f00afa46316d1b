//! HTTP interface.
//!
//! | Method | Path | Action |
//! |--------|------|--------|
//! | GET | `/vendors` | list vendors |
//! | POST | `/manage_vendors` | `{"action": "add" \| "delete", "vendor": name}` |
//! | POST | `/force_scan` | run a scan and wait for it |
//! | GET | `/badnews` | HTML findings page |
//! | GET | `/badnews.json` | findings as JSON |

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::output::{generate_html_string, FindingsPage};
use crate::scan::run_scan;
use crate::search::SearchProvider;
use crate::store::Workspace;

const INVALID_VENDOR_REQUEST: &str = "Invalid action or vendor not found.";

/// Shared state behind every handler.
pub struct AppState {
    workspace: Workspace,
    provider: Arc<dyn SearchProvider>,
    // Serializes writers (vendor edits and scans) within this process.
    write_lock: Mutex<()>,
}

impl AppState {
    pub fn new(workspace: Workspace, provider: Arc<dyn SearchProvider>) -> Self {
        Self {
            workspace,
            provider,
            write_lock: Mutex::new(()),
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }
}

#[derive(Debug, Deserialize)]
pub struct ManageVendorRequest {
    #[serde(default)]
    action: String,
    #[serde(default)]
    vendor: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/vendors", get(list_vendors))
        .route("/manage_vendors", post(manage_vendors))
        .route("/force_scan", post(force_scan))
        .route("/badnews", get(bad_news_page))
        .route("/badnews.json", get(bad_news_json))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Creates any missing state files, binds `addr` and serves until the
/// process is stopped. Read handlers never write after this.
pub async fn serve(state: Arc<AppState>, addr: &str) -> Result<()> {
    state
        .workspace
        .initialize()
        .context("initializing data directory")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("vendorwatch web server listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state)).await?;
    Ok(())
}

fn message(status: StatusCode, text: impl Into<String>) -> Response {
    (status, Json(json!({ "message": text.into() }))).into_response()
}

fn internal_error(context: &str, e: impl std::fmt::Display) -> Response {
    warn!(error = %e, "{context}");
    message(StatusCode::INTERNAL_SERVER_ERROR, context)
}

async fn list_vendors(State(state): State<Arc<AppState>>) -> Response {
    match state.workspace.vendor_list().list() {
        Ok(vendors) => Json(vendors).into_response(),
        Err(e) => internal_error("Failed to load vendors", e),
    }
}

async fn manage_vendors(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ManageVendorRequest>,
) -> Response {
    let _guard = state.write_lock.lock().await;
    let vendors = state.workspace.vendor_list();

    let result = match request.action.as_str() {
        "add" => vendors
            .add(&request.vendor)
            .map(|name| (StatusCode::CREATED, format!("Vendor '{name}' added."))),
        "delete" => vendors
            .remove(&request.vendor)
            .map(|name| (StatusCode::OK, format!("Vendor '{name}' removed."))),
        _ => return message(StatusCode::BAD_REQUEST, INVALID_VENDOR_REQUEST),
    };

    match result {
        Ok((status, text)) => message(status, text),
        Err(e) if e.is_invalid_request() => {
            info!(action = %request.action, reason = %e, "Vendor request rejected");
            message(StatusCode::BAD_REQUEST, INVALID_VENDOR_REQUEST)
        }
        Err(e) => internal_error("Failed to update vendors", e),
    }
}

async fn force_scan(State(state): State<Arc<AppState>>) -> Response {
    let _guard = state.write_lock.lock().await;

    match run_scan(&state.workspace, state.provider.as_ref()).await {
        Ok(report) => (
            StatusCode::OK,
            Json(json!({
                "message": "Scan completed successfully.",
                "report": report,
            })),
        )
            .into_response(),
        Err(e) => internal_error("Scan failed", format!("{e:#}")),
    }
}

async fn bad_news_page(State(state): State<Arc<AppState>>) -> Response {
    match FindingsPage::load(&state.workspace) {
        Ok(page) => Html(generate_html_string(&page)).into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to load findings");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html("<h1>Error loading findings</h1>".to_string()),
            )
                .into_response()
        }
    }
}

async fn bad_news_json(State(state): State<Arc<AppState>>) -> Response {
    match FindingsPage::load(&state.workspace) {
        Ok(page) => Json(page).into_response(),
        Err(e) => internal_error("Failed to load findings", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ApiUsage, Finding, Findings, NO_RESULTS_MARKER};
    use crate::search::{SearchFailure, SearchOutcome};
    use crate::store::{MemoryStore, Store, FINDINGS_FILE, USAGE_FILE, VENDORS_FILE};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt;

    struct FixedSearch;

    #[async_trait]
    impl SearchProvider for FixedSearch {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn search(&self, vendor: &str) -> SearchOutcome {
            if vendor == "Globex" {
                SearchOutcome::Failed(SearchFailure::Throttled { attempts: 5 })
            } else {
                SearchOutcome::Found(format!("<p>{vendor} fined</p>"))
            }
        }
    }

    fn state() -> Arc<AppState> {
        Arc::new(AppState::new(Workspace::in_memory(), Arc::new(FixedSearch)))
    }

    async fn send(state: &Arc<AppState>, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    fn manage(action: &str, vendor: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/manage_vendors")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "action": action, "vendor": vendor }).to_string(),
            ))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post(uri: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn json_body(bytes: &[u8]) -> serde_json::Value {
        serde_json::from_slice(bytes).unwrap()
    }

    #[tokio::test]
    async fn test_add_then_list() {
        let state = state();

        let (status, body) = send(&state, manage("add", "Acme")).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json_body(&body)["message"], "Vendor 'Acme' added.");

        let (status, body) = send(&state, get("/vendors")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(&body), json!(["Acme"]));
    }

    #[tokio::test]
    async fn test_duplicate_add_is_bad_request() {
        let state = state();
        send(&state, manage("add", "Acme")).await;

        let (status, body) = send(&state, manage("add", "Acme")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json_body(&body)["message"], INVALID_VENDOR_REQUEST);
        assert_eq!(state.workspace().vendor_list().list().unwrap(), vec!["Acme"]);
    }

    #[tokio::test]
    async fn test_delete() {
        let state = state();
        send(&state, manage("add", "Acme")).await;

        let (status, body) = send(&state, manage("delete", "Acme")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(&body)["message"], "Vendor 'Acme' removed.");

        let (status, _) = send(&state, manage("delete", "Acme")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_action_and_blank_vendor() {
        let state = state();

        let (status, _) = send(&state, manage("rename", "Acme")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&state, manage("add", "  ")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert!(state.workspace().vendor_list().list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_force_scan_then_view() {
        let state = state();
        send(&state, manage("add", "Acme")).await;
        send(&state, manage("add", "Globex")).await;

        let (status, body) = send(&state, post("/force_scan")).await;
        assert_eq!(status, StatusCode::OK);
        let body = json_body(&body);
        assert_eq!(body["message"], "Scan completed successfully.");
        assert_eq!(body["report"]["usage_count"], 2);
        assert_eq!(body["report"]["failures"][0]["vendor"], "Globex");

        let (status, body) = send(&state, get("/badnews.json")).await;
        assert_eq!(status, StatusCode::OK);
        let body = json_body(&body);
        assert_eq!(body["usage_count"], 2);
        assert_eq!(body["findings"]["Acme"]["body"], "<p>Acme fined</p>");
        assert_eq!(body["findings"]["Globex"]["status"], "failed");

        let (status, body) = send(&state, get("/badnews")).await;
        assert_eq!(status, StatusCode::OK);
        let html = String::from_utf8(body).unwrap();
        assert!(html.contains("&lt;p&gt;Acme fined&lt;/p&gt;"));
        assert!(html.contains(NO_RESULTS_MARKER));
    }

    struct FailingFindings;

    impl Store<Findings> for FailingFindings {
        fn load(&self) -> anyhow::Result<Findings> {
            anyhow::bail!("findings file unreadable")
        }

        fn save(&self, _: &Findings) -> anyhow::Result<()> {
            anyhow::bail!("findings file unwritable")
        }
    }

    #[tokio::test]
    async fn test_storage_errors_are_500() {
        let workspace = Workspace::from_stores(
            MemoryStore::new(vec!["Acme".to_string()]),
            FailingFindings,
            MemoryStore::new(ApiUsage::new(1)),
        );
        let state = Arc::new(AppState::new(workspace, Arc::new(FixedSearch)));

        let (status, _) = send(&state, post("/force_scan")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (status, _) = send(&state, get("/badnews")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        assert_eq!(state.workspace().usage.load().unwrap().usage_count, 1);
    }

    #[tokio::test]
    async fn test_serve_creates_state_files_before_listening() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        let state = Arc::new(AppState::new(Workspace::open(&data), Arc::new(FixedSearch)));

        let server = tokio::spawn(serve(state, "127.0.0.1:0"));
        for _ in 0..100 {
            if data.join(USAGE_FILE).exists() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        server.abort();

        assert!(data.join(VENDORS_FILE).exists());
        assert!(data.join(FINDINGS_FILE).exists());
        assert!(data.join(USAGE_FILE).exists());
    }

    #[tokio::test]
    async fn test_view_before_any_scan() {
        let state = state();
        let mut findings = Findings::new();
        findings.insert("Old".to_string(), Finding::NoResults);
        state.workspace().findings.save(&findings).unwrap();

        let (status, body) = send(&state, get("/badnews")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(body).unwrap().contains("Old"));
    }
}
