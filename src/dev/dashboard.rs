//! Dashboard routes.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, Method, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::error::Result;
use crate::logging::LogBuffer;
use crate::rtm::{check_health, RtmClient};
use crate::scaffold::template::{render, TemplateContext};
use crate::service::NotesService;

const DASHBOARD_TEMPLATE: &str = include_str!("../../assets/dashboard.html.ejs");
const DASHBOARD_TEMPLATE_PATH: &str = "assets/dashboard.html.ejs";

/// Extra dashboard card shown when RTM is enabled.
const RTM_PANEL: &str = r#"      <div class="card">
        <h2>RTM Actions</h2>
        <button id="rtm-health-check">Run RTM Health Check</button>
        <div id="rtm-health-result"></div>
        <script>
          document.getElementById('rtm-health-check').addEventListener('click', async () => {
            const result = document.getElementById('rtm-health-result');
            result.textContent = 'Running health check...';
            try {
              const response = await fetch('/api/rtm/health');
              if (!response.ok) throw new Error('Failed to run health check: ' + response.statusText);
              const status = await response.json();
              const summary = document.createElement('p');
              summary.className = status.healthy ? 'success' : 'error';
              summary.textContent = status.healthy ? 'RTM API is healthy' : 'RTM API is not healthy';
              const details = document.createElement('pre');
              details.textContent = JSON.stringify(status.details, null, 2);
              result.replaceChildren(summary, details);
            } catch (error) {
              result.className = 'error';
              result.textContent = 'Error: ' + error.message;
            }
          });
        </script>
      </div>
"#;

/// Render the dashboard page for the server called `name`.
pub fn render_dashboard(name: &str, rtm_enabled: bool) -> Result<String> {
    let mut context = TemplateContext::new();
    context.insert("name".to_string(), name.to_string());
    context.insert(
        "extra_panels".to_string(),
        if rtm_enabled { RTM_PANEL } else { "" }.to_string(),
    );
    render(DASHBOARD_TEMPLATE, &context, DASHBOARD_TEMPLATE_PATH)
}

/// Shared state for dashboard handlers.
#[derive(Clone)]
pub struct DashboardState {
    notes: Arc<NotesService>,
    logs: LogBuffer,
    rtm: Option<Arc<RtmClient>>,
    html: Bytes,
}

impl DashboardState {
    /// Build the state, rendering the page once.
    pub fn new(
        name: &str,
        notes: Arc<NotesService>,
        logs: LogBuffer,
        rtm: Option<Arc<RtmClient>>,
    ) -> Result<Self> {
        let html = render_dashboard(name, rtm.is_some())?;
        Ok(Self {
            notes,
            logs,
            rtm,
            html: Bytes::from(html),
        })
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

/// Build the dashboard router.
pub fn router(state: DashboardState) -> Router {
    let mut app = Router::new()
        .route("/", get(dashboard))
        .route("/dashboard", get(dashboard))
        .route(
            "/api/notes",
            get(list_notes).post(create_note).fallback(method_not_allowed),
        )
        .route("/api/notes/{id}", get(get_note))
        .route("/api/logs", get(list_logs));

    if state.rtm.is_some() {
        app = app
            .route("/api/rtm/health", get(rtm_health))
            .route("/api/rtm/time", get(rtm_time));
    }

    app.fallback(not_found)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn dashboard(State(state): State<DashboardState>) -> Html<Bytes> {
    Html(state.html.clone())
}

/// Notes keyed by id, in insertion order.
async fn list_notes(State(state): State<DashboardState>) -> Json<Map<String, Value>> {
    let notes = state
        .notes
        .list()
        .await
        .into_iter()
        .filter_map(|note| Some((note.id.clone(), serde_json::to_value(note).ok()?)))
        .collect();
    Json(notes)
}

async fn create_note(State(state): State<DashboardState>, body: Bytes) -> Response {
    let Ok(data) = serde_json::from_slice::<Value>(&body) else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid JSON");
    };

    let field = |name: &str| {
        data.get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    };
    let (Some(title), Some(content)) = (field("title"), field("content")) else {
        return error_response(StatusCode::BAD_REQUEST, "Title and content are required");
    };

    match state.notes.create(title, content).await {
        Ok(note) => (StatusCode::CREATED, Json(note)).into_response(),
        Err(e) => error_response(
            StatusCode::from_u16(e.status()).unwrap_or(StatusCode::BAD_REQUEST),
            e.to_string(),
        ),
    }
}

async fn get_note(State(state): State<DashboardState>, Path(id): Path<String>) -> Response {
    match state.notes.get(&id).await {
        Ok(note) => Json(note).into_response(),
        Err(_) => error_response(StatusCode::NOT_FOUND, "Note not found"),
    }
}

async fn list_logs(State(state): State<DashboardState>) -> Json<Vec<String>> {
    Json(state.logs.snapshot())
}

async fn rtm_health(State(state): State<DashboardState>) -> Response {
    match &state.rtm {
        Some(client) => Json(check_health(client).await).into_response(),
        None => not_found().await,
    }
}

async fn rtm_time(State(state): State<DashboardState>) -> Response {
    let Some(client) = &state.rtm else {
        return not_found().await;
    };

    match client.server_time().await {
        Ok(time) => Json(json!({ "time": time })).into_response(),
        Err(e) => {
            error!("Failed to get RTM time: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to get RTM time: {}", e),
            )
        }
    }
}

async fn method_not_allowed() -> Response {
    error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}
