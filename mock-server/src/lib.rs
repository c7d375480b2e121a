use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

pub const WORKFLOWS: [&str; 2] = ["realtime", "preview"];

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub id: i64,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: String,
}

#[derive(Clone, Debug)]
pub struct ZarazState {
    pub config: Value,
    pub workflow: String,
    /// Newest first.
    pub history: Vec<HistoryRecord>,
}

impl Default for ZarazState {
    fn default() -> Self {
        Self {
            config: default_config(),
            workflow: "realtime".to_string(),
            history: Vec::new(),
        }
    }
}

#[derive(Default)]
pub struct Store {
    containers: HashMap<(String, String), ZarazState>,
    next_history_id: i64,
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// The configuration every container starts with.
pub fn default_config() -> Value {
    json!({
        "dataLayer": true,
        "debugKey": "cheese",
        "dlp": [],
        "historyChange": true,
        "settings": { "autoInjectScript": true },
        "tools": {
            "PBQr": {
                "blockingTriggers": [],
                "component": "html",
                "defaultFields": {},
                "enabled": true,
                "mode": {
                    "cloud": false,
                    "ignoreSPA": true,
                    "light": false,
                    "sample": false,
                    "segment": { "end": 100, "start": 0 },
                    "trigger": "pageload"
                },
                "name": "Custom HTML",
                "neoEvents": [],
                "permissions": ["execute_unsafe_scripts"],
                "settings": {},
                "type": "component"
            }
        },
        "triggers": {
            "Pageview": {
                "clientRules": [],
                "description": "All page loads",
                "excludeRules": [],
                "loadRules": [
                    { "match": "{{ client.__zarazTrack }}", "op": "EQUALS", "value": "Pageview" }
                ],
                "name": "Pageview",
                "system": "pageload"
            }
        },
        "variables": {},
        "zarazVersion": 44
    })
}

pub fn app() -> Router {
    app_with_store(Arc::new(RwLock::new(Store {
        next_history_id: 1_000_000,
        ..Store::default()
    })))
}

pub fn app_with_store(db: Db) -> Router {
    Router::new()
        .route("/{kind}/{id}/settings/zaraz/v2/config", get(get_config).put(update_config))
        .route("/{kind}/{id}/settings/zaraz/v2/workflow", get(get_workflow).put(update_workflow))
        .route("/{kind}/{id}/settings/zaraz/v2/publish", post(publish))
        .route("/{kind}/{id}/settings/zaraz/v2/history", get(list_history))
        .route("/{kind}/{id}/settings/zaraz/v2/default", get(get_default))
        .route("/{kind}/{id}/settings/zaraz/v2/export", get(export))
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn success(result: Value) -> Response {
    Json(json!({
        "success": true,
        "errors": [],
        "messages": [],
        "result": result,
    }))
    .into_response()
}

fn failure(status: StatusCode, code: i64, message: &str) -> Response {
    (
        status,
        Json(json!({
            "success": false,
            "errors": [{ "code": code, "message": message }],
            "messages": [],
            "result": null,
        })),
    )
        .into_response()
}

fn plain_json(body: &Value) -> Response {
    ([(header::CONTENT_TYPE, "text/plain")], body.to_string()).into_response()
}

/// Validates the path's container kind, yielding the state key.
fn container(kind: String, id: String) -> Result<(String, String), Response> {
    match kind.as_str() {
        "zones" | "accounts" => Ok((kind, id)),
        _ => Err(failure(StatusCode::NOT_FOUND, 7003, "Could not route to the requested resource")),
    }
}

fn body_rejected(rejection: JsonRejection) -> Response {
    failure(StatusCode::BAD_REQUEST, 1001, &rejection.body_text())
}

async fn get_config(State(db): State<Db>, Path((kind, id)): Path<(String, String)>) -> Response {
    let key = match container(kind, id) {
        Ok(key) => key,
        Err(resp) => return resp,
    };
    let store = db.read().await;
    let config = store
        .containers
        .get(&key)
        .map(|state| state.config.clone())
        .unwrap_or_else(default_config);
    success(config)
}

async fn update_config(
    State(db): State<Db>,
    Path((kind, id)): Path<(String, String)>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let key = match container(kind, id) {
        Ok(key) => key,
        Err(resp) => return resp,
    };
    let Json(config) = match body {
        Ok(json) => json,
        Err(rejection) => return body_rejected(rejection),
    };
    if !config.is_object() {
        return failure(StatusCode::BAD_REQUEST, 1002, "Config must be a JSON object");
    }
    let mut store = db.write().await;
    let state = store.containers.entry(key).or_default();
    state.config = config;
    success(state.config.clone())
}

async fn get_workflow(State(db): State<Db>, Path((kind, id)): Path<(String, String)>) -> Response {
    let key = match container(kind, id) {
        Ok(key) => key,
        Err(resp) => return resp,
    };
    let store = db.read().await;
    let workflow = store
        .containers
        .get(&key)
        .map(|state| state.workflow.clone())
        .unwrap_or_else(|| ZarazState::default().workflow);
    success(Value::String(workflow))
}

async fn update_workflow(
    State(db): State<Db>,
    Path((kind, id)): Path<(String, String)>,
    body: Result<Json<String>, JsonRejection>,
) -> Response {
    let key = match container(kind, id) {
        Ok(key) => key,
        Err(resp) => return resp,
    };
    let Json(workflow) = match body {
        Ok(json) => json,
        Err(rejection) => return body_rejected(rejection),
    };
    if !WORKFLOWS.contains(&workflow.as_str()) {
        return failure(StatusCode::BAD_REQUEST, 1003, "Invalid workflow, expected realtime or preview");
    }
    let mut store = db.write().await;
    let state = store.containers.entry(key).or_default();
    state.workflow = workflow;
    success(Value::String(state.workflow.clone()))
}

async fn publish(
    State(db): State<Db>,
    Path((kind, id)): Path<(String, String)>,
    body: Result<Json<String>, JsonRejection>,
) -> Response {
    let key = match container(kind, id) {
        Ok(key) => key,
        Err(resp) => return resp,
    };
    let Json(description) = match body {
        Ok(json) => json,
        Err(rejection) => return body_rejected(rejection),
    };
    let mut store = db.write().await;
    store.next_history_id += 1;
    let now = Utc::now();
    let record = HistoryRecord {
        id: store.next_history_id,
        description,
        created_at: now,
        updated_at: now,
        user_id: Uuid::new_v4().simple().to_string(),
    };
    tracing::info!(id = record.id, "config published");
    let state = store.containers.entry(key).or_default();
    state.history.insert(0, record);
    success(json!("Config has been published successfully"))
}

async fn list_history(
    State(db): State<Db>,
    Path((kind, id)): Path<(String, String)>,
    Query(query): Query<HistoryQuery>,
) -> Response {
    let key = match container(kind, id) {
        Ok(key) => key,
        Err(resp) => return resp,
    };
    let page = query.page.unwrap_or(1);
    let per_page = query.per_page.unwrap_or(100);
    if page == 0 || per_page == 0 {
        return failure(StatusCode::BAD_REQUEST, 1004, "page and perPage must be positive");
    }
    let store = db.read().await;
    let history = store
        .containers
        .get(&key)
        .map(|state| state.history.as_slice())
        .unwrap_or_default();
    let skip = (page as usize - 1).saturating_mul(per_page as usize);
    let data: Vec<&HistoryRecord> = history.iter().skip(skip).take(per_page as usize).collect();
    success(json!({ "count": history.len(), "data": data }))
}

async fn get_default(Path((kind, id)): Path<(String, String)>) -> Response {
    if let Err(resp) = container(kind, id) {
        return resp;
    }
    plain_json(&default_config())
}

async fn export(State(db): State<Db>, Path((kind, id)): Path<(String, String)>) -> Response {
    let key = match container(kind, id) {
        Ok(key) => key,
        Err(resp) => return resp,
    };
    let store = db.read().await;
    let config = store
        .containers
        .get(&key)
        .map(|state| state.config.clone())
        .unwrap_or_else(default_config);
    plain_json(&config)
}
