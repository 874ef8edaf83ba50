use crate::routers::API_PATHS;
use crate::startup::{AppState, HEALTH_PATH};
use axum::{extract::State, response::IntoResponse, Json};
use serde_json::{json, Map, Value};

/// Minimal OpenAPI document carrying the application metadata and the
/// mounted paths.
pub async fn openapi_document(State(state): State<AppState>) -> impl IntoResponse {
    let api = &state.settings.api;

    let mut paths = Map::new();
    paths.insert(HEALTH_PATH.to_string(), json!({}));
    for path in API_PATHS {
        // OpenAPI templates use `{param}` where the router uses `:param`.
        let templated = path
            .split('/')
            .map(|segment| match segment.strip_prefix(':') {
                Some(param) => format!("{{{}}}", param),
                None => segment.to_string(),
            })
            .collect::<Vec<_>>()
            .join("/");
        paths.insert(format!("{}{}", api.route_prefix, templated), json!({}));
    }

    Json(json!({
        "openapi": "3.1.0",
        "info": {
            "title": api.title,
            "description": api.description,
            "summary": api.summary,
            "version": api.version,
        },
        "paths": Value::Object(paths),
    }))
}
