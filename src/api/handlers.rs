//! HTTP handlers of the v1 metadata API
//!
//! Each handler maps its lookup outcome to a status code on its own. The
//! three policies differ on purpose and must not be folded together.

use super::encoding::{encode_cluster_bundle, encode_node_bundle, encode_tags};
use super::AppState;
use crate::metadata::{ClusterLookup, PodLookup};
use crate::metrics::Operation;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use tracing::error;

/// `GET /metadata/:node_name/:ns/:pod_name`
///
/// - 200: JSON array of tags, e.g. `["kube_service:my-nginx-service"]`
/// - 404: plain-text message naming the pod and the node
/// - 500: plain-text cache or encoding error
pub async fn get_pod_metadata(
    State(state): State<AppState>,
    Path((node_name, ns, pod_name)): Path<(String, String, String)>,
) -> Response {
    match state.lookup.pod_tags(&node_name, &ns, &pod_name) {
        PodLookup::Found(tags) => match encode_tags(&tags) {
            Ok(body) => json_response(StatusCode::OK, body),
            Err(e) => {
                error!("Could not process the list of services for: {}", pod_name);
                state.lookup.stats().increment_errors(Operation::Pod);
                text_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        },
        PodLookup::NotFound(message) => text_response(StatusCode::NOT_FOUND, message),
        PodLookup::CacheError(e) => {
            text_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// `GET /metadata/:node_name`
///
/// - 200: JSON object of pod name to tags (may be `{}`)
/// - 404: empty body when nothing could be rendered, cache errors included
pub async fn get_node_metadata(
    State(state): State<AppState>,
    Path(node_name): Path<String>,
) -> Response {
    // Cache errors were already logged and counted by the lookup
    let lookup = state.lookup.node_bundle(&node_name);

    let body = match encode_node_bundle(lookup.bundle.as_ref()) {
        Ok(body) => body,
        Err(e) => {
            state.lookup.stats().increment_errors(Operation::Node);
            return text_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };

    if body.is_empty() {
        return StatusCode::NOT_FOUND.into_response();
    }
    json_response(StatusCode::OK, body)
}

/// `GET /metadata`
///
/// - 200: JSON object of node name to bundle or `{"Error": ...}` marker
/// - 503: same object with partial data and a top-level `"Error"`
/// - 500: plain-text error when no cluster client could be created
/// - 404: empty body when nothing could be rendered
pub async fn get_all_metadata(State(state): State<AppState>) -> Response {
    let (bundle, failed) = match state.lookup.cluster_bundle().await {
        ClusterLookup::ClientUnavailable(e) => {
            return text_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
        ClusterLookup::Computed { bundle, error } => (bundle, error.is_some()),
    };

    let body = match encode_cluster_bundle(&bundle) {
        Ok(body) => body,
        Err(e) => {
            state.lookup.stats().increment_errors(Operation::Cluster);
            return text_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };

    if body.is_empty() {
        return StatusCode::NOT_FOUND.into_response();
    }

    let status = if failed {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    json_response(status, body)
}

/// `GET /metrics`
pub async fn get_metrics(State(state): State<AppState>) -> Response {
    match state.exporter.format_metrics() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, state.exporter.content_type())],
            text,
        )
            .into_response(),
        Err(e) => text_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

fn json_response(status: StatusCode, body: Bytes) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

fn text_response(status: StatusCode, message: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        message,
    )
        .into_response()
}
