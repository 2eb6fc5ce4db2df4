//! HTTP request handlers

use super::pairing::render_png;
use super::types::{
    ErrorResponse, NodeListResponse, NodeResponse, SendMessageQuery, SessionResponse,
    SetTenantRequest, SuccessResponse, TenantResponse,
};
use super::AppState;
use crate::db::{DbError, NewMenuNode};
use crate::runtime::{DisconnectError, NodeStore};
use crate::transport::{TransportError, TransportEvent};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Transport operations
        .route("/api/bot/qrcode", get(get_qrcode))
        .route("/api/bot/send-message", post(send_message))
        .route("/api/bot/disconnect", post(disconnect))
        .route("/api/bot/tenant", get(get_tenant).post(set_tenant))
        // Bridge webhook
        .route("/api/bot/events", post(receive_event))
        // Menu administration
        .route(
            "/api/tenants/:tenant_id/nodes",
            get(list_nodes).post(create_node),
        )
        .route("/api/tenants/:tenant_id/nodes/:node_id", get(get_node))
        .route(
            "/api/tenants/:tenant_id/sessions/:sender_id",
            get(get_session),
        )
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Transport Operations
// ============================================================

async fn get_qrcode(State(state): State<AppState>) -> Result<Response, AppError> {
    let code = state
        .runtime
        .pairing_code()
        .await
        .ok_or_else(|| AppError::NotFound("QR code not found".to_string()))?;

    let png = render_png(&code).map_err(AppError::Internal)?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

async fn send_message(
    State(state): State<AppState>,
    Query(query): Query<SendMessageQuery>,
) -> Result<Json<SuccessResponse>, AppError> {
    state
        .runtime
        .send_message(&query.to, &query.message)
        .await
        .map_err(transport_error)?;
    Ok(Json(SuccessResponse { success: true }))
}

async fn disconnect(State(state): State<AppState>) -> Result<Json<SuccessResponse>, AppError> {
    state.runtime.disconnect().await.map_err(|e| {
        tracing::error!(error = %e, "Disconnect failed");
        match e {
            DisconnectError::Cleanup(_) => AppError::Internal(e.to_string()),
            DisconnectError::Logout(_) | DisconnectError::Reinitialize(_) => {
                AppError::BadGateway(e.to_string())
            }
        }
    })?;
    Ok(Json(SuccessResponse { success: true }))
}

async fn get_tenant(State(state): State<AppState>) -> Json<TenantResponse> {
    Json(TenantResponse {
        tenant_id: state.runtime.tenant_id().await,
    })
}

async fn set_tenant(
    State(state): State<AppState>,
    Json(req): Json<SetTenantRequest>,
) -> Result<Json<TenantResponse>, AppError> {
    let tenant_id = req.tenant_id.trim();
    if tenant_id.is_empty() {
        return Err(AppError::BadRequest("tenant_id must not be empty".to_string()));
    }
    state.runtime.set_tenant(tenant_id).await;
    Ok(Json(TenantResponse {
        tenant_id: tenant_id.to_string(),
    }))
}

/// Accept a bridge event; messages are handled in the background
async fn receive_event(
    State(state): State<AppState>,
    Json(event): Json<TransportEvent>,
) -> (StatusCode, Json<SuccessResponse>) {
    state.runtime.handle_event(event).await;
    (StatusCode::ACCEPTED, Json(SuccessResponse { success: true }))
}

// ============================================================
// Menu Administration
// ============================================================

async fn list_nodes(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> Result<Json<NodeListResponse>, AppError> {
    let nodes = state
        .runtime
        .store()
        .list_nodes(&tenant_id)
        .await
        .map_err(AppError::Internal)?;
    Ok(Json(NodeListResponse { nodes }))
}

async fn create_node(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
    Json(req): Json<NewMenuNode>,
) -> Result<(StatusCode, Json<NodeResponse>), AppError> {
    let node = state.db().insert_node(&tenant_id, req).map_err(db_error)?;
    tracing::info!(tenant = %tenant_id, node = %node.id, kind = %node.kind, "Menu node created");
    Ok((
        StatusCode::CREATED,
        Json(NodeResponse {
            node,
            child_count: 0,
        }),
    ))
}

async fn get_node(
    State(state): State<AppState>,
    Path((tenant_id, node_id)): Path<(String, String)>,
) -> Result<Json<NodeResponse>, AppError> {
    let store = state.runtime.store();
    let node = store
        .get_node(&node_id)
        .await
        .map_err(AppError::Internal)?
        .filter(|node| node.tenant_id == tenant_id)
        .ok_or_else(|| AppError::NotFound(format!("Node not found: {node_id}")))?;
    let child_count = store
        .count_children(&node.id)
        .await
        .map_err(AppError::Internal)?;
    Ok(Json(NodeResponse { node, child_count }))
}

async fn get_session(
    State(state): State<AppState>,
    Path((tenant_id, sender_id)): Path<(String, String)>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state
        .runtime
        .session_snapshot(&tenant_id, &sender_id)
        .ok_or_else(|| AppError::NotFound(format!("No session for {sender_id}")))?;
    Ok(Json(SessionResponse { session }))
}

async fn get_version() -> &'static str {
    concat!("menu-bot ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

enum AppError {
    BadRequest(String),
    NotFound(String),
    BadGateway(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}

/// Caller mistakes are 400s; everything else is the bridge's fault
fn transport_error(e: TransportError) -> AppError {
    if e.is_caller_error() {
        AppError::BadRequest(e.to_string())
    } else {
        tracing::error!(error = %e, kind = ?e.kind, "Transport request failed");
        AppError::BadGateway(e.to_string())
    }
}

fn db_error(e: DbError) -> AppError {
    match e {
        DbError::NodeExists(_) | DbError::ParentNotFound(_) => AppError::BadRequest(e.to_string()),
        DbError::Sqlite(_) | DbError::Poisoned => AppError::Internal(e.to_string()),
    }
}
